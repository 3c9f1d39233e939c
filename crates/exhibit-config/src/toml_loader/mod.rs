//! TOML config file loading.

mod loader;
mod paths;


pub use loader::{load_default, load_from_path, parse_str};
pub use paths::default_config_path;
