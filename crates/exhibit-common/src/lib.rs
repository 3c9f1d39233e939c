pub mod errors;
pub mod id;
pub mod types;

pub use errors::{ConfigError, ExhibitError, ProtocolError};
pub use id::{new_connection_id, ParticipantId};
pub use types::Color;

pub type Result<T> = std::result::Result<T, ExhibitError>;
