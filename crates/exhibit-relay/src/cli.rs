use std::path::PathBuf;

use clap::Parser;
use exhibit_config::ExhibitConfig;

/// Presence and chat relay for a shared virtual exhibit.
#[derive(Parser, Debug)]
#[command(name = "exhibit-relay", version, about)]
pub struct Args {
    /// Config file path override.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Interface to bind.
    #[arg(long)]
    pub host: Option<String>,

    /// Port to listen on.
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Log filter override, e.g. `exhibit_relay=debug`.
    #[arg(long)]
    pub log_level: Option<String>,

    /// Print the effective config as JSON and exit.
    #[arg(long)]
    pub print_config: bool,
}

impl Args {
    /// Apply flags on top of the file and environment layers.
    pub fn apply(&self, config: &mut ExhibitConfig) {
        if let Some(host) = &self.host {
            config.server.host = host.clone();
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(level) = &self.log_level {
            config.logging.level = level.clone();
        }
    }
}

pub fn parse() -> Args {
    Args::parse()
}
