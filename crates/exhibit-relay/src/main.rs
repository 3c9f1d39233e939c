//! exhibit-relay binary: load config, start the relay, run until Ctrl-C.

mod cli;

use std::process::ExitCode;

use exhibit_common::ExhibitError;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let args = cli::parse();

    let config = match load(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("exhibit-relay: {e}");
            return ExitCode::FAILURE;
        }
    };

    if args.print_config {
        println!("{}", exhibit_config::config_to_json(&config));
        return ExitCode::SUCCESS;
    }

    // RUST_LOG wins over the configured directive.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .init();

    tracing::info!("exhibit-relay v{} starting", env!("CARGO_PKG_VERSION"));

    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Relay failed");
            ExitCode::FAILURE
        }
    }
}

/// Defaults, file, environment, then flags. Invalid results abort startup.
fn load(args: &cli::Args) -> Result<exhibit_config::ExhibitConfig, ExhibitError> {
    let mut config = exhibit_config::load_config(args.config.as_deref())?;
    args.apply(&mut config);
    exhibit_config::validation::validate(&config)?;
    Ok(config)
}

async fn run(config: exhibit_config::ExhibitConfig) -> Result<(), ExhibitError> {
    let handle = exhibit_relay::start(&config).await?;

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutting down");
    handle.shutdown().await;
    tracing::info!("Shutdown complete");
    Ok(())
}
