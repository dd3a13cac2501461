//! TourMuse backend server binary.

use anyhow::Result;
use clap::Parser;
use tracing::info;

use tourmuse_backend::cli::{Cli, Commands};
use tourmuse_backend::settings::Settings;
use tourmuse_backend::{server, telemetry};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let settings = Settings::load()?;
    telemetry::init(&settings.logging)?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        engine = %settings.engine.provider,
        model = %settings.engine.model,
        "Starting TourMuse backend"
    );

    match cli.command {
        Commands::Serve { addr } => server::serve(&settings, addr).await,
    }
}
