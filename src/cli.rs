//! Command-line interface definitions.

use clap::{Parser, Subcommand};
use std::net::SocketAddr;

#[derive(Parser)]
#[command(
    name = "tourmuse-server",
    version,
    about = "Trip planning backend driven by LLM agents"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP server
    Serve {
        /// Bind address, overriding the configured host and port
        #[arg(long)]
        addr: Option<SocketAddr>,
    },
}
