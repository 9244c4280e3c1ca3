use clap::Parser;
use std::path::PathBuf;

/// Example service wiring request middleware, content negotiation and a
/// Prometheus scrape endpoint.
#[derive(Parser, Debug)]
#[command(name = "almaraz-example", version, about)]
pub struct Cli {
    /// Path to a TOML config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Override `server.host`
    #[arg(long)]
    pub host: Option<String>,

    /// Override `server.port`
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Trace-level logging for this crate
    #[arg(short, long)]
    pub verbose: bool,
}
