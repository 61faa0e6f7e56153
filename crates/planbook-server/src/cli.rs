use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::config::DEFAULT_CONFIG_PATH;

/// Planbook: to-dos, journal and calendar over HTTP
#[derive(Parser, Debug)]
#[command(name = "planbook", author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start the HTTP server
    Serve(ServeCommand),
    /// Create the database and apply pending migrations, then exit
    Migrate(MigrateCommand),
}

#[derive(Args, Debug, Clone)]
pub struct ConfigArg {
    /// Path to the configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,
}

#[derive(Args, Debug, Clone)]
pub struct ServeCommand {
    #[command(flatten)]
    pub config: ConfigArg,
    /// Address to bind, overriding server.host
    #[arg(long)]
    pub host: Option<String>,
    /// Port to listen on, overriding server.port
    #[arg(short, long)]
    pub port: Option<u16>,
}

#[derive(Args, Debug, Clone)]
pub struct MigrateCommand {
    #[command(flatten)]
    pub config: ConfigArg,
}
