use anyhow::{Context, Result};
use clap::Parser;
use planbook_core::db;
use planbook_server::cli::{Cli, Commands, MigrateCommand, ServeCommand};
use planbook_server::config::Config;
use tracing_subscriber::EnvFilter;

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve(command) => serve(command).await,
        Commands::Migrate(command) => migrate(command).await,
    }
}

async fn serve(command: ServeCommand) -> Result<()> {
    let mut config = Config::load(&command.config.config)?;
    if let Some(host) = command.host {
        config.server.host = host;
    }
    if let Some(port) = command.port {
        config.server.port = port;
    }
    init_tracing(&config.logging.level);

    let state = planbook_server::build_state(&config).await?;
    let app = planbook_server::app(state);

    let addr = config.server.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!(%addr, database = %config.database.path, "planbook listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("planbook stopped");
    Ok(())
}

async fn migrate(command: MigrateCommand) -> Result<()> {
    let config = Config::load(&command.config.config)?;
    init_tracing(&config.logging.level);

    db::establish_connection(&config.database.path, 1)
        .await
        .with_context(|| format!("Failed to migrate {}", config.database.path))?;

    println!("Database is up to date: {}", config.database.path);
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
