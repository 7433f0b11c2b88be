//! Robokit REST API entry point.
//!
//! Binary name: `robokit`
//!
//! Parses CLI arguments, wires the provider implementations into the
//! pipeline, then starts the HTTP server.

mod http;
mod state;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use state::AppState;

#[derive(Debug, Parser)]
#[command(name = "robokit", version, about = "Robot project kit generator API")]
struct Cli {
    /// Increase log verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Start the REST API server
    Serve {
        /// Directory containing config.toml
        #[arg(long, default_value = ".")]
        config_dir: PathBuf,

        /// Override the bind address from config.toml (e.g. 127.0.0.1:9000)
        #[arg(long)]
        bind: Option<String>,

        /// Export spans via the OpenTelemetry stdout exporter
        #[arg(long)]
        otel: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up tracing based on verbosity
    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "warn",
        1 => "info,robokit=debug",
        _ => "trace",
    };

    match cli.command {
        Commands::Serve {
            config_dir,
            bind,
            otel,
        } => {
            robokit_observe::tracing_setup::init_tracing(filter, otel)
                .map_err(|e| anyhow::anyhow!("tracing init failed: {e}"))?;

            let state = AppState::init(&config_dir).await?;
            let addr = bind.unwrap_or_else(|| state.config.bind_addr.clone());

            let listener = tokio::net::TcpListener::bind(&addr).await?;
            tracing::info!(%addr, "Robokit API listening");

            let router = http::router::build_router(state);

            axum::serve(listener, router)
                .with_graceful_shutdown(shutdown_signal())
                .await?;

            robokit_observe::tracing_setup::shutdown_tracing();
            tracing::info!("server stopped");
        }
    }

    Ok(())
}

/// Wait for Ctrl+C or SIGTERM for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {e}");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => tracing::error!("failed to install SIGTERM handler: {e}"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
