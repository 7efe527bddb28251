//! Conductor command line: serve the HTTP API, run one query, or check config.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use conductor_orchestrator::{Attachment, OrchestrationRequest};
use conductor_server::{AppState, LogFormat, Settings, build_router, init_tracing};
use tracing::info;

/// Conductor - multi-agent query orchestration
#[derive(Parser, Debug)]
#[command(name = "conductor")]
#[command(about = "Routes a query to specialised agents and merges their results", long_about = None)]
#[command(version)]
struct Args {
    /// Path to a TOML configuration file (default: ./conductor.toml if present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log output format, overriding logging.format
    #[arg(long, global = true, value_enum)]
    log_format: Option<LogFormat>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP server (default)
    Serve {
        /// Override server.host
        #[arg(long)]
        host: Option<String>,

        /// Override server.port
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Run one orchestration in-process and print the result as JSON
    Run {
        /// The query to orchestrate
        query: String,

        /// Attach a file (repeatable)
        #[arg(short, long = "file")]
        files: Vec<PathBuf>,
    },

    /// Print the effective configuration and exit
    ValidateConfig,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut settings = Settings::load(args.config.as_deref()).context("Failed to load configuration")?;
    if let Some(format) = args.log_format {
        settings.logging.format = format;
    }

    init_tracing(settings.logging.format).context("Failed to initialise logging")?;

    match args.command.unwrap_or(Command::Serve { host: None, port: None }) {
        Command::Serve { host, port } => {
            if let Some(host) = host {
                settings.server.host = host;
            }
            if let Some(port) = port {
                settings.server.port = port;
            }
            serve(settings).await
        }
        Command::Run { query, files } => run(settings, query, &files).await,
        Command::ValidateConfig => {
            let rendered = toml::to_string_pretty(&settings.redacted()).context("Failed to render configuration")?;
            println!("{rendered}");
            Ok(())
        }
    }
}

async fn serve(settings: Settings) -> Result<()> {
    let addr = settings.bind_address();
    let state = AppState::from_settings(settings)?;
    let app = build_router(state);

    let listener =
        tokio::net::TcpListener::bind(&addr).await.with_context(|| format!("Failed to bind to {addr}"))?;
    info!(address = %addr, "Conductor listening");

    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await.context("Server error")?;

    info!("Server shut down");
    Ok(())
}

async fn run(settings: Settings, query: String, files: &[PathBuf]) -> Result<()> {
    let state = AppState::from_settings(settings)?;

    let mut request = OrchestrationRequest::new(query);
    for path in files {
        request = request.with_attachment(read_attachment(path).await?);
    }

    let result = state.orchestrator.execute(request).await?;
    let output = serde_json::json!({ "success": true, "data": result });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

async fn read_attachment(path: &Path) -> Result<Attachment> {
    let content = tokio::fs::read(path).await.with_context(|| format!("Failed to read {}", path.display()))?;
    let filename = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .with_context(|| format!("{} has no file name", path.display()))?;
    Ok(Attachment::new(filename, content))
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %error, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
