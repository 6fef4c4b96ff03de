//! BrandLens critique service daemon
//!
//! Serves the critique API over HTTP: buffered runs on `POST /api/critique`,
//! SSE step progress on `POST /api/critique/stream`, and a health probe on
//! `GET /api/health`.

mod error;
mod handlers;
mod stream;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn, Level};

use brandlens_agents::{AgentsConfig, HttpAgents, StubAgents};
use brandlens_core::{init_tracing, Collaborators, NormalizeMode, WorkflowOptions};

use crate::handlers::{create_router, AppState};

#[derive(Parser)]
#[command(name = "brandlensd")]
#[command(author = "BrandLens Engineering")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "BrandLens brand critique service", long_about = None)]
struct Cli {
    /// Address to serve the critique API on
    #[arg(long, env = "BRANDLENS_BIND", default_value = "127.0.0.1:8080")]
    bind: SocketAddr,

    /// Base URL of the remote agents service
    #[arg(
        long,
        env = "BRANDLENS_AGENTS_URL",
        default_value = "http://127.0.0.1:8000"
    )]
    agents_url: String,

    /// Timeout for one agent call, in seconds
    #[arg(long, env = "BRANDLENS_TIMEOUT_SECS", default_value = "180")]
    timeout_secs: u64,

    /// Frame rate requested from the frame extractor
    #[arg(long, env = "BRANDLENS_SAMPLING_FPS", default_value = "2.0")]
    sampling_fps: f64,

    /// Reject malformed agent responses instead of repairing them
    #[arg(long, env = "BRANDLENS_STRICT")]
    strict: bool,

    /// Serve canned agent responses instead of calling the remote service
    #[arg(long, env = "BRANDLENS_STUB_AGENTS")]
    stub_agents: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, env = "BRANDLENS_JSON_LOGS")]
    json: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn collaborators(&self) -> Arc<dyn Collaborators> {
        if self.stub_agents {
            info!("serving canned agent responses; no remote calls will be made");
            return Arc::new(StubAgents::new());
        }
        let config =
            AgentsConfig::new(&self.agents_url).with_timeout(Duration::from_secs(self.timeout_secs));
        Arc::new(HttpAgents::new(config))
    }

    fn options(&self) -> WorkflowOptions {
        WorkflowOptions {
            normalize_mode: if self.strict {
                NormalizeMode::Strict
            } else {
                NormalizeMode::Lenient
            },
            sampling_rate_fps: self.sampling_fps,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    init_tracing(cli.json, level);

    let state = AppState::new(cli.collaborators(), cli.options());
    let app = create_router().with_state(state);

    let listener = tokio::net::TcpListener::bind(cli.bind)
        .await
        .with_context(|| format!("failed to bind {}", cli.bind))?;
    info!("brandlensd listening on http://{}", cli.bind);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("brandlensd stopped");
    Ok(())
}

/// Resolves on ctrl-c or, on unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("received interrupt, shutting down"),
            Err(err) => {
                warn!(%err, "failed to install interrupt handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix;
        match unix::signal(unix::SignalKind::terminate()) {
            Ok(mut term) => {
                term.recv().await;
                info!("received TERM, shutting down");
            }
            Err(err) => {
                warn!(%err, "failed to install TERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
