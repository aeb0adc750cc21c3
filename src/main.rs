//! Classroom gradebook server.
//!
//! # Architecture Overview
//!
//! ```text
//!                     ┌───────────────────────────────────────────────────┐
//!                     │                     GRADEBOOK                     │
//!                     │                                                   │
//!   Browser request   │  ┌─────────┐   ┌──────────┐   ┌───────────────┐   │
//!   ──────────────────┼─▶│  http   │──▶│ session  │──▶│ auth guard    │   │
//!                     │  │ server  │   │ cookie   │   │ (teacher only)│   │
//!                     │  └─────────┘   └──────────┘   └──────┬────────┘   │
//!                     │                                      ▼            │
//!                     │                               ┌───────────────┐   │
//!                     │                               │  gradebook    │   │
//!                     │                               │ forms+handlers│   │
//!                     │                               └──────┬────────┘   │
//!                     │                                      ▼            │
//!   JSON page         │  ┌─────────┐                  ┌───────────────┐   │
//!   ◀─────────────────┼──│  views  │◀─────────────────│   storage     │   │
//!                     │  └─────────┘                  │ sqlite + r2d2 │   │
//!                     │                               └───────────────┘   │
//!                     │                                                   │
//!                     │  config (hot reload) · observability · lifecycle  │
//!                     └───────────────────────────────────────────────────┘
//! ```

use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use gradebook::config::watcher::ConfigWatcher;
use gradebook::config::{load_config_with, ConfigError, GradebookConfig, Overrides};
use gradebook::lifecycle::{shutdown_signal, Shutdown};
use gradebook::observability::{logging, metrics};
use gradebook::HttpServer;

#[derive(Parser, Debug)]
#[command(name = "gradebook", version, about = "Classroom gradebook server")]
struct Cli {
    /// TOML configuration file; watched for changes when given
    #[arg(short, long, env = "GRADEBOOK_CONFIG")]
    config: Option<PathBuf>,

    /// Override listener.bind_address
    #[arg(long, env = "GRADEBOOK_BIND")]
    bind: Option<String>,

    /// Override database.path
    #[arg(long, env = "GRADEBOOK_DATABASE")]
    database: Option<String>,
}

impl Cli {
    fn overrides(&self) -> Overrides {
        Overrides {
            bind_address: self.bind.clone(),
            database_path: self.database.clone(),
        }
    }
}

fn resolve_config(cli: &Cli) -> Result<GradebookConfig, ConfigError> {
    load_config_with(cli.config.as_deref(), &cli.overrides())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = resolve_config(&cli)?;

    logging::init_logging(&config.observability)?;
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "gradebook starting");

    tracing::info!(
        bind_address = %config.listener.bind_address,
        database = %config.database.path,
        tls = config.listener.tls.is_some(),
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        let addr: SocketAddr = config.observability.metrics_address.parse()?;
        metrics::init_metrics(addr)?;
    }

    // The watcher handle must outlive the server for reloads to keep flowing.
    let (_watch_guard, config_updates) = match &cli.config {
        Some(path) => {
            let (watcher, updates) = ConfigWatcher::new(path, cli.overrides());
            (Some(watcher.run()?), updates)
        }
        None => {
            let (_, updates) = mpsc::unbounded_channel();
            (None, updates)
        }
    };

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let server = HttpServer::new(config)?;

    let shutdown = Shutdown::new();
    let mut served = tokio::spawn(server.run(listener, config_updates, shutdown.subscribe()));

    tokio::select! {
        result = &mut served => {
            result??;
            return Ok(());
        }
        _ = shutdown_signal() => {
            tracing::info!("Shutting down, draining in-flight requests");
            shutdown.trigger();
        }
    }

    served.await??;
    tracing::info!("Shutdown complete");
    Ok(())
}
