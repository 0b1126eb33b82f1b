//! Command definitions and execution

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use epiwatch_core::config::ServiceConfig;
use epiwatch_core::model::Scope;
use epiwatch_core::{IngestError, Result};
use epiwatch_engine::{HttpFetcher, Ingestor};
use epiwatch_store::SqliteStore;

use crate::routes;

#[derive(Debug, Parser)]
#[command(name = "epiwatch")]
#[command(about = "EpiWatch - incremental outbreak status ingestion", long_about = None)]
pub struct Cli {
    /// Configuration file (TOML); defaults apply when omitted
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Emit JSON logs
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run the HTTP service
    Serve,
    /// Run one refresh and report whether the store changed
    Refresh {
        #[command(subcommand)]
        scope: RefreshScope,
    },
}

#[derive(Debug, Subcommand)]
pub enum RefreshScope {
    /// Worldwide per-country listing
    Global,
    /// Focus country's per-province listing
    Country,
    /// One province's per-city listing
    Province { name: String },
}

pub fn execute(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => ServiceConfig::from_file(path)?,
        None => ServiceConfig::default(),
    };
    let store = SqliteStore::open(&config.db_path)?;
    let fetcher = HttpFetcher::new(&config.ingest)?;
    let ingestor = Arc::new(Ingestor::new(store, fetcher, config.ingest.clone()));

    match cli.command {
        Commands::Serve => serve(config.listen_addr, ingestor),
        Commands::Refresh { scope } => {
            let scope = match scope {
                RefreshScope::Global => Scope::Global,
                RefreshScope::Country => Scope::Country,
                RefreshScope::Province { name } => Scope::Province(name),
            };
            // Failures propagate to the exit code; stdout reports what
            // a completed pass did (insert, replace, or noop).
            let action = ingestor.try_refresh(&scope)?;
            println!("{}", action.label());
            Ok(())
        }
    }
}

#[tokio::main]
async fn serve(addr: String, ingestor: Arc<Ingestor<SqliteStore, HttpFetcher>>) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(&addr).await.map_err(|e| {
        IngestError::InvalidConfig {
            reason: format!("cannot bind {}: {}", addr, e),
        }
    })?;
    tracing::info!(addr = %addr, "listening");
    axum::serve(listener, routes::router(ingestor))
        .await
        .map_err(|e| IngestError::InvalidConfig {
            reason: format!("http server: {}", e),
        })
}
