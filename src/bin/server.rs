//! HTTP server for the e-commerce data agent

use ecom_data_agent::execution::ExecutionPolicy;
use ecom_data_agent::logging::init_logging;
use ecom_data_agent::{build_pipeline, server, AppConfig};

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "server")]
#[command(about = "Serve the natural-language query API over HTTP")]
struct Args {
    /// Address to bind (or set ECOM_BIND_ADDR)
    #[arg(long)]
    bind: Option<String>,

    /// Path to the SQLite store (or set ECOM_DB_PATH)
    #[arg(long)]
    db_path: Option<PathBuf>,

    /// Allow statements other than single read-only queries
    #[arg(long)]
    allow_writes: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    init_logging();

    let args = Args::parse();
    let mut config = AppConfig::from_env()?;
    if let Some(bind) = args.bind {
        config.bind_addr = bind;
    }
    if let Some(path) = args.db_path {
        config.db_path = path;
    }
    if args.allow_writes {
        config.policy = ExecutionPolicy::Permissive;
    }

    if config.llm.api_key.is_some() {
        info!("Gemini API key found, model {}", config.llm.model);
    } else {
        warn!("GOOGLE_GEMINI_API_KEY not set, every question will fail translation");
    }
    if !config.db_path.exists() {
        warn!("Store {} does not exist yet (run `ecom-agent init-db`)", config.db_path.display());
    }
    info!("Execution policy: {:?}", config.policy);

    let pipeline = Arc::new(build_pipeline(&config)?);
    let listener = TcpListener::bind(&config.bind_addr).await?;

    server::serve(listener, pipeline).await?;
    Ok(())
}
