use ecom_data_agent::execution::{bootstrap_schema, ExecutionPolicy};
use ecom_data_agent::logging::init_logging;
use ecom_data_agent::{build_pipeline, AppConfig, SchemaDescriptor};

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(name = "ecom-agent")]
#[command(about = "Ask questions about e-commerce ad and sales metrics in plain language")]
#[command(version)]
struct Args {
    /// Path to the SQLite store (or set ECOM_DB_PATH)
    #[arg(long, global = true)]
    db_path: Option<PathBuf>,

    /// Allow statements other than single read-only queries
    #[arg(long, global = true)]
    allow_writes: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Translate a question to SQL, run it and print the response as JSON
    Ask {
        /// The question in natural language
        question: String,
    },
    /// Print the schema context handed to the language model
    Schema,
    /// Create the metric tables in the store if they do not exist
    InitDb,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    init_logging();

    let args = Args::parse();

    let mut config = AppConfig::from_env()?;
    if let Some(path) = args.db_path {
        config.db_path = path;
    }
    if args.allow_writes {
        config.policy = ExecutionPolicy::Permissive;
    }

    match args.command {
        Commands::Ask { question } => {
            let pipeline = build_pipeline(&config)?;
            let response = pipeline.answer(&question).await?;
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        Commands::Schema => {
            println!("{}", SchemaDescriptor::describe().prompt_context());
        }
        Commands::InitDb => {
            info!("Initializing schema in {}", config.db_path.display());
            bootstrap_schema(&config.db_path, &SchemaDescriptor::describe())?;
            println!("Schema ready at {}", config.db_path.display());
        }
    }

    Ok(())
}
