//! Loanstats CLI - Main entry point

use clap::{Parser, Subcommand};
use loanstats_config::ConfigLoader;
use loanstats_server::{commands, AppContext};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "loanstats")]
#[command(about = "Loanstats - loan approval aggregate service", long_about = None)]
struct Cli {
    /// Config file path (defaults are used when it does not exist)
    #[arg(short, long, default_value = "loanstats.toml")]
    config: PathBuf,

    /// Log level, overrides server.log_level (RUST_LOG still wins)
    #[arg(long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API and the ingest workers
    Serve {
        /// JSONL file of payloads to enqueue at startup
        #[arg(long)]
        seed: Option<PathBuf>,
    },

    /// Ingest a JSONL file of payloads and exit once drained
    Ingest {
        /// One JSON payload per line
        file: PathBuf,
    },

    /// Print the current aggregate
    Show,

    /// Mint a bearer token
    Token {
        /// Subject claim
        #[arg(long)]
        sub: String,
        /// Role name, repeatable
        #[arg(long = "role")]
        roles: Vec<String>,
        /// Numeric role id (1=CLIENTE, 2=ASESOR, 3=ADMIN)
        #[arg(long)]
        role_id: Option<String>,
    },

    /// Validate configuration and exit
    Check,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let loader = ConfigLoader::load_file_or_default(&cli.config)?;
    let config = loader.into_config();

    // Initialize tracing
    let level = cli
        .log_level
        .clone()
        .unwrap_or_else(|| config.server.log_level.clone());
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&level)))
        .init();

    if let Commands::Check = cli.command {
        println!("✅ Configuration OK ({})", cli.config.display());
        println!("   listen:  {}", config.server.listen);
        println!("   backend: {:?}", config.store.backend);
        println!("   metric:  {}", config.store.metric_id);
        return Ok(());
    }

    // Create application context
    let ctx = AppContext::new(config).await?;

    match cli.command {
        Commands::Serve { seed } => {
            commands::serve(&ctx, seed.as_deref()).await?;
        }

        Commands::Ingest { file } => {
            let report = commands::ingest(&ctx, &file).await?;
            println!(
                "✅ Ingested {} messages: {} acked, {} nacked, {} dead-lettered",
                report.sent, report.summary.acked, report.summary.nacked, report.dead_letters
            );
            if let Some(aggregate) = commands::show(&ctx).await? {
                println!("{}", serde_json::to_string_pretty(&aggregate)?);
            }
        }

        Commands::Show => match commands::show(&ctx).await? {
            Some(aggregate) => println!("{}", serde_json::to_string_pretty(&aggregate)?),
            None => println!("No aggregate recorded yet"),
        },

        Commands::Token {
            sub,
            roles,
            role_id,
        } => {
            let token = commands::token(&ctx, &sub, &roles, role_id.as_deref())?;
            println!("{}", token);
        }

        Commands::Check => {}
    }

    Ok(())
}
