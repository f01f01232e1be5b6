use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

use harvester::web::{self, AppState};
use harvester::{Aggregator, Config, JobManager, SqliteStore, Storage};
use image_sources::{backends, ImageSource};

#[derive(Parser)]
#[command(name = "harvester")]
#[command(about = "Aggregate stock-photo search results into a local image metadata store")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file (defaults to ~/.image-harvester/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API server
    Serve {
        /// Port to listen on
        #[arg(long, short)]
        port: Option<u16>,
        /// Address to bind
        #[arg(long)]
        host: Option<String>,
    },
    /// Run one crawl job in the foreground and print the result
    Crawl {
        /// Search keyword
        keyword: String,
        /// Number of images to collect
        #[arg(long, short)]
        limit: Option<u32>,
    },
    /// List crawl jobs, newest first
    Jobs,
    /// Query a single image source directly
    Search {
        /// pixabay, pexels, unsplash or google
        source: ImageSource,
        /// Search query
        query: String,
        /// Number of results to request
        #[arg(long, short, default_value_t = 10)]
        count: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    harvest_common::init_tracing("harvester", cli.verbose)?;

    let config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Serve { port, host } => {
            let store = open_store(&config)?;
            let state = AppState::from_config(store, &config)?;
            let host = host.unwrap_or_else(|| config.server.host.clone());
            let port = port.unwrap_or(config.server.port);
            web::serve(state, &host, port).await?;
        }
        Commands::Crawl { keyword, limit } => {
            run_crawl(&config, &keyword, limit).await?;
        }
        Commands::Jobs => {
            let store = open_store(&config)?;
            let jobs = store.list_jobs()?;
            println!("{}", serde_json::to_string_pretty(&jobs)?);
        }
        Commands::Search {
            source,
            query,
            count,
        } => {
            let client = config.sources.build_client()?;
            let backend = backends::for_source(source, &config.sources, client);
            if !backend.is_available() {
                eprintln!("{} is not configured; no request sent", source);
            }
            let images = backend.search(&query, count).await?;
            println!("{}", serde_json::to_string_pretty(&images)?);
        }
    }

    Ok(())
}

fn open_store(config: &Config) -> Result<Arc<dyn Storage>> {
    let store = match &config.database.path {
        Some(path) => SqliteStore::open_at(path.clone())?,
        None => SqliteStore::open()?,
    };
    Ok(Arc::new(store))
}

async fn run_crawl(config: &Config, keyword: &str, limit: Option<u32>) -> Result<()> {
    let limit = limit.unwrap_or(config.crawl.default_limit);
    if keyword.trim().is_empty() || limit == 0 {
        anyhow::bail!("keyword must not be empty and limit must be at least 1");
    }

    let store = open_store(config)?;
    let aggregator = Aggregator::from_config(&config.sources)?
        .surface_source_errors(config.crawl.surface_source_errors);
    let jobs = JobManager::new(store, Arc::new(aggregator));

    let job_id = jobs.create(keyword, limit)?;
    jobs.run(&job_id, keyword, limit).await?;

    let job = jobs
        .get(&job_id)?
        .with_context(|| format!("Job {} disappeared", job_id))?;
    println!("{}", serde_json::to_string_pretty(&job)?);

    Ok(())
}
