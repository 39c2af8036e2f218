use clap::Parser;
use eyre::{Context, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;

use flatstore::cli::{Cli, Command};
use flatstore::request::parse_fields;
use flatstore::{RecordStore, SearchRequest, StoreConfig};

fn setup_logging() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| eyre::eyre!(e))
}

#[tokio::main]
async fn main() -> Result<()> {
    setup_logging().context("Failed to setup logging")?;

    let cli = Cli::parse();
    let mut config =
        StoreConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;
    if let Some(base_url) = cli.base_url {
        config.base_url = base_url;
    }

    info!("flatstore starting");
    let store = RecordStore::connect(config).context("Failed to connect to record store")?;

    match cli.command {
        Command::Lookup { key } => {
            let record = store.get(&key).await?;
            println!("{}", serde_json::to_string_pretty(&record)?);
        }
        Command::Search {
            query,
            limit,
            skip,
            fields,
        } => {
            let mut request = SearchRequest::new(query.join(" ")).with_skip(skip);
            if let Some(limit) = limit {
                request = request.with_limit(limit);
            }
            if let Some(fields) = fields {
                request = request.with_fields(parse_fields(&fields)?);
            }
            let page = store.search(&request).await?;
            println!("{}", serde_json::to_string_pretty(&page)?);
        }
        Command::ScanKey { key } => {
            let record = store.scan_for_key(&key).await?;
            println!("{}", serde_json::to_string_pretty(&record)?);
        }
    }

    Ok(())
}
