use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod catalog_store;
use catalog_store::{CatalogStore, SqliteCatalogStore};

mod config;
use config::{AppConfig, CliConfig, FileConfig, DEFAULT_READ_POOL_SIZE};

mod server;
use server::{run_server, RequestsLoggingLevel, ServerConfig};

mod sqlite_persistence;

fn parse_path(s: &str) -> Result<PathBuf> {
    let path_buf = PathBuf::from(s);
    let original_path = match path_buf.canonicalize() {
        Ok(path) => path,
        Err(msg) => {
            if msg.kind() == std::io::ErrorKind::NotFound {
                path_buf
            } else {
                return Err(msg).with_context(|| format!("Error resolving path: {}", s));
            }
        }
    };
    if original_path.is_absolute() {
        return Ok(original_path);
    }
    let cwd = std::env::current_dir()?;
    Ok(cwd.join(original_path))
}

#[derive(Parser, Debug)]
struct CliArgs {
    /// Directory where the SQLite catalog database lives (or will be created).
    #[clap(long, value_parser = parse_path)]
    pub db_dir: Option<PathBuf>,

    /// Path to a TOML config file. Values in the file override CLI arguments.
    #[clap(long, value_parser = parse_path)]
    pub config: Option<PathBuf>,

    /// The port to listen on.
    #[clap(short, long, default_value_t = 3001)]
    pub port: u16,

    /// The level of logging to perform on each request.
    #[clap(long, default_value = "path")]
    pub logging_level: RequestsLoggingLevel,

    /// Number of read-only SQLite connections to pool.
    #[clap(long, default_value_t = DEFAULT_READ_POOL_SIZE)]
    pub read_pool_size: usize,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()?;

    let file_config = match &cli_args.config {
        Some(path) => Some(FileConfig::load(path)?),
        None => None,
    };

    let cli_config = CliConfig {
        db_dir: cli_args.db_dir,
        port: cli_args.port,
        logging_level: cli_args.logging_level,
        read_pool_size: cli_args.read_pool_size,
    };
    let app_config = AppConfig::resolve(&cli_config, file_config)?;

    let catalog_db_path = app_config.catalog_db_path();
    info!("Opening SQLite catalog database at {:?}...", catalog_db_path);
    let catalog_store = Arc::new(SqliteCatalogStore::new(
        &catalog_db_path,
        app_config.read_pool_size,
    )?);

    info!(
        "Catalog loaded: {} authors, {} publishers, {} books",
        catalog_store.authors_count(),
        catalog_store.publishers_count(),
        catalog_store.books_count(),
    );

    let server_config = ServerConfig {
        requests_logging_level: app_config.logging_level,
        port: app_config.port,
    };

    info!("Ready to serve at port {}!", server_config.port);
    run_server(server_config, catalog_store).await
}
