use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::bail;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use setlist::config::ServerConfig;
use setlist::server::{AppState, create_router};
use setlist::store::{SqliteStore, Store};

#[derive(Parser)]
#[command(name = "setlist")]
#[command(about = "A playlist service with owner-scoped, gapless ordering", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the data directory and database schema
    Init {
        /// Data directory for the database
        #[arg(long, default_value = "./data")]
        data_dir: String,
    },

    /// Start the server
    Serve {
        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port to bind to
        #[arg(long, short, default_value = "8080")]
        port: u16,

        /// Data directory for the database
        #[arg(long, default_value = "./data")]
        data_dir: String,

        /// Milliseconds a transaction may wait for the database write lock
        #[arg(long, default_value = "5000")]
        busy_timeout_ms: u64,
    },
}

fn run_init(data_dir: String) -> anyhow::Result<()> {
    let config = ServerConfig {
        data_dir: PathBuf::from(data_dir),
        ..Default::default()
    };
    config.ensure_data_dir()?;

    let db_path = config.db_path();
    let store = SqliteStore::new(&db_path)?;
    store.initialize()?;

    println!("Initialized database at {}", db_path.display());
    Ok(())
}

async fn run_serve(config: ServerConfig) -> anyhow::Result<()> {
    config.validate()?;

    let db_path = config.db_path();
    if !db_path.exists() {
        bail!("Database not found at {}. Run 'setlist init' first.", db_path.display());
    }

    let store = SqliteStore::with_busy_timeout(&db_path, config.busy_timeout)?;
    store.initialize()?;

    info!("Using database at {}", db_path.display());

    let state = Arc::new(AppState::new(Arc::new(store)));
    let app = create_router(state);
    let addr = config.socket_addr()?;

    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("setlist=info".parse()?))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init { data_dir } => run_init(data_dir)?,
        Commands::Serve {
            host,
            port,
            data_dir,
            busy_timeout_ms,
        } => {
            let config = ServerConfig {
                host,
                port,
                data_dir: data_dir.into(),
                busy_timeout: Duration::from_millis(busy_timeout_ms),
            };
            run_serve(config).await?;
        }
    }

    Ok(())
}
