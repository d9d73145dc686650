use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use std::{fmt::Debug, path::PathBuf};
use tokio_util::sync::CancellationToken;
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use music_catalog_server::config::{AppConfig, CliConfig, FileConfig, DEFAULT_ACCESS_TOKEN_MINUTES};
use music_catalog_server::server::metrics;
use music_catalog_server::{
    run_server, FullStore, LoggingMailer, RequestsLoggingLevel, SqliteMusicStore, TaskQueue,
    TaskWorker, TokenIssuer,
};

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
    /// Directory holding the SQLite database (music.db).
    #[clap(long, value_parser = parse_path)]
    pub db_dir: Option<PathBuf>,

    /// Directory where uploaded audio files are stored. Defaults to <db-dir>/media.
    #[clap(long, value_parser = parse_path)]
    pub media_path: Option<PathBuf>,

    /// The port to listen on.
    #[clap(short, long, default_value_t = 3001)]
    pub port: u16,

    /// The port for the metrics server (Prometheus scraping).
    #[clap(long, default_value_t = 9091)]
    pub metrics_port: u16,

    /// The level of logging to perform on each request.
    #[clap(long, default_value = "path")]
    pub logging_level: RequestsLoggingLevel,

    /// Secret used to sign access and refresh tokens. Generated at startup when absent.
    #[clap(long)]
    pub jwt_secret: Option<String>,

    /// Lifetime of access tokens in minutes.
    #[clap(long, default_value_t = DEFAULT_ACCESS_TOKEN_MINUTES)]
    pub access_token_minutes: i64,

    /// Optional TOML config file. Its values override the command line.
    #[clap(long, value_parser = parse_path)]
    pub config: Option<PathBuf>,
}

impl CliArgs {
    fn to_cli_config(&self) -> CliConfig {
        CliConfig {
            db_dir: self.db_dir.clone(),
            media_path: self.media_path.clone(),
            port: self.port,
            metrics_port: self.metrics_port,
            logging_level: self.logging_level.clone(),
            jwt_secret: self.jwt_secret.clone(),
            access_token_minutes: self.access_token_minutes,
        }
    }
}

async fn shutdown_signal(token: CancellationToken) {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", err);
        return;
    }
    info!("Shutdown requested");
    token.cancel();
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
        .try_init()
        .context("Failed to install tracing subscriber")?;

    let file_config = match &cli_args.config {
        Some(path) => {
            info!("Loading config file {:?}", path);
            Some(FileConfig::load(path)?)
        }
        None => None,
    };
    let config = AppConfig::resolve(&cli_args.to_cli_config(), file_config)?;

    info!("Opening SQLite database at {:?}...", config.db_path());
    let store: Arc<dyn FullStore> = Arc::new(SqliteMusicStore::new(config.db_path())?);

    info!("Initializing metrics...");
    metrics::init_metrics();

    let shutdown = CancellationToken::new();
    tokio::spawn(shutdown_signal(shutdown.clone()));

    let (tasks, receiver) = TaskQueue::new();
    let worker = TaskWorker::new(store.clone(), Arc::new(LoggingMailer), receiver);
    let worker_handle = tokio::spawn(worker.run(shutdown.clone()));

    let tokens = TokenIssuer::new(&config.auth.jwt_secret, config.auth.access_token_minutes);
    let result = run_server(
        config.server_config(),
        store,
        tokens,
        tasks,
        shutdown.clone(),
    )
    .await;

    shutdown.cancel();
    if let Err(err) = worker_handle.await {
        tracing::warn!("Task worker ended abnormally: {}", err);
    }
    result
}
