mod file_config;

pub use file_config::{AuthConfig, FileConfig};

use crate::server::{RequestsLoggingLevel, ServerConfig};
use anyhow::{bail, Result};
use clap::ValueEnum;
use rand::distr::Alphanumeric;
use rand::Rng;
use std::path::PathBuf;
use tracing::warn;

pub const DEFAULT_ACCESS_TOKEN_MINUTES: i64 = 60;
pub const DEFAULT_LOGIN_REQUESTS_PER_MINUTE: u32 = 100;

const GENERATED_SECRET_LEN: usize = 64;

/// CLI arguments that can be used for config resolution.
/// This struct mirrors the CLI arguments that can be overridden by TOML config.
#[derive(Debug, Clone)]
pub struct CliConfig {
    pub db_dir: Option<PathBuf>,
    pub media_path: Option<PathBuf>,
    pub port: u16,
    pub metrics_port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub jwt_secret: Option<String>,
    pub access_token_minutes: i64,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            db_dir: None,
            media_path: None,
            port: 3001,
            metrics_port: 9091,
            logging_level: RequestsLoggingLevel::default(),
            jwt_secret: None,
            access_token_minutes: DEFAULT_ACCESS_TOKEN_MINUTES,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub db_dir: PathBuf,
    pub media_path: PathBuf,
    pub port: u16,
    pub metrics_port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub auth: AuthSettings,
}

#[derive(Debug, Clone)]
pub struct AuthSettings {
    pub jwt_secret: String,
    pub access_token_minutes: i64,
    pub login_requests_per_minute: u32,
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        let db_dir = file
            .db_dir
            .map(PathBuf::from)
            .or_else(|| cli.db_dir.clone())
            .ok_or_else(|| {
                anyhow::anyhow!("db_dir must be specified via --db-dir or in config file")
            })?;

        if !db_dir.exists() {
            bail!("Database directory does not exist: {:?}", db_dir);
        }
        if !db_dir.is_dir() {
            bail!("db_dir is not a directory: {:?}", db_dir);
        }

        let media_path = file
            .media_path
            .map(PathBuf::from)
            .or_else(|| cli.media_path.clone())
            .unwrap_or_else(|| db_dir.join("media"));

        let port = file.port.unwrap_or(cli.port);
        let metrics_port = file.metrics_port.unwrap_or(cli.metrics_port);

        let logging_level = file
            .logging_level
            .and_then(|s| parse_logging_level(&s))
            .unwrap_or_else(|| cli.logging_level.clone());

        let auth_file = file.auth.unwrap_or_default();
        let access_token_minutes = auth_file
            .access_token_minutes
            .unwrap_or(cli.access_token_minutes);
        if access_token_minutes <= 0 {
            bail!("access_token_minutes must be positive, got {}", access_token_minutes);
        }
        let jwt_secret = match auth_file.jwt_secret.or_else(|| cli.jwt_secret.clone()) {
            Some(secret) if !secret.is_empty() => secret,
            _ => {
                warn!("No JWT secret configured, generated a random one. Tokens will not survive a restart.");
                generate_secret()
            }
        };
        let auth = AuthSettings {
            jwt_secret,
            access_token_minutes,
            login_requests_per_minute: auth_file
                .login_requests_per_minute
                .unwrap_or(DEFAULT_LOGIN_REQUESTS_PER_MINUTE),
        };

        Ok(Self {
            db_dir,
            media_path,
            port,
            metrics_port,
            logging_level,
            auth,
        })
    }

    pub fn db_path(&self) -> PathBuf {
        self.db_dir.join("music.db")
    }

    pub fn server_config(&self) -> ServerConfig {
        ServerConfig {
            requests_logging_level: self.logging_level.clone(),
            port: self.port,
            metrics_port: self.metrics_port,
            media_path: self.media_path.clone(),
            login_requests_per_minute: self.auth.login_requests_per_minute,
            ..ServerConfig::default()
        }
    }
}

fn generate_secret() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(GENERATED_SECRET_LEN)
        .map(char::from)
        .collect()
}

/// Parses a logging level string into RequestsLoggingLevel.
/// Uses clap's ValueEnum trait for parsing.
fn parse_logging_level(s: &str) -> Option<RequestsLoggingLevel> {
    RequestsLoggingLevel::from_str(s, true).ok()
}
