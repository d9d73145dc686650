use super::RequestsLoggingLevel;
use crate::config::DEFAULT_LOGIN_REQUESTS_PER_MINUTE;
use std::path::PathBuf;

/// Largest accepted song upload.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 100 * 1024 * 1024;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub requests_logging_level: RequestsLoggingLevel,
    pub port: u16,
    pub metrics_port: u16,
    pub media_path: PathBuf,
    pub login_requests_per_minute: u32,
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            requests_logging_level: RequestsLoggingLevel::Path,
            port: 3001,
            metrics_port: 9091,
            media_path: PathBuf::from("media"),
            login_requests_per_minute: DEFAULT_LOGIN_REQUESTS_PER_MINUTE,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}
