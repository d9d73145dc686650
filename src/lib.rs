//! Music Catalog Server Library
//!
//! This library exposes the internal modules for testing and potential reuse.

pub mod authorization;
pub mod catalog;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod notifications;
pub mod play_history;
pub mod playlist;
pub mod server;
pub mod sqlite_persistence;
pub mod store;
pub mod tasks;
pub mod user;

// Re-export commonly used types for convenience
pub use error::{AppError, AppResult};
pub use server::{make_app, run_server, RequestsLoggingLevel, ServerConfig};
pub use store::{FullStore, SqliteMusicStore};
pub use tasks::{LoggingMailer, TaskQueue, TaskWorker};
pub use user::{TokenIssuer, UserRole};
