mod account_routes;
pub mod config;
mod dashboard_routes;
mod error;
mod extract;
mod http_layers;
pub mod metrics;
mod notification_routes;
mod play_log_routes;
mod playlist_routes;
pub mod server;
pub(self) mod session;
mod song_routes;
pub mod state;

pub use account_routes::REFRESH_COOKIE;
pub use config::ServerConfig;
pub use http_layers::*;
pub(self) use account_routes::make_account_routes;
pub(self) use dashboard_routes::make_dashboard_routes;
pub(self) use notification_routes::make_notification_routes;
pub(self) use play_log_routes::make_play_log_routes;
pub(self) use playlist_routes::make_playlist_routes;
pub(self) use song_routes::make_song_routes;
pub use server::{make_app, run_server};
