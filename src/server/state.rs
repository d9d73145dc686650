use axum::extract::FromRef;

use crate::catalog::SongManager;
use crate::dashboard::DashboardManager;
use crate::notifications::NotificationManager;
use crate::play_history::PlayLogManager;
use crate::playlist::PlaylistManager;
use crate::user::UserManager;
use std::sync::Arc;
use std::time::Instant;

use super::ServerConfig;

pub type GuardedUserManager = Arc<UserManager>;
pub type GuardedSongManager = Arc<SongManager>;
pub type GuardedPlaylistManager = Arc<PlaylistManager>;
pub type GuardedPlayLogManager = Arc<PlayLogManager>;
pub type GuardedNotificationManager = Arc<NotificationManager>;
pub type GuardedDashboardManager = Arc<DashboardManager>;

#[derive(Clone)]
pub struct ServerState {
    pub config: ServerConfig,
    pub start_time: Instant,
    pub hash: String,
    pub user_manager: GuardedUserManager,
    pub song_manager: GuardedSongManager,
    pub playlist_manager: GuardedPlaylistManager,
    pub play_log_manager: GuardedPlayLogManager,
    pub notification_manager: GuardedNotificationManager,
    pub dashboard_manager: GuardedDashboardManager,
}

impl FromRef<ServerState> for ServerConfig {
    fn from_ref(input: &ServerState) -> Self {
        input.config.clone()
    }
}

impl FromRef<ServerState> for GuardedUserManager {
    fn from_ref(input: &ServerState) -> Self {
        input.user_manager.clone()
    }
}

impl FromRef<ServerState> for GuardedSongManager {
    fn from_ref(input: &ServerState) -> Self {
        input.song_manager.clone()
    }
}

impl FromRef<ServerState> for GuardedPlaylistManager {
    fn from_ref(input: &ServerState) -> Self {
        input.playlist_manager.clone()
    }
}

impl FromRef<ServerState> for GuardedPlayLogManager {
    fn from_ref(input: &ServerState) -> Self {
        input.play_log_manager.clone()
    }
}

impl FromRef<ServerState> for GuardedNotificationManager {
    fn from_ref(input: &ServerState) -> Self {
        input.notification_manager.clone()
    }
}

impl FromRef<ServerState> for GuardedDashboardManager {
    fn from_ref(input: &ServerState) -> Self {
        input.dashboard_manager.clone()
    }
}
