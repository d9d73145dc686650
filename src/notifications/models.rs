//! Notification data models

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    PlaylistUpdate,
    NewSong,
    Welcome,
    #[default]
    General,
}

impl NotificationType {
    pub fn as_str(self) -> &'static str {
        match self {
            NotificationType::PlaylistUpdate => "playlist_update",
            NotificationType::NewSong => "new_song",
            NotificationType::Welcome => "welcome",
            NotificationType::General => "general",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "playlist_update" => Some(NotificationType::PlaylistUpdate),
            "new_song" => Some(NotificationType::NewSong),
            "welcome" => Some(NotificationType::Welcome),
            "general" => Some(NotificationType::General),
            _ => None,
        }
    }
}

/// A notification in a user's inbox.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub id: i64,
    #[serde(skip)]
    pub user_id: i64,
    pub title: String,
    pub message: String,
    pub notification_type: NotificationType,
    pub is_read: bool,
    pub created_at: i64,
    /// Set once, on the first transition to read.
    pub read_at: Option<i64>,
    pub related_playlist: Option<i64>,
    pub related_playlist_name: Option<String>,
    pub related_song: Option<i64>,
    pub related_song_title: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewNotification {
    pub user_id: i64,
    pub title: String,
    pub message: String,
    pub notification_type: NotificationType,
    pub related_playlist: Option<i64>,
    pub related_song: Option<i64>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NotificationQuery {
    pub is_read: Option<bool>,
    pub notification_type: Option<NotificationType>,
}
