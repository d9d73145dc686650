/// A unit of deferred work, carrying only ids so that the worker reads
/// fresh state when it runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskIntent {
    SendWelcomeEmail { user_id: i64 },
    WelcomeNotification { user_id: i64 },
    NewSongFanOut { song_id: i64, uploader_id: i64 },
    PlaylistUpdateFanOut { playlist_id: i64, song_id: i64 },
}

impl TaskIntent {
    pub fn kind(&self) -> &'static str {
        match self {
            TaskIntent::SendWelcomeEmail { .. } => "send_welcome_email",
            TaskIntent::WelcomeNotification { .. } => "welcome_notification",
            TaskIntent::NewSongFanOut { .. } => "new_song_fan_out",
            TaskIntent::PlaylistUpdateFanOut { .. } => "playlist_update_fan_out",
        }
    }
}

impl std::fmt::Display for TaskIntent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskIntent::SendWelcomeEmail { user_id } | TaskIntent::WelcomeNotification { user_id } => {
                write!(f, "{}(user={})", self.kind(), user_id)
            }
            TaskIntent::NewSongFanOut {
                song_id,
                uploader_id,
            } => write!(f, "{}(song={}, uploader={})", self.kind(), song_id, uploader_id),
            TaskIntent::PlaylistUpdateFanOut {
                playlist_id,
                song_id,
            } => write!(f, "{}(playlist={}, song={})", self.kind(), playlist_id, song_id),
        }
    }
}
