//! The "recent activity" feed shown on the dashboard.

use super::models::{ActivityItem, ActivityKind, CreatedPlaylist, JoinedUser};
use crate::play_history::PlayLogEntry;

pub const ACTIVITY_PLAYS: usize = 3;
pub const ACTIVITY_PLAYLISTS: usize = 2;
pub const ACTIVITY_USERS: usize = 1;
pub const ACTIVITY_LIMIT: usize = 5;

/// Merges the newest events of each kind into one feed, newest first.
/// Events with equal timestamps keep plays before playlists before users.
pub fn merge_recent_activity(
    plays: &[PlayLogEntry],
    playlists: &[CreatedPlaylist],
    users: &[JoinedUser],
) -> Vec<ActivityItem> {
    let plays = plays.iter().take(ACTIVITY_PLAYS).map(|play| ActivityItem {
        kind: ActivityKind::Play,
        message: format!("{} played {}", play.user_name, play.song_title),
        timestamp: play.played_at,
    });
    let playlists = playlists
        .iter()
        .take(ACTIVITY_PLAYLISTS)
        .map(|playlist| ActivityItem {
            kind: ActivityKind::Playlist,
            message: format!("{} created playlist {}", playlist.created_by_name, playlist.name),
            timestamp: playlist.created_at,
        });
    let users = users.iter().take(ACTIVITY_USERS).map(|user| ActivityItem {
        kind: ActivityKind::User,
        message: format!("{} joined", user.username),
        timestamp: user.created_at,
    });

    let mut items: Vec<_> = plays.chain(playlists).chain(users).collect();
    items.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    items.truncate(ACTIVITY_LIMIT);
    items
}
