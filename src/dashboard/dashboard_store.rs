use super::models::{CreatedPlaylist, GenreCount, JoinedUser, TopPlaylist};
use crate::playlist::PlaylistScope;
use anyhow::Result;

/// Read-only rollups over the whole catalog.
pub trait DashboardStore: Send + Sync {
    fn count_songs(&self) -> Result<i64>;

    fn count_playlists(&self) -> Result<i64>;

    fn count_users(&self) -> Result<i64>;

    /// Playlists within `scope` with the most songs first, ties by id.
    fn top_playlists_by_song_count(
        &self,
        scope: PlaylistScope,
        limit: usize,
    ) -> Result<Vec<TopPlaylist>>;

    /// Song count per genre, largest first.
    fn genre_song_counts(&self) -> Result<Vec<GenreCount>>;

    fn latest_playlists(&self, scope: PlaylistScope, limit: usize) -> Result<Vec<CreatedPlaylist>>;

    fn newest_users(&self, limit: usize) -> Result<Vec<JoinedUser>>;
}
