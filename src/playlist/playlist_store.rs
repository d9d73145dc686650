use super::models::{NewPlaylist, Playlist, PlaylistQuery, PlaylistSongEntry, PlaylistUpdate};
use crate::store::{PageRequest, Paged};
use anyhow::Result;

pub trait PlaylistStore: Send + Sync {
    fn create_playlist(&self, playlist: &NewPlaylist, now: i64) -> Result<i64>;

    /// Returns Ok(None) if the playlist does not exist.
    fn get_playlist(&self, playlist_id: i64) -> Result<Option<Playlist>>;

    /// Returns false if the playlist does not exist.
    fn update_playlist(&self, playlist_id: i64, update: &PlaylistUpdate, now: i64)
        -> Result<bool>;

    /// Returns false if the playlist does not exist.
    fn delete_playlist(&self, playlist_id: i64) -> Result<bool>;

    fn list_playlists(&self, query: &PlaylistQuery, page: PageRequest) -> Result<Paged<Playlist>>;

    /// Inserts the (playlist, song) membership unless it already exists.
    /// Returns true only when a new row was written, in which case the
    /// playlist's `updated_at` is bumped to `now` as well.
    fn add_playlist_song(&self, playlist_id: i64, song_id: i64, order: i64, now: i64)
        -> Result<bool>;

    /// Returns false if the song was not in the playlist.
    fn remove_playlist_song(&self, playlist_id: i64, song_id: i64) -> Result<bool>;

    /// Songs ordered by (order, added_at).
    fn get_playlist_songs(&self, playlist_id: i64) -> Result<Vec<PlaylistSongEntry>>;
}
