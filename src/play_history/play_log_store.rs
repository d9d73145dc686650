use super::models::{
    GenrePlayCount, NewPlayLog, PlayLogEntry, PlayLogQuery, PlayWindow, SongPlayCount,
    UserPlayCount,
};
use crate::store::{PageRequest, Paged};
use anyhow::Result;

/// Append-only play history. Rankings are by count descending, ties by the
/// grouping key ascending.
pub trait PlayLogStore: Send + Sync {
    fn insert_play_log(&self, entry: &NewPlayLog) -> Result<i64>;

    /// Returns Ok(None) if the entry does not exist.
    fn get_play_log(&self, play_log_id: i64) -> Result<Option<PlayLogEntry>>;

    /// Newest first.
    fn list_play_logs(&self, query: &PlayLogQuery, page: PageRequest)
        -> Result<Paged<PlayLogEntry>>;

    /// Newest first, across all users.
    fn recent_play_logs(&self, limit: usize) -> Result<Vec<PlayLogEntry>>;

    fn count_plays(&self, window: PlayWindow) -> Result<i64>;

    fn count_distinct_listeners(&self) -> Result<i64>;

    fn top_songs(&self, user_id: Option<i64>, limit: usize) -> Result<Vec<SongPlayCount>>;

    fn top_genres(&self, user_id: Option<i64>, limit: usize) -> Result<Vec<GenrePlayCount>>;

    fn top_listeners(&self, limit: usize) -> Result<Vec<UserPlayCount>>;
}
