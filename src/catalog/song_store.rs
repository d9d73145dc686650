use super::models::{NewSong, Song, SongQuery, SongUpdate};
use crate::store::{PageRequest, Paged};
use anyhow::Result;

pub trait SongStore: Send + Sync {
    /// Inserts a song stamped with `now` and returns its id.
    fn create_song(&self, song: &NewSong, now: i64) -> Result<i64>;

    /// Returns Ok(None) if the song does not exist.
    fn get_song(&self, song_id: i64) -> Result<Option<Song>>;

    /// Returns false if the song does not exist.
    fn update_song(&self, song_id: i64, update: &SongUpdate, now: i64) -> Result<bool>;

    /// Deletes the song, cascading to play logs and playlist memberships.
    /// Returns false if the song does not exist.
    fn delete_song(&self, song_id: i64) -> Result<bool>;

    fn list_songs(&self, query: &SongQuery, page: PageRequest) -> Result<Paged<Song>>;
}
