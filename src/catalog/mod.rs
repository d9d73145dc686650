//! Songs and their stored audio files.

pub mod media;
mod models;
mod song_manager;
mod song_store;

pub use media::MediaStorage;
pub use models::{Genre, NewSong, Song, SongQuery, SongSort, SongSortField, SongUpdate};
pub use song_manager::{SongDownload, SongManager, SongUpload};
pub use song_store::SongStore;
