//! Named, ordered song collections.

mod models;
mod playlist_manager;
mod playlist_store;

pub use models::{
    AddSongOutcome, NewPlaylist, Playlist, PlaylistQuery, PlaylistScope, PlaylistSongEntry,
    PlaylistSort, PlaylistSortField, PlaylistUpdate,
};
pub use playlist_manager::{PlaylistDetail, PlaylistDraft, PlaylistManager};
pub use playlist_store::PlaylistStore;
