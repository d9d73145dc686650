use crate::catalog::Genre;
use crate::store::{Sort, SortField};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Playlist {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub created_by: i64,
    pub created_by_name: String,
    pub is_public: bool,
    pub song_count: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone)]
pub struct NewPlaylist {
    pub name: String,
    pub description: Option<String>,
    pub created_by: i64,
    pub is_public: bool,
}

#[derive(Debug, Clone, Default)]
pub struct PlaylistUpdate {
    pub name: Option<String>,
    /// `Some(None)` clears the description.
    pub description: Option<Option<String>>,
    pub is_public: Option<bool>,
}

/// A song as it appears inside a playlist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlaylistSongEntry {
    pub id: i64,
    pub title: String,
    pub artist: String,
    pub genre: Genre,
    pub duration: Option<i64>,
    pub order: i64,
    pub added_at: i64,
}

/// Which playlists a listing may return.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaylistScope {
    All,
    /// Public playlists plus the ones owned by this user.
    VisibleTo(i64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaylistSortField {
    CreatedAt,
    UpdatedAt,
    Name,
}

impl SortField for PlaylistSortField {
    fn parse(name: &str) -> Option<Self> {
        match name {
            "created_at" => Some(PlaylistSortField::CreatedAt),
            "updated_at" => Some(PlaylistSortField::UpdatedAt),
            "name" => Some(PlaylistSortField::Name),
            _ => None,
        }
    }

    fn column(&self) -> &'static str {
        match self {
            PlaylistSortField::CreatedAt => "p.created_at",
            PlaylistSortField::UpdatedAt => "p.updated_at",
            PlaylistSortField::Name => "p.name",
        }
    }
}

pub type PlaylistSort = Sort<PlaylistSortField>;

#[derive(Debug, Clone)]
pub struct PlaylistQuery {
    pub scope: PlaylistScope,
    pub is_public: Option<bool>,
    pub created_by: Option<i64>,
    /// Case-insensitive substring over name and description.
    pub search: Option<String>,
    pub sort: PlaylistSort,
}

impl PlaylistQuery {
    pub fn new(scope: PlaylistScope) -> Self {
        Self {
            scope,
            is_public: None,
            created_by: None,
            search: None,
            sort: PlaylistSort {
                field: PlaylistSortField::UpdatedAt,
                descending: true,
            },
        }
    }
}

/// Result of adding a song to a playlist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddSongOutcome {
    /// False when the song was already in the playlist.
    pub created: bool,
    pub song_title: String,
}
