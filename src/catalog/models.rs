use crate::store::SortField;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Genre {
    Rock,
    Pop,
    Jazz,
    Classical,
    Electronic,
    HipHop,
    Country,
    Blues,
    Reggae,
    Folk,
    Other,
}

impl Genre {
    pub const ALL: [Genre; 11] = [
        Genre::Rock,
        Genre::Pop,
        Genre::Jazz,
        Genre::Classical,
        Genre::Electronic,
        Genre::HipHop,
        Genre::Country,
        Genre::Blues,
        Genre::Reggae,
        Genre::Folk,
        Genre::Other,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Genre::Rock => "rock",
            Genre::Pop => "pop",
            Genre::Jazz => "jazz",
            Genre::Classical => "classical",
            Genre::Electronic => "electronic",
            Genre::HipHop => "hip_hop",
            Genre::Country => "country",
            Genre::Blues => "blues",
            Genre::Reggae => "reggae",
            Genre::Folk => "folk",
            Genre::Other => "other",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        Genre::ALL.into_iter().find(|g| g.as_str() == s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Song {
    pub id: i64,
    pub title: String,
    pub artist: String,
    pub genre: Genre,
    pub description: Option<String>,
    /// Seconds.
    pub duration: Option<i64>,
    /// Relative to the media root, `/` separated.
    pub file_path: String,
    pub file_size: i64,
    pub uploaded_by: i64,
    pub uploaded_by_name: String,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Song {
    pub fn filename(&self) -> &str {
        self.file_path
            .rsplit('/')
            .next()
            .unwrap_or(self.file_path.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct NewSong {
    pub title: String,
    pub artist: String,
    pub genre: Genre,
    pub description: Option<String>,
    pub duration: Option<i64>,
    pub file_path: String,
    pub file_size: i64,
    pub uploaded_by: i64,
}

/// Metadata changes; the uploader and the stored file never change.
#[derive(Debug, Clone, Default)]
pub struct SongUpdate {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub genre: Option<Genre>,
    pub description: Option<String>,
    pub duration: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SongSortField {
    CreatedAt,
    Title,
    Artist,
}

impl SortField for SongSortField {
    fn parse(name: &str) -> Option<Self> {
        match name {
            "created_at" => Some(SongSortField::CreatedAt),
            "title" => Some(SongSortField::Title),
            "artist" => Some(SongSortField::Artist),
            _ => None,
        }
    }

    fn column(&self) -> &'static str {
        match self {
            SongSortField::CreatedAt => "s.created_at",
            SongSortField::Title => "s.title",
            SongSortField::Artist => "s.artist",
        }
    }
}

pub type SongSort = crate::store::Sort<SongSortField>;

#[derive(Debug, Clone)]
pub struct SongQuery {
    pub genre: Option<Genre>,
    pub artist: Option<String>,
    /// Case-insensitive substring over title, artist and genre.
    pub search: Option<String>,
    pub sort: SongSort,
}

impl Default for SongQuery {
    fn default() -> Self {
        Self {
            genre: None,
            artist: None,
            search: None,
            sort: SongSort {
                field: SongSortField::CreatedAt,
                descending: true,
            },
        }
    }
}
