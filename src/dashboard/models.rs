use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardStats {
    pub total_songs: i64,
    pub total_playlists: i64,
    pub total_users: i64,
    pub plays_today: i64,
    pub recent_plays: Vec<RecentPlay>,
    pub top_playlists: Vec<TopPlaylist>,
    pub genre_stats: Vec<GenreStat>,
    pub recent_activity: Vec<ActivityItem>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecentPlay {
    pub id: i64,
    pub user_name: String,
    pub song_title: String,
    pub song_artist: String,
    pub played_at: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopPlaylist {
    pub id: i64,
    pub name: String,
    pub created_by_name: String,
    pub song_count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenreCount {
    pub genre: String,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenreStat {
    pub genre: String,
    pub count: i64,
    /// Share of all songs, rounded to one decimal.
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedPlaylist {
    pub name: String,
    pub created_by_name: String,
    pub created_at: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinedUser {
    pub username: String,
    pub created_at: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    Play,
    Playlist,
    User,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActivityItem {
    #[serde(rename = "type")]
    pub kind: ActivityKind,
    pub message: String,
    pub timestamp: i64,
}
