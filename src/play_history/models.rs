use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlayLogEntry {
    pub id: i64,
    #[serde(rename = "user")]
    pub user_id: i64,
    pub user_name: String,
    #[serde(rename = "song")]
    pub song_id: i64,
    pub song_title: String,
    pub song_artist: String,
    pub played_at: i64,
    pub ip_address: Option<String>,
    #[serde(skip)]
    pub user_agent: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewPlayLog {
    pub user_id: i64,
    pub song_id: i64,
    pub played_at: i64,
    pub ip_address: Option<String>,
    pub user_agent: String,
}

#[derive(Debug, Clone, Default)]
pub struct PlayLogQuery {
    /// Restrict to one user's entries.
    pub user_id: Option<i64>,
    pub song_id: Option<i64>,
}

/// Filter for aggregate counts.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlayWindow {
    pub user_id: Option<i64>,
    /// Inclusive lower bound on `played_at`.
    pub since: Option<i64>,
    /// Inclusive upper bound on `played_at`.
    pub until: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SongPlayCount {
    #[serde(rename = "song__title")]
    pub title: String,
    #[serde(rename = "song__artist")]
    pub artist: String,
    pub play_count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenrePlayCount {
    #[serde(rename = "song__genre")]
    pub genre: String,
    pub play_count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserPlayCount {
    #[serde(rename = "user__username")]
    pub username: String,
    pub play_count: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct UserPlayStats {
    pub total_plays: i64,
    pub weekly_plays: i64,
    pub most_played_songs: Vec<SongPlayCount>,
    pub genre_preferences: Vec<GenrePlayCount>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GlobalPlayStats {
    pub total_plays: i64,
    pub unique_users: i64,
    pub most_played_songs: Vec<SongPlayCount>,
    pub most_active_users: Vec<UserPlayCount>,
}
