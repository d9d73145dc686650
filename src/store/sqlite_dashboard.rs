use super::SqliteMusicStore;
use crate::dashboard::{CreatedPlaylist, DashboardStore, GenreCount, JoinedUser, TopPlaylist};
use crate::playlist::PlaylistScope;
use anyhow::Result;
use rusqlite::params;

/// Bound as `?2`; NULL lifts the visibility filter.
fn scope_viewer(scope: PlaylistScope) -> Option<i64> {
    match scope {
        PlaylistScope::All => None,
        PlaylistScope::VisibleTo(user_id) => Some(user_id),
    }
}

impl SqliteMusicStore {
    fn count_rows(&self, table: &str) -> Result<i64> {
        let conn = self.conn();
        let count = conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| {
            row.get(0)
        })?;
        Ok(count)
    }
}

impl DashboardStore for SqliteMusicStore {
    fn count_songs(&self) -> Result<i64> {
        self.count_rows("song")
    }

    fn count_playlists(&self) -> Result<i64> {
        self.count_rows("playlist")
    }

    fn count_users(&self) -> Result<i64> {
        self.count_rows("app_user")
    }

    fn top_playlists_by_song_count(
        &self,
        scope: PlaylistScope,
        limit: usize,
    ) -> Result<Vec<TopPlaylist>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT p.id, p.name, u.username, COUNT(ps.id) AS song_count
             FROM playlist p
             JOIN app_user u ON u.id = p.created_by
             LEFT JOIN playlist_song ps ON ps.playlist_id = p.id
             WHERE (?2 IS NULL OR p.is_public = 1 OR p.created_by = ?2)
             GROUP BY p.id
             ORDER BY song_count DESC, p.id ASC
             LIMIT ?1",
        )?;
        let rows = stmt
            .query_map(params![limit as i64, scope_viewer(scope)], |row| {
                Ok(TopPlaylist {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    created_by_name: row.get(2)?,
                    song_count: row.get(3)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    fn genre_song_counts(&self) -> Result<Vec<GenreCount>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT genre, COUNT(*) AS song_count FROM song
             GROUP BY genre ORDER BY song_count DESC, genre ASC",
        )?;
        let rows = stmt
            .query_map([], |row| {
                Ok(GenreCount {
                    genre: row.get(0)?,
                    count: row.get(1)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    fn latest_playlists(
        &self,
        scope: PlaylistScope,
        limit: usize,
    ) -> Result<Vec<CreatedPlaylist>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT p.name, u.username, p.created_at
             FROM playlist p JOIN app_user u ON u.id = p.created_by
             WHERE (?2 IS NULL OR p.is_public = 1 OR p.created_by = ?2)
             ORDER BY p.created_at DESC, p.id DESC
             LIMIT ?1",
        )?;
        let rows = stmt
            .query_map(params![limit as i64, scope_viewer(scope)], |row| {
                Ok(CreatedPlaylist {
                    name: row.get(0)?,
                    created_by_name: row.get(1)?,
                    created_at: row.get(2)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    fn newest_users(&self, limit: usize) -> Result<Vec<JoinedUser>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT username, created_at FROM app_user
             ORDER BY created_at DESC, id DESC
             LIMIT ?1",
        )?;
        let rows = stmt
            .query_map(params![limit as i64], |row| {
                Ok(JoinedUser {
                    username: row.get(0)?,
                    created_at: row.get(1)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }
}
