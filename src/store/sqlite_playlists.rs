use super::pagination::{like_pattern, PageRequest, Paged};
use super::SqliteMusicStore;
use crate::catalog::Genre;
use crate::playlist::{
    NewPlaylist, Playlist, PlaylistQuery, PlaylistScope, PlaylistSongEntry, PlaylistStore,
    PlaylistUpdate,
};
use anyhow::Result;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, OptionalExtension, Row};

const PLAYLIST_SELECT: &str = "SELECT p.id, p.name, p.description, p.created_by,
        u.username AS created_by_name, p.is_public,
        (SELECT COUNT(*) FROM playlist_song ps WHERE ps.playlist_id = p.id) AS song_count,
        p.created_at, p.updated_at
    FROM playlist p JOIN app_user u ON u.id = p.created_by";

fn row_to_playlist(row: &Row) -> rusqlite::Result<Playlist> {
    Ok(Playlist {
        id: row.get("id")?,
        name: row.get("name")?,
        description: row.get("description")?,
        created_by: row.get("created_by")?,
        created_by_name: row.get("created_by_name")?,
        is_public: row.get("is_public")?,
        song_count: row.get("song_count")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

impl PlaylistStore for SqliteMusicStore {
    fn create_playlist(&self, playlist: &NewPlaylist, now: i64) -> Result<i64> {
        let conn = self.conn();
        conn.execute(
            "INSERT INTO playlist (name, description, created_by, is_public, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
            params![
                playlist.name,
                playlist.description,
                playlist.created_by,
                playlist.is_public,
                now
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    fn get_playlist(&self, playlist_id: i64) -> Result<Option<Playlist>> {
        let conn = self.conn();
        let playlist = conn
            .query_row(
                &format!("{} WHERE p.id = ?1", PLAYLIST_SELECT),
                params![playlist_id],
                row_to_playlist,
            )
            .optional()?;
        Ok(playlist)
    }

    fn update_playlist(
        &self,
        playlist_id: i64,
        update: &PlaylistUpdate,
        now: i64,
    ) -> Result<bool> {
        let mut assignments = vec!["updated_at = ?"];
        let mut values = vec![Value::Integer(now)];
        if let Some(name) = &update.name {
            assignments.push("name = ?");
            values.push(Value::Text(name.clone()));
        }
        if let Some(description) = &update.description {
            assignments.push("description = ?");
            values.push(description.clone().map_or(Value::Null, Value::Text));
        }
        if let Some(is_public) = update.is_public {
            assignments.push("is_public = ?");
            values.push(Value::Integer(is_public as i64));
        }
        values.push(Value::Integer(playlist_id));

        let conn = self.conn();
        let changed = conn.execute(
            &format!("UPDATE playlist SET {} WHERE id = ?", assignments.join(", ")),
            params_from_iter(values),
        )?;
        Ok(changed > 0)
    }

    fn delete_playlist(&self, playlist_id: i64) -> Result<bool> {
        let conn = self.conn();
        let deleted = conn.execute("DELETE FROM playlist WHERE id = ?1", params![playlist_id])?;
        Ok(deleted > 0)
    }

    fn list_playlists(&self, query: &PlaylistQuery, page: PageRequest) -> Result<Paged<Playlist>> {
        let mut conditions: Vec<&str> = Vec::new();
        let mut values: Vec<Value> = Vec::new();
        if let PlaylistScope::VisibleTo(user_id) = query.scope {
            conditions.push("(p.is_public = 1 OR p.created_by = ?)");
            values.push(Value::Integer(user_id));
        }
        if let Some(is_public) = query.is_public {
            conditions.push("p.is_public = ?");
            values.push(Value::Integer(is_public as i64));
        }
        if let Some(created_by) = query.created_by {
            conditions.push("p.created_by = ?");
            values.push(Value::Integer(created_by));
        }
        if let Some(search) = query.search.as_deref().filter(|s| !s.is_empty()) {
            conditions.push("(p.name LIKE ? ESCAPE '\\' OR p.description LIKE ? ESCAPE '\\')");
            let pattern = like_pattern(search);
            values.push(Value::Text(pattern.clone()));
            values.push(Value::Text(pattern));
        }
        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", conditions.join(" AND "))
        };

        let conn = self.conn();
        let count: i64 = conn.query_row(
            &format!("SELECT COUNT(*) FROM playlist p{}", where_clause),
            params_from_iter(values.iter()),
            |row| row.get(0),
        )?;

        let sql = format!(
            "{}{} ORDER BY {}, p.id {} LIMIT {} OFFSET {}",
            PLAYLIST_SELECT,
            where_clause,
            query.sort.order_by_sql(),
            if query.sort.descending { "DESC" } else { "ASC" },
            page.limit(),
            page.offset()
        );
        let mut stmt = conn.prepare(&sql)?;
        let results = stmt
            .query_map(params_from_iter(values.iter()), row_to_playlist)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(Paged {
            count: count as usize,
            results,
        })
    }

    fn add_playlist_song(
        &self,
        playlist_id: i64,
        song_id: i64,
        order: i64,
        now: i64,
    ) -> Result<bool> {
        let mut conn = self.conn();
        let tx = conn.transaction()?;
        let inserted = tx.execute(
            "INSERT OR IGNORE INTO playlist_song (playlist_id, song_id, position, added_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![playlist_id, song_id, order, now],
        )?;
        if inserted > 0 {
            tx.execute(
                "UPDATE playlist SET updated_at = ?1 WHERE id = ?2",
                params![now, playlist_id],
            )?;
        }
        tx.commit()?;
        Ok(inserted > 0)
    }

    fn remove_playlist_song(&self, playlist_id: i64, song_id: i64) -> Result<bool> {
        let conn = self.conn();
        let deleted = conn.execute(
            "DELETE FROM playlist_song WHERE playlist_id = ?1 AND song_id = ?2",
            params![playlist_id, song_id],
        )?;
        Ok(deleted > 0)
    }

    fn get_playlist_songs(&self, playlist_id: i64) -> Result<Vec<PlaylistSongEntry>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT s.id, s.title, s.artist, s.genre, s.duration, ps.position, ps.added_at
             FROM playlist_song ps JOIN song s ON s.id = ps.song_id
             WHERE ps.playlist_id = ?1
             ORDER BY ps.position ASC, ps.added_at ASC, ps.id ASC",
        )?;
        let songs = stmt
            .query_map(params![playlist_id], |row| {
                let genre: String = row.get(3)?;
                Ok(PlaylistSongEntry {
                    id: row.get(0)?,
                    title: row.get(1)?,
                    artist: row.get(2)?,
                    genre: Genre::from_str(&genre).unwrap_or(Genre::Other),
                    duration: row.get(4)?,
                    order: row.get(5)?,
                    added_at: row.get(6)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(songs)
    }
}
