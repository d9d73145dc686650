use super::pagination::{PageRequest, Paged};
use super::SqliteMusicStore;
use crate::play_history::{
    GenrePlayCount, NewPlayLog, PlayLogEntry, PlayLogQuery, PlayLogStore, PlayWindow,
    SongPlayCount, UserPlayCount,
};
use anyhow::Result;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, OptionalExtension, Row};

const PLAY_LOG_SELECT: &str = "SELECT l.id, l.user_id, u.username AS user_name, l.song_id,
        s.title AS song_title, s.artist AS song_artist, l.played_at, l.ip_address, l.user_agent
    FROM play_log l
    JOIN app_user u ON u.id = l.user_id
    JOIN song s ON s.id = l.song_id";

fn row_to_play_log(row: &Row) -> rusqlite::Result<PlayLogEntry> {
    Ok(PlayLogEntry {
        id: row.get("id")?,
        user_id: row.get("user_id")?,
        user_name: row.get("user_name")?,
        song_id: row.get("song_id")?,
        song_title: row.get("song_title")?,
        song_artist: row.get("song_artist")?,
        played_at: row.get("played_at")?,
        ip_address: row.get("ip_address")?,
        user_agent: row.get("user_agent")?,
    })
}

/// WHERE clause restricting `l.user_id` when a user is given.
fn user_filter(user_id: Option<i64>) -> (&'static str, Vec<Value>) {
    match user_id {
        Some(id) => (" WHERE l.user_id = ?", vec![Value::Integer(id)]),
        None => ("", Vec::new()),
    }
}

impl PlayLogStore for SqliteMusicStore {
    fn insert_play_log(&self, entry: &NewPlayLog) -> Result<i64> {
        let conn = self.conn();
        conn.execute(
            "INSERT INTO play_log (user_id, song_id, played_at, ip_address, user_agent)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                entry.user_id,
                entry.song_id,
                entry.played_at,
                entry.ip_address,
                entry.user_agent
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    fn get_play_log(&self, play_log_id: i64) -> Result<Option<PlayLogEntry>> {
        let conn = self.conn();
        let entry = conn
            .query_row(
                &format!("{} WHERE l.id = ?1", PLAY_LOG_SELECT),
                params![play_log_id],
                row_to_play_log,
            )
            .optional()?;
        Ok(entry)
    }

    fn list_play_logs(
        &self,
        query: &PlayLogQuery,
        page: PageRequest,
    ) -> Result<Paged<PlayLogEntry>> {
        let mut conditions: Vec<&str> = Vec::new();
        let mut values: Vec<Value> = Vec::new();
        if let Some(user_id) = query.user_id {
            conditions.push("l.user_id = ?");
            values.push(Value::Integer(user_id));
        }
        if let Some(song_id) = query.song_id {
            conditions.push("l.song_id = ?");
            values.push(Value::Integer(song_id));
        }
        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", conditions.join(" AND "))
        };

        let conn = self.conn();
        let count: i64 = conn.query_row(
            &format!("SELECT COUNT(*) FROM play_log l{}", where_clause),
            params_from_iter(values.iter()),
            |row| row.get(0),
        )?;
        let sql = format!(
            "{}{} ORDER BY l.played_at DESC, l.id DESC LIMIT {} OFFSET {}",
            PLAY_LOG_SELECT,
            where_clause,
            page.limit(),
            page.offset()
        );
        let mut stmt = conn.prepare(&sql)?;
        let results = stmt
            .query_map(params_from_iter(values.iter()), row_to_play_log)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(Paged {
            count: count as usize,
            results,
        })
    }

    fn recent_play_logs(&self, limit: usize) -> Result<Vec<PlayLogEntry>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!(
            "{} ORDER BY l.played_at DESC, l.id DESC LIMIT ?1",
            PLAY_LOG_SELECT
        ))?;
        let entries = stmt
            .query_map(params![limit as i64], row_to_play_log)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(entries)
    }

    fn count_plays(&self, window: PlayWindow) -> Result<i64> {
        let mut conditions: Vec<&str> = Vec::new();
        let mut values: Vec<Value> = Vec::new();
        if let Some(user_id) = window.user_id {
            conditions.push("user_id = ?");
            values.push(Value::Integer(user_id));
        }
        if let Some(since) = window.since {
            conditions.push("played_at >= ?");
            values.push(Value::Integer(since));
        }
        if let Some(until) = window.until {
            conditions.push("played_at <= ?");
            values.push(Value::Integer(until));
        }
        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", conditions.join(" AND "))
        };

        let conn = self.conn();
        let count = conn.query_row(
            &format!("SELECT COUNT(*) FROM play_log{}", where_clause),
            params_from_iter(values),
            |row| row.get(0),
        )?;
        Ok(count)
    }

    fn count_distinct_listeners(&self) -> Result<i64> {
        let conn = self.conn();
        let count = conn.query_row("SELECT COUNT(DISTINCT user_id) FROM play_log", [], |row| {
            row.get(0)
        })?;
        Ok(count)
    }

    fn top_songs(&self, user_id: Option<i64>, limit: usize) -> Result<Vec<SongPlayCount>> {
        let (where_clause, mut values) = user_filter(user_id);
        values.push(Value::Integer(limit as i64));

        let conn = self.conn();
        let mut stmt = conn.prepare(&format!(
            "SELECT s.title, s.artist, COUNT(*) AS play_count
             FROM play_log l JOIN song s ON s.id = l.song_id{}
             GROUP BY s.id
             ORDER BY play_count DESC, s.id ASC
             LIMIT ?",
            where_clause
        ))?;
        let rows = stmt
            .query_map(params_from_iter(values), |row| {
                Ok(SongPlayCount {
                    title: row.get(0)?,
                    artist: row.get(1)?,
                    play_count: row.get(2)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    fn top_genres(&self, user_id: Option<i64>, limit: usize) -> Result<Vec<GenrePlayCount>> {
        let (where_clause, mut values) = user_filter(user_id);
        values.push(Value::Integer(limit as i64));

        let conn = self.conn();
        let mut stmt = conn.prepare(&format!(
            "SELECT s.genre, COUNT(*) AS play_count
             FROM play_log l JOIN song s ON s.id = l.song_id{}
             GROUP BY s.genre
             ORDER BY play_count DESC, s.genre ASC
             LIMIT ?",
            where_clause
        ))?;
        let rows = stmt
            .query_map(params_from_iter(values), |row| {
                Ok(GenrePlayCount {
                    genre: row.get(0)?,
                    play_count: row.get(1)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    fn top_listeners(&self, limit: usize) -> Result<Vec<UserPlayCount>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT u.username, COUNT(*) AS play_count
             FROM play_log l JOIN app_user u ON u.id = l.user_id
             GROUP BY u.id
             ORDER BY play_count DESC, u.id ASC
             LIMIT ?1",
        )?;
        let rows = stmt
            .query_map(params![limit as i64], |row| {
                Ok(UserPlayCount {
                    username: row.get(0)?,
                    play_count: row.get(1)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }
}
