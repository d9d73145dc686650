use super::pagination::{like_pattern, PageRequest, Paged};
use super::SqliteMusicStore;
use crate::catalog::{Genre, NewSong, Song, SongQuery, SongStore, SongUpdate};
use anyhow::Result;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, OptionalExtension, Row};

const SONG_SELECT: &str = "SELECT s.id, s.title, s.artist, s.genre, s.description, s.duration,
        s.file_path, s.file_size, s.uploaded_by, u.username AS uploaded_by_name,
        s.created_at, s.updated_at
    FROM song s JOIN app_user u ON u.id = s.uploaded_by";

fn row_to_song(row: &Row) -> rusqlite::Result<Song> {
    let genre: String = row.get("genre")?;
    Ok(Song {
        id: row.get("id")?,
        title: row.get("title")?,
        artist: row.get("artist")?,
        genre: Genre::from_str(&genre).unwrap_or(Genre::Other),
        description: row.get("description")?,
        duration: row.get("duration")?,
        file_path: row.get("file_path")?,
        file_size: row.get("file_size")?,
        uploaded_by: row.get("uploaded_by")?,
        uploaded_by_name: row.get("uploaded_by_name")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

impl SongStore for SqliteMusicStore {
    fn create_song(&self, song: &NewSong, now: i64) -> Result<i64> {
        let conn = self.conn();
        conn.execute(
            "INSERT INTO song (title, artist, genre, description, duration, file_path, file_size, uploaded_by, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?9)",
            params![
                song.title,
                song.artist,
                song.genre.as_str(),
                song.description,
                song.duration,
                song.file_path,
                song.file_size,
                song.uploaded_by,
                now
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    fn get_song(&self, song_id: i64) -> Result<Option<Song>> {
        let conn = self.conn();
        let song = conn
            .query_row(
                &format!("{} WHERE s.id = ?1", SONG_SELECT),
                params![song_id],
                row_to_song,
            )
            .optional()?;
        Ok(song)
    }

    fn update_song(&self, song_id: i64, update: &SongUpdate, now: i64) -> Result<bool> {
        let mut assignments = vec!["updated_at = ?"];
        let mut values = vec![Value::Integer(now)];
        if let Some(title) = &update.title {
            assignments.push("title = ?");
            values.push(Value::Text(title.clone()));
        }
        if let Some(artist) = &update.artist {
            assignments.push("artist = ?");
            values.push(Value::Text(artist.clone()));
        }
        if let Some(genre) = update.genre {
            assignments.push("genre = ?");
            values.push(Value::Text(genre.as_str().to_string()));
        }
        if let Some(description) = &update.description {
            assignments.push("description = ?");
            values.push(Value::Text(description.clone()));
        }
        if let Some(duration) = update.duration {
            assignments.push("duration = ?");
            values.push(Value::Integer(duration));
        }
        values.push(Value::Integer(song_id));

        let conn = self.conn();
        let changed = conn.execute(
            &format!("UPDATE song SET {} WHERE id = ?", assignments.join(", ")),
            params_from_iter(values),
        )?;
        Ok(changed > 0)
    }

    fn delete_song(&self, song_id: i64) -> Result<bool> {
        let conn = self.conn();
        let deleted = conn.execute("DELETE FROM song WHERE id = ?1", params![song_id])?;
        Ok(deleted > 0)
    }

    fn list_songs(&self, query: &SongQuery, page: PageRequest) -> Result<Paged<Song>> {
        let mut conditions: Vec<&str> = Vec::new();
        let mut values: Vec<Value> = Vec::new();
        if let Some(genre) = query.genre {
            conditions.push("s.genre = ?");
            values.push(Value::Text(genre.as_str().to_string()));
        }
        if let Some(artist) = &query.artist {
            conditions.push("s.artist = ?");
            values.push(Value::Text(artist.clone()));
        }
        if let Some(search) = query.search.as_deref().filter(|s| !s.is_empty()) {
            conditions.push(
                "(s.title LIKE ? ESCAPE '\\' OR s.artist LIKE ? ESCAPE '\\' OR s.genre LIKE ? ESCAPE '\\')",
            );
            let pattern = like_pattern(search);
            values.extend(std::iter::repeat(Value::Text(pattern)).take(3));
        }
        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", conditions.join(" AND "))
        };

        let conn = self.conn();
        let count: i64 = conn.query_row(
            &format!("SELECT COUNT(*) FROM song s{}", where_clause),
            params_from_iter(values.iter()),
            |row| row.get(0),
        )?;

        let sql = format!(
            "{}{} ORDER BY {}, s.id {} LIMIT {} OFFSET {}",
            SONG_SELECT,
            where_clause,
            query.sort.order_by_sql(),
            if query.sort.descending { "DESC" } else { "ASC" },
            page.limit(),
            page.offset()
        );
        let mut stmt = conn.prepare(&sql)?;
        let results = stmt
            .query_map(params_from_iter(values.iter()), row_to_song)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(Paged {
            count: count as usize,
            results,
        })
    }
}
