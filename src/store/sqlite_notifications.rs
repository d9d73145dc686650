use super::pagination::{PageRequest, Paged};
use super::SqliteMusicStore;
use crate::notifications::{
    NewNotification, Notification, NotificationQuery, NotificationStore, NotificationType,
};
use anyhow::Result;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};

const NOTIFICATION_SELECT: &str = "SELECT n.id, n.user_id, n.title, n.message,
        n.notification_type, n.is_read, n.created_at, n.read_at,
        n.related_playlist_id, p.name AS related_playlist_name,
        n.related_song_id, s.title AS related_song_title
    FROM notification n
    LEFT JOIN playlist p ON p.id = n.related_playlist_id
    LEFT JOIN song s ON s.id = n.related_song_id";

fn row_to_notification(row: &Row) -> rusqlite::Result<Notification> {
    let notification_type: String = row.get("notification_type")?;
    Ok(Notification {
        id: row.get("id")?,
        user_id: row.get("user_id")?,
        title: row.get("title")?,
        message: row.get("message")?,
        notification_type: NotificationType::from_str(&notification_type).unwrap_or_default(),
        is_read: row.get("is_read")?,
        created_at: row.get("created_at")?,
        read_at: row.get("read_at")?,
        related_playlist: row.get("related_playlist_id")?,
        related_playlist_name: row.get("related_playlist_name")?,
        related_song: row.get("related_song_id")?,
        related_song_title: row.get("related_song_title")?,
    })
}

fn insert_notification(conn: &Connection, n: &NewNotification, now: i64) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT INTO notification (user_id, title, message, notification_type, is_read, created_at, related_playlist_id, related_song_id)
         VALUES (?1, ?2, ?3, ?4, 0, ?5, ?6, ?7)",
        params![
            n.user_id,
            n.title,
            n.message,
            n.notification_type.as_str(),
            now,
            n.related_playlist,
            n.related_song
        ],
    )?;
    Ok(())
}

impl NotificationStore for SqliteMusicStore {
    fn create_notification(&self, notification: &NewNotification, now: i64) -> Result<i64> {
        let conn = self.conn();
        insert_notification(&conn, notification, now)?;
        Ok(conn.last_insert_rowid())
    }

    fn create_notifications(&self, notifications: &[NewNotification], now: i64) -> Result<usize> {
        let conn = self.conn();
        let mut written = 0;
        for notification in notifications {
            insert_notification(&conn, notification, now)?;
            written += 1;
        }
        Ok(written)
    }

    fn get_notification(&self, notification_id: i64) -> Result<Option<Notification>> {
        let conn = self.conn();
        let notification = conn
            .query_row(
                &format!("{} WHERE n.id = ?1", NOTIFICATION_SELECT),
                params![notification_id],
                row_to_notification,
            )
            .optional()?;
        Ok(notification)
    }

    fn list_notifications(
        &self,
        user_id: i64,
        query: &NotificationQuery,
        page: PageRequest,
    ) -> Result<Paged<Notification>> {
        let mut conditions = vec!["n.user_id = ?"];
        let mut values = vec![Value::Integer(user_id)];
        if let Some(is_read) = query.is_read {
            conditions.push("n.is_read = ?");
            values.push(Value::Integer(is_read as i64));
        }
        if let Some(notification_type) = query.notification_type {
            conditions.push("n.notification_type = ?");
            values.push(Value::Text(notification_type.as_str().to_string()));
        }
        let where_clause = format!(" WHERE {}", conditions.join(" AND "));

        let conn = self.conn();
        let count: i64 = conn.query_row(
            &format!("SELECT COUNT(*) FROM notification n{}", where_clause),
            params_from_iter(values.iter()),
            |row| row.get(0),
        )?;
        let sql = format!(
            "{}{} ORDER BY n.created_at DESC, n.id DESC LIMIT {} OFFSET {}",
            NOTIFICATION_SELECT,
            where_clause,
            page.limit(),
            page.offset()
        );
        let mut stmt = conn.prepare(&sql)?;
        let results = stmt
            .query_map(params_from_iter(values.iter()), row_to_notification)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(Paged {
            count: count as usize,
            results,
        })
    }

    fn mark_notifications_read(
        &self,
        user_id: i64,
        ids: Option<&[i64]>,
        now: i64,
    ) -> Result<usize> {
        let mut sql = String::from(
            "UPDATE notification SET is_read = 1, read_at = ? WHERE user_id = ? AND is_read = 0",
        );
        let mut values = vec![Value::Integer(now), Value::Integer(user_id)];
        if let Some(ids) = ids {
            if ids.is_empty() {
                return Ok(0);
            }
            let placeholders = vec!["?"; ids.len()].join(", ");
            sql.push_str(&format!(" AND id IN ({})", placeholders));
            values.extend(ids.iter().map(|id| Value::Integer(*id)));
        }

        let conn = self.conn();
        let changed = conn.execute(&sql, params_from_iter(values))?;
        Ok(changed)
    }

    fn count_unread(&self, user_id: i64) -> Result<i64> {
        let conn = self.conn();
        let count = conn.query_row(
            "SELECT COUNT(*) FROM notification WHERE user_id = ?1 AND is_read = 0",
            params![user_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    fn delete_notification(&self, user_id: i64, notification_id: i64) -> Result<bool> {
        let conn = self.conn();
        let deleted = conn.execute(
            "DELETE FROM notification WHERE id = ?1 AND user_id = ?2",
            params![notification_id, user_id],
        )?;
        Ok(deleted > 0)
    }

    fn delete_all_notifications(&self, user_id: i64) -> Result<usize> {
        let conn = self.conn();
        let deleted = conn.execute(
            "DELETE FROM notification WHERE user_id = ?1",
            params![user_id],
        )?;
        Ok(deleted)
    }
}
