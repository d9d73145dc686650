use super::models::{NewNotification, Notification, NotificationQuery};
use crate::store::{PageRequest, Paged};
use anyhow::Result;

/// Per-user inbox. Listings and writes are keyed by the recipient, so rows
/// of other users behave as absent.
pub trait NotificationStore: Send + Sync {
    fn create_notification(&self, notification: &NewNotification, now: i64) -> Result<i64>;

    /// Inserts one row per entry, each in its own statement. Returns how many were written.
    fn create_notifications(&self, notifications: &[NewNotification], now: i64) -> Result<usize>;

    /// Returns Ok(None) if absent.
    fn get_notification(&self, notification_id: i64) -> Result<Option<Notification>>;

    /// Newest first.
    fn list_notifications(
        &self,
        user_id: i64,
        query: &NotificationQuery,
        page: PageRequest,
    ) -> Result<Paged<Notification>>;

    /// Marks unread rows as read at `now`. With `ids` set only those rows are
    /// candidates. Returns the number of rows that changed.
    fn mark_notifications_read(&self, user_id: i64, ids: Option<&[i64]>, now: i64)
        -> Result<usize>;

    fn count_unread(&self, user_id: i64) -> Result<i64>;

    /// Returns false if absent or addressed to someone else.
    fn delete_notification(&self, user_id: i64, notification_id: i64) -> Result<bool>;

    fn delete_all_notifications(&self, user_id: i64) -> Result<usize>;
}
