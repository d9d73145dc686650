//! Per-user notification inbox.

pub mod fan_out;
mod messages;
mod models;
mod notification_manager;
mod notification_store;

pub use models::{NewNotification, Notification, NotificationQuery, NotificationType};
pub use notification_manager::{NotificationDraft, NotificationManager};
pub use notification_store::NotificationStore;
