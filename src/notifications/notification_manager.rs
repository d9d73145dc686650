use super::models::{NewNotification, Notification, NotificationQuery, NotificationType};
use crate::authorization::{self, Decision, PlaylistAction, PlaylistTarget, Subject};
use crate::error::{AppError, AppResult};
use crate::store::{FullStore, PageRequest, Paged};
use std::sync::Arc;

const NOT_FOUND: &str = "Notification not found";

/// A notification the caller addresses to themselves.
#[derive(Debug, Clone, Default)]
pub struct NotificationDraft {
    pub title: String,
    pub message: String,
    pub notification_type: Option<NotificationType>,
    pub related_playlist: Option<i64>,
    pub related_song: Option<i64>,
}

pub struct NotificationManager {
    store: Arc<dyn FullStore>,
}

impl NotificationManager {
    pub fn new(store: Arc<dyn FullStore>) -> Self {
        Self { store }
    }

    fn now() -> i64 {
        chrono::Utc::now().timestamp()
    }

    pub fn list(
        &self,
        subject: &Subject,
        query: &NotificationQuery,
        page: PageRequest,
    ) -> AppResult<Paged<Notification>> {
        Ok(self.store.list_notifications(subject.user_id, query, page)?)
    }

    pub fn create(&self, subject: &Subject, draft: NotificationDraft) -> AppResult<Notification> {
        let title = draft.title.trim();
        if title.is_empty() {
            return Err(AppError::invalid_field("title", "This field is required."));
        }
        if draft.message.trim().is_empty() {
            return Err(AppError::invalid_field("message", "This field is required."));
        }
        if let Some(playlist_id) = draft.related_playlist {
            let visible = self.store.get_playlist(playlist_id)?.is_some_and(|playlist| {
                let target = PlaylistTarget {
                    created_by: playlist.created_by,
                    is_public: playlist.is_public,
                };
                authorization::playlist(subject, PlaylistAction::Read, target) == Decision::Allow
            });
            // Hidden playlists are reported exactly like missing ones.
            if !visible {
                return Err(AppError::invalid_field(
                    "related_playlist",
                    "Playlist does not exist",
                ));
            }
        }
        if let Some(song_id) = draft.related_song {
            if self.store.get_song(song_id)?.is_none() {
                return Err(AppError::invalid_field("related_song", "Song does not exist"));
            }
        }

        let id = self.store.create_notification(
            &NewNotification {
                user_id: subject.user_id,
                title: title.to_string(),
                message: draft.message,
                notification_type: draft.notification_type.unwrap_or_default(),
                related_playlist: draft.related_playlist,
                related_song: draft.related_song,
            },
            Self::now(),
        )?;
        self.get(subject, id)
    }

    pub fn get(&self, subject: &Subject, notification_id: i64) -> AppResult<Notification> {
        let notification = self
            .store
            .get_notification(notification_id)?
            .ok_or_else(|| AppError::not_found(NOT_FOUND))?;
        authorization::notification(subject, notification.user_id).into_result(NOT_FOUND, NOT_FOUND)?;
        Ok(notification)
    }

    pub fn delete(&self, subject: &Subject, notification_id: i64) -> AppResult<()> {
        self.get(subject, notification_id)?;
        if !self.store.delete_notification(subject.user_id, notification_id)? {
            return Err(AppError::not_found(NOT_FOUND));
        }
        Ok(())
    }

    /// Marking an already read notification leaves `read_at` untouched.
    pub fn mark_read(&self, subject: &Subject, notification_id: i64) -> AppResult<()> {
        self.get(subject, notification_id)?;
        self.store
            .mark_notifications_read(subject.user_id, Some(&[notification_id]), Self::now())?;
        Ok(())
    }

    /// Marks the given ids, or every unread notification when `ids` is absent
    /// or empty. Ids belonging to other users are not counted.
    pub fn mark_all_read(&self, subject: &Subject, ids: Option<Vec<i64>>) -> AppResult<usize> {
        let ids = ids.filter(|ids| !ids.is_empty());
        Ok(self
            .store
            .mark_notifications_read(subject.user_id, ids.as_deref(), Self::now())?)
    }

    pub fn unread_count(&self, subject: &Subject) -> AppResult<i64> {
        Ok(self.store.count_unread(subject.user_id)?)
    }

    pub fn clear_all(&self, subject: &Subject) -> AppResult<usize> {
        Ok(self.store.delete_all_notifications(subject.user_id)?)
    }
}
