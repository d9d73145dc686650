//! Best-effort creation of system notifications. Each function is one
//! deferred unit of work and returns how many rows it wrote.

use super::messages;
use crate::server::metrics;
use crate::store::FullStore;
use crate::user::UserRole;
use anyhow::Result;
use tracing::{debug, info};

pub fn welcome(store: &dyn FullStore, user_id: i64, now: i64) -> Result<usize> {
    let Some(user) = store.get_user(user_id)? else {
        debug!("Skipping welcome notification, user {} no longer exists", user_id);
        return Ok(0);
    };
    let notification = messages::welcome(&user);
    store.create_notification(&notification, now)?;
    metrics::record_notifications_created(notification.notification_type, 1);
    Ok(1)
}

/// Announces a song to every user but its uploader, only when the
/// uploader is an admin.
pub fn new_song(store: &dyn FullStore, song_id: i64, uploader_id: i64, now: i64) -> Result<usize> {
    let uploader_is_admin = store
        .get_user(uploader_id)?
        .map(|u| u.role.is_admin())
        .unwrap_or(false);
    if !uploader_is_admin {
        debug!("Song {} was not uploaded by an admin, nothing to announce", song_id);
        return Ok(0);
    }
    let Some(song) = store.get_song(song_id)? else {
        debug!("Song {} was deleted before its announcement", song_id);
        return Ok(0);
    };

    let notifications: Vec<_> = store
        .list_user_ids()?
        .into_iter()
        .filter(|id| *id != uploader_id)
        .map(|recipient| messages::new_song(recipient, &song))
        .collect();
    let written = store.create_notifications(&notifications, now)?;
    if let Some(first) = notifications.first() {
        metrics::record_notifications_created(first.notification_type, written);
    }
    info!("Announced song {} to {} users", song_id, written);
    Ok(written)
}

/// Public playlists notify every regular user, private ones only their owner.
pub fn playlist_update(
    store: &dyn FullStore,
    playlist_id: i64,
    song_id: i64,
    now: i64,
) -> Result<usize> {
    let Some(playlist) = store.get_playlist(playlist_id)? else {
        debug!("Playlist {} was deleted before its update notification", playlist_id);
        return Ok(0);
    };
    let Some(song) = store.get_song(song_id)? else {
        debug!("Song {} was deleted before the playlist update notification", song_id);
        return Ok(0);
    };

    let recipients = if playlist.is_public {
        store.list_user_ids_with_role(UserRole::Regular)?
    } else {
        vec![playlist.created_by]
    };
    let notifications: Vec<_> = recipients
        .into_iter()
        .map(|recipient| messages::playlist_update(recipient, &playlist, &song.title))
        .collect();
    let written = store.create_notifications(&notifications, now)?;
    if let Some(first) = notifications.first() {
        metrics::record_notifications_created(first.notification_type, written);
    }
    Ok(written)
}
