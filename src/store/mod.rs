mod pagination;
mod schema;
mod sqlite_dashboard;
mod sqlite_music_store;
mod sqlite_notifications;
mod sqlite_play_logs;
mod sqlite_playlists;
mod sqlite_songs;
mod sqlite_users;

pub use pagination::{like_pattern, PageRequest, Paged, Sort, SortField, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
pub use schema::MUSIC_VERSIONED_SCHEMAS;
pub use sqlite_music_store::SqliteMusicStore;
#[cfg(test)]
pub(crate) use sqlite_music_store::test_support;

use crate::catalog::SongStore;
use crate::dashboard::DashboardStore;
use crate::notifications::NotificationStore;
use crate::play_history::PlayLogStore;
use crate::playlist::PlaylistStore;
use crate::user::{RefreshTokenStore, UserStore};

/// Every store trait the managers and the task worker need.
pub trait FullStore:
    UserStore
    + RefreshTokenStore
    + SongStore
    + PlaylistStore
    + PlayLogStore
    + NotificationStore
    + DashboardStore
{
}

impl<T> FullStore for T where
    T: UserStore
        + RefreshTokenStore
        + SongStore
        + PlaylistStore
        + PlayLogStore
        + NotificationStore
        + DashboardStore
{
}
