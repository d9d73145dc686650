//! Read-only rollups for the landing page.

mod activity;
mod dashboard_manager;
mod dashboard_store;
mod models;

pub use activity::merge_recent_activity;
pub use dashboard_manager::DashboardManager;
pub use dashboard_store::DashboardStore;
pub use models::{
    ActivityItem, ActivityKind, CreatedPlaylist, DashboardStats, GenreCount, GenreStat,
    JoinedUser, RecentPlay, TopPlaylist,
};
