//! Append-only log of song plays and its aggregations.

mod client_context;
mod models;
mod play_log_manager;
mod play_log_store;

pub use client_context::ClientContext;
pub use models::{
    GenrePlayCount, GlobalPlayStats, NewPlayLog, PlayLogEntry, PlayLogQuery, PlayWindow,
    SongPlayCount, UserPlayCount, UserPlayStats,
};
pub use play_log_manager::PlayLogManager;
pub use play_log_store::PlayLogStore;
