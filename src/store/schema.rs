//! SQLite schema for the music catalog database.
//!
//! Every timestamp column holds unix seconds.

use crate::sqlite_column;
use crate::sqlite_persistence::{
    Column, ForeignKey, ForeignKeyOnChange, SqlType, Table, VersionedSchema, DEFAULT_TIMESTAMP,
};

const USER_FK: ForeignKey = ForeignKey {
    foreign_table: "app_user",
    foreign_column: "id",
    on_delete: ForeignKeyOnChange::Cascade,
};

const SONG_FK: ForeignKey = ForeignKey {
    foreign_table: "song",
    foreign_column: "id",
    on_delete: ForeignKeyOnChange::Cascade,
};

const PLAYLIST_FK: ForeignKey = ForeignKey {
    foreign_table: "playlist",
    foreign_column: "id",
    on_delete: ForeignKeyOnChange::Cascade,
};

const USER_TABLE_V1: Table = Table {
    name: "app_user",
    columns: &[
        sqlite_column!("id", &SqlType::Integer, is_primary_key = true),
        sqlite_column!("username", &SqlType::Text, non_null = true),
        sqlite_column!("email", &SqlType::Text, non_null = true),
        sqlite_column!("password_hash", &SqlType::Text, non_null = true),
        sqlite_column!(
            "first_name",
            &SqlType::Text,
            non_null = true,
            default_value = Some("''")
        ),
        sqlite_column!(
            "last_name",
            &SqlType::Text,
            non_null = true,
            default_value = Some("''")
        ),
        sqlite_column!(
            "role",
            &SqlType::Text,
            non_null = true,
            default_value = Some("'regular'")
        ),
        sqlite_column!(
            "created_at",
            &SqlType::Integer,
            non_null = true,
            default_value = Some(DEFAULT_TIMESTAMP)
        ),
        sqlite_column!(
            "updated_at",
            &SqlType::Integer,
            non_null = true,
            default_value = Some(DEFAULT_TIMESTAMP)
        ),
    ],
    indices: &[("idx_app_user_role", "role")],
    unique_constraints: &[&["email"], &["username"]],
};

/// Refresh tokens revoked through logout, keyed by their `jti` claim.
const REFRESH_TOKEN_BLACKLIST_TABLE_V1: Table = Table {
    name: "refresh_token_blacklist",
    columns: &[
        sqlite_column!("jti", &SqlType::Text, is_primary_key = true),
        sqlite_column!(
            "user_id",
            &SqlType::Integer,
            non_null = true,
            foreign_key = Some(&USER_FK)
        ),
        sqlite_column!("expires_at", &SqlType::Integer, non_null = true),
        sqlite_column!(
            "blacklisted_at",
            &SqlType::Integer,
            non_null = true,
            default_value = Some(DEFAULT_TIMESTAMP)
        ),
    ],
    indices: &[],
    unique_constraints: &[],
};

const SONG_TABLE_V1: Table = Table {
    name: "song",
    columns: &[
        sqlite_column!("id", &SqlType::Integer, is_primary_key = true),
        sqlite_column!("title", &SqlType::Text, non_null = true),
        sqlite_column!("artist", &SqlType::Text, non_null = true),
        sqlite_column!("genre", &SqlType::Text, non_null = true),
        sqlite_column!("description", &SqlType::Text),
        sqlite_column!("duration", &SqlType::Integer),
        // relative to the media root
        sqlite_column!("file_path", &SqlType::Text, non_null = true),
        sqlite_column!("file_size", &SqlType::Integer, non_null = true),
        sqlite_column!(
            "uploaded_by",
            &SqlType::Integer,
            non_null = true,
            foreign_key = Some(&USER_FK)
        ),
        sqlite_column!("created_at", &SqlType::Integer, non_null = true),
        sqlite_column!("updated_at", &SqlType::Integer, non_null = true),
    ],
    indices: &[
        ("idx_song_title", "title"),
        ("idx_song_artist", "artist"),
        ("idx_song_genre", "genre"),
        ("idx_song_created_at", "created_at"),
    ],
    unique_constraints: &[],
};

const PLAYLIST_TABLE_V1: Table = Table {
    name: "playlist",
    columns: &[
        sqlite_column!("id", &SqlType::Integer, is_primary_key = true),
        sqlite_column!("name", &SqlType::Text, non_null = true),
        sqlite_column!("description", &SqlType::Text),
        sqlite_column!(
            "created_by",
            &SqlType::Integer,
            non_null = true,
            foreign_key = Some(&USER_FK)
        ),
        sqlite_column!(
            "is_public",
            &SqlType::Integer,
            non_null = true,
            default_value = Some("0")
        ),
        sqlite_column!("created_at", &SqlType::Integer, non_null = true),
        sqlite_column!("updated_at", &SqlType::Integer, non_null = true),
    ],
    indices: &[
        ("idx_playlist_created_by", "created_by"),
        ("idx_playlist_is_public", "is_public"),
        ("idx_playlist_created_at", "created_at"),
    ],
    unique_constraints: &[],
};

const PLAYLIST_SONG_TABLE_V1: Table = Table {
    name: "playlist_song",
    columns: &[
        sqlite_column!("id", &SqlType::Integer, is_primary_key = true),
        sqlite_column!(
            "playlist_id",
            &SqlType::Integer,
            non_null = true,
            foreign_key = Some(&PLAYLIST_FK)
        ),
        sqlite_column!(
            "song_id",
            &SqlType::Integer,
            non_null = true,
            foreign_key = Some(&SONG_FK)
        ),
        sqlite_column!(
            "position",
            &SqlType::Integer,
            non_null = true,
            default_value = Some("0")
        ),
        sqlite_column!("added_at", &SqlType::Integer, non_null = true),
    ],
    indices: &[("idx_playlist_song_song", "song_id")],
    unique_constraints: &[&["playlist_id", "song_id"]],
};

const PLAY_LOG_TABLE_V1: Table = Table {
    name: "play_log",
    columns: &[
        sqlite_column!("id", &SqlType::Integer, is_primary_key = true),
        sqlite_column!(
            "user_id",
            &SqlType::Integer,
            non_null = true,
            foreign_key = Some(&USER_FK)
        ),
        sqlite_column!(
            "song_id",
            &SqlType::Integer,
            non_null = true,
            foreign_key = Some(&SONG_FK)
        ),
        sqlite_column!("played_at", &SqlType::Integer, non_null = true),
        sqlite_column!("ip_address", &SqlType::Text),
        sqlite_column!("user_agent", &SqlType::Text),
    ],
    indices: &[
        ("idx_play_log_user_played", "user_id, played_at"),
        ("idx_play_log_song_played", "song_id, played_at"),
        ("idx_play_log_played_at", "played_at"),
    ],
    unique_constraints: &[],
};

const NOTIFICATION_TABLE_V1: Table = Table {
    name: "notification",
    columns: &[
        sqlite_column!("id", &SqlType::Integer, is_primary_key = true),
        sqlite_column!(
            "user_id",
            &SqlType::Integer,
            non_null = true,
            foreign_key = Some(&USER_FK)
        ),
        sqlite_column!("title", &SqlType::Text, non_null = true),
        sqlite_column!("message", &SqlType::Text, non_null = true),
        sqlite_column!(
            "notification_type",
            &SqlType::Text,
            non_null = true,
            default_value = Some("'general'")
        ),
        sqlite_column!(
            "is_read",
            &SqlType::Integer,
            non_null = true,
            default_value = Some("0")
        ),
        sqlite_column!("created_at", &SqlType::Integer, non_null = true),
        sqlite_column!("read_at", &SqlType::Integer),
        sqlite_column!(
            "related_playlist_id",
            &SqlType::Integer,
            foreign_key = Some(&PLAYLIST_FK)
        ),
        sqlite_column!(
            "related_song_id",
            &SqlType::Integer,
            foreign_key = Some(&SONG_FK)
        ),
    ],
    indices: &[
        ("idx_notification_user_read", "user_id, is_read"),
        ("idx_notification_created_at", "created_at"),
        ("idx_notification_type", "notification_type"),
    ],
    unique_constraints: &[],
};

pub const MUSIC_VERSIONED_SCHEMAS: &[VersionedSchema] = &[VersionedSchema {
    version: 1,
    tables: &[
        USER_TABLE_V1,
        REFRESH_TOKEN_BLACKLIST_TABLE_V1,
        SONG_TABLE_V1,
        PLAYLIST_TABLE_V1,
        PLAYLIST_SONG_TABLE_V1,
        PLAY_LOG_TABLE_V1,
        NOTIFICATION_TABLE_V1,
    ],
    migration: None,
}];
