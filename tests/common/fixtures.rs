//! Test fixture creation for the database and media directory

use super::constants::*;
use anyhow::Result;
use music_catalog_server::catalog::{Genre, NewSong, SongStore};
use music_catalog_server::user::auth::hash_password;
use music_catalog_server::user::{NewUser, UserRole, UserStore};
use music_catalog_server::SqliteMusicStore;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// Ids of the rows created by [`create_test_db_with_users`]
#[derive(Debug, Clone, Copy)]
pub struct SeededIds {
    pub admin_id: i64,
    pub user_id: i64,
    pub other_user_id: i64,
    pub third_user_id: i64,
    pub song_id: i64,
}

fn add_user(
    store: &SqliteMusicStore,
    username: &str,
    email: &str,
    password: &str,
    role: UserRole,
) -> Result<i64> {
    store.create_user(&NewUser {
        username: username.to_string(),
        email: email.to_string(),
        password_hash: hash_password(password)?,
        first_name: String::new(),
        last_name: String::new(),
        role,
    })
}

/// Creates a temporary database with one admin, three regular users and one song.
/// Returns (temp_dir, db_path, media_path, ids)
pub fn create_test_db_with_users() -> Result<(TempDir, PathBuf, PathBuf, SeededIds)> {
    let dir = TempDir::new()?;
    let db_path = dir.path().join("music.db");
    let media_path = dir.path().join("media");

    let store = SqliteMusicStore::new(&db_path)?;

    let admin_id = add_user(&store, ADMIN_USER, ADMIN_EMAIL, ADMIN_PASS, UserRole::Admin)?;
    let user_id = add_user(&store, TEST_USER, TEST_EMAIL, TEST_PASS, UserRole::Regular)?;
    let other_user_id = add_user(&store, OTHER_USER, OTHER_EMAIL, OTHER_PASS, UserRole::Regular)?;
    let third_user_id = add_user(&store, THIRD_USER, THIRD_EMAIL, THIRD_PASS, UserRole::Regular)?;

    let relative_path = format!("songs/{}/opening.mp3", SEEDED_SONG_ARTIST);
    let song_dir = media_path.join("songs").join(SEEDED_SONG_ARTIST);
    fs::create_dir_all(&song_dir)?;
    fs::write(song_dir.join("opening.mp3"), TEST_AUDIO_BYTES)?;

    let song_id = store.create_song(
        &NewSong {
            title: SEEDED_SONG_TITLE.to_string(),
            artist: SEEDED_SONG_ARTIST.to_string(),
            genre: Genre::Rock,
            description: Some("Seeded by the test fixtures".to_string()),
            duration: Some(215),
            file_path: relative_path,
            file_size: TEST_AUDIO_BYTES.len() as i64,
            uploaded_by: admin_id,
        },
        chrono::Utc::now().timestamp(),
    )?;

    Ok((
        dir,
        db_path,
        media_path,
        SeededIds {
            admin_id,
            user_id,
            other_user_id,
            third_user_id,
            song_id,
        },
    ))
}
