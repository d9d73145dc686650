use super::media::{audio_extension, media_url, MediaStorage, ALLOWED_AUDIO_EXTENSIONS};
use super::models::{Genre, NewSong, Song, SongQuery, SongUpdate};
use crate::authorization::{self, SongAction, Subject};
use crate::error::{AppError, AppResult};
use crate::store::{FullStore, PageRequest, Paged};
use crate::tasks::{TaskIntent, TaskQueue};
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

const NOT_FOUND: &str = "Song not found";
const ADMIN_ONLY: &str = "Only admins can manage songs";

/// An uploaded audio file together with its metadata.
#[derive(Debug, Clone)]
pub struct SongUpload {
    pub title: String,
    pub artist: String,
    pub genre: Genre,
    pub description: Option<String>,
    pub duration: Option<i64>,
    pub filename: String,
    pub data: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SongDownload {
    pub download_url: String,
    pub filename: String,
}

fn require_text(field: &str, value: &str) -> AppResult<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AppError::invalid_field(field, "This field may not be blank."));
    }
    Ok(value.to_string())
}

fn check_duration(duration: Option<i64>) -> AppResult<()> {
    match duration {
        Some(d) if d < 0 => Err(AppError::invalid_field(
            "duration",
            "Ensure this value is greater than or equal to 0.",
        )),
        _ => Ok(()),
    }
}

pub struct SongManager {
    store: Arc<dyn FullStore>,
    media: MediaStorage,
    tasks: TaskQueue,
}

impl SongManager {
    pub fn new(store: Arc<dyn FullStore>, media: MediaStorage, tasks: TaskQueue) -> Self {
        Self {
            store,
            media,
            tasks,
        }
    }

    fn authorize(subject: &Subject, action: SongAction) -> AppResult<()> {
        authorization::song(subject, action).into_result(NOT_FOUND, ADMIN_ONLY)
    }

    fn load(&self, song_id: i64) -> AppResult<Song> {
        self.store
            .get_song(song_id)?
            .ok_or_else(|| AppError::not_found(NOT_FOUND))
    }

    pub fn list(&self, subject: &Subject, query: &SongQuery, page: PageRequest) -> AppResult<Paged<Song>> {
        Self::authorize(subject, SongAction::Read)?;
        Ok(self.store.list_songs(query, page)?)
    }

    pub fn get(&self, subject: &Subject, song_id: i64) -> AppResult<Song> {
        Self::authorize(subject, SongAction::Read)?;
        self.load(song_id)
    }

    pub fn create(&self, subject: &Subject, upload: SongUpload) -> AppResult<Song> {
        Self::authorize(subject, SongAction::Create)?;
        let title = require_text("title", &upload.title)?;
        let artist = require_text("artist", &upload.artist)?;
        check_duration(upload.duration)?;
        if audio_extension(&upload.filename).is_none() {
            return Err(AppError::invalid_field(
                "audio_file",
                format!(
                    "File extension is not allowed. Allowed extensions are: {}.",
                    ALLOWED_AUDIO_EXTENSIONS.join(", ")
                ),
            ));
        }
        if upload.data.is_empty() {
            return Err(AppError::invalid_field("audio_file", "The submitted file is empty."));
        }

        let stored = self
            .media
            .store_song_file(&artist, &upload.filename, &upload.data)?;
        let now = chrono::Utc::now().timestamp();
        let created = self.store.create_song(
            &NewSong {
                title,
                artist,
                genre: upload.genre,
                description: upload.description,
                duration: upload.duration,
                file_path: stored.relative_path.clone(),
                file_size: stored.size,
                uploaded_by: subject.user_id,
            },
            now,
        );
        let song_id = match created {
            Ok(id) => id,
            Err(err) => {
                self.media.remove(&stored.relative_path);
                return Err(err.into());
            }
        };
        info!("User {} uploaded song {} ({} bytes)", subject.user_id, song_id, stored.size);

        self.tasks.submit(TaskIntent::NewSongFanOut {
            song_id,
            uploader_id: subject.user_id,
        });
        self.load(song_id)
    }

    pub fn update(&self, subject: &Subject, song_id: i64, update: SongUpdate) -> AppResult<Song> {
        Self::authorize(subject, SongAction::Update)?;
        let update = SongUpdate {
            title: update.title.as_deref().map(|t| require_text("title", t)).transpose()?,
            artist: update.artist.as_deref().map(|a| require_text("artist", a)).transpose()?,
            ..update
        };
        check_duration(update.duration)?;

        let now = chrono::Utc::now().timestamp();
        if !self.store.update_song(song_id, &update, now)? {
            return Err(AppError::not_found(NOT_FOUND));
        }
        self.load(song_id)
    }

    /// Removes the song and, best effort, its stored file.
    pub fn delete(&self, subject: &Subject, song_id: i64) -> AppResult<()> {
        Self::authorize(subject, SongAction::Delete)?;
        let song = self.load(song_id)?;
        if !self.store.delete_song(song_id)? {
            return Err(AppError::not_found(NOT_FOUND));
        }
        self.media.remove(&song.file_path);
        info!("User {} deleted song {}", subject.user_id, song_id);
        Ok(())
    }

    pub fn download(&self, subject: &Subject, song_id: i64) -> AppResult<SongDownload> {
        let song = self.get(subject, song_id)?;
        if !self.media.exists(&song.file_path) {
            return Err(AppError::not_found("Audio file not found"));
        }
        Ok(SongDownload {
            download_url: media_url(&song.file_path),
            filename: song.filename().to_string(),
        })
    }
}
