//! Song catalog routes, including multipart audio upload.

use axum::{
    extract::{multipart::MultipartError, DefaultBodyLimit, Multipart, Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::extract::{ApiJson, ApiQuery};
use super::session::Session;
use super::state::{GuardedSongManager, ServerState};
use super::ServerConfig;
use crate::catalog::media::media_url;
use crate::catalog::{Genre, Song, SongDownload, SongQuery, SongSort, SongUpdate, SongUpload};
use crate::error::{AppError, AppResult};
use crate::store::{PageRequest, Paged};

#[derive(Serialize, Debug)]
pub struct SongResponse {
    pub id: i64,
    pub title: String,
    pub artist: String,
    pub genre: Genre,
    pub description: Option<String>,
    pub duration: Option<i64>,
    pub file_size: i64,
    pub uploaded_by: i64,
    pub uploaded_by_name: String,
    pub created_at: i64,
    pub updated_at: i64,
    pub file_url: String,
    pub filename: String,
}

impl From<Song> for SongResponse {
    fn from(song: Song) -> Self {
        SongResponse {
            file_url: media_url(&song.file_path),
            filename: song.filename().to_string(),
            id: song.id,
            title: song.title,
            artist: song.artist,
            genre: song.genre,
            description: song.description,
            duration: song.duration,
            file_size: song.file_size,
            uploaded_by: song.uploaded_by,
            uploaded_by_name: song.uploaded_by_name,
            created_at: song.created_at,
            updated_at: song.updated_at,
        }
    }
}

#[derive(Deserialize, Debug, Default)]
#[serde(default)]
struct SongListParams {
    genre: Option<String>,
    artist: Option<String>,
    search: Option<String>,
    ordering: Option<String>,
    page: Option<usize>,
    page_size: Option<usize>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(default)]
struct SongUpdateBody {
    title: Option<String>,
    artist: Option<String>,
    genre: Option<String>,
    description: Option<String>,
    duration: Option<i64>,
}

fn parse_genre(raw: &str) -> AppResult<Genre> {
    Genre::from_str(raw.trim()).ok_or_else(|| {
        AppError::invalid_field("genre", format!("\"{}\" is not a valid choice.", raw))
    })
}

fn song_query(params: &SongListParams) -> AppResult<SongQuery> {
    let mut query = SongQuery::default();
    if let Some(genre) = params.genre.as_deref().filter(|g| !g.is_empty()) {
        query.genre = Some(parse_genre(genre)?);
    }
    query.artist = params.artist.clone().filter(|a| !a.is_empty());
    query.search = params.search.clone().filter(|s| !s.trim().is_empty());
    // Unknown orderings are ignored.
    if let Some(sort) = params.ordering.as_deref().and_then(SongSort::parse) {
        query.sort = sort;
    }
    Ok(query)
}

fn multipart_error(err: MultipartError) -> AppError {
    AppError::validation(err.body_text())
}

fn required(field: &str, value: Option<String>) -> AppResult<String> {
    value.ok_or_else(|| AppError::invalid_field(field, "This field is required."))
}

async fn read_upload(mut multipart: Multipart) -> AppResult<SongUpload> {
    let mut title = None;
    let mut artist = None;
    let mut genre = None;
    let mut description = None;
    let mut duration = None;
    let mut file = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "audio_file" => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let data = field.bytes().await.map_err(multipart_error)?;
                file = Some((filename, data.to_vec()));
            }
            "title" | "artist" | "genre" | "description" | "duration" => {
                let text = field.text().await.map_err(multipart_error)?;
                match name.as_str() {
                    "title" => title = Some(text),
                    "artist" => artist = Some(text),
                    "genre" => genre = Some(text),
                    "description" => description = Some(text).filter(|d| !d.is_empty()),
                    _ => duration = Some(text).filter(|d| !d.trim().is_empty()),
                }
            }
            other => debug!("Ignoring multipart field {}", other),
        }
    }

    let duration = duration
        .map(|d| {
            d.trim()
                .parse::<i64>()
                .map_err(|_| AppError::invalid_field("duration", "A valid integer is required."))
        })
        .transpose()?;
    let (filename, data) = file
        .ok_or_else(|| AppError::invalid_field("audio_file", "No file was submitted."))?;

    Ok(SongUpload {
        title: required("title", title)?,
        artist: required("artist", artist)?,
        genre: parse_genre(&required("genre", genre)?)?,
        description,
        duration,
        filename,
        data,
    })
}

async fn list_songs(
    State(song_manager): State<GuardedSongManager>,
    session: Session,
    ApiQuery(params): ApiQuery<SongListParams>,
) -> AppResult<Json<Paged<SongResponse>>> {
    let query = song_query(&params)?;
    let page = PageRequest::new(params.page, params.page_size);
    let songs = song_manager.list(&session.subject(), &query, page)?;
    Ok(Json(songs.map(SongResponse::from)))
}

async fn create_song(
    State(song_manager): State<GuardedSongManager>,
    session: Session,
    multipart: Multipart,
) -> AppResult<impl IntoResponse> {
    let subject = session.subject();
    // Reject before reading a possibly large body.
    if !subject.is_admin() {
        return Err(AppError::forbidden("Only admins can manage songs"));
    }
    let upload = read_upload(multipart).await?;
    let song = song_manager.create(&subject, upload)?;
    Ok((StatusCode::CREATED, Json(SongResponse::from(song))))
}

async fn get_song(
    State(song_manager): State<GuardedSongManager>,
    session: Session,
    Path(id): Path<i64>,
) -> AppResult<Json<SongResponse>> {
    Ok(Json(song_manager.get(&session.subject(), id)?.into()))
}

async fn update_song(
    State(song_manager): State<GuardedSongManager>,
    session: Session,
    Path(id): Path<i64>,
    ApiJson(body): ApiJson<SongUpdateBody>,
) -> AppResult<Json<SongResponse>> {
    let update = SongUpdate {
        title: body.title,
        artist: body.artist,
        genre: body.genre.as_deref().map(parse_genre).transpose()?,
        description: body.description,
        duration: body.duration,
    };
    Ok(Json(song_manager.update(&session.subject(), id, update)?.into()))
}

async fn delete_song(
    State(song_manager): State<GuardedSongManager>,
    session: Session,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    song_manager.delete(&session.subject(), id)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn download_song(
    State(song_manager): State<GuardedSongManager>,
    session: Session,
    Path(id): Path<i64>,
) -> AppResult<Json<SongDownload>> {
    Ok(Json(song_manager.download(&session.subject(), id)?))
}

pub fn make_song_routes(config: &ServerConfig) -> Router<ServerState> {
    Router::new()
        .route(
            "/",
            get(list_songs)
                .post(create_song)
                .layer(DefaultBodyLimit::max(config.max_upload_bytes)),
        )
        .route(
            "/{id}",
            get(get_song)
                .put(update_song)
                .patch(update_song)
                .delete(delete_song),
        )
        .route("/{id}/download", get(download_song))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::SongSortField;

    #[test]
    fn list_params_build_query() {
        let params = SongListParams {
            genre: Some("hip_hop".to_string()),
            ordering: Some("-title".to_string()),
            search: Some("  ".to_string()),
            ..Default::default()
        };
        let query = song_query(&params).unwrap();
        assert_eq!(query.genre, Some(Genre::HipHop));
        assert_eq!(query.sort.field, SongSortField::Title);
        assert!(query.sort.descending);
        assert!(query.search.is_none());
    }

    #[test]
    fn unknown_ordering_keeps_default_but_unknown_genre_fails() {
        let params = SongListParams {
            ordering: Some("password".to_string()),
            ..Default::default()
        };
        let query = song_query(&params).unwrap();
        assert_eq!(query.sort.field, SongSortField::CreatedAt);
        assert!(query.sort.descending);

        let params = SongListParams {
            genre: Some("polka".to_string()),
            ..Default::default()
        };
        assert_eq!(song_query(&params).unwrap_err().kind(), "validation");
    }

    #[test]
    fn response_exposes_url_and_filename() {
        let song = Song {
            id: 4,
            title: "Song A".to_string(),
            artist: "The Band".to_string(),
            genre: Genre::Rock,
            description: None,
            duration: Some(200),
            file_path: "songs/The Band/a b.mp3".to_string(),
            file_size: 10,
            uploaded_by: 1,
            uploaded_by_name: "admin".to_string(),
            created_at: 1,
            updated_at: 1,
        };
        let response = SongResponse::from(song);
        assert_eq!(response.filename, "a b.mp3");
        assert_eq!(response.file_url, "/media/songs/The%20Band/a%20b.mp3");
    }
}
