//! Playlist routes.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post},
    Json, Router,
};
use serde::{Deserialize, Deserializer, Serialize};

use super::account_routes::MessageResponse;
use super::extract::{ApiJson, ApiQuery};
use super::session::Session;
use super::state::{GuardedPlaylistManager, ServerState};
use crate::error::AppResult;
use crate::playlist::{
    Playlist, PlaylistDetail, PlaylistDraft, PlaylistQuery, PlaylistScope, PlaylistSongEntry,
    PlaylistSort, PlaylistUpdate,
};
use crate::store::{PageRequest, Paged};

#[derive(Deserialize, Debug, Default)]
#[serde(default)]
struct PlaylistListParams {
    is_public: Option<bool>,
    created_by: Option<i64>,
    search: Option<String>,
    ordering: Option<String>,
    page: Option<usize>,
    page_size: Option<usize>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(default)]
struct CreatePlaylistBody {
    name: String,
    description: Option<String>,
    is_public: Option<bool>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(default)]
struct UpdatePlaylistBody {
    name: Option<String>,
    /// Absent leaves the description alone, `null` clears it.
    #[serde(deserialize_with = "present")]
    description: Option<Option<String>>,
    is_public: Option<bool>,
}

/// Only runs for fields present in the input, so a missing field keeps
/// its default `None` while an explicit value (`null` included) is `Some`.
fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

#[derive(Deserialize, Debug)]
struct AddSongBody {
    song_id: i64,
    #[serde(default)]
    order: i64,
}

#[derive(Deserialize, Debug)]
struct RemoveSongBody {
    song_id: i64,
}

#[derive(Serialize)]
struct AddSongResponse {
    message: &'static str,
    song: String,
    created: bool,
}

impl PlaylistListParams {
    fn to_query(&self) -> PlaylistQuery {
        // The scope is decided by the manager from the caller's role.
        let mut query = PlaylistQuery::new(PlaylistScope::All);
        query.is_public = self.is_public;
        query.created_by = self.created_by;
        query.search = self.search.clone().filter(|s| !s.trim().is_empty());
        if let Some(sort) = self.ordering.as_deref().and_then(PlaylistSort::parse) {
            query.sort = sort;
        }
        query
    }
}

async fn list_playlists(
    State(playlist_manager): State<GuardedPlaylistManager>,
    session: Session,
    ApiQuery(params): ApiQuery<PlaylistListParams>,
) -> AppResult<Json<Paged<Playlist>>> {
    let page = PageRequest::new(params.page, params.page_size);
    Ok(Json(playlist_manager.list(
        &session.subject(),
        params.to_query(),
        page,
    )?))
}

async fn create_playlist(
    State(playlist_manager): State<GuardedPlaylistManager>,
    session: Session,
    ApiJson(body): ApiJson<CreatePlaylistBody>,
) -> AppResult<impl IntoResponse> {
    let playlist = playlist_manager.create(
        &session.subject(),
        PlaylistDraft {
            name: body.name,
            description: body.description,
            is_public: body.is_public,
        },
    )?;
    Ok((StatusCode::CREATED, Json(playlist)))
}

async fn get_playlist(
    State(playlist_manager): State<GuardedPlaylistManager>,
    session: Session,
    Path(id): Path<i64>,
) -> AppResult<Json<PlaylistDetail>> {
    Ok(Json(playlist_manager.get(&session.subject(), id)?))
}

async fn update_playlist(
    State(playlist_manager): State<GuardedPlaylistManager>,
    session: Session,
    Path(id): Path<i64>,
    ApiJson(body): ApiJson<UpdatePlaylistBody>,
) -> AppResult<Json<Playlist>> {
    let update = PlaylistUpdate {
        name: body.name,
        description: body.description,
        is_public: body.is_public,
    };
    Ok(Json(playlist_manager.update(&session.subject(), id, update)?))
}

async fn delete_playlist(
    State(playlist_manager): State<GuardedPlaylistManager>,
    session: Session,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    playlist_manager.delete(&session.subject(), id)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn add_song(
    State(playlist_manager): State<GuardedPlaylistManager>,
    session: Session,
    Path(id): Path<i64>,
    ApiJson(body): ApiJson<AddSongBody>,
) -> AppResult<impl IntoResponse> {
    let outcome = playlist_manager.add_song(&session.subject(), id, body.song_id, body.order)?;
    let (status, message) = if outcome.created {
        (StatusCode::CREATED, "Song added to playlist successfully")
    } else {
        (StatusCode::OK, "Song already in playlist")
    };
    Ok((
        status,
        Json(AddSongResponse {
            message,
            song: outcome.song_title,
            created: outcome.created,
        }),
    ))
}

async fn remove_song(
    State(playlist_manager): State<GuardedPlaylistManager>,
    session: Session,
    Path(id): Path<i64>,
    ApiJson(body): ApiJson<RemoveSongBody>,
) -> AppResult<Json<MessageResponse>> {
    playlist_manager.remove_song(&session.subject(), id, body.song_id)?;
    Ok(MessageResponse::new("Song removed from playlist successfully"))
}

async fn playlist_songs(
    State(playlist_manager): State<GuardedPlaylistManager>,
    session: Session,
    Path(id): Path<i64>,
) -> AppResult<Json<Vec<PlaylistSongEntry>>> {
    Ok(Json(playlist_manager.songs(&session.subject(), id)?))
}

pub fn make_playlist_routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(list_playlists).post(create_playlist))
        .route(
            "/{id}",
            get(get_playlist)
                .put(update_playlist)
                .patch(update_playlist)
                .delete(delete_playlist),
        )
        .route("/{id}/add_song", post(add_song))
        .route("/{id}/remove_song", delete(remove_song))
        .route("/{id}/songs", get(playlist_songs))
}
