//! Play history routes.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};

use super::extract::{ApiJson, ApiQuery, ClientInfo};
use super::session::Session;
use super::state::{GuardedPlayLogManager, ServerState};
use crate::error::AppResult;
use crate::play_history::{GlobalPlayStats, PlayLogEntry, PlayLogQuery, UserPlayStats};
use crate::store::{PageRequest, Paged};

/// Any `user` field sent by the client is ignored.
#[derive(Deserialize, Debug)]
struct LogPlayBody {
    song: i64,
}

#[derive(Deserialize, Debug, Default)]
#[serde(default)]
struct PlayLogListParams {
    song: Option<i64>,
    user: Option<i64>,
    page: Option<usize>,
    page_size: Option<usize>,
}

#[derive(Serialize)]
struct LogPlayResponse {
    id: i64,
    message: &'static str,
    played_at: i64,
}

#[derive(Serialize)]
struct PlayLogListItem {
    id: i64,
    user_name: String,
    song_title: String,
    song_artist: String,
    played_at: i64,
}

impl From<PlayLogEntry> for PlayLogListItem {
    fn from(entry: PlayLogEntry) -> Self {
        PlayLogListItem {
            id: entry.id,
            user_name: entry.user_name,
            song_title: entry.song_title,
            song_artist: entry.song_artist,
            played_at: entry.played_at,
        }
    }
}

async fn log_play(
    State(play_log_manager): State<GuardedPlayLogManager>,
    session: Session,
    ClientInfo(client): ClientInfo,
    ApiJson(body): ApiJson<LogPlayBody>,
) -> AppResult<impl IntoResponse> {
    let entry = play_log_manager.log_play(&session.subject(), body.song, client)?;
    Ok((
        StatusCode::CREATED,
        Json(LogPlayResponse {
            id: entry.id,
            message: "Song play logged successfully",
            played_at: entry.played_at,
        }),
    ))
}

async fn list_play_logs(
    State(play_log_manager): State<GuardedPlayLogManager>,
    session: Session,
    ApiQuery(params): ApiQuery<PlayLogListParams>,
) -> AppResult<Json<Paged<PlayLogListItem>>> {
    let query = PlayLogQuery {
        user_id: params.user,
        song_id: params.song,
    };
    let page = PageRequest::new(params.page, params.page_size);
    let entries = play_log_manager.list(&session.subject(), query, page)?;
    Ok(Json(entries.map(PlayLogListItem::from)))
}

async fn get_play_log(
    State(play_log_manager): State<GuardedPlayLogManager>,
    session: Session,
    Path(id): Path<i64>,
) -> AppResult<Json<PlayLogEntry>> {
    Ok(Json(play_log_manager.get(&session.subject(), id)?))
}

async fn my_stats(
    State(play_log_manager): State<GuardedPlayLogManager>,
    session: Session,
) -> AppResult<Json<UserPlayStats>> {
    Ok(Json(play_log_manager.my_stats(&session.subject())?))
}

async fn global_stats(
    State(play_log_manager): State<GuardedPlayLogManager>,
    session: Session,
) -> AppResult<Json<GlobalPlayStats>> {
    Ok(Json(play_log_manager.global_stats(&session.subject())?))
}

pub fn make_play_log_routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(list_play_logs).post(log_play))
        .route("/my_stats", get(my_stats))
        .route("/global_stats", get(global_stats))
        .route("/{id}", get(get_play_log))
}
