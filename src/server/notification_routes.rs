//! Notification inbox routes. Every route only ever touches the caller's own rows.

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::account_routes::MessageResponse;
use super::extract::{optional_json, ApiJson, ApiQuery};
use super::session::Session;
use super::state::{GuardedNotificationManager, ServerState};
use crate::error::{AppError, AppResult};
use crate::notifications::{Notification, NotificationDraft, NotificationQuery, NotificationType};
use crate::store::{PageRequest, Paged};

#[derive(Deserialize, Debug, Default)]
#[serde(default)]
struct NotificationListParams {
    is_read: Option<bool>,
    notification_type: Option<String>,
    page: Option<usize>,
    page_size: Option<usize>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(default)]
struct CreateNotificationBody {
    title: String,
    message: String,
    notification_type: Option<NotificationType>,
    related_playlist: Option<i64>,
    related_song: Option<i64>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(default)]
struct MarkAllReadBody {
    notification_ids: Option<Vec<i64>>,
}

#[derive(Serialize)]
struct UnreadCountResponse {
    unread_count: i64,
}

impl NotificationListParams {
    fn to_query(&self) -> AppResult<NotificationQuery> {
        let notification_type = match self.notification_type.as_deref() {
            None | Some("") => None,
            Some(raw) => Some(NotificationType::from_str(raw).ok_or_else(|| {
                AppError::invalid_field(
                    "notification_type",
                    format!("\"{}\" is not a valid choice.", raw),
                )
            })?),
        };
        Ok(NotificationQuery {
            is_read: self.is_read,
            notification_type,
        })
    }
}

async fn list_notifications(
    State(notification_manager): State<GuardedNotificationManager>,
    session: Session,
    ApiQuery(params): ApiQuery<NotificationListParams>,
) -> AppResult<Json<Paged<Notification>>> {
    let query = params.to_query()?;
    let page = PageRequest::new(params.page, params.page_size);
    Ok(Json(notification_manager.list(&session.subject(), &query, page)?))
}

async fn create_notification(
    State(notification_manager): State<GuardedNotificationManager>,
    session: Session,
    ApiJson(body): ApiJson<CreateNotificationBody>,
) -> AppResult<impl IntoResponse> {
    let notification = notification_manager.create(
        &session.subject(),
        NotificationDraft {
            title: body.title,
            message: body.message,
            notification_type: body.notification_type,
            related_playlist: body.related_playlist,
            related_song: body.related_song,
        },
    )?;
    Ok((StatusCode::CREATED, Json(notification)))
}

async fn get_notification(
    State(notification_manager): State<GuardedNotificationManager>,
    session: Session,
    Path(id): Path<i64>,
) -> AppResult<Json<Notification>> {
    Ok(Json(notification_manager.get(&session.subject(), id)?))
}

async fn delete_notification(
    State(notification_manager): State<GuardedNotificationManager>,
    session: Session,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    notification_manager.delete(&session.subject(), id)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn mark_read(
    State(notification_manager): State<GuardedNotificationManager>,
    session: Session,
    Path(id): Path<i64>,
) -> AppResult<Json<MessageResponse>> {
    notification_manager.mark_read(&session.subject(), id)?;
    Ok(MessageResponse::new("Notification marked as read"))
}

async fn mark_all_read(
    State(notification_manager): State<GuardedNotificationManager>,
    session: Session,
    body: Bytes,
) -> AppResult<Json<MessageResponse>> {
    let body: MarkAllReadBody = optional_json(&body)?;
    let marked = notification_manager.mark_all_read(&session.subject(), body.notification_ids)?;
    debug!("User {} marked {} notifications read", session.user.id, marked);
    Ok(MessageResponse::new(format!(
        "{} notification(s) marked as read",
        marked
    )))
}

async fn unread_count(
    State(notification_manager): State<GuardedNotificationManager>,
    session: Session,
) -> AppResult<Json<UnreadCountResponse>> {
    let unread_count = notification_manager.unread_count(&session.subject())?;
    Ok(Json(UnreadCountResponse { unread_count }))
}

async fn clear_all(
    State(notification_manager): State<GuardedNotificationManager>,
    session: Session,
) -> AppResult<Json<MessageResponse>> {
    let deleted = notification_manager.clear_all(&session.subject())?;
    Ok(MessageResponse::new(format!(
        "{} notification(s) deleted",
        deleted
    )))
}

pub fn make_notification_routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(list_notifications).post(create_notification))
        .route("/mark_all_read", post(mark_all_read))
        .route("/unread_count", get(unread_count))
        .route("/clear_all", delete(clear_all))
        .route("/{id}", get(get_notification).delete(delete_notification))
        .route("/{id}/mark_read", post(mark_read))
}
