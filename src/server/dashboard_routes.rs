use axum::{extract::State, routing::get, Json, Router};

use super::session::Session;
use super::state::{GuardedDashboardManager, ServerState};
use crate::dashboard::DashboardStats;
use crate::error::AppResult;

async fn stats(
    State(dashboard_manager): State<GuardedDashboardManager>,
    session: Session,
) -> AppResult<Json<DashboardStats>> {
    Ok(Json(dashboard_manager.stats(&session.subject())?))
}

pub fn make_dashboard_routes() -> Router<ServerState> {
    Router::new().route("/stats", get(stats))
}
