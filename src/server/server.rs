use anyhow::{Context, Result};
use std::{
    net::SocketAddr,
    sync::Arc,
    time::{Duration, Instant},
};

use tokio_util::sync::CancellationToken;
use tower_http::services::ServeDir;
use tracing::info;

use axum::{
    extract::State,
    middleware,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Serialize;

use super::{
    log_requests, make_account_routes, make_dashboard_routes, make_notification_routes,
    make_play_log_routes, make_playlist_routes, make_song_routes, metrics, state::*, ServerConfig,
};
use crate::catalog::media::MEDIA_URL_PREFIX;
use crate::catalog::{MediaStorage, SongManager};
use crate::dashboard::DashboardManager;
use crate::notifications::NotificationManager;
use crate::play_history::PlayLogManager;
use crate::playlist::PlaylistManager;
use crate::store::FullStore;
use crate::tasks::TaskQueue;
use crate::user::{TokenIssuer, UserManager};

#[derive(Serialize)]
struct ServerStats {
    pub uptime: String,
    pub hash: String,
}

fn format_uptime(duration: Duration) -> String {
    let total_seconds = duration.as_secs();

    let days = total_seconds / 86_400;
    let hours = (total_seconds % 86_400) / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    format!("{}d {:02}:{:02}:{:02}", days, hours, minutes, seconds)
}

async fn home(State(state): State<ServerState>) -> impl IntoResponse {
    let stats = ServerStats {
        uptime: format_uptime(state.start_time.elapsed()),
        hash: state.hash.clone(),
    };
    Json(stats)
}

impl ServerState {
    pub fn new(
        config: ServerConfig,
        store: Arc<dyn FullStore>,
        tokens: TokenIssuer,
        tasks: TaskQueue,
    ) -> Result<ServerState> {
        let media = MediaStorage::new(&config.media_path)
            .with_context(|| format!("Failed to prepare media directory {:?}", config.media_path))?;
        Ok(ServerState {
            config,
            start_time: Instant::now(),
            hash: env!("GIT_HASH").to_owned(),
            user_manager: Arc::new(UserManager::new(store.clone(), tokens, tasks.clone())),
            song_manager: Arc::new(SongManager::new(store.clone(), media, tasks.clone())),
            playlist_manager: Arc::new(PlaylistManager::new(store.clone(), tasks)),
            play_log_manager: Arc::new(PlayLogManager::new(store.clone())),
            notification_manager: Arc::new(NotificationManager::new(store.clone())),
            dashboard_manager: Arc::new(DashboardManager::new(store)),
        })
    }
}

pub fn make_app(
    config: ServerConfig,
    store: Arc<dyn FullStore>,
    tokens: TokenIssuer,
    tasks: TaskQueue,
) -> Result<Router> {
    let state = ServerState::new(config.clone(), store, tokens, tasks)?;

    let api_routes: Router = Router::new()
        .nest("/accounts", make_account_routes(&config)?)
        .nest("/songs", make_song_routes(&config))
        .nest("/playlists", make_playlist_routes())
        .nest("/play-logs", make_play_log_routes())
        .nest("/notifications", make_notification_routes())
        .nest("/dashboard", make_dashboard_routes())
        .with_state(state.clone());

    let home_router: Router = Router::new()
        .route("/", get(home))
        .with_state(state.clone());

    let mut app: Router = home_router
        .nest("/v1", api_routes)
        .nest_service(MEDIA_URL_PREFIX, ServeDir::new(&config.media_path));

    app = app.layer(middleware::from_fn_with_state(state.clone(), log_requests));

    Ok(app)
}

fn make_metrics_app() -> Router {
    Router::new().route("/metrics", get(metrics::metrics_handler))
}

/// Serves the API and the metrics endpoint until `shutdown` is cancelled.
pub async fn run_server(
    config: ServerConfig,
    store: Arc<dyn FullStore>,
    tokens: TokenIssuer,
    tasks: TaskQueue,
    shutdown: CancellationToken,
) -> Result<()> {
    let port = config.port;
    let metrics_port = config.metrics_port;
    let app = make_app(config, store, tokens, tasks)?;

    let metrics_listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", metrics_port))
        .await
        .with_context(|| format!("Failed to bind metrics port {}", metrics_port))?;
    let metrics_shutdown = shutdown.clone();
    tokio::spawn(async move {
        let served = axum::serve(metrics_listener, make_metrics_app())
            .with_graceful_shutdown(async move { metrics_shutdown.cancelled().await })
            .await;
        if let Err(err) = served {
            tracing::error!("Metrics server failed: {}", err);
        }
    });
    info!("Metrics available at port {}", metrics_port);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port))
        .await
        .with_context(|| format!("Failed to bind port {}", port))?;
    info!("Ready to serve at port {}", port);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(async move { shutdown.cancelled().await })
    .await?;
    info!("Server stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::RequestsLoggingLevel;
    use crate::store::test_support::new_store;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use tower::ServiceExt; // for `oneshot`

    fn test_app() -> (Router, tempfile::TempDir) {
        let (store, dir) = new_store();
        let config = ServerConfig {
            requests_logging_level: RequestsLoggingLevel::None,
            media_path: dir.path().join("media"),
            ..ServerConfig::default()
        };
        let (tasks, _receiver) = TaskQueue::new();
        let app = make_app(
            config,
            Arc::new(store),
            TokenIssuer::new("test-secret", 60),
            tasks,
        )
        .unwrap();
        (app, dir)
    }

    #[test]
    fn uptime_formatting() {
        assert_eq!(format_uptime(Duration::from_secs(0)), "0d 00:00:00");
        assert_eq!(
            format_uptime(Duration::from_secs(2 * 86_400 + 3 * 3600 + 4 * 60 + 5)),
            "2d 03:04:05"
        );
    }

    #[tokio::test]
    async fn home_is_public() {
        let (app, _dir) = test_app();
        let request = Request::builder().uri("/").body(Body::empty()).unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn responds_unauthorized_on_protected_routes() {
        let (app, _dir) = test_app();

        let protected_routes = vec![
            ("GET", "/v1/accounts/profile"),
            ("POST", "/v1/accounts/logout"),
            ("GET", "/v1/songs"),
            ("GET", "/v1/songs/1"),
            ("GET", "/v1/songs/1/download"),
            ("GET", "/v1/playlists"),
            ("GET", "/v1/playlists/1/songs"),
            ("GET", "/v1/play-logs"),
            ("GET", "/v1/play-logs/my_stats"),
            ("GET", "/v1/notifications"),
            ("GET", "/v1/notifications/unread_count"),
            ("GET", "/v1/dashboard/stats"),
        ];

        for (method, route) in protected_routes.into_iter() {
            let request = Request::builder()
                .method(method)
                .uri(route)
                .body(Body::empty())
                .unwrap();
            let response = app.clone().oneshot(request).await.unwrap();
            assert_eq!(
                response.status(),
                StatusCode::UNAUTHORIZED,
                "{} {}",
                method,
                route
            );
        }
    }

    #[tokio::test]
    async fn refresh_without_token_is_unauthorized() {
        let (app, _dir) = test_app();
        let request = Request::builder()
            .method("POST")
            .uri("/v1/accounts/refresh")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
