//! Test server lifecycle management
//!
//! This module manages spawning and shutting down test HTTP servers.
//! Each test gets an isolated server with its own database and media directory.

use super::constants::*;
use super::fixtures::{create_test_db_with_users, SeededIds};
use music_catalog_server::server::{make_app, RequestsLoggingLevel, ServerConfig};
use music_catalog_server::tasks::{Email, Mailer};
use music_catalog_server::{FullStore, SqliteMusicStore, TaskQueue, TaskWorker, TokenIssuer};
use std::future::Future;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

/// Mailer that keeps every email in memory
#[derive(Default)]
pub struct RecordingMailer {
    pub sent: Mutex<Vec<Email>>,
}

impl Mailer for RecordingMailer {
    fn send(&self, email: &Email) -> anyhow::Result<()> {
        self.sent.lock().unwrap().push(email.clone());
        Ok(())
    }
}

/// Test server instance with isolated database and media directory
///
/// When dropped, the server and its task worker shut down and temp resources are cleaned up.
pub struct TestServer {
    /// Base URL for making requests (e.g., "http://127.0.0.1:12345")
    pub base_url: String,

    /// The port the server is listening on
    pub port: u16,

    /// Store for direct database access in tests
    pub store: Arc<dyn FullStore>,

    /// Ids of the fixture rows
    pub ids: SeededIds,

    /// Emails delivered by the task worker
    pub mailer: Arc<RecordingMailer>,

    /// Root of the uploaded media files
    pub media_path: PathBuf,

    // Private fields - keep resources alive until drop
    _temp_dir: TempDir,
    shutdown: CancellationToken,
}

impl TestServer {
    /// Spawns a new test server on a random port
    ///
    /// This function:
    /// 1. Creates a temporary database with test users and one song
    /// 2. Starts a task worker with a recording mailer
    /// 3. Binds to a random port (127.0.0.1:0)
    /// 4. Spawns the server in a background task
    /// 5. Waits for the server to be ready
    ///
    /// # Panics
    ///
    /// Panics if fixture creation, port binding or server startup fails.
    pub async fn spawn() -> Self {
        Self::spawn_with(|_| {}).await
    }

    /// Like [`TestServer::spawn`], letting the test adjust the server config first.
    pub async fn spawn_with(customize: impl FnOnce(&mut ServerConfig)) -> Self {
        let (temp_dir, db_path, media_path, ids) =
            create_test_db_with_users().expect("Failed to create test database");

        let store: Arc<dyn FullStore> =
            Arc::new(SqliteMusicStore::new(&db_path).expect("Failed to open store"));

        // Bind to random port
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");

        let port = listener
            .local_addr()
            .expect("Failed to get local address")
            .port();

        let base_url = format!("http://127.0.0.1:{}", port);

        let mut config = ServerConfig {
            port,
            requests_logging_level: RequestsLoggingLevel::None,
            media_path,
            ..ServerConfig::default()
        };
        customize(&mut config);
        let media_path = config.media_path.clone();

        let shutdown = CancellationToken::new();

        let (tasks, receiver) = TaskQueue::new();
        let mailer = Arc::new(RecordingMailer::default());
        let worker = TaskWorker::new(store.clone(), mailer.clone(), receiver);
        tokio::spawn(worker.run(shutdown.clone()));

        let app = make_app(
            config,
            store.clone(),
            TokenIssuer::new(TEST_JWT_SECRET, 60),
            tasks,
        )
        .expect("Failed to build app");

        // Spawn server in background task with graceful shutdown
        let server_shutdown = shutdown.clone();
        tokio::spawn(async move {
            axum::serve(
                listener,
                app.into_make_service_with_connect_info::<SocketAddr>(),
            )
            .with_graceful_shutdown(async move { server_shutdown.cancelled().await })
            .await
            .expect("Server failed");
        });

        let server = Self {
            base_url,
            port,
            store,
            ids,
            mailer,
            media_path,
            _temp_dir: temp_dir,
            shutdown,
        };

        server.wait_for_ready().await;

        server
    }

    /// Emails sent so far
    pub fn sent_emails(&self) -> Vec<Email> {
        self.mailer.sent.lock().unwrap().clone()
    }

    /// Waits for the server to become ready by polling the / endpoint
    async fn wait_for_ready(&self) {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(100))
            .build()
            .expect("Failed to build reqwest client");

        let start = std::time::Instant::now();
        let timeout = Duration::from_millis(SERVER_READY_TIMEOUT_MS);

        loop {
            if start.elapsed() > timeout {
                panic!(
                    "Server did not become ready within {}ms",
                    SERVER_READY_TIMEOUT_MS
                );
            }

            match client.get(format!("{}/", self.base_url)).send().await {
                Ok(response) if response.status().is_success() => {
                    // Server is ready
                    return;
                }
                _ => {
                    // Server not ready yet, wait and retry
                    tokio::time::sleep(Duration::from_millis(SERVER_READY_POLL_INTERVAL_MS)).await;
                }
            }
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.shutdown.cancel();
        // TempDir will be cleaned up automatically
    }
}

/// Polls `check` until it returns true or the deferred-effect timeout elapses.
/// Returns the last result.
pub async fn wait_until<F, Fut>(mut check: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    let start = std::time::Instant::now();
    let timeout = Duration::from_millis(DEFERRED_EFFECT_TIMEOUT_MS);
    loop {
        if check().await {
            return true;
        }
        if start.elapsed() > timeout {
            return false;
        }
        tokio::time::sleep(Duration::from_millis(25)).await;
    }
}
