use super::intent::TaskIntent;
use super::mailer::{welcome_email, Mailer};
use crate::notifications::fan_out;
use crate::server::metrics;
use crate::store::FullStore;
use anyhow::Result;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Drains the task queue one intent at a time. Failures are logged and
/// never reach the request that submitted the intent.
pub struct TaskWorker {
    store: Arc<dyn FullStore>,
    mailer: Arc<dyn Mailer>,
    receiver: mpsc::UnboundedReceiver<TaskIntent>,
}

impl TaskWorker {
    pub fn new(
        store: Arc<dyn FullStore>,
        mailer: Arc<dyn Mailer>,
        receiver: mpsc::UnboundedReceiver<TaskIntent>,
    ) -> Self {
        Self {
            store,
            mailer,
            receiver,
        }
    }

    pub async fn run(mut self, shutdown: CancellationToken) {
        info!("Task worker started");
        loop {
            tokio::select! {
                maybe_intent = self.receiver.recv() => {
                    match maybe_intent {
                        Some(intent) => self.dispatch(intent).await,
                        None => {
                            debug!("All task queue handles dropped");
                            break;
                        }
                    }
                }
                _ = shutdown.cancelled() => {
                    info!("Task worker received shutdown signal");
                    break;
                }
            }
        }
        info!("Task worker stopped");
    }

    async fn dispatch(&self, intent: TaskIntent) {
        let kind = intent.kind();
        let label = intent.to_string();
        let store = self.store.clone();
        let mailer = self.mailer.clone();
        let start = Instant::now();

        // Store calls are synchronous.
        let outcome = tokio::task::spawn_blocking(move || {
            execute(store.as_ref(), mailer.as_ref(), &intent)
        })
        .await;

        match outcome {
            Ok(Ok(written)) => {
                info!(
                    "Task {} completed in {:?} ({} rows)",
                    label,
                    start.elapsed(),
                    written
                );
                metrics::record_task_processed(kind, "success");
            }
            Ok(Err(err)) => {
                warn!("Task {} failed: {:#}", label, err);
                metrics::record_task_processed(kind, "failed");
            }
            Err(err) => {
                error!("Task {} panicked: {}", label, err);
                metrics::record_task_processed(kind, "panicked");
            }
        }
    }
}

/// Runs a single intent against the store, returning the number of
/// notifications or emails produced.
pub fn execute(store: &dyn FullStore, mailer: &dyn Mailer, intent: &TaskIntent) -> Result<usize> {
    let now = chrono::Utc::now().timestamp();
    match *intent {
        TaskIntent::SendWelcomeEmail { user_id } => {
            let Some(user) = store.get_user(user_id)? else {
                debug!("Skipping welcome email, user {} no longer exists", user_id);
                return Ok(0);
            };
            mailer.send(&welcome_email(&user))?;
            Ok(1)
        }
        TaskIntent::WelcomeNotification { user_id } => fan_out::welcome(store, user_id, now),
        TaskIntent::NewSongFanOut {
            song_id,
            uploader_id,
        } => fan_out::new_song(store, song_id, uploader_id, now),
        TaskIntent::PlaylistUpdateFanOut {
            playlist_id,
            song_id,
        } => fan_out::playlist_update(store, playlist_id, song_id, now),
    }
}
