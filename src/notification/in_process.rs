use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time;
use tokio_util::sync::CancellationToken;

use super::{NotificationBackend, NotificationChannel, NotificationContent, NotificationHandle};

const CANCEL_TIMEOUT: Duration = Duration::from_secs(5);

struct ScheduledTask {
    task_handle: JoinHandle<()>,
    cancellation_token: CancellationToken,
}

impl ScheduledTask {
    async fn cancel(self, timeout: Duration) {
        self.cancellation_token.cancel();
        let _ = time::timeout(timeout, self.task_handle).await;
    }
}

/// Notification backend backed by in-process tokio timers: each accepted
/// schedule call spawns a task that sleeps until the trigger instant and then
/// emits the notification to the log. Stands in for a host notification
/// system in the binary and in timer tests.
pub struct InProcessNotificationBackend {
    tasks: RwLock<HashMap<u64, ScheduledTask>>,
    next_handle: AtomicU64,
    fired: Arc<AtomicU64>,
    delivery_enabled: bool,
}

impl InProcessNotificationBackend {
    /// `delivery_enabled` mirrors the permission gate decision: a denied host
    /// accepts schedule calls but delivers nothing.
    pub fn new(delivery_enabled: bool) -> Self {
        Self {
            tasks: RwLock::new(HashMap::new()),
            next_handle: AtomicU64::new(0),
            fired: Arc::new(AtomicU64::new(0)),
            delivery_enabled,
        }
    }

    pub async fn pending_count(&self) -> usize {
        self.tasks.read().await.len()
    }

    pub fn fired_count(&self) -> u64 {
        self.fired.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl NotificationBackend for InProcessNotificationBackend {
    async fn register_channel(&self, channel: &NotificationChannel) -> anyhow::Result<()> {
        log::info!(
            "Registered notification channel. [channel_id = {}, name = {}, importance = {}]",
            channel.channel_id,
            channel.name,
            channel.importance
        );
        Ok(())
    }

    async fn schedule_notification(
        &self,
        content: NotificationContent,
        fire_at: DateTime<Utc>,
    ) -> anyhow::Result<NotificationHandle> {
        let handle = NotificationHandle(self.next_handle.fetch_add(1, Ordering::SeqCst));

        if !self.delivery_enabled {
            log::debug!(
                "Notification permission denied, dropping schedule call. [title = {}]",
                content.title
            );
            return Ok(handle);
        }

        let delay = (fire_at - Utc::now()).to_std().unwrap_or_default();

        let cancellation_token = CancellationToken::new();
        let task_cancellation_token = cancellation_token.child_token();
        let fired = Arc::clone(&self.fired);

        let task_handle = tokio::spawn(async move {
            tokio::select! {
                _ = task_cancellation_token.cancelled() => {
                    log::debug!("Scheduled notification was cancelled. [title = {}]", content.title);
                },
                _ = time::sleep(delay) => {
                    fired.fetch_add(1, Ordering::SeqCst);
                    log::info!("{}: {}", content.title, content.body);
                }
            }
        });

        self.tasks.write().await.insert(
            handle.0,
            ScheduledTask {
                task_handle,
                cancellation_token,
            },
        );

        Ok(handle)
    }

    async fn cancel_all(&self) -> anyhow::Result<()> {
        let drained: Vec<_> = self.tasks.write().await.drain().collect();
        let count = drained.len();
        for (_, task) in drained {
            task.cancel(CANCEL_TIMEOUT).await;
        }
        log::info!("Cancelled all scheduled notifications. [count = {}]", count);
        Ok(())
    }
}
