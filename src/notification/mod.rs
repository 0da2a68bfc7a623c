pub mod permission;

mod in_process;

pub use in_process::InProcessNotificationBackend;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationContent {
    pub title: String,
    pub body: String,
}

/// Platform channel registration payload, passed to the backend once at
/// startup. Best-effort: the host may ignore any of it.
#[derive(Debug, Clone, Deserialize)]
pub struct NotificationChannel {
    pub channel_id: String,
    pub name: String,
    pub importance: u8,
    pub vibration_pattern: Vec<u64>,
    pub color: String,
}

/// Opaque handle to one scheduled occurrence. The backend owns no partial
/// cancel, so handles are informational only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NotificationHandle(pub u64);

/// The host platform's local-notification API. Consumed by the scheduler,
/// never reimplemented by it; a denied permission gate is expected to make
/// `schedule_notification` a delivery no-op on the host side.
#[async_trait]
pub trait NotificationBackend: Send + Sync + 'static {
    async fn register_channel(&self, channel: &NotificationChannel) -> anyhow::Result<()>;

    /// Schedules a single one-shot notification firing at `fire_at`.
    async fn schedule_notification(
        &self,
        content: NotificationContent,
        fire_at: DateTime<Utc>,
    ) -> anyhow::Result<NotificationHandle>;

    /// Cancels every notification currently scheduled, system-wide.
    async fn cancel_all(&self) -> anyhow::Result<()>;
}
