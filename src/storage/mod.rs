pub mod model;

mod file;

pub use file::FileReminderStore;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::reminder::Reminder;

/// Durable persistence of the whole reminder collection. `save` is always a
/// full overwrite of the previously persisted collection; there are no
/// incremental writes, so consistency is "last write wins".
#[async_trait]
pub trait ReminderStore: Send + Sync {
    /// Loads the persisted collection. Unreadable or malformed data degrades
    /// to an empty collection and never propagates as an error.
    async fn load(&self) -> Vec<Reminder>;

    async fn save(&self, reminders: &[Reminder]) -> anyhow::Result<()>;
}

pub struct InMemoryReminderStore {
    store: RwLock<Vec<Reminder>>,
}

impl InMemoryReminderStore {
    pub fn new() -> Self {
        InMemoryReminderStore {
            store: RwLock::new(Vec::new()),
        }
    }
}

impl Default for InMemoryReminderStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ReminderStore for InMemoryReminderStore {
    async fn load(&self) -> Vec<Reminder> {
        self.store.read().await.clone()
    }

    async fn save(&self, reminders: &[Reminder]) -> anyhow::Result<()> {
        *self.store.write().await = reminders.to_vec();
        Ok(())
    }
}
