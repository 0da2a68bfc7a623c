use std::io::ErrorKind;
use std::path::PathBuf;

use async_trait::async_trait;
use chrono::Utc;
use tokio::fs;

use super::ReminderStore;
use super::model::{StoredCollection, StoredReminder};
use crate::reminder::Reminder;

/// JSON-file-backed store: one file, one `"reminders"` key, full overwrite on
/// every save.
pub struct FileReminderStore {
    path: PathBuf,
}

impl FileReminderStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl ReminderStore for FileReminderStore {
    async fn load(&self) -> Vec<Reminder> {
        let raw = match fs::read(&self.path).await {
            Ok(raw) => raw,
            Err(error) if error.kind() == ErrorKind::NotFound => return Vec::new(),
            Err(error) => {
                log::warn!(
                    "Could not read persisted reminders, starting empty. [path = {:?}, error = {}]",
                    self.path,
                    error
                );
                return Vec::new();
            }
        };

        let collection: StoredCollection = match serde_json::from_slice(&raw) {
            Ok(collection) => collection,
            Err(error) => {
                log::warn!(
                    "Persisted reminders are malformed, starting empty. [path = {:?}, error = {}]",
                    self.path,
                    error
                );
                return Vec::new();
            }
        };

        collection
            .reminders
            .into_iter()
            .filter_map(|record| match record.decode() {
                Ok(reminder) => Some(reminder),
                Err(error) => {
                    log::warn!("Skipping malformed persisted reminder. [error = {:#}]", error);
                    None
                }
            })
            .collect()
    }

    async fn save(&self, reminders: &[Reminder]) -> anyhow::Result<()> {
        let today = Utc::now().date_naive();
        let collection = StoredCollection {
            reminders: reminders
                .iter()
                .map(|reminder| StoredReminder::encode(reminder, today))
                .collect(),
        };

        let encoded = serde_json::to_vec_pretty(&collection)?;
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(&self.path, encoded).await?;

        Ok(())
    }
}
