use std::sync::Arc;

use chrono::Utc;
use tokio::sync::Mutex;

use crate::reminder::{Reminder, ReminderFireTime, ReminderId};
use crate::scheduling::NotificationScheduler;
use crate::storage::ReminderStore;

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("reminder name must not be empty")]
    EmptyName,
    #[error("repeat count must be a whole number of at least 1, got {0:?}")]
    InvalidRepeatCount(String),
}

#[derive(Debug, thiserror::Error)]
pub enum AddReminderError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("could not persist the reminder collection")]
    Persistence(#[source] anyhow::Error),
}

struct ServiceState {
    reminders: Vec<Reminder>,
    next_id: ReminderId,
}

/// Sole owner of the canonical reminder list. Callers only ever receive
/// snapshots; every mutation goes through `add` or `delete`, which persist
/// the full collection and keep the backend's scheduled set in step.
pub struct ReminderService {
    state: Mutex<ServiceState>,
    store: Arc<dyn ReminderStore>,
    scheduler: NotificationScheduler,
}

impl ReminderService {
    /// Loads the persisted collection (which degrades to empty on any read
    /// failure) and seeds the id counter past every persisted id.
    pub async fn create(store: Arc<dyn ReminderStore>, scheduler: NotificationScheduler) -> Self {
        let reminders = store.load().await;
        let next_id = reminders
            .iter()
            .map(|reminder| reminder.id + 1)
            .max()
            .unwrap_or(0);

        log::info!("Loaded persisted reminders. [count = {}]", reminders.len());

        Self {
            state: Mutex::new(ServiceState { reminders, next_id }),
            store,
            scheduler,
        }
    }

    /// Validates, appends, persists the full collection, then schedules the
    /// new reminder's remaining occurrences for today. Only the new reminder
    /// is scheduled; existing ones keep whatever the backend already holds.
    pub async fn add(
        &self,
        name: &str,
        fire_at: ReminderFireTime,
        repeat_count_input: &str,
    ) -> Result<Reminder, AddReminderError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::EmptyName.into());
        }
        let repeat_count = parse_repeat_count(repeat_count_input)?;

        // The lock is held across the save so that at most one add/delete
        // transaction is in flight; two interleaved mutations would each
        // persist a collection missing the other's change.
        let mut state = self.state.lock().await;
        let reminder = Reminder {
            id: state.next_id,
            name: name.to_string(),
            fire_at,
            repeat_count,
        };
        state.next_id += 1;
        state.reminders.push(reminder.clone());

        if let Err(error) = self.store.save(&state.reminders).await {
            // The in-memory append is kept; persisted and in-memory state
            // diverge until the next successful save.
            log::warn!(
                "Added reminder could not be persisted. [reminder_id = {}, error = {:#}]",
                reminder.id,
                error
            );
            return Err(AddReminderError::Persistence(error));
        }

        self.scheduler
            .schedule_occurrences(&reminder, Utc::now())
            .await;

        log::info!(
            "Added reminder. [reminder_id = {}, repeat_count = {}]",
            reminder.id,
            reminder.repeat_count
        );

        Ok(reminder)
    }

    /// Removes the reminder, persists the remainder, then cancels everything
    /// on the backend and re-issues occurrences for the remaining reminders
    /// in order, so no stale occurrence of the deleted reminder survives.
    /// An unknown id is a no-op, not an error.
    pub async fn delete(&self, id: ReminderId) -> anyhow::Result<()> {
        let mut state = self.state.lock().await;
        let before = state.reminders.len();
        state.reminders.retain(|reminder| reminder.id != id);
        if state.reminders.len() == before {
            log::debug!("Delete requested for unknown reminder, ignoring. [reminder_id = {}]", id);
            return Ok(());
        }

        let save_result = self.store.save(&state.reminders).await;
        if let Err(error) = &save_result {
            log::warn!(
                "Deleted reminder but the collection could not be persisted. [reminder_id = {}, error = {:#}]",
                id,
                error
            );
        }

        // Reschedule even when the save failed: the in-memory list is
        // authoritative and the deleted reminder's occurrences must not
        // stay pending.
        self.scheduler
            .reschedule_all(&state.reminders, Utc::now())
            .await;

        log::info!("Deleted reminder. [reminder_id = {}]", id);

        save_result
    }

    /// Read-only snapshot in insertion order.
    pub async fn list(&self) -> Vec<Reminder> {
        self.state.lock().await.reminders.clone()
    }
}

fn parse_repeat_count(input: &str) -> Result<u32, ValidationError> {
    match input.trim().parse::<u32>() {
        Ok(count) if count >= 1 => Ok(count),
        _ => Err(ValidationError::InvalidRepeatCount(input.to_string())),
    }
}

#[cfg(test)]
mod tests;
