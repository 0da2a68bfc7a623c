use std::sync::Arc;

use chrono::{DateTime, NaiveTime, TimeDelta, Utc};

use crate::notification::{NotificationBackend, NotificationContent, NotificationHandle};
use crate::reminder::Reminder;

const NOTIFICATION_TITLE: &str = "Reminder";

/// Translates reminders into one-shot backend schedule/cancel calls.
///
/// Occurrences are computed against "today" at each pass; slots already in
/// the past are skipped and nothing re-arms them the next day, so a fresh
/// pass is required daily.
pub struct NotificationScheduler {
    backend: Arc<dyn NotificationBackend>,
}

impl NotificationScheduler {
    pub fn new(backend: Arc<dyn NotificationBackend>) -> Self {
        Self { backend }
    }

    /// Issues one backend request per remaining occurrence of `reminder`
    /// today. Backend failures are fire-and-forget: logged, not retried,
    /// never surfaced to the caller.
    pub async fn schedule_occurrences(
        &self,
        reminder: &Reminder,
        now: DateTime<Utc>,
    ) -> Vec<NotificationHandle> {
        let mut handles = Vec::new();

        for fire_at in occurrence_times(reminder.fire_at.time(), reminder.repeat_count, now) {
            let content = NotificationContent {
                title: NOTIFICATION_TITLE.to_string(),
                body: reminder.name.clone(),
            };

            match self.backend.schedule_notification(content, fire_at).await {
                Ok(handle) => handles.push(handle),
                Err(error) => {
                    log::warn!(
                        "Could not schedule notification occurrence. [reminder_id = {}, fire_at = {}, error = {:#}]",
                        reminder.id,
                        fire_at,
                        error
                    );
                }
            }
        }

        handles
    }

    /// Cancels everything on the backend, then re-issues occurrences for each
    /// reminder in order. The backend owns no partial cancel, so this is the
    /// only way to guarantee the scheduled set matches the reminder set.
    pub async fn reschedule_all(&self, reminders: &[Reminder], now: DateTime<Utc>) {
        if let Err(error) = self.backend.cancel_all().await {
            log::warn!("Could not cancel scheduled notifications. [error = {:#}]", error);
        }

        for reminder in reminders {
            self.schedule_occurrences(reminder, now).await;
        }
    }
}

/// Remaining occurrence instants for today: `today.and_time(fire_at) + i
/// hours` for each repeat index, keeping only instants strictly after `now`.
pub(crate) fn occurrence_times(
    fire_at: NaiveTime,
    repeat_count: u32,
    now: DateTime<Utc>,
) -> Vec<DateTime<Utc>> {
    let first = now.date_naive().and_time(fire_at);

    (0..repeat_count)
        .filter_map(|index| first.checked_add_signed(TimeDelta::hours(index as i64)))
        .filter(|occurrence| *occurrence > now.naive_utc())
        .map(|occurrence| DateTime::from_naive_utc_and_offset(occurrence, Utc))
        .collect()
}
