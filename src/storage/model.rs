use anyhow::Context;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::reminder::{Reminder, ReminderFireTime};

/// On-disk shape of one reminder. The `time` field is an absolute ISO-8601
/// timestamp whose date portion is written as "today at save time" and
/// discarded again on load; only hour/minute/second survive the round trip.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredReminder {
    pub id: String,
    pub name: String,
    pub time: String,
    pub repeat_count: u32,
}

/// The single persisted value, keyed `"reminders"`.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct StoredCollection {
    pub reminders: Vec<StoredReminder>,
}

impl StoredReminder {
    pub fn encode(reminder: &Reminder, today: NaiveDate) -> Self {
        let timestamp = DateTime::<Utc>::from_naive_utc_and_offset(
            today.and_time(reminder.fire_at.time()),
            Utc,
        );

        Self {
            id: reminder.id.to_string(),
            name: reminder.name.clone(),
            time: timestamp.to_rfc3339(),
            repeat_count: reminder.repeat_count,
        }
    }

    /// Validates the record and turns it back into a domain reminder.
    /// Records failing any of these checks are quarantined by the caller.
    pub fn decode(self) -> anyhow::Result<Reminder> {
        let id = self
            .id
            .parse()
            .with_context(|| format!("invalid reminder id {:?}", self.id))?;

        anyhow::ensure!(!self.name.trim().is_empty(), "reminder name is empty");
        anyhow::ensure!(
            self.repeat_count >= 1,
            "repeat count must be at least 1, got {}",
            self.repeat_count
        );

        let timestamp = DateTime::parse_from_rfc3339(&self.time)
            .with_context(|| format!("invalid reminder timestamp {:?}", self.time))?;

        Ok(Reminder {
            id,
            name: self.name,
            fire_at: ReminderFireTime::new(timestamp.time()),
            repeat_count: self.repeat_count,
        })
    }
}
