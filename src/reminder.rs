use chrono::Timelike;

pub type ReminderId = u64;

/// Time of day a reminder first fires, truncated to whole seconds.
///
/// The persisted encoding only keeps second precision, so nanoseconds are
/// normalized away on construction to keep round trips exact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReminderFireTime(chrono::NaiveTime);

impl ReminderFireTime {
    pub fn new(inner: chrono::NaiveTime) -> Self {
        let normalized_time = inner.with_nanosecond(0).expect("Will never fail.");
        Self(normalized_time)
    }

    pub fn time(&self) -> chrono::NaiveTime {
        self.0
    }
}

/// A daily reminder. Immutable once created; the only lifecycle transitions
/// are creation and deletion, both owned by the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reminder {
    pub id: ReminderId,
    pub name: String,
    pub fire_at: ReminderFireTime,
    /// Number of hourly occurrences per day, starting at `fire_at`. Always ≥ 1.
    pub repeat_count: u32,
}
