use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, NaiveTime, Utc};

use super::*;
use crate::notification::{
    NotificationBackend, NotificationChannel, NotificationContent, NotificationHandle,
};
use crate::storage::InMemoryReminderStore;

#[derive(Debug, Clone, PartialEq, Eq)]
enum BackendCall {
    Schedule { title: String, body: String },
    CancelAll,
}

type RecordedCalls = Arc<Mutex<Vec<BackendCall>>>;

struct RecordingNotificationBackend {
    calls: RecordedCalls,
}

#[async_trait]
impl NotificationBackend for RecordingNotificationBackend {
    async fn register_channel(&self, _channel: &NotificationChannel) -> anyhow::Result<()> {
        Ok(())
    }

    async fn schedule_notification(
        &self,
        content: NotificationContent,
        _fire_at: DateTime<Utc>,
    ) -> anyhow::Result<NotificationHandle> {
        self.calls.lock().unwrap().push(BackendCall::Schedule {
            title: content.title,
            body: content.body,
        });
        Ok(NotificationHandle(0))
    }

    async fn cancel_all(&self) -> anyhow::Result<()> {
        self.calls.lock().unwrap().push(BackendCall::CancelAll);
        Ok(())
    }
}

struct FailingStore;

#[async_trait]
impl ReminderStore for FailingStore {
    async fn load(&self) -> Vec<Reminder> {
        Vec::new()
    }

    async fn save(&self, _reminders: &[Reminder]) -> anyhow::Result<()> {
        anyhow::bail!("disk is gone")
    }
}

struct TestContext {
    calls: RecordedCalls,
    store: Arc<InMemoryReminderStore>,
    service: ReminderService,
}

impl TestContext {
    async fn new() -> Self {
        Self::with_store(Arc::new(InMemoryReminderStore::new())).await
    }

    async fn with_store(store: Arc<InMemoryReminderStore>) -> Self {
        let calls: RecordedCalls = Arc::new(Mutex::new(Vec::new()));
        let backend = Arc::new(RecordingNotificationBackend {
            calls: calls.clone(),
        });
        let scheduler = NotificationScheduler::new(backend);
        let service = ReminderService::create(store.clone(), scheduler).await;

        Self {
            calls,
            store,
            service,
        }
    }

    fn recorded_calls(&self) -> Vec<BackendCall> {
        self.calls.lock().unwrap().clone()
    }

    fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }
}

fn fire_time(hour: u32, minute: u32) -> ReminderFireTime {
    ReminderFireTime::new(NaiveTime::from_hms_opt(hour, minute, 0).unwrap())
}

#[tokio::test]
pub async fn add_with_valid_input_persists_one_reminder() {
    let ctx = TestContext::new().await;

    let reminder = ctx
        .service
        .add("stretch", fire_time(14, 0), "3")
        .await
        .unwrap();

    assert_eq!(reminder.name, "stretch");
    assert_eq!(reminder.repeat_count, 3);

    let persisted = ctx.store.load().await;
    assert_eq!(persisted.len(), 1);
    assert_eq!(persisted[0], reminder);
    assert_eq!(ctx.service.list().await, vec![reminder]);
}

#[tokio::test]
pub async fn add_assigns_unique_ids_in_insertion_order() {
    let ctx = TestContext::new().await;

    let first = ctx.service.add("a", fire_time(8, 0), "1").await.unwrap();
    let second = ctx.service.add("b", fire_time(9, 0), "1").await.unwrap();

    assert_ne!(first.id, second.id);
    assert_eq!(
        ctx.service.list().await,
        vec![first, second],
        "Snapshot preserves insertion order."
    );
}

#[tokio::test]
pub async fn add_rejects_empty_name_without_side_effects() {
    let ctx = TestContext::new().await;

    let result = ctx.service.add("   ", fire_time(14, 0), "3").await;

    assert!(matches!(
        result,
        Err(AddReminderError::Validation(ValidationError::EmptyName))
    ));
    assert!(ctx.store.load().await.is_empty());
    assert!(ctx.service.list().await.is_empty());
    assert!(ctx.recorded_calls().is_empty(), "No backend calls on rejected add.");
}

#[tokio::test]
pub async fn add_rejects_invalid_repeat_counts_without_side_effects() {
    let ctx = TestContext::new().await;

    for input in ["0", "-2", "three", "", "1.5"] {
        let result = ctx.service.add("stretch", fire_time(14, 0), input).await;

        assert!(
            matches!(
                result,
                Err(AddReminderError::Validation(ValidationError::InvalidRepeatCount(_)))
            ),
            "Input {:?} should be rejected.",
            input
        );
    }

    assert!(ctx.store.load().await.is_empty());
    assert!(ctx.recorded_calls().is_empty(), "No backend calls on rejected add.");
}

#[tokio::test]
pub async fn delete_removes_exactly_the_matching_reminder() {
    let ctx = TestContext::new().await;

    let a = ctx.service.add("a", fire_time(8, 0), "1").await.unwrap();
    let b = ctx.service.add("b", fire_time(9, 0), "1").await.unwrap();

    ctx.service.delete(a.id).await.unwrap();

    let remaining = ctx.service.list().await;
    assert_eq!(remaining, vec![b]);
    assert_eq!(ctx.store.load().await, remaining);
}

#[tokio::test]
pub async fn delete_of_unknown_id_is_a_silent_noop() {
    let ctx = TestContext::new().await;

    let reminder = ctx.service.add("a", fire_time(8, 0), "1").await.unwrap();
    ctx.clear_calls();

    ctx.service.delete(reminder.id + 100).await.unwrap();

    assert_eq!(ctx.service.list().await.len(), 1);
    assert!(
        ctx.recorded_calls().is_empty(),
        "A no-op delete neither cancels nor reschedules."
    );
}

#[tokio::test]
pub async fn delete_cancels_everything_then_reissues_only_survivors() {
    let ctx = TestContext::new().await;

    // repeat_count 25 guarantees at least one occurrence past midnight, so
    // the surviving reminder always re-issues regardless of the wall clock.
    let a = ctx.service.add("a", fire_time(0, 0), "25").await.unwrap();
    ctx.service.add("b", fire_time(0, 0), "25").await.unwrap();
    ctx.clear_calls();

    ctx.service.delete(a.id).await.unwrap();

    let calls = ctx.recorded_calls();
    assert_eq!(calls[0], BackendCall::CancelAll);
    assert_eq!(
        calls.iter().filter(|call| **call == BackendCall::CancelAll).count(),
        1
    );
    assert!(calls.len() >= 2, "The survivor must be rescheduled.");
    assert!(
        calls[1..].iter().all(|call| matches!(
            call,
            BackendCall::Schedule { title, body } if title == "Reminder" && body == "b"
        )),
        "Every re-issued occurrence belongs to the surviving reminder. calls = {:?}",
        calls
    );
}

#[tokio::test]
pub async fn list_is_idempotent_between_mutations() {
    let ctx = TestContext::new().await;

    ctx.service.add("a", fire_time(8, 0), "2").await.unwrap();
    ctx.service.add("b", fire_time(9, 0), "1").await.unwrap();

    let first = ctx.service.list().await;
    let second = ctx.service.list().await;

    assert_eq!(first, second);
}

#[tokio::test]
pub async fn failed_save_reports_error_and_keeps_in_memory_mutation() {
    let calls: RecordedCalls = Arc::new(Mutex::new(Vec::new()));
    let backend = Arc::new(RecordingNotificationBackend {
        calls: calls.clone(),
    });
    let scheduler = NotificationScheduler::new(backend);
    let service = ReminderService::create(Arc::new(FailingStore), scheduler).await;

    let result = service.add("stretch", fire_time(14, 0), "3").await;

    assert!(matches!(result, Err(AddReminderError::Persistence(_))));
    assert_eq!(
        service.list().await.len(),
        1,
        "The in-memory append is not rolled back on a failed save."
    );
    assert!(
        calls.lock().unwrap().is_empty(),
        "Nothing is scheduled for a reminder the store may lose."
    );
}

#[tokio::test]
pub async fn id_counter_resumes_past_persisted_ids() {
    let store = Arc::new(InMemoryReminderStore::new());
    store
        .save(&[
            Reminder {
                id: 3,
                name: "a".to_string(),
                fire_at: fire_time(8, 0),
                repeat_count: 1,
            },
            Reminder {
                id: 7,
                name: "b".to_string(),
                fire_at: fire_time(9, 0),
                repeat_count: 1,
            },
        ])
        .await
        .unwrap();

    let ctx = TestContext::with_store(store).await;
    let added = ctx.service.add("c", fire_time(10, 0), "1").await.unwrap();

    assert_eq!(added.id, 8, "Fresh ids never collide with persisted ones.");
}
