mod scheduler;

pub use scheduler::NotificationScheduler;
