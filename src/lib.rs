//! Reminder lifecycle and notification-scheduling engine.
//!
//! A reminder pairs a name with a time of day and a repeat count; the engine
//! turns it into one-shot notification occurrences spaced one hour apart,
//! keeps the backend's scheduled set consistent as reminders are added and
//! removed, and persists the collection across restarts.

pub mod appsettings;
pub mod notification;
pub mod reminder;
pub mod scheduling;
pub mod service;
pub mod storage;
