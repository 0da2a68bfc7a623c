use std::sync::Arc;

use anyhow::Context;
use chrono::NaiveTime;
use tokio::io::{AsyncBufReadExt, BufReader};

use dayminder::appsettings;
use dayminder::notification::permission::{
    PermissionDecision, PermissionGate, PermissionStatus, StaticPermissionBackend,
};
use dayminder::notification::{InProcessNotificationBackend, NotificationBackend};
use dayminder::reminder::ReminderFireTime;
use dayminder::scheduling::NotificationScheduler;
use dayminder::service::ReminderService;
use dayminder::storage::FileReminderStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    pretty_env_logger::init();

    let settings = appsettings::get();

    let gate = PermissionGate::new(StaticPermissionBackend::new(PermissionStatus::Granted));
    let decision = gate.ensure_granted().await;
    if decision == PermissionDecision::Denied {
        log::warn!("Notification permission denied; reminders will be kept but not delivered.");
    }

    let backend = Arc::new(InProcessNotificationBackend::new(
        decision == PermissionDecision::Granted,
    ));
    if let Err(error) = backend.register_channel(&settings.channel).await {
        log::warn!("Could not register notification channel. [error = {:#}]", error);
    }

    let store = Arc::new(FileReminderStore::new(&settings.storage.path));
    let scheduler = NotificationScheduler::new(backend.clone());
    let service = ReminderService::create(store, scheduler).await;

    run_command_loop(&service).await
}

/// Minimal stdin front end standing in for a UI: it only ever calls
/// `add`, `delete` and `list` and renders the returned snapshots.
async fn run_command_loop(service: &ReminderService) -> anyhow::Result<()> {
    println!("commands: add <hh:mm> <count> <name> | list | delete <id> | quit");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        let (command, rest) = line.split_once(' ').unwrap_or((line, ""));

        match command {
            "" => {}
            "list" => {
                for reminder in service.list().await {
                    println!(
                        "#{} {} at {} x{}",
                        reminder.id,
                        reminder.name,
                        reminder.fire_at.time().format("%H:%M:%S"),
                        reminder.repeat_count
                    );
                }
            }
            "add" => match parse_add_args(rest) {
                Ok((fire_at, repeat_count, name)) => {
                    match service.add(name, fire_at, repeat_count).await {
                        Ok(reminder) => println!("added #{}", reminder.id),
                        Err(error) => println!("error: {error}"),
                    }
                }
                Err(error) => println!("error: {error:#}"),
            },
            "delete" => match rest.trim().parse() {
                Ok(id) => match service.delete(id).await {
                    Ok(()) => println!("deleted #{id}"),
                    Err(error) => println!("error: {error:#}"),
                },
                Err(_) => println!("error: delete expects a numeric id"),
            },
            "quit" | "exit" => break,
            other => println!("unknown command {other:?}"),
        }
    }

    Ok(())
}

fn parse_add_args(rest: &str) -> anyhow::Result<(ReminderFireTime, &str, &str)> {
    let mut parts = rest.splitn(3, ' ');
    let raw_time = parts.next().unwrap_or("");
    let repeat_count = parts.next().unwrap_or("");
    let name = parts.next().unwrap_or("").trim();

    let time = NaiveTime::parse_from_str(raw_time, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(raw_time, "%H:%M"))
        .with_context(|| format!("invalid time of day {raw_time:?}"))?;

    Ok((ReminderFireTime::new(time), repeat_count, name))
}
