use std::sync::OnceLock;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use crate::notification::NotificationChannel;

#[derive(Deserialize, Debug)]
pub struct StorageSettings {
    pub path: String,
}

#[derive(Deserialize, Debug)]
pub struct AppSettings {
    pub storage: StorageSettings,
    pub channel: NotificationChannel,
}

impl AppSettings {
    fn new() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .set_default("storage.path", "reminders.json")?
            .set_default("channel.channel_id", "dayminder")?
            .set_default("channel.name", "Reminders")?
            .set_default("channel.importance", 4i64)?
            .set_default("channel.vibration_pattern", vec![0i64, 250, 250, 250])?
            .set_default("channel.color", "#FF231F7C")?
            .add_source(File::with_name("appsettings").required(false))
            .add_source(File::with_name("appsettings.local").required(false))
            .add_source(Environment::with_prefix("APP"))
            .build()?;

        settings.try_deserialize()
    }
}

pub fn get() -> &'static AppSettings {
    static APPSETTINGS: OnceLock<AppSettings> = OnceLock::new();
    APPSETTINGS.get_or_init(|| AppSettings::new().unwrap())
}
