//! Handles settings for the application. Configuration is written in
//! `settings.toml`:
//!
//! ```toml
//! [app]
//! level = "info"
//! user = "alice"
//!
//! database = { sqlite = "./cofre.db" }   # or "memory"
//!
//! [refresh]
//! interval_secs = 30
//!
//! [recurring]
//! interval_hours = 24
//! ```

use config::{Config, ConfigError, File};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct App {
    /// Log level for the env filter (`trace`..`error`).
    pub level: String,
    /// Username every record is scoped to.
    pub user: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Database {
    Memory,
    Sqlite(String),
}

#[derive(Debug, Deserialize)]
pub struct Refresh {
    pub interval_secs: u64,
}

#[derive(Debug, Deserialize)]
pub struct Recurring {
    pub interval_hours: u64,
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub app: App,
    pub database: Database,
    pub refresh: Option<Refresh>,
    pub recurring: Option<Recurring>,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("settings"))
            .build()?;

        settings.try_deserialize()
    }
}
