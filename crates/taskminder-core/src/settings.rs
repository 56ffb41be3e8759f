use crate::calendar::ReminderTime;
use crate::error::Result;
use crate::store::KeyValueStore;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::warn;

pub const SETTINGS_NAMESPACE: &str = "reminder_settings";
pub const CONFIG_KEY: &str = "config";

// ---------------------------------------------------------------------------
// ReminderConfig
// ---------------------------------------------------------------------------

/// The persisted reminder preference. Stored as one JSON value so that every
/// update is a single atomic write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_hour")]
    pub hour: u8,
    #[serde(default = "default_minute")]
    pub minute: u8,
}

fn default_hour() -> u8 {
    ReminderTime::DEFAULT.hour()
}

fn default_minute() -> u8 {
    ReminderTime::DEFAULT.minute()
}

impl Default for ReminderConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            hour: default_hour(),
            minute: default_minute(),
        }
    }
}

impl ReminderConfig {
    pub fn armed_at(time: ReminderTime) -> Self {
        Self {
            enabled: true,
            hour: time.hour(),
            minute: time.minute(),
        }
    }

    /// Configured time, or the default if the stored fields are out of range.
    pub fn time(&self) -> ReminderTime {
        ReminderTime::new(self.hour, self.minute).unwrap_or_else(|e| {
            warn!("stored reminder time rejected ({e}); using {}", ReminderTime::DEFAULT);
            ReminderTime::DEFAULT
        })
    }
}

// ---------------------------------------------------------------------------
// ReminderSettings
// ---------------------------------------------------------------------------

/// Typed access to [`ReminderConfig`] on top of a [`KeyValueStore`].
#[derive(Clone)]
pub struct ReminderSettings {
    store: Arc<dyn KeyValueStore>,
}

impl ReminderSettings {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Read the stored config. Absent means defaults.
    pub fn load(&self) -> Result<ReminderConfig> {
        match self.store.get(SETTINGS_NAMESPACE, CONFIG_KEY)? {
            Some(raw) => Ok(serde_json::from_str(&raw)?),
            None => Ok(ReminderConfig::default()),
        }
    }

    /// Like [`load`](Self::load), but any failure degrades to defaults.
    pub fn load_or_default(&self) -> ReminderConfig {
        self.load().unwrap_or_else(|e| {
            warn!("cannot read reminder settings, using defaults: {e}");
            ReminderConfig::default()
        })
    }

    pub fn save(&self, config: &ReminderConfig) -> Result<()> {
        let raw = serde_json::to_string(config)?;
        self.store.put(SETTINGS_NAMESPACE, CONFIG_KEY, &raw)
    }
}
