//! The wake-up facility the scheduler arms.
//!
//! Registrations are keyed by id: registering an id that is already pending
//! replaces it, so at most one wake-up per id ever exists.

use crate::error::{ReminderError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WakeupOptions {
    /// Fire at the requested instant rather than within a batching window.
    pub exact: bool,
    /// Fire even if the host is in a low-power idle state.
    pub allow_while_idle: bool,
}

impl WakeupOptions {
    pub fn exact_while_idle() -> Self {
        Self {
            exact: true,
            allow_while_idle: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wakeup {
    pub id: String,
    pub fire_at: DateTime<Utc>,
    pub options: WakeupOptions,
}

pub trait TimerFacility: Send + Sync {
    fn register_wakeup(&self, id: &str, fire_at: DateTime<Utc>, options: WakeupOptions)
        -> Result<()>;
    fn cancel_wakeup(&self, id: &str) -> Result<()>;
    /// The wake-up currently registered under `id`, if any.
    fn pending(&self, id: &str) -> Result<Option<Wakeup>>;
}

// ---------------------------------------------------------------------------
// MemoryTimer
// ---------------------------------------------------------------------------

/// In-process wake-up table. Registrations are recorded, never delivered.
#[derive(Debug, Default)]
pub struct MemoryTimer {
    wakeups: Mutex<BTreeMap<String, Wakeup>>,
}

impl MemoryTimer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.wakeups.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl TimerFacility for MemoryTimer {
    fn register_wakeup(
        &self,
        id: &str,
        fire_at: DateTime<Utc>,
        options: WakeupOptions,
    ) -> Result<()> {
        let mut wakeups = self.wakeups.lock().unwrap_or_else(|e| e.into_inner());
        wakeups.insert(
            id.to_string(),
            Wakeup {
                id: id.to_string(),
                fire_at,
                options,
            },
        );
        Ok(())
    }

    fn cancel_wakeup(&self, id: &str) -> Result<()> {
        self.wakeups
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(id);
        Ok(())
    }

    fn pending(&self, id: &str) -> Result<Option<Wakeup>> {
        Ok(self
            .wakeups
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(id)
            .cloned())
    }
}

// ---------------------------------------------------------------------------
// UnavailableTimer
// ---------------------------------------------------------------------------

/// Stand-in for a host without a timer facility. Every call fails.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnavailableTimer;

impl TimerFacility for UnavailableTimer {
    fn register_wakeup(&self, id: &str, _: DateTime<Utc>, _: WakeupOptions) -> Result<()> {
        Err(ReminderError::PlatformUnavailable(format!(
            "cannot register wake-up '{id}'"
        )))
    }

    fn cancel_wakeup(&self, id: &str) -> Result<()> {
        Err(ReminderError::PlatformUnavailable(format!(
            "cannot cancel wake-up '{id}'"
        )))
    }

    fn pending(&self, _: &str) -> Result<Option<Wakeup>> {
        Err(ReminderError::PlatformUnavailable(
            "no timer facility".to_string(),
        ))
    }
}
