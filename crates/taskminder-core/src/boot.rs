//! Restores the alarm after a host restart.
//!
//! Timer registrations do not survive a restart, so this is the only path
//! that brings the reminder back. It re-arms only if the user left reminders
//! enabled.

use crate::scheduler::{AlarmScheduler, ArmState};
use chrono::TimeZone;
use serde::Serialize;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum BootOutcome {
    /// Reminders were disabled; nothing was armed.
    Disabled,
    Rearmed { state: ArmState },
}

pub fn recover<Tz: TimeZone>(scheduler: &AlarmScheduler<Tz>) -> BootOutcome {
    let config = scheduler.settings().load_or_default();
    if !config.enabled {
        info!("reminders disabled; nothing to restore after restart");
        return BootOutcome::Disabled;
    }
    let state = scheduler.schedule_default();
    BootOutcome::Rearmed { state }
}
