//! The daily reminder alarm.
//!
//! One wake-up, registered under [`ALARM_ID`], is either pending
//! ([`ArmState::Armed`]) or not ([`ArmState::Unarmed`]). Scheduling always
//! overwrites the pending registration, so repeated calls converge on a single
//! alarm. Failures of the timer facility are logged and reported as
//! `Unarmed`; nothing here returns an error to the caller.

use crate::calendar::{next_fire_at, Clock, ReminderTime};
use crate::settings::{ReminderConfig, ReminderSettings};
use crate::timer::{TimerFacility, WakeupOptions};
use chrono::{DateTime, TimeZone, Utc};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Fixed request key of the daily reminder wake-up.
pub const ALARM_ID: &str = "daily-task-reminder";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ArmState {
    Unarmed,
    Armed { fire_at: DateTime<Utc> },
}

impl ArmState {
    pub fn is_armed(&self) -> bool {
        matches!(self, ArmState::Armed { .. })
    }

    pub fn fire_at(&self) -> Option<DateTime<Utc>> {
        match self {
            ArmState::Armed { fire_at } => Some(*fire_at),
            ArmState::Unarmed => None,
        }
    }
}

pub struct AlarmScheduler<Tz: TimeZone> {
    timer: Arc<dyn TimerFacility>,
    settings: ReminderSettings,
    clock: Arc<dyn Clock>,
    tz: Tz,
}

impl<Tz: TimeZone> AlarmScheduler<Tz> {
    pub fn new(
        timer: Arc<dyn TimerFacility>,
        settings: ReminderSettings,
        clock: Arc<dyn Clock>,
        tz: Tz,
    ) -> Self {
        Self {
            timer,
            settings,
            clock,
            tz,
        }
    }

    pub fn settings(&self) -> &ReminderSettings {
        &self.settings
    }

    /// Current instant in the scheduler's local timezone.
    pub fn now(&self) -> DateTime<Tz> {
        self.clock.now().with_timezone(&self.tz)
    }

    /// Arm the alarm for the next local occurrence of `at` and persist
    /// `enabled = true` with that time.
    pub fn schedule(&self, at: ReminderTime) -> ArmState {
        let now = self.now();
        let fire_at = match next_fire_at(&now, at) {
            Ok(local) => local.with_timezone(&Utc),
            Err(e) => {
                warn!("cannot compute next reminder for {at}: {e}");
                return ArmState::Unarmed;
            }
        };

        if let Err(e) =
            self.timer
                .register_wakeup(ALARM_ID, fire_at, WakeupOptions::exact_while_idle())
        {
            warn!("reminder not armed: {e}");
            return ArmState::Unarmed;
        }

        if let Err(e) = self.settings.save(&ReminderConfig::armed_at(at)) {
            warn!("reminder armed but settings not saved: {e}");
        }
        info!(%fire_at, time = %at, "reminder armed");
        ArmState::Armed { fire_at }
    }

    /// Arm using the persisted time (default 07:55).
    pub fn schedule_default(&self) -> ArmState {
        let config = self.settings.load_or_default();
        self.schedule(config.time())
    }

    /// Remove the pending wake-up and persist `enabled = false`, keeping the
    /// last time for a later re-enable.
    pub fn cancel(&self) -> ArmState {
        if let Err(e) = self.timer.cancel_wakeup(ALARM_ID) {
            warn!("reminder cancel not confirmed: {e}");
        }
        let config = ReminderConfig {
            enabled: false,
            ..self.settings.load_or_default()
        };
        if let Err(e) = self.settings.save(&config) {
            warn!("reminder disabled but settings not saved: {e}");
        }
        info!("reminder cancelled");
        ArmState::Unarmed
    }

    /// What the timer facility currently holds for the alarm.
    pub fn state(&self) -> ArmState {
        match self.timer.pending(ALARM_ID) {
            Ok(Some(wakeup)) => ArmState::Armed {
                fire_at: wakeup.fire_at,
            },
            Ok(None) => ArmState::Unarmed,
            Err(e) => {
                debug!("cannot query pending reminder: {e}");
                ArmState::Unarmed
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
