//! Work done each time the daily alarm fires.
//!
//! The next day's alarm is committed before the task fetch is awaited, so a
//! slow or failing source can never cost tomorrow's reminder. The handler only
//! reads and notifies, so duplicate deliveries are harmless.

use crate::notify::NotificationPresenter;
use crate::resolver::outstanding_today;
use crate::scheduler::{AlarmScheduler, ArmState};
use crate::source::TaskSource;
use chrono::TimeZone;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TriggerOutcome {
    pub rearmed: ArmState,
    /// Ids of tasks found outstanding, in source order.
    pub outstanding: Vec<String>,
    pub notified: bool,
    /// False when the task fetch failed and the cycle ended early.
    pub fetched: bool,
}

pub struct ReminderTrigger<Tz: TimeZone> {
    scheduler: Arc<AlarmScheduler<Tz>>,
    source: Arc<dyn TaskSource>,
    presenter: NotificationPresenter,
}

impl<Tz: TimeZone> ReminderTrigger<Tz> {
    pub fn new(
        scheduler: Arc<AlarmScheduler<Tz>>,
        source: Arc<dyn TaskSource>,
        presenter: NotificationPresenter,
    ) -> Self {
        Self {
            scheduler,
            source,
            presenter,
        }
    }

    pub async fn handle(&self) -> TriggerOutcome {
        let rearmed = self.scheduler.schedule_default();
        self.run_cycle(rearmed).await
    }

    /// Run a cycle on demand. Re-arms only when reminders are enabled, so a
    /// manual run never switches a disabled reminder back on.
    pub async fn handle_manual(&self) -> TriggerOutcome {
        if self.scheduler.settings().load_or_default().enabled {
            return self.handle().await;
        }
        info!("reminders disabled; running cycle without re-arming");
        self.run_cycle(self.scheduler.state()).await
    }

    async fn run_cycle(&self, rearmed: ArmState) -> TriggerOutcome {
        let tasks = match self.source.fetch_all_tasks().await {
            Ok(tasks) => tasks,
            Err(e) => {
                warn!("task fetch failed, no reminder this cycle: {e}");
                return TriggerOutcome {
                    rearmed,
                    outstanding: Vec::new(),
                    fetched: false,
                    notified: false,
                };
            }
        };

        let today = self.scheduler.now();
        let outstanding = outstanding_today(&tasks, &today);
        debug!(
            total = tasks.len(),
            outstanding = outstanding.len(),
            "reminder cycle evaluated"
        );

        let notified = self.presenter.present(&outstanding);
        TriggerOutcome {
            rearmed,
            outstanding: outstanding.iter().map(|t| t.id.clone()).collect(),
            fetched: true,
            notified,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
