//! Long-running host loop.
//!
//! Stands in for the platform alarm service: on start it drops any wake-ups
//! left from a previous run (registrations do not outlive the host), runs
//! boot recovery, then polls the wake-up table and fires the reminder cycle
//! for each due entry.

use crate::host::Host;
use anyhow::Context;
use chrono::{DateTime, Utc};
use std::path::Path;
use taskminder_core::{
    boot::{self, BootOutcome},
    config::Config,
    scheduler::ALARM_ID,
};
use tracing::{debug, info, warn};

pub fn run(root: &Path) -> anyhow::Result<()> {
    let config = Config::load(root).context("failed to load config")?;
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(serve(root, config))
}

async fn serve(root: &Path, config: Config) -> anyhow::Result<()> {
    // The host is dropped right away; redb keeps the file locked while open.
    match start(&Host::open(root)?)? {
        BootOutcome::Disabled => info!("reminders disabled; waiting for `taskminder enable`"),
        BootOutcome::Rearmed { state } => info!(?state, "reminder restored"),
    }

    let mut ticker = tokio::time::interval(config.poll_interval());
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    info!(
        root = %root.display(),
        poll_secs = config.poll_interval().as_secs(),
        "taskminder daemon running"
    );
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if let Err(e) = tick(root).await {
                    warn!("daemon tick failed, retrying next interval: {e:#}");
                }
            }
            _ = &mut shutdown => {
                info!("shutting down");
                return Ok(());
            }
        }
    }
}

async fn tick(root: &Path) -> anyhow::Result<usize> {
    let host = Host::open(root)?;
    deliver_due(&host, Utc::now()).await
}

/// Clear wake-ups left by a previous run, then restore the alarm if enabled.
fn start(host: &Host) -> anyhow::Result<BootOutcome> {
    let stale = host
        .db
        .clear_wakeups()
        .context("failed to clear stale wake-ups")?;
    if stale > 0 {
        debug!(stale, "dropped wake-ups from previous run");
    }
    Ok(boot::recover(&host.scheduler))
}

/// Deliver every wake-up due at `now`. Returns how many reminder cycles ran.
async fn deliver_due(host: &Host, now: DateTime<Utc>) -> anyhow::Result<usize> {
    let due = host.db.take_due(now)?;
    let mut fired = 0;
    for wakeup in due {
        if wakeup.id != ALARM_ID {
            debug!(id = %wakeup.id, "ignoring unknown wake-up");
            continue;
        }
        let outcome = host.trigger().handle().await;
        info!(
            outstanding = outcome.outstanding.len(),
            notified = outcome.notified,
            rearmed = outcome.rearmed.is_armed(),
            "reminder cycle complete"
        );
        fired += 1;
    }
    Ok(fired)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use taskminder_core::{
        calendar::ReminderTime,
        notify::NOTIFICATION_ID,
        paths,
        timer::{TimerFacility, WakeupOptions},
    };
    use tempfile::TempDir;

    const EVERY_DAY: &str = r#"
- id: stretch
  title: Stretch
  kind: recurring
  active_weekdays: [Mon, Tue, Wed, Thu, Fri, Sat, Sun]
"#;

    fn project() -> (TempDir, Host) {
        let dir = TempDir::new().unwrap();
        Config::default().save(dir.path()).unwrap();
        std::fs::write(dir.path().join("tasks.yaml"), EVERY_DAY).unwrap();
        let host = Host::open(dir.path()).unwrap();
        (dir, host)
    }

    fn register(host: &Host, id: &str, fire_at: DateTime<Utc>) {
        host.db
            .register_wakeup(id, fire_at, WakeupOptions::exact_while_idle())
            .unwrap();
    }

    fn notification_shown(dir: &TempDir) -> bool {
        paths::notifications_dir(dir.path())
            .join(format!("{NOTIFICATION_ID}.json"))
            .exists()
    }

    #[tokio::test]
    async fn due_alarm_fires_once_and_rearms() {
        let (dir, host) = project();
        let now = Utc::now();
        register(&host, ALARM_ID, now - Duration::minutes(1));

        assert_eq!(deliver_due(&host, now).await.unwrap(), 1);
        assert!(notification_shown(&dir));

        let next = host.db.pending(ALARM_ID).unwrap().unwrap();
        assert!(next.fire_at > now);
        assert!(next.fire_at <= now + Duration::hours(25));
        assert!(host.scheduler.settings().load().unwrap().enabled);

        // The re-armed wake-up is in the future, so nothing fires again.
        assert_eq!(deliver_due(&host, now).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn future_wakeup_is_left_in_place() {
        let (dir, host) = project();
        let now = Utc::now();
        let later = now + Duration::hours(1);
        register(&host, ALARM_ID, later);

        assert_eq!(deliver_due(&host, now).await.unwrap(), 0);
        assert_eq!(host.db.pending(ALARM_ID).unwrap().unwrap().fire_at, later);
        assert!(!notification_shown(&dir));
    }

    #[tokio::test]
    async fn foreign_wakeup_is_dropped_without_trigger() {
        let (dir, host) = project();
        let now = Utc::now();
        register(&host, "someone-else", now - Duration::minutes(5));

        assert_eq!(deliver_due(&host, now).await.unwrap(), 0);
        assert!(host.db.list_wakeups().unwrap().is_empty());
        assert!(host.db.pending(ALARM_ID).unwrap().is_none());
        assert!(!notification_shown(&dir));
    }

    #[test]
    fn start_while_disabled_leaves_nothing_armed() {
        let (_dir, host) = project();
        register(&host, ALARM_ID, Utc::now() + Duration::hours(2));

        assert_eq!(start(&host).unwrap(), BootOutcome::Disabled);
        assert!(host.db.list_wakeups().unwrap().is_empty());
    }

    #[test]
    fn start_while_enabled_rearms_single_alarm() {
        let (_dir, host) = project();
        host.scheduler.schedule(ReminderTime::new(6, 15).unwrap());
        register(&host, "stale", Utc::now() - Duration::days(3));

        match start(&host).unwrap() {
            BootOutcome::Rearmed { state } => assert!(state.is_armed()),
            other => panic!("expected rearm, got {other:?}"),
        }
        let wakeups = host.db.list_wakeups().unwrap();
        assert_eq!(wakeups.len(), 1);
        assert_eq!(wakeups[0].id, ALARM_ID);
    }
}
