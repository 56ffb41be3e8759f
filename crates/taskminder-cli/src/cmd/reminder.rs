use crate::host::Host;
use crate::output::print_json;
use chrono::{DateTime, Local, Utc};
use std::path::Path;
use taskminder_core::{calendar::ReminderTime, scheduler::ArmState};

fn local(fire_at: DateTime<Utc>) -> String {
    fire_at
        .with_timezone(&Local)
        .format("%Y-%m-%d %H:%M %Z")
        .to_string()
}

pub fn enable(root: &Path, at: Option<ReminderTime>, json: bool) -> anyhow::Result<()> {
    let host = Host::open(root)?;
    let state = match at {
        Some(time) => host.scheduler.schedule(time),
        None => host.scheduler.schedule_default(),
    };

    if json {
        return print_json(&serde_json::json!({ "state": state }));
    }
    match state {
        ArmState::Armed { fire_at } => println!("Reminder armed for {}", local(fire_at)),
        ArmState::Unarmed => {
            anyhow::bail!("reminder could not be armed; see log output and retry")
        }
    }
    Ok(())
}

pub fn disable(root: &Path, json: bool) -> anyhow::Result<()> {
    let host = Host::open(root)?;
    let state = host.scheduler.cancel();
    if json {
        print_json(&serde_json::json!({ "state": state }))?;
    } else {
        println!("Reminder disabled");
    }
    Ok(())
}

pub fn status(root: &Path, json: bool) -> anyhow::Result<()> {
    let host = Host::open(root)?;
    let config = host.scheduler.settings().load_or_default();
    let state = host.scheduler.state();

    if json {
        return print_json(&serde_json::json!({
            "enabled": config.enabled,
            "hour": config.hour,
            "minute": config.minute,
            "state": state,
        }));
    }

    println!(
        "Reminder: {} at {}",
        if config.enabled { "enabled" } else { "disabled" },
        config.time()
    );
    match state {
        ArmState::Armed { fire_at } => println!("Next wake-up: {}", local(fire_at)),
        ArmState::Unarmed if config.enabled => {
            println!("Next wake-up: none (run `taskminder boot` or start the daemon to re-arm)")
        }
        ArmState::Unarmed => println!("Next wake-up: none"),
    }
    Ok(())
}
