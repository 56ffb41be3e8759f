use crate::host::Host;
use crate::output::print_json;
use chrono::Local;
use std::path::Path;
use taskminder_core::boot::{self, BootOutcome};
use taskminder_core::scheduler::ArmState;

fn describe(state: &ArmState) -> String {
    match state {
        ArmState::Armed { fire_at } => format!(
            "next reminder at {}",
            fire_at.with_timezone(&Local).format("%Y-%m-%d %H:%M")
        ),
        ArmState::Unarmed => "next reminder NOT armed".to_string(),
    }
}

pub fn trigger(root: &Path, json: bool) -> anyhow::Result<()> {
    let host = Host::open(root)?;
    let rt = tokio::runtime::Runtime::new()?;
    let outcome = rt.block_on(host.trigger().handle_manual());

    if json {
        return print_json(&outcome);
    }
    if !outcome.fetched {
        println!("Tasks could not be fetched this cycle; {}", describe(&outcome.rearmed));
    } else if outcome.outstanding.is_empty() {
        println!("Nothing outstanding today; {}", describe(&outcome.rearmed));
    } else {
        println!(
            "{} task(s) outstanding, notification {}; {}",
            outcome.outstanding.len(),
            if outcome.notified { "shown" } else { "not delivered" },
            describe(&outcome.rearmed)
        );
    }
    Ok(())
}

pub fn boot(root: &Path, json: bool) -> anyhow::Result<()> {
    let host = Host::open(root)?;
    let outcome = boot::recover(&host.scheduler);

    if json {
        return print_json(&outcome);
    }
    match outcome {
        BootOutcome::Disabled => println!("Reminders disabled; nothing armed"),
        BootOutcome::Rearmed { state } => println!("Reminder restored: {}", describe(&state)),
    }
    Ok(())
}
