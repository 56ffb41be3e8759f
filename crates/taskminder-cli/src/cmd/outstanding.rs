use crate::host::Host;
use crate::output::{print_json, print_table};
use anyhow::Context;
use chrono::{DateTime, Duration, Local, NaiveDate};
use std::path::Path;
use taskminder_core::{
    calendar::{local_midnight, weekday_code},
    resolver::outstanding_today,
    source::TaskSource,
    task::Recurrence,
};

pub fn run(root: &Path, date: Option<NaiveDate>, json: bool) -> anyhow::Result<()> {
    let host = Host::open(root)?;
    let today: DateTime<Local> = match date {
        // Noon keeps the instant inside the requested day across DST shifts.
        Some(d) => local_midnight(&Local, d) + Duration::hours(12),
        None => host.scheduler.now(),
    };

    let source = host.task_source();
    let rt = tokio::runtime::Runtime::new()?;
    let tasks = rt
        .block_on(source.fetch_all_tasks())
        .with_context(|| format!("cannot read tasks from {}", source.path().display()))?;
    let outstanding = outstanding_today(&tasks, &today);

    if json {
        return print_json(&serde_json::json!({
            "date": today.date_naive().to_string(),
            "weekday": weekday_code(&today),
            "outstanding": outstanding,
        }));
    }

    println!(
        "{} ({}): {} of {} tasks outstanding",
        today.date_naive(),
        weekday_code(&today),
        outstanding.len(),
        tasks.len()
    );
    if outstanding.is_empty() {
        return Ok(());
    }
    let rows = outstanding
        .iter()
        .map(|t| {
            let kind = match &t.recurrence {
                Recurrence::Recurring { .. } => "recurring",
                Recurrence::Ranged { .. } => "ranged",
            };
            vec![t.id.clone(), t.display_title().to_string(), kind.to_string()]
        })
        .collect();
    println!();
    print_table(&["ID", "TITLE", "KIND"], rows);
    Ok(())
}
