use crate::output::print_json;
use anyhow::Context;
use std::path::Path;
use taskminder_core::{config::Config, io, paths};

const SAMPLE_TASKS: &str = r#"# Task documents read by the daily reminder.
#
# kind: recurring  -> active_weekdays: [Mon, Tue, Wed, Thu, Fri, Sat, Sun]
# kind: ranged     -> range_start / range_end: YYYY-MM-DD (inclusive)
# completion_marks maps a participant to pending | completed.
- id: water-plants
  title: Water the plants
  kind: recurring
  active_weekdays: [Mon, Wed, Fri]
  completion_marks:
    me: pending
- id: quarterly-report
  title: Draft the quarterly report
  kind: ranged
  range_start: 2024-01-10
  range_end: 2024-01-12
  completion_marks:
    me: pending
"#;

pub fn run(root: &Path, json: bool) -> anyhow::Result<()> {
    let dir = paths::taskminder_dir(root);
    std::fs::create_dir_all(&dir).with_context(|| format!("failed to create {}", dir.display()))?;

    let config_path = paths::config_path(root);
    let config_created = if config_path.exists() {
        false
    } else {
        Config::default()
            .save(root)
            .context("failed to write config.yaml")?;
        true
    };

    let config = Config::load(root).context("failed to load config.yaml")?;
    let tasks_path = config.tasks_path(root);
    let tasks_created = io::write_if_missing(&tasks_path, SAMPLE_TASKS.as_bytes())
        .with_context(|| format!("failed to write {}", tasks_path.display()))?;

    if json {
        print_json(&serde_json::json!({
            "root": root.display().to_string(),
            "config_created": config_created,
            "tasks_created": tasks_created,
        }))?;
    } else {
        println!("Initializing taskminder in: {}", root.display());
        let status = |created: bool| if created { "created:" } else { "exists: " };
        println!("  {} {}", status(config_created), paths::CONFIG_FILE);
        println!("  {} {}", status(tasks_created), tasks_path.display());
        println!();
        println!("Next: taskminder enable --at 07:55");
    }
    Ok(())
}
