//! Notification surfaces for hosts without a native notification service.

use crate::config::NotifierConfig;
use crate::error::{ReminderError, Result};
use crate::notify::{NotificationContent, NotificationSurface};
use crate::paths;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::Arc;

/// Exit status a notifier program uses to report missing permission
/// (`EX_NOPERM` from sysexits.h).
const EXIT_NO_PERMISSION: i32 = 77;

/// Build the surface selected in the host config.
pub fn from_config(notifier: &NotifierConfig, root: &Path) -> Arc<dyn NotificationSurface> {
    match notifier {
        NotifierConfig::File => Arc::new(FileSurface::new(paths::notifications_dir(root))),
        NotifierConfig::Command { program, args } => {
            Arc::new(CommandSurface::new(program.clone(), args.clone()))
        }
    }
}

// ---------------------------------------------------------------------------
// FileSurface
// ---------------------------------------------------------------------------

/// Keeps the latest notification per id as `<dir>/<id>.json`.
#[derive(Debug, Clone)]
pub struct FileSurface {
    dir: PathBuf,
}

impl FileSurface {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, id: &str) -> PathBuf {
        self.dir.join(format!("{id}.json"))
    }
}

impl NotificationSurface for FileSurface {
    fn show(&self, id: &str, content: &NotificationContent) -> Result<()> {
        let data = serde_json::to_vec_pretty(content)?;
        crate::io::atomic_write(&self.path_for(id), &data).map_err(|e| match e {
            ReminderError::Io(io) if io.kind() == std::io::ErrorKind::PermissionDenied => {
                ReminderError::PermissionDenied(format!("{}: {io}", self.dir.display()))
            }
            ReminderError::Io(io) => ReminderError::Transport(io.to_string()),
            other => other,
        })
    }
}

// ---------------------------------------------------------------------------
// CommandSurface
// ---------------------------------------------------------------------------

/// Runs `program args... <headline> <body>`, e.g. `notify-send`.
///
/// The full content is also exported as `TASKMINDER_HEADLINE`,
/// `TASKMINDER_SUMMARY` and `TASKMINDER_BODY` (newline-joined) for programs
/// that want the collapsed summary line.
#[derive(Debug, Clone)]
pub struct CommandSurface {
    program: String,
    args: Vec<String>,
}

impl CommandSurface {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }
}

impl NotificationSurface for CommandSurface {
    fn show(&self, _id: &str, content: &NotificationContent) -> Result<()> {
        let body = content.body.join("\n");
        let output = Command::new(&self.program)
            .args(&self.args)
            .arg(&content.headline)
            .arg(&body)
            .env("TASKMINDER_HEADLINE", &content.headline)
            .env("TASKMINDER_SUMMARY", &content.summary)
            .env("TASKMINDER_BODY", &body)
            .output()
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::PermissionDenied => {
                    ReminderError::PermissionDenied(format!("{}: {e}", self.program))
                }
                _ => ReminderError::Transport(format!("cannot run {}: {e}", self.program)),
            })?;

        if output.status.success() {
            return Ok(());
        }
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        match output.status.code() {
            Some(EXIT_NO_PERMISSION) => Err(ReminderError::PermissionDenied(stderr)),
            code => Err(ReminderError::Transport(format!(
                "{} exited with {code:?}: {stderr}",
                self.program
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn content(headline: &str) -> NotificationContent {
        NotificationContent {
            headline: headline.to_string(),
            summary: "summary".to_string(),
            body: vec!["Task 1".to_string(), "Task 2".to_string()],
        }
    }

    #[test]
    fn file_surface_replaces_under_same_id() {
        let dir = TempDir::new().unwrap();
        let surface = FileSurface::new(dir.path().join("notifications"));
        surface.show("outstanding-tasks", &content("first")).unwrap();
        surface.show("outstanding-tasks", &content("second")).unwrap();

        let entries = std::fs::read_dir(dir.path().join("notifications"))
            .unwrap()
            .count();
        assert_eq!(entries, 1);
        let raw = std::fs::read(surface.path_for("outstanding-tasks")).unwrap();
        let current: NotificationContent = serde_json::from_slice(&raw).unwrap();
        assert_eq!(current.headline, "second");
    }

    #[test]
    fn missing_program_is_transport_error() {
        let surface = CommandSurface::new("taskminder-no-such-notifier", Vec::new());
        assert!(matches!(
            surface.show("x", &content("h")),
            Err(ReminderError::Transport(_))
        ));
    }

    #[cfg(unix)]
    #[test]
    fn exit_77_is_permission_denied() {
        let surface = CommandSurface::new(
            "sh",
            vec!["-c".to_string(), "exit 77".to_string(), "notifier".to_string()],
        );
        assert!(matches!(
            surface.show("x", &content("h")),
            Err(ReminderError::PermissionDenied(_))
        ));
    }

    #[cfg(unix)]
    #[test]
    fn program_receives_summary_in_environment() {
        let check = CommandSurface::new(
            "sh",
            vec![
                "-c".to_string(),
                r#"test "$TASKMINDER_SUMMARY" = summary && test "$1" = h && test "$2" = "$TASKMINDER_BODY""#
                    .to_string(),
                "notifier".to_string(),
            ],
        );
        check.show("x", &content("h")).unwrap();

        let mismatch = CommandSurface::new(
            "sh",
            vec![
                "-c".to_string(),
                r#"test "$TASKMINDER_SUMMARY" = other"#.to_string(),
            ],
        );
        assert!(matches!(
            mismatch.show("x", &content("h")),
            Err(ReminderError::Transport(_))
        ));
    }

    #[cfg(unix)]
    #[test]
    fn successful_program_is_ok() {
        let surface = CommandSurface::new("true", Vec::new());
        surface.show("x", &content("h")).unwrap();
    }

    #[test]
    fn from_config_file_writes_under_root() {
        let dir = TempDir::new().unwrap();
        let surface = from_config(&NotifierConfig::File, dir.path());
        surface.show("outstanding-tasks", &content("h")).unwrap();
        assert!(paths::notifications_dir(dir.path())
            .join("outstanding-tasks.json")
            .exists());
    }
}
