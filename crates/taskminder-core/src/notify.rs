//! Formatting and emission of the "tasks outstanding" notification.

use crate::error::{ReminderError, Result};
use crate::task::TaskDefinition;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

/// Fixed id; each new notification replaces the previous one.
pub const NOTIFICATION_ID: &str = "outstanding-tasks";

/// Titles listed in the expanded body before the "+N more" trailer.
pub const MAX_LISTED_TITLES: usize = 7;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationContent {
    /// Title line, including the count.
    pub headline: String,
    /// One-line text shown when collapsed.
    pub summary: String,
    /// Lines shown when expanded.
    pub body: Vec<String>,
}

impl NotificationContent {
    /// Build the summary for `outstanding`. `None` when there is nothing to say.
    pub fn for_tasks(outstanding: &[&TaskDefinition]) -> Option<Self> {
        let count = outstanding.len();
        let first = outstanding.first()?;

        let headline = if count == 1 {
            "You have 1 task to do today".to_string()
        } else {
            format!("You have {count} tasks to do today")
        };
        let summary = if count == 1 {
            first.display_title().to_string()
        } else {
            format!("{count} tasks are waiting. Open your task list to review them.")
        };

        let mut body: Vec<String> = outstanding
            .iter()
            .take(MAX_LISTED_TITLES)
            .map(|t| t.display_title().to_string())
            .collect();
        let remaining = count.saturating_sub(MAX_LISTED_TITLES);
        if remaining > 0 {
            let noun = if remaining == 1 { "task" } else { "tasks" };
            body.push(format!("+{remaining} more {noun}..."));
        }

        Some(Self {
            headline,
            summary,
            body,
        })
    }
}

/// Where notifications are shown. `show` replaces any prior content with the
/// same id.
pub trait NotificationSurface: Send + Sync {
    fn show(&self, id: &str, content: &NotificationContent) -> Result<()>;
}

pub struct NotificationPresenter {
    surface: Arc<dyn NotificationSurface>,
}

impl NotificationPresenter {
    pub fn new(surface: Arc<dyn NotificationSurface>) -> Self {
        Self { surface }
    }

    /// Emit one notification summarizing `outstanding`. Returns whether the
    /// surface accepted it.
    pub fn present(&self, outstanding: &[&TaskDefinition]) -> bool {
        let Some(content) = NotificationContent::for_tasks(outstanding) else {
            return false;
        };
        match self.surface.show(NOTIFICATION_ID, &content) {
            Ok(()) => {
                info!(count = outstanding.len(), "reminder notification shown");
                true
            }
            Err(ReminderError::PermissionDenied(msg)) => {
                warn!("notification permission denied: {msg}");
                false
            }
            Err(e) => {
                warn!("notification not delivered: {e}");
                false
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
