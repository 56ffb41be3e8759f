use crate::calendar::WeekdayCode;
use crate::error::{ReminderError, Result};
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

// ---------------------------------------------------------------------------
// CompletionState
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionState {
    Pending,
    Completed,
}

// ---------------------------------------------------------------------------
// Recurrence
// ---------------------------------------------------------------------------

/// How a task is placed on the calendar.
///
/// Range bounds stay as the raw strings the document source stored; they are
/// parsed per evaluation so that one bad value only excludes its own task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Recurrence {
    /// Repeats weekly on the listed days.
    Recurring {
        #[serde(default)]
        active_weekdays: BTreeSet<WeekdayCode>,
    },
    /// Active on every day of an inclusive date interval.
    Ranged {
        #[serde(default)]
        range_start: Option<String>,
        #[serde(default)]
        range_end: Option<String>,
    },
}

// ---------------------------------------------------------------------------
// TaskDefinition
// ---------------------------------------------------------------------------

/// A task as read from the document source. Never mutated by the reminder
/// pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskDefinition {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(flatten)]
    pub recurrence: Recurrence,
    /// Participant key -> completion state.
    #[serde(default)]
    pub completion_marks: BTreeMap<String, CompletionState>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_completion_at: Option<DateTime<Utc>>,
}

impl TaskDefinition {
    pub fn recurring(
        id: impl Into<String>,
        title: impl Into<String>,
        days: impl IntoIterator<Item = WeekdayCode>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            recurrence: Recurrence::Recurring {
                active_weekdays: days.into_iter().collect(),
            },
            completion_marks: BTreeMap::new(),
            last_completion_at: None,
        }
    }

    pub fn ranged(
        id: impl Into<String>,
        title: impl Into<String>,
        start: Option<&str>,
        end: Option<&str>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            recurrence: Recurrence::Ranged {
                range_start: start.map(str::to_string),
                range_end: end.map(str::to_string),
            },
            completion_marks: BTreeMap::new(),
            last_completion_at: None,
        }
    }

    pub fn with_mark(mut self, participant: impl Into<String>, state: CompletionState) -> Self {
        self.completion_marks.insert(participant.into(), state);
        self
    }

    pub fn with_last_completion(mut self, at: DateTime<Utc>) -> Self {
        self.last_completion_at = Some(at);
        self
    }

    /// True when any participant has marked the task completed.
    pub fn any_completed(&self) -> bool {
        self.completion_marks
            .values()
            .any(|s| *s == CompletionState::Completed)
    }

    /// Title for display, falling back to the id when the title is blank.
    pub fn display_title(&self) -> &str {
        if self.title.trim().is_empty() {
            &self.id
        } else {
            &self.title
        }
    }
}

/// Parse a stored range bound into a local calendar date.
///
/// Accepts an ISO date (`2024-01-10`) or an RFC 3339 instant, the latter
/// converted to the local date in `tz`.
pub fn parse_range_bound<Tz: TimeZone>(raw: &str, tz: &Tz) -> Result<NaiveDate> {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(date);
    }
    if let Ok(instant) = DateTime::parse_from_rfc3339(raw) {
        return Ok(instant.with_timezone(tz).date_naive());
    }
    Err(ReminderError::MalformedData(format!(
        "unparsable range bound '{raw}'"
    )))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    #[test]
    fn recurring_yaml_roundtrip() {
        let yaml = r#"
id: plants
title: Water the plants
kind: recurring
active_weekdays: [Mon, Wed, Fri]
completion_marks:
  alice: pending
"#;
        let task: TaskDefinition = serde_yaml::from_str(yaml).unwrap();
        match &task.recurrence {
            Recurrence::Recurring { active_weekdays } => {
                assert_eq!(active_weekdays.len(), 3);
                assert!(active_weekdays.contains(&WeekdayCode::Wed));
            }
            other => panic!("expected recurring, got {other:?}"),
        }
        assert!(!task.any_completed());

        let back = serde_yaml::to_string(&task).unwrap();
        let again: TaskDefinition = serde_yaml::from_str(&back).unwrap();
        assert_eq!(again, task);
    }

    #[test]
    fn ranged_task_keeps_malformed_bounds_as_text() {
        let yaml = r#"
id: taxes
title: File taxes
kind: ranged
range_start: "not a date"
range_end: 2024-01-12
"#;
        let task: TaskDefinition = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(
            task.recurrence,
            Recurrence::Ranged {
                range_start: Some("not a date".to_string()),
                range_end: Some("2024-01-12".to_string()),
            }
        );
    }

    #[test]
    fn any_completed_checks_every_participant() {
        let task = TaskDefinition::recurring("t", "T", [WeekdayCode::Mon])
            .with_mark("alice", CompletionState::Pending)
            .with_mark("bob", CompletionState::Completed);
        assert!(task.any_completed());
    }

    #[test]
    fn display_title_falls_back_to_id() {
        let task = TaskDefinition::recurring("chores", "  ", [WeekdayCode::Sat]);
        assert_eq!(task.display_title(), "chores");
    }

    #[test]
    fn parse_range_bound_formats() {
        let tz = FixedOffset::east_opt(9 * 3600).unwrap();
        assert_eq!(
            parse_range_bound("2024-01-10", &tz).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 10).unwrap()
        );
        // 20:00 UTC on the 10th is already the 11th at +09:00.
        assert_eq!(
            parse_range_bound("2024-01-10T20:00:00Z", &tz).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 11).unwrap()
        );
        assert!(matches!(
            parse_range_bound("10/01/2024", &tz),
            Err(ReminderError::MalformedData(_))
        ));
    }
}
