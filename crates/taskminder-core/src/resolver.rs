//! Decides which tasks are still outstanding on a given local day.
//!
//! A task is *outstanding* when it is active today and not yet satisfied.
//! Recurring tasks are active on their listed weekdays; ranged tasks on every
//! day of their inclusive date interval. Bad range data makes a task
//! inactive and is logged; it never aborts the batch.

use crate::calendar::{day_end, day_start, weekday_code};
use crate::task::{parse_range_bound, Recurrence, TaskDefinition};
use chrono::{DateTime, TimeZone};
use tracing::warn;

pub fn is_active_today<Tz: TimeZone>(task: &TaskDefinition, today: &DateTime<Tz>) -> bool {
    match &task.recurrence {
        Recurrence::Recurring { active_weekdays } => {
            active_weekdays.contains(&weekday_code(today))
        }
        Recurrence::Ranged {
            range_start,
            range_end,
        } => {
            let (Some(start), Some(end)) = (range_start.as_deref(), range_end.as_deref()) else {
                return false;
            };
            let tz = today.timezone();
            let bounds = parse_range_bound(start, &tz)
                .and_then(|s| parse_range_bound(end, &tz).map(|e| (s, e)));
            match bounds {
                Ok((start, end)) => {
                    if start > end {
                        warn!(task = %task.id, %start, %end, "malformed task data: range start after end");
                        return false;
                    }
                    let day = today.date_naive();
                    start <= day && day <= end
                }
                Err(e) => {
                    warn!(task = %task.id, "{e}; treating as not active");
                    false
                }
            }
        }
    }
}

/// Whether the task already counts as done for today.
///
/// Any `Completed` mark satisfies a task of either kind, regardless of the
/// day it was recorded. Recurring tasks are also satisfied by a completion
/// instant inside today's local bounds.
pub fn is_satisfied<Tz: TimeZone>(task: &TaskDefinition, today: &DateTime<Tz>) -> bool {
    if task.any_completed() {
        return true;
    }
    match &task.recurrence {
        Recurrence::Recurring { .. } => {
            let Some(done_at) = task.last_completion_at else {
                return false;
            };
            let start = day_start(today);
            let end = day_end(&start);
            let done_at = done_at.with_timezone(&today.timezone());
            start <= done_at && done_at <= end
        }
        Recurrence::Ranged { .. } => false,
    }
}

/// Tasks that are active and unsatisfied today, in input order.
pub fn outstanding_today<'a, Tz: TimeZone>(
    tasks: &'a [TaskDefinition],
    today: &DateTime<Tz>,
) -> Vec<&'a TaskDefinition> {
    tasks
        .iter()
        .filter(|t| is_active_today(t, today) && !is_satisfied(t, today))
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
