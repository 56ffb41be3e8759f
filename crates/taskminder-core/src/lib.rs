//! Recurring local task reminders.
//!
//! The pipeline: [`scheduler::AlarmScheduler`] keeps one daily wake-up armed;
//! when it fires, [`trigger::ReminderTrigger`] re-arms it, fetches tasks from
//! a [`source::TaskSource`], filters them with [`resolver`], and hands the
//! survivors to [`notify::NotificationPresenter`]. After a host restart,
//! [`boot::recover`] restores the alarm if reminders were enabled.

pub mod boot;
pub mod calendar;
pub mod config;
pub mod db;
pub mod error;
pub mod io;
pub mod notify;
pub mod paths;
pub mod resolver;
pub mod scheduler;
pub mod settings;
pub mod source;
pub mod store;
pub mod surface;
pub mod task;
pub mod timer;
pub mod trigger;

pub use error::{ReminderError, Result};
