//! Persistent reminder storage using redb.
//!
//! # Table design
//!
//! ```text
//! settings: (namespace, key) -> UTF-8 value
//! wakeups:  wake-up id       -> JSON-encoded Wakeup
//! ```
//!
//! `settings` backs [`KeyValueStore`]. `wakeups` backs [`TimerFacility`] for
//! hosts without a native alarm service: keying by id makes re-registration
//! an overwrite, and the host daemon drains due rows with
//! [`ReminderDb::take_due`].

use std::path::Path;

use chrono::{DateTime, Utc};
use redb::{Database, ReadableTable, TableDefinition};

use crate::error::{ReminderError, Result};
use crate::store::KeyValueStore;
use crate::timer::{TimerFacility, Wakeup, WakeupOptions};

// ---------------------------------------------------------------------------
// Table definitions
// ---------------------------------------------------------------------------

const SETTINGS: TableDefinition<(&str, &str), &str> = TableDefinition::new("settings");

const WAKEUPS: TableDefinition<&str, &[u8]> = TableDefinition::new("wakeups");

fn store_err(e: impl std::fmt::Display) -> ReminderError {
    ReminderError::Store(e.to_string())
}

// ---------------------------------------------------------------------------
// ReminderDb
// ---------------------------------------------------------------------------

pub struct ReminderDb {
    db: Database,
}

impl ReminderDb {
    /// Open or create the redb database at `path`.
    ///
    /// Creates both tables if they don't already exist.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let db = Database::create(path).map_err(store_err)?;
        let wt = db.begin_write().map_err(store_err)?;
        wt.open_table(SETTINGS).map_err(store_err)?;
        wt.open_table(WAKEUPS).map_err(store_err)?;
        wt.commit().map_err(store_err)?;
        Ok(Self { db })
    }

    /// Remove and return every wake-up due at or before `now`, earliest first.
    pub fn take_due(&self, now: DateTime<Utc>) -> Result<Vec<Wakeup>> {
        let due: Vec<Wakeup> = self
            .list_wakeups()?
            .into_iter()
            .filter(|w| w.fire_at <= now)
            .collect();
        if due.is_empty() {
            return Ok(due);
        }
        let wt = self.db.begin_write().map_err(store_err)?;
        {
            let mut table = wt.open_table(WAKEUPS).map_err(store_err)?;
            for wakeup in &due {
                table.remove(wakeup.id.as_str()).map_err(store_err)?;
            }
        }
        wt.commit().map_err(store_err)?;
        Ok(due)
    }

    /// Drop every registered wake-up. Returns how many were removed.
    pub fn clear_wakeups(&self) -> Result<usize> {
        let ids: Vec<String> = self.list_wakeups()?.into_iter().map(|w| w.id).collect();
        let wt = self.db.begin_write().map_err(store_err)?;
        {
            let mut table = wt.open_table(WAKEUPS).map_err(store_err)?;
            for id in &ids {
                table.remove(id.as_str()).map_err(store_err)?;
            }
        }
        wt.commit().map_err(store_err)?;
        Ok(ids.len())
    }

    /// All registered wake-ups, sorted by fire instant ascending.
    pub fn list_wakeups(&self) -> Result<Vec<Wakeup>> {
        let rt = self.db.begin_read().map_err(store_err)?;
        let table = rt.open_table(WAKEUPS).map_err(store_err)?;
        let mut result = Vec::new();
        for entry in table.iter().map_err(store_err)? {
            let (_, v) = entry.map_err(store_err)?;
            let wakeup: Wakeup = serde_json::from_slice(v.value())?;
            result.push(wakeup);
        }
        result.sort_by(|a, b| a.fire_at.cmp(&b.fire_at));
        Ok(result)
    }
}

impl KeyValueStore for ReminderDb {
    fn get(&self, namespace: &str, key: &str) -> Result<Option<String>> {
        let rt = self.db.begin_read().map_err(store_err)?;
        let table = rt.open_table(SETTINGS).map_err(store_err)?;
        let value = table.get((namespace, key)).map_err(store_err)?;
        Ok(value.map(|v| v.value().to_string()))
    }

    fn put(&self, namespace: &str, key: &str, value: &str) -> Result<()> {
        let wt = self.db.begin_write().map_err(store_err)?;
        {
            let mut table = wt.open_table(SETTINGS).map_err(store_err)?;
            table.insert((namespace, key), value).map_err(store_err)?;
        }
        wt.commit().map_err(store_err)?;
        Ok(())
    }
}

impl TimerFacility for ReminderDb {
    fn register_wakeup(
        &self,
        id: &str,
        fire_at: DateTime<Utc>,
        options: WakeupOptions,
    ) -> Result<()> {
        let wakeup = Wakeup {
            id: id.to_string(),
            fire_at,
            options,
        };
        let value = serde_json::to_vec(&wakeup)?;
        let wt = self.db.begin_write().map_err(store_err)?;
        {
            let mut table = wt.open_table(WAKEUPS).map_err(store_err)?;
            table.insert(id, value.as_slice()).map_err(store_err)?;
        }
        wt.commit().map_err(store_err)?;
        Ok(())
    }

    fn cancel_wakeup(&self, id: &str) -> Result<()> {
        let wt = self.db.begin_write().map_err(store_err)?;
        {
            let mut table = wt.open_table(WAKEUPS).map_err(store_err)?;
            table.remove(id).map_err(store_err)?;
        }
        wt.commit().map_err(store_err)?;
        Ok(())
    }

    fn pending(&self, id: &str) -> Result<Option<Wakeup>> {
        let rt = self.db.begin_read().map_err(store_err)?;
        let table = rt.open_table(WAKEUPS).map_err(store_err)?;
        match table.get(id).map_err(store_err)? {
            Some(v) => Ok(Some(serde_json::from_slice(v.value())?)),
            None => Ok(None),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
