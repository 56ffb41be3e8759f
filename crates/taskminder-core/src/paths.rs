use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Directory constants
// ---------------------------------------------------------------------------

pub const TASKMINDER_DIR: &str = ".taskminder";
pub const NOTIFICATIONS_DIR: &str = ".taskminder/notifications";

pub const CONFIG_FILE: &str = ".taskminder/config.yaml";
pub const DB_FILE: &str = ".taskminder/reminder.redb";

pub const DEFAULT_TASKS_FILE: &str = "tasks.yaml";

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn taskminder_dir(root: &Path) -> PathBuf {
    root.join(TASKMINDER_DIR)
}

pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

pub fn db_path(root: &Path) -> PathBuf {
    root.join(DB_FILE)
}

pub fn notifications_dir(root: &Path) -> PathBuf {
    root.join(NOTIFICATIONS_DIR)
}

/// Resolve a config-relative path against the project root.
pub fn resolve(root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}
