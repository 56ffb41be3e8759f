//! Where the reminder pipeline reads task documents from.

use crate::error::{ReminderError, Result};
use crate::task::TaskDefinition;
use futures::future::BoxFuture;
use std::path::PathBuf;
use tracing::{debug, warn};

/// Asynchronous document query source. A failed fetch is a transport error;
/// the caller decides what that means for the current cycle.
pub trait TaskSource: Send + Sync {
    fn fetch_all_tasks(&self) -> BoxFuture<'_, Result<Vec<TaskDefinition>>>;
}

/// Reads a YAML (or JSON) list of task documents from a file.
///
/// Each document is decoded on its own; a document that fails to decode is
/// logged and skipped so the rest of the batch still counts.
#[derive(Debug, Clone)]
pub struct YamlTaskSource {
    path: PathBuf,
}

impl YamlTaskSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

impl TaskSource for YamlTaskSource {
    fn fetch_all_tasks(&self) -> BoxFuture<'_, Result<Vec<TaskDefinition>>> {
        Box::pin(async move {
            let raw = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
                ReminderError::Transport(format!("cannot read {}: {e}", self.path.display()))
            })?;
            parse_documents(&raw)
        })
    }
}

/// Decode a list of task documents, skipping malformed entries.
pub fn parse_documents(raw: &str) -> Result<Vec<TaskDefinition>> {
    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }
    let docs: Vec<serde_yaml::Value> = serde_yaml::from_str(raw)
        .map_err(|e| ReminderError::Transport(format!("task documents unreadable: {e}")))?;

    let mut tasks = Vec::with_capacity(docs.len());
    for (index, doc) in docs.iter().enumerate() {
        match decode_document(doc) {
            Ok(task) => tasks.push(task),
            Err(e) => warn!(index, "malformed task data, skipping document: {e}"),
        }
    }
    debug!(count = tasks.len(), "task documents loaded");
    Ok(tasks)
}

/// Decode one document from its YAML text rather than from the `Value`, so
/// plain scalars such as `id: 42` or `title: 1984` still read as strings.
fn decode_document(
    doc: &serde_yaml::Value,
) -> std::result::Result<TaskDefinition, serde_yaml::Error> {
    let text = serde_yaml::to_string(doc)?;
    serde_yaml::from_str(&text)
}
