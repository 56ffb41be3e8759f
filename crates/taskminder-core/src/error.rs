use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReminderError {
    #[error("not initialized: run 'taskminder init'")]
    NotInitialized,

    #[error("invalid reminder time: {0}")]
    InvalidTime(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("permission denied: {0}")]
    PermissionDenied(String),

    #[error("malformed task data: {0}")]
    MalformedData(String),

    #[error("timer facility unavailable: {0}")]
    PlatformUnavailable(String),

    #[error("store error: {0}")]
    Store(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ReminderError>;
