//! Error types shared by the repository, the store and the CLI.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("expected a JSON array of tasks")]
    NotAnArray,

    #[error("task #{index} is invalid: {reason}")]
    InvalidTask { index: usize, reason: String },

    #[error("unrecognised due date '{0}' (try YYYY-MM-DD, today, tomorrow, fri, in 3d)")]
    InvalidDate(String),

    #[error("no task matches '{0}'")]
    TaskNotFound(String),

    #[error("'{identifier}' matches several tasks:\n{candidates}\nPlease use a longer id instead.")]
    AmbiguousTask {
        identifier: String,
        candidates: String,
    },
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_shows_only_the_cause() {
        let err = Error::from(std::io::Error::new(std::io::ErrorKind::NotFound, "tasks.json missing"));
        assert_eq!(err.to_string(), "tasks.json missing");
    }
}
