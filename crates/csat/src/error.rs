#![forbid(unsafe_code)]

use std::path::PathBuf;

use csat_core::ParseDirectionError;
use csat_grid::ReleaseIgnoredReason;
use csat_sheet::{ActionRejected, StorageError};
use thiserror::Error;

use crate::config::ConfigError;

pub type Result<T> = std::result::Result<T, CsatError>;

#[derive(Debug, Error)]
pub enum CsatError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("invalid log filter: {0}")]
    LogFilter(#[from] tracing_subscriber::filter::ParseError),

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid resize direction: {0}")]
    Direction(#[from] ParseDirectionError),

    #[error("action rejected: {0}")]
    Rejected(#[from] ActionRejected),

    #[error("no panel with id: {id}")]
    UnknownPanel { id: String },

    #[error("gesture on {id} committed nothing ({reason:?})")]
    NotCommitted { id: String, reason: ReleaseIgnoredReason },

    #[error("the sheet is read-only")]
    ReadOnly,

    #[error("the layout is locked")]
    LayoutLocked,

    #[error("required path does not exist: {path}")]
    MissingPath { path: PathBuf },
}

impl CsatError {
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) | Self::LogFilter(_) | Self::Direction(_) => 2,
            Self::Storage(_) | Self::Io(_) | Self::Json(_) | Self::MissingPath { .. } => 3,
            Self::Rejected(_)
            | Self::UnknownPanel { .. }
            | Self::NotCommitted { .. }
            | Self::ReadOnly
            | Self::LayoutLocked => 4,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::CsatError;
    use csat_sheet::{ActionRejected, StorageError};

    #[test]
    fn exit_codes_group_by_cause() {
        assert_eq!(CsatError::from(StorageError::NotADocument).exit_code(), 3);
        assert_eq!(CsatError::ReadOnly.exit_code(), 4);
        let rejected = CsatError::from(ActionRejected::IdUnavailable { id: "hp".into() });
        assert_eq!(rejected.exit_code(), 4);
        assert_eq!(
            rejected.to_string(),
            "action rejected: element id is empty or taken: \"hp\""
        );
    }

    #[test]
    fn direction_errors_are_usage_errors() {
        let err = "x".parse::<csat_core::Direction>().unwrap_err();
        assert_eq!(CsatError::from(err).exit_code(), 2);
    }
}
