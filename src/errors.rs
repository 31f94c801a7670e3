use std::fmt;
use std::path::PathBuf;

use reqwest::header::InvalidHeaderValue;
use thiserror::Error;

/// The request a failure belongs to. Only used to label console output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    StorageUpload,
    Insert,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::StorageUpload => write!(f, "Storage upload"),
            Step::Insert => write!(f, "Insert"),
        }
    }
}

/// Errors raised by a single HTTP call against the backend.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The server answered with a non-2xx status.
    #[error("{status} {body}")]
    Status { status: u16, body: String },

    /// The request never produced a response.
    #[error("{0}")]
    Transport(#[from] reqwest::Error),

    #[error("failed to build HTTP client")]
    Build(#[source] reqwest::Error),

    #[error("service role key is not a valid header value")]
    InvalidKey(#[from] InvalidHeaderValue),

    #[error("failed to encode record")]
    Encode(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum SmokeError {
    #[error("Set SUPABASE_URL and SUPABASE_SERVICE_ROLE_KEY before running.")]
    MissingConfig,

    #[error("{step} failed: {source}")]
    Request {
        step: Step,
        #[source]
        source: ClientError,
    },

    #[error(transparent)]
    Client(#[from] ClientError),

    #[error("failed to read {}", path.display())]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{} is empty", path.display())]
    EmptyFile { path: PathBuf },

    #[error("{} is {size} bytes, the limit is {limit}", path.display())]
    FileTooLarge { path: PathBuf, size: u64, limit: u64 },

    #[error("failed to write output")]
    Output(#[from] std::io::Error),
}

impl SmokeError {
    /// Request failures are reported on stdout as they happen.
    pub fn is_reported(&self) -> bool {
        matches!(self, SmokeError::Request { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_failure_message() {
        let err = SmokeError::Request {
            step: Step::StorageUpload,
            source: ClientError::Status {
                status: 409,
                body: "{\"error\":\"Duplicate\"}".to_string(),
            },
        };

        assert_eq!(
            err.to_string(),
            "Storage upload failed: 409 {\"error\":\"Duplicate\"}"
        );
        assert!(err.is_reported());
    }

    #[test]
    fn test_missing_config_message() {
        let err = SmokeError::MissingConfig;
        assert_eq!(
            err.to_string(),
            "Set SUPABASE_URL and SUPABASE_SERVICE_ROLE_KEY before running."
        );
        assert!(!err.is_reported());
    }
}
