use std::fmt;

/// Errors surfaced by the scan engine. Reputation-source failures are
/// captured inside the client adapters and degrade the affected result
/// instead of failing the scan, so only input validation and persistence
/// problems reach the caller of `submit_scan`.
#[derive(Debug)]
pub enum ScanError {
    InvalidInput,

    SourceUnavailable {
        source: &'static str,
        message: String,
    },

    PersistenceFailure(String),
}

impl fmt::Display for ScanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScanError::InvalidInput => write!(f, "email content is required"),
            ScanError::SourceUnavailable { source, message } => {
                write!(f, "{source} lookup failed: {message}")
            }
            ScanError::PersistenceFailure(msg) => {
                write!(f, "failed to save scan record: {msg}")
            }
        }
    }
}

impl std::error::Error for ScanError {}

impl ScanError {
    pub fn unavailable(source: &'static str, err: impl std::fmt::Display) -> Self {
        ScanError::SourceUnavailable {
            source,
            message: err.to_string(),
        }
    }
}
