// =============================================================================
// Ingest errors
// =============================================================================

use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestError {
    /// A line inside the BEGIN/END region that is not a valid trade record.
    #[error("malformed record on line {line}: {reason}")]
    MalformedRecord { line: u64, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON encode error: {0}")]
    Encode(#[from] serde_json::Error),
}

