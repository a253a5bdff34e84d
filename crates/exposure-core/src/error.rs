// ── Core error types ──
//
// The resolution engine itself is infallible: absent or malformed optional
// data is "no signal". Errors only arise at the snapshot boundary and when
// parsing ad-hoc port specifications.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Snapshot is not valid JSON: {0}")]
    Snapshot(#[from] serde_json::Error),

    #[error("Invalid port specification '{spec}' for {protocol}")]
    InvalidPort { protocol: String, spec: String },
}
