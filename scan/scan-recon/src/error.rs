//! Error types for scan sessions.
//!
//! Reconstruction itself never fails: degenerate input, capacity overflow,
//! filter collapse and bad poses are all absorbed inside the pipeline. The
//! only errors that reach callers come from misusing the session lifecycle.

use thiserror::Error;

/// Result type for scan session operations.
pub type ScanResult<T> = Result<T, ScanError>;

/// Errors returned by [`crate::ScanController`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScanError {
    /// `stop_scan` was called without an active scan.
    #[error("no scan in progress")]
    NotScanning,

    /// A background reconstruction dropped its result channel.
    #[error("reconstruction worker disconnected before delivering a result")]
    WorkerDisconnected,
}
