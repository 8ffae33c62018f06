//! Error types for the reporting layer.

use thiserror::Error;

/// Errors surfaced by an outbound [`crate::ReportSink`].
///
/// Reports are best-effort telemetry: the session logs these and moves on,
/// they never terminate a connection.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("outbound channel closed")]
    Closed,

    #[error("outbound send failed: {0}")]
    Send(String),
}
