//! Error types for the pdfproc library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`ProcessingFailed`]: **recoverable**. The remote service rejected the
//!   upload or could not be reached. The state machine stores its message
//!   next to the still-selected file so the user can retry or cancel.
//!
//! * [`PdfProcError`]: everything else the library can report: unreadable
//!   input files, events sent in the wrong lifecycle state, a failed
//!   save-to-disk, invalid configuration.
//!
//! Choosing a file with the wrong media type is *not* an error. The selection
//! event is ignored and reported as [`crate::machine::Selection::Ignored`].

use crate::machine::LifecycleState;
use std::path::PathBuf;
use thiserror::Error;

/// Message used when the service gives no usable explanation.
pub const FALLBACK_MESSAGE: &str = "Failed to process PDF";

/// The remote processor rejected the file or could not be reached.
///
/// `message` is always non-empty and suitable for showing to the user.
#[derive(Debug, Clone, PartialEq, Eq, Error, serde::Serialize, serde::Deserialize)]
#[error("{message}")]
pub struct ProcessingFailed {
    pub message: String,
}

impl ProcessingFailed {
    /// Build from a service-supplied message, falling back to
    /// [`FALLBACK_MESSAGE`] when it is missing or blank.
    pub fn new(message: Option<String>) -> Self {
        Self::with_fallback(message, FALLBACK_MESSAGE)
    }

    /// Like [`ProcessingFailed::new`] with a caller-chosen fallback.
    pub fn with_fallback(message: Option<String>, fallback: &str) -> Self {
        let message = message
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| fallback.to_string());
        Self { message }
    }

    /// The generic failure with no detail from the service.
    pub fn generic() -> Self {
        Self::new(None)
    }
}

/// All errors returned by the pdfproc library.
#[derive(Debug, Error)]
pub enum PdfProcError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("File not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// Any other I/O failure while reading the input.
    #[error("Failed to read '{path}': {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Lifecycle errors ──────────────────────────────────────────────────
    /// An event arrived in a state that does not accept it.
    #[error("Cannot {event} while {state}")]
    InvalidTransition {
        event: &'static str,
        state: LifecycleState,
    },

    /// The artifact's resource handle was released before it was used.
    #[error("Resource handle '{url}' has already been released")]
    HandleReleased { url: String },

    // ── Processing errors ─────────────────────────────────────────────────
    /// The remote processor failed.
    #[error(transparent)]
    Processing(#[from] ProcessingFailed),

    // ── Output errors ─────────────────────────────────────────────────────
    /// Could not create or write the downloaded file.
    #[error("Failed to save '{path}': {source}")]
    SaveFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn processing_failed_keeps_service_message() {
        let e = ProcessingFailed::new(Some("corrupt file".into()));
        assert_eq!(e.message, "corrupt file");
        assert_eq!(e.to_string(), "corrupt file");
    }

    #[test]
    fn processing_failed_falls_back_on_blank() {
        assert_eq!(ProcessingFailed::new(None).message, FALLBACK_MESSAGE);
        assert_eq!(
            ProcessingFailed::new(Some("   ".into())).message,
            FALLBACK_MESSAGE
        );
    }

    #[test]
    fn invalid_transition_display() {
        let e = PdfProcError::InvalidTransition {
            event: "download",
            state: LifecycleState::Idle,
        };
        let msg = e.to_string();
        assert!(msg.contains("download"), "got: {msg}");
        assert!(msg.contains("idle"), "got: {msg}");
    }

    #[test]
    fn processing_error_is_transparent() {
        let e: PdfProcError = ProcessingFailed::new(Some("boom".into())).into();
        assert_eq!(e.to_string(), "boom");
    }
}
