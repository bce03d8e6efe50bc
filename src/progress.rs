//! Callback trait for lifecycle events.
//!
//! Inject an [`Arc<dyn LifecycleCallback>`] via
//! [`crate::machine::UploadStateMachine::with_callback`] to observe the
//! session as it moves between states. The CLI uses it to drive a spinner;
//! a host UI could forward the same events to its own event loop.
//!
//! # Example
//!
//! ```rust
//! use pdfproc::{BlobRegistry, LifecycleCallback, UploadStateMachine};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     failures: AtomicUsize,
//! }
//!
//! impl LifecycleCallback for CountingCallback {
//!     fn on_processing_failed(&self, _name: &str, message: &str) {
//!         self.failures.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("failed: {message}");
//!     }
//! }
//!
//! let cb = Arc::new(CountingCallback { failures: AtomicUsize::new(0) });
//! let machine = UploadStateMachine::new(BlobRegistry::new())
//!     .with_callback(cb as Arc<dyn LifecycleCallback>);
//! ```

use std::sync::Arc;

/// Called by the state machine on each lifecycle event.
///
/// All methods have default no-op implementations so callers only override
/// what they care about.
pub trait LifecycleCallback: Send + Sync {
    /// A PDF was accepted.
    fn on_file_selected(&self, name: &str, size: u64) {
        let _ = (name, size);
    }

    /// A selection was ignored because its declared type is not PDF.
    fn on_file_ignored(&self, name: &str, media_type: &str) {
        let _ = (name, media_type);
    }

    /// The upload is about to be sent.
    fn on_processing_start(&self, name: &str, size: u64) {
        let _ = (name, size);
    }

    /// The service returned the processed file.
    ///
    /// # Arguments
    /// * `artifact_name`: display name of the processed file
    /// * `size`:          byte length of the returned body
    fn on_processing_complete(&self, artifact_name: &str, size: u64) {
        let _ = (artifact_name, size);
    }

    /// The service rejected the file or could not be reached.
    fn on_processing_failed(&self, name: &str, message: &str) {
        let _ = (name, message);
    }

    /// The processed file was saved.
    fn on_download(&self, artifact_name: &str, path: &std::path::Path) {
        let _ = (artifact_name, path);
    }

    /// The session went back to idle.
    fn on_reset(&self) {}
}

/// A no-op implementation. This is the default when no callback is set.
pub struct NoopLifecycleCallback;

impl LifecycleCallback for NoopLifecycleCallback {}

/// Convenience alias for the type stored by the state machine.
pub type SharedCallback = Arc<dyn LifecycleCallback>;
