//! The upload → process → download lifecycle.
//!
//! ```text
//!            drop/pick (pdf)            begin_processing
//!   Idle ─────────────────▶ FileSelected ──────────────▶ Processing
//!    ▲  ◀──────── cancel ──────┘   ▲                        │
//!    │                             └──── failure (+error) ──┤
//!    │                                                      │ success
//!    └──────────────── reset ─────────── Complete ◀─────────┘
//!                                        (download)
//! ```
//!
//! State and payload live together in one enum, so a `Complete` without an
//! artifact or a `Processing` without a file cannot be represented. The error
//! message is carried by `FileSelected` only.
//!
//! The artifact's [`ObjectUrl`] is released on [`UploadStateMachine::reset`]
//! or, failing that, when the machine is dropped. Release is idempotent, so
//! both paths together still revoke the handle exactly once.

use crate::blob::{BlobRegistry, ObjectUrl};
use crate::config::ProcessorConfig;
use crate::error::{PdfProcError, ProcessingFailed};
use crate::file::SelectedFile;
use crate::progress::{NoopLifecycleCallback, SharedCallback};
use crate::remote::RemoteProcessor;
use crate::save::SaveTarget;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// The active lifecycle state, without payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LifecycleState {
    Idle,
    FileSelected,
    Processing,
    Complete,
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LifecycleState::Idle => "idle",
            LifecycleState::FileSelected => "file selected",
            LifecycleState::Processing => "processing",
            LifecycleState::Complete => "complete",
        })
    }
}

/// Outcome of a drop or pick event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    /// The file is now the selected file.
    Accepted,
    /// Wrong media type, or the current state does not take selections.
    Ignored,
}

/// The server-returned file, ready to download.
#[derive(Debug)]
pub struct ProcessedArtifact {
    name: String,
    url: ObjectUrl,
}

impl ProcessedArtifact {
    /// `processed_<original name>`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The in-memory handle backing the download.
    pub fn url(&self) -> &ObjectUrl {
        &self.url
    }
}

enum State {
    Idle,
    FileSelected {
        file: SelectedFile,
        error: Option<String>,
    },
    Processing {
        file: SelectedFile,
    },
    Complete {
        file: SelectedFile,
        artifact: ProcessedArtifact,
    },
}

impl State {
    fn kind(&self) -> LifecycleState {
        match self {
            State::Idle => LifecycleState::Idle,
            State::FileSelected { .. } => LifecycleState::FileSelected,
            State::Processing { .. } => LifecycleState::Processing,
            State::Complete { .. } => LifecycleState::Complete,
        }
    }
}

/// Client-side session for one PDF at a time.
pub struct UploadStateMachine {
    state: State,
    drag_over: bool,
    registry: BlobRegistry,
    output_prefix: String,
    callback: SharedCallback,
}

impl fmt::Debug for UploadStateMachine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploadStateMachine")
            .field("state", &self.state())
            .field("file", &self.selected_file().map(|s| s.name()))
            .field("artifact", &self.artifact().map(|a| a.name()))
            .field("error", &self.error())
            .field("drag_over", &self.drag_over)
            .finish()
    }
}

impl UploadStateMachine {
    /// A new session in `Idle`, allocating handles from `registry`.
    pub fn new(registry: BlobRegistry) -> Self {
        Self {
            state: State::Idle,
            drag_over: false,
            registry,
            output_prefix: ProcessorConfig::default().output_prefix,
            callback: Arc::new(NoopLifecycleCallback),
        }
    }

    pub fn with_callback(mut self, callback: SharedCallback) -> Self {
        self.callback = callback;
        self
    }

    /// Take the artifact name prefix from `config`.
    pub fn with_config(mut self, config: &ProcessorConfig) -> Self {
        self.output_prefix = config.output_prefix.clone();
        self
    }

    // ── Accessors ────────────────────────────────────────────────────────

    pub fn state(&self) -> LifecycleState {
        self.state.kind()
    }

    /// The selected file; `None` only in `Idle`.
    pub fn selected_file(&self) -> Option<&SelectedFile> {
        match &self.state {
            State::Idle => None,
            State::FileSelected { file, .. }
            | State::Processing { file }
            | State::Complete { file, .. } => Some(file),
        }
    }

    /// The processed file; `Some` only in `Complete`.
    pub fn artifact(&self) -> Option<&ProcessedArtifact> {
        match &self.state {
            State::Complete { artifact, .. } => Some(artifact),
            _ => None,
        }
    }

    /// Message from the last failed attempt, if any.
    pub fn error(&self) -> Option<&str> {
        match &self.state {
            State::FileSelected { error, .. } => error.as_deref(),
            _ => None,
        }
    }

    pub fn is_drag_over(&self) -> bool {
        self.drag_over
    }

    pub fn registry(&self) -> &BlobRegistry {
        &self.registry
    }

    // ── Drag highlight ───────────────────────────────────────────────────

    pub fn drag_over(&mut self) {
        self.drag_over = true;
    }

    pub fn drag_leave(&mut self) {
        self.drag_over = false;
    }

    // ── Selection ────────────────────────────────────────────────────────

    /// A file was dropped on the drop zone.
    pub fn drop_file(&mut self, file: SelectedFile) -> Selection {
        self.drag_over = false;
        self.select(file)
    }

    /// A file was chosen in the file picker.
    pub fn pick_file(&mut self, file: SelectedFile) -> Selection {
        self.select(file)
    }

    fn select(&mut self, file: SelectedFile) -> Selection {
        if !file.is_pdf() {
            debug!("Ignoring '{}' ({})", file.name(), file.media_type());
            self.callback
                .on_file_ignored(file.name(), file.media_type().as_ref());
            return Selection::Ignored;
        }
        match self.state {
            State::Idle | State::FileSelected { .. } => {}
            _ => {
                debug!("Ignoring '{}' while {}", file.name(), self.state());
                return Selection::Ignored;
            }
        }

        info!("Selected {} ({} bytes)", file.name(), file.size());
        self.callback.on_file_selected(file.name(), file.size());
        self.state = State::FileSelected { file, error: None };
        Selection::Accepted
    }

    // ── Transitions ──────────────────────────────────────────────────────

    /// `FileSelected → Idle`, discarding the file.
    pub fn cancel(&mut self) -> Result<(), PdfProcError> {
        self.expect(LifecycleState::FileSelected, "cancel")?;
        self.reset();
        Ok(())
    }

    /// `FileSelected → Processing`. Clears the previous error and returns
    /// the file to upload.
    pub fn begin_processing(&mut self) -> Result<SelectedFile, PdfProcError> {
        match std::mem::replace(&mut self.state, State::Idle) {
            State::FileSelected { file, .. } => {
                info!("Processing {}", file.name());
                self.callback.on_processing_start(file.name(), file.size());
                self.state = State::Processing { file: file.clone() };
                Ok(file)
            }
            other => {
                let state = other.kind();
                self.state = other;
                Err(PdfProcError::InvalidTransition {
                    event: "process",
                    state,
                })
            }
        }
    }

    /// Apply the result of the call started by [`Self::begin_processing`].
    ///
    /// A result that arrives after the session left `Processing` (a reset
    /// happened meanwhile) is dropped without allocating a handle.
    pub fn complete_processing(&mut self, result: Result<Bytes, ProcessingFailed>) {
        let file = match std::mem::replace(&mut self.state, State::Idle) {
            State::Processing { file } => file,
            other => {
                warn!("Discarding processing result received while {}", other.kind());
                self.state = other;
                return;
            }
        };

        match result {
            Ok(data) => {
                let size = data.len() as u64;
                let artifact = ProcessedArtifact {
                    name: format!("{}{}", self.output_prefix, file.name()),
                    url: self.registry.create_object_url(data),
                };
                info!("Processed {} → {} ({} bytes)", file.name(), artifact.name, size);
                self.callback.on_processing_complete(&artifact.name, size);
                self.state = State::Complete { file, artifact };
            }
            Err(e) => {
                warn!("Processing {} failed: {}", file.name(), e);
                self.callback.on_processing_failed(file.name(), &e.message);
                self.state = State::FileSelected {
                    file,
                    error: Some(e.message),
                };
            }
        }
    }

    /// Upload the selected file and wait for the result.
    ///
    /// Returns the error of a failed attempt after the state machine has
    /// already recorded it and gone back to `FileSelected`.
    pub async fn process(
        &mut self,
        processor: &dyn RemoteProcessor,
    ) -> Result<LifecycleState, PdfProcError> {
        let file = self.begin_processing()?;
        let result = processor.process(&file).await;
        let failure = result.as_ref().err().cloned();
        self.complete_processing(result);
        match failure {
            Some(e) => Err(e.into()),
            None => Ok(self.state()),
        }
    }

    /// Save the processed file through `target`. Stays in `Complete`.
    pub fn download(&self, target: &dyn SaveTarget) -> Result<PathBuf, PdfProcError> {
        let State::Complete { artifact, .. } = &self.state else {
            return Err(PdfProcError::InvalidTransition {
                event: "download",
                state: self.state(),
            });
        };
        let data = artifact
            .url
            .bytes()
            .ok_or_else(|| PdfProcError::HandleReleased {
                url: artifact.url.to_string(),
            })?;
        let path = target.save(&artifact.name, &data)?;
        self.callback.on_download(&artifact.name, &path);
        Ok(path)
    }

    /// Back to `Idle` from any state: release the handle, drop the file and
    /// the error.
    pub fn reset(&mut self) {
        let previous = std::mem::replace(&mut self.state, State::Idle);
        if let State::Complete { mut artifact, .. } = previous {
            artifact.url.release();
        }
        self.drag_over = false;
        debug!("Reset to idle");
        self.callback.on_reset();
    }

    fn expect(&self, wanted: LifecycleState, event: &'static str) -> Result<(), PdfProcError> {
        if self.state() == wanted {
            Ok(())
        } else {
            Err(PdfProcError::InvalidTransition {
                event,
                state: self.state(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pdf(name: &str, size: usize) -> SelectedFile {
        SelectedFile::new(name, mime::APPLICATION_PDF, vec![0u8; size])
    }

    fn selected() -> UploadStateMachine {
        let mut m = UploadStateMachine::new(BlobRegistry::new());
        assert_eq!(m.pick_file(pdf("a.pdf", 4)), Selection::Accepted);
        m
    }

    #[test]
    fn starts_idle() {
        let m = UploadStateMachine::new(BlobRegistry::new());
        assert_eq!(m.state(), LifecycleState::Idle);
        assert!(m.selected_file().is_none());
        assert!(m.artifact().is_none());
        assert!(m.error().is_none());
        assert!(!m.is_drag_over());
    }

    #[test]
    fn drag_flag_does_not_change_state() {
        let mut m = UploadStateMachine::new(BlobRegistry::new());
        m.drag_over();
        assert!(m.is_drag_over());
        assert_eq!(m.state(), LifecycleState::Idle);
        m.drag_leave();
        assert!(!m.is_drag_over());
        m.drag_over();
        m.drop_file(pdf("a.pdf", 1));
        assert!(!m.is_drag_over());
    }

    #[test]
    fn wrong_type_is_ignored() {
        let mut m = UploadStateMachine::new(BlobRegistry::new());
        let txt = SelectedFile::new("notes.txt", mime::TEXT_PLAIN, &b"hi"[..]);
        assert_eq!(m.drop_file(txt), Selection::Ignored);
        assert_eq!(m.state(), LifecycleState::Idle);
        assert!(m.selected_file().is_none());
    }

    #[test]
    fn selection_replaces_file_and_clears_error() {
        let mut m = selected();
        m.begin_processing().unwrap();
        m.complete_processing(Err(ProcessingFailed::generic()));
        assert!(m.error().is_some());

        assert_eq!(m.pick_file(pdf("b.pdf", 2)), Selection::Accepted);
        assert_eq!(m.selected_file().unwrap().name(), "b.pdf");
        assert!(m.error().is_none());
    }

    #[test]
    fn selection_ignored_while_processing() {
        let mut m = selected();
        m.begin_processing().unwrap();
        assert_eq!(m.pick_file(pdf("b.pdf", 2)), Selection::Ignored);
        assert_eq!(m.selected_file().unwrap().name(), "a.pdf");
    }

    #[test]
    fn cancel_only_from_file_selected() {
        let mut m = UploadStateMachine::new(BlobRegistry::new());
        assert!(matches!(
            m.cancel(),
            Err(PdfProcError::InvalidTransition { event: "cancel", .. })
        ));

        let mut m = selected();
        m.cancel().unwrap();
        assert_eq!(m.state(), LifecycleState::Idle);
        assert!(m.selected_file().is_none());
    }

    #[test]
    fn begin_processing_requires_file() {
        let mut m = UploadStateMachine::new(BlobRegistry::new());
        assert!(m.begin_processing().is_err());

        let mut m = selected();
        let file = m.begin_processing().unwrap();
        assert_eq!(file.name(), "a.pdf");
        assert_eq!(m.state(), LifecycleState::Processing);
        assert!(m.begin_processing().is_err());
    }

    #[test]
    fn success_allocates_one_handle() {
        let mut m = selected();
        m.begin_processing().unwrap();
        m.complete_processing(Ok(Bytes::from_static(b"out")));

        assert_eq!(m.state(), LifecycleState::Complete);
        let artifact = m.artifact().unwrap();
        assert_eq!(artifact.name(), "processed_a.pdf");
        assert_eq!(artifact.url().bytes().unwrap(), &b"out"[..]);
        assert_eq!(m.registry().live_count(), 1);
    }

    #[test]
    fn failure_keeps_file_and_allocates_nothing() {
        let mut m = selected();
        m.begin_processing().unwrap();
        m.complete_processing(Err(ProcessingFailed::new(Some("bad".into()))));

        assert_eq!(m.state(), LifecycleState::FileSelected);
        assert_eq!(m.error(), Some("bad"));
        assert_eq!(m.selected_file().unwrap().name(), "a.pdf");
        assert_eq!(m.registry().live_count(), 0);
    }

    #[test]
    fn retry_clears_previous_error() {
        let mut m = selected();
        m.begin_processing().unwrap();
        m.complete_processing(Err(ProcessingFailed::generic()));
        m.begin_processing().unwrap();
        assert!(m.error().is_none());
    }

    #[test]
    fn late_result_after_reset_is_discarded() {
        let mut m = selected();
        m.begin_processing().unwrap();
        m.reset();
        m.complete_processing(Ok(Bytes::from_static(b"late")));
        assert_eq!(m.state(), LifecycleState::Idle);
        assert_eq!(m.registry().live_count(), 0);
    }

    #[test]
    fn reset_releases_exactly_once() {
        let registry = BlobRegistry::new();
        {
            let mut m = UploadStateMachine::new(registry.clone());
            m.pick_file(pdf("a.pdf", 1));
            m.begin_processing().unwrap();
            m.complete_processing(Ok(Bytes::from_static(b"x")));
            m.reset();
            assert_eq!(registry.revoked_count(), 1);
            m.reset();
        }
        assert_eq!(registry.live_count(), 0);
        assert_eq!(registry.revoked_count(), 1);
    }

    #[test]
    fn drop_releases_handle() {
        let registry = BlobRegistry::new();
        {
            let mut m = UploadStateMachine::new(registry.clone());
            m.pick_file(pdf("a.pdf", 1));
            m.begin_processing().unwrap();
            m.complete_processing(Ok(Bytes::from_static(b"x")));
            assert_eq!(registry.live_count(), 1);
        }
        assert_eq!(registry.live_count(), 0);
        assert_eq!(registry.revoked_count(), 1);
    }

    #[test]
    fn custom_prefix_from_config() {
        let config = ProcessorConfig::builder()
            .output_prefix("mcq_")
            .build()
            .unwrap();
        let mut m = UploadStateMachine::new(BlobRegistry::new()).with_config(&config);
        m.pick_file(pdf("a.pdf", 1));
        m.begin_processing().unwrap();
        m.complete_processing(Ok(Bytes::new()));
        assert_eq!(m.artifact().unwrap().name(), "mcq_a.pdf");
    }

    #[test]
    fn download_outside_complete_is_rejected() {
        struct Never;
        impl SaveTarget for Never {
            fn save(&self, _: &str, _: &[u8]) -> Result<PathBuf, PdfProcError> {
                panic!("must not be called");
            }
        }
        let m = selected();
        assert!(matches!(
            m.download(&Never),
            Err(PdfProcError::InvalidTransition { event: "download", .. })
        ));
    }
}
