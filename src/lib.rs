//! # pdfproc
//!
//! Client for a PDF processing service: pick a PDF, upload it, download the
//! processed result.
//!
//! ## Lifecycle
//!
//! ```text
//! Idle ──pick/drop PDF──▶ FileSelected ──process──▶ Processing ──ok──▶ Complete
//!                          │     ▲                      │               │
//!                    cancel│     └──── error message ───┘          reset│
//!                          ▼                                            ▼
//!                         Idle ◀────────────────────────────────────── Idle
//! ```
//!
//! `download` saves the processed file and leaves the session in `Complete`.
//!
//! The [`UploadStateMachine`] owns all session state. The processed file is
//! held in memory behind an [`ObjectUrl`] handle and released on reset or
//! when the machine is dropped.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pdfproc::{
//!     BlobRegistry, DirectorySaver, HttpProcessor, ProcessorConfig, SelectedFile,
//!     UploadStateMachine,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ProcessorConfig::default();
//!     let processor = HttpProcessor::new(config.clone())?;
//!
//!     let mut machine = UploadStateMachine::new(BlobRegistry::new()).with_config(&config);
//!     machine.pick_file(SelectedFile::from_path("report.pdf").await?);
//!     machine.process(&processor).await?;
//!     let saved = machine.download(&DirectorySaver::new("."))?;
//!     println!("saved to {}", saved.display());
//!     machine.reset();
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pdfproc` binary (clap + anyhow + tracing-subscriber + indicatif) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod blob;
pub mod config;
pub mod error;
pub mod file;
pub mod machine;
pub mod progress;
pub mod remote;
pub mod save;
pub mod session;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use blob::{BlobRegistry, ObjectUrl};
pub use config::{ProcessorConfig, ProcessorConfigBuilder};
pub use error::{PdfProcError, ProcessingFailed};
pub use file::SelectedFile;
pub use machine::{LifecycleState, ProcessedArtifact, Selection, UploadStateMachine};
pub use progress::{LifecycleCallback, NoopLifecycleCallback, SharedCallback};
pub use remote::{HttpProcessor, RemoteProcessor};
pub use save::{DirectorySaver, SaveTarget};
pub use session::{process_file, run_session, SessionOutcome, SessionSummary};
