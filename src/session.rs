//! One-shot entry point: select, process and download in a single call.
//!
//! [`process_file`] runs a whole session through an [`UploadStateMachine`]
//! for callers that have a path instead of a UI: the CLI, scripts, batch
//! jobs. Interactive hosts drive the state machine event by event instead.

use crate::blob::BlobRegistry;
use crate::config::ProcessorConfig;
use crate::error::PdfProcError;
use crate::file::SelectedFile;
use crate::machine::{Selection, UploadStateMachine};
use crate::progress::SharedCallback;
use crate::remote::{HttpProcessor, RemoteProcessor};
use crate::save::{DirectorySaver, SaveTarget};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::info;

/// What a completed session produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSummary {
    /// Name of the uploaded file.
    pub input_name: String,
    /// Bytes uploaded.
    pub input_bytes: u64,
    /// Display name of the processed file.
    pub output_name: String,
    /// Bytes received.
    pub output_bytes: u64,
    /// Where the processed file was saved.
    pub output_path: PathBuf,
    /// Wall-clock time of the remote call plus save.
    pub duration_ms: u64,
}

/// Outcome of [`process_file`].
#[derive(Debug)]
pub enum SessionOutcome {
    /// The file was processed and saved.
    Saved(SessionSummary),
    /// The input's declared type is not PDF; nothing was sent.
    Ignored { name: String, media_type: String },
}

/// Upload `input` to the configured endpoint and save the result into
/// `output_dir`.
pub async fn process_file(
    input: impl AsRef<Path>,
    output_dir: impl AsRef<Path>,
    config: &ProcessorConfig,
    callback: Option<SharedCallback>,
) -> Result<SessionOutcome, PdfProcError> {
    let processor = HttpProcessor::new(config.clone())?;
    let saver = DirectorySaver::new(output_dir.as_ref());
    run_session(input, &processor, &saver, config, callback).await
}

/// [`process_file`] with injectable processor and save target.
pub async fn run_session(
    input: impl AsRef<Path>,
    processor: &dyn RemoteProcessor,
    target: &dyn SaveTarget,
    config: &ProcessorConfig,
    callback: Option<SharedCallback>,
) -> Result<SessionOutcome, PdfProcError> {
    let file = SelectedFile::from_path(input).await?;
    let input_name = file.name().to_string();
    let input_bytes = file.size();
    let media_type = file.media_type().to_string();

    let mut machine = UploadStateMachine::new(BlobRegistry::new()).with_config(config);
    if let Some(cb) = callback {
        machine = machine.with_callback(cb);
    }

    if machine.pick_file(file) == Selection::Ignored {
        return Ok(SessionOutcome::Ignored {
            name: input_name,
            media_type,
        });
    }

    let start = Instant::now();
    machine.process(processor).await?;
    let output_path = machine.download(target)?;

    let (output_name, output_bytes) = machine
        .artifact()
        .map(|a| {
            (
                a.name().to_string(),
                a.url().bytes().map(|b| b.len() as u64).unwrap_or(0),
            )
        })
        .unwrap_or_default();

    let summary = SessionSummary {
        input_name,
        input_bytes,
        output_name,
        output_bytes,
        output_path,
        duration_ms: start.elapsed().as_millis() as u64,
    };
    info!(
        "Session complete: {} → {} in {}ms",
        summary.input_name,
        summary.output_path.display(),
        summary.duration_ms
    );

    machine.reset();
    Ok(SessionOutcome::Saved(summary))
}
