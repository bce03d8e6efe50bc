//! The remote processor seam and its HTTP implementation.
//!
//! The state machine only knows [`RemoteProcessor`]: hand over a file, get
//! bytes back or a [`ProcessingFailed`]. [`HttpProcessor`] implements the
//! service contract:
//!
//! ```text
//! POST <endpoint>                 multipart/form-data, one part `pdf`
//!   200..=299  → body is the processed PDF (opaque bytes)
//!   otherwise  → {"error": "..."} if present, else the fallback message
//! ```
//!
//! There is no retry and no cancellation. One call, one outcome.

use crate::config::ProcessorConfig;
use crate::error::{PdfProcError, ProcessingFailed};
use crate::file::SelectedFile;
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Anything that can turn an input PDF into a processed one.
#[async_trait]
pub trait RemoteProcessor: Send + Sync {
    async fn process(&self, file: &SelectedFile) -> Result<Bytes, ProcessingFailed>;
}

/// Shape of a failure body. Unknown fields are ignored.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

/// [`RemoteProcessor`] over HTTP multipart.
#[derive(Debug, Clone)]
pub struct HttpProcessor {
    client: reqwest::Client,
    config: ProcessorConfig,
}

impl HttpProcessor {
    pub fn new(config: ProcessorConfig) -> Result<Self, PdfProcError> {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder
            .build()
            .map_err(|e| PdfProcError::InvalidConfig(format!("HTTP client: {e}")))?;
        Ok(Self { client, config })
    }

    /// Use an existing client (shared connection pool, custom TLS, …).
    pub fn with_client(client: reqwest::Client, config: ProcessorConfig) -> Self {
        Self { client, config }
    }

    pub fn config(&self) -> &ProcessorConfig {
        &self.config
    }

    fn build_form(&self, file: &SelectedFile) -> Result<Form, ProcessingFailed> {
        let part = Part::bytes(file.content().to_vec())
            .file_name(file.name().to_string())
            .mime_str(file.media_type().as_ref())
            .map_err(|e| {
                warn!("Invalid media type for '{}': {}", file.name(), e);
                self.failure(None)
            })?;
        Ok(Form::new().part(self.config.form_field.clone(), part))
    }

    fn failure(&self, message: Option<String>) -> ProcessingFailed {
        ProcessingFailed::with_fallback(message, &self.config.fallback_message)
    }
}

#[async_trait]
impl RemoteProcessor for HttpProcessor {
    async fn process(&self, file: &SelectedFile) -> Result<Bytes, ProcessingFailed> {
        if file.size() > self.config.max_upload_bytes {
            warn!(
                "'{}' is {} bytes, above the documented {} byte limit; sending anyway",
                file.name(),
                file.size(),
                self.config.max_upload_bytes
            );
        }

        info!("Uploading {} to {}", file.name(), self.config.endpoint);
        let form = self.build_form(file)?;

        let response = self
            .client
            .post(&self.config.endpoint)
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                warn!("Request to {} failed: {}", self.config.endpoint, e);
                self.failure(None)
            })?;

        let status = response.status();
        let body = response.bytes().await.map_err(|e| {
            warn!("Reading response body failed: {}", e);
            self.failure(None)
        })?;

        if !status.is_success() {
            let message = error_message(&body);
            warn!("Processor answered HTTP {}: {:?}", status, message);
            return Err(self.failure(message));
        }

        debug!("Processor returned {} bytes", body.len());
        Ok(body)
    }
}

/// The `error` string of a JSON failure body, if there is one.
pub fn error_message(body: &[u8]) -> Option<String> {
    serde_json::from_slice::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.error)
}
