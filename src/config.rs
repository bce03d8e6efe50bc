//! Configuration for talking to the remote PDF processor.
//!
//! Every knob lives in [`ProcessorConfig`], built via its
//! [`ProcessorConfigBuilder`]. Defaults match the service's documented
//! contract, so `ProcessorConfig::default()` is enough for a local setup.

use crate::error::{PdfProcError, FALLBACK_MESSAGE};
use serde::{Deserialize, Serialize};

/// Default processing endpoint.
pub const DEFAULT_ENDPOINT: &str = "http://localhost:3000/process-pdf";

/// Documented upload limit. Advisory only: larger files are still sent.
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 50 * 1024 * 1024;

/// Configuration for a [`crate::remote::HttpProcessor`].
///
/// # Example
/// ```rust
/// use pdfproc::ProcessorConfig;
///
/// let config = ProcessorConfig::builder()
///     .endpoint("http://127.0.0.1:8080/process-pdf")
///     .timeout_secs(30)
///     .build()
///     .unwrap();
/// assert_eq!(config.form_field, "pdf");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessorConfig {
    /// URL that receives the multipart `POST`. Default: [`DEFAULT_ENDPOINT`].
    pub endpoint: String,

    /// Name of the multipart part carrying the file. Default: `"pdf"`.
    pub form_field: String,

    /// Message shown when the service gives no usable `error` field.
    pub fallback_message: String,

    /// Advisory size limit in bytes. Default: 50 MB.
    ///
    /// Files above the limit are logged with `warn!` and uploaded anyway; the
    /// service is the authority on what it accepts.
    pub max_upload_bytes: u64,

    /// Whole-request timeout in seconds. Default: `None` (wait indefinitely).
    pub timeout_secs: Option<u64>,

    /// Prefix prepended to the original file name for the processed file.
    pub output_prefix: String,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            form_field: "pdf".to_string(),
            fallback_message: FALLBACK_MESSAGE.to_string(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            timeout_secs: None,
            output_prefix: "processed_".to_string(),
        }
    }
}

impl ProcessorConfig {
    /// Create a new builder for `ProcessorConfig`.
    pub fn builder() -> ProcessorConfigBuilder {
        ProcessorConfigBuilder {
            config: Self::default(),
        }
    }

    /// Display name of the processed artifact for `original`.
    pub fn processed_name(&self, original: &str) -> String {
        format!("{}{}", self.output_prefix, original)
    }
}

/// Builder for [`ProcessorConfig`].
#[derive(Debug)]
pub struct ProcessorConfigBuilder {
    config: ProcessorConfig,
}

impl ProcessorConfigBuilder {
    pub fn endpoint(mut self, url: impl Into<String>) -> Self {
        self.config.endpoint = url.into();
        self
    }

    pub fn form_field(mut self, name: impl Into<String>) -> Self {
        self.config.form_field = name.into();
        self
    }

    pub fn fallback_message(mut self, msg: impl Into<String>) -> Self {
        self.config.fallback_message = msg.into();
        self
    }

    pub fn max_upload_bytes(mut self, n: u64) -> Self {
        self.config.max_upload_bytes = n;
        self
    }

    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.config.timeout_secs = Some(secs);
        self
    }

    pub fn output_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config.output_prefix = prefix.into();
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ProcessorConfig, PdfProcError> {
        let c = &self.config;
        if !(c.endpoint.starts_with("http://") || c.endpoint.starts_with("https://")) {
            return Err(PdfProcError::InvalidConfig(format!(
                "endpoint must be an HTTP/HTTPS URL, got '{}'",
                c.endpoint
            )));
        }
        if c.form_field.trim().is_empty() {
            return Err(PdfProcError::InvalidConfig(
                "form field name must not be empty".into(),
            ));
        }
        if c.fallback_message.trim().is_empty() {
            return Err(PdfProcError::InvalidConfig(
                "fallback message must not be empty".into(),
            ));
        }
        if c.timeout_secs == Some(0) {
            return Err(PdfProcError::InvalidConfig(
                "timeout must be ≥ 1 second".into(),
            ));
        }
        Ok(self.config)
    }
}
