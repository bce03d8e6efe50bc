//! The user-chosen input file.
//!
//! A [`SelectedFile`] is what a drop zone or file picker hands over: the
//! bytes, a name, a size and a *declared* media type. The declared type is
//! what the selection guard checks. It is not sniffed from content, matching
//! how a browser fills in `File.type` from the extension alone.

use crate::error::PdfProcError;
use bytes::Bytes;
use mime::Mime;
use std::path::Path;
use tracing::{debug, warn};

/// A file picked or dropped by the user.
#[derive(Debug, Clone)]
pub struct SelectedFile {
    content: Bytes,
    name: String,
    media_type: Mime,
}

impl SelectedFile {
    /// Wrap in-memory content.
    pub fn new(name: impl Into<String>, media_type: Mime, content: impl Into<Bytes>) -> Self {
        Self {
            content: content.into(),
            name: name.into(),
            media_type,
        }
    }

    /// Read a file from disk, declaring its media type from the extension.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self, PdfProcError> {
        let path = path.as_ref();
        let content = tokio::fs::read(path).await.map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => PdfProcError::FileNotFound {
                path: path.to_path_buf(),
            },
            std::io::ErrorKind::PermissionDenied => PdfProcError::PermissionDenied {
                path: path.to_path_buf(),
            },
            _ => PdfProcError::ReadFailed {
                path: path.to_path_buf(),
                source: e,
            },
        })?;

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let media_type = media_type_for(path);

        if is_pdf_type(&media_type) && !content.starts_with(b"%PDF") {
            // Declared type wins; the service decides what to do with it.
            warn!("'{}' is named like a PDF but lacks the %PDF header", name);
        }

        debug!(
            "Read {} ({} bytes, {})",
            path.display(),
            content.len(),
            media_type
        );
        Ok(Self::new(name, media_type, content))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Size in bytes.
    pub fn size(&self) -> u64 {
        self.content.len() as u64
    }

    pub fn media_type(&self) -> &Mime {
        &self.media_type
    }

    /// Cheap clone of the content handle.
    pub fn content(&self) -> Bytes {
        self.content.clone()
    }

    /// `true` when the declared type is exactly `application/pdf`.
    ///
    /// Parameters (`application/pdf; charset=...`) do not match.
    pub fn is_pdf(&self) -> bool {
        is_pdf_type(&self.media_type)
    }
}

fn is_pdf_type(m: &Mime) -> bool {
    m.essence_str() == mime::APPLICATION_PDF.essence_str() && m.params().next().is_none()
}

/// Declared media type for `path`, by extension only.
pub fn media_type_for(path: &Path) -> Mime {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .as_deref()
    {
        Some("pdf") => mime::APPLICATION_PDF,
        Some("txt") => mime::TEXT_PLAIN,
        Some("json") => mime::APPLICATION_JSON,
        Some("png") => mime::IMAGE_PNG,
        Some("jpg") | Some("jpeg") => mime::IMAGE_JPEG,
        _ => mime::APPLICATION_OCTET_STREAM,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn media_type_by_extension() {
        assert_eq!(media_type_for(Path::new("a.pdf")), mime::APPLICATION_PDF);
        assert_eq!(media_type_for(Path::new("A.PDF")), mime::APPLICATION_PDF);
        assert_eq!(media_type_for(Path::new("notes.txt")), mime::TEXT_PLAIN);
        assert_eq!(
            media_type_for(Path::new("noext")),
            mime::APPLICATION_OCTET_STREAM
        );
    }

    #[test]
    fn is_pdf_requires_exact_type() {
        let f = SelectedFile::new("a.pdf", mime::APPLICATION_PDF, &b"%PDF"[..]);
        assert!(f.is_pdf());

        let with_param: Mime = "application/pdf; version=1.7".parse().unwrap();
        let f = SelectedFile::new("a.pdf", with_param, &b"%PDF"[..]);
        assert!(!f.is_pdf());

        let f = SelectedFile::new("a.txt", mime::TEXT_PLAIN, &b"hi"[..]);
        assert!(!f.is_pdf());
    }

    #[tokio::test]
    async fn from_path_reads_name_size_and_type() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.pdf");
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(b"%PDF-1.7 body").unwrap();

        let sel = SelectedFile::from_path(&path).await.unwrap();
        assert_eq!(sel.name(), "report.pdf");
        assert_eq!(sel.size(), 13);
        assert!(sel.is_pdf());
        assert_eq!(sel.content(), &b"%PDF-1.7 body"[..]);
    }

    #[tokio::test]
    async fn from_path_missing_file() {
        let err = SelectedFile::from_path("/definitely/not/here.pdf")
            .await
            .unwrap_err();
        assert!(matches!(err, PdfProcError::FileNotFound { .. }));
    }
}
