//! Save-to-disk targets for the processed file.
//!
//! [`DirectorySaver`] uses an atomic write (temp file in the destination
//! directory, then rename) so a crash never leaves a half-written PDF under
//! the final name.

use crate::error::PdfProcError;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

/// Where a download ends up.
pub trait SaveTarget {
    /// Persist `bytes` under `name` and return the final location.
    fn save(&self, name: &str, bytes: &[u8]) -> Result<PathBuf, PdfProcError>;
}

/// Saves into a fixed directory, creating it on first use.
#[derive(Debug, Clone)]
pub struct DirectorySaver {
    dir: PathBuf,
}

impl DirectorySaver {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl SaveTarget for DirectorySaver {
    fn save(&self, name: &str, bytes: &[u8]) -> Result<PathBuf, PdfProcError> {
        let path = self.dir.join(safe_file_name(name));
        let fail = |source: std::io::Error| PdfProcError::SaveFailed {
            path: path.clone(),
            source,
        };

        std::fs::create_dir_all(&self.dir).map_err(fail)?;

        let mut tmp = tempfile::NamedTempFile::new_in(&self.dir).map_err(fail)?;
        tmp.write_all(bytes).map_err(fail)?;
        tmp.flush().map_err(fail)?;
        tmp.persist(&path).map_err(|e| fail(e.error))?;

        info!("Saved {} ({} bytes)", path.display(), bytes.len());
        Ok(path)
    }
}

/// Final path component of `name`, or `"download.pdf"` if there is none.
fn safe_file_name(name: &str) -> String {
    Path::new(name)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| "download.pdf".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn saves_into_directory() {
        let dir = tempfile::tempdir().unwrap();
        let saver = DirectorySaver::new(dir.path().join("out"));
        let path = saver.save("processed_a.pdf", b"%PDF-data").unwrap();
        assert_eq!(path, dir.path().join("out").join("processed_a.pdf"));
        assert_eq!(std::fs::read(&path).unwrap(), b"%PDF-data");
    }

    #[test]
    fn overwrites_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let saver = DirectorySaver::new(dir.path());
        saver.save("x.pdf", b"old").unwrap();
        let path = saver.save("x.pdf", b"new").unwrap();
        assert_eq!(std::fs::read(path).unwrap(), b"new");
    }

    #[test]
    fn strips_directory_components() {
        assert_eq!(safe_file_name("../../etc/passwd"), "passwd");
        assert_eq!(safe_file_name("processed_a.pdf"), "processed_a.pdf");
        assert_eq!(safe_file_name(".."), "download.pdf");
        assert_eq!(safe_file_name(""), "download.pdf");
    }
}
