use std::path::{Path, PathBuf};

use scriptview_core::LoadError;

/// Where a delivered file's bytes come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    Path(PathBuf),
    Bytes(Vec<u8>),
}

/// One file handed over by the delivery mechanism.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawInput {
    pub name: String,
    pub content_type: Option<String>,
    pub source: InputSource,
}

impl RawInput {
    /// A file on disk, displayed under its file name.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = display_name(&path);
        Self {
            name,
            content_type: None,
            source: InputSource::Path(path),
        }
    }

    pub fn from_bytes(name: impl Into<String>, content_type: Option<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            content_type,
            source: InputSource::Bytes(bytes),
        }
    }

    /// Read the whole input as UTF-8 text, dropping a leading byte-order mark.
    /// Invalid sequences decode to U+FFFD; only I/O errors fail.
    pub fn read_text(&self) -> Result<String, LoadError> {
        let bytes = match &self.source {
            InputSource::Path(path) => std::fs::read(path)?,
            InputSource::Bytes(bytes) => bytes.clone(),
        };
        let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(&bytes[..]);
        Ok(String::from_utf8_lossy(bytes).into_owned())
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
