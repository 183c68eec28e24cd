//! File input abstraction and upload limits.
//!
//! The provider upload is a single in-memory request, so every input is
//! materialized as bytes before submission. [`UploadLimits`] is checked
//! first so an oversized file never reaches the provider.

use crate::core::error::ScanError;

use std::path::{Path, PathBuf};

/// A file to scan, either in memory or on disk.
///
/// # Examples
///
/// ```rust
/// use scanlens::core::FileInput;
///
/// let input = FileInput::from_bytes(b"MZ".to_vec()).with_filename("setup.exe");
/// assert_eq!(input.filename(), Some("setup.exe"));
/// assert_eq!(input.size_hint(), Some(2));
/// ```
#[derive(Clone)]
pub enum FileInput {
    /// A file path on disk.
    Path(PathBuf),

    /// In-memory bytes with optional filename.
    Bytes {
        /// The file data.
        data: Vec<u8>,
        /// Optional original filename.
        filename: Option<String>,
    },
}

impl std::fmt::Debug for FileInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Path(path) => f.debug_tuple("Path").field(path).finish(),
            Self::Bytes { data, filename } => f
                .debug_struct("Bytes")
                .field("data_len", &data.len())
                .field("filename", filename)
                .finish(),
        }
    }
}

impl FileInput {
    /// Creates a `FileInput` from a file path.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self::Path(path.into())
    }

    /// Creates a `FileInput` from bytes.
    pub fn from_bytes(data: impl Into<Vec<u8>>) -> Self {
        Self::Bytes {
            data: data.into(),
            filename: None,
        }
    }

    /// Sets the filename for bytes inputs.
    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        if let Self::Bytes { filename: f, .. } = &mut self {
            *f = Some(filename.into());
        }
        self
    }

    /// Returns the filename, if known.
    pub fn filename(&self) -> Option<&str> {
        match self {
            Self::Path(path) => path.file_name().and_then(|n| n.to_str()),
            Self::Bytes { filename, .. } => filename.as_deref(),
        }
    }

    /// Returns the size in bytes, if known without touching the filesystem.
    pub fn size_hint(&self) -> Option<u64> {
        match self {
            Self::Path(_) => None,
            Self::Bytes { data, .. } => Some(data.len() as u64),
        }
    }

    /// Reads the whole input into memory.
    ///
    /// For paths, the file's metadata is checked against `max_size`
    /// before reading so oversized files are never loaded.
    pub async fn read_to_vec(self, max_size: u64) -> Result<Vec<u8>, ScanError> {
        match self {
            Self::Path(path) => {
                let size = tokio::fs::metadata(&path).await?.len();
                check_size(size, max_size)?;
                Ok(tokio::fs::read(&path).await?)
            }
            Self::Bytes { data, .. } => {
                check_size(data.len() as u64, max_size)?;
                Ok(data)
            }
        }
    }
}

fn check_size(size: u64, max: u64) -> Result<(), ScanError> {
    if size > max {
        return Err(ScanError::FileTooLarge { size, max });
    }
    Ok(())
}

/// Default maximum upload size (32 MiB, the provider's free-tier limit).
pub const DEFAULT_MAX_UPLOAD_SIZE: u64 = 32 * 1024 * 1024;

/// Extensions accepted by default.
pub const DEFAULT_ALLOWED_EXTENSIONS: &[&str] = &[
    "txt", "pdf", "js", "html", "css", "py", "exe", "dll", "zip",
];

/// Limits applied to an upload before it is submitted.
///
/// The extension allow-list is advisory: the content is never checked
/// against the extension, so it is not a security boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadLimits {
    /// Maximum file size in bytes.
    pub max_size: u64,

    /// Lowercase extensions without the leading dot. Empty allows everything.
    pub allowed_extensions: Vec<String>,
}

impl Default for UploadLimits {
    fn default() -> Self {
        Self {
            max_size: DEFAULT_MAX_UPLOAD_SIZE,
            allowed_extensions: DEFAULT_ALLOWED_EXTENSIONS
                .iter()
                .map(|ext| ext.to_string())
                .collect(),
        }
    }
}

impl UploadLimits {
    /// Creates limits with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Limits that only cap the size and accept any extension.
    pub fn any_extension(max_size: u64) -> Self {
        Self {
            max_size,
            allowed_extensions: Vec::new(),
        }
    }

    /// Sets the maximum size.
    pub fn with_max_size(mut self, max_size: u64) -> Self {
        self.max_size = max_size;
        self
    }

    /// Replaces the extension allow-list.
    pub fn with_allowed_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.allowed_extensions = extensions
            .into_iter()
            .map(|ext| ext.as_ref().trim().trim_start_matches('.').to_ascii_lowercase())
            .filter(|ext| !ext.is_empty())
            .collect();
        self
    }

    /// Checks a filename against the allow-list.
    pub fn check_filename(&self, filename: &str) -> Result<(), ScanError> {
        if self.allowed_extensions.is_empty() {
            return Ok(());
        }

        let extension = Path::new(filename)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .unwrap_or_default();

        if self.allowed_extensions.iter().any(|allowed| *allowed == extension) {
            Ok(())
        } else {
            Err(ScanError::DisallowedExtension { extension })
        }
    }
}
