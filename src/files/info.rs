use async_trait::async_trait;
use futures::future::join_all;
use std::error::Error;
use std::fmt;
use std::io::ErrorKind;
use tracing::{debug, warn};

use crate::files::{classify, display_name, locator_to_path, MediaKind};

const FILES_LOG_TARGET: &str = "r_vidplay::files";

/// Metadata the host reports for a picked file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileInfo {
    pub locator: String,
    pub name: String,
    pub size: u64,
}

/// Failure of a host collaborator (file metadata, sidecar lookup).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CollaboratorError {
    NotFound(String),
    PermissionDenied(String),
    Io(String),
    Unsupported(String),
}

impl fmt::Display for CollaboratorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CollaboratorError::NotFound(what) => write!(f, "Not found: {}", what),
            CollaboratorError::PermissionDenied(what) => write!(f, "Permission denied: {}", what),
            CollaboratorError::Io(e) => write!(f, "I/O error: {}", e),
            CollaboratorError::Unsupported(what) => write!(f, "Unsupported locator: {}", what),
        }
    }
}

impl Error for CollaboratorError {}

impl CollaboratorError {
    pub fn from_io(context: &str, err: std::io::Error) -> Self {
        match err.kind() {
            ErrorKind::NotFound => CollaboratorError::NotFound(context.to_string()),
            ErrorKind::PermissionDenied => CollaboratorError::PermissionDenied(context.to_string()),
            _ => CollaboratorError::Io(format!("{}: {}", context, err)),
        }
    }
}

/// Source of `{size, name}` metadata for file locators.
#[async_trait]
pub trait FileInfoSource: Send + Sync {
    async fn file_info(&self, locator: &str) -> Result<FileInfo, CollaboratorError>;
}

/// [`FileInfoSource`] backed by the local file system.
#[derive(Debug, Clone, Default)]
pub struct FsFileInfoSource;

#[async_trait]
impl FileInfoSource for FsFileInfoSource {
    async fn file_info(&self, locator: &str) -> Result<FileInfo, CollaboratorError> {
        let path = locator_to_path(locator).ok_or_else(|| CollaboratorError::Unsupported(locator.to_string()))?;
        let metadata = tokio::fs::metadata(&path)
            .await
            .map_err(|e| CollaboratorError::from_io(locator, e))?;
        if !metadata.is_file() {
            return Err(CollaboratorError::NotFound(locator.to_string()));
        }
        Ok(FileInfo {
            locator: locator.to_string(),
            name: display_name(locator),
            size: metadata.len(),
        })
    }
}

/// A batch of picked files sorted by kind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    pub videos: Vec<FileInfo>,
    pub subtitles: Vec<FileInfo>,
    /// Locators that could not be inspected or have an unsupported extension,
    /// with the reason.
    pub rejected: Vec<(String, String)>,
}

/// Fetches metadata for every locator concurrently and sorts the results.
///
/// Input order is preserved within each list.
pub async fn inspect_selection(source: &dyn FileInfoSource, locators: &[String]) -> Selection {
    let results = join_all(locators.iter().map(|locator| source.file_info(locator))).await;
    let mut selection = Selection::default();
    for (locator, result) in locators.iter().zip(results) {
        match result {
            Ok(info) => match classify(&info.name) {
                MediaKind::Video => selection.videos.push(info),
                MediaKind::Subtitle => selection.subtitles.push(info),
                MediaKind::Other => {
                    debug!(target: FILES_LOG_TARGET, "Skipping {}: unsupported file type", info.name);
                    selection.rejected.push((locator.clone(), "unsupported file type".to_string()));
                }
            },
            Err(e) => {
                warn!(target: FILES_LOG_TARGET, "Could not read {}: {}", locator, e);
                selection.rejected.push((locator.clone(), e.to_string()));
            }
        }
    }
    selection
}
