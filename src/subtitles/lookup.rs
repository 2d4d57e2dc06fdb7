use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

use crate::files::{is_subtitle_file, to_locator, CollaboratorError};

const LOOKUP_LOG_TARGET: &str = "r_vidplay::subtitles::lookup";

/// A subtitle file ready to be registered with the track registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubtitleCandidate {
    pub locator: String,
    pub label: String,
}

/// Finds subtitle files that belong to a video.
#[async_trait]
pub trait SidecarLookup: Send + Sync {
    /// Subtitle files matching `base`, searched in `video_dir` (when the video
    /// is a local file) and any directories the implementation knows about.
    async fn find(&self, video_dir: Option<&Path>, base: &str) -> Result<Vec<SubtitleCandidate>, CollaboratorError>;
}

/// True when `file_name` is a subtitle whose stem is `base` or starts with
/// `"{base}."` (`movie.srt`, `movie.en.srt`).
pub fn matches_base_name(file_name: &str, base: &str) -> bool {
    if base.is_empty() || !is_subtitle_file(file_name) {
        return false;
    }
    let stem = crate::files::base_name(file_name);
    stem == base || stem.strip_prefix(base).is_some_and(|rest| rest.starts_with('.'))
}

/// [`SidecarLookup`] that scans directories on the local file system.
#[derive(Debug, Clone, Default)]
pub struct FsSidecarLookup {
    extra_dirs: Vec<PathBuf>,
}

impl FsSidecarLookup {
    pub fn new(extra_dirs: Vec<PathBuf>) -> Self {
        FsSidecarLookup { extra_dirs }
    }

    async fn scan(dir: &Path, base: &str, found: &mut Vec<SubtitleCandidate>) -> Result<(), CollaboratorError> {
        let context = dir.display().to_string();
        let mut entries = tokio::fs::read_dir(dir)
            .await
            .map_err(|e| CollaboratorError::from_io(&context, e))?;
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| CollaboratorError::from_io(&context, e))?
        {
            let name = entry.file_name().to_string_lossy().into_owned();
            if !matches_base_name(&name, base) {
                continue;
            }
            let is_file = entry.file_type().await.map(|t| t.is_file()).unwrap_or(false);
            if !is_file {
                continue;
            }
            let locator = to_locator(&entry.path());
            if found.iter().any(|c| c.locator == locator) {
                continue;
            }
            trace!(target: LOOKUP_LOG_TARGET, "Sidecar match {}", name);
            found.push(SubtitleCandidate { locator, label: name });
        }
        Ok(())
    }
}

#[async_trait]
impl SidecarLookup for FsSidecarLookup {
    async fn find(&self, video_dir: Option<&Path>, base: &str) -> Result<Vec<SubtitleCandidate>, CollaboratorError> {
        let mut found = Vec::new();
        if let Some(dir) = video_dir {
            Self::scan(dir, base, &mut found).await?;
        }
        for dir in &self.extra_dirs {
            if let Err(e) = Self::scan(dir, base, &mut found).await {
                debug!(target: LOOKUP_LOG_TARGET, "Skipping subtitle directory {}: {}", dir.display(), e);
            }
        }
        found.sort_by(|a, b| a.label.cmp(&b.label));
        Ok(found)
    }
}
