use futures::future::join_all;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::files::{base_name, display_name, is_subtitle_file, locator_to_path, FileInfoSource};
use crate::playlist::MediaItem;
use crate::subtitles::lookup::{SidecarLookup, SubtitleCandidate};

const SUBTITLES_LOG_TARGET: &str = "r_vidplay::subtitles";

/// Outcome of ingesting subtitle files picked by the user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubtitleIngest {
    pub accepted: Vec<SubtitleCandidate>,
    /// Locators that were dropped, with the reason.
    pub rejected: Vec<(String, String)>,
}

/// Turns sidecar files and user-picked files into subtitle candidates.
///
/// Collaborator failures never escape: they are logged and the affected file
/// is left out.
#[derive(Clone)]
pub struct SubtitleResolver {
    lookup: Arc<dyn SidecarLookup>,
    file_info: Arc<dyn FileInfoSource>,
}

impl SubtitleResolver {
    pub fn new(lookup: Arc<dyn SidecarLookup>, file_info: Arc<dyn FileInfoSource>) -> Self {
        SubtitleResolver { lookup, file_info }
    }

    /// Subtitle files sharing the base name of `item`.
    pub async fn find_sidecar_subtitles(&self, item: &MediaItem) -> Vec<SubtitleCandidate> {
        let base = base_name(&item.display_name);
        let video_dir = locator_to_path(&item.locator).and_then(|path| path.parent().map(|p| p.to_path_buf()));
        debug!(target: SUBTITLES_LOG_TARGET, "Checking for subtitles matching: {}", base);
        match self.lookup.find(video_dir.as_deref(), &base).await {
            Ok(candidates) => {
                if !candidates.is_empty() {
                    info!(target: SUBTITLES_LOG_TARGET, "Found {} matching subtitle files for {}", candidates.len(), item.display_name);
                }
                candidates
            }
            Err(e) => {
                warn!(target: SUBTITLES_LOG_TARGET, "Sidecar lookup for {} failed: {}", item.display_name, e);
                Vec::new()
            }
        }
    }

    /// Validates each picked subtitle file independently.
    pub async fn ingest_user_supplied_subtitles(&self, locators: &[String]) -> SubtitleIngest {
        let mut ingest = SubtitleIngest::default();
        let mut supported = Vec::new();
        for locator in locators {
            if is_subtitle_file(&display_name(locator)) {
                supported.push(locator);
            } else {
                ingest.rejected.push((locator.clone(), "unsupported subtitle format".to_string()));
            }
        }

        let results = join_all(supported.iter().map(|locator| self.file_info.file_info(locator))).await;
        for (locator, result) in supported.into_iter().zip(results) {
            match result {
                Ok(info) => ingest.accepted.push(SubtitleCandidate {
                    locator: info.locator,
                    label: info.name,
                }),
                Err(e) => {
                    warn!(target: SUBTITLES_LOG_TARGET, "Dropping subtitle {}: {}", locator, e);
                    ingest.rejected.push((locator.clone(), e.to_string()));
                }
            }
        }
        debug!(target: SUBTITLES_LOG_TARGET, "Processed {} subtitle files, {} accepted", locators.len(), ingest.accepted.len());
        ingest
    }
}
