//! Local file collaborators: media classification, locators and file metadata

mod info;

pub use info::{inspect_selection, CollaboratorError, FileInfo, FileInfoSource, FsFileInfoSource, Selection};

use std::path::{Path, PathBuf};
use url::Url;

/// Extensions accepted by the video file filter.
pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "webm", "ogg", "mkv", "avi", "mov", "flv", "3gp"];
/// Extensions recognised as subtitle files.
pub const SUBTITLE_EXTENSIONS: &[&str] = &["vtt", "srt", "ass", "ssa"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Video,
    Subtitle,
    Other,
}

fn extension_of(name: &str) -> Option<String> {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_lowercase)
}

/// Classifies a file name or locator by its extension.
pub fn classify(name: &str) -> MediaKind {
    match extension_of(name) {
        Some(ext) if VIDEO_EXTENSIONS.contains(&ext.as_str()) => MediaKind::Video,
        Some(ext) if SUBTITLE_EXTENSIONS.contains(&ext.as_str()) => MediaKind::Subtitle,
        _ => MediaKind::Other,
    }
}

pub fn is_subtitle_file(name: &str) -> bool {
    classify(name) == MediaKind::Subtitle
}

/// File name without its last extension: `movie.en.srt` gives `movie.en`.
pub fn base_name(name: &str) -> String {
    Path::new(name)
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| name.to_string())
}

/// Turns a path into a `file://` locator. Relative paths are resolved against
/// the working directory.
pub fn to_locator(path: &Path) -> String {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir().map(|cwd| cwd.join(path)).unwrap_or_else(|_| path.to_path_buf())
    };
    Url::from_file_path(&absolute)
        .map(|url| url.to_string())
        .unwrap_or_else(|_| absolute.to_string_lossy().into_owned())
}

/// Accepts either a URL or a plain path and returns a locator.
pub fn normalize_locator(input: &str) -> String {
    match Url::parse(input) {
        // Single-letter schemes are Windows drive letters.
        Ok(url) if url.scheme().len() > 1 => url.to_string(),
        _ => to_locator(Path::new(input)),
    }
}

/// Local path behind a locator, if it refers to one.
pub fn locator_to_path(locator: &str) -> Option<PathBuf> {
    match Url::parse(locator) {
        Ok(url) if url.scheme() == "file" => url.to_file_path().ok(),
        Ok(url) if url.scheme().len() > 1 => None,
        _ => Some(PathBuf::from(locator)),
    }
}

/// Human readable name for a locator: the decoded last path segment.
pub fn display_name(locator: &str) -> String {
    if let Some(name) = locator_to_path(locator).and_then(|path| path.file_name().map(|n| n.to_string_lossy().into_owned())) {
        return name;
    }
    locator
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or(locator)
        .to_string()
}
