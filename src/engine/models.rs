//! Snapshot and notification types exchanged with the media engine

use std::fmt;

/// Identifies a single load request. A new value is issued for every `select`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct LoadGeneration(pub u64);

impl LoadGeneration {
    /// Returns the generation that follows this one.
    pub fn next(self) -> Self {
        LoadGeneration(self.0 + 1)
    }
}

impl fmt::Display for LoadGeneration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Kind of a text track as reported by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextTrackKind {
    Subtitles,
    Captions,
    Descriptions,
    Chapters,
    Metadata,
}

impl TextTrackKind {
    /// Subtitles and captions are the kinds a user can pick from the subtitle menu.
    pub fn is_subtitle_like(self) -> bool {
        matches!(self, TextTrackKind::Subtitles | TextTrackKind::Captions)
    }
}

/// Rendering mode of a text track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextTrackMode {
    #[default]
    Disabled,
    Hidden,
    Showing,
}

/// A native audio track at the time the snapshot was taken.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NativeAudioTrack {
    pub label: Option<String>,
    pub language: Option<String>,
    pub enabled: bool,
}

/// A native text track at the time the snapshot was taken.
#[derive(Debug, Clone, PartialEq)]
pub struct NativeTextTrack {
    pub kind: TextTrackKind,
    pub label: Option<String>,
    pub language: Option<String>,
    pub mode: TextTrackMode,
}

impl NativeTextTrack {
    pub fn subtitles(label: &str) -> Self {
        NativeTextTrack {
            kind: TextTrackKind::Subtitles,
            label: Some(label.to_string()),
            language: None,
            mode: TextTrackMode::Disabled,
        }
    }
}

/// Immutable copy of the engine's track metadata.
///
/// Engine track handles are live objects owned by the engine; the rest of the
/// crate only ever sees these copies and addresses tracks by index.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EngineSnapshot {
    pub duration: Option<f64>,
    pub audio_tracks: Vec<NativeAudioTrack>,
    pub text_tracks: Vec<NativeTextTrack>,
}

/// Events raised by the engine while a media item is loaded.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    MetadataReady,
    TimeUpdate(f64),
    Ended,
    Waiting,
    CanPlay,
    Error(String),
}

/// An engine event tagged with the load it belongs to.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineNotification {
    pub generation: LoadGeneration,
    pub event: EngineEvent,
}
