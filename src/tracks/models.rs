//! Track descriptors and selection references

use std::fmt;
use std::str::FromStr;

/// Label given to the synthetic audio track of media that exposes none.
pub const DEFAULT_AUDIO_LABEL: &str = "Default Audio";
pub const UNKNOWN_LANGUAGE: &str = "unknown";

/// One selectable audio track.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioTrackDescriptor {
    pub engine_index: usize,
    pub label: String,
    pub language: String,
}

/// Where a subtitle track comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubtitleOrigin {
    /// Embedded in the container, addressed by the engine's text track index.
    Native(usize),
    /// Separate subtitle file.
    External(String),
}

/// One selectable subtitle track.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubtitleTrackDescriptor {
    pub origin: SubtitleOrigin,
    pub label: String,
}

/// Reference to a subtitle selection.
///
/// `Native` indexes the native subtitle list and `External` the external list.
/// Both start at zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TrackRef {
    #[default]
    Off,
    Native(usize),
    External(usize),
}

impl fmt::Display for TrackRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrackRef::Off => write!(f, "off"),
            TrackRef::Native(index) => write!(f, "{}", index),
            TrackRef::External(index) => write!(f, "ext:{}", index),
        }
    }
}

impl FromStr for TrackRef {
    type Err = String;

    /// Accepts `off`, `<n>`, `native:<n>` and `ext:<n>`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_lowercase();
        let parse_index = |digits: &str| {
            digits
                .parse::<usize>()
                .map_err(|_| format!("Invalid subtitle track index: {}", digits))
        };
        if s == "off" || s == "-1" {
            Ok(TrackRef::Off)
        } else if let Some(rest) = s.strip_prefix("ext:") {
            parse_index(rest).map(TrackRef::External)
        } else if let Some(rest) = s.strip_prefix("native:") {
            parse_index(rest).map(TrackRef::Native)
        } else {
            parse_index(&s).map(TrackRef::Native)
        }
    }
}

/// An external track that was attached and still has to be switched to showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingActivation {
    pub external_index: usize,
    pub attempt: u32,
}

/// Result of trying to activate an attached external track.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivationStatus {
    Activated,
    /// The engine has not registered the track yet; try again later.
    Retry(PendingActivation),
    /// Another selection (or another load) replaced this one.
    Superseded,
}

/// A subtitle entry as presented to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubtitleEntry {
    pub reference: TrackRef,
    pub descriptor: SubtitleTrackDescriptor,
}

/// Copy of the registry's lists and selections for the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TrackListing {
    pub audio: Vec<AudioTrackDescriptor>,
    pub subtitles: Vec<SubtitleEntry>,
    pub current_audio: usize,
    pub current_subtitle: TrackRef,
    pub external_showing: bool,
}
