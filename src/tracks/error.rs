use std::error::Error;
use std::fmt;

use crate::engine::EngineError;
use crate::tracks::models::TrackRef;

/// Error types for track selection.
#[derive(Debug, Clone, PartialEq)]
pub enum TrackError {
    AudioIndexOutOfRange { index: usize, available: usize },
    SubtitleIndexOutOfRange { requested: TrackRef, native: usize, external: usize },
    /// The engine refused to attach an external subtitle track.
    Attach(EngineError),
}

impl TrackError {
    pub fn is_index_out_of_range(&self) -> bool {
        !matches!(self, TrackError::Attach(_))
    }
}

impl fmt::Display for TrackError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrackError::AudioIndexOutOfRange { index, available } => {
                write!(f, "Audio track {} out of range ({} available)", index, available)
            }
            TrackError::SubtitleIndexOutOfRange { requested, native, external } => write!(
                f,
                "Subtitle track {} out of range ({} native, {} external)",
                requested, native, external
            ),
            TrackError::Attach(e) => write!(f, "Failed to attach subtitle track: {}", e),
        }
    }
}

impl Error for TrackError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            TrackError::Attach(e) => Some(e),
            _ => None,
        }
    }
}

impl From<EngineError> for TrackError {
    fn from(e: EngineError) -> Self {
        TrackError::Attach(e)
    }
}
