use std::fmt;

use crate::engine::LoadGeneration;
use crate::playlist::MediaItem;
use crate::tracks::PendingActivation;

pub const MIN_PLAYBACK_RATE: f64 = 0.25;
pub const MAX_PLAYBACK_RATE: f64 = 4.0;

/// Visible playback state of the session.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum SessionState {
    #[default]
    Idle,
    Loading,
    Ready,
    Playing,
    Paused,
    Ended,
    Error(String),
}

impl SessionState {
    /// Media is loaded and can be played, paused or seeked.
    pub fn is_active(&self) -> bool {
        matches!(self, SessionState::Ready | SessionState::Playing | SessionState::Paused)
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionState::Idle => write!(f, "Idle"),
            SessionState::Loading => write!(f, "Loading"),
            SessionState::Ready => write!(f, "Ready"),
            SessionState::Playing => write!(f, "Playing"),
            SessionState::Paused => write!(f, "Paused"),
            SessionState::Ended => write!(f, "Ended"),
            SessionState::Error(detail) => write!(f, "Error: {}", detail),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PlaybackProgress {
    pub current_time: f64,
    pub duration: Option<f64>,
}

/// Volume, mute and rate. These outlive individual loads.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AudioSettings {
    pub volume: f64,
    pub muted: bool,
    pub playback_rate: f64,
    /// Last non-zero volume, restored when unmuting.
    pub last_volume: f64,
}

impl AudioSettings {
    pub fn new(volume: f64, playback_rate: f64) -> Self {
        let volume = volume.clamp(0.0, 1.0);
        AudioSettings {
            volume,
            muted: volume == 0.0,
            playback_rate: playback_rate.clamp(MIN_PLAYBACK_RATE, MAX_PLAYBACK_RATE),
            last_volume: if volume > 0.0 { volume } else { 1.0 },
        }
    }

    /// Volume actually heard: zero while muted.
    pub fn effective_volume(&self) -> f64 {
        if self.muted {
            0.0
        } else {
            self.volume
        }
    }
}

impl Default for AudioSettings {
    fn default() -> Self {
        AudioSettings::new(1.0, 1.0)
    }
}

/// Sidecar lookup the caller should run for a load that became ready.
#[derive(Debug, Clone, PartialEq)]
pub struct SidecarRequest {
    pub generation: LoadGeneration,
    pub item: MediaItem,
}

/// An external subtitle activation bound to the load it was issued for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActivationTicket {
    pub generation: LoadGeneration,
    pub activation: PendingActivation,
}

/// What the session made of an engine notification.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineOutcome {
    /// The notification belongs to an earlier load.
    Stale,
    /// Nothing changed.
    Ignored,
    Ready { sidecar: SidecarRequest, resume: bool },
    Progress(PlaybackProgress),
    BufferingChanged(bool),
    Ended,
    Failed(String),
}

/// Result of registering a batch of external subtitles.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SubtitleRegistration {
    pub added: usize,
    pub activation: Option<ActivationTicket>,
    pub failures: Vec<crate::tracks::TrackError>,
}
