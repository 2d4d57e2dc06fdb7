use async_trait::async_trait;
use std::error::Error;
use std::fmt;
use tokio::sync::mpsc;

use crate::engine::models::{EngineNotification, EngineSnapshot, LoadGeneration, TextTrackMode};

/// Channel the engine uses to deliver [`EngineNotification`]s to the player task.
///
/// Unbounded: engine callbacks run synchronously and must never lose a
/// notification.
pub type EngineEventSender = mpsc::UnboundedSender<EngineNotification>;
pub type EngineEventReceiver = mpsc::UnboundedReceiver<EngineNotification>;

/// Error types reported by a media engine.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineError {
    /// The engine refused a play request (autoplay policy and the like).
    Rejected(String),
    /// The engine failed; the current media cannot be played.
    Failed(String),
    UnsupportedOperation(String),
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::Rejected(e) => write!(f, "Playback rejected: {}", e),
            EngineError::Failed(e) => write!(f, "Engine error: {}", e),
            EngineError::UnsupportedOperation(e) => write!(f, "Unsupported operation: {}", e),
        }
    }
}

impl Error for EngineError {}

/// Capability surface of the host's playback primitive.
///
/// Commands are fire-and-forget, the same way a media element's properties are
/// set. Everything the engine learns later (metadata, progress, end of media,
/// failures) comes back as an [`EngineNotification`] tagged with the
/// [`LoadGeneration`] passed to [`MediaEngine::load`].
#[async_trait]
pub trait MediaEngine: Send + Sync {
    /// Starts loading `locator`. Returns immediately; readiness is signalled
    /// with `MetadataReady`.
    fn load(&mut self, locator: &str, generation: LoadGeneration) -> Result<(), EngineError>;

    /// Requests playback. The engine may reject the request.
    async fn play(&mut self) -> Result<(), EngineError>;

    fn pause(&mut self);

    fn seek(&mut self, seconds: f64);

    fn current_time(&self) -> f64;

    fn duration(&self) -> Option<f64>;

    fn set_volume(&mut self, volume: f64);

    fn set_muted(&mut self, muted: bool);

    fn set_playback_rate(&mut self, rate: f64);

    /// Copies the engine's current track metadata.
    fn snapshot(&self) -> EngineSnapshot;

    fn set_audio_track_enabled(&mut self, engine_index: usize, enabled: bool);

    fn set_text_track_mode(&mut self, engine_index: usize, mode: TextTrackMode);

    /// Attaches a subtitle file as an extra rendering track.
    fn attach_external_track(&mut self, locator: &str, label: &str) -> Result<(), EngineError>;

    /// True once the engine has registered the attached external track and will
    /// honour a mode change on it.
    fn external_track_ready(&self) -> bool;

    fn set_external_track_mode(&mut self, mode: TextTrackMode);

    /// Removes every attached external track.
    fn detach_external_tracks(&mut self);
}
