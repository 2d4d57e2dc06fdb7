use std::error::Error;
use std::fmt;

use crate::engine::EngineError;
use crate::files::CollaboratorError;
use crate::playlist::PlaylistError;
use crate::tracks::TrackError;

/// Errors the player reports to the presentation layer. None of them stop the
/// player task.
#[derive(Debug, Clone, PartialEq)]
pub enum PlayerError {
    Track(TrackError),
    Playlist(PlaylistError),
    /// The engine refused to play; the session fell back to paused.
    EngineRejected(String),
    Engine(EngineError),
    Collaborator(CollaboratorError),
}

impl fmt::Display for PlayerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlayerError::Track(e) => write!(f, "Track error: {}", e),
            PlayerError::Playlist(e) => write!(f, "Playlist error: {}", e),
            PlayerError::EngineRejected(reason) => write!(f, "Playback rejected: {}", reason),
            PlayerError::Engine(e) => write!(f, "{}", e),
            PlayerError::Collaborator(e) => write!(f, "File error: {}", e),
        }
    }
}

impl Error for PlayerError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            PlayerError::Track(e) => Some(e),
            PlayerError::Playlist(e) => Some(e),
            PlayerError::Engine(e) => Some(e),
            PlayerError::Collaborator(e) => Some(e),
            PlayerError::EngineRejected(_) => None,
        }
    }
}

impl From<TrackError> for PlayerError {
    fn from(err: TrackError) -> Self {
        PlayerError::Track(err)
    }
}

impl From<PlaylistError> for PlayerError {
    fn from(err: PlaylistError) -> Self {
        PlayerError::Playlist(err)
    }
}

impl From<EngineError> for PlayerError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::Rejected(reason) => PlayerError::EngineRejected(reason),
            other => PlayerError::Engine(other),
        }
    }
}

impl From<CollaboratorError> for PlayerError {
    fn from(err: CollaboratorError) -> Self {
        PlayerError::Collaborator(err)
    }
}
