//! Playback session: load lifecycle, transport and track selection for the
//! single active media engine

mod machine;
pub mod state;
#[cfg(test)]
mod tests;

pub use machine::PlaybackSession;
pub use state::{
    ActivationTicket, AudioSettings, EngineOutcome, PlaybackProgress, SessionState, SidecarRequest,
    SubtitleRegistration, MAX_PLAYBACK_RATE, MIN_PLAYBACK_RATE,
};
