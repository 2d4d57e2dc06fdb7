use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, trace, warn};

use crate::engine::adapter::{EngineError, EngineEventSender, MediaEngine};
use crate::engine::models::{
    EngineEvent, EngineNotification, EngineSnapshot, LoadGeneration, NativeAudioTrack,
    NativeTextTrack, TextTrackMode,
};

const LOG_TARGET: &str = "r_vidplay::engine::headless";

/// Track layout and duration the headless engine reports for one locator.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MediaProfile {
    pub duration: Option<f64>,
    pub audio_tracks: Vec<NativeAudioTrack>,
    pub text_tracks: Vec<NativeTextTrack>,
}

/// External subtitle track currently attached to the engine.
#[derive(Debug, Clone, PartialEq)]
pub struct AttachedTrack {
    pub locator: String,
    pub label: String,
    pub mode: TextTrackMode,
}

#[derive(Debug)]
struct HeadlessState {
    profiles: HashMap<String, MediaProfile>,
    loaded: Option<String>,
    generation: LoadGeneration,
    duration: Option<f64>,
    audio_tracks: Vec<NativeAudioTrack>,
    text_tracks: Vec<NativeTextTrack>,
    external: Option<AttachedTrack>,
    paused: bool,
    current_time: f64,
    volume: f64,
    muted: bool,
    playback_rate: f64,
    auto_ready: bool,
    reject_play: Option<String>,
    registration_delay: u32,
    readiness_checks: u32,
}

/// A [`MediaEngine`] that keeps engine state without decoding anything.
///
/// Cloning yields another handle onto the same engine, so a host (or a test)
/// can keep one handle to drive events and inspect state while the session
/// owns the other.
#[derive(Debug, Clone)]
pub struct HeadlessEngine {
    state: Arc<Mutex<HeadlessState>>,
    events: EngineEventSender,
}

impl HeadlessEngine {
    pub fn new(events: EngineEventSender) -> Self {
        HeadlessEngine {
            state: Arc::new(Mutex::new(HeadlessState {
                profiles: HashMap::new(),
                loaded: None,
                generation: LoadGeneration::default(),
                duration: None,
                audio_tracks: Vec::new(),
                text_tracks: Vec::new(),
                external: None,
                paused: true,
                current_time: 0.0,
                volume: 1.0,
                muted: false,
                playback_rate: 1.0,
                auto_ready: true,
                reject_play: None,
                registration_delay: 0,
                readiness_checks: 0,
            })),
            events,
        }
    }

    fn lock(&self) -> MutexGuard<'_, HeadlessState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Registers the tracks and duration reported when `locator` is loaded.
    pub fn with_profile(self, locator: &str, profile: MediaProfile) -> Self {
        self.set_profile(locator, profile);
        self
    }

    pub fn set_profile(&self, locator: &str, profile: MediaProfile) {
        self.lock().profiles.insert(locator.to_string(), profile);
    }

    /// When enabled (the default) `load` is immediately followed by `MetadataReady`.
    pub fn set_auto_ready(&self, auto_ready: bool) {
        self.lock().auto_ready = auto_ready;
    }

    /// Makes subsequent `play` calls fail with [`EngineError::Rejected`].
    pub fn reject_play(&self, reason: Option<&str>) {
        self.lock().reject_play = reason.map(str::to_string);
    }

    /// Number of readiness checks that report an attached external track as not
    /// yet registered.
    pub fn set_external_registration_delay(&self, checks: u32) {
        self.lock().registration_delay = checks;
    }

    /// Emits `event` for the load currently in effect.
    pub fn emit(&self, event: EngineEvent) {
        let generation = self.lock().generation;
        self.emit_for(generation, event);
    }

    /// Emits `event` tagged with an explicit generation.
    pub fn emit_for(&self, generation: LoadGeneration, event: EngineEvent) {
        trace!(target: LOG_TARGET, %generation, "Emitting {:?}", event);
        if let Err(e) = self.events.send(EngineNotification { generation, event }) {
            warn!(target: LOG_TARGET, "Failed to deliver engine notification: {}", e);
        }
    }

    /// Plays the loaded media to its end.
    pub fn finish(&self) {
        {
            let mut state = self.lock();
            state.paused = true;
            if let Some(duration) = state.duration {
                state.current_time = duration;
            }
        }
        self.emit(EngineEvent::Ended);
    }

    pub fn fail(&self, detail: &str) {
        self.emit(EngineEvent::Error(detail.to_string()));
    }

    pub fn loaded_locator(&self) -> Option<String> {
        self.lock().loaded.clone()
    }

    pub fn generation(&self) -> LoadGeneration {
        self.lock().generation
    }

    /// Engine indices of the audio tracks currently enabled.
    pub fn enabled_audio_tracks(&self) -> Vec<usize> {
        self.lock()
            .audio_tracks
            .iter()
            .enumerate()
            .filter(|(_, track)| track.enabled)
            .map(|(index, _)| index)
            .collect()
    }

    pub fn text_track_modes(&self) -> Vec<TextTrackMode> {
        self.lock().text_tracks.iter().map(|track| track.mode).collect()
    }

    pub fn external_track(&self) -> Option<AttachedTrack> {
        self.lock().external.clone()
    }

    /// Number of subtitle sources (native or external) in `Showing` mode.
    pub fn showing_subtitle_count(&self) -> usize {
        let state = self.lock();
        let native = state
            .text_tracks
            .iter()
            .filter(|track| track.mode == TextTrackMode::Showing)
            .count();
        let external = state
            .external
            .as_ref()
            .map_or(0, |track| usize::from(track.mode == TextTrackMode::Showing));
        native + external
    }

    pub fn is_paused(&self) -> bool {
        self.lock().paused
    }

    pub fn volume(&self) -> f64 {
        self.lock().volume
    }

    pub fn is_muted(&self) -> bool {
        self.lock().muted
    }

    pub fn playback_rate(&self) -> f64 {
        self.lock().playback_rate
    }
}

#[async_trait]
impl MediaEngine for HeadlessEngine {
    fn load(&mut self, locator: &str, generation: LoadGeneration) -> Result<(), EngineError> {
        let auto_ready = {
            let mut state = self.lock();
            let profile = state.profiles.get(locator).cloned().unwrap_or_default();
            debug!(target: LOG_TARGET, %generation, "Loading {} ({} audio, {} text tracks)", locator, profile.audio_tracks.len(), profile.text_tracks.len());
            state.loaded = Some(locator.to_string());
            state.generation = generation;
            state.duration = profile.duration;
            state.audio_tracks = profile
                .audio_tracks
                .into_iter()
                .enumerate()
                .map(|(index, track)| NativeAudioTrack { enabled: index == 0, ..track })
                .collect();
            state.text_tracks = profile.text_tracks;
            state.external = None;
            state.paused = true;
            state.current_time = 0.0;
            state.readiness_checks = 0;
            state.auto_ready
        };
        if auto_ready {
            self.emit_for(generation, EngineEvent::MetadataReady);
        }
        Ok(())
    }

    async fn play(&mut self) -> Result<(), EngineError> {
        let mut state = self.lock();
        if state.loaded.is_none() {
            return Err(EngineError::Failed("No media loaded".to_string()));
        }
        if let Some(reason) = &state.reject_play {
            return Err(EngineError::Rejected(reason.clone()));
        }
        state.paused = false;
        Ok(())
    }

    fn pause(&mut self) {
        self.lock().paused = true;
    }

    fn seek(&mut self, seconds: f64) {
        self.lock().current_time = seconds;
        self.emit(EngineEvent::TimeUpdate(seconds));
    }

    fn current_time(&self) -> f64 {
        self.lock().current_time
    }

    fn duration(&self) -> Option<f64> {
        self.lock().duration
    }

    fn set_volume(&mut self, volume: f64) {
        self.lock().volume = volume;
    }

    fn set_muted(&mut self, muted: bool) {
        self.lock().muted = muted;
    }

    fn set_playback_rate(&mut self, rate: f64) {
        self.lock().playback_rate = rate;
    }

    fn snapshot(&self) -> EngineSnapshot {
        let state = self.lock();
        EngineSnapshot {
            duration: state.duration,
            audio_tracks: state.audio_tracks.clone(),
            text_tracks: state.text_tracks.clone(),
        }
    }

    fn set_audio_track_enabled(&mut self, engine_index: usize, enabled: bool) {
        if let Some(track) = self.lock().audio_tracks.get_mut(engine_index) {
            track.enabled = enabled;
        }
    }

    fn set_text_track_mode(&mut self, engine_index: usize, mode: TextTrackMode) {
        if let Some(track) = self.lock().text_tracks.get_mut(engine_index) {
            track.mode = mode;
        }
    }

    fn attach_external_track(&mut self, locator: &str, label: &str) -> Result<(), EngineError> {
        let mut state = self.lock();
        if state.loaded.is_none() {
            return Err(EngineError::Failed("No media loaded".to_string()));
        }
        state.external = Some(AttachedTrack {
            locator: locator.to_string(),
            label: label.to_string(),
            mode: TextTrackMode::Disabled,
        });
        state.readiness_checks = 0;
        Ok(())
    }

    fn external_track_ready(&self) -> bool {
        let mut state = self.lock();
        if state.external.is_none() {
            return false;
        }
        if state.readiness_checks < state.registration_delay {
            state.readiness_checks += 1;
            return false;
        }
        true
    }

    fn set_external_track_mode(&mut self, mode: TextTrackMode) {
        if let Some(track) = self.lock().external.as_mut() {
            track.mode = mode;
        }
    }

    fn detach_external_tracks(&mut self) {
        self.lock().external = None;
    }
}
