use tracing::{debug, error, info, trace, warn};

use crate::engine::{EngineError, EngineEvent, EngineNotification, LoadGeneration, MediaEngine};
use crate::playlist::MediaItem;
use crate::session::state::{
    ActivationTicket, AudioSettings, EngineOutcome, PlaybackProgress, SessionState, SidecarRequest,
    SubtitleRegistration, MAX_PLAYBACK_RATE, MIN_PLAYBACK_RATE,
};
use crate::subtitles::SubtitleCandidate;
use crate::tracks::{ActivationStatus, TrackError, TrackListing, TrackRef, TrackRegistry};

const SESSION_LOG_TARGET: &str = "r_vidplay::session";

/// State machine tying a load request to engine readiness and track detection.
///
/// The session owns the engine and the track registry. Every engine
/// notification and every collaborator result must come back through it with
/// the [`LoadGeneration`] it was issued for; anything tagged with an older
/// generation is dropped.
pub struct PlaybackSession {
    engine: Box<dyn MediaEngine>,
    tracks: TrackRegistry,
    state: SessionState,
    generation: LoadGeneration,
    current_item: Option<MediaItem>,
    progress: PlaybackProgress,
    audio: AudioSettings,
    buffering: bool,
    resume_after_load: bool,
    transitions: Vec<SessionState>,
}

impl PlaybackSession {
    pub fn new(engine: Box<dyn MediaEngine>, audio: AudioSettings, auto_enable_first_subtitle: bool) -> Self {
        PlaybackSession {
            engine,
            tracks: TrackRegistry::new(auto_enable_first_subtitle),
            state: SessionState::Idle,
            generation: LoadGeneration::default(),
            current_item: None,
            progress: PlaybackProgress::default(),
            audio,
            buffering: false,
            resume_after_load: false,
            transitions: Vec::new(),
        }
    }

    fn set_state(&mut self, state: SessionState) {
        if self.state != state {
            trace!(target: SESSION_LOG_TARGET, "State {} -> {}", self.state, state);
            self.transitions.push(state.clone());
            self.state = state;
        }
    }

    /// Every state entered since the last call, oldest first.
    pub fn take_transitions(&mut self) -> Vec<SessionState> {
        std::mem::take(&mut self.transitions)
    }

    /// Starts loading `item`, abandoning whatever was loaded or loading before.
    ///
    /// Track state is reset before the engine is told to load, so nothing can
    /// observe tracks of the previous media. With `resume` set, playback starts
    /// as soon as the new media is ready.
    pub fn select(&mut self, item: MediaItem, resume: bool) -> Result<LoadGeneration, EngineError> {
        self.generation = self.generation.next();
        info!(target: SESSION_LOG_TARGET, generation = %self.generation, "Loading video: {}", item.display_name);

        self.tracks.reset_for_new_load();
        self.progress = PlaybackProgress::default();
        self.buffering = false;
        self.resume_after_load = resume;
        self.engine.detach_external_tracks();
        self.apply_audio_settings();
        self.set_state(SessionState::Loading);

        let result = self.engine.load(&item.locator, self.generation);
        self.current_item = Some(item);
        match result {
            Ok(()) => Ok(self.generation),
            Err(e) => {
                error!(target: SESSION_LOG_TARGET, "Engine failed to load: {}", e);
                self.set_state(SessionState::Error(e.to_string()));
                self.resume_after_load = false;
                Err(e)
            }
        }
    }

    pub fn handle_engine_notification(&mut self, notification: EngineNotification) -> EngineOutcome {
        if notification.generation != self.generation {
            trace!(target: SESSION_LOG_TARGET, "Dropping {:?} from load {} (current {})", notification.event, notification.generation, self.generation);
            return EngineOutcome::Stale;
        }
        match notification.event {
            EngineEvent::MetadataReady => self.on_metadata_ready(),
            EngineEvent::TimeUpdate(seconds) => {
                if matches!(self.state, SessionState::Idle | SessionState::Error(_)) {
                    return EngineOutcome::Ignored;
                }
                self.progress.current_time = seconds;
                EngineOutcome::Progress(self.progress)
            }
            EngineEvent::Waiting => self.set_buffering(true),
            EngineEvent::CanPlay => self.set_buffering(false),
            EngineEvent::Ended => {
                if !matches!(self.state, SessionState::Ready | SessionState::Playing | SessionState::Paused) {
                    return EngineOutcome::Ignored;
                }
                info!(target: SESSION_LOG_TARGET, "Video ended");
                self.set_state(SessionState::Ended);
                self.buffering = false;
                if let Some(duration) = self.progress.duration {
                    self.progress.current_time = duration;
                }
                EngineOutcome::Ended
            }
            EngineEvent::Error(detail) => {
                error!(target: SESSION_LOG_TARGET, "Video error: {}", detail);
                self.set_state(SessionState::Error(detail.clone()));
                self.buffering = false;
                self.resume_after_load = false;
                EngineOutcome::Failed(detail)
            }
        }
    }

    fn on_metadata_ready(&mut self) -> EngineOutcome {
        if self.state != SessionState::Loading {
            debug!(target: SESSION_LOG_TARGET, "Metadata ready while {}, ignoring", self.state);
            return EngineOutcome::Ignored;
        }
        let Some(item) = self.current_item.clone() else {
            return EngineOutcome::Ignored;
        };
        let snapshot = self.engine.snapshot();
        self.progress.duration = snapshot.duration.or_else(|| self.engine.duration());
        self.tracks.detect_native_tracks(&snapshot, self.engine.as_mut());
        self.set_state(SessionState::Ready);
        self.buffering = false;
        debug!(target: SESSION_LOG_TARGET, "Video loaded, duration {:?}", self.progress.duration);
        EngineOutcome::Ready {
            sidecar: SidecarRequest { generation: self.generation, item },
            resume: std::mem::take(&mut self.resume_after_load),
        }
    }

    fn set_buffering(&mut self, buffering: bool) -> EngineOutcome {
        if self.buffering == buffering {
            return EngineOutcome::Ignored;
        }
        self.buffering = buffering;
        EngineOutcome::BufferingChanged(buffering)
    }

    /// Requests playback. While loading this only marks the load to resume.
    pub async fn play(&mut self) -> Result<(), EngineError> {
        match self.state {
            SessionState::Loading => {
                self.resume_after_load = true;
                return Ok(());
            }
            SessionState::Playing => return Ok(()),
            SessionState::Ended => {
                self.engine.seek(0.0);
                self.progress.current_time = 0.0;
            }
            SessionState::Ready | SessionState::Paused => {}
            SessionState::Idle | SessionState::Error(_) => {
                debug!(target: SESSION_LOG_TARGET, "Nothing to play while {}", self.state);
                return Ok(());
            }
        }
        match self.engine.play().await {
            Ok(()) => {
                self.set_state(SessionState::Playing);
                Ok(())
            }
            Err(EngineError::Rejected(reason)) => {
                warn!(target: SESSION_LOG_TARGET, "Error playing video: {}", reason);
                self.set_state(SessionState::Paused);
                Err(EngineError::Rejected(reason))
            }
            Err(e) => {
                error!(target: SESSION_LOG_TARGET, "Engine failed to play: {}", e);
                self.set_state(SessionState::Error(e.to_string()));
                Err(e)
            }
        }
    }

    pub fn pause(&mut self) {
        match self.state {
            SessionState::Playing => {
                self.engine.pause();
                self.set_state(SessionState::Paused);
            }
            SessionState::Loading => self.resume_after_load = false,
            _ => {}
        }
    }

    pub async fn toggle(&mut self) -> Result<(), EngineError> {
        if self.state == SessionState::Playing || (self.state == SessionState::Loading && self.resume_after_load) {
            self.pause();
            Ok(())
        } else {
            self.play().await
        }
    }

    /// Seeks within the loaded media. Returns false when the request was
    /// ignored because no media is ready.
    pub fn seek_to(&mut self, seconds: f64) -> bool {
        if !self.state.is_active() || seconds.is_nan() {
            debug!(target: SESSION_LOG_TARGET, "Ignoring seek while {}", self.state);
            return false;
        }
        let upper = self.progress.duration.unwrap_or(f64::INFINITY);
        let target = seconds.clamp(0.0, upper.max(0.0));
        self.engine.seek(target);
        self.progress.current_time = target;
        true
    }

    pub fn seek_by(&mut self, delta: f64) -> bool {
        let now = self.engine.current_time();
        self.seek_to(now + delta)
    }

    /// Sets the volume, clamped to `[0, 1]`. Zero mutes.
    pub fn set_volume(&mut self, volume: f64) -> AudioSettings {
        if volume.is_nan() {
            return self.audio;
        }
        let volume = volume.clamp(0.0, 1.0);
        self.audio.volume = volume;
        if volume > 0.0 {
            self.audio.last_volume = volume;
            self.audio.muted = false;
        } else {
            self.audio.muted = true;
        }
        self.apply_audio_settings();
        self.audio
    }

    pub fn adjust_volume(&mut self, delta: f64) -> AudioSettings {
        let current = self.audio.effective_volume();
        self.set_volume(current + delta)
    }

    pub fn toggle_mute(&mut self) -> AudioSettings {
        if self.audio.muted {
            self.audio.muted = false;
            if self.audio.volume == 0.0 {
                self.audio.volume = self.audio.last_volume;
            }
        } else {
            self.audio.muted = true;
        }
        self.apply_audio_settings();
        self.audio
    }

    pub fn set_playback_rate(&mut self, rate: f64) -> AudioSettings {
        if rate.is_nan() {
            return self.audio;
        }
        self.audio.playback_rate = rate.clamp(MIN_PLAYBACK_RATE, MAX_PLAYBACK_RATE);
        self.engine.set_playback_rate(self.audio.playback_rate);
        self.audio
    }

    fn apply_audio_settings(&mut self) {
        self.engine.set_volume(self.audio.volume);
        self.engine.set_muted(self.audio.muted);
        self.engine.set_playback_rate(self.audio.playback_rate);
    }

    pub fn select_audio_track(&mut self, index: usize) -> Result<(), TrackError> {
        self.tracks.select_audio_track(index, self.engine.as_mut())
    }

    pub fn select_subtitle_track(&mut self, reference: TrackRef) -> Result<Option<ActivationTicket>, TrackError> {
        let pending = self.tracks.select_subtitle_track(reference, self.engine.as_mut())?;
        Ok(pending.map(|activation| ActivationTicket { generation: self.generation, activation }))
    }

    /// Registers subtitle files for the load `generation`. Returns `None` when
    /// that load is no longer current.
    pub fn register_external_subtitles(
        &mut self,
        generation: LoadGeneration,
        candidates: &[SubtitleCandidate],
    ) -> Option<SubtitleRegistration> {
        if generation != self.generation {
            debug!(target: SESSION_LOG_TARGET, "Discarding {} subtitles for stale load {}", candidates.len(), generation);
            return None;
        }
        let before = self.tracks.external_subtitles().len();
        let mut registration = SubtitleRegistration::default();
        for candidate in candidates {
            match self.tracks.register_external_subtitle(&candidate.locator, &candidate.label, self.engine.as_mut()) {
                Ok(Some(activation)) => {
                    registration.activation = Some(ActivationTicket { generation, activation });
                }
                Ok(None) => {}
                Err(e) => {
                    warn!(target: SESSION_LOG_TARGET, "Could not enable {}: {}", candidate.label, e);
                    registration.failures.push(e);
                }
            }
        }
        registration.added = self.tracks.external_subtitles().len() - before;
        Some(registration)
    }

    pub fn confirm_external_activation(&mut self, ticket: ActivationTicket) -> ActivationStatus {
        if ticket.generation != self.generation {
            return ActivationStatus::Superseded;
        }
        self.tracks.confirm_external_activation(ticket.activation, self.engine.as_mut())
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn generation(&self) -> LoadGeneration {
        self.generation
    }

    pub fn current_item(&self) -> Option<&MediaItem> {
        self.current_item.as_ref()
    }

    pub fn progress(&self) -> PlaybackProgress {
        self.progress
    }

    pub fn audio_settings(&self) -> AudioSettings {
        self.audio
    }

    pub fn is_buffering(&self) -> bool {
        self.buffering
    }

    pub fn resume_pending(&self) -> bool {
        self.resume_after_load
    }

    pub fn tracks(&self) -> &TrackRegistry {
        &self.tracks
    }

    pub fn track_listing(&self) -> TrackListing {
        self.tracks.listing()
    }
}
