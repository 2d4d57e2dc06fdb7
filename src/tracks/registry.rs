use tracing::{debug, info, trace, warn};

use crate::engine::{EngineSnapshot, MediaEngine, TextTrackMode};
use crate::tracks::error::TrackError;
use crate::tracks::models::{
    ActivationStatus, AudioTrackDescriptor, PendingActivation, SubtitleEntry, SubtitleOrigin,
    SubtitleTrackDescriptor, TrackListing, TrackRef, DEFAULT_AUDIO_LABEL, UNKNOWN_LANGUAGE,
};

const TRACKS_LOG_TARGET: &str = "r_vidplay::tracks";

/// Single source of truth for the active audio and subtitle tracks of the
/// loaded media.
///
/// The registry never holds engine track handles. It works from
/// [`EngineSnapshot`]s and sends commands back to the engine by index, which is
/// passed in by the caller for every operation that touches the engine.
#[derive(Debug)]
pub struct TrackRegistry {
    audio_tracks: Vec<AudioTrackDescriptor>,
    native_audio_count: usize,
    native_subtitles: Vec<SubtitleTrackDescriptor>,
    external_subtitles: Vec<SubtitleTrackDescriptor>,
    current_audio: usize,
    current_subtitle: TrackRef,
    subtitles_registered: usize,
    external_showing: bool,
    auto_enable_first_subtitle: bool,
}

impl TrackRegistry {
    pub fn new(auto_enable_first_subtitle: bool) -> Self {
        TrackRegistry {
            audio_tracks: Vec::new(),
            native_audio_count: 0,
            native_subtitles: Vec::new(),
            external_subtitles: Vec::new(),
            current_audio: 0,
            current_subtitle: TrackRef::Off,
            subtitles_registered: 0,
            external_showing: false,
            auto_enable_first_subtitle,
        }
    }

    /// Forgets every track and selection of the previous media.
    ///
    /// Must run when the load is issued, not when metadata arrives, so that no
    /// selection can point at a track of the previous video in between.
    pub fn reset_for_new_load(&mut self) {
        trace!(target: TRACKS_LOG_TARGET, "Resetting track registry for new load.");
        self.audio_tracks.clear();
        self.native_audio_count = 0;
        self.native_subtitles.clear();
        self.external_subtitles.clear();
        self.current_audio = 0;
        self.current_subtitle = TrackRef::Off;
        self.subtitles_registered = 0;
        self.external_showing = false;
    }

    /// Rebuilds the native track lists from an engine snapshot.
    ///
    /// External subtitles registered for this load are kept.
    pub fn detect_native_tracks(&mut self, snapshot: &EngineSnapshot, engine: &mut dyn MediaEngine) {
        self.native_audio_count = snapshot.audio_tracks.len();
        self.audio_tracks = if snapshot.audio_tracks.is_empty() {
            debug!(target: TRACKS_LOG_TARGET, "No explicit audio tracks found, using default.");
            vec![AudioTrackDescriptor {
                engine_index: 0,
                label: DEFAULT_AUDIO_LABEL.to_string(),
                language: UNKNOWN_LANGUAGE.to_string(),
            }]
        } else {
            snapshot
                .audio_tracks
                .iter()
                .enumerate()
                .map(|(index, track)| AudioTrackDescriptor {
                    engine_index: index,
                    label: non_empty(&track.label).unwrap_or_else(|| format!("Audio Track {}", index + 1)),
                    language: non_empty(&track.language).unwrap_or_else(|| UNKNOWN_LANGUAGE.to_string()),
                })
                .collect()
        };
        self.current_audio = 0;
        self.apply_audio_selection(engine);

        self.native_subtitles = snapshot
            .text_tracks
            .iter()
            .enumerate()
            .filter(|(_, track)| track.kind.is_subtitle_like())
            .map(|(index, track)| SubtitleTrackDescriptor {
                origin: SubtitleOrigin::Native(index),
                label: non_empty(&track.label).unwrap_or_else(|| format!("Subtitle Track {}", index + 1)),
            })
            .collect();
        info!(target: TRACKS_LOG_TARGET, "Detected {} audio and {} subtitle tracks.", self.native_audio_count, self.native_subtitles.len());

        // The engine may report container default tracks as already showing.
        self.hide_native_subtitles(engine);
        match self.current_subtitle {
            TrackRef::Native(index) if index >= self.native_subtitles.len() => {
                debug!(target: TRACKS_LOG_TARGET, "Native subtitle {} vanished after detection, switching off.", index);
                self.current_subtitle = TrackRef::Off;
            }
            TrackRef::Native(index) => self.show_native(index, engine),
            _ => {}
        }

        let first_registration = self.subtitles_registered == 0 && !self.native_subtitles.is_empty();
        self.subtitles_registered += self.native_subtitles.len();
        if first_registration && self.auto_enable_first_subtitle && self.current_subtitle == TrackRef::Off {
            debug!(target: TRACKS_LOG_TARGET, "Enabling first native subtitle track by default.");
            engine.detach_external_tracks();
            self.show_native(0, engine);
            self.current_subtitle = TrackRef::Native(0);
        }
    }

    /// Adds a subtitle file to the current load.
    ///
    /// The first subtitle registered since the last reset is selected
    /// automatically. Registering a locator twice is a no-op.
    pub fn register_external_subtitle(
        &mut self,
        locator: &str,
        label: &str,
        engine: &mut dyn MediaEngine,
    ) -> Result<Option<PendingActivation>, TrackError> {
        if self.external_subtitles.iter().any(|track| track.origin == SubtitleOrigin::External(locator.to_string())) {
            debug!(target: TRACKS_LOG_TARGET, "External subtitle {} already registered.", locator);
            return Ok(None);
        }
        info!(target: TRACKS_LOG_TARGET, "Adding external subtitle track: {}", label);
        self.external_subtitles.push(SubtitleTrackDescriptor {
            origin: SubtitleOrigin::External(locator.to_string()),
            label: label.to_string(),
        });
        let first_registration = self.subtitles_registered == 0;
        self.subtitles_registered += 1;

        if first_registration && self.auto_enable_first_subtitle && self.current_subtitle == TrackRef::Off {
            let index = self.external_subtitles.len() - 1;
            return self.select_subtitle_track(TrackRef::External(index), engine);
        }
        Ok(None)
    }

    /// Enables exactly one audio track.
    pub fn select_audio_track(&mut self, index: usize, engine: &mut dyn MediaEngine) -> Result<(), TrackError> {
        if index >= self.audio_tracks.len() {
            warn!(target: TRACKS_LOG_TARGET, "Audio track {} requested, {} available.", index, self.audio_tracks.len());
            return Err(TrackError::AudioIndexOutOfRange { index, available: self.audio_tracks.len() });
        }
        self.current_audio = index;
        self.apply_audio_selection(engine);
        info!(target: TRACKS_LOG_TARGET, "Enabled audio track: {}", self.audio_tracks[index].label);
        Ok(())
    }

    /// Switches the visible subtitle source.
    ///
    /// Every native text track is hidden and any external rendering detached
    /// before the new selection is applied. An external selection is only
    /// attached here; it becomes visible once the returned activation is
    /// confirmed with [`TrackRegistry::confirm_external_activation`].
    pub fn select_subtitle_track(
        &mut self,
        reference: TrackRef,
        engine: &mut dyn MediaEngine,
    ) -> Result<Option<PendingActivation>, TrackError> {
        let valid = match reference {
            TrackRef::Off => true,
            TrackRef::Native(index) => index < self.native_subtitles.len(),
            TrackRef::External(index) => index < self.external_subtitles.len(),
        };
        if !valid {
            warn!(target: TRACKS_LOG_TARGET, "Subtitle track {} requested but does not exist.", reference);
            return Err(TrackError::SubtitleIndexOutOfRange {
                requested: reference,
                native: self.native_subtitles.len(),
                external: self.external_subtitles.len(),
            });
        }

        self.hide_native_subtitles(engine);
        engine.detach_external_tracks();
        self.external_showing = false;

        match reference {
            TrackRef::Off => {
                self.current_subtitle = TrackRef::Off;
                info!(target: TRACKS_LOG_TARGET, "Subtitles disabled.");
                Ok(None)
            }
            TrackRef::Native(index) => {
                self.show_native(index, engine);
                self.current_subtitle = reference;
                info!(target: TRACKS_LOG_TARGET, "Enabled subtitle track: {}", self.native_subtitles[index].label);
                Ok(None)
            }
            TrackRef::External(index) => {
                let track = &self.external_subtitles[index];
                let SubtitleOrigin::External(locator) = &track.origin else {
                    return Ok(None);
                };
                if let Err(e) = engine.attach_external_track(locator, &track.label) {
                    warn!(target: TRACKS_LOG_TARGET, "Failed to attach {}: {}", locator, e);
                    self.current_subtitle = TrackRef::Off;
                    return Err(TrackError::Attach(e));
                }
                self.current_subtitle = reference;
                debug!(target: TRACKS_LOG_TARGET, "Attached external subtitle {}, awaiting activation.", track.label);
                Ok(Some(PendingActivation { external_index: index, attempt: 0 }))
            }
        }
    }

    /// Switches an attached external track to showing once the engine has
    /// registered it.
    pub fn confirm_external_activation(
        &mut self,
        activation: PendingActivation,
        engine: &mut dyn MediaEngine,
    ) -> ActivationStatus {
        if self.current_subtitle != TrackRef::External(activation.external_index) {
            trace!(target: TRACKS_LOG_TARGET, "Activation of external track {} superseded.", activation.external_index);
            return ActivationStatus::Superseded;
        }
        if self.external_showing {
            return ActivationStatus::Activated;
        }
        if !engine.external_track_ready() {
            trace!(target: TRACKS_LOG_TARGET, attempt = activation.attempt, "External track {} not registered yet.", activation.external_index);
            return ActivationStatus::Retry(PendingActivation { attempt: activation.attempt + 1, ..activation });
        }
        engine.set_external_track_mode(TextTrackMode::Showing);
        self.external_showing = true;
        info!(target: TRACKS_LOG_TARGET, "External subtitle track {} showing.", activation.external_index);
        ActivationStatus::Activated
    }

    fn apply_audio_selection(&self, engine: &mut dyn MediaEngine) {
        let Some(selected) = self.audio_tracks.get(self.current_audio) else {
            return;
        };
        for index in 0..self.native_audio_count {
            engine.set_audio_track_enabled(index, index == selected.engine_index);
        }
    }

    fn hide_native_subtitles(&self, engine: &mut dyn MediaEngine) {
        for track in &self.native_subtitles {
            if let SubtitleOrigin::Native(engine_index) = track.origin {
                engine.set_text_track_mode(engine_index, TextTrackMode::Hidden);
            }
        }
    }

    fn show_native(&self, index: usize, engine: &mut dyn MediaEngine) {
        if let Some(SubtitleOrigin::Native(engine_index)) = self.native_subtitles.get(index).map(|track| &track.origin) {
            engine.set_text_track_mode(*engine_index, TextTrackMode::Showing);
        }
    }

    pub fn audio_tracks(&self) -> &[AudioTrackDescriptor] {
        &self.audio_tracks
    }

    pub fn native_subtitles(&self) -> &[SubtitleTrackDescriptor] {
        &self.native_subtitles
    }

    pub fn external_subtitles(&self) -> &[SubtitleTrackDescriptor] {
        &self.external_subtitles
    }

    /// Native subtitles followed by external ones, each with its reference.
    pub fn subtitle_entries(&self) -> Vec<SubtitleEntry> {
        let native = self.native_subtitles.iter().enumerate().map(|(index, descriptor)| SubtitleEntry {
            reference: TrackRef::Native(index),
            descriptor: descriptor.clone(),
        });
        let external = self.external_subtitles.iter().enumerate().map(|(index, descriptor)| SubtitleEntry {
            reference: TrackRef::External(index),
            descriptor: descriptor.clone(),
        });
        native.chain(external).collect()
    }

    pub fn current_audio_track(&self) -> usize {
        self.current_audio
    }

    pub fn current_subtitle_track(&self) -> TrackRef {
        self.current_subtitle
    }

    pub fn is_external_showing(&self) -> bool {
        self.external_showing
    }

    pub fn listing(&self) -> TrackListing {
        TrackListing {
            audio: self.audio_tracks.clone(),
            subtitles: self.subtitle_entries(),
            current_audio: self.current_audio,
            current_subtitle: self.current_subtitle,
            external_showing: self.external_showing,
        }
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value.as_ref().filter(|v| !v.trim().is_empty()).cloned()
}
