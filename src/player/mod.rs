//! The player task: owns the playlist and the playback session and serialises
//! user commands, engine notifications and collaborator results.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, instrument, trace};

use crate::config::Settings;
use crate::engine::{EngineEventReceiver, MediaEngine};
use crate::files::FileInfoSource;
use crate::playlist::PlaylistCoordinator;
use crate::session::{AudioSettings, PlaybackSession, SessionState};
use crate::subtitles::SubtitleResolver;
use crate::tracks::TrackListing;

mod command_handler;
mod error;
mod load_starter;
mod run_loop;
mod state;
mod subtitle_tasks;

pub use error::PlayerError;
pub use state::{PlayerCommand, PlayerSnapshot, PlayerUpdate};

const PLAYER_LOG_TARGET: &str = "r_vidplay::player";

/// Tunables the player is created with.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerOptions {
    pub audio: AudioSettings,
    pub auto_advance: bool,
    pub auto_enable_first_subtitle: bool,
    /// Delay before an attached external subtitle is switched to showing.
    pub activation_grace: Duration,
    pub state_update_capacity: usize,
    pub command_buffer_size: usize,
}

impl Default for PlayerOptions {
    fn default() -> Self {
        PlayerOptions::from(&Settings::default())
    }
}

impl From<&Settings> for PlayerOptions {
    fn from(settings: &Settings) -> Self {
        PlayerOptions {
            audio: AudioSettings::new(settings.volume, settings.playback_rate),
            auto_advance: settings.auto_advance,
            auto_enable_first_subtitle: settings.auto_enable_first_subtitle,
            activation_grace: Duration::from_millis(settings.subtitle_activation_grace_ms),
            state_update_capacity: settings.state_update_capacity,
            command_buffer_size: settings.command_buffer_size,
        }
    }
}

/// Drives a [`PlaybackSession`] from a [`PlaylistCoordinator`].
pub struct Player {
    // --- State ---
    playlist: PlaylistCoordinator,
    session: PlaybackSession,
    auto_advance: bool,
    activation_grace: Duration,
    published_state: SessionState,
    published_tracks: TrackListing,

    // --- Collaborators ---
    resolver: SubtitleResolver,
    file_info: Arc<dyn FileInfoSource>,

    // --- Communication ---
    command_rx: mpsc::Receiver<PlayerCommand>,
    engine_rx: EngineEventReceiver,
    state_update_tx: broadcast::Sender<PlayerUpdate>,
    internal_command_tx: mpsc::Sender<PlayerCommand>,
}

impl Player {
    /// Creates a new Player instance and the command channel sender.
    ///
    /// `engine_rx` must receive the notifications `engine` emits. The Player
    /// itself should be run in a separate task using `Player::run`.
    pub fn new(
        engine: Box<dyn MediaEngine>,
        engine_rx: EngineEventReceiver,
        resolver: SubtitleResolver,
        file_info: Arc<dyn FileInfoSource>,
        options: PlayerOptions,
    ) -> (Self, mpsc::Sender<PlayerCommand>) {
        let (command_tx, command_rx) = mpsc::channel(options.command_buffer_size.max(1));
        let (state_update_tx, _) = broadcast::channel(options.state_update_capacity.max(1));

        let player = Player {
            playlist: PlaylistCoordinator::new(),
            session: PlaybackSession::new(engine, options.audio, options.auto_enable_first_subtitle),
            auto_advance: options.auto_advance,
            activation_grace: options.activation_grace,
            published_state: SessionState::Idle,
            published_tracks: TrackListing::default(),
            resolver,
            file_info,
            command_rx,
            engine_rx,
            state_update_tx,
            internal_command_tx: command_tx.clone(),
        };

        (player, command_tx)
    }

    /// Subscribes to player updates.
    pub fn subscribe_state_updates(&self) -> broadcast::Receiver<PlayerUpdate> {
        self.state_update_tx.subscribe()
    }

    /// Sends an update via the broadcast channel, logging errors.
    fn broadcast_update(&self, update: PlayerUpdate) {
        trace!(target: PLAYER_LOG_TARGET, "Broadcasting update: {:?}", update);
        if self.state_update_tx.send(update).is_err() {
            debug!(target: PLAYER_LOG_TARGET, "No active listeners for player update");
        }
    }

    fn broadcast_error(&self, error: impl Into<PlayerError>) {
        self.broadcast_update(PlayerUpdate::Error(error.into()));
    }

    /// Broadcasts every session state entered since the last call, in order,
    /// and the track listing if it changed since it was last published.
    fn publish_changes(&mut self) {
        for state in self.session.take_transitions() {
            if state != self.published_state {
                self.published_state = state.clone();
                self.broadcast_update(PlayerUpdate::StateChanged(state));
            }
        }
        let listing = self.session.track_listing();
        if listing != self.published_tracks {
            self.published_tracks = listing.clone();
            self.broadcast_update(PlayerUpdate::TracksChanged(listing));
        }
    }

    fn broadcast_playlist(&self) {
        self.broadcast_update(PlayerUpdate::PlaylistChanged {
            items: self.playlist.items().to_vec(),
            current_index: self.playlist.current_index(),
        });
    }

    /// Constructs the full current state object.
    fn get_full_state(&self) -> PlayerSnapshot {
        PlayerSnapshot {
            items: self.playlist.items().to_vec(),
            current_index: self.playlist.current_index(),
            state: self.session.state().clone(),
            progress: self.session.progress(),
            audio: self.session.audio_settings(),
            buffering: self.session.is_buffering(),
            tracks: self.session.track_listing(),
            collections: self.playlist.collection_names(),
        }
    }

    /// Runs the player's command processing loop. This should be spawned as a Tokio task.
    #[instrument(skip(self))]
    pub async fn run(&mut self) {
        run_loop::run_player_loop(self).await;
    }
}
