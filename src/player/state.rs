use tokio::sync::oneshot;

use crate::engine::LoadGeneration;
use crate::player::error::PlayerError;
use crate::playlist::MediaItem;
use crate::session::{ActivationTicket, AudioSettings, PlaybackProgress, SessionState};
use crate::subtitles::SubtitleCandidate;
use crate::tracks::{TrackListing, TrackRef};

/// Commands that can be sent to the Player task.
#[derive(Debug)]
pub enum PlayerCommand {
    /// Files picked by the user. Videos are enqueued, subtitle files are
    /// attached to the current video.
    OpenFiles { locators: Vec<String> },
    AddSubtitles { locators: Vec<String> },
    Play,
    Pause,
    PlayPauseToggle,
    Next,
    Previous,
    SelectIndex(usize),
    SelectByName(String),
    SeekTo(f64),
    SeekBy(f64),
    SetVolume(f64),
    AdjustVolume(f64),
    ToggleMute,
    SetPlaybackRate(f64),
    SelectAudioTrack(usize),
    SelectSubtitleTrack(TrackRef),
    CreateCollection(String),
    AssignToCollection { collection: String, item_name: String },
    FilterByCollection(String, oneshot::Sender<Vec<MediaItem>>),
    FilterByText(String, oneshot::Sender<Vec<MediaItem>>),
    GetFullState(oneshot::Sender<PlayerSnapshot>),
    /// Result of a sidecar lookup started when a load became ready.
    SidecarResolved { generation: LoadGeneration, candidates: Vec<SubtitleCandidate> },
    /// Grace period of an external subtitle activation elapsed.
    ConfirmSubtitleActivation(ActivationTicket),
    Shutdown,
}

/// Full state of the player, answered to `GetFullState`.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerSnapshot {
    pub items: Vec<MediaItem>,
    pub current_index: Option<usize>,
    pub state: SessionState,
    pub progress: PlaybackProgress,
    pub audio: AudioSettings,
    pub buffering: bool,
    pub tracks: TrackListing,
    pub collections: Vec<String>,
}

/// Updates broadcast by the Player task about its state changes.
#[derive(Debug, Clone, PartialEq)]
pub enum PlayerUpdate {
    PlaylistChanged { items: Vec<MediaItem>, current_index: Option<usize> },
    SelectionChanged { index: usize, item: MediaItem },
    StateChanged(SessionState),
    TracksChanged(TrackListing),
    Progress(PlaybackProgress),
    Buffering(bool),
    AudioChanged(AudioSettings),
    CollectionsChanged(Vec<String>),
    /// Non-fatal notice, such as a skipped file.
    Info(String),
    Error(PlayerError),
}
