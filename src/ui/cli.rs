//! Command-line interface implementation

use clap::Parser;
use std::error::Error;
use std::path::PathBuf;

use crate::files::normalize_locator;
use crate::player::{PlayerCommand, PlayerSnapshot, PlayerUpdate};
use crate::playlist::MediaItem;
use crate::session::AudioSettings;
use crate::tracks::{TrackListing, TrackRef};

/// Seconds skipped by `ff` and `rew`.
pub const SEEK_STEP_SECONDS: f64 = 10.0;
/// Volume change of a single step.
pub const VOLUME_STEP: f64 = 0.1;

/// Command-line arguments for r-vidplay
#[derive(Parser, Debug)]
#[command(author, version, about = "Terminal video playlist player", long_about = None)]
pub struct Args {
    /// Video files to put on the playlist
    pub files: Vec<PathBuf>,

    /// Subtitle file for the first video (repeatable)
    #[arg(short, long = "subtitle")]
    pub subtitles: Vec<PathBuf>,

    /// Config file path
    #[arg(short, long, env = "VIDPLAY_CONFIG")]
    pub config: Option<PathBuf>,

    /// Initial volume (0.0 - 1.0)
    #[arg(long, env = "VIDPLAY_VOLUME")]
    pub volume: Option<f64>,

    /// Initial playback rate
    #[arg(long, env = "VIDPLAY_RATE")]
    pub rate: Option<f64>,

    /// Do not start playing the first video automatically
    #[arg(long)]
    pub no_autoplay: bool,
}

/// A line typed at the prompt.
#[derive(Debug, Clone, PartialEq)]
pub enum ReplCommand {
    Open(Vec<String>),
    Subtitles(Vec<String>),
    List,
    Play,
    Pause,
    Toggle,
    Next,
    Previous,
    /// Zero-based playlist index.
    Goto(usize),
    Select(String),
    Seek(f64),
    Forward,
    Rewind,
    Volume(f64),
    VolumeUp,
    VolumeDown,
    Mute,
    Rate(f64),
    Audio(usize),
    Subtitle(TrackRef),
    Tracks,
    CollectionNew(String),
    CollectionAdd { collection: String, item: String },
    CollectionShow(String),
    Find(String),
    State,
    Help,
    Quit,
}

impl ReplCommand {
    /// The player command for lines that need no answer from the player.
    pub fn to_player_command(&self) -> Option<PlayerCommand> {
        let command = match self {
            ReplCommand::Open(locators) => PlayerCommand::OpenFiles { locators: locators.clone() },
            ReplCommand::Subtitles(locators) => PlayerCommand::AddSubtitles { locators: locators.clone() },
            ReplCommand::Play => PlayerCommand::Play,
            ReplCommand::Pause => PlayerCommand::Pause,
            ReplCommand::Toggle => PlayerCommand::PlayPauseToggle,
            ReplCommand::Next => PlayerCommand::Next,
            ReplCommand::Previous => PlayerCommand::Previous,
            ReplCommand::Goto(index) => PlayerCommand::SelectIndex(*index),
            ReplCommand::Select(name) => PlayerCommand::SelectByName(name.clone()),
            ReplCommand::Seek(seconds) => PlayerCommand::SeekTo(*seconds),
            ReplCommand::Forward => PlayerCommand::SeekBy(SEEK_STEP_SECONDS),
            ReplCommand::Rewind => PlayerCommand::SeekBy(-SEEK_STEP_SECONDS),
            ReplCommand::Volume(volume) => PlayerCommand::SetVolume(*volume),
            ReplCommand::VolumeUp => PlayerCommand::AdjustVolume(VOLUME_STEP),
            ReplCommand::VolumeDown => PlayerCommand::AdjustVolume(-VOLUME_STEP),
            ReplCommand::Mute => PlayerCommand::ToggleMute,
            ReplCommand::Rate(rate) => PlayerCommand::SetPlaybackRate(*rate),
            ReplCommand::Audio(index) => PlayerCommand::SelectAudioTrack(*index),
            ReplCommand::Subtitle(reference) => PlayerCommand::SelectSubtitleTrack(*reference),
            ReplCommand::CollectionNew(name) => PlayerCommand::CreateCollection(name.clone()),
            ReplCommand::CollectionAdd { collection, item } => PlayerCommand::AssignToCollection {
                collection: collection.clone(),
                item_name: item.clone(),
            },
            _ => return None,
        };
        Some(command)
    }
}

/// Splits a line on whitespace, keeping double-quoted runs together.
fn tokenize(line: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut pending = false;
    for c in line.chars() {
        match c {
            '"' => {
                in_quotes = !in_quotes;
                pending = true;
            }
            c if c.is_whitespace() && !in_quotes => {
                if pending {
                    tokens.push(std::mem::take(&mut current));
                    pending = false;
                }
            }
            c => {
                current.push(c);
                pending = true;
            }
        }
    }
    if pending {
        tokens.push(current);
    }
    tokens
}

fn parse_number<T: std::str::FromStr>(value: Option<&String>, what: &str) -> Result<T, String> {
    let value = value.ok_or_else(|| format!("Missing {}", what))?;
    value.parse::<T>().map_err(|_| format!("Invalid {}: {}", what, value))
}

/// Parses one REPL line.
pub fn parse_command(line: &str) -> Result<ReplCommand, String> {
    let tokens = tokenize(line);
    let Some((head, rest)) = tokens.split_first() else {
        return Err("Empty command".to_string());
    };
    let rest_joined = rest.join(" ");
    let require_text = |what: &str| {
        if rest_joined.is_empty() {
            Err(format!("Missing {}", what))
        } else {
            Ok(rest_joined.clone())
        }
    };
    let require_paths = || {
        if rest.is_empty() {
            Err("Missing file paths".to_string())
        } else {
            Ok(rest.iter().map(|path| normalize_locator(path)).collect::<Vec<_>>())
        }
    };

    match head.to_lowercase().as_str() {
        "open" | "o" => require_paths().map(ReplCommand::Open),
        "sub" | "subs" => require_paths().map(ReplCommand::Subtitles),
        "list" | "ls" => Ok(ReplCommand::List),
        "play" => Ok(ReplCommand::Play),
        "pause" => Ok(ReplCommand::Pause),
        "toggle" | "t" => Ok(ReplCommand::Toggle),
        "next" | "n" => Ok(ReplCommand::Next),
        "prev" | "p" => Ok(ReplCommand::Previous),
        "goto" | "g" => {
            let number: usize = parse_number(rest.first(), "playlist number")?;
            if number == 0 {
                return Err("Playlist numbers start at 1".to_string());
            }
            Ok(ReplCommand::Goto(number - 1))
        }
        "select" => require_text("video name").map(ReplCommand::Select),
        "seek" => parse_number(rest.first(), "position").map(ReplCommand::Seek),
        "ff" => Ok(ReplCommand::Forward),
        "rew" => Ok(ReplCommand::Rewind),
        "vol" | "volume" => parse_number(rest.first(), "volume").map(ReplCommand::Volume),
        "vol+" | "+" => Ok(ReplCommand::VolumeUp),
        "vol-" | "-" => Ok(ReplCommand::VolumeDown),
        "mute" | "m" => Ok(ReplCommand::Mute),
        "rate" => parse_number(rest.first(), "rate").map(ReplCommand::Rate),
        "audio" => parse_number(rest.first(), "audio track").map(ReplCommand::Audio),
        "subtitle" | "s" => {
            let value = rest.first().ok_or_else(|| "Missing subtitle track".to_string())?;
            value.parse::<TrackRef>().map(ReplCommand::Subtitle)
        }
        "tracks" => Ok(ReplCommand::Tracks),
        "collection" | "c" => {
            let action = rest.first().map(|a| a.to_lowercase());
            let name = rest.get(1).cloned().ok_or_else(|| "Missing collection name".to_string());
            match action.as_deref() {
                Some("new") => name.map(ReplCommand::CollectionNew),
                Some("show") => name.map(ReplCommand::CollectionShow),
                Some("add") => {
                    let collection = name?;
                    let item = rest[2..].join(" ");
                    if item.is_empty() {
                        return Err("Missing video name".to_string());
                    }
                    Ok(ReplCommand::CollectionAdd { collection, item })
                }
                _ => Err("Usage: collection new|add|show <name> [video]".to_string()),
            }
        }
        "find" | "f" => require_text("search text").map(ReplCommand::Find),
        "state" => Ok(ReplCommand::State),
        "help" | "?" => Ok(ReplCommand::Help),
        "quit" | "q" | "exit" => Ok(ReplCommand::Quit),
        other => Err(format!("Unknown command: {}", other)),
    }
}

/// Formats seconds as `m:ss`.
pub fn format_time(seconds: f64) -> String {
    if !seconds.is_finite() || seconds < 0.0 {
        return "0:00".to_string();
    }
    let total = seconds.floor() as u64;
    format!("{}:{:02}", total / 60, total % 60)
}

fn format_audio(audio: &AudioSettings) -> String {
    let volume = if audio.muted {
        "muted".to_string()
    } else {
        format!("{:.0}%", audio.volume * 100.0)
    };
    format!("Volume {} | Rate {}x", volume, audio.playback_rate)
}

/// One-line rendering of a player update. Progress ticks are not printed.
pub fn format_update(update: &PlayerUpdate) -> Option<String> {
    match update {
        PlayerUpdate::PlaylistChanged { items, .. } => Some(format!("Playlist: {} videos", items.len())),
        PlayerUpdate::SelectionChanged { index, item } => Some(format!("Now loading [{}] {}", index + 1, item.display_name)),
        PlayerUpdate::StateChanged(state) => Some(format!("State: {}", state)),
        PlayerUpdate::TracksChanged(listing) => {
            let current = listing
                .subtitles
                .iter()
                .find(|entry| entry.reference == listing.current_subtitle)
                .map(|entry| entry.descriptor.label.as_str())
                .unwrap_or("off");
            Some(format!(
                "Tracks: {} audio, {} subtitles (subtitle: {})",
                listing.audio.len(),
                listing.subtitles.len(),
                current
            ))
        }
        PlayerUpdate::Progress(_) => None,
        PlayerUpdate::Buffering(true) => Some("Buffering...".to_string()),
        PlayerUpdate::Buffering(false) => None,
        PlayerUpdate::AudioChanged(audio) => Some(format_audio(audio)),
        PlayerUpdate::CollectionsChanged(names) => Some(format!("Collections: {}", names.join(", "))),
        PlayerUpdate::Info(message) => Some(message.clone()),
        PlayerUpdate::Error(e) => Some(format!("Error: {}", e)),
    }
}

/// CLI user interface for interacting with the application
pub struct Cli {
    pub args: Args,
}

impl Cli {
    /// Create a new CLI instance
    pub fn new() -> Self {
        Cli {
            args: Args::parse(),
        }
    }

    /// Locators of the files given on the command line, videos and subtitles.
    pub fn initial_locators(&self) -> (Vec<String>, Vec<String>) {
        let to_locators = |paths: &[PathBuf]| {
            paths
                .iter()
                .map(|path| normalize_locator(&path.to_string_lossy()))
                .collect::<Vec<_>>()
        };
        (to_locators(&self.args.files), to_locators(&self.args.subtitles))
    }

    /// Display the playlist, marking the current item
    pub fn display_playlist(&self, items: &[MediaItem], current: Option<usize>) {
        if items.is_empty() {
            println!("Playlist is empty.");
            return;
        }
        println!("\nPlaylist:");
        println!("{:<3} {:<5} {}", "", "#", "Name");
        println!("{}", "-".repeat(60));
        for (index, item) in items.iter().enumerate() {
            let marker = if Some(index) == current { ">" } else { "" };
            let name = if item.display_name.len() > 50 {
                format!("{:.47}...", item.display_name)
            } else {
                item.display_name.clone()
            };
            println!("{:<3} {:<5} {}", marker, index + 1, name);
        }
        println!();
    }

    /// Display audio and subtitle tracks with the references `audio` and
    /// `subtitle` accept
    pub fn display_tracks(&self, listing: &TrackListing) {
        println!("\nAudio tracks:");
        for (index, track) in listing.audio.iter().enumerate() {
            let marker = if index == listing.current_audio { "*" } else { " " };
            println!(" {} {:<6} {} ({})", marker, index, track.label, track.language);
        }
        println!("Subtitle tracks:");
        let off_marker = if listing.current_subtitle == TrackRef::Off { "*" } else { " " };
        println!(" {} {:<6} Off", off_marker, "off");
        for entry in &listing.subtitles {
            let marker = if entry.reference == listing.current_subtitle { "*" } else { " " };
            println!(" {} {:<6} {}", marker, entry.reference.to_string(), entry.descriptor.label);
        }
        println!();
    }

    /// Display the full player state
    pub fn display_snapshot(&self, snapshot: &PlayerSnapshot) {
        let current = snapshot
            .current_index
            .and_then(|index| snapshot.items.get(index))
            .map(|item| item.display_name.as_str())
            .unwrap_or("-");
        println!("\nNow: {} [{}]", current, snapshot.state);
        println!(
            "Time: {} / {}{}",
            format_time(snapshot.progress.current_time),
            format_time(snapshot.progress.duration.unwrap_or(0.0)),
            if snapshot.buffering { " (buffering)" } else { "" }
        );
        println!("{}", format_audio(&snapshot.audio));
        if !snapshot.collections.is_empty() {
            println!("Collections: {}", snapshot.collections.join(", "));
        }
    }

    /// Display a list of matching items
    pub fn display_matches(&self, title: &str, items: &[MediaItem]) {
        println!("\n{} ({} matches):", title, items.len());
        for item in items {
            println!("  {}", item.display_name);
        }
    }

    pub fn display_update(&self, update: &PlayerUpdate) {
        if let Some(line) = format_update(update) {
            println!("{}", line);
        }
    }

    pub fn display_help(&self) {
        println!(
            "Commands: open <paths..>, sub <paths..>, list, play, pause, toggle, next, prev, goto <n>, \
             select <name>, seek <sec>, ff, rew, vol <0-1>, vol+, vol-, mute, rate <r>, audio <n>, \
             subtitle <n|ext:n|off>, tracks, collection new|add|show <name> [video], find <text>, state, quit"
        );
    }

    /// Display error messages
    pub fn display_error(&self, error: &dyn Error) {
        eprintln!("Error: {}", error);
    }
}
