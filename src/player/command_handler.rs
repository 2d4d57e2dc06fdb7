use tracing::{debug, info, instrument, trace, warn};

use super::{load_starter, subtitle_tasks, Player, PlayerUpdate, PLAYER_LOG_TARGET};
use crate::engine::{EngineError, EngineNotification, LoadGeneration};
use crate::files::{display_name, inspect_selection};
use crate::playlist::MediaItem;
use crate::session::{ActivationTicket, EngineOutcome};
use crate::subtitles::SubtitleCandidate;
use crate::tracks::{ActivationStatus, TrackRef};

#[instrument(skip(player, locators), fields(file_count = locators.len()))]
pub async fn handle_open_files(player: &mut Player, locators: Vec<String>) {
    if locators.is_empty() {
        return;
    }
    let selection = inspect_selection(player.file_info.as_ref(), &locators).await;
    info!(target: PLAYER_LOG_TARGET, "Found {} videos and {} subtitle files", selection.videos.len(), selection.subtitles.len());
    report_rejected(player, &selection.rejected);

    if !selection.videos.is_empty() {
        let mut newly_selected = None;
        for info in selection.videos {
            if let Some(index) = player.playlist.enqueue(MediaItem::new(info.locator, info.name)) {
                newly_selected = Some(index);
            }
        }
        player.broadcast_playlist();
        if newly_selected.is_some() {
            load_starter::start_current_item(player, false);
        }
    }

    // Videos first, so the subtitles land on the item that is now loading.
    if !selection.subtitles.is_empty() {
        let candidates = selection
            .subtitles
            .into_iter()
            .map(|info| SubtitleCandidate { locator: info.locator, label: info.name })
            .collect();
        register_for_current_item(player, candidates);
    }
}

#[instrument(skip(player, locators), fields(file_count = locators.len()))]
pub async fn handle_add_subtitles(player: &mut Player, locators: Vec<String>) {
    let ingest = player.resolver.ingest_user_supplied_subtitles(&locators).await;
    report_rejected(player, &ingest.rejected);
    if !ingest.accepted.is_empty() {
        register_for_current_item(player, ingest.accepted);
    }
}

fn report_rejected(player: &Player, rejected: &[(String, String)]) {
    for (locator, reason) in rejected {
        player.broadcast_update(PlayerUpdate::Info(format!("Skipped {}: {}", display_name(locator), reason)));
    }
}

fn register_for_current_item(player: &mut Player, candidates: Vec<SubtitleCandidate>) {
    if player.session.current_item().is_none() {
        warn!(target: PLAYER_LOG_TARGET, "No video loaded, ignoring {} subtitle files.", candidates.len());
        player.broadcast_update(PlayerUpdate::Info("Load a video before adding subtitles".to_string()));
        return;
    }
    let generation = player.session.generation();
    register_subtitles(player, generation, &candidates);
}

fn register_subtitles(player: &mut Player, generation: LoadGeneration, candidates: &[SubtitleCandidate]) {
    let Some(registration) = player.session.register_external_subtitles(generation, candidates) else {
        return;
    };
    debug!(target: PLAYER_LOG_TARGET, "Registered {} external subtitles.", registration.added);
    for failure in registration.failures {
        player.broadcast_error(failure);
    }
    if let Some(ticket) = registration.activation {
        subtitle_tasks::schedule_activation(player, ticket);
    }
}

#[instrument(skip(player, candidates), fields(candidate_count = candidates.len()))]
pub fn handle_sidecar_resolved(player: &mut Player, generation: LoadGeneration, candidates: Vec<SubtitleCandidate>) {
    if candidates.is_empty() {
        return;
    }
    register_subtitles(player, generation, &candidates);
}

#[instrument(skip(player))]
pub fn handle_confirm_activation(player: &mut Player, ticket: ActivationTicket) {
    match player.session.confirm_external_activation(ticket) {
        ActivationStatus::Activated => {}
        ActivationStatus::Retry(activation) => {
            subtitle_tasks::schedule_activation(player, ActivationTicket { activation, ..ticket });
        }
        ActivationStatus::Superseded => {
            trace!(target: PLAYER_LOG_TARGET, "Subtitle activation superseded.");
        }
    }
}

#[instrument(skip(player))]
pub async fn handle_play(player: &mut Player) {
    if player.session.current_item().is_none() {
        if player.playlist.current().is_some() {
            load_starter::start_current_item(player, true);
        } else {
            warn!(target: PLAYER_LOG_TARGET, "Play: playlist is empty.");
        }
        return;
    }
    if let Err(e) = player.session.play().await {
        player.broadcast_error(e);
    }
}

#[instrument(skip(player))]
pub fn handle_pause(player: &mut Player) {
    player.session.pause();
}

#[instrument(skip(player))]
pub async fn handle_play_pause_toggle(player: &mut Player) {
    if player.session.current_item().is_none() {
        handle_play(player).await;
        return;
    }
    if let Err(e) = player.session.toggle().await {
        player.broadcast_error(e);
    }
}

#[instrument(skip(player))]
pub fn handle_step(player: &mut Player, delta: isize) {
    let resume = load_starter::should_resume(player);
    match player.playlist.step(delta) {
        Some(index) => {
            info!(target: PLAYER_LOG_TARGET, "Moving to playlist index {}.", index);
            load_starter::start_current_item(player, resume);
        }
        None => info!(target: PLAYER_LOG_TARGET, "Already at the edge of the playlist."),
    }
}

#[instrument(skip(player))]
pub fn handle_select_index(player: &mut Player, index: usize) {
    let resume = load_starter::should_resume(player);
    match player.playlist.select_index(index) {
        Ok(_) => load_starter::start_current_item(player, resume),
        Err(e) => player.broadcast_error(e),
    }
}

#[instrument(skip(player))]
pub fn handle_select_by_name(player: &mut Player, name: String) {
    let resume = load_starter::should_resume(player);
    match player.playlist.select_by_name(&name) {
        Ok(_) => load_starter::start_current_item(player, resume),
        Err(e) => player.broadcast_error(e),
    }
}

pub fn handle_seek(player: &mut Player, target: SeekTarget) {
    let applied = match target {
        SeekTarget::Absolute(seconds) => player.session.seek_to(seconds),
        SeekTarget::Relative(delta) => player.session.seek_by(delta),
    };
    if applied {
        player.broadcast_update(PlayerUpdate::Progress(player.session.progress()));
    }
}

#[derive(Debug, Clone, Copy)]
pub enum SeekTarget {
    Absolute(f64),
    Relative(f64),
}

pub fn handle_audio_change(player: &mut Player, change: AudioChange) {
    let settings = match change {
        AudioChange::Volume(volume) => player.session.set_volume(volume),
        AudioChange::AdjustVolume(delta) => player.session.adjust_volume(delta),
        AudioChange::ToggleMute => player.session.toggle_mute(),
        AudioChange::Rate(rate) => player.session.set_playback_rate(rate),
    };
    player.broadcast_update(PlayerUpdate::AudioChanged(settings));
}

#[derive(Debug, Clone, Copy)]
pub enum AudioChange {
    Volume(f64),
    AdjustVolume(f64),
    ToggleMute,
    Rate(f64),
}

#[instrument(skip(player))]
pub fn handle_select_audio_track(player: &mut Player, index: usize) {
    if let Err(e) = player.session.select_audio_track(index) {
        player.broadcast_error(e);
    }
}

#[instrument(skip(player))]
pub fn handle_select_subtitle_track(player: &mut Player, reference: TrackRef) {
    match player.session.select_subtitle_track(reference) {
        Ok(Some(ticket)) => subtitle_tasks::schedule_activation(player, ticket),
        Ok(None) => {}
        Err(e) => player.broadcast_error(e),
    }
}

#[instrument(skip(player))]
pub fn handle_create_collection(player: &mut Player, name: String) {
    match player.playlist.create_collection(&name) {
        Ok(()) => player.broadcast_update(PlayerUpdate::CollectionsChanged(player.playlist.collection_names())),
        Err(e) => player.broadcast_error(e),
    }
}

#[instrument(skip(player))]
pub fn handle_assign_to_collection(player: &mut Player, collection: String, item_name: String) {
    match player.playlist.assign_to_collection(&collection, &item_name) {
        Ok(()) => player.broadcast_update(PlayerUpdate::Info(format!("Added {} to {}", item_name, collection))),
        Err(e) => player.broadcast_error(e),
    }
}

/// Applies an engine notification and reacts to the outcome.
pub async fn handle_engine_notification(player: &mut Player, notification: EngineNotification) {
    match player.session.handle_engine_notification(notification) {
        EngineOutcome::Stale | EngineOutcome::Ignored => {}
        EngineOutcome::Ready { sidecar, resume } => {
            subtitle_tasks::spawn_sidecar_lookup(player, sidecar);
            if resume {
                if let Err(e) = player.session.play().await {
                    player.broadcast_error(e);
                }
            }
        }
        EngineOutcome::Progress(progress) => player.broadcast_update(PlayerUpdate::Progress(progress)),
        EngineOutcome::BufferingChanged(buffering) => player.broadcast_update(PlayerUpdate::Buffering(buffering)),
        EngineOutcome::Ended => handle_ended(player),
        EngineOutcome::Failed(detail) => player.broadcast_error(EngineError::Failed(detail)),
    }
}

#[instrument(skip(player))]
fn handle_ended(player: &mut Player) {
    if player.auto_advance && player.playlist.has_next() {
        if let Some(index) = player.playlist.step(1) {
            info!(target: PLAYER_LOG_TARGET, "Video ended, advancing to index {}.", index);
            load_starter::start_current_item(player, true);
        }
    } else {
        info!(target: PLAYER_LOG_TARGET, "Video ended, end of playlist reached.");
    }
}
