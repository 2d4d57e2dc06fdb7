use super::command_handler::{self, AudioChange, SeekTarget};
use super::{Player, PlayerCommand, PLAYER_LOG_TARGET};
use tracing::{info, trace};

/// Runs the player's command processing loop.
///
/// This loop is the only place where playlist, session and track state is
/// mutated. Spawned work (sidecar lookups, subtitle activation delays) reports
/// back through the internal command sender.
pub async fn run_player_loop(player: &mut Player) {
    info!(target: PLAYER_LOG_TARGET, "Player run loop started.");

    loop {
        tokio::select! {
            biased; // Check commands first

            Some(command) = player.command_rx.recv() => {
                trace!(target: PLAYER_LOG_TARGET, "Received command: {:?}", command);
                match command {
                    PlayerCommand::OpenFiles { locators } => command_handler::handle_open_files(player, locators).await,
                    PlayerCommand::AddSubtitles { locators } => command_handler::handle_add_subtitles(player, locators).await,
                    PlayerCommand::Play => command_handler::handle_play(player).await,
                    PlayerCommand::Pause => command_handler::handle_pause(player),
                    PlayerCommand::PlayPauseToggle => command_handler::handle_play_pause_toggle(player).await,
                    PlayerCommand::Next => command_handler::handle_step(player, 1),
                    PlayerCommand::Previous => command_handler::handle_step(player, -1),
                    PlayerCommand::SelectIndex(index) => command_handler::handle_select_index(player, index),
                    PlayerCommand::SelectByName(name) => command_handler::handle_select_by_name(player, name),
                    PlayerCommand::SeekTo(seconds) => command_handler::handle_seek(player, SeekTarget::Absolute(seconds)),
                    PlayerCommand::SeekBy(delta) => command_handler::handle_seek(player, SeekTarget::Relative(delta)),
                    PlayerCommand::SetVolume(volume) => command_handler::handle_audio_change(player, AudioChange::Volume(volume)),
                    PlayerCommand::AdjustVolume(delta) => command_handler::handle_audio_change(player, AudioChange::AdjustVolume(delta)),
                    PlayerCommand::ToggleMute => command_handler::handle_audio_change(player, AudioChange::ToggleMute),
                    PlayerCommand::SetPlaybackRate(rate) => command_handler::handle_audio_change(player, AudioChange::Rate(rate)),
                    PlayerCommand::SelectAudioTrack(index) => command_handler::handle_select_audio_track(player, index),
                    PlayerCommand::SelectSubtitleTrack(reference) => command_handler::handle_select_subtitle_track(player, reference),
                    PlayerCommand::CreateCollection(name) => command_handler::handle_create_collection(player, name),
                    PlayerCommand::AssignToCollection { collection, item_name } => {
                        command_handler::handle_assign_to_collection(player, collection, item_name)
                    }
                    PlayerCommand::FilterByCollection(name, responder) => {
                        let _ = responder.send(player.playlist.filter_by_collection(&name)); // Ignore error if receiver dropped
                    }
                    PlayerCommand::FilterByText(text, responder) => {
                        let _ = responder.send(player.playlist.filter_by_text(&text));
                    }
                    PlayerCommand::GetFullState(responder) => {
                        let _ = responder.send(player.get_full_state());
                    }
                    PlayerCommand::SidecarResolved { generation, candidates } => {
                        command_handler::handle_sidecar_resolved(player, generation, candidates)
                    }
                    PlayerCommand::ConfirmSubtitleActivation(ticket) => command_handler::handle_confirm_activation(player, ticket),
                    PlayerCommand::Shutdown => {
                        info!(target: PLAYER_LOG_TARGET, "Shutdown command received. Exiting run loop.");
                        break;
                    }
                }
            }

            Some(notification) = player.engine_rx.recv() => {
                trace!(target: PLAYER_LOG_TARGET, "Engine notification: {:?}", notification);
                command_handler::handle_engine_notification(player, notification).await;
            }

            else => {
                info!(target: PLAYER_LOG_TARGET, "Command and engine channels closed. Exiting run loop.");
                break;
            }
        }
        player.publish_changes();
    }

    info!(target: PLAYER_LOG_TARGET, "Player run loop finished.");
}
