use tracing::{error, info, instrument, warn};

use crate::player::{Player, PlayerUpdate, PLAYER_LOG_TARGET};

/// Loads the playlist's current item into the session.
///
/// With `resume` set, playback starts once the new media is ready.
#[instrument(skip(player), fields(index = ?player.playlist.current_index()))]
pub fn start_current_item(player: &mut Player, resume: bool) {
    let (Some(index), Some(item)) = (player.playlist.current_index(), player.playlist.current().cloned()) else {
        warn!(target: PLAYER_LOG_TARGET, "No current playlist item to load.");
        return;
    };
    info!(target: PLAYER_LOG_TARGET, "Preparing to play item {}: {}", index, item.display_name);
    player.broadcast_update(PlayerUpdate::SelectionChanged { index, item: item.clone() });

    if let Err(e) = player.session.select(item, resume) {
        error!(target: PLAYER_LOG_TARGET, "Failed to start loading item {}: {}", index, e);
        player.broadcast_error(e);
    }
}

/// Whether playback should carry over to the next selected item.
pub fn should_resume(player: &Player) -> bool {
    player.session.state() == &crate::session::SessionState::Playing || player.session.resume_pending()
}
