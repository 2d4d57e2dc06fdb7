use tokio::time::sleep;
use tracing::{debug, error, trace};

use crate::player::{Player, PlayerCommand, PLAYER_LOG_TARGET};
use crate::session::{ActivationTicket, SidecarRequest};

/// Looks up sidecar subtitles in the background. The result comes back to the
/// run loop as [`PlayerCommand::SidecarResolved`].
pub fn spawn_sidecar_lookup(player: &Player, request: SidecarRequest) {
    let resolver = player.resolver.clone();
    let tx = player.internal_command_tx.clone();
    tokio::spawn(async move {
        let candidates = resolver.find_sidecar_subtitles(&request.item).await;
        debug!(target: PLAYER_LOG_TARGET, generation = %request.generation, "Sidecar lookup finished with {} candidates.", candidates.len());
        let command = PlayerCommand::SidecarResolved { generation: request.generation, candidates };
        if let Err(e) = tx.send(command).await {
            error!(target: PLAYER_LOG_TARGET, "Failed to deliver sidecar lookup result: {}", e);
        }
    });
}

/// Asks the run loop to confirm an external subtitle once the grace period
/// has elapsed.
pub fn schedule_activation(player: &Player, ticket: ActivationTicket) {
    let grace = player.activation_grace;
    let tx = player.internal_command_tx.clone();
    trace!(target: PLAYER_LOG_TARGET, attempt = ticket.activation.attempt, "Scheduling subtitle activation in {:?}.", grace);
    tokio::spawn(async move {
        sleep(grace).await;
        if let Err(e) = tx.send(PlayerCommand::ConfirmSubtitleActivation(ticket)).await {
            debug!(target: PLAYER_LOG_TARGET, "Subtitle activation dropped: {}", e);
        }
    });
}
