//! Integration tests for the player task
//!
//! These tests drive a running player through its command channel and
//! observe it through the broadcast updates and state snapshots.

use crate::test_utils::{dual_audio_profile, subtitled_profile, TestPlayer};
use r_vidplay::engine::{EngineError, MediaProfile};
use r_vidplay::player::{PlayerCommand, PlayerError, PlayerUpdate};
use r_vidplay::playlist::PlaylistError;
use r_vidplay::session::SessionState;
use r_vidplay::tracks::{TrackError, TrackRef};
use tokio::sync::oneshot;

#[cfg(test)]
mod player_integration_tests {
    use super::*;

    fn is_state(update: &PlayerUpdate, expected: SessionState) -> bool {
        matches!(update, PlayerUpdate::StateChanged(state) if *state == expected)
    }

    async fn states_until_playing(player: &mut TestPlayer) -> Vec<SessionState> {
        let mut states = Vec::new();
        while states.last() != Some(&SessionState::Playing) {
            if let PlayerUpdate::StateChanged(state) = player.wait_for(|u| matches!(u, PlayerUpdate::StateChanged(_))).await {
                states.push(state);
            }
        }
        states
    }

    #[tokio::test]
    async fn test_open_files_selects_first_video() {
        let mut player = TestPlayer::start(
            &[("a.mp4", dual_audio_profile(90.0)), ("b.mkv", MediaProfile::default())],
            &["notes.txt"],
        );

        player.open(&["a.mp4", "b.mkv", "notes.txt"]).await;

        let update = player.wait_for(|u| matches!(u, PlayerUpdate::PlaylistChanged { .. })).await;
        let PlayerUpdate::PlaylistChanged { items, current_index } = update else { unreachable!() };
        assert_eq!(items.len(), 2);
        assert_eq!(current_index, Some(0));
        player.wait_for(|u| is_state(u, SessionState::Ready)).await;

        let snapshot = player.snapshot().await;
        assert_eq!(snapshot.items[0].display_name, "a.mp4");
        assert_eq!(snapshot.progress.duration, Some(90.0));
        assert_eq!(snapshot.tracks.audio.len(), 2);
        assert_eq!(player.engine.loaded_locator(), Some(player.locator("a.mp4")));

        player.shutdown().await;
    }

    #[tokio::test]
    async fn test_unsupported_files_are_reported() {
        let mut player = TestPlayer::start(&[], &["notes.txt"]);

        player.open(&["notes.txt", "missing.mp4"]).await;

        player.wait_for(|u| matches!(u, PlayerUpdate::Info(m) if m.starts_with("Skipped notes.txt"))).await;
        player.wait_for(|u| matches!(u, PlayerUpdate::Info(m) if m.starts_with("Skipped missing.mp4"))).await;
        let snapshot = player.snapshot().await;
        assert!(snapshot.items.is_empty());
        assert_eq!(snapshot.state, SessionState::Idle);

        player.shutdown().await;
    }

    #[tokio::test]
    async fn test_opening_a_file_twice_keeps_one_entry() {
        let mut player = TestPlayer::start(&[("a.mp4", dual_audio_profile(30.0))], &[]);

        player.open(&["a.mp4"]).await;
        player.wait_for(|u| is_state(u, SessionState::Ready)).await;
        player.open(&["a.mp4", "a.mp4"]).await;

        let snapshot = player.snapshot().await;
        assert_eq!(snapshot.items.len(), 1);
        assert_eq!(snapshot.current_index, Some(0));
        assert_eq!(snapshot.state, SessionState::Ready);

        player.shutdown().await;
    }

    #[tokio::test]
    async fn test_play_next_and_auto_advance() {
        let mut player = TestPlayer::start(
            &[("a.mp4", dual_audio_profile(30.0)), ("b.mp4", dual_audio_profile(40.0)), ("c.mp4", dual_audio_profile(50.0))],
            &[],
        );
        player.open(&["a.mp4", "b.mp4", "c.mp4"]).await;
        player.send(PlayerCommand::Play).await;
        player.wait_for(|u| is_state(u, SessionState::Playing)).await;

        // Playback carries over to the next video.
        player.send(PlayerCommand::Next).await;
        player.wait_for(|u| matches!(u, PlayerUpdate::SelectionChanged { index: 1, .. })).await;
        player.wait_for(|u| is_state(u, SessionState::Playing)).await;

        player.engine.finish();
        player.wait_for(|u| matches!(u, PlayerUpdate::SelectionChanged { index: 2, .. })).await;
        player.wait_for(|u| is_state(u, SessionState::Playing)).await;
        assert_eq!(player.engine.loaded_locator(), Some(player.locator("c.mp4")));

        // Last item: stays ended.
        player.engine.finish();
        player.wait_for(|u| is_state(u, SessionState::Ended)).await;
        player.send(PlayerCommand::Next).await;
        let snapshot = player.snapshot().await;
        assert_eq!(snapshot.current_index, Some(2));
        assert_eq!(snapshot.state, SessionState::Ended);

        player.shutdown().await;
    }

    #[tokio::test]
    async fn test_every_state_transition_is_published() {
        let mut player = TestPlayer::start(&[("a.mp4", dual_audio_profile(30.0)), ("b.mp4", dual_audio_profile(30.0))], &[]);
        player.open(&["a.mp4", "b.mp4"]).await;
        player.send(PlayerCommand::Play).await;
        let states = states_until_playing(&mut player).await;
        assert_eq!(states, vec![SessionState::Loading, SessionState::Ready, SessionState::Playing]);

        player.engine.finish();
        let states = states_until_playing(&mut player).await;
        assert_eq!(
            states,
            vec![SessionState::Ended, SessionState::Loading, SessionState::Ready, SessionState::Playing]
        );

        player.shutdown().await;
    }

    #[tokio::test]
    async fn test_rejected_play_is_reported_and_paused() {
        let mut player = TestPlayer::start(&[("a.mp4", dual_audio_profile(30.0))], &[]);
        player.engine.reject_play(Some("autoplay blocked"));
        player.open(&["a.mp4"]).await;
        player.wait_for(|u| is_state(u, SessionState::Ready)).await;

        player.send(PlayerCommand::Play).await;

        let update = player.wait_for(|u| matches!(u, PlayerUpdate::Error(_))).await;
        assert_eq!(update, PlayerUpdate::Error(PlayerError::EngineRejected("autoplay blocked".to_string())));
        player.wait_for(|u| is_state(u, SessionState::Paused)).await;

        player.shutdown().await;
    }

    #[tokio::test]
    async fn test_engine_failure_recovers_on_next_selection() {
        let mut player = TestPlayer::start(&[("a.mp4", dual_audio_profile(30.0)), ("b.mp4", dual_audio_profile(30.0))], &[]);
        player.open(&["a.mp4", "b.mp4"]).await;
        player.wait_for(|u| is_state(u, SessionState::Ready)).await;

        player.engine.fail("unsupported codec");

        let update = player.wait_for(|u| matches!(u, PlayerUpdate::Error(_))).await;
        assert_eq!(
            update,
            PlayerUpdate::Error(PlayerError::Engine(EngineError::Failed("unsupported codec".to_string())))
        );
        player.wait_for(|u| is_state(u, SessionState::Error("unsupported codec".to_string()))).await;

        player.send(PlayerCommand::Next).await;
        player.wait_for(|u| is_state(u, SessionState::Ready)).await;

        player.shutdown().await;
    }

    #[tokio::test]
    async fn test_track_selection_errors_are_reported() {
        let mut player = TestPlayer::start(&[("a.mp4", subtitled_profile(30.0))], &[]);
        player.open(&["a.mp4"]).await;
        player.wait_for(|u| is_state(u, SessionState::Ready)).await;

        player.send(PlayerCommand::SelectAudioTrack(4)).await;
        let update = player.wait_for(|u| matches!(u, PlayerUpdate::Error(_))).await;
        assert_eq!(
            update,
            PlayerUpdate::Error(PlayerError::Track(TrackError::AudioIndexOutOfRange { index: 4, available: 1 }))
        );

        player.send(PlayerCommand::SelectSubtitleTrack(TrackRef::External(0))).await;
        let update = player.wait_for(|u| matches!(u, PlayerUpdate::Error(_))).await;
        assert!(matches!(update, PlayerUpdate::Error(PlayerError::Track(e)) if e.is_index_out_of_range()));

        let snapshot = player.snapshot().await;
        assert_eq!(snapshot.tracks.current_subtitle, TrackRef::Native(0));

        player.send(PlayerCommand::SelectSubtitleTrack(TrackRef::Off)).await;
        let snapshot = player.snapshot().await;
        assert_eq!(snapshot.tracks.current_subtitle, TrackRef::Off);
        assert_eq!(player.engine.showing_subtitle_count(), 0);

        player.shutdown().await;
    }

    #[tokio::test]
    async fn test_collections_and_filters() {
        let mut player = TestPlayer::start(
            &[("Holiday.mp4", MediaProfile::default()), ("Work.mkv", MediaProfile::default())],
            &[],
        );
        player.open(&["Holiday.mp4", "Work.mkv"]).await;

        player.send(PlayerCommand::CreateCollection("Favs".to_string())).await;
        let update = player.wait_for(|u| matches!(u, PlayerUpdate::CollectionsChanged(_))).await;
        assert_eq!(update, PlayerUpdate::CollectionsChanged(vec!["Favs".to_string()]));

        player.send(PlayerCommand::CreateCollection("Favs".to_string())).await;
        let update = player.wait_for(|u| matches!(u, PlayerUpdate::Error(_))).await;
        assert_eq!(
            update,
            PlayerUpdate::Error(PlayerError::Playlist(PlaylistError::DuplicateName("Favs".to_string())))
        );

        player
            .send(PlayerCommand::AssignToCollection { collection: "Favs".to_string(), item_name: "holiday.mp4".to_string() })
            .await;
        let (tx, rx) = oneshot::channel();
        player.send(PlayerCommand::FilterByCollection("Favs".to_string(), tx)).await;
        let favourites = rx.await.unwrap();
        assert_eq!(favourites.len(), 1);
        assert_eq!(favourites[0].display_name, "Holiday.mp4");

        let (tx, rx) = oneshot::channel();
        player.send(PlayerCommand::FilterByText("WORK".to_string(), tx)).await;
        assert_eq!(rx.await.unwrap()[0].display_name, "Work.mkv");

        let snapshot = player.snapshot().await;
        assert_eq!(snapshot.collections, vec!["Favs".to_string()]);

        player.shutdown().await;
    }

    #[tokio::test]
    async fn test_volume_and_rate_updates() {
        let mut player = TestPlayer::start(&[("a.mp4", dual_audio_profile(30.0))], &[]);

        player.send(PlayerCommand::SetVolume(3.0)).await;
        let update = player.wait_for(|u| matches!(u, PlayerUpdate::AudioChanged(_))).await;
        let PlayerUpdate::AudioChanged(audio) = update else { unreachable!() };
        assert_eq!(audio.volume, 1.0);

        player.send(PlayerCommand::ToggleMute).await;
        player.send(PlayerCommand::SetPlaybackRate(0.5)).await;
        let snapshot = player.snapshot().await;
        assert!(snapshot.audio.muted);
        assert_eq!(snapshot.audio.playback_rate, 0.5);
        assert!(player.engine.is_muted());

        player.shutdown().await;
    }

    #[tokio::test]
    async fn test_seek_requires_loaded_media() {
        let mut player = TestPlayer::start(&[("a.mp4", dual_audio_profile(100.0))], &[]);

        player.send(PlayerCommand::SeekTo(10.0)).await;
        player.open(&["a.mp4"]).await;
        player.wait_for(|u| is_state(u, SessionState::Ready)).await;
        assert_eq!(player.snapshot().await.progress.current_time, 0.0);

        player.send(PlayerCommand::SeekTo(40.0)).await;
        player.send(PlayerCommand::SeekBy(10.0)).await;
        player.send(PlayerCommand::SeekBy(-100.0)).await;
        player.send(PlayerCommand::SeekBy(25.0)).await;
        let snapshot = player.snapshot().await;
        assert_eq!(snapshot.progress.current_time, 25.0);

        player.shutdown().await;
    }
}
