//! Integration tests for subtitle discovery and activation
//!
//! Covers sidecar lookup after a load, user supplied subtitle files and the
//! deferred activation of external tracks.

use crate::test_utils::{dual_audio_profile, subtitled_profile, TestPlayer};
use async_trait::async_trait;
use r_vidplay::engine::{EngineEvent, MediaProfile, NativeAudioTrack, NativeTextTrack, TextTrackMode};
use r_vidplay::files::CollaboratorError;
use r_vidplay::player::{PlayerCommand, PlayerUpdate};
use r_vidplay::session::SessionState;
use r_vidplay::subtitles::{SidecarLookup, SubtitleCandidate};
use r_vidplay::tracks::{SubtitleOrigin, TrackRef};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// Lookup that answers slowly with one `{base}.srt` candidate.
struct SlowLookup {
    delay: Duration,
}

#[async_trait]
impl SidecarLookup for SlowLookup {
    async fn find(&self, _video_dir: Option<&Path>, base: &str) -> Result<Vec<SubtitleCandidate>, CollaboratorError> {
        tokio::time::sleep(self.delay).await;
        Ok(vec![SubtitleCandidate {
            locator: format!("file:///subs/{}.srt", base),
            label: format!("{}.srt", base),
        }])
    }
}

#[cfg(test)]
mod subtitle_flow_tests {
    use super::*;

    fn external_showing(update: &PlayerUpdate) -> bool {
        matches!(update, PlayerUpdate::TracksChanged(listing) if listing.external_showing)
    }

    #[tokio::test]
    async fn test_sidecar_subtitle_is_attached_and_shown() {
        let mut player = TestPlayer::start(
            &[("movie.mp4", dual_audio_profile(60.0))],
            &["movie.srt", "movie.en.vtt", "other.srt"],
        );

        player.open(&["movie.mp4"]).await;
        player.wait_for(external_showing).await;

        let snapshot = player.snapshot().await;
        let labels: Vec<_> = snapshot.tracks.subtitles.iter().map(|s| s.descriptor.label.as_str()).collect();
        assert_eq!(labels, vec!["movie.en.vtt", "movie.srt"]);
        assert_eq!(snapshot.tracks.current_subtitle, TrackRef::External(0));

        let attached = player.engine.external_track().expect("external track attached");
        assert_eq!(attached.locator, player.locator("movie.en.vtt"));
        assert_eq!(attached.mode, TextTrackMode::Showing);
        assert_eq!(player.engine.showing_subtitle_count(), 1);

        player.shutdown().await;
    }

    #[tokio::test]
    async fn test_user_subtitle_attaches_to_current_video() {
        let mut player = TestPlayer::start(&[("clip.mp4", dual_audio_profile(60.0))], &["extra.srt"]);
        player.open(&["clip.mp4"]).await;
        player.wait_for(|u| matches!(u, PlayerUpdate::StateChanged(SessionState::Ready))).await;

        let locator = player.locator("extra.srt");
        player.send(PlayerCommand::AddSubtitles { locators: vec![locator.clone()] }).await;
        player.wait_for(external_showing).await;

        let snapshot = player.snapshot().await;
        assert_eq!(snapshot.tracks.subtitles.len(), 1);
        assert_eq!(snapshot.tracks.subtitles[0].descriptor.origin, SubtitleOrigin::External(locator));

        player.shutdown().await;
    }

    #[tokio::test]
    async fn test_user_subtitle_does_not_replace_native_selection() {
        let mut player = TestPlayer::start(&[("clip.mp4", subtitled_profile(60.0))], &["extra.srt"]);
        player.open(&["clip.mp4"]).await;
        player.wait_for(|u| matches!(u, PlayerUpdate::StateChanged(SessionState::Ready))).await;

        player.send(PlayerCommand::AddSubtitles { locators: vec![player.locator("extra.srt")] }).await;
        let snapshot = player.snapshot().await;
        assert_eq!(snapshot.tracks.subtitles.len(), 2);
        assert_eq!(snapshot.tracks.current_subtitle, TrackRef::Native(0));
        assert_eq!(player.engine.text_track_modes(), vec![TextTrackMode::Showing]);

        player.send(PlayerCommand::SelectSubtitleTrack(TrackRef::External(0))).await;
        player.wait_for(external_showing).await;
        assert_eq!(player.engine.text_track_modes(), vec![TextTrackMode::Hidden]);
        assert_eq!(player.engine.showing_subtitle_count(), 1);

        player.shutdown().await;
    }

    #[tokio::test]
    async fn test_default_native_track_is_hidden_when_external_selected() {
        let profile = MediaProfile {
            duration: Some(60.0),
            audio_tracks: vec![NativeAudioTrack::default()],
            text_tracks: vec![NativeTextTrack { mode: TextTrackMode::Showing, ..NativeTextTrack::subtitles("Forced") }],
        };
        let mut player = TestPlayer::start(&[("m.mp4", profile)], &["m.en.srt"]);
        player.engine.set_auto_ready(false);

        player.open(&["m.mp4"]).await;
        player.wait_for(|u| matches!(u, PlayerUpdate::StateChanged(SessionState::Loading))).await;
        player.send(PlayerCommand::AddSubtitles { locators: vec![player.locator("m.en.srt")] }).await;
        player.wait_for(external_showing).await;
        player.engine.emit(EngineEvent::MetadataReady);
        player.wait_for(|u| matches!(u, PlayerUpdate::StateChanged(SessionState::Ready))).await;

        let snapshot = player.snapshot().await;
        assert_eq!(snapshot.tracks.current_subtitle, TrackRef::External(0));
        assert_eq!(player.engine.text_track_modes(), vec![TextTrackMode::Hidden]);
        assert_eq!(player.engine.showing_subtitle_count(), 1);

        player.shutdown().await;
    }

    #[tokio::test]
    async fn test_activation_waits_for_engine_registration() {
        let mut player = TestPlayer::start(&[("clip.mp4", dual_audio_profile(60.0))], &["clip.srt"]);
        player.engine.set_external_registration_delay(3);

        player.open(&["clip.mp4"]).await;
        player.wait_for(external_showing).await;

        let attached = player.engine.external_track().expect("external track attached");
        assert_eq!(attached.mode, TextTrackMode::Showing);

        player.shutdown().await;
    }

    #[tokio::test]
    async fn test_subtitles_without_video_are_dropped() {
        let mut player = TestPlayer::start(&[], &["lonely.srt"]);

        player.send(PlayerCommand::AddSubtitles { locators: vec![player.locator("lonely.srt")] }).await;

        let update = player.wait_for(|u| matches!(u, PlayerUpdate::Info(_))).await;
        assert_eq!(update, PlayerUpdate::Info("Load a video before adding subtitles".to_string()));
        assert!(player.snapshot().await.tracks.subtitles.is_empty());

        player.shutdown().await;
    }

    #[tokio::test]
    async fn test_unsupported_subtitle_format_is_reported() {
        let mut player = TestPlayer::start(&[("clip.mp4", dual_audio_profile(60.0))], &["notes.txt"]);
        player.open(&["clip.mp4"]).await;

        player.send(PlayerCommand::AddSubtitles { locators: vec![player.locator("notes.txt")] }).await;

        let update = player.wait_for(|u| matches!(u, PlayerUpdate::Info(m) if m.starts_with("Skipped"))).await;
        assert_eq!(update, PlayerUpdate::Info("Skipped notes.txt: unsupported subtitle format".to_string()));

        player.shutdown().await;
    }

    #[tokio::test]
    async fn test_stale_sidecar_results_are_ignored() {
        let lookup: Arc<dyn SidecarLookup> = Arc::new(SlowLookup { delay: Duration::from_millis(50) });
        let mut player = TestPlayer::start_with_lookup(
            &[("first.mp4", dual_audio_profile(60.0)), ("second.mp4", dual_audio_profile(60.0))],
            &[],
            Some(lookup),
        );

        player.open(&["first.mp4", "second.mp4"]).await;
        player.wait_for(|u| matches!(u, PlayerUpdate::StateChanged(SessionState::Ready))).await;
        player.send(PlayerCommand::Next).await;
        player.wait_for(|u| matches!(u, PlayerUpdate::SelectionChanged { index: 1, .. })).await;
        player.wait_for(external_showing).await;

        // Give the lookup for the first video time to come back.
        tokio::time::sleep(Duration::from_millis(100)).await;
        let snapshot = player.snapshot().await;
        let labels: Vec<_> = snapshot.tracks.subtitles.iter().map(|s| s.descriptor.label.as_str()).collect();
        assert_eq!(labels, vec!["second.srt"]);
        assert_eq!(
            player.engine.external_track().map(|track| track.locator),
            Some("file:///subs/second.srt".to_string())
        );

        player.shutdown().await;
    }
}
