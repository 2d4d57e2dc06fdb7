//! Tests for the playback session state machine

#[cfg(test)]
mod tests {
    use super::super::*;
    use crate::engine::{
        EngineError, EngineNotification, HeadlessEngine, LoadGeneration, MediaEngine, MediaProfile, NativeAudioTrack,
        NativeTextTrack,
    };
    use crate::playlist::MediaItem;
    use crate::subtitles::SubtitleCandidate;
    use crate::tracks::{ActivationStatus, TrackRef};
    use tokio::sync::mpsc;

    const A: &str = "file:///videos/a.mp4";
    const B: &str = "file:///videos/b.mkv";

    fn item(locator: &str) -> MediaItem {
        MediaItem::new(locator, crate::files::display_name(locator))
    }

    fn setup() -> (PlaybackSession, HeadlessEngine, mpsc::UnboundedReceiver<EngineNotification>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let engine = HeadlessEngine::new(tx)
            .with_profile(
                A,
                MediaProfile {
                    duration: Some(120.0),
                    audio_tracks: vec![
                        NativeAudioTrack { label: Some("English".to_string()), language: Some("en".to_string()), enabled: false },
                        NativeAudioTrack { label: Some("Deutsch".to_string()), language: Some("de".to_string()), enabled: false },
                    ],
                    text_tracks: vec![NativeTextTrack::subtitles("English")],
                },
            )
            .with_profile(B, MediaProfile { duration: Some(60.0), ..MediaProfile::default() });
        let session = PlaybackSession::new(Box::new(engine.clone()), AudioSettings::new(0.8, 1.0), true);
        (session, engine, rx)
    }

    fn drain(session: &mut PlaybackSession, rx: &mut mpsc::UnboundedReceiver<EngineNotification>) -> Vec<EngineOutcome> {
        let mut outcomes = Vec::new();
        while let Ok(notification) = rx.try_recv() {
            outcomes.push(session.handle_engine_notification(notification));
        }
        outcomes
    }

    fn load_ready(session: &mut PlaybackSession, rx: &mut mpsc::UnboundedReceiver<EngineNotification>, locator: &str) {
        session.select(item(locator), false).unwrap();
        drain(session, rx);
        assert_eq!(session.state(), &SessionState::Ready);
    }

    #[test]
    fn test_metadata_ready_detects_tracks_and_requests_sidecars() {
        let (mut session, engine, mut rx) = setup();
        let generation = session.select(item(A), false).unwrap();
        assert_eq!(session.state(), &SessionState::Loading);

        let outcomes = drain(&mut session, &mut rx);

        assert_eq!(
            outcomes,
            vec![EngineOutcome::Ready {
                sidecar: SidecarRequest { generation, item: item(A) },
                resume: false,
            }]
        );
        assert_eq!(session.progress().duration, Some(120.0));
        assert_eq!(session.tracks().audio_tracks().len(), 2);
        assert_eq!(session.tracks().current_subtitle_track(), TrackRef::Native(0));
        assert_eq!(engine.enabled_audio_tracks(), vec![0]);
        assert_eq!(engine.volume(), 0.8);
    }

    #[test]
    fn test_select_resets_tracks_before_load() {
        let (mut session, engine, mut rx) = setup();
        load_ready(&mut session, &mut rx, A);
        session.select_audio_track(1).unwrap();

        let generation = session.select(item(B), false).unwrap();

        assert_eq!(generation, LoadGeneration(2));
        assert_eq!(session.state(), &SessionState::Loading);
        assert!(session.tracks().audio_tracks().is_empty());
        assert_eq!(session.tracks().current_audio_track(), 0);
        assert_eq!(session.tracks().current_subtitle_track(), TrackRef::Off);
        assert_eq!(session.progress(), PlaybackProgress::default());
        assert_eq!(engine.loaded_locator().as_deref(), Some(B));
    }

    #[test]
    fn test_stale_metadata_is_dropped() {
        let (mut session, engine, _rx) = setup();
        engine.set_auto_ready(false);
        let first = session.select(item(A), false).unwrap();
        let second = session.select(item(B), false).unwrap();

        let outcome = session.handle_engine_notification(EngineNotification {
            generation: first,
            event: crate::engine::EngineEvent::MetadataReady,
        });
        assert_eq!(outcome, EngineOutcome::Stale);
        assert_eq!(session.state(), &SessionState::Loading);
        assert!(session.tracks().audio_tracks().is_empty());

        let outcome = session.handle_engine_notification(EngineNotification {
            generation: second,
            event: crate::engine::EngineEvent::MetadataReady,
        });
        assert!(matches!(outcome, EngineOutcome::Ready { ref sidecar, .. } if sidecar.item.locator == B));
        assert_eq!(session.tracks().audio_tracks()[0].label, "Default Audio");
    }

    #[tokio::test]
    async fn test_play_pause_toggle() {
        let (mut session, engine, mut rx) = setup();
        load_ready(&mut session, &mut rx, A);

        session.play().await.unwrap();
        assert_eq!(session.state(), &SessionState::Playing);
        assert!(!engine.is_paused());

        session.pause();
        assert_eq!(session.state(), &SessionState::Paused);
        assert!(engine.is_paused());

        session.toggle().await.unwrap();
        assert_eq!(session.state(), &SessionState::Playing);
        session.toggle().await.unwrap();
        assert_eq!(session.state(), &SessionState::Paused);
    }

    #[tokio::test]
    async fn test_rejected_play_falls_back_to_paused() {
        let (mut session, engine, mut rx) = setup();
        load_ready(&mut session, &mut rx, A);
        engine.reject_play(Some("autoplay blocked"));

        let err = session.play().await.unwrap_err();

        assert_eq!(err, EngineError::Rejected("autoplay blocked".to_string()));
        assert_eq!(session.state(), &SessionState::Paused);
    }

    #[tokio::test]
    async fn test_play_while_loading_resumes_after_ready() {
        let (mut session, engine, mut rx) = setup();
        engine.set_auto_ready(false);
        session.select(item(A), false).unwrap();

        session.play().await.unwrap();
        assert_eq!(session.state(), &SessionState::Loading);
        assert!(session.resume_pending());

        engine.emit(crate::engine::EngineEvent::MetadataReady);
        let outcomes = drain(&mut session, &mut rx);
        assert!(matches!(outcomes.as_slice(), [EngineOutcome::Ready { resume: true, .. }]));
        assert!(!session.resume_pending());
    }

    #[tokio::test]
    async fn test_transitions_are_recorded_in_order() {
        let (mut session, engine, mut rx) = setup();
        load_ready(&mut session, &mut rx, A);
        session.play().await.unwrap();
        engine.finish();
        drain(&mut session, &mut rx);
        session.select(item(B), true).unwrap();

        assert_eq!(
            session.take_transitions(),
            vec![
                SessionState::Loading,
                SessionState::Ready,
                SessionState::Playing,
                SessionState::Ended,
                SessionState::Loading,
            ]
        );
        assert!(session.take_transitions().is_empty());

        // Pausing before playback is not a transition.
        drain(&mut session, &mut rx);
        session.pause();
        assert_eq!(session.take_transitions(), vec![SessionState::Ready]);
    }

    #[test]
    fn test_seek_only_when_media_ready() {
        let (mut session, engine, mut rx) = setup();
        engine.set_auto_ready(false);
        session.select(item(A), false).unwrap();
        assert!(!session.seek_to(10.0));

        engine.emit(crate::engine::EngineEvent::MetadataReady);
        drain(&mut session, &mut rx);

        assert!(session.seek_to(500.0));
        assert_eq!(session.progress().current_time, 120.0);
        assert!(session.seek_to(-5.0));
        assert_eq!(engine.current_time(), 0.0);
        assert!(session.seek_by(30.0));
        assert_eq!(engine.current_time(), 30.0);
        assert!(session.seek_by(-10.0));
        assert_eq!(session.progress().current_time, 20.0);
    }

    #[tokio::test]
    async fn test_ended_then_play_restarts() {
        let (mut session, engine, mut rx) = setup();
        load_ready(&mut session, &mut rx, A);
        session.play().await.unwrap();

        engine.finish();
        let outcomes = drain(&mut session, &mut rx);
        assert_eq!(outcomes, vec![EngineOutcome::Ended]);
        assert_eq!(session.state(), &SessionState::Ended);
        assert_eq!(session.progress().current_time, 120.0);
        assert!(!session.seek_to(5.0));

        session.play().await.unwrap();
        assert_eq!(session.state(), &SessionState::Playing);
        assert_eq!(engine.current_time(), 0.0);
    }

    #[tokio::test]
    async fn test_engine_error_until_new_select() {
        let (mut session, engine, mut rx) = setup();
        load_ready(&mut session, &mut rx, A);

        engine.fail("decoder crashed");
        let outcomes = drain(&mut session, &mut rx);
        assert_eq!(outcomes, vec![EngineOutcome::Failed("decoder crashed".to_string())]);
        assert_eq!(session.state(), &SessionState::Error("decoder crashed".to_string()));

        session.play().await.unwrap();
        assert!(matches!(session.state(), SessionState::Error(_)));

        load_ready(&mut session, &mut rx, B);
    }

    #[test]
    fn test_buffering_flag() {
        let (mut session, engine, mut rx) = setup();
        load_ready(&mut session, &mut rx, A);

        engine.emit(crate::engine::EngineEvent::Waiting);
        engine.emit(crate::engine::EngineEvent::Waiting);
        engine.emit(crate::engine::EngineEvent::CanPlay);
        let outcomes = drain(&mut session, &mut rx);

        assert_eq!(
            outcomes,
            vec![
                EngineOutcome::BufferingChanged(true),
                EngineOutcome::Ignored,
                EngineOutcome::BufferingChanged(false),
            ]
        );
        assert!(!session.is_buffering());
    }

    #[test]
    fn test_volume_and_mute() {
        let (mut session, engine, _rx) = setup();

        assert_eq!(session.set_volume(1.5).volume, 1.0);
        let muted = session.set_volume(0.0);
        assert!(muted.muted);
        assert!(engine.is_muted());

        let restored = session.toggle_mute();
        assert!(!restored.muted);
        assert_eq!(restored.volume, 1.0);

        assert_eq!(session.adjust_volume(-0.25).volume, 0.75);
        assert_eq!(session.toggle_mute().effective_volume(), 0.0);
        let nudged = session.adjust_volume(0.5);
        assert!(!nudged.muted);
        assert_eq!(nudged.volume, 0.5);
        assert_eq!(engine.volume(), 0.5);
    }

    #[test]
    fn test_rate_clamped_and_kept_across_loads() {
        let (mut session, engine, mut rx) = setup();
        load_ready(&mut session, &mut rx, A);

        assert_eq!(session.set_playback_rate(10.0).playback_rate, MAX_PLAYBACK_RATE);
        session.select(item(B), false).unwrap();
        assert_eq!(engine.playback_rate(), MAX_PLAYBACK_RATE);
        assert_eq!(session.set_playback_rate(0.1).playback_rate, MIN_PLAYBACK_RATE);
    }

    #[test]
    fn test_external_subtitles_follow_the_current_load() {
        let (mut session, engine, mut rx) = setup();
        load_ready(&mut session, &mut rx, A);
        let stale = session.generation();
        let current = session.select(item(B), false).unwrap();
        let candidates = vec![SubtitleCandidate {
            locator: "file:///videos/b.srt".to_string(),
            label: "b.srt".to_string(),
        }];

        assert_eq!(session.register_external_subtitles(stale, &candidates), None);

        let registration = session.register_external_subtitles(current, &candidates).unwrap();
        assert_eq!(registration.added, 1);
        let ticket = registration.activation.unwrap();
        assert_eq!(ticket.generation, current);
        assert_eq!(session.confirm_external_activation(ticket), ActivationStatus::Activated);
        assert_eq!(engine.showing_subtitle_count(), 1);

        drain(&mut session, &mut rx);
        assert_eq!(session.tracks().current_subtitle_track(), TrackRef::External(0));

        session.select(item(A), false).unwrap();
        assert_eq!(session.confirm_external_activation(ticket), ActivationStatus::Superseded);
        assert!(session.tracks().external_subtitles().is_empty());
    }
}
