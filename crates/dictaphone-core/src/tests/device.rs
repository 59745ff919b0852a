use crate::{CaptureDevice, PlaybackDevice, PlayerState, WavPlayer, WavRecorder};

use std::{
    path::{Path, PathBuf},
    time::Duration,
};

/// Capture briefly from the default microphone.
#[allow(clippy::unwrap_used)]
async fn record_brief_clip(dir: &Path) -> PathBuf {
    let mut recorder = WavRecorder::new(None).unwrap();
    recorder.begin(dir.join("take.wav")).await.unwrap();
    tokio::time::sleep(Duration::from_millis(300)).await;
    recorder.finish().await.unwrap().unwrap()
}

/// WHAT: A brief capture writes a readable WAV clip
/// WHY: The recorder is the path every take goes through
#[tokio::test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
#[allow(clippy::unwrap_used)]
async fn given_default_microphone_when_capturing_briefly_then_wav_clip_readable() {
    // Given: A temp clip directory
    let dir = tempfile::tempdir().unwrap();

    // When: A brief capture runs
    let clip = record_brief_clip(dir.path()).await;

    // Then: The clip decodes and contains samples
    let reader = hound::WavReader::open(&clip).unwrap();
    assert!(reader.len() > 0);
}

/// WHAT: A recorded clip loads into the player with a duration
/// WHY: Capture and playback must agree on the clip format
#[tokio::test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
#[allow(clippy::unwrap_used)]
async fn given_recorded_clip_when_loaded_then_player_ready_with_duration() {
    // Given: A freshly recorded clip
    let dir = tempfile::tempdir().unwrap();
    let clip = record_brief_clip(dir.path()).await;

    // When: The clip is loaded for playback
    let mut player = WavPlayer::new().unwrap();
    player.load(clip).await.unwrap();

    // Then: The player is ready and knows the clip length
    assert_eq!(player.state(), PlayerState::Ready);
    assert!(player.duration() > Duration::ZERO);
}

/// WHAT: An immediate stop never leaves an unplayable file behind
/// WHY: A reported clip must decode; an empty take must leave nothing
#[tokio::test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
#[allow(clippy::unwrap_used)]
async fn given_capture_stopped_immediately_then_clip_playable_or_absent() {
    // Given: A capture that is finished as soon as it begins
    let dir = tempfile::tempdir().unwrap();
    let mut recorder = WavRecorder::new(None).unwrap();
    recorder.begin(dir.path().join("empty.wav")).await.unwrap();

    // When: Finish runs before many samples can arrive
    let clip = recorder.finish().await.unwrap();

    // Then: Either a decodable clip or no leftover file
    match clip {
        Some(path) => assert!(hound::WavReader::open(&path).unwrap().len() > 0),
        None => assert!(!dir.path().join("empty.wav").exists()),
    }
}
