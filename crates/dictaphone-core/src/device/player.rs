use crate::{
    CoreError, CoreResult,
    device::{PlaybackDevice, PlayerState},
};

use std::{
    panic::Location,
    path::{Path, PathBuf},
    sync::{
        Arc,
        atomic::{AtomicU8, AtomicU32, AtomicU64, Ordering},
    },
    time::Duration,
};

use cpal::{
    Device, Stream, StreamConfig,
    traits::{DeviceTrait, HostTrait, StreamTrait},
};
use error_location::ErrorLocation;
use tracing::{debug, error, info, instrument};

const STATE_IDLE: u8 = 0;
const STATE_READY: u8 = 1;
const STATE_PLAYING: u8 = 2;
const STATE_ENDED: u8 = 3;

/// Sentinel meaning no seek is pending.
const SEEK_NONE: u64 = u64::MAX;

/// WAV clip playback on the default output device.
///
/// The clip is decoded up front and mixed to mono; the output callback
/// walks the frames with a fractional cursor, so rate changes take
/// effect mid-playback without rebuilding the stream. All state shared
/// with the callback lives in atomics, which keeps the callback free of
/// locks.
pub struct WavPlayer {
    device: Device,
    config: StreamConfig,
    stream: Option<Stream>,
    frames: Arc<Vec<f32>>,
    clip_rate: u32,
    state: Arc<AtomicU8>,
    /// Bit pattern of the `f64` frame cursor published by the callback.
    cursor_bits: Arc<AtomicU64>,
    /// Bit pattern of the `f32` rate multiplier.
    rate_bits: Arc<AtomicU32>,
    /// Frame the callback should jump to, or [`SEEK_NONE`].
    seek_frame: Arc<AtomicU64>,
}

impl WavPlayer {
    /// Open the default output device.
    #[track_caller]
    #[instrument]
    pub fn new() -> CoreResult<Self> {
        let host = cpal::default_host();

        let device = host
            .default_output_device()
            .ok_or(CoreError::PlaybackError {
                reason: "No output device found".to_string(),
                location: ErrorLocation::from(Location::caller()),
            })?;

        let config = device
            .default_output_config()
            .map_err(|e| CoreError::PlaybackError {
                reason: format!("Failed to get config: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        info!(
            device_id = ?device.id(),
            sample_rate = config.sample_rate(),
            channels = config.channels(),
            "WavPlayer initialized"
        );

        Ok(Self {
            device,
            config: config.into(),
            stream: None,
            frames: Arc::new(Vec::new()),
            clip_rate: 0,
            state: Arc::new(AtomicU8::new(STATE_IDLE)),
            cursor_bits: Arc::new(AtomicU64::new(0f64.to_bits())),
            rate_bits: Arc::new(AtomicU32::new(1.0f32.to_bits())),
            seek_frame: Arc::new(AtomicU64::new(SEEK_NONE)),
        })
    }

    #[track_caller]
    fn decode_clip(clip: &Path) -> CoreResult<(Vec<f32>, u32)> {
        let mut reader = hound::WavReader::open(clip).map_err(|e| CoreError::WavError {
            reason: format!("Failed to open clip: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        let spec = reader.spec();
        let samples: Vec<f32> = match spec.sample_format {
            hound::SampleFormat::Float => reader
                .samples::<f32>()
                .collect::<Result<_, _>>()
                .map_err(|e| CoreError::WavError {
                    reason: format!("Failed to decode clip: {}", e),
                    location: ErrorLocation::from(Location::caller()),
                })?,
            hound::SampleFormat::Int => {
                let scale = (1i64 << (spec.bits_per_sample - 1)) as f32;
                reader
                    .samples::<i32>()
                    .map(|s| s.map(|s| s as f32 / scale))
                    .collect::<Result<_, _>>()
                    .map_err(|e| CoreError::WavError {
                        reason: format!("Failed to decode clip: {}", e),
                        location: ErrorLocation::from(Location::caller()),
                    })?
            }
        };

        // Mix interleaved channels down to mono frames.
        let channels = spec.channels.max(1) as usize;
        let frames: Vec<f32> = samples
            .chunks(channels)
            .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32)
            .collect();

        if frames.is_empty() {
            return Err(CoreError::PlaybackError {
                reason: "Clip contains no samples".to_string(),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        Ok((frames, spec.sample_rate))
    }

    #[track_caller]
    fn build_stream(&self) -> CoreResult<Stream> {
        let frames = Arc::clone(&self.frames);
        let state = Arc::clone(&self.state);
        let cursor_bits = Arc::clone(&self.cursor_bits);
        let rate_bits = Arc::clone(&self.rate_bits);
        let seek_frame = Arc::clone(&self.seek_frame);

        let src_rate = f64::from(self.clip_rate);
        let dst_rate = f64::from(self.config.sample_rate);
        let channels = (self.config.channels as usize).max(1);

        let stream = self
            .device
            .build_output_stream(
                &self.config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    let mut cursor = f64::from_bits(cursor_bits.load(Ordering::Acquire));

                    // Apply a pending seek even while paused, so the
                    // position reads back correctly before play.
                    let pending = seek_frame.swap(SEEK_NONE, Ordering::AcqRel);
                    if pending != SEEK_NONE {
                        cursor = pending as f64;
                    }

                    if state.load(Ordering::Acquire) != STATE_PLAYING {
                        data.fill(0.0);
                        cursor_bits.store(cursor.to_bits(), Ordering::Release);
                        return;
                    }

                    let rate = f64::from(f32::from_bits(rate_bits.load(Ordering::Acquire)));
                    let step = src_rate / dst_rate * rate;

                    for out in data.chunks_mut(channels) {
                        let idx = cursor as usize;
                        if idx >= frames.len() {
                            for sample in out.iter_mut() {
                                *sample = 0.0;
                            }
                            // Latch the end exactly once.
                            let _ = state.compare_exchange(
                                STATE_PLAYING,
                                STATE_ENDED,
                                Ordering::AcqRel,
                                Ordering::Acquire,
                            );
                            continue;
                        }
                        let sample = frames[idx];
                        for slot in out.iter_mut() {
                            *slot = sample;
                        }
                        cursor += step;
                    }

                    let limit = frames.len() as f64;
                    cursor_bits.store(cursor.min(limit).to_bits(), Ordering::Release);
                },
                |err| {
                    error!("Audio output error: {}", err);
                },
                None,
            )
            .map_err(|e| CoreError::PlaybackError {
                reason: format!("Failed to build stream: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        Ok(stream)
    }

    fn frame_count(&self) -> f64 {
        self.frames.len() as f64
    }
}

#[async_trait::async_trait]
impl PlaybackDevice for WavPlayer {
    #[instrument(skip(self))]
    async fn load(&mut self, clip: PathBuf) -> CoreResult<()> {
        // Drop the old stream first so its callback stops touching the
        // shared cursor before it is reset.
        self.stream = None;
        self.state.store(STATE_IDLE, Ordering::Release);

        let (frames, clip_rate) = Self::decode_clip(&clip)?;

        self.frames = Arc::new(frames);
        self.clip_rate = clip_rate;
        self.cursor_bits.store(0f64.to_bits(), Ordering::Release);
        self.rate_bits.store(1.0f32.to_bits(), Ordering::Release);
        self.seek_frame.store(SEEK_NONE, Ordering::Release);

        let stream = self.build_stream()?;
        // Streams start running on some hosts; hold it silent until play.
        let _ = stream.pause();
        self.stream = Some(stream);
        self.state.store(STATE_READY, Ordering::Release);

        info!(?clip, frames = self.frames.len(), clip_rate, "Clip loaded");

        Ok(())
    }

    #[instrument(skip(self))]
    async fn play(&mut self) -> CoreResult<()> {
        let Some(stream) = self.stream.as_ref() else {
            return Err(CoreError::PlaybackError {
                reason: "No clip loaded".to_string(),
                location: ErrorLocation::from(Location::caller()),
            });
        };

        // A finished clip restarts from the beginning.
        if self.state.load(Ordering::Acquire) == STATE_ENDED {
            self.seek_frame.store(0, Ordering::Release);
            self.cursor_bits.store(0f64.to_bits(), Ordering::Release);
        }

        stream.play().map_err(|e| CoreError::PlaybackError {
            reason: format!("Failed to start stream: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        self.state.store(STATE_PLAYING, Ordering::Release);
        debug!("Playback running");

        Ok(())
    }

    #[instrument(skip(self))]
    async fn pause(&mut self) -> CoreResult<()> {
        if self.state.load(Ordering::Acquire) != STATE_PLAYING {
            return Ok(());
        }

        self.state.store(STATE_READY, Ordering::Release);
        if let Some(stream) = self.stream.as_ref() {
            // Best effort; the state gate already silences the callback.
            let _ = stream.pause();
        }
        debug!("Playback paused");

        Ok(())
    }

    #[instrument(skip(self))]
    async fn seek_to_start(&mut self) -> CoreResult<()> {
        self.seek_frame.store(0, Ordering::Release);
        self.cursor_bits.store(0f64.to_bits(), Ordering::Release);
        // Seeking away from the end makes the clip playable again.
        let _ = self.state.compare_exchange(
            STATE_ENDED,
            STATE_READY,
            Ordering::AcqRel,
            Ordering::Acquire,
        );

        Ok(())
    }

    #[instrument(skip(self))]
    async fn set_rate(&mut self, rate: f32) -> CoreResult<()> {
        if !rate.is_finite() || rate <= 0.0 {
            return Err(CoreError::PlaybackError {
                reason: format!("Invalid playback rate: {}", rate),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        self.rate_bits.store(rate.to_bits(), Ordering::Release);
        debug!(rate, "Playback rate changed");

        Ok(())
    }

    fn position(&self) -> Duration {
        if self.clip_rate == 0 {
            return Duration::ZERO;
        }

        let cursor = f64::from_bits(self.cursor_bits.load(Ordering::Acquire));
        let frames = cursor.min(self.frame_count());
        Duration::from_secs_f64(frames / f64::from(self.clip_rate))
    }

    fn duration(&self) -> Duration {
        if self.clip_rate == 0 {
            return Duration::ZERO;
        }

        Duration::from_secs_f64(self.frame_count() / f64::from(self.clip_rate))
    }

    fn state(&self) -> PlayerState {
        match self.state.load(Ordering::Acquire) {
            STATE_READY => PlayerState::Ready,
            STATE_PLAYING => PlayerState::Playing,
            STATE_ENDED => PlayerState::Ended,
            _ => PlayerState::Idle,
        }
    }
}
