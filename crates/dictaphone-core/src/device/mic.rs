use crate::{CoreError, CoreResult, device::CaptureDevice};

use std::{
    fs::File,
    io::BufWriter,
    panic::Location,
    path::{Path, PathBuf},
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, AtomicU64, Ordering},
    },
};

use cpal::{
    Device, FromSample, Sample, Stream, SupportedStreamConfig,
    traits::{DeviceTrait, HostTrait, StreamTrait},
};
use error_location::ErrorLocation;
use hound::{WavSpec, WavWriter};
use tracing::{debug, error, info, instrument, warn};

type ClipWriter = Arc<Mutex<Option<WavWriter<BufWriter<File>>>>>;

/// Microphone capture that streams samples straight into a WAV clip.
///
/// The clip is written incrementally from the stream callback, so memory
/// use stays flat regardless of recording length. Pausing keeps the
/// stream alive and drops samples instead, which makes resume gapless
/// from the listener's point of view.
pub struct WavRecorder {
    device: Device,
    config: SupportedStreamConfig,
    stream: Option<Stream>,
    writer: ClipWriter,
    clip: Option<PathBuf>,
    /// Samples are written only while this is set. Cleared on pause.
    gate: Arc<AtomicBool>,
    /// Signals the audio callback to stop writing. Set to `true` before
    /// dropping the stream to ensure no in-flight callback writes after
    /// the writer is taken in `finish()`.
    shutdown: Arc<AtomicBool>,
    written: Arc<AtomicU64>,
}

impl WavRecorder {
    /// Open the input device named `preferred`, falling back to the
    /// default device when it is `None` or not present.
    #[track_caller]
    #[instrument]
    pub fn new(preferred: Option<&str>) -> CoreResult<Self> {
        let host = cpal::default_host();
        let device = Self::pick_device(&host, preferred)?;

        let config = device
            .default_input_config()
            .map_err(|e| CoreError::CaptureError {
                reason: format!("Failed to get config: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        info!(
            device_id = ?device.id(),
            sample_rate = config.sample_rate(),
            channels = config.channels(),
            "WavRecorder initialized"
        );

        Ok(Self {
            device,
            config,
            stream: None,
            writer: Arc::new(Mutex::new(None)),
            clip: None,
            gate: Arc::new(AtomicBool::new(false)),
            shutdown: Arc::new(AtomicBool::new(false)),
            written: Arc::new(AtomicU64::new(0)),
        })
    }

    #[track_caller]
    fn pick_device(host: &cpal::Host, preferred: Option<&str>) -> CoreResult<Device> {
        if let Some(name) = preferred {
            match host.input_devices() {
                Ok(mut devices) => {
                    if let Some(device) = devices.find(|d| d.name().ok().as_deref() == Some(name)) {
                        return Ok(device);
                    }
                    warn!(device = name, "Configured input device not found, using default");
                }
                Err(e) => warn!(error = %e, "Failed to enumerate input devices, using default"),
            }
        }

        host.default_input_device()
            .ok_or(CoreError::NoMicrophoneFound {
                location: ErrorLocation::from(Location::caller()),
            })
    }

    fn clip_spec(&self) -> WavSpec {
        WavSpec {
            channels: self.config.channels(),
            sample_rate: self.config.sample_rate(),
            bits_per_sample: (self.config.sample_format().sample_size() * 8) as u16,
            sample_format: if self.config.sample_format().is_float() {
                hound::SampleFormat::Float
            } else {
                hound::SampleFormat::Int
            },
        }
    }

    #[track_caller]
    fn build_stream(&self) -> CoreResult<Stream> {
        let err_fn = |err| {
            error!("Audio stream error: {}", err);
        };

        let stream = match self.config.sample_format() {
            cpal::SampleFormat::I16 => self
                .device
                .build_input_stream(
                    &self.config.clone().into(),
                    self.write_callback::<i16, i16>(),
                    err_fn,
                    None,
                ),
            cpal::SampleFormat::I32 => self
                .device
                .build_input_stream(
                    &self.config.clone().into(),
                    self.write_callback::<i32, i32>(),
                    err_fn,
                    None,
                ),
            cpal::SampleFormat::F32 => self
                .device
                .build_input_stream(
                    &self.config.clone().into(),
                    self.write_callback::<f32, f32>(),
                    err_fn,
                    None,
                ),
            other => {
                return Err(CoreError::CaptureError {
                    reason: format!("Unsupported sample format '{}'", other),
                    location: ErrorLocation::from(Location::caller()),
                });
            }
        }
        .map_err(|e| CoreError::CaptureError {
            reason: format!("Failed to build stream: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        Ok(stream)
    }

    /// Back out of a failed `begin`: close the half-open writer, clear
    /// the gate, and remove the header-only file left on disk.
    fn discard_clip(&self, clip: &Path) {
        self.gate.store(false, Ordering::Release);

        let writer = self
            .writer
            .lock()
            .unwrap_or_else(|e| {
                error!("Clip writer lock poisoned, recovering: {}", e);
                e.into_inner()
            })
            .take();
        drop(writer);

        if let Err(e) = std::fs::remove_file(clip) {
            warn!(clip = ?clip, error = %e, "Failed to remove abandoned clip");
        }
    }

    fn write_callback<T, U>(&self) -> impl FnMut(&[T], &cpal::InputCallbackInfo) + Send + 'static
    where
        T: Sample,
        U: Sample + hound::Sample + FromSample<T>,
    {
        let writer = Arc::clone(&self.writer);
        let gate = Arc::clone(&self.gate);
        let shutdown = Arc::clone(&self.shutdown);
        let written = Arc::clone(&self.written);

        move |data: &[T], _: &cpal::InputCallbackInfo| {
            // Check the flags before acquiring the lock. Once finish()
            // sets shutdown, no callback writes again even if CPAL fires
            // one more buffer before the stream is dropped.
            if shutdown.load(Ordering::Acquire) || !gate.load(Ordering::Acquire) {
                return;
            }
            // Recover from lock poison rather than silently dropping audio.
            let mut guard = writer.lock().unwrap_or_else(|e| {
                error!("Clip writer lock poisoned, recovering: {}", e);
                e.into_inner()
            });
            if let Some(writer) = guard.as_mut() {
                let mut count = 0u64;
                for &sample in data {
                    if writer.write_sample(U::from_sample(sample)).is_err() {
                        break;
                    }
                    count += 1;
                }
                written.fetch_add(count, Ordering::AcqRel);
            }
        }
    }
}

#[async_trait::async_trait]
impl CaptureDevice for WavRecorder {
    #[instrument(skip(self))]
    async fn begin(&mut self, clip: PathBuf) -> CoreResult<()> {
        if self.stream.is_some() {
            return Err(CoreError::CaptureError {
                reason: "Capture already in progress".to_string(),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        if let Some(parent) = clip.parent() {
            std::fs::create_dir_all(parent).map_err(|e| CoreError::ClipIo {
                path: clip.clone(),
                source: e,
                location: ErrorLocation::from(Location::caller()),
            })?;
        }

        let writer = WavWriter::create(&clip, self.clip_spec()).map_err(|e| CoreError::WavError {
            reason: format!("Failed to create clip: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        {
            let mut guard = self.writer.lock().map_err(|e| CoreError::CaptureError {
                reason: format!("Failed to lock writer: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;
            *guard = Some(writer);
        }

        self.written.store(0, Ordering::Release);
        self.shutdown.store(false, Ordering::Release);
        self.gate.store(true, Ordering::Release);

        let started = self.build_stream().and_then(|stream| {
            stream.play().map_err(|e| CoreError::CaptureError {
                reason: format!("Failed to start stream: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;
            Ok(stream)
        });

        let stream = match started {
            Ok(stream) => stream,
            Err(e) => {
                self.discard_clip(&clip);
                return Err(e);
            }
        };

        self.stream = Some(stream);
        self.clip = Some(clip);
        info!(clip = ?self.clip, "Capture started");

        Ok(())
    }

    #[instrument(skip(self))]
    async fn pause(&mut self) -> CoreResult<()> {
        if self.stream.is_none() {
            return Err(CoreError::CaptureError {
                reason: "No capture in progress".to_string(),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        self.gate.store(false, Ordering::Release);
        debug!("Capture paused");

        Ok(())
    }

    #[instrument(skip(self))]
    async fn resume(&mut self) -> CoreResult<()> {
        if self.stream.is_none() {
            return Err(CoreError::CaptureError {
                reason: "No capture in progress".to_string(),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        self.gate.store(true, Ordering::Release);
        debug!("Capture resumed");

        Ok(())
    }

    #[instrument(skip(self))]
    async fn finish(&mut self) -> CoreResult<Option<PathBuf>> {
        // Signal the callback to stop writing BEFORE dropping the stream,
        // so no write races the finalize below.
        self.shutdown.store(true, Ordering::Release);
        self.gate.store(false, Ordering::Release);

        if let Some(stream) = self.stream.take() {
            drop(stream);
            // Brief yield so any in-flight callback observes the shutdown
            // flag and completes before the writer is finalized.
            std::thread::sleep(std::time::Duration::from_millis(5));
            info!("Capture stopped");
        }

        let writer = self
            .writer
            .lock()
            .map_err(|e| CoreError::CaptureError {
                reason: format!("Failed to lock writer: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?
            .take();

        let clip = self.clip.take();

        let Some(writer) = writer else {
            return Ok(None);
        };

        writer.finalize().map_err(|e| CoreError::WavError {
            reason: format!("Failed to finalize clip: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        let written = self.written.load(Ordering::Acquire);
        debug!(sample_count = written, "Clip finalized");

        if written == 0 {
            // An empty container is not a playable clip.
            if let Some(path) = clip {
                if let Err(e) = std::fs::remove_file(&path) {
                    warn!(clip = ?path, error = %e, "Failed to remove empty clip");
                }
            }
            return Ok(None);
        }

        Ok(clip)
    }
}
