use crate::{
    CoreError, CoreResult, PcmBuffer,
    audio::{ActiveCapture, CaptureDevice, SAMPLE_RATE},
};

use std::{
    panic::Location,
    sync::{
        atomic::{AtomicBool, Ordering},
        {Arc, Mutex},
    },
    time::Duration,
};

use cpal::{
    Device, SampleFormat, Stream, StreamConfig,
    traits::{DeviceTrait, HostTrait, StreamTrait},
};
use error_location::ErrorLocation;
use tracing::{debug, error, info, instrument, warn};

/// Grace period after dropping the stream so an in-flight callback observes
/// the shutdown flag before the buffer is collected.
const STREAM_DRAIN_DELAY: Duration = Duration::from_millis(5);

/// The process-wide microphone, backed by cpal.
pub struct CpalCaptureDevice {
    device: Device,
    config: StreamConfig,
}

impl CpalCaptureDevice {
    /// Open the first available input device at [`SAMPLE_RATE`] with
    /// `channels` interleaved f32 channels.
    ///
    /// # Errors
    ///
    /// [`CoreError::NoCaptureDevice`] when the host reports no input device,
    /// [`CoreError::DeviceError`] when it cannot record at the fixed rate.
    #[track_caller]
    #[instrument]
    pub fn first_available(channels: u16) -> CoreResult<Self> {
        let host = cpal::default_host();

        let device = host
            .default_input_device()
            .or_else(|| host.input_devices().ok().and_then(|mut devices| devices.next()))
            .ok_or(CoreError::NoCaptureDevice {
                location: ErrorLocation::from(Location::caller()),
            })?;

        let range = device
            .supported_input_configs()
            .map_err(|e| CoreError::DeviceError {
                reason: format!("Failed to query configs: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?
            .find(|range| {
                range.sample_format() == SampleFormat::F32
                    && range.channels() == channels
                    && range.min_sample_rate() <= SAMPLE_RATE
                    && SAMPLE_RATE <= range.max_sample_rate()
            })
            .ok_or_else(|| CoreError::DeviceError {
                reason: format!(
                    "Device cannot capture {} channel(s) of f32 at {} Hz",
                    channels, SAMPLE_RATE
                ),
                location: ErrorLocation::from(Location::caller()),
            })?;

        let config: StreamConfig = range.with_sample_rate(SAMPLE_RATE).into();

        info!(
            device_id = ?device.id(),
            sample_rate = config.sample_rate,
            channels = config.channels,
            "Capture device opened"
        );

        Ok(Self { device, config })
    }
}

impl CaptureDevice for CpalCaptureDevice {
    type Capture = CpalCapture;

    #[track_caller]
    #[instrument(skip(self))]
    fn begin(&mut self, max_samples: usize) -> CoreResult<CpalCapture> {
        let samples = Arc::new(Mutex::new(Vec::with_capacity(max_samples)));
        let shutdown = Arc::new(AtomicBool::new(false));

        let callback_samples = Arc::clone(&samples);
        let callback_shutdown = Arc::clone(&shutdown);

        let stream = self
            .device
            .build_input_stream(
                &self.config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    if callback_shutdown.load(Ordering::Acquire) {
                        return;
                    }
                    let mut buf = callback_samples.lock().unwrap_or_else(|e| {
                        error!("Sample buffer lock poisoned, recovering: {}", e);
                        e.into_inner()
                    });
                    let room = max_samples.saturating_sub(buf.len());
                    buf.extend(data.iter().take(room).copied());
                },
                |err| {
                    error!("Capture stream error: {}", err);
                },
                None,
            )
            .map_err(|e| CoreError::DeviceError {
                reason: format!("Failed to build stream: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        stream.play().map_err(|e| CoreError::DeviceError {
            reason: format!("Failed to start stream: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        info!(max_samples, "Capture started");

        Ok(CpalCapture {
            stream: Some(stream),
            samples,
            shutdown,
            channels: self.config.channels,
        })
    }

    fn channels(&self) -> u16 {
        self.config.channels
    }
}

/// A running cpal input stream and the buffer it fills.
pub struct CpalCapture {
    stream: Option<Stream>,
    samples: Arc<Mutex<Vec<f32>>>,
    shutdown: Arc<AtomicBool>,
    channels: u16,
}

impl CpalCapture {
    fn release(&mut self) {
        self.shutdown.store(true, Ordering::Release);

        if let Some(stream) = self.stream.take() {
            drop(stream);
            std::thread::sleep(STREAM_DRAIN_DELAY);
            info!("Capture stopped");
        }
    }
}

impl ActiveCapture for CpalCapture {
    #[track_caller]
    #[instrument(skip(self))]
    fn finish(mut self) -> CoreResult<PcmBuffer> {
        self.release();

        let samples = std::mem::take(&mut *self.samples.lock().map_err(|e| {
            CoreError::DeviceError {
                reason: format!("Failed to lock samples: {}", e),
                location: ErrorLocation::from(Location::caller()),
            }
        })?);

        debug!(sample_count = samples.len(), "Captured audio samples");

        Ok(PcmBuffer::new(samples, self.channels))
    }
}

impl Drop for CpalCapture {
    fn drop(&mut self) {
        if self.stream.is_some() {
            warn!("Capture dropped while running, releasing device");
            self.release();
        }
    }
}
