use std::time::Duration;

/// Fixed capture and storage sample rate.
pub const SAMPLE_RATE: u32 = 44_100;

/// Captured or decoded PCM audio.
///
/// Samples are interleaved and normalized to `[-1.0, 1.0]`. The buffer only
/// ever holds what was actually captured, never the allocated maximum.
#[derive(Debug, Clone, PartialEq)]
pub struct PcmBuffer {
    samples: Vec<f32>,
    sample_rate: u32,
    channels: u16,
}

impl PcmBuffer {
    /// Wrap interleaved samples recorded at [`SAMPLE_RATE`].
    pub fn new(samples: Vec<f32>, channels: u16) -> Self {
        Self {
            samples,
            sample_rate: SAMPLE_RATE,
            channels: channels.max(1),
        }
    }

    /// Interleaved samples.
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Consume the buffer, returning its samples.
    pub fn into_samples(self) -> Vec<f32> {
        self.samples
    }

    /// Sample rate in Hz.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Number of interleaved channels.
    pub fn channels(&self) -> u16 {
        self.channels
    }

    /// Samples per channel.
    pub fn frames(&self) -> usize {
        self.samples.len() / usize::from(self.channels)
    }

    /// Playback duration of the captured audio.
    pub fn duration(&self) -> Duration {
        Duration::from_secs_f64(self.frames() as f64 / f64::from(self.sample_rate))
    }

    /// True when nothing was captured.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// Upper bound on interleaved samples for a recording of `max_secs` seconds.
pub fn max_samples(max_secs: u32, channels: u16) -> usize {
    SAMPLE_RATE as usize * max_secs as usize * usize::from(channels.max(1))
}
