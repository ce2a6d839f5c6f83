mod capture;
mod codec;
mod cpal_device;
mod pcm;

pub use {
    capture::{ActiveCapture, CaptureDevice},
    codec::{BITS_PER_SAMPLE, WavCodec},
    cpal_device::{CpalCapture, CpalCaptureDevice},
    pcm::{PcmBuffer, SAMPLE_RATE, max_samples},
};
