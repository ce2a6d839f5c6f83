#![allow(clippy::unwrap_used)]

use crate::{
    ActiveCapture, CaptureDevice, ClipStore, CoreError, CoreResult, PcmBuffer, SAMPLE_RATE,
    WavCodec,
};

use std::{
    fs,
    panic::Location,
    path::Path,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
};

use error_location::ErrorLocation;
use tempfile::TempDir;

pub(crate) const RECORDING_DIR: &str = "micRecordings";
pub(crate) const REGISTRY_FILE: &str = "myRecordings.txt";

/// Capture device that replays a fixed take and counts stream lifecycles.
pub(crate) struct FakeCaptureDevice {
    pub(crate) take: Vec<f32>,
    pub(crate) channels: u16,
    pub(crate) fail_begin: bool,
    pub(crate) fail_finish: bool,
    pub(crate) begins: Arc<AtomicUsize>,
    pub(crate) releases: Arc<AtomicUsize>,
}

impl FakeCaptureDevice {
    pub(crate) fn with_take(take: Vec<f32>) -> Self {
        Self {
            take,
            channels: 1,
            fail_begin: false,
            fail_finish: false,
            begins: Arc::new(AtomicUsize::new(0)),
            releases: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub(crate) fn counters(&self) -> (Arc<AtomicUsize>, Arc<AtomicUsize>) {
        (Arc::clone(&self.begins), Arc::clone(&self.releases))
    }
}

pub(crate) struct FakeCapture {
    samples: Vec<f32>,
    channels: u16,
    fail_finish: bool,
    releases: Arc<AtomicUsize>,
}

impl CaptureDevice for FakeCaptureDevice {
    type Capture = FakeCapture;

    #[track_caller]
    fn begin(&mut self, max_samples: usize) -> CoreResult<FakeCapture> {
        if self.fail_begin {
            return Err(CoreError::DeviceError {
                reason: "scripted begin failure".to_string(),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        self.begins.fetch_add(1, Ordering::SeqCst);

        Ok(FakeCapture {
            samples: self.take.iter().take(max_samples).copied().collect(),
            channels: self.channels,
            fail_finish: self.fail_finish,
            releases: Arc::clone(&self.releases),
        })
    }

    fn channels(&self) -> u16 {
        self.channels
    }
}

impl ActiveCapture for FakeCapture {
    #[track_caller]
    fn finish(mut self) -> CoreResult<PcmBuffer> {
        if self.fail_finish {
            return Err(CoreError::DeviceError {
                reason: "scripted finish failure".to_string(),
                location: ErrorLocation::from(Location::caller()),
            });
        }
        Ok(PcmBuffer::new(std::mem::take(&mut self.samples), self.channels))
    }
}

impl Drop for FakeCapture {
    fn drop(&mut self) {
        self.releases.fetch_add(1, Ordering::SeqCst);
    }
}

/// `seconds` of a 440 Hz mono sine at half amplitude.
pub(crate) fn tone(seconds: f32) -> Vec<f32> {
    let count = (SAMPLE_RATE as f32 * seconds) as usize;
    (0..count)
        .map(|i| {
            let t = i as f32 / SAMPLE_RATE as f32;
            0.5 * (2.0 * std::f32::consts::PI * 440.0 * t).sin()
        })
        .collect()
}

/// A store rooted in a fresh temp directory. Keep the `TempDir` alive.
pub(crate) fn temp_store() -> (TempDir, Arc<ClipStore>) {
    let root = TempDir::new().unwrap();
    let store = ClipStore::open(
        root.path().join(RECORDING_DIR),
        root.path().join(REGISTRY_FILE),
    )
    .unwrap();
    (root, Arc::new(store))
}

/// Encode `samples` under `filename` in the store and register it.
pub(crate) fn save_clip(store: &ClipStore, filename: &str, samples: Vec<f32>) {
    let entry = crate::RegistryEntry::new(filename).unwrap();
    let path = store.clip_path(&entry).unwrap();
    WavCodec::encode(&PcmBuffer::new(samples, 1), &path).unwrap();
    store.registry().append(&entry).unwrap();
}

pub(crate) fn wav_files(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .filter(|name| name.ends_with(".wav"))
        .collect();
    names.sort();
    names
}
