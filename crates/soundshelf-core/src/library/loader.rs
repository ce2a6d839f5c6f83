//! Background reconstruction of saved clips.
//!
//! [`ClipLoader::load_all`] snapshots the registry once, then decodes each
//! referenced file on the blocking pool and hands clips out one at a time, in
//! registry order, through a bounded channel. The task yields between
//! entries, so whatever drives the recording session keeps running while a
//! long library is still loading.

use crate::{
    CoreError, CoreResult, PcmBuffer, WavCodec,
    library::{ClipStore, RegistryEntry},
};

use std::{
    panic::Location,
    pin::Pin,
    sync::Arc,
    task::{Context, Poll},
};

use error_location::ErrorLocation;
use tokio::{sync::mpsc, task::JoinHandle};
use tokio_stream::{Stream, StreamExt, wrappers::ReceiverStream};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

/// Clips decoded ahead of the consumer.
const LOAD_CHANNEL_CAPACITY: usize = 4;

/// A decoded clip and the registry line it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct MaterializedClip {
    /// Decoded audio.
    pub pcm: PcmBuffer,
    /// The registry entry the audio was loaded from.
    pub source_entry: RegistryEntry,
}

/// What a finished load did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadSummary {
    /// Clips delivered to the consumer.
    pub loaded: usize,
    /// Entries whose file was missing, unreadable, or malformed.
    pub skipped: usize,
    /// True when the load stopped before the end of the registry.
    pub cancelled: bool,
}

/// Spawns load pipelines over a [`ClipStore`].
pub struct ClipLoader {
    store: Arc<ClipStore>,
}

impl ClipLoader {
    /// Loader reading from `store`.
    pub fn new(store: Arc<ClipStore>) -> Self {
        Self { store }
    }

    /// Start one pass over the registry as it is right now.
    ///
    /// Must be called from within a tokio runtime. Each call re-reads the
    /// registry, so a later call sees entries appended since.
    #[instrument(skip(self))]
    pub fn load_all(&self) -> ClipLoad {
        let (tx, rx) = mpsc::channel(LOAD_CHANNEL_CAPACITY);
        let cancel = CancellationToken::new();

        let task = tokio::spawn(run_load(Arc::clone(&self.store), tx, cancel.clone()));

        ClipLoad {
            clips: ReceiverStream::new(rx),
            cancel,
            task,
        }
    }
}

/// An in-flight load: a stream of clips plus the task producing them.
pub struct ClipLoad {
    clips: ReceiverStream<MaterializedClip>,
    cancel: CancellationToken,
    task: JoinHandle<CoreResult<LoadSummary>>,
}

impl ClipLoad {
    /// Next clip in registry order, or `None` once the pass has ended.
    pub async fn next_clip(&mut self) -> Option<MaterializedClip> {
        self.clips.next().await
    }

    /// Stop after the entry currently being decoded.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Token that cancels this load when triggered.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Stop consuming and wait for the task to wind down.
    ///
    /// Clips not yet received are dropped; if the pass had not ended the
    /// summary reports it as cancelled.
    pub async fn finish(self) -> CoreResult<LoadSummary> {
        drop(self.clips);

        self.task.await.map_err(|e| CoreError::LoadTaskFailed {
            reason: format!("Load task did not complete: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?
    }
}

impl Stream for ClipLoad {
    type Item = MaterializedClip;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.clips).poll_next(cx)
    }
}

async fn run_load(
    store: Arc<ClipStore>,
    tx: mpsc::Sender<MaterializedClip>,
    cancel: CancellationToken,
) -> CoreResult<LoadSummary> {
    let registry_store = Arc::clone(&store);
    let entries = tokio::task::spawn_blocking(move || registry_store.registry().load())
        .await
        .map_err(|e| CoreError::LoadTaskFailed {
            reason: format!("Registry read panicked: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })??;

    let total = entries.len();
    let mut summary = LoadSummary::default();

    for entry in entries {
        if cancel.is_cancelled() {
            summary.cancelled = true;
            break;
        }

        let Some(clip) = materialize(&store, entry).await else {
            summary.skipped += 1;
            tokio::task::yield_now().await;
            continue;
        };

        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                summary.cancelled = true;
                break;
            }
            sent = tx.send(clip) => {
                if sent.is_err() {
                    debug!("Clip consumer went away, stopping load");
                    summary.cancelled = true;
                    break;
                }
                summary.loaded += 1;
            }
        }

        tokio::task::yield_now().await;
    }

    info!(
        total,
        loaded = summary.loaded,
        skipped = summary.skipped,
        cancelled = summary.cancelled,
        "Clip library load finished"
    );

    Ok(summary)
}

/// Decode one entry, logging and returning `None` when it cannot be used.
async fn materialize(store: &ClipStore, entry: RegistryEntry) -> Option<MaterializedClip> {
    let path = match store.clip_path(&entry) {
        Ok(path) => path,
        Err(e) => {
            warn!(filename = %entry, error = %e, "Skipping registry entry");
            return None;
        }
    };

    match tokio::task::spawn_blocking(move || WavCodec::decode(&path)).await {
        Ok(Ok(pcm)) => {
            debug!(filename = %entry, frames = pcm.frames(), "Clip materialized");
            Some(MaterializedClip {
                pcm,
                source_entry: entry,
            })
        }
        Ok(Err(e)) => {
            warn!(filename = %entry, error = %e, "Skipping unreadable clip");
            None
        }
        Err(e) => {
            warn!(filename = %entry, error = %e, "Clip decode task panicked, skipping");
            None
        }
    }
}
