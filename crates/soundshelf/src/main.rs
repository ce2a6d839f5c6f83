//! Soundshelf: record short microphone clips and keep them as a persistent
//! library that is restored on every launch.

mod app;
mod app_command;
mod config;
mod console_input;
mod error;
mod scene_presenter;

pub(crate) use {
    app::App,
    app_command::AppCommand,
    console_input::ConsoleInput,
    error::{AppError, Result as AppResult},
    scene_presenter::ScenePresenter,
};

use crate::config::Config;

use std::{sync::Arc, time::Duration};

use rand::{SeedableRng, rngs::StdRng};
use soundshelf_core::{ClipLoader, ClipStore, CpalCaptureDevice, RecordingSession};
use tokio::sync::{mpsc, watch};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "soundshelf=debug,soundshelf_core=info";

/// Application entry point.
fn main() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            error!("Failed to load config: {:?}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = config.validate() {
        error!("Config validation failed: {:?}", e);
        std::process::exit(1);
    }

    let paths = match config.storage_paths() {
        Ok(p) => p,
        Err(e) => {
            error!("Failed to resolve storage paths: {:?}", e);
            std::process::exit(1);
        }
    };

    let store = match ClipStore::open(&paths.recording_dir, &paths.registry_path) {
        Ok(s) => Arc::new(s),
        Err(e) => {
            error!("Failed to open clip store: {:?}", e);
            std::process::exit(1);
        }
    };

    info!(
        recording_dir = ?paths.recording_dir,
        registry = ?paths.registry_path,
        "Clip store ready"
    );

    let device = match CpalCaptureDevice::first_available(config.recording.channels) {
        Ok(d) => d,
        Err(e) => {
            error!("No usable capture device: {:?}", e);
            std::process::exit(1);
        }
    };

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            error!("Failed to create tokio runtime: {:?}", e);
            std::process::exit(1);
        }
    };

    rt.block_on(async {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (command_tx, command_rx) = mpsc::channel(32);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let session = match RecordingSession::initialize(
            device,
            Arc::clone(&store),
            config.session_settings(),
            events_tx,
        ) {
            Ok(s) => s,
            Err(e) => {
                error!("Failed to initialize recording session: {:?}", e);
                std::process::exit(1);
            }
        };

        let console_input = ConsoleInput::new(command_tx);

        let mut app = App {
            session,
            loader: ClipLoader::new(store),
            presenter: ScenePresenter::new(),
            events_rx,
            command_rx,
            shutdown_tx,
            spawn_area: config.spawn_area(),
            rng: StdRng::from_entropy(),
            recording_deadline: None,
        };

        tokio::join!(
            async {
                if let Err(e) = console_input.run(shutdown_rx).await {
                    error!(error = ?e, "Console input error");
                }
            },
            async {
                if let Err(e) = app.run().await {
                    error!(error = ?e, "App error");
                }
            }
        );
    });

    // The stdin reader may still be parked in a blocking read.
    rt.shutdown_timeout(Duration::from_secs(1));
}
