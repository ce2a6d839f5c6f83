use crate::{AppCommand, AppResult, ScenePresenter};

use soundshelf_core::{
    CaptureDevice, ClipLoad, ClipLoader, MaterializedClip, RecordingSession, SaveOutcome,
    SessionEvent, SessionState, SpawnArea,
};

use rand::rngs::StdRng;
use tokio::{
    sync::{mpsc, watch},
    time::Instant,
};
use tracing::{error, info, instrument, warn};

/// Main application state.
///
/// Owns the recording session and drives it from console commands, the
/// auto-stop deadline, and the startup library load. Session events are
/// forwarded to the presenter after every step.
pub struct App<D: CaptureDevice> {
    pub(crate) session: RecordingSession<D>,
    pub(crate) loader: ClipLoader,
    pub(crate) presenter: ScenePresenter,
    pub(crate) events_rx: mpsc::UnboundedReceiver<SessionEvent>,
    pub(crate) command_rx: mpsc::Receiver<AppCommand>,
    pub(crate) shutdown_tx: watch::Sender<bool>,
    pub(crate) spawn_area: SpawnArea,
    pub(crate) rng: StdRng,
    pub(crate) recording_deadline: Option<Instant>,
}

impl<D: CaptureDevice> App<D> {
    /// Run the main application event loop.
    #[instrument(skip(self))]
    pub(crate) async fn run(&mut self) -> AppResult<()> {
        info!("Soundshelf starting");

        let mut load = Some(self.loader.load_all());
        self.session.set_library_loading(true);
        self.presenter.set_library_loading(true);
        self.forward_events();

        loop {
            let deadline = self.recording_deadline;

            tokio::select! {
                cmd = self.command_rx.recv() => {
                    let Some(cmd) = cmd else {
                        info!("Command channel closed, shutting down");
                        break;
                    };
                    if !self.handle_command(cmd) {
                        info!("Shutdown requested");
                        break;
                    }
                }

                clip = next_loaded(&mut load), if load.is_some() => {
                    match clip {
                        Some(clip) => self.place_loaded_clip(clip),
                        None => {
                            if let Some(done) = load.take() {
                                self.finish_load(done).await;
                            }
                        }
                    }
                }

                _ = sleep_until(deadline), if deadline.is_some() => {
                    self.on_recording_deadline();
                }
            }
        }

        if self.session.state() == SessionState::Recording {
            if let Err(e) = self.session.to_stopped() {
                warn!(error = ?e, "Failed to stop recording during shutdown");
            }
            self.forward_events();
        }

        if let Some(pending) = load.take() {
            pending.cancel();
            self.finish_load(pending).await;
        }

        let _ = self.shutdown_tx.send(true);
        info!("Soundshelf shut down successfully");

        Ok(())
    }

    /// Apply one command. Returns `false` when the loop should end.
    #[instrument(skip(self))]
    pub(crate) fn handle_command(&mut self, cmd: AppCommand) -> bool {
        match cmd {
            AppCommand::StartRecording => self.start_recording(),
            AppCommand::StopRecording => {
                self.recording_deadline = None;
                if let Err(e) = self.session.to_stopped() {
                    error!(error = ?e, "Failed to stop recording");
                }
            }
            AppCommand::Save | AppCommand::Discard if self.session.is_library_loading() => {
                warn!(command = ?cmd, "Library still loading, command ignored");
            }
            AppCommand::Save => self.save(),
            AppCommand::Discard => self.session.discard(),
            AppCommand::Status => self.log_status(),
            AppCommand::Shutdown => return false,
        }

        self.forward_events();
        true
    }

    /// Stop a take that has reached the configured maximum length.
    #[instrument(skip(self))]
    pub(crate) fn on_recording_deadline(&mut self) {
        self.recording_deadline = None;

        if self.session.state() != SessionState::Recording {
            return;
        }

        info!(
            recording_length_secs = self.session.settings().recording_length_secs,
            "Maximum recording length reached, stopping"
        );

        if let Err(e) = self.session.to_stopped() {
            error!(error = ?e, "Failed to auto-stop recording");
        }

        self.forward_events();
    }

    /// Hand every queued session event to the presenter.
    pub(crate) fn forward_events(&mut self) {
        while let Ok(event) = self.events_rx.try_recv() {
            self.presenter.present(event);
        }
    }

    fn start_recording(&mut self) {
        let was_recording = self.session.state() == SessionState::Recording;

        match self.session.to_recording() {
            Ok(()) if !was_recording => {
                self.recording_deadline =
                    Some(Instant::now() + self.session.settings().recording_length());
            }
            Ok(()) => {}
            Err(e) => error!(error = ?e, "Failed to start recording"),
        }
    }

    fn save(&mut self) {
        let spawn_position = self.spawn_area.sample(&mut self.rng);

        match self.session.save(spawn_position) {
            Ok(SaveOutcome::Saved { entry, path }) => {
                info!(filename = %entry, path = ?path, "Clip saved");
            }
            Ok(SaveOutcome::NothingToSave) => info!("Nothing to save"),
            Err(e) => error!(error = ?e, "Failed to save clip"),
        }
    }

    /// Place a clip restored from the library at a random spawn position.
    pub(crate) fn place_loaded_clip(&mut self, clip: MaterializedClip) {
        let spawn_position = self.spawn_area.sample(&mut self.rng);
        self.presenter.present(SessionEvent::ClipMaterialized {
            clip,
            spawn_position,
        });
    }

    async fn finish_load(&mut self, load: ClipLoad) {
        match load.finish().await {
            Ok(summary) => info!(
                loaded = summary.loaded,
                skipped = summary.skipped,
                cancelled = summary.cancelled,
                "Library ready"
            ),
            Err(e) => error!(error = ?e, "Library load failed"),
        }
        self.session.set_library_loading(false);
        self.presenter.set_library_loading(false);
        self.forward_events();
    }

    fn log_status(&self) {
        let affordances = self.session.affordances();
        info!(
            state = ?self.session.state(),
            elapsed_ms = ?self.session.recording_elapsed().map(|d| d.as_millis()),
            unsaved_frames = ?self.session.active_clip().map(|c| c.frames()),
            library_loading = self.presenter.is_library_loading(),
            placed = self.presenter.placed().len(),
            start = affordances.start_enabled,
            stop = affordances.stop_enabled,
            save = affordances.save_enabled,
            discard = affordances.discard_enabled,
            "Status"
        );
    }
}

async fn next_loaded(load: &mut Option<ClipLoad>) -> Option<MaterializedClip> {
    match load {
        Some(load) => load.next_clip().await,
        None => std::future::pending().await,
    }
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
