//! Console command source.
//!
//! Reads `start`, `stop`, `save`, `discard`, `status`, and `quit` lines from
//! stdin and forwards them to the application as [`AppCommand`]s. Closing
//! stdin requests shutdown.

use crate::{AppCommand, AppError, AppResult};

use std::{io::BufRead, panic::Location, time::Duration};

use error_location::ErrorLocation;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, instrument, warn};

/// Forwards parsed console lines to the application.
pub struct ConsoleInput {
    command_tx: mpsc::Sender<AppCommand>,
}

impl ConsoleInput {
    /// Create a console reader that sends to `command_tx`.
    pub fn new(command_tx: mpsc::Sender<AppCommand>) -> Self {
        Self { command_tx }
    }

    /// Run until shutdown is signalled or stdin closes.
    #[instrument(skip_all)]
    pub async fn run(&self, mut shutdown_rx: watch::Receiver<bool>) -> AppResult<()> {
        let (line_tx, mut line_rx) = mpsc::channel::<String>(32);

        // Single persistent blocking task that forwards stdin lines.
        //
        // Shutdown: when line_rx is dropped (loop breaks), the next
        // line_tx.blocking_send() fails, breaking the blocking loop.
        let handle = tokio::task::spawn_blocking(move || {
            let stdin = std::io::stdin();
            for line in stdin.lock().lines() {
                let Ok(line) = line else {
                    break;
                };
                if line_tx.blocking_send(line).is_err() {
                    break;
                }
            }
        });

        info!("Commands: start | stop | save | discard | status | quit");

        loop {
            tokio::select! {
                _ = shutdown_rx.changed() => {
                    info!("Console input shutting down");
                    break;
                }
                line = line_rx.recv() => {
                    let Some(line) = line else {
                        info!("Console closed, requesting shutdown");
                        self.send(AppCommand::Shutdown).await?;
                        break;
                    };
                    if line.trim().is_empty() {
                        continue;
                    }
                    match AppCommand::parse(&line) {
                        Some(cmd) => self.send(cmd).await?,
                        None => warn!(input = %line.trim(), "Unknown command"),
                    }
                }
            }
        }

        drop(line_rx);

        // Best-effort join: the blocking task may be stuck in a stdin read.
        // The task is cleaned up by the runtime on process exit regardless.
        match tokio::time::timeout(Duration::from_secs(1), handle).await {
            Ok(Ok(())) => debug!("Console reader stopped cleanly"),
            Ok(Err(e)) => warn!(error = ?e, "Console reader task panicked"),
            Err(_) => debug!(
                "Console reader did not stop within timeout, \
                   will be cleaned up on exit"
            ),
        }

        Ok(())
    }

    async fn send(&self, cmd: AppCommand) -> AppResult<()> {
        self.command_tx
            .send(cmd)
            .await
            .map_err(|e| AppError::ChannelSendFailed {
                message: format!("Failed to send {:?}: {}", cmd, e),
                location: ErrorLocation::from(Location::caller()),
            })
    }
}
