//! Stand-in for the scene/UI layer.
//!
//! Receives [`SessionEvent`]s, tracks which controls are enabled and which
//! clip objects have been placed, and reports both through tracing. Rendering
//! and audio playback stay outside this crate.

use std::time::Duration;

use soundshelf_core::{AffordanceState, SessionEvent, SpawnPosition};
use tracing::{debug, info};

/// A clip object placed in the scene.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedClip {
    /// Registry filename the clip came from.
    pub filename: String,
    /// Where it was placed.
    pub position: SpawnPosition,
    /// Playback length.
    pub duration: Duration,
}

/// Collaborator sink for session and loader events.
#[derive(Debug, Default)]
pub struct ScenePresenter {
    affordances: Option<AffordanceState>,
    placed: Vec<PlacedClip>,
    library_loading: bool,
}

impl ScenePresenter {
    /// Empty scene with no controls published yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one event to the scene.
    pub fn present(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::Affordances(state) => {
                if self.affordances != Some(state) {
                    info!(
                        start = state.start_enabled,
                        stop = state.stop_enabled,
                        save = state.save_enabled,
                        discard = state.discard_enabled,
                        "Controls updated"
                    );
                }
                self.affordances = Some(state);
            }
            SessionEvent::ClipMaterialized {
                clip,
                spawn_position,
            } => {
                let placed = PlacedClip {
                    filename: clip.source_entry.filename().to_string(),
                    position: spawn_position,
                    duration: clip.pcm.duration(),
                };

                info!(
                    filename = %placed.filename,
                    x = spawn_position.x,
                    z = spawn_position.z,
                    duration_ms = placed.duration.as_millis(),
                    "Clip object spawned"
                );

                self.placed.push(placed);
            }
        }
    }

    /// Mark the startup library load as running or finished.
    pub fn set_library_loading(&mut self, loading: bool) {
        if self.library_loading != loading {
            debug!(loading, "Library loading state changed");
        }
        self.library_loading = loading;
    }

    /// Controls most recently published, if any.
    pub fn affordances(&self) -> Option<AffordanceState> {
        self.affordances
    }

    /// Every clip object placed so far, in placement order.
    pub fn placed(&self) -> &[PlacedClip] {
        &self.placed
    }

    /// True while the startup load is still delivering clips.
    pub fn is_library_loading(&self) -> bool {
        self.library_loading
    }
}
