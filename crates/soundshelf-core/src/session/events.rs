use crate::{MaterializedClip, session::SessionState};

use rand::Rng;

/// Which controls the presentation layer should offer.
///
/// A pure function of session state: see [`AffordanceState::for_session`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AffordanceState {
    /// "Start recording" is available.
    pub start_enabled: bool,
    /// "Stop recording" is available.
    pub stop_enabled: bool,
    /// "Save" is available.
    pub save_enabled: bool,
    /// "Discard" is available.
    pub discard_enabled: bool,
}

impl AffordanceState {
    /// Controls for a session in `state`, holding an unsaved clip or not.
    ///
    /// Save and discard stay off while the saved library is still loading;
    /// start and stop do not depend on it.
    pub fn for_session(state: SessionState, has_active_clip: bool, library_loading: bool) -> Self {
        match state {
            SessionState::Recording => Self {
                start_enabled: false,
                stop_enabled: true,
                save_enabled: false,
                discard_enabled: false,
            },
            SessionState::Stopped => {
                let clip_actions = has_active_clip && !library_loading;
                Self {
                    start_enabled: true,
                    stop_enabled: false,
                    save_enabled: clip_actions,
                    discard_enabled: clip_actions,
                }
            }
        }
    }
}

/// Where the scene should place a playable object.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SpawnPosition {
    /// Horizontal offset.
    pub x: f32,
    /// Height (always on the ground plane).
    pub y: f32,
    /// Depth offset.
    pub z: f32,
}

/// Square area on the ground plane that spawn positions are drawn from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnArea {
    half_extent: f32,
}

impl SpawnArea {
    /// Area spanning `[-half_extent, half_extent)` on x and z.
    pub fn new(half_extent: f32) -> Self {
        Self {
            half_extent: half_extent.abs(),
        }
    }

    /// Uniformly random position inside the area, at `y = 0`.
    ///
    /// A zero-sized area always yields the origin.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> SpawnPosition {
        let h = self.half_extent;
        if h <= 0.0 || !h.is_finite() {
            return SpawnPosition::default();
        }

        SpawnPosition {
            x: rng.gen_range(-h..h),
            y: 0.0,
            z: rng.gen_range(-h..h),
        }
    }
}

/// Everything the session and loader push to the presentation layer.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// Controls changed.
    Affordances(AffordanceState),
    /// A clip is ready to be placed in the scene.
    ClipMaterialized {
        /// The decoded or freshly saved clip.
        clip: MaterializedClip,
        /// Where to place it.
        spawn_position: SpawnPosition,
    },
}
