use crate::config::default_spawn_half_extent;

use serde::{Deserialize, Serialize};

/// Placement of clip objects in the scene.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpawnConfig {
    /// Objects spawn within `[-half_extent, half_extent)` on x and z.
    #[serde(default = "default_spawn_half_extent")]
    pub half_extent: f32,
}

impl Default for SpawnConfig {
    fn default() -> Self {
        Self {
            half_extent: default_spawn_half_extent(),
        }
    }
}
