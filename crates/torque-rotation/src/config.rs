//! Tunable limits for a rotation manager.

use serde::{Deserialize, Serialize};

/// Default maximum number of axles in one run.
pub const DEFAULT_MAX_AXLE_RUN: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RotationConfig {
    /// Longest run of axles linked end to end.
    pub max_axle_run: usize,
}

impl Default for RotationConfig {
    fn default() -> Self {
        Self {
            max_axle_run: DEFAULT_MAX_AXLE_RUN,
        }
    }
}

impl RotationConfig {
    pub fn with_max_axle_run(max_axle_run: usize) -> Self {
        Self { max_axle_run }
    }
}
