//! Serde structs for the on-disk mechanics format.
//!
//! These are deserialized from RON, JSON, or TOML and then resolved into
//! runtime types by [`crate::catalog`].

use serde::Deserialize;
use torque_rotation::config::DEFAULT_MAX_AXLE_RUN;

/// Top level of a mechanics file.
#[derive(Debug, Clone, Deserialize)]
pub struct MechanicsFile {
    #[serde(default = "default_max_axle_run")]
    pub max_axle_run: usize,
    #[serde(default)]
    pub blocks: Vec<BlockData>,
}

fn default_max_axle_run() -> usize {
    DEFAULT_MAX_AXLE_RUN
}

/// One placeable mechanical block.
#[derive(Debug, Clone, Deserialize)]
pub struct BlockData {
    pub name: String,
    pub kind: KindData,
    /// Gearboxes only: pin the gear axis to the placement facing's axis.
    #[serde(default)]
    pub pinned: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub enum KindData {
    Axle,
    GearBox,
    Inverter,
    Plain,
    Source { speed: f64 },
}
