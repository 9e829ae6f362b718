//! Resolved mechanics configuration.
//!
//! [`BlockCatalog`] maps block names from the data file to a resolved kind
//! and turns a placement (name, position, facing, connections) into a
//! [`RotationNode`] ready for a [`RotationNetworkManager`].

use crate::loader::{DataLoadError, check_duplicate, resolve_name};
use crate::schema::{BlockData, KindData};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use torque_core::{BlockPos, Direction, DirectionSet};
use torque_rotation::speed::is_valid_speed;
use torque_rotation::{
    Fixed64, Rotation, RotationConfig, RotationKind, RotationNetworkManager, RotationNode,
};

/// Everything a mechanics file configures.
#[derive(Debug, Clone)]
pub struct MechanicsData {
    pub config: RotationConfig,
    pub catalog: BlockCatalog,
}

impl MechanicsData {
    /// An empty manager using the loaded limits.
    pub fn manager(&self) -> RotationNetworkManager {
        RotationNetworkManager::with_config(self.config.clone())
    }
}

/// A block kind with its data-file parameters resolved.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BlockSpec {
    Plain,
    Axle,
    GearBox { pinned: bool },
    Inverter,
    Source { speed: Fixed64 },
}

impl BlockSpec {
    /// The node kind for a block placed facing `facing`.
    pub fn kind(self, facing: Direction) -> RotationKind {
        match self {
            BlockSpec::Plain => RotationKind::Plain,
            BlockSpec::Axle => RotationKind::Axle {
                axis: facing.axis(),
            },
            BlockSpec::GearBox { pinned } => RotationKind::GearBox {
                fixed_axis: pinned.then(|| facing.axis()),
                convention: None,
            },
            BlockSpec::Inverter => RotationKind::Inverter,
            BlockSpec::Source { speed } => RotationKind::Source {
                rotation: Rotation::new(facing, speed),
            },
        }
    }
}

/// Named block kinds from a mechanics file.
#[derive(Debug, Clone, Default)]
pub struct BlockCatalog {
    blocks: BTreeMap<String, BlockSpec>,
    origin: PathBuf,
}

impl BlockCatalog {
    /// Resolve raw block entries read from `file`.
    pub fn resolve(entries: &[BlockData], file: &Path) -> Result<Self, DataLoadError> {
        let mut blocks = BTreeMap::new();
        for entry in entries {
            check_duplicate(&blocks, &entry.name, file)?;
            let spec = match entry.kind {
                KindData::Plain => BlockSpec::Plain,
                KindData::Axle => BlockSpec::Axle,
                KindData::GearBox => BlockSpec::GearBox {
                    pinned: entry.pinned,
                },
                KindData::Inverter => BlockSpec::Inverter,
                KindData::Source { speed } => {
                    let fixed = Fixed64::checked_from_num(speed)
                        .filter(|s| is_valid_speed(*s))
                        .ok_or_else(|| DataLoadError::InvalidValue {
                            file: file.to_path_buf(),
                            detail: format!("source '{}' has speed {speed}", entry.name),
                        })?;
                    BlockSpec::Source { speed: fixed }
                }
            };
            blocks.insert(entry.name.clone(), spec);
        }
        Ok(Self {
            blocks,
            origin: file.to_path_buf(),
        })
    }

    pub fn get(&self, name: &str) -> Option<BlockSpec> {
        self.blocks.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.blocks.contains_key(name)
    }

    /// Block names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.blocks.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Build the node for placing block `name`. Axles take their axis and
    /// sources their spin from `facing`; pinned gearboxes fix their gear
    /// axis to it.
    pub fn instantiate(
        &self,
        name: &str,
        pos: BlockPos,
        facing: Direction,
        connections: DirectionSet,
    ) -> Result<RotationNode, DataLoadError> {
        let spec = resolve_name(&self.blocks, name, &self.origin, "block")?;
        Ok(RotationNode::new(pos, connections, spec.kind(facing)))
    }
}
