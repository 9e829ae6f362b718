//! The rotation-aware grid node.

use crate::error::RotationError;
use crate::kind::RotationKind;
use crate::rotation::{Drive, Rotation};
use serde::{Deserialize, Serialize};
use std::fmt;
use torque_core::{Axis, BlockPos, Direction, DirectionSet, GridNode, NetworkId, Node};

/// A grid node with a rotation behavior and the drive propagation last
/// assigned to it. The drive is a cache owned by the manager: whatever a
/// caller puts there is discarded on add and update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RotationNode {
    pub base: Node,
    pub kind: RotationKind,
    pub drive: Option<Drive>,
}

impl RotationNode {
    pub fn new(pos: BlockPos, connections: DirectionSet, kind: RotationKind) -> Self {
        Self {
            base: Node::new(pos, connections),
            kind,
            drive: None,
        }
    }

    pub fn plain(pos: BlockPos, connections: DirectionSet) -> Self {
        Self::new(pos, connections, RotationKind::Plain)
    }

    /// An axle connected on both ends of its axis.
    pub fn axle(pos: BlockPos, axis: Axis) -> Self {
        Self::new(pos, DirectionSet::axis(axis), RotationKind::Axle { axis })
    }

    pub fn gearbox(pos: BlockPos, connections: DirectionSet) -> Self {
        Self::new(pos, connections, RotationKind::gearbox())
    }

    pub fn inverter(pos: BlockPos, connections: DirectionSet) -> Self {
        Self::new(pos, connections, RotationKind::Inverter)
    }

    pub fn source(pos: BlockPos, connections: DirectionSet, rotation: Rotation) -> Self {
        Self::new(pos, connections, RotationKind::Source { rotation })
    }

    pub fn is_source(&self) -> bool {
        self.kind.is_source()
    }

    /// The rotation this node emits through `to`, given its current drive.
    /// `None` when the node is unpowered.
    pub fn emitted(&self, to: Direction) -> Result<Option<Rotation>, RotationError> {
        match self.drive {
            None => Ok(None),
            Some(Drive { from: None, rotation }) => Ok(Some(rotation)),
            Some(Drive {
                from: Some(from),
                rotation,
            }) => self
                .kind
                .rotation(self.base.pos, rotation, from, to)
                .map(Some),
        }
    }
}

impl GridNode for RotationNode {
    fn pos(&self) -> BlockPos {
        self.base.pos
    }

    fn connections(&self) -> DirectionSet {
        self.base.connections
    }

    fn network(&self) -> Option<NetworkId> {
        self.base.network
    }

    fn set_network(&mut self, network: NetworkId) {
        self.base.network = Some(network);
    }
}

impl fmt::Display for RotationNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.base, self.kind)?;
        match self.drive {
            Some(drive) => write!(f, " {drive}"),
            None => f.write_str(" unpowered"),
        }
    }
}
