//! Graph vertices: the [`GridNode`] trait the connectivity engine is generic
//! over, and the plain [`Node`] that carries nothing but connectivity.

use crate::grid::{BlockPos, Direction, DirectionSet};
use crate::id::NetworkId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A vertex on the block grid.
///
/// The network id is a back-reference maintained by the manager. Callers
/// construct nodes with no network and hand them to `add`; the manager
/// overwrites it whenever it re-derives membership.
pub trait GridNode: Clone {
    fn pos(&self) -> BlockPos;

    /// Faces that can mechanically link to a neighbor.
    fn connections(&self) -> DirectionSet;

    fn network(&self) -> Option<NetworkId>;

    fn set_network(&mut self, network: NetworkId);

    /// Whether this node declares a connection in `dir`.
    fn connects(&self, dir: Direction) -> bool {
        self.connections().contains(dir)
    }
}

/// A node with no behavior beyond connectivity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub pos: BlockPos,
    pub connections: DirectionSet,
    pub network: Option<NetworkId>,
}

impl Node {
    pub fn new(pos: BlockPos, connections: DirectionSet) -> Self {
        Self {
            pos,
            connections,
            network: None,
        }
    }
}

impl GridNode for Node {
    fn pos(&self) -> BlockPos {
        self.pos
    }

    fn connections(&self) -> DirectionSet {
        self.connections
    }

    fn network(&self) -> Option<NetworkId> {
        self.network
    }

    fn set_network(&mut self, network: NetworkId) {
        self.network = Some(network);
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.connections, self.pos)?;
        match self.network {
            Some(id) => write!(f, " net {id}"),
            None => f.write_str(" net -"),
        }
    }
}
