use crate::grid::BlockPos;
use crate::id::NetworkId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A connected component of nodes.
///
/// The network is the sole owner of membership; nodes only cache the id of
/// the network they currently belong to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Network {
    /// Network identifier.
    pub id: NetworkId,
    /// Member positions, ordered for deterministic iteration.
    pub members: BTreeSet<BlockPos>,
}

impl Network {
    /// Create a new empty network.
    pub fn new(id: NetworkId) -> Self {
        Self {
            id,
            members: BTreeSet::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn contains(&self, pos: BlockPos) -> bool {
        self.members.contains(&pos)
    }

    pub fn positions(&self) -> impl Iterator<Item = BlockPos> + '_ {
        self.members.iter().copied()
    }
}
