//! Shared test helpers for unit tests, integration tests, and benchmarks.
//!
//! Gated behind `#[cfg(any(test, feature = "test-utils"))]` so these helpers
//! are available in unit tests and, via the `test-utils` feature, to other
//! crates' tests.

use crate::grid::{Axis, BlockPos, Direction, DirectionSet};
use crate::manager::NetworkManager;
use crate::node::{GridNode, Node};

// ===========================================================================
// Grid shorthands
// ===========================================================================

pub fn pos(x: i32, y: i32, z: i32) -> BlockPos {
    BlockPos::new(x, y, z)
}

pub fn dirs(list: &[Direction]) -> DirectionSet {
    DirectionSet::from(list)
}

/// Both faces along an axis, the usual connection set of a straight piece.
pub fn through(axis: Axis) -> DirectionSet {
    DirectionSet::axis(axis)
}

// ===========================================================================
// Node constructors
// ===========================================================================

pub fn plain(x: i32, y: i32, z: i32, connections: &[Direction]) -> Node {
    Node::new(pos(x, y, z), dirs(connections))
}

/// `len` plain nodes starting at `start` and stepping along `dir`, each
/// connected to its predecessor and successor. The ends stay open on both
/// faces so the line can be extended.
pub fn plain_line(start: BlockPos, dir: Direction, len: usize) -> Vec<Node> {
    let mut at = start;
    let mut nodes = Vec::with_capacity(len);
    for _ in 0..len {
        nodes.push(Node::new(at, through(dir.axis())));
        at = at.offset(dir);
    }
    nodes
}

// ===========================================================================
// Manager helpers
// ===========================================================================

/// Add every node, asserting each add succeeds.
pub fn add_all<N: GridNode>(manager: &mut NetworkManager<N>, nodes: impl IntoIterator<Item = N>) {
    for node in nodes {
        let at = node.pos();
        assert!(manager.add(node), "add at {at} should succeed");
    }
}

/// Positions of each network's members, networks in id order.
pub fn partition<N: GridNode>(manager: &NetworkManager<N>) -> Vec<Vec<BlockPos>> {
    manager
        .networks()
        .map(|n| n.positions().collect())
        .collect()
}
