//! Torque Core -- block-grid connectivity for mechanical networks.
//!
//! This crate provides the grid arithmetic, node abstraction, and the generic
//! connectivity engine that every Torque network layer builds on.
//!
//! # Connectivity Model
//!
//! Nodes sit on integer block positions and declare which of their six faces
//! can link. An edge exists only when both neighbors declare the shared face.
//! Edges are derived on demand; only the partition of nodes into networks is
//! stored.
//!
//! ```rust,ignore
//! let mut networks = NetworkManager::new();
//! networks.add(Node::new(BlockPos::new(0, 0, 0), DirectionSet::axis(Axis::X)));
//! networks.add(Node::new(BlockPos::new(1, 0, 0), DirectionSet::axis(Axis::X)));
//! assert_eq!(networks.network_count(), 1);
//! ```
//!
//! # Key Types
//!
//! - [`grid::BlockPos`], [`grid::Direction`], [`grid::DirectionSet`] --
//!   positions, faces, and connection sets.
//! - [`node::GridNode`] -- the trait the engine is generic over;
//!   [`node::Node`] is the plain implementation.
//! - [`manager::NetworkManager`] -- add/update/remove with merge-on-connect,
//!   reflood-on-disconnect, and an undo journal for transactional layers.
//! - [`serialize`] -- versioned binary snapshots via bitcode.

pub mod grid;
pub mod id;
pub mod manager;
pub mod network;
pub mod node;
pub mod serialize;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use grid::{Axis, BlockPos, Direction, DirectionSet};
pub use id::NetworkId;
pub use manager::{NetworkError, NetworkManager, TopologyChange};
pub use network::Network;
pub use node::{GridNode, Node};
