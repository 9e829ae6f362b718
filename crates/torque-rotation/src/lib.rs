//! Rotation networks for Torque.
//!
//! Layers rotation propagation over the generic connectivity engine in
//! `torque-core`. Each network holds at most one source; the source's spin
//! is carried outward through every linked face, transformed by each node's
//! [`RotationKind`], and every node caches the [`Drive`] it ends up with.
//!
//! # Design
//!
//! - Node behavior is a closed enum dispatched through
//!   [`RotationKind::rotation`].
//! - Mutations are all-or-nothing. Structural checks, the connectivity
//!   change and re-propagation run inside one journal transaction that is
//!   rolled back on the first rejection.
//! - Affected networks are re-propagated from scratch; there is no
//!   incremental patching of drives.
//! - Speeds are [`Fixed64`] so equality on shared faces is exact.

pub mod config;
pub mod error;
pub mod kind;
pub mod manager;
pub mod node;
pub mod rotation;
pub mod speed;

pub use config::RotationConfig;
pub use error::{RejectionClass, RotationError};
pub use kind::RotationKind;
pub use manager::RotationNetworkManager;
pub use node::RotationNode;
pub use rotation::{Drive, Rotation};
pub use speed::Fixed64;
