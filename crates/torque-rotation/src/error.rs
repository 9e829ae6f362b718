//! Rejection reasons for rotation network mutations.

use torque_core::{BlockPos, Direction, NetworkError, NetworkId};

/// Why a mutation was rejected. Every rejection leaves the manager exactly
/// as it was before the call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RotationError {
    #[error(transparent)]
    Network(#[from] NetworkError),
    #[error("connections at {0} do not fit the node kind")]
    InvalidConnections(BlockPos),
    #[error("source at {0} has a non-positive speed")]
    InvalidSpeed(BlockPos),
    #[error("network {0} would contain more than one source")]
    MultipleSources(NetworkId),
    #[error("conflicting rotation on the {dir} face of {pos}")]
    ConflictingRotation { pos: BlockPos, dir: Direction },
    #[error("axle run through {pos} is {len} long (limit {max})")]
    AxleRunTooLong { pos: BlockPos, len: usize, max: usize },
    #[error("gearbox at {0} cannot choose a convention axis for its connections")]
    IncompatibleGearbox(BlockPos),
    #[error("gearbox at {0} is driven off its shaft axis")]
    MisalignedGearbox(BlockPos),
}

/// Coarse grouping of rejections for callers that only report a category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RejectionClass {
    /// The request itself is malformed or hits an occupied/empty position.
    Structural,
    /// Propagation found two sources or disagreeing spins.
    Consistency,
    /// A kind-specific physical limit was exceeded.
    Constraint,
}

impl RotationError {
    pub fn class(&self) -> RejectionClass {
        match self {
            RotationError::Network(_)
            | RotationError::InvalidConnections(_)
            | RotationError::InvalidSpeed(_) => RejectionClass::Structural,
            RotationError::MultipleSources(_) | RotationError::ConflictingRotation { .. } => {
                RejectionClass::Consistency
            }
            RotationError::AxleRunTooLong { .. }
            | RotationError::IncompatibleGearbox(_)
            | RotationError::MisalignedGearbox(_) => RejectionClass::Constraint,
        }
    }
}
