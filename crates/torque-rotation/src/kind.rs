//! Node behaviors: how a rotation entering one face leaves through another,
//! and the structural rules each kind imposes on its connection set.

use crate::error::RotationError;
use crate::rotation::Rotation;
use serde::{Deserialize, Serialize};
use std::fmt;
use torque_core::{Axis, BlockPos, Direction, DirectionSet};

/// The closed set of rotation node behaviors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RotationKind {
    /// Passes rotation through unchanged on every face.
    Plain,
    /// Straight shaft along `axis`. Runs of linked axles are length-limited.
    Axle { axis: Axis },
    /// Re-routes rotation between axes. `convention` is the internal gear
    /// axis, re-derived from the connection set on every add and update;
    /// `fixed_axis` pins it. The convention only constrains which faces may
    /// connect (and labels the dump); the transform itself depends solely on
    /// the driven face.
    GearBox {
        fixed_axis: Option<Axis>,
        convention: Option<Axis>,
    },
    /// Reverses spin between its faces. At most two faces may connect, so
    /// the reversal is the same whichever face drives it.
    Inverter,
    /// Emits `rotation` on every face and cannot be driven.
    Source { rotation: Rotation },
}

impl RotationKind {
    pub fn gearbox() -> Self {
        RotationKind::GearBox {
            fixed_axis: None,
            convention: None,
        }
    }

    pub fn is_source(&self) -> bool {
        matches!(self, RotationKind::Source { .. })
    }

    pub fn is_axle(&self) -> bool {
        matches!(self, RotationKind::Axle { .. })
    }

    /// Rotation leaving through `to` when driven by `incoming` through
    /// `from`. Leaving through the driven face returns `incoming`.
    pub fn rotation(
        &self,
        pos: BlockPos,
        incoming: Rotation,
        from: Direction,
        to: Direction,
    ) -> Result<Rotation, RotationError> {
        match self {
            RotationKind::Source { rotation } => Ok(*rotation),
            _ if to == from => Ok(incoming),
            RotationKind::Plain | RotationKind::Axle { .. } => Ok(incoming),
            RotationKind::Inverter => Ok(incoming.reversed()),
            RotationKind::GearBox { .. } => {
                if incoming.direction.axis() != from.axis() {
                    return Err(RotationError::MisalignedGearbox(pos));
                }
                let direction = if incoming.direction == from {
                    to
                } else {
                    to.opposite()
                };
                Ok(Rotation::new(direction, incoming.speed))
            }
        }
    }

    /// Check the connection set against this kind's rules and return the
    /// kind as it should be stored. For a gearbox this recomputes the
    /// convention axis, keeping `previous` when it still fits.
    pub fn settle(
        self,
        pos: BlockPos,
        connections: DirectionSet,
        previous: Option<Axis>,
    ) -> Result<RotationKind, RotationError> {
        match self {
            RotationKind::Axle { axis } => {
                if connections.difference(DirectionSet::axis(axis)).is_empty() {
                    Ok(self)
                } else {
                    Err(RotationError::InvalidConnections(pos))
                }
            }
            RotationKind::GearBox { fixed_axis, .. } => {
                let convention = gearbox_convention(connections, fixed_axis, previous)
                    .ok_or(RotationError::IncompatibleGearbox(pos))?;
                Ok(RotationKind::GearBox {
                    fixed_axis,
                    convention,
                })
            }
            RotationKind::Source { rotation } => {
                if crate::speed::is_valid_speed(rotation.speed) {
                    Ok(self)
                } else {
                    Err(RotationError::InvalidSpeed(pos))
                }
            }
            RotationKind::Inverter => {
                if connections.len() <= 2 {
                    Ok(self)
                } else {
                    Err(RotationError::InvalidConnections(pos))
                }
            }
            RotationKind::Plain => Ok(self),
        }
    }

    pub fn convention(&self) -> Option<Axis> {
        match self {
            RotationKind::GearBox { convention, .. } => *convention,
            _ => None,
        }
    }
}

/// Pick the gear axis for a gearbox with the given connections.
///
/// Returns `None` when no axis is free of connections. The outer `Option`
/// is the verdict; the inner one is the (possibly still undecided)
/// convention for a gearbox with no connections yet.
fn gearbox_convention(
    connections: DirectionSet,
    fixed_axis: Option<Axis>,
    previous: Option<Axis>,
) -> Option<Option<Axis>> {
    let used = connections.axes();
    if let Some(fixed) = fixed_axis {
        return if used.contains(&fixed) {
            None
        } else {
            Some(Some(fixed))
        };
    }
    match used.len() {
        0 => Some(previous),
        1 => {
            if let Some(prev) = previous
                && !used.contains(&prev)
            {
                return Some(Some(prev));
            }
            Some(Axis::ALL.into_iter().find(|a| !used.contains(a)))
        }
        2 => Some(Axis::ALL.into_iter().find(|a| !used.contains(a))),
        _ => None,
    }
}

impl fmt::Display for RotationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RotationKind::Plain => f.write_str("plain"),
            RotationKind::Axle { axis } => write!(f, "axle({axis})"),
            RotationKind::GearBox {
                convention: Some(axis),
                ..
            } => write!(f, "gearbox({axis})"),
            RotationKind::GearBox {
                convention: None, ..
            } => f.write_str("gearbox(-)"),
            RotationKind::Inverter => f.write_str("inverter"),
            RotationKind::Source { .. } => f.write_str("source"),
        }
    }
}

// ===========================================================================
// Tests
// ===========================================================================
