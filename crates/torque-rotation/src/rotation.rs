//! Spin values carried across the graph.

use crate::speed::{Fixed64, format_speed};
use serde::{Deserialize, Serialize};
use std::fmt;
use torque_core::Direction;

/// A spin: the world direction the rotation vector points along, and its
/// speed. Two faces agree on a shaft only when both values are identical.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rotation {
    pub direction: Direction,
    pub speed: Fixed64,
}

impl Rotation {
    pub fn new(direction: Direction, speed: Fixed64) -> Self {
        Self { direction, speed }
    }

    /// Same speed, opposite spin.
    pub fn reversed(self) -> Self {
        Self {
            direction: self.direction.opposite(),
            speed: self.speed,
        }
    }
}

impl fmt::Display for Rotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} @ {}", self.direction, format_speed(self.speed))
    }
}

/// What currently drives a node.
///
/// `from` is the face the rotation arrives through, or `None` for a source
/// that drives itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Drive {
    pub from: Option<Direction>,
    pub rotation: Rotation,
}

impl Drive {
    pub fn source(rotation: Rotation) -> Self {
        Self {
            from: None,
            rotation,
        }
    }

    pub fn through(from: Direction, rotation: Rotation) -> Self {
        Self {
            from: Some(from),
            rotation,
        }
    }

    pub fn is_source(&self) -> bool {
        self.from.is_none()
    }
}

impl fmt::Display for Drive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.from {
            Some(from) => write!(f, "{from}→{}", self.rotation),
            None => write!(f, "{}", self.rotation),
        }
    }
}
