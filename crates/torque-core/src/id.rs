use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies a network (connected component). Cheap to copy and compare.
///
/// Allocated from a monotonically increasing counter owned by the manager;
/// an id is never handed out twice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NetworkId(pub u32);

impl fmt::Display for NetworkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
