//! Binary snapshots of a [`NetworkManager`] via `bitcode`, with a versioned
//! header so the world layer can persist and restore mechanical state.
//!
//! Decoding re-checks the partition invariant; a snapshot that decodes but
//! describes an inconsistent partition is rejected rather than loaded.

use crate::manager::{NetworkError, NetworkManager};
use crate::node::GridNode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Magic number identifying a network manager snapshot.
pub const SNAPSHOT_MAGIC: u32 = 0x70C9_0001;

/// Current format version. Increment when breaking the wire format.
pub const FORMAT_VERSION: u32 = 1;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that can occur during serialization.
#[derive(Debug, thiserror::Error)]
pub enum SerializeError {
    #[error("bitcode encoding failed: {0}")]
    Encode(String),
    #[error("cannot snapshot while a transaction is open")]
    InTransaction,
}

/// Errors that can occur during deserialization.
#[derive(Debug, thiserror::Error)]
pub enum DeserializeError {
    #[error("invalid magic number: expected 0x{:08X}, got 0x{:08X}", SNAPSHOT_MAGIC, .0)]
    InvalidMagic(u32),
    #[error("unsupported format version: expected {}, got {}", FORMAT_VERSION, .0)]
    UnsupportedVersion(u32),
    #[error("snapshot from future version {0} (this build supports up to {FORMAT_VERSION})")]
    FutureVersion(u32),
    #[error("bitcode decoding failed: {0}")]
    Decode(String),
    #[error("snapshot is inconsistent: {0}")]
    Inconsistent(#[from] NetworkError),
}

// ---------------------------------------------------------------------------
// Snapshot header
// ---------------------------------------------------------------------------

/// Header prepended to every serialized snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotHeader {
    pub magic: u32,
    pub version: u32,
    /// Number of registered nodes, for quick inspection without a full load.
    pub node_count: u64,
}

impl SnapshotHeader {
    pub fn new(node_count: usize) -> Self {
        Self {
            magic: SNAPSHOT_MAGIC,
            version: FORMAT_VERSION,
            node_count: node_count as u64,
        }
    }

    /// Validate the header. Returns `Ok(())` if valid.
    pub fn validate(&self) -> Result<(), DeserializeError> {
        if self.magic != SNAPSHOT_MAGIC {
            return Err(DeserializeError::InvalidMagic(self.magic));
        }
        if self.version > FORMAT_VERSION {
            return Err(DeserializeError::FutureVersion(self.version));
        }
        if self.version < FORMAT_VERSION {
            return Err(DeserializeError::UnsupportedVersion(self.version));
        }
        Ok(())
    }
}

#[derive(Serialize)]
struct SnapshotRef<'a, N> {
    header: SnapshotHeader,
    manager: &'a NetworkManager<N>,
}

#[derive(Deserialize)]
struct SnapshotOwned<N> {
    header: SnapshotHeader,
    manager: NetworkManager<N>,
}

impl<N> NetworkManager<N>
where
    N: GridNode + Serialize + DeserializeOwned,
{
    /// Encode the committed state.
    pub fn serialize(&self) -> Result<Vec<u8>, SerializeError> {
        if self.in_transaction() {
            return Err(SerializeError::InTransaction);
        }
        let snapshot = SnapshotRef {
            header: SnapshotHeader::new(self.node_count()),
            manager: self,
        };
        bitcode::serialize(&snapshot).map_err(|e| SerializeError::Encode(e.to_string()))
    }

    /// Decode a snapshot produced by [`serialize`](Self::serialize).
    pub fn deserialize(data: &[u8]) -> Result<Self, DeserializeError> {
        let snapshot: SnapshotOwned<N> =
            bitcode::deserialize(data).map_err(|e| DeserializeError::Decode(e.to_string()))?;
        snapshot.header.validate()?;
        snapshot.manager.verify()?;
        Ok(snapshot.manager)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Direction::*;
    use crate::node::Node;
    use crate::test_utils::*;

    #[test]
    fn snapshot_preserves_partition_and_counter() {
        let mut m = NetworkManager::new();
        m.add(plain(0, 0, 0, &[East]));
        m.add(plain(1, 0, 0, &[West]));
        m.add(plain(4, 0, 0, &[]));
        m.remove(pos(4, 0, 0));

        let data = m.serialize().unwrap();
        let mut restored: NetworkManager<Node> = NetworkManager::deserialize(&data).unwrap();
        assert_eq!(restored.dump(), m.dump());

        // Counter survived: the next id is 2, not 1.
        restored.add(plain(9, 0, 0, &[]));
        assert_eq!(restored.network_of(pos(9, 0, 0)).map(|id| id.0), Some(2));
    }

    #[test]
    fn snapshot_after_commit_drops_the_journal() {
        let mut m: NetworkManager<Node> = NetworkManager::new();
        m.begin();
        m.add(plain(0, 0, 0, &[Up]));
        m.add(plain(0, 1, 0, &[Down]));
        m.commit();

        let data = m.serialize().unwrap();
        let mut restored: NetworkManager<Node> = NetworkManager::deserialize(&data).unwrap();
        assert!(!restored.in_transaction());
        assert_eq!(restored.dump(), m.dump());

        // A fresh transaction on the restored manager rolls back cleanly.
        restored.begin();
        restored.remove(pos(0, 1, 0));
        restored.rollback();
        assert_eq!(restored.dump(), m.dump());
    }

    #[test]
    fn snapshot_refused_mid_transaction() {
        let mut m: NetworkManager<Node> = NetworkManager::new();
        m.begin();
        assert!(matches!(m.serialize(), Err(SerializeError::InTransaction)));
        m.rollback();
        assert!(m.serialize().is_ok());
    }

    #[test]
    fn garbage_fails_to_decode() {
        let result = NetworkManager::<Node>::deserialize(&[1, 2, 3]);
        assert!(matches!(result, Err(DeserializeError::Decode(_))));
    }

    #[test]
    fn header_validation() {
        let mut header = SnapshotHeader::new(3);
        assert!(header.validate().is_ok());
        header.version = FORMAT_VERSION + 1;
        assert!(matches!(
            header.validate(),
            Err(DeserializeError::FutureVersion(_))
        ));
        header.magic = 0;
        assert!(matches!(
            header.validate(),
            Err(DeserializeError::InvalidMagic(0))
        ));
    }
}
