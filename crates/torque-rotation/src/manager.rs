//! Rotation propagation on top of the generic connectivity engine.
//!
//! Every mutation runs as one journal transaction: the kind's structural
//! rules are checked, the connectivity change is applied, and every network
//! the change touched is re-propagated from scratch. Any rejection rolls the
//! journal back, so a failed call leaves nodes, networks, ids and cached
//! drives exactly as they were.

use crate::config::RotationConfig;
use crate::error::RotationError;
use crate::kind::RotationKind;
use crate::node::RotationNode;
use crate::rotation::{Drive, Rotation};
use std::collections::{BTreeSet, VecDeque};
use torque_core::serialize::{DeserializeError, SerializeError};
use torque_core::{
    Axis, BlockPos, Direction, DirectionSet, GridNode, NetworkError, NetworkId, NetworkManager,
};
use tracing::{debug, trace};

/// Tracks rotation networks: connectivity plus the drive of every node.
#[derive(Debug, Clone, Default)]
pub struct RotationNetworkManager {
    graph: NetworkManager<RotationNode>,
    config: RotationConfig,
}

impl RotationNetworkManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: RotationConfig) -> Self {
        Self {
            graph: NetworkManager::new(),
            config,
        }
    }

    pub fn config(&self) -> &RotationConfig {
        &self.config
    }

    /// The underlying connectivity state, read-only.
    pub fn graph(&self) -> &NetworkManager<RotationNode> {
        &self.graph
    }

    // -- Mutations --

    /// Place a source. Returns false if the placement is rejected.
    pub fn add_source(
        &mut self,
        pos: BlockPos,
        connections: DirectionSet,
        rotation: Rotation,
    ) -> bool {
        self.try_add_source(pos, connections, rotation).is_ok()
    }

    pub fn try_add_source(
        &mut self,
        pos: BlockPos,
        connections: DirectionSet,
        rotation: Rotation,
    ) -> Result<(), RotationError> {
        self.try_add(RotationNode::source(pos, connections, rotation))
    }

    pub fn add(&mut self, node: RotationNode) -> bool {
        self.try_add(node).is_ok()
    }

    pub fn try_add(&mut self, node: RotationNode) -> Result<(), RotationError> {
        let pos = node.pos();
        self.transact("add", pos, |m| {
            let node = settled(node, None)?;
            let change = m.graph.try_add(node)?;
            m.repropagate(&change.affected)
        })
    }

    pub fn update(&mut self, node: RotationNode) -> bool {
        self.try_update(node).is_ok()
    }

    /// Replace the node at its position, e.g. after its connections or kind
    /// changed.
    pub fn try_update(&mut self, node: RotationNode) -> Result<(), RotationError> {
        let pos = node.pos();
        self.transact("update", pos, |m| {
            let previous = m
                .graph
                .node_at(pos)
                .ok_or(NetworkError::NotRegistered(pos))?
                .kind
                .convention();
            let node = settled(node, previous)?;
            let change = m.graph.try_update(node)?;
            m.repropagate(&change.affected)
        })
    }

    pub fn remove(&mut self, pos: BlockPos) -> bool {
        self.try_remove(pos).is_ok()
    }

    /// Remove and return the node at `pos`. Fragments left without a source
    /// lose their drives.
    pub fn try_remove(&mut self, pos: BlockPos) -> Result<RotationNode, RotationError> {
        self.transact("remove", pos, |m| {
            let (node, change) = m.graph.try_remove(pos)?;
            m.repropagate(&change.affected)?;
            Ok(node)
        })
    }

    /// Run `op` inside a journal transaction, rolling back on error.
    fn transact<T>(
        &mut self,
        op_name: &'static str,
        pos: BlockPos,
        op: impl FnOnce(&mut Self) -> Result<T, RotationError>,
    ) -> Result<T, RotationError> {
        self.graph.begin();
        match op(self) {
            Ok(value) => {
                self.graph.commit();
                Ok(value)
            }
            Err(err) => {
                self.graph.rollback();
                debug!(op = op_name, %pos, %err, class = ?err.class(), "mutation rejected");
                Err(err)
            }
        }
    }

    // -- Propagation --

    fn repropagate(&mut self, networks: &[NetworkId]) -> Result<(), RotationError> {
        for &id in networks {
            self.propagate(id)?;
        }
        Ok(())
    }

    /// Recompute every drive in one network from its source, if any.
    fn propagate(&mut self, id: NetworkId) -> Result<(), RotationError> {
        let members: Vec<BlockPos> = self
            .graph
            .network(id)
            .map(|n| n.positions().collect())
            .unwrap_or_default();

        let mut sources = Vec::new();
        for &pos in &members {
            let Some(node) = self.graph.node_at(pos) else {
                continue;
            };
            if let RotationKind::Source { rotation } = node.kind {
                sources.push((pos, rotation));
            }
            if node.drive.is_some() {
                self.graph.modify_node(pos, |n| n.drive = None);
            }
        }
        if sources.len() > 1 {
            return Err(RotationError::MultipleSources(id));
        }
        self.check_axle_runs(&members)?;

        let Some(&(source, rotation)) = sources.first() else {
            trace!(network = %id, size = members.len(), "network unpowered");
            return Ok(());
        };
        self.graph
            .modify_node(source, |n| n.drive = Some(Drive::source(rotation)));

        let mut visited = BTreeSet::from([source]);
        let mut queue = VecDeque::from([source]);
        while let Some(pos) = queue.pop_front() {
            let Some(node) = self.graph.node_at(pos).cloned() else {
                continue;
            };
            for (dir, neighbor) in self.graph.linked_neighbors(pos) {
                let Some(out) = node.emitted(dir)? else {
                    continue;
                };
                let back = dir.opposite();
                if visited.contains(&neighbor) {
                    let echoed = match self.graph.node_at(neighbor) {
                        Some(other) => other.emitted(back)?,
                        None => None,
                    };
                    if echoed != Some(out) {
                        return Err(RotationError::ConflictingRotation { pos, dir });
                    }
                    continue;
                }
                self.drive(id, neighbor, Drive::through(back, out))?;
                visited.insert(neighbor);
                queue.push_back(neighbor);
            }
        }
        trace!(network = %id, powered = visited.len(), "rotation propagated");
        Ok(())
    }

    /// Assign a drive to an undriven node, enforcing what the node accepts.
    fn drive(&mut self, id: NetworkId, pos: BlockPos, drive: Drive) -> Result<(), RotationError> {
        let Some(node) = self.graph.node_at(pos) else {
            return Ok(());
        };
        match (node.kind, drive.from) {
            (RotationKind::Source { .. }, _) => return Err(RotationError::MultipleSources(id)),
            (RotationKind::GearBox { .. }, Some(from))
                if drive.rotation.direction.axis() != from.axis() =>
            {
                return Err(RotationError::MisalignedGearbox(pos));
            }
            _ => {}
        }
        self.graph.modify_node(pos, |n| n.drive = Some(drive));
        Ok(())
    }

    /// Every maximal run of linked axles must fit the configured limit.
    fn check_axle_runs(&self, members: &[BlockPos]) -> Result<(), RotationError> {
        let is_axle = |pos: BlockPos| self.graph.node_at(pos).is_some_and(|n| n.kind.is_axle());
        let max = self.config.max_axle_run;
        let mut seen = BTreeSet::new();
        for &start in members {
            if seen.contains(&start) || !is_axle(start) {
                continue;
            }
            seen.insert(start);
            let mut len = 1;
            let mut stack = vec![start];
            while let Some(pos) = stack.pop() {
                for (_, neighbor) in self.graph.linked_neighbors(pos) {
                    if is_axle(neighbor) && seen.insert(neighbor) {
                        len += 1;
                        stack.push(neighbor);
                    }
                }
            }
            if len > max {
                return Err(RotationError::AxleRunTooLong {
                    pos: start,
                    len,
                    max,
                });
            }
        }
        Ok(())
    }

    // -- Queries --

    pub fn node_at(&self, pos: BlockPos) -> Option<&RotationNode> {
        self.graph.node_at(pos)
    }

    pub fn network_of(&self, pos: BlockPos) -> Option<NetworkId> {
        self.graph.network_of(pos)
    }

    pub fn drive_at(&self, pos: BlockPos) -> Option<Drive> {
        self.graph.node_at(pos).and_then(|n| n.drive)
    }

    /// The rotation driving the node at `pos`.
    pub fn rotation_at(&self, pos: BlockPos) -> Option<Rotation> {
        self.drive_at(pos).map(|d| d.rotation)
    }

    /// The rotation the node at `pos` emits through its `dir` face. `None`
    /// for unpowered nodes and faces without a connection.
    pub fn rotation_toward(&self, pos: BlockPos, dir: Direction) -> Option<Rotation> {
        let node = self.graph.node_at(pos)?;
        if !node.connects(dir) {
            return None;
        }
        node.emitted(dir).ok().flatten()
    }

    pub fn is_powered(&self, pos: BlockPos) -> bool {
        self.drive_at(pos).is_some()
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn network_count(&self) -> usize {
        self.graph.network_count()
    }

    // -- Diagnostics --

    pub fn dump(&self) -> String {
        self.graph.dump()
    }

    /// Check the partition and that drives match sources: a network with a
    /// source is fully powered, one without is fully unpowered.
    pub fn verify(&self) -> Result<(), RotationError> {
        self.graph.verify()?;
        for network in self.graph.networks() {
            let members: Vec<&RotationNode> = self.graph.members(network.id).collect();
            let sources = members.iter().filter(|n| n.is_source()).count();
            if sources > 1 {
                return Err(RotationError::MultipleSources(network.id));
            }
            let powered = members.iter().filter(|n| n.drive.is_some()).count();
            let expected = if sources == 1 { members.len() } else { 0 };
            if powered != expected {
                return Err(NetworkError::Invariant(format!(
                    "network {} has {powered} powered nodes, expected {expected}",
                    network.id
                ))
                .into());
            }
        }
        Ok(())
    }

    // -- Persistence --

    pub fn serialize(&self) -> Result<Vec<u8>, SerializeError> {
        self.graph.serialize()
    }

    /// Restore a snapshot taken with [`serialize`](Self::serialize).
    ///
    /// Cached drives are not trusted: every node is re-settled and every
    /// network re-propagated under `config`. A snapshot that breaks a rule
    /// under that config is rejected as inconsistent.
    pub fn deserialize(data: &[u8], config: RotationConfig) -> Result<Self, DeserializeError> {
        let mut manager = Self {
            graph: NetworkManager::deserialize(data)?,
            config,
        };
        manager.rederive().map_err(|err| {
            debug!(%err, "snapshot rejected");
            DeserializeError::Inconsistent(NetworkError::Invariant(err.to_string()))
        })?;
        Ok(manager)
    }

    fn rederive(&mut self) -> Result<(), RotationError> {
        for node in self.graph.nodes() {
            node.kind
                .settle(node.pos(), node.connections(), node.kind.convention())?;
        }
        let ids: Vec<NetworkId> = self.graph.networks().map(|n| n.id).collect();
        self.repropagate(&ids)?;
        self.verify()
    }
}

/// Apply the kind's structural rules and drop any caller-supplied drive.
fn settled(mut node: RotationNode, previous: Option<Axis>) -> Result<RotationNode, RotationError> {
    let pos = node.pos();
    let previous = previous.or(node.kind.convention());
    node.kind = node.kind.settle(pos, node.connections(), previous)?;
    node.drive = None;
    Ok(node)
}

// ===========================================================================
// Tests
// ===========================================================================
