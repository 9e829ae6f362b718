//! Generic connectivity engine.
//!
//! [`NetworkManager`] keeps every registered node in exactly one
//! [`Network`]. Edges are never stored: a connection exists between two
//! face-adjacent nodes only when both declare the face toward the other.
//!
//! # Mutation strategy
//!
//! - Gaining edges merges networks. The node joins the first linked
//!   neighbor's network (canonical direction order), then every linked
//!   network is folded into the largest one. Ties keep the earlier network.
//! - Losing edges triggers a *reflood*: breadth-first walks over current
//!   edges from every endpoint of a lost edge. Each walk that reaches
//!   unvisited nodes becomes a network with a freshly allocated id; networks
//!   left without members are discarded.
//!
//! # Transactions
//!
//! [`begin`](NetworkManager::begin) opens an undo journal. Every node or
//! network entry is recorded the first time it is touched, together with the
//! id counter, so [`rollback`](NetworkManager::rollback) restores the tables
//! exactly. Layers that validate after a tentative change (see the rotation
//! manager) rely on this.

use crate::grid::{BlockPos, Direction, DirectionSet};
use crate::id::NetworkId;
use crate::network::Network;
use crate::node::GridNode;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::fmt;
use tracing::{debug, trace};

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors from connectivity operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NetworkError {
    #[error("position {0} is already occupied")]
    Occupied(BlockPos),
    #[error("no node registered at {0}")]
    NotRegistered(BlockPos),
    #[error("partition invariant violated: {0}")]
    Invariant(String),
}

// ---------------------------------------------------------------------------
// Topology change report
// ---------------------------------------------------------------------------

/// Which networks a successful mutation touched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TopologyChange {
    /// Networks that exist after the mutation and whose membership (or
    /// member state) changed, in creation order.
    pub affected: Vec<NetworkId>,
    /// Networks that ceased to exist.
    pub retired: Vec<NetworkId>,
}

impl TopologyChange {
    fn touch(&mut self, id: NetworkId) {
        if !self.affected.contains(&id) {
            self.affected.push(id);
        }
    }

    fn retire(&mut self, id: NetworkId) {
        self.affected.retain(|a| *a != id);
        if !self.retired.contains(&id) {
            self.retired.push(id);
        }
    }
}

// ---------------------------------------------------------------------------
// Undo journal
// ---------------------------------------------------------------------------

/// Pre-transaction values of every entry touched since `begin`.
#[derive(Debug, Clone)]
struct Journal<N> {
    nodes: BTreeMap<BlockPos, Option<N>>,
    networks: BTreeMap<NetworkId, Option<Network>>,
    next_network_id: u32,
}

// ---------------------------------------------------------------------------
// NetworkManager
// ---------------------------------------------------------------------------

/// Maintains the partition of grid nodes into connected networks.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound(serialize = "N: Serialize", deserialize = "N: Deserialize<'de>"))]
pub struct NetworkManager<N> {
    nodes: BTreeMap<BlockPos, N>,
    networks: BTreeMap<NetworkId, Network>,
    next_network_id: u32,
    #[serde(skip)]
    journal: Option<Journal<N>>,
}

impl<N: GridNode> Default for NetworkManager<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N: GridNode> NetworkManager<N> {
    /// Create an empty manager.
    pub fn new() -> Self {
        Self {
            nodes: BTreeMap::new(),
            networks: BTreeMap::new(),
            next_network_id: 0,
            journal: None,
        }
    }

    // -- Queries --

    pub fn node_at(&self, pos: BlockPos) -> Option<&N> {
        self.nodes.get(&pos)
    }

    pub fn contains(&self, pos: BlockPos) -> bool {
        self.nodes.contains_key(&pos)
    }

    pub fn network(&self, id: NetworkId) -> Option<&Network> {
        self.networks.get(&id)
    }

    /// All networks in id order.
    pub fn networks(&self) -> impl Iterator<Item = &Network> {
        self.networks.values()
    }

    /// Id of the network the node at `pos` belongs to.
    pub fn network_of(&self, pos: BlockPos) -> Option<NetworkId> {
        self.nodes.get(&pos).and_then(GridNode::network)
    }

    /// All nodes in position order.
    pub fn nodes(&self) -> impl Iterator<Item = &N> {
        self.nodes.values()
    }

    /// Nodes of one network in position order.
    pub fn members(&self, id: NetworkId) -> impl Iterator<Item = &N> {
        self.networks
            .get(&id)
            .into_iter()
            .flat_map(|net| net.members.iter())
            .filter_map(|pos| self.nodes.get(pos))
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn network_count(&self) -> usize {
        self.networks.len()
    }

    /// Whether an edge exists from `pos` toward `dir`: both sides are
    /// registered and declare the shared face.
    pub fn is_linked(&self, pos: BlockPos, dir: Direction) -> bool {
        let Some(node) = self.nodes.get(&pos) else {
            return false;
        };
        node.connects(dir)
            && self
                .nodes
                .get(&pos.offset(dir))
                .is_some_and(|neighbor| neighbor.connects(dir.opposite()))
    }

    /// Directions from `pos` that currently form edges.
    pub fn linked_directions(&self, pos: BlockPos) -> DirectionSet {
        Direction::ALL
            .into_iter()
            .filter(|d| self.is_linked(pos, *d))
            .collect()
    }

    /// Linked neighbors of `pos` in canonical direction order.
    pub fn linked_neighbors(&self, pos: BlockPos) -> Vec<(Direction, BlockPos)> {
        self.linked_directions(pos)
            .iter()
            .map(|d| (d, pos.offset(d)))
            .collect()
    }

    // -- Transactions --

    /// Open an undo journal. A second `begin` while one is open is a no-op;
    /// the outer transaction keeps the original pre-state.
    pub fn begin(&mut self) {
        debug_assert!(self.journal.is_none(), "nested transaction");
        if self.journal.is_none() {
            self.journal = Some(Journal {
                nodes: BTreeMap::new(),
                networks: BTreeMap::new(),
                next_network_id: self.next_network_id,
            });
        }
    }

    /// Keep every change made since `begin`.
    pub fn commit(&mut self) {
        self.journal = None;
    }

    /// Restore the exact state captured at `begin`.
    pub fn rollback(&mut self) {
        let Some(journal) = self.journal.take() else {
            return;
        };
        for (pos, prior) in journal.nodes {
            match prior {
                Some(node) => {
                    self.nodes.insert(pos, node);
                }
                None => {
                    self.nodes.remove(&pos);
                }
            }
        }
        for (id, prior) in journal.networks {
            match prior {
                Some(network) => {
                    self.networks.insert(id, network);
                }
                None => {
                    self.networks.remove(&id);
                }
            }
        }
        self.next_network_id = journal.next_network_id;
    }

    pub fn in_transaction(&self) -> bool {
        self.journal.is_some()
    }

    // -- Mutations --

    /// Register a node. Returns false if the position is occupied.
    pub fn add(&mut self, node: N) -> bool {
        let pos = node.pos();
        match self.try_add(node) {
            Ok(_) => true,
            Err(err) => {
                debug!(%pos, %err, "add rejected");
                false
            }
        }
    }

    /// Register a node, joining and merging every network it links to.
    pub fn try_add(&mut self, node: N) -> Result<TopologyChange, NetworkError> {
        let pos = node.pos();
        if self.nodes.contains_key(&pos) {
            return Err(NetworkError::Occupied(pos));
        }
        self.put_node(node);

        let mut change = TopologyChange::default();
        let mut participants = Vec::new();
        for (_, neighbor) in self.linked_neighbors(pos) {
            if let Some(id) = self.network_of(neighbor)
                && !participants.contains(&id)
            {
                participants.push(id);
            }
        }

        let target = match participants.first() {
            Some(&first) => {
                self.assign(pos, first, &mut change);
                self.merge(&participants, &mut change)
            }
            None => {
                let id = self.allocate_network();
                self.assign(pos, id, &mut change);
                id
            }
        };
        change.touch(target);
        trace!(%pos, network = %target, "node added");
        Ok(change)
    }

    /// Replace the node at the same position, e.g. after its connection set
    /// changed. Returns false if nothing is registered there.
    pub fn update(&mut self, node: N) -> bool {
        let pos = node.pos();
        match self.try_update(node) {
            Ok(_) => true,
            Err(err) => {
                debug!(%pos, %err, "update rejected");
                false
            }
        }
    }

    /// Replace a registered node and re-derive connectivity around it.
    pub fn try_update(&mut self, mut node: N) -> Result<TopologyChange, NetworkError> {
        let pos = node.pos();
        let current = self
            .nodes
            .get(&pos)
            .and_then(GridNode::network)
            .ok_or(NetworkError::NotRegistered(pos))?;
        let before = self.linked_directions(pos);

        node.set_network(current);
        self.put_node(node);

        let after = self.linked_directions(pos);
        let lost = before.difference(after);
        let gained = after.difference(before);
        let mut change = TopologyChange::default();

        if !lost.is_empty() {
            let starts: Vec<BlockPos> = std::iter::once(pos)
                .chain(lost.iter().map(|d| pos.offset(d)))
                .collect();
            self.reflood(&starts, &mut change);
        } else {
            let mut participants = vec![current];
            for dir in gained.iter() {
                if let Some(id) = self.network_of(pos.offset(dir))
                    && !participants.contains(&id)
                {
                    participants.push(id);
                }
            }
            let target = self.merge(&participants, &mut change);
            change.touch(target);
        }
        Ok(change)
    }

    /// Remove the node at `pos`. Returns false if nothing was there.
    pub fn remove(&mut self, pos: BlockPos) -> bool {
        self.take(pos).is_some()
    }

    /// Remove and return the node at `pos`.
    pub fn take(&mut self, pos: BlockPos) -> Option<N> {
        match self.try_remove(pos) {
            Ok((node, _)) => Some(node),
            Err(err) => {
                debug!(%pos, %err, "remove rejected");
                None
            }
        }
    }

    /// Remove a node, splitting its network as needed.
    pub fn try_remove(&mut self, pos: BlockPos) -> Result<(N, TopologyChange), NetworkError> {
        if !self.nodes.contains_key(&pos) {
            return Err(NetworkError::NotRegistered(pos));
        }
        let former: Vec<BlockPos> = self
            .linked_neighbors(pos)
            .into_iter()
            .map(|(_, p)| p)
            .collect();

        let mut change = TopologyChange::default();
        if let Some(old) = self.network_of(pos) {
            self.detach(pos, old, &mut change);
        }
        let node = self
            .take_node_entry(pos)
            .ok_or(NetworkError::NotRegistered(pos))?;

        self.reflood(&former, &mut change);
        Ok((node, change))
    }

    /// Mutate non-structural state of a registered node (journaled).
    ///
    /// The closure must not change the node's position or connections;
    /// connectivity changes go through [`update`](Self::update).
    pub fn modify_node(&mut self, pos: BlockPos, f: impl FnOnce(&mut N)) -> bool {
        if !self.nodes.contains_key(&pos) {
            return false;
        }
        self.record_node(pos);
        if let Some(node) = self.nodes.get_mut(&pos) {
            let connections = node.connections();
            f(node);
            debug_assert_eq!(node.pos(), pos, "modify_node moved a node");
            debug_assert_eq!(
                node.connections(),
                connections,
                "modify_node changed connections"
            );
        }
        true
    }

    // -- Connectivity internals --

    /// Fold every participant network into the largest. Returns the survivor.
    fn merge(&mut self, participants: &[NetworkId], change: &mut TopologyChange) -> NetworkId {
        let Some(&first) = participants.first() else {
            debug_assert!(false, "merge with no participants");
            return self.allocate_network();
        };
        let size = |m: &Self, id: NetworkId| m.networks.get(&id).map_or(0, Network::len);

        let mut target = first;
        for &id in &participants[1..] {
            if size(self, id) > size(self, target) {
                target = id;
            }
        }

        for &id in participants {
            if id == target {
                continue;
            }
            let moved: Vec<BlockPos> = self
                .networks
                .get(&id)
                .map(|n| n.positions().collect())
                .unwrap_or_default();
            for pos in moved {
                self.assign(pos, target, change);
            }
            debug!(from = %id, into = %target, "networks merged");
        }
        target
    }

    /// Breadth-first walks from each start; every walk that finds unvisited
    /// nodes becomes a fresh network.
    fn reflood(&mut self, starts: &[BlockPos], change: &mut TopologyChange) {
        let mut visited: BTreeSet<BlockPos> = BTreeSet::new();
        for &start in starts {
            if visited.contains(&start) || !self.nodes.contains_key(&start) {
                continue;
            }
            let component = self.walk(start);
            visited.extend(component.iter().copied());

            let id = self.allocate_network();
            for &pos in &component {
                self.assign(pos, id, change);
            }
            change.touch(id);
            trace!(network = %id, size = component.len(), "reflood component");
        }
        if change.affected.len() > 1 {
            debug!(fragments = change.affected.len(), "network split");
        }
    }

    /// Positions reachable from `start` over current edges, in visit order.
    pub fn walk(&self, start: BlockPos) -> Vec<BlockPos> {
        let mut seen = BTreeSet::new();
        let mut order = Vec::new();
        let mut queue = VecDeque::new();
        if self.nodes.contains_key(&start) {
            seen.insert(start);
            queue.push_back(start);
        }
        while let Some(pos) = queue.pop_front() {
            order.push(pos);
            for (_, neighbor) in self.linked_neighbors(pos) {
                if seen.insert(neighbor) {
                    queue.push_back(neighbor);
                }
            }
        }
        order
    }

    /// Move `pos` into network `id`, discarding its old network if emptied.
    fn assign(&mut self, pos: BlockPos, id: NetworkId, change: &mut TopologyChange) {
        // A node handed to `add` may carry a stale back-reference; only a
        // network that actually lists it counts.
        let old = self
            .network_of(pos)
            .filter(|old| self.networks.get(old).is_some_and(|n| n.contains(pos)));
        if old == Some(id) {
            return;
        }
        if let Some(old) = old {
            self.detach(pos, old, change);
        }

        debug_assert!(self.networks.contains_key(&id), "network {id} has no entry");
        self.record_network(id);
        if let Some(network) = self.networks.get_mut(&id) {
            network.members.insert(pos);
        }
        self.record_node(pos);
        if let Some(node) = self.nodes.get_mut(&pos) {
            node.set_network(id);
        }
    }

    fn detach(&mut self, pos: BlockPos, id: NetworkId, change: &mut TopologyChange) {
        self.record_network(id);
        let emptied = match self.networks.get_mut(&id) {
            Some(network) => {
                network.members.remove(&pos);
                network.is_empty()
            }
            None => {
                debug_assert!(false, "node {pos} points at missing network {id}");
                false
            }
        };
        if emptied {
            self.networks.remove(&id);
            change.retire(id);
        }
    }

    fn allocate_network(&mut self) -> NetworkId {
        let id = NetworkId(self.next_network_id);
        self.next_network_id += 1;
        self.record_network(id);
        self.networks.insert(id, Network::new(id));
        id
    }

    // -- Journaled storage access --

    fn record_node(&mut self, pos: BlockPos) {
        if let Some(journal) = self.journal.as_mut() {
            journal
                .nodes
                .entry(pos)
                .or_insert_with(|| self.nodes.get(&pos).cloned());
        }
    }

    fn record_network(&mut self, id: NetworkId) {
        if let Some(journal) = self.journal.as_mut() {
            journal
                .networks
                .entry(id)
                .or_insert_with(|| self.networks.get(&id).cloned());
        }
    }

    fn put_node(&mut self, node: N) {
        let pos = node.pos();
        self.record_node(pos);
        self.nodes.insert(pos, node);
    }

    fn take_node_entry(&mut self, pos: BlockPos) -> Option<N> {
        self.record_node(pos);
        self.nodes.remove(&pos)
    }

    // -- Diagnostics --

    /// Check the partition invariant and that every network is one connected
    /// component with no edge leaving it.
    pub fn verify(&self) -> Result<(), NetworkError> {
        let mut covered = 0usize;
        for (id, network) in &self.networks {
            if network.id != *id {
                return Err(NetworkError::Invariant(format!(
                    "network keyed {id} carries id {}",
                    network.id
                )));
            }
            if network.is_empty() {
                return Err(NetworkError::Invariant(format!("network {id} is empty")));
            }
            for pos in network.positions() {
                match self.nodes.get(&pos) {
                    Some(node) if node.network() == Some(*id) => {}
                    Some(node) => {
                        return Err(NetworkError::Invariant(format!(
                            "{pos} listed in network {id} but points at {:?}",
                            node.network()
                        )));
                    }
                    None => {
                        return Err(NetworkError::Invariant(format!(
                            "network {id} lists unregistered {pos}"
                        )));
                    }
                }
            }
            covered += network.len();

            let Some(first) = network.positions().next() else {
                continue;
            };
            let reached: BTreeSet<BlockPos> = self.walk(first).into_iter().collect();
            if reached != network.members {
                return Err(NetworkError::Invariant(format!(
                    "network {id} is not exactly one connected component"
                )));
            }
        }
        if covered != self.nodes.len() {
            return Err(NetworkError::Invariant(format!(
                "{} nodes registered but networks cover {covered}",
                self.nodes.len()
            )));
        }
        if let Some(last) = self.networks.keys().next_back()
            && last.0 >= self.next_network_id
        {
            return Err(NetworkError::Invariant(format!(
                "id counter {} behind allocated id {last}",
                self.next_network_id
            )));
        }
        Ok(())
    }
}

impl<N: GridNode + fmt::Display> NetworkManager<N> {
    /// Human-readable listing of every network and its members, grouped by
    /// network id ascending, members in position order.
    pub fn dump(&self) -> String {
        let mut out = String::new();
        for network in self.networks.values() {
            let plural = if network.len() == 1 { "" } else { "s" };
            out.push_str(&format!(
                "network {} ({} node{plural})\n",
                network.id,
                network.len()
            ));
            for node in self.members(network.id) {
                out.push_str(&format!("  {node}\n"));
            }
        }
        out
    }
}

// ===========================================================================
// Tests
// ===========================================================================
