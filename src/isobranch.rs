//! Transposition detection: nodes in unrelated lines that reach the same
//! position with the same player to move.

use std::collections::HashMap;

use tracing::debug;

use crate::node::NodeId;
use crate::tree::MoveTree;

/// Position digest to every node that reached it.
///
/// Rebuilt from scratch by [`recompute_isobranches`]; callers own it and may
/// keep it around for lookups between recomputations.
#[derive(Clone, Debug, Default)]
pub struct DigestIndex {
    groups: HashMap<String, Vec<NodeId>>,
}

impl DigestIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Nodes sharing `digest`, in tree pre-order.
    pub fn nodes(&self, digest: &str) -> &[NodeId] {
        self.groups.get(digest).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of distinct positions indexed.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Positions reached by more than one node.
    pub fn shared(&self) -> impl Iterator<Item = (&str, &[NodeId])> + '_ {
        self.groups
            .iter()
            .filter(|(_, ids)| ids.len() > 1)
            .map(|(d, ids)| (d.as_str(), ids.as_slice()))
    }

    fn clear(&mut self) {
        self.groups.clear();
    }
}

/// Refill `index` from the whole tree and rewrite every node's isobranches.
///
/// Passes take no part: they are neither indexed nor given isobranches.
/// Ancestors and descendants of a node are never among its isobranches.
pub fn recompute_isobranches(tree: &mut MoveTree, index: &mut DigestIndex) {
    index.clear();
    let order = tree.preorder(tree.root());
    for &id in &order {
        let node = &tree[id];
        if node.is_pass() {
            continue;
        }
        index
            .groups
            .entry(node.state.digest().to_owned())
            .or_default()
            .push(id);
    }

    let mut linked = 0;
    for &id in &order {
        let iso: Vec<NodeId> = if tree[id].is_pass() {
            Vec::new()
        } else {
            index
                .nodes(tree[id].state.digest())
                .iter()
                .copied()
                .filter(|&other| {
                    other != id && !tree.is_ancestor_of(other, id) && !tree.is_ancestor_of(id, other)
                })
                .collect()
        };
        linked += iso.len();
        tree[id].isobranches = iso;
    }
    debug!(nodes = order.len(), positions = index.len(), links = linked, "recomputed isobranches");
}

/// A transposition is strong when exactly one side is a dead end.
pub fn is_strong_transposition(tree: &MoveTree, a: NodeId, b: NodeId) -> bool {
    tree[a].is_leaf() != tree[b].is_leaf()
}

impl MoveTree {
    /// Recompute isobranches with a fresh index, returning it.
    pub fn recompute_isobranches(&mut self) -> DigestIndex {
        let mut index = DigestIndex::new();
        recompute_isobranches(self, &mut index);
        index
    }
}
