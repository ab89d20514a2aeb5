//! Per-viewer navigation through a [`MoveTree`].
//!
//! Walking back up remembers which branch the viewer came from, so that
//! walking forward again returns to it. That memory belongs to the viewer,
//! not to the tree.

use std::collections::HashMap;

use crate::node::NodeId;
use crate::tree::MoveTree;

#[derive(Clone, Debug)]
pub struct Cursor {
    current: NodeId,
    hints: HashMap<NodeId, NodeId>,
}

impl Cursor {
    pub fn new(start: NodeId) -> Self {
        Self {
            current: start,
            hints: HashMap::new(),
        }
    }

    pub fn current(&self) -> NodeId {
        self.current
    }

    pub fn jump(&mut self, id: NodeId) {
        self.current = id;
    }

    /// Branch last left through [`prev`](Self::prev) from `id`, if any.
    pub fn hint(&self, id: NodeId) -> Option<NodeId> {
        self.hints.get(&id).copied()
    }

    /// Step forward: trunk continuation first, then the remembered branch
    /// (when `prefer_last_visited` and it still exists), then the first
    /// branch. Stays put at a leaf.
    pub fn next(&mut self, tree: &MoveTree, prefer_last_visited: bool) -> Option<NodeId> {
        let node = &tree[self.current];
        let next = node.trunk_next().or_else(|| {
            let remembered = prefer_last_visited
                .then(|| self.hint(self.current))
                .flatten()
                .filter(|h| node.branches().contains(h));
            remembered.or_else(|| node.branches().first().copied())
        })?;
        self.current = next;
        Some(next)
    }

    /// Step back to the parent, remembering where we came from.
    pub fn prev(&mut self, tree: &MoveTree) -> Option<NodeId> {
        let parent = tree[self.current].parent()?;
        self.hints.insert(parent, self.current);
        self.current = parent;
        Some(parent)
    }

    /// Drop hints that point at nodes no longer in `tree`.
    pub fn prune(&mut self, tree: &MoveTree) {
        self.hints
            .retain(|from, to| tree.contains(*from) && tree.contains(*to));
        if !tree.contains(self.current) {
            self.current = tree.root();
        }
    }
}
