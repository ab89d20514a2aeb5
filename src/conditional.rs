//! Planned responses: "if the opponent plays X, answer with Y".
//!
//! A conditional tree alternates between our planned move (`mv`) and the
//! opponent moves we have prepared for (the child keys). The root's move is
//! normally `None`: nothing is planned until the opponent replies.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Wire form: `[move, { opponent_move: response, ... }]`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConditionalMoveResponse(
    pub Option<String>,
    pub BTreeMap<String, ConditionalMoveResponse>,
);

/// Handle to a node of a [`ConditionalMoveTree`]. Handles into a subtree
/// that was replaced or removed become invalid and may be handed out again.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct CondId(usize);

#[derive(Clone, Debug, Default)]
struct ConditionalNode {
    mv: Option<String>,
    children: BTreeMap<String, CondId>,
    parent: Option<CondId>,
}

/// Answer of [`ConditionalMoveTree::get_child`].
#[derive(Clone, Debug)]
pub enum ConditionalChild {
    /// A response that is already planned.
    Attached(CondId),
    /// Nothing planned yet: an empty tree of its own, outside the parent,
    /// that [`ConditionalMoveTree::attach`] can graft in once filled.
    Placeholder(ConditionalMoveTree),
}

#[derive(Clone, Debug)]
pub struct ConditionalMoveTree {
    nodes: Vec<Option<ConditionalNode>>,
    free: Vec<usize>,
}

impl Default for ConditionalMoveTree {
    fn default() -> Self {
        Self::new(None)
    }
}

impl ConditionalMoveTree {
    pub fn new(mv: Option<String>) -> Self {
        Self {
            nodes: vec![Some(ConditionalNode {
                mv,
                ..Default::default()
            })],
            free: Vec::new(),
        }
    }

    pub fn root(&self) -> CondId {
        CondId(0)
    }

    /// Number of nodes in the tree, root included.
    pub fn len(&self) -> usize {
        self.nodes.len() - self.free.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn node(&self, id: CondId) -> &ConditionalNode {
        match self.nodes.get(id.0).and_then(Option::as_ref) {
            Some(node) => node,
            None => panic!("conditional node {id:?} is not in the tree"),
        }
    }

    fn node_mut(&mut self, id: CondId) -> &mut ConditionalNode {
        match self.nodes.get_mut(id.0).and_then(Option::as_mut) {
            Some(node) => node,
            None => panic!("conditional node {id:?} is not in the tree"),
        }
    }

    /// Our planned move at `id`, `None` if nothing is planned.
    pub fn mv(&self, id: CondId) -> Option<&str> {
        self.node(id).mv.as_deref()
    }

    pub fn set_move(&mut self, id: CondId, mv: Option<String>) {
        self.node_mut(id).mv = mv;
    }

    pub fn parent(&self, id: CondId) -> Option<CondId> {
        self.node(id).parent
    }

    /// Prepared opponent moves and their responses, ordered by move.
    pub fn children(&self, id: CondId) -> impl Iterator<Item = (&str, CondId)> + '_ {
        self.node(id)
            .children
            .iter()
            .map(|(k, &c)| (k.as_str(), c))
    }

    /// The response to `opponent_move`, or an empty placeholder tree when
    /// none is planned. Asking never changes this tree.
    pub fn get_child(&self, id: CondId, opponent_move: &str) -> ConditionalChild {
        match self.node(id).children.get(opponent_move) {
            Some(&child) => ConditionalChild::Attached(child),
            None => ConditionalChild::Placeholder(Self::new(None)),
        }
    }

    /// Graft `subtree` under `parent` as the response to `opponent_move`,
    /// replacing (and freeing) any previous plan for that move.
    pub fn attach(&mut self, parent: CondId, opponent_move: &str, subtree: &ConditionalMoveTree) -> CondId {
        let response = subtree.encode(subtree.root());
        let child = self.add_child(parent, opponent_move, response.0.clone());
        self.decode_children(child, &response);
        child
    }

    /// Plan `response` to `opponent_move` at `id`, replacing (and freeing)
    /// any previous plan for that move.
    pub fn add_child(&mut self, id: CondId, opponent_move: &str, response: Option<String>) -> CondId {
        self.remove_child(id, opponent_move);
        let child = self.push(response, Some(id));
        self.node_mut(id)
            .children
            .insert(opponent_move.to_owned(), child);
        child
    }

    /// Drop the plan for `opponent_move` at `id` and free its subtree.
    /// Returns whether there was one.
    pub fn remove_child(&mut self, id: CondId, opponent_move: &str) -> bool {
        let Some(old) = self.node_mut(id).children.remove(opponent_move) else {
            return false;
        };
        let mut stack = vec![old];
        while let Some(c) = stack.pop() {
            if let Some(node) = self.nodes[c.0].take() {
                stack.extend(node.children.into_values());
                self.free.push(c.0);
            }
        }
        true
    }

    fn push(&mut self, mv: Option<String>, parent: Option<CondId>) -> CondId {
        let node = ConditionalNode {
            mv,
            children: BTreeMap::new(),
            parent,
        };
        match self.free.pop() {
            Some(slot) => {
                self.nodes[slot] = Some(node);
                CondId(slot)
            }
            None => {
                self.nodes.push(Some(node));
                CondId(self.nodes.len() - 1)
            }
        }
    }

    pub fn encode(&self, id: CondId) -> ConditionalMoveResponse {
        let node = self.node(id);
        ConditionalMoveResponse(
            node.mv.clone(),
            node.children
                .iter()
                .map(|(k, &c)| (k.clone(), self.encode(c)))
                .collect(),
        )
    }

    pub fn decode(response: &ConditionalMoveResponse) -> Self {
        let mut tree = Self::new(response.0.clone());
        let root = tree.root();
        tree.decode_children(root, response);
        tree
    }

    fn decode_children(&mut self, id: CondId, response: &ConditionalMoveResponse) {
        for (key, child) in &response.1 {
            let c = self.add_child(id, key, child.0.clone());
            self.decode_children(c, child);
        }
    }

    /// Deep, independent copy of the subtree at `id`.
    pub fn duplicate(&self, id: CondId) -> Self {
        Self::decode(&self.encode(id))
    }

    pub fn to_json(&self, id: CondId) -> serde_json::Result<String> {
        serde_json::to_string(&self.encode(id))
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        Ok(Self::decode(&serde_json::from_str(json)?))
    }
}
