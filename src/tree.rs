//! The game move tree: main line, analysis branches and navigation.
//!
//! Nodes live in a flat arena owned by [`MoveTree`] and refer to each other
//! by [`NodeId`]. A parent owns its `trunk_next` and `branches`; the parent
//! link is a plain back reference. Removing a node frees its whole subtree.
//! Arena slots are never reused, which keeps ids unique and increasing.

use std::ops::{Index, IndexMut};

use tracing::{debug, trace};

use crate::board::{BoardState, Color};
use crate::constants::MAX_BOARD_SIZE;
use crate::coords::{Point, encode_moves};
use crate::error::{Result, TreeError};
use crate::node::{Node, NodeId};

pub struct MoveTree {
    width: usize,
    height: usize,
    nodes: Vec<Option<Node>>,
    root: NodeId,
    live: usize,
    path_counter: u64,
}

impl MoveTree {
    /// Create a tree whose root holds `state`. The root is a trunk pass by
    /// nobody at move 0.
    ///
    /// Both board dimensions must lie in `1..=MAX_BOARD_SIZE`.
    pub fn new(state: BoardState) -> Result<Self> {
        let width = state.board().width();
        let height = state.board().height();
        let allowed = 1..=MAX_BOARD_SIZE;
        if !allowed.contains(&width) || !allowed.contains(&height) {
            return Err(TreeError::InvalidArgument(format!(
                "board size {width}x{height} is outside 1..={MAX_BOARD_SIZE}"
            )));
        }
        let root = NodeId(0);
        let node = Node::new(root, Point::PASS, Color::Empty, 0, true, false, None, state);
        Ok(Self {
            width,
            height,
            nodes: vec![Some(node)],
            root,
            live: 1,
            path_counter: 0,
        })
    }

    /// Tree over an empty `width` x `height` board, black to move.
    pub fn with_size(width: usize, height: usize) -> Result<Self> {
        Self::new(BoardState::empty(width, height))
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// True for a pass or an intersection of this tree's board.
    pub fn on_board(&self, point: Point) -> bool {
        point.is_pass()
            || (usize::try_from(point.x).is_ok_and(|x| x < self.width)
                && usize::try_from(point.y).is_ok_and(|y| y < self.height))
    }

    /// Number of live nodes, root included.
    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.get(id).is_some()
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0).and_then(Option::as_ref)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0).and_then(Option::as_mut)
    }

    /// Live nodes in creation order.
    pub fn iter(&self) -> impl Iterator<Item = &Node> + '_ {
        self.nodes.iter().flatten()
    }

    fn alloc(&mut self, build: impl FnOnce(NodeId) -> Node) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Some(build(id)));
        self.live += 1;
        id
    }

    /// Find the child of `at` that records this move.
    ///
    /// The trunk continuation matches on point and edited flag, plus the
    /// player only for edited placements. Branches always match the player.
    pub fn lookup(&self, at: NodeId, point: Point, player: Color, edited: bool) -> Option<NodeId> {
        let node = &self[at];
        if let Some(next) = node.trunk_next {
            let n = &self[next];
            if n.point == point && n.edited == edited && (!edited || n.player == player) {
                return Some(next);
            }
        }
        node.branches.iter().copied().find(|&b| {
            let n = &self[b];
            n.point == point && n.edited == edited && n.player == player
        })
    }

    /// Record a move played from `at` and return the node holding it.
    ///
    /// Replaying a move that is already recorded refreshes that node's state
    /// and move number in place. A new trunk move absorbs the children of a
    /// branch at the same point and demotes any previous trunk continuation
    /// to a branch. Points off the board are rejected.
    #[allow(clippy::too_many_arguments)]
    pub fn insert_or_advance(
        &mut self,
        at: NodeId,
        point: Point,
        trunk: bool,
        edited: bool,
        player: Color,
        move_number: u32,
        state: BoardState,
    ) -> Result<NodeId> {
        if !self.on_board(point) {
            return Err(TreeError::InvalidArgument(format!(
                "move {point} is off the {}x{} board",
                self.width, self.height
            )));
        }
        if let Some(existing) = self.lookup(at, point, player, edited) {
            if self[existing].trunk || !trunk {
                let node = &mut self[existing];
                node.state = state;
                node.move_number = move_number;
                trace!(node = %existing, %point, "advanced to existing node");
                return Ok(existing);
            }
        }

        if trunk && !self[at].trunk {
            return Err(TreeError::InvalidOperation(format!(
                "trunk move {point} requested from non-trunk node {at}"
            )));
        }

        let id = self.alloc(|id| {
            Node::new(id, point, player, move_number, trunk, edited, Some(at), state)
        });

        if trunk {
            if let Some(pos) = self[at].branches.iter().position(|&b| self[b].point == point) {
                let old = self[at].branches.remove(pos);
                self.merge_branch_into(old, id);
            }
            if let Some(previous) = self[at].trunk_next.take() {
                self.demote(previous);
                self[at].branches.push(previous);
            }
            self[at].trunk_next = Some(id);
        } else {
            self[at].branches.push(id);
        }
        debug!(node = %id, parent = %at, %point, trunk, edited, "created node");
        Ok(id)
    }

    /// Same as [`insert_or_advance`](Self::insert_or_advance) with the player
    /// given as its wire number (0 none, 1 black, 2 white).
    #[allow(clippy::too_many_arguments)]
    pub fn insert_or_advance_raw(
        &mut self,
        at: NodeId,
        point: Point,
        trunk: bool,
        edited: bool,
        player: i64,
        move_number: u32,
        state: BoardState,
    ) -> Result<NodeId> {
        let player = Color::try_from(player)?;
        self.insert_or_advance(at, point, trunk, edited, player, move_number, state)
    }

    /// Move the children of the detached branch `old` under `new` and free
    /// `old` itself.
    fn merge_branch_into(&mut self, old: NodeId, new: NodeId) {
        let children: Vec<NodeId> = self[old].children().collect();
        for &child in &children {
            self.demote(child);
            self[child].parent = Some(new);
        }
        debug!(from = %old, into = %new, moved = children.len(), "merged branch into trunk");
        self[new].branches.extend(children);
        self.nodes[old.0] = None;
        self.live -= 1;
    }

    /// Clear the trunk flag down a former main line, turning its trunk
    /// links into first branches.
    fn demote(&mut self, start: NodeId) {
        let mut cur = Some(start);
        while let Some(id) = cur {
            let node = &mut self[id];
            if !node.trunk && node.trunk_next.is_none() {
                break;
            }
            node.trunk = false;
            cur = node.trunk_next.take();
            if let Some(next) = cur {
                node.branches.insert(0, next);
            }
        }
    }

    /// Detach `id` and its subtree from the tree, returning the parent.
    pub fn remove(&mut self, id: NodeId) -> Result<NodeId> {
        let parent = self[id]
            .parent
            .ok_or_else(|| TreeError::InvalidOperation("cannot remove the root".into()))?;
        let p = &mut self[parent];
        if p.trunk_next == Some(id) {
            p.trunk_next = None;
        } else {
            p.branches.retain(|&b| b != id);
        }

        let doomed = self.preorder(id);
        for d in &doomed {
            self.nodes[d.0] = None;
        }
        self.live -= doomed.len();
        for node in self.nodes.iter_mut().flatten() {
            node.isobranches.retain(|i| !doomed.contains(i));
        }
        debug!(node = %id, freed = doomed.len(), "removed subtree");
        Ok(parent)
    }

    /// True if `ancestor` is on `other`'s parent chain.
    pub fn is_ancestor_of(&self, ancestor: NodeId, other: NodeId) -> bool {
        let mut cur = self[other].parent;
        while let Some(id) = cur {
            if id == ancestor {
                return true;
            }
            cur = self[id].parent;
        }
        false
    }

    /// Ids below and including `from`: self, trunk subtree, then branches.
    pub fn preorder(&self, from: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![from];
        while let Some(id) = stack.pop() {
            out.push(id);
            let node = &self[id];
            stack.extend(node.branches.iter().rev());
            stack.extend(node.trunk_next);
        }
        out
    }

    pub fn traverse(&self, from: NodeId, mut visit: impl FnMut(&Node)) {
        let _ = self.try_traverse(from, |node| {
            visit(node);
            Ok::<(), std::convert::Infallible>(())
        });
    }

    /// Pre-order walk that stops at the first error returned by `visit`.
    pub fn try_traverse<E>(
        &self,
        from: NodeId,
        mut visit: impl FnMut(&Node) -> std::result::Result<(), E>,
    ) -> std::result::Result<(), E> {
        let mut stack = vec![from];
        while let Some(id) = stack.pop() {
            let node = &self[id];
            visit(node)?;
            stack.extend(node.branches.iter().rev());
            stack.extend(node.trunk_next);
        }
        Ok(())
    }

    /// Thread an accumulator through the same walk as [`traverse`](Self::traverse).
    pub fn fold<T>(&self, from: NodeId, seed: T, mut combine: impl FnMut(T, &Node) -> T) -> T {
        let mut acc = seed;
        let mut stack = vec![from];
        while let Some(id) = stack.pop() {
            let node = &self[id];
            acc = combine(acc, node);
            stack.extend(node.branches.iter().rev());
            stack.extend(node.trunk_next);
        }
        acc
    }

    /// Nearest node on the trunk, starting with `id` itself.
    pub fn branch_point(&self, id: NodeId) -> NodeId {
        let mut cur = id;
        while !self[cur].trunk {
            match self[cur].parent {
                Some(p) => cur = p,
                None => break,
            }
        }
        cur
    }

    /// Last node of the main line.
    pub fn trunk_end(&self) -> NodeId {
        let mut cur = self.root;
        while let Some(next) = self[cur].trunk_next {
            cur = next;
        }
        cur
    }

    /// Moves played since leaving the trunk (0 on the trunk).
    pub fn move_index(&self, id: NodeId) -> u32 {
        let bp = self.branch_point(id);
        self[id].move_number.saturating_sub(self[bp].move_number)
    }

    /// Path from the root down to `id`, both included.
    pub fn move_path(&self, id: NodeId) -> Vec<NodeId> {
        let mut path = vec![id];
        let mut cur = self[id].parent;
        while let Some(p) = cur {
            path.push(p);
            cur = self[p].parent;
        }
        path.reverse();
        path
    }

    /// Encoded moves from the root to `id`, e.g. `"ccdd"`.
    pub fn move_string(&self, id: NodeId) -> Result<String> {
        let points: Vec<Point> = self
            .move_path(id)
            .into_iter()
            .skip(1)
            .map(|n| self[n].point)
            .collect();
        encode_moves(&points)
    }

    fn sibling(&self, id: NodeId, offset: isize) -> Option<NodeId> {
        let parent = self[id].parent?;
        let siblings: Vec<NodeId> = self[parent].children().collect();
        let pos = siblings.iter().position(|&s| s == id)? as isize + offset;
        usize::try_from(pos).ok().and_then(|i| siblings.get(i).copied())
    }

    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.sibling(id, 1)
    }

    pub fn prev_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.sibling(id, -1)
    }

    /// Extend the trunk through first branches until it reaches a leaf.
    pub fn hoist_first_branch_to_trunk(&mut self, id: NodeId) -> Result<()> {
        if !self[id].trunk {
            return Err(TreeError::InvalidOperation(format!(
                "cannot hoist below non-trunk node {id}"
            )));
        }
        let mut cur = id;
        loop {
            let node = &mut self[cur];
            if node.trunk_next.is_none() && !node.branches.is_empty() {
                let first = node.branches.remove(0);
                node.trunk_next = Some(first);
                debug!(node = %first, "hoisted branch to trunk");
            }
            let Some(next) = node.trunk_next else {
                break;
            };
            self[next].trunk = true;
            cur = next;
        }
        Ok(())
    }

    /// True if `id` or anything below it is marked as a correct answer.
    pub fn has_correct_answer_below(&self, id: NodeId) -> bool {
        self.fold(id, false, |found, node| found || node.correct_answer)
    }

    pub fn correct_answers(&self) -> Vec<NodeId> {
        self.preorder(self.root)
            .into_iter()
            .filter(|&id| self[id].correct_answer)
            .collect()
    }

    /// Stamp a fresh path number on `id` and all of its ancestors.
    pub fn set_active_path(&mut self, id: NodeId) -> u64 {
        self.path_counter += 1;
        let number = self.path_counter;
        let mut cur = Some(id);
        while let Some(n) = cur {
            let node = &mut self[n];
            node.active_path_number = number;
            cur = node.parent;
        }
        number
    }

    pub fn is_on_active_path(&self, id: NodeId, number: u64) -> bool {
        self[id].active_path_number == number
    }
}

/// Panics if the node was removed.
impl Index<NodeId> for MoveTree {
    type Output = Node;

    fn index(&self, id: NodeId) -> &Node {
        match self.get(id) {
            Some(node) => node,
            None => panic!("node {id} is not in the tree"),
        }
    }
}

impl IndexMut<NodeId> for MoveTree {
    fn index_mut(&mut self, id: NodeId) -> &mut Node {
        match self.get_mut(id) {
            Some(node) => node,
            None => panic!("node {id} is not in the tree"),
        }
    }
}
