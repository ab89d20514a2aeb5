//! A single move record in the [`MoveTree`](crate::tree::MoveTree).

use std::fmt;

use crate::board::{BoardState, Color};
use crate::coords::Point;
use crate::marks::{ChatLine, MarkGrid, MarkSet, PenMark};

/// Handle of a node inside its tree.
///
/// Ids are handed out in creation order and never reused, so comparing ids
/// is comparing nodes.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A move (or the root position) and everything recorded about it.
///
/// Structural links are read through accessors; they are only changed by the
/// owning tree.
#[derive(Clone, Debug)]
pub struct Node {
    pub(crate) id: NodeId,
    pub point: Point,
    pub player: Color,
    pub move_number: u32,
    pub(crate) trunk: bool,
    pub edited: bool,
    pub(crate) parent: Option<NodeId>,
    pub(crate) trunk_next: Option<NodeId>,
    pub(crate) branches: Vec<NodeId>,
    pub state: BoardState,
    pub(crate) marks: MarkGrid,
    pub pen_marks: Vec<PenMark>,
    pub text: String,
    pub chat_log: Vec<ChatLine>,
    pub correct_answer: bool,
    pub wrong_answer: bool,
    // Written by the layout pass, read by the renderer.
    pub layout_x: i32,
    pub layout_y: i32,
    pub layout_cx: i32,
    pub layout_cy: i32,
    pub active_path_number: u64,
    pub(crate) isobranches: Vec<NodeId>,
}

impl Node {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        id: NodeId,
        point: Point,
        player: Color,
        move_number: u32,
        trunk: bool,
        edited: bool,
        parent: Option<NodeId>,
        state: BoardState,
    ) -> Self {
        let marks = MarkGrid::new(state.board().width(), state.board().height());
        Self {
            id,
            point,
            player,
            move_number,
            trunk,
            edited,
            parent,
            trunk_next: None,
            branches: Vec::new(),
            state,
            marks,
            pen_marks: Vec::new(),
            text: String::new(),
            chat_log: Vec::new(),
            correct_answer: false,
            wrong_answer: false,
            layout_x: 0,
            layout_y: 0,
            layout_cx: 0,
            layout_cy: 0,
            active_path_number: 0,
            isobranches: Vec::new(),
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn is_trunk(&self) -> bool {
        self.trunk
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn trunk_next(&self) -> Option<NodeId> {
        self.trunk_next
    }

    pub fn branches(&self) -> &[NodeId] {
        &self.branches
    }

    /// Trunk continuation first, then the branches in insertion order.
    pub fn children(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.trunk_next.into_iter().chain(self.branches.iter().copied())
    }

    pub fn child_count(&self) -> usize {
        self.trunk_next.is_some() as usize + self.branches.len()
    }

    pub fn is_leaf(&self) -> bool {
        self.trunk_next.is_none() && self.branches.is_empty()
    }

    /// Nodes elsewhere in the tree with the same position, as of the last
    /// isobranch recomputation.
    pub fn isobranches(&self) -> &[NodeId] {
        &self.isobranches
    }

    pub fn marks(&self) -> &MarkGrid {
        &self.marks
    }

    pub fn marks_at(&self, p: Point) -> Option<&MarkSet> {
        self.marks.get(p)
    }

    /// Mutable marks at `p`; allocates the grid on first use.
    pub fn marks_at_mut(&mut self, p: Point) -> Option<&mut MarkSet> {
        self.marks.get_mut(p)
    }

    pub fn has_marks(&self) -> bool {
        self.marks.has_marks()
    }

    pub fn clear_marks(&mut self) {
        self.marks.clear();
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    pub fn add_pen_mark(&mut self, mark: PenMark) {
        self.pen_marks.push(mark);
    }

    pub fn clear_pen_marks(&mut self) {
        self.pen_marks.clear();
    }

    pub fn push_chat(&mut self, line: ChatLine) {
        self.chat_log.push(line);
    }

    pub fn is_pass(&self) -> bool {
        self.point.is_pass()
    }
}
