//! JSON snapshot of a tree's shape and annotations.
//!
//! A snapshot records moves by coordinate only. Restoring is done in two
//! steps that must stay in lockstep: the engine replays every move to
//! rebuild the tree (and its board states), then the annotations of each
//! snapshot node are loaded onto the node the replay produced.

use serde::{Deserialize, Serialize};
use tracing::{trace, warn};

use crate::board::{BoardState, Color};
use crate::coords::Point;
use crate::error::{Result, TreeError};
use crate::marks::{MarkSet, PenMark};
use crate::node::NodeId;
use crate::tree::MoveTree;

fn is_false(b: &bool) -> bool {
    !*b
}

/// Marks on one intersection.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkEntry {
    pub x: i32,
    pub y: i32,
    pub marks: MarkSet,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeSnapshot {
    pub x: i32,
    pub y: i32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub pen_marks: Vec<PenMark>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub marks: Vec<MarkEntry>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trunk_next: Option<Box<NodeSnapshot>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub branches: Vec<NodeSnapshot>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub correct_answer: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub wrong_answer: bool,
}

impl NodeSnapshot {
    pub fn point(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Number of nodes in this snapshot, itself included.
    pub fn node_count(&self) -> usize {
        1 + self.trunk_next.as_ref().map_or(0, |t| t.node_count())
            + self.branches.iter().map(NodeSnapshot::node_count).sum::<usize>()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

impl MoveTree {
    /// Snapshot of `id` and everything below it.
    pub fn to_snapshot(&self, id: NodeId) -> NodeSnapshot {
        let node = &self[id];
        NodeSnapshot {
            x: node.point.x,
            y: node.point.y,
            pen_marks: node.pen_marks.clone(),
            marks: node
                .marks()
                .iter()
                .map(|(p, m)| MarkEntry {
                    x: p.x,
                    y: p.y,
                    marks: m.clone(),
                })
                .collect(),
            text: node.text.clone(),
            trunk_next: node.trunk_next().map(|t| Box::new(self.to_snapshot(t))),
            branches: node.branches().iter().map(|&b| self.to_snapshot(b)).collect(),
            correct_answer: node.correct_answer,
            wrong_answer: node.wrong_answer,
        }
    }

    /// Load the annotations of one snapshot node onto `id`.
    ///
    /// Children are not visited. Fails without touching the node if the
    /// snapshot was taken at a different point.
    pub fn load_snapshot_for_node(&mut self, id: NodeId, snapshot: &NodeSnapshot) -> Result<()> {
        let node = &mut self[id];
        if node.point != snapshot.point() {
            warn!(node = %id, expected = %node.point, found = %snapshot.point(), "snapshot out of step with tree");
            return Err(TreeError::CorruptState(format!(
                "snapshot node at {} restored onto node {id} at {}",
                snapshot.point(),
                node.point
            )));
        }
        node.pen_marks = snapshot.pen_marks.clone();
        node.clear_marks();
        for entry in &snapshot.marks {
            if let Some(marks) = node.marks_at_mut(Point::new(entry.x, entry.y)) {
                *marks = entry.marks.clone();
            }
        }
        node.text = snapshot.text.clone();
        node.correct_answer = snapshot.correct_answer;
        node.wrong_answer = snapshot.wrong_answer;
        Ok(())
    }
}

/// Engine side of a restore: play a move below `parent` and return the node
/// that records it.
pub trait Replayer {
    fn place(&mut self, tree: &mut MoveTree, parent: NodeId, point: Point, trunk: bool) -> Result<NodeId>;
}

impl<F> Replayer for F
where
    F: FnMut(&mut MoveTree, NodeId, Point, bool) -> Result<NodeId>,
{
    fn place(&mut self, tree: &mut MoveTree, parent: NodeId, point: Point, trunk: bool) -> Result<NodeId> {
        self(tree, parent, point, trunk)
    }
}

/// Rebuild the subtree of `snapshot` below `start` and load its annotations.
///
/// `start` must be the node the snapshot root was taken from.
pub fn restore(
    tree: &mut MoveTree,
    start: NodeId,
    snapshot: &NodeSnapshot,
    replayer: &mut impl Replayer,
) -> Result<()> {
    tree.load_snapshot_for_node(start, snapshot)?;
    if let Some(next) = &snapshot.trunk_next {
        let child = replayer.place(tree, start, next.point(), true)?;
        restore(tree, child, next, replayer)?;
    }
    for branch in &snapshot.branches {
        let child = replayer.place(tree, start, branch.point(), false)?;
        restore(tree, child, branch, replayer)?;
    }
    Ok(())
}

/// Replays moves onto plain boards, alternating colors from the parent's
/// player to move. Stones are placed with captures but without any other
/// rule checks.
///
/// A move the board refuses (an occupied point or a suicide) is still
/// recorded, over an unchanged board, and counted in
/// [`illegal_moves`](Self::illegal_moves).
#[derive(Clone, Copy, Debug, Default)]
pub struct BoardReplayer {
    illegal: usize,
}

impl BoardReplayer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Moves replayed so far that the board refused.
    pub fn illegal_moves(&self) -> usize {
        self.illegal
    }
}

impl Replayer for BoardReplayer {
    fn place(&mut self, tree: &mut MoveTree, parent: NodeId, point: Point, trunk: bool) -> Result<NodeId> {
        let node = &tree[parent];
        let player = match node.state.to_move() {
            Color::Empty => Color::Black,
            c => c,
        };
        let mut board = node.state.board().clone();
        let result = board.play(point, player);
        if !point.is_pass() && !result.legal {
            self.illegal += 1;
            warn!(parent = %parent, %point, ?player, suicide = result.suicide, "replayed move is not legal on the board");
        } else if result.captures > 0 {
            trace!(%point, captures = result.captures, "replayed move captured stones");
        }
        let state = BoardState::new(board, player.opponent());
        let number = node.move_number + 1;
        let trunk = trunk && node.is_trunk();
        tree.insert_or_advance(parent, point, trunk, false, player, number, state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::marks::ChatLine;

    fn sample_tree() -> (MoveTree, NodeId, NodeId) {
        let mut tree = MoveTree::with_size(9, 9).unwrap();
        let root = tree.root();
        let mut replay = BoardReplayer::new();
        let a = replay.place(&mut tree, root, Point::new(2, 2), true).unwrap();
        let b = replay.place(&mut tree, a, Point::new(3, 3), false).unwrap();
        replay.place(&mut tree, a, Point::new(4, 4), true).unwrap();
        tree[b].marks_at_mut(Point::new(1, 1)).unwrap().triangle = true;
        tree[b].set_text("nice");
        tree[b].correct_answer = true;
        tree[a].add_pen_mark(PenMark {
            color: "#ff0000".into(),
            points: vec![1, 2, 3, 4],
        });
        (tree, a, b)
    }

    #[test]
    fn test_snapshot_json_shape() {
        let (tree, _, _) = sample_tree();
        let json = tree.to_snapshot(tree.root()).to_json().unwrap();
        assert_eq!(
            json,
            concat!(
                r##"{"x":-1,"y":-1,"trunk_next":{"x":2,"y":2,"##,
                r##""pen_marks":[{"color":"#ff0000","points":[1,2,3,4]}],"##,
                r##""trunk_next":{"x":4,"y":4},"##,
                r##""branches":[{"x":3,"y":3,"marks":[{"x":1,"y":1,"marks":{"triangle":true}}],"##,
                r##""text":"nice","correct_answer":true}]}}"##
            )
        );
    }

    #[test]
    fn test_restore_roundtrip() {
        let (tree, _, _) = sample_tree();
        let snapshot = tree.to_snapshot(tree.root());

        let mut restored = MoveTree::with_size(9, 9).unwrap();
        let root = restored.root();
        restore(&mut restored, root, &snapshot, &mut BoardReplayer::new()).unwrap();
        assert_eq!(restored.len(), tree.len());
        assert_eq!(restored.to_snapshot(root), snapshot);
    }

    #[test]
    fn test_chat_is_not_part_of_snapshot() {
        let (mut tree, a, _) = sample_tree();
        tree[a].push_chat(ChatLine {
            player_id: None,
            username: "alice".into(),
            body: "hi".into(),
        });
        assert!(!tree.to_snapshot(a).to_json().unwrap().contains("alice"));
    }

    #[test]
    fn test_mismatched_node_is_corrupt() {
        let (mut tree, a, b) = sample_tree();
        let snapshot = tree.to_snapshot(b);
        let before = tree[a].pen_marks.clone();
        let err = tree.load_snapshot_for_node(a, &snapshot).unwrap_err();
        assert!(matches!(err, TreeError::CorruptState(_)));
        assert_eq!(tree[a].pen_marks, before);
    }

    #[test]
    fn test_restore_with_closure_replayer() {
        let snapshot = NodeSnapshot::from_json(
            r#"{"x":-1,"y":-1,"branches":[{"x":0,"y":0,"text":"corner"},{"x":-1,"y":-1}]}"#,
        )
        .unwrap();
        assert_eq!(snapshot.node_count(), 3);

        let mut tree = MoveTree::with_size(9, 9).unwrap();
        let root = tree.root();
        let mut placed = Vec::new();
        let mut replayer = |tree: &mut MoveTree, parent: NodeId, point: Point, trunk: bool| {
            placed.push(point);
            BoardReplayer::new().place(tree, parent, point, trunk)
        };
        restore(&mut tree, root, &snapshot, &mut replayer).unwrap();
        assert_eq!(placed, vec![Point::new(0, 0), Point::PASS]);
        assert_eq!(tree[tree[root].branches()[0]].text, "corner");
    }

    #[test]
    fn test_illegal_replay_is_counted() {
        let mut tree = MoveTree::with_size(9, 9).unwrap();
        let root = tree.root();
        let mut replay = BoardReplayer::new();
        let a = replay.place(&mut tree, root, Point::new(2, 2), true).unwrap();
        let again = replay.place(&mut tree, a, Point::new(2, 2), true).unwrap();
        assert_eq!(replay.illegal_moves(), 1);
        assert_eq!(tree[again].state.board(), tree[a].state.board());
        assert_eq!(tree[again].player, Color::White);

        let pass = replay.place(&mut tree, again, Point::PASS, true).unwrap();
        assert_eq!(replay.illegal_moves(), 1);
        assert!(tree[pass].is_pass());
    }

    #[test]
    fn test_restore_stops_on_replay_error() {
        let snapshot = NodeSnapshot::from_json(r#"{"x":-1,"y":-1,"branches":[{"x":5,"y":5}]}"#).unwrap();
        let mut tree = MoveTree::with_size(9, 9).unwrap();
        let root = tree.root();
        // A replayer that lands on the wrong point is caught by the
        // annotation step.
        let mut replayer = |tree: &mut MoveTree, parent: NodeId, _: Point, trunk: bool| {
            BoardReplayer::new().place(tree, parent, Point::new(1, 1), trunk)
        };
        let err = restore(&mut tree, root, &snapshot, &mut replayer).unwrap_err();
        assert!(matches!(err, TreeError::CorruptState(_)));
    }
}
