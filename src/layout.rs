//! Grid layout of the move tree for drawing the variation diagram.
//!
//! Columns are plies below the root and rows are lines of play. The main
//! line always sits on row 0. Every branch gets the first row at or below
//! its parent's that is still free in each column it passes through, so no
//! two nodes ever share a cell.

use std::collections::HashMap;

use tracing::debug;

use crate::board::Color;
use crate::constants::{LAYOUT_CELL_SIZE, LINE_COLORS};
use crate::coords::pretty_coords;
use crate::node::NodeId;
use crate::tree::MoveTree;

#[derive(Clone, Debug)]
pub struct LayoutOptions {
    /// Side of one grid cell in pixels.
    pub cell_size: i32,
    /// Line colors; index 0 is used for the main line.
    pub palette: Vec<String>,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            cell_size: LAYOUT_CELL_SIZE,
            palette: LINE_COLORS.iter().map(|c| c.to_string()).collect(),
        }
    }
}

/// What a layout pass produced besides the per-node cached coordinates.
#[derive(Clone, Debug, Default)]
pub struct LayoutResult {
    pub columns: usize,
    pub rows: usize,
    /// Palette index of the line leading into each node.
    pub line_colors: HashMap<NodeId, usize>,
}

impl LayoutResult {
    pub fn line_color<'a>(&self, opts: &'a LayoutOptions, id: NodeId) -> Option<&'a str> {
        let i = *self.line_colors.get(&id)?;
        opts.palette.get(i).map(String::as_str)
    }
}

struct LayoutPass<'a> {
    opts: &'a LayoutOptions,
    /// Highest row in use per column.
    occupancy: Vec<i32>,
    color_cursor: usize,
    result: LayoutResult,
}

impl LayoutPass<'_> {
    fn branch_color(&mut self, current: usize) -> usize {
        let n = self.opts.palette.len().max(1);
        let mut c = self.color_cursor % n;
        if c == current && n > 1 {
            self.color_cursor += 1;
            c = self.color_cursor % n;
        }
        self.color_cursor += 1;
        c
    }

    fn enter(&mut self, tree: &MoveTree, id: NodeId, x: usize, min_y: i32, color: usize) -> Frame {
        if self.occupancy.len() <= x {
            // Row 0 belongs to the main line in every column.
            self.occupancy.resize(x + 1, 0);
        }
        let node = &tree[id];
        let trunk = node.is_trunk();
        let row = if trunk { 0 } else { min_y.max(self.occupancy[x] + 1) };
        Frame {
            id,
            x,
            trunk,
            row,
            color,
            children: node.children().collect(),
            first_branch: usize::from(node.trunk_next().is_some()),
            next: 0,
            branch_min: if trunk { 1 } else { row },
        }
    }

    fn finish(&mut self, tree: &mut MoveTree, frame: &Frame) -> i32 {
        let (x, row) = (frame.x, frame.row);
        let cell = self.opts.cell_size;
        let node = &mut tree[frame.id];
        node.layout_x = x as i32;
        node.layout_y = row;
        node.layout_cx = x as i32 * cell + cell / 2;
        node.layout_cy = row * cell + cell / 2;
        self.result.line_colors.insert(frame.id, frame.color);

        self.occupancy[x] = self.occupancy[x].max(row);
        if x > 0 {
            self.occupancy[x - 1] = self.occupancy[x - 1].max(row - 1);
        }
        row
    }

    /// Lay out the subtree below `id`, trunk continuation first and then the
    /// branches in order, returning the row given to `id`.
    ///
    /// Each branch starts no higher than the row its previous sibling got,
    /// and a branch node takes the row of its first branch.
    fn place(&mut self, tree: &mut MoveTree, id: NodeId, x: usize, min_y: i32, color: usize) -> i32 {
        let mut stack = vec![self.enter(tree, id, x, min_y, color)];
        let mut returned: Option<i32> = None;
        let mut row = 0;
        while let Some(frame) = stack.last_mut() {
            if let Some(r) = returned.take() {
                if let Some(i) = (frame.next - 1).checked_sub(frame.first_branch) {
                    if i == 0 && !frame.trunk {
                        frame.row = r;
                    }
                    frame.branch_min = r;
                }
            }
            if let Some(&child) = frame.children.get(frame.next) {
                let slot = frame.next;
                frame.next += 1;
                let (min_y, color) = match slot.checked_sub(frame.first_branch) {
                    None => (0, frame.color),
                    Some(0) => (frame.branch_min, frame.color),
                    Some(_) => {
                        let (min_y, current) = (frame.branch_min, frame.color);
                        (min_y, self.branch_color(current))
                    }
                };
                let x = frame.x + 1;
                let entered = self.enter(tree, child, x, min_y, color);
                stack.push(entered);
                continue;
            }
            let Some(done) = stack.pop() else {
                break;
            };
            row = self.finish(tree, &done);
            returned = Some(row);
        }
        row
    }
}

/// A node whose children are still being laid out.
struct Frame {
    id: NodeId,
    x: usize,
    trunk: bool,
    row: i32,
    color: usize,
    /// Trunk continuation (if any) followed by the branches.
    children: Vec<NodeId>,
    first_branch: usize,
    next: usize,
    branch_min: i32,
}

/// Assign every node a grid cell and pixel center.
pub fn layout(tree: &mut MoveTree, opts: &LayoutOptions) -> LayoutResult {
    let mut pass = LayoutPass {
        opts,
        occupancy: Vec::new(),
        color_cursor: 1,
        result: LayoutResult::default(),
    };
    let root = tree.root();
    pass.place(tree, root, 0, 0, 0);

    let mut result = pass.result;
    result.columns = pass.occupancy.len();
    result.rows = tree
        .iter()
        .map(|n| n.layout_y as usize + 1)
        .max()
        .unwrap_or(0);
    debug!(nodes = tree.len(), columns = result.columns, rows = result.rows, "layout pass done");
    result
}

/// Plain text picture of the last layout: one character per cell, upper
/// case on the main line.
pub fn render_ascii(tree: &MoveTree, result: &LayoutResult) -> String {
    let mut grid = vec![vec![' '; result.columns]; result.rows];
    for node in tree.iter() {
        let ch = match (node.player, node.is_trunk()) {
            (Color::Black, true) => 'X',
            (Color::White, true) => 'O',
            (Color::Black, false) => 'x',
            (Color::White, false) => 'o',
            (Color::Empty, _) => '+',
        };
        if let Some(cell) = grid
            .get_mut(node.layout_y as usize)
            .and_then(|row| row.get_mut(node.layout_x as usize))
        {
            *cell = ch;
        }
    }
    grid.into_iter()
        .map(|row| row.into_iter().collect::<String>().trim_end().to_string())
        .collect::<Vec<_>>()
        .join("\n")
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LabelStyle {
    MoveNumber,
    Coordinates,
}

/// Renderer-side node labels, computed on demand and kept until invalidated.
#[derive(Clone, Debug)]
pub struct LabelCache {
    style: LabelStyle,
    labels: HashMap<NodeId, String>,
}

impl LabelCache {
    pub fn new(style: LabelStyle) -> Self {
        Self {
            style,
            labels: HashMap::new(),
        }
    }

    pub fn label(&mut self, tree: &MoveTree, id: NodeId) -> &str {
        let style = self.style;
        self.labels.entry(id).or_insert_with(|| {
            let node = &tree[id];
            if node.parent().is_none() {
                return String::new();
            }
            match style {
                LabelStyle::MoveNumber => node.move_number.to_string(),
                LabelStyle::Coordinates => pretty_coords(node.point, tree.height()),
            }
        })
    }

    pub fn invalidate(&mut self, id: NodeId) {
        self.labels.remove(&id);
    }

    pub fn set_style(&mut self, style: LabelStyle) {
        if style != self.style {
            self.style = style;
            self.labels.clear();
        }
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::board::BoardState;
    use crate::coords::Point;

    fn add(tree: &mut MoveTree, at: NodeId, x: i32, trunk: bool) -> NodeId {
        let player = if tree[at].player == Color::Black { Color::White } else { Color::Black };
        let number = tree[at].move_number + 1;
        let state = BoardState::empty(9, 9);
        tree.insert_or_advance(at, Point::new(x, number as i32 % 9), trunk, false, player, number, state)
            .unwrap()
    }

    fn cells(tree: &MoveTree) -> HashSet<(i32, i32)> {
        tree.iter().map(|n| (n.layout_x, n.layout_y)).collect()
    }

    #[test]
    fn test_main_line_on_row_zero() {
        let mut tree = MoveTree::with_size(9, 9).unwrap();
        let mut cur = tree.root();
        for i in 0..5 {
            cur = add(&mut tree, cur, i, true);
        }
        let result = layout(&mut tree, &LayoutOptions::default());
        assert_eq!(result.columns, 6);
        assert_eq!(result.rows, 1);
        for node in tree.iter() {
            assert_eq!(node.layout_y, 0);
        }
        assert_eq!(tree[cur].layout_x, 5);
        assert_eq!(tree[cur].layout_cx, 5 * LAYOUT_CELL_SIZE + LAYOUT_CELL_SIZE / 2);
        assert_eq!(tree[cur].layout_cy, LAYOUT_CELL_SIZE / 2);
    }

    #[test]
    fn test_branches_stack_below() {
        let mut tree = MoveTree::with_size(9, 9).unwrap();
        let root = tree.root();
        let a = add(&mut tree, root, 0, true);
        let t = add(&mut tree, a, 1, true);
        let b1 = add(&mut tree, a, 2, false);
        let b2 = add(&mut tree, a, 3, false);
        let b1c = add(&mut tree, b1, 4, false);

        layout(&mut tree, &LayoutOptions::default());
        assert_eq!((tree[t].layout_x, tree[t].layout_y), (2, 0));
        assert_eq!((tree[b1].layout_x, tree[b1].layout_y), (2, 1));
        assert_eq!((tree[b1c].layout_x, tree[b1c].layout_y), (3, 1));
        assert_eq!(tree[b2].layout_x, 2);
        assert!(tree[b2].layout_y > 1);
        assert_eq!(cells(&tree).len(), tree.len());
    }

    #[test]
    fn test_no_collisions_in_bushy_tree() {
        let mut tree = MoveTree::with_size(9, 9).unwrap();
        let root = tree.root();
        let mut frontier = vec![root];
        let mut x = 0;
        for _ in 0..4 {
            let mut next = Vec::new();
            for &at in &frontier {
                let trunk = tree[at].is_trunk();
                next.push(add(&mut tree, at, x % 9, trunk));
                x += 1;
                next.push(add(&mut tree, at, x % 9, false));
                x += 1;
            }
            frontier = next;
        }
        layout(&mut tree, &LayoutOptions::default());
        assert_eq!(cells(&tree).len(), tree.len());
    }

    #[test]
    fn test_branch_colors_differ_from_parent_line() {
        let mut tree = MoveTree::with_size(9, 9).unwrap();
        let root = tree.root();
        let t = add(&mut tree, root, 0, true);
        let b1 = add(&mut tree, root, 1, false);
        let b2 = add(&mut tree, root, 2, false);
        let b1c = add(&mut tree, b1, 3, false);

        let opts = LayoutOptions::default();
        let result = layout(&mut tree, &opts);
        assert_eq!(result.line_colors[&t], 0);
        assert_eq!(result.line_colors[&b1], 0);
        assert_ne!(result.line_colors[&b2], 0);
        assert_eq!(result.line_colors[&b1c], result.line_colors[&b1]);
        assert_eq!(result.line_color(&opts, t), Some(LINE_COLORS[0]));
    }

    #[test]
    fn test_render_ascii() {
        let mut tree = MoveTree::with_size(9, 9).unwrap();
        let root = tree.root();
        let a = add(&mut tree, root, 0, true);
        add(&mut tree, a, 1, true);
        add(&mut tree, a, 2, false);
        let result = layout(&mut tree, &LayoutOptions::default());
        assert_eq!(render_ascii(&tree, &result), "+XO\n  o");
    }

    #[test]
    fn test_label_cache() {
        let mut tree = MoveTree::with_size(9, 9).unwrap();
        let root = tree.root();
        let a = add(&mut tree, root, 3, true);
        let mut labels = LabelCache::new(LabelStyle::MoveNumber);
        assert_eq!(labels.label(&tree, root), "");
        assert_eq!(labels.label(&tree, a), "1");
        assert_eq!(labels.len(), 2);

        labels.set_style(LabelStyle::Coordinates);
        assert!(labels.is_empty());
        assert_eq!(labels.label(&tree, a), "D8");
        labels.invalidate(a);
        assert!(labels.is_empty());
    }

    #[test]
    fn test_very_deep_lines() {
        const DEPTH: usize = 30_000;
        let mut tree = MoveTree::with_size(9, 9).unwrap();
        let root = tree.root();
        let (mut trunk, mut branch) = (root, root);
        for i in 0..DEPTH {
            trunk = add(&mut tree, trunk, (i % 9) as i32, true);
            branch = add(&mut tree, branch, ((i + 4) % 9) as i32, false);
        }
        let result = layout(&mut tree, &LayoutOptions::default());
        assert_eq!(result.columns, DEPTH + 1);
        assert_eq!(result.rows, 2);
        assert_eq!((tree[trunk].layout_x, tree[trunk].layout_y), (DEPTH as i32, 0));
        assert_eq!((tree[branch].layout_x, tree[branch].layout_y), (DEPTH as i32, 1));
        assert_eq!(cells(&tree).len(), tree.len());
    }
}
