//! Goban-Tree: the move tree behind a Go board viewer.
//!
//! This crate records a game as a branching tree of moves (the main line plus
//! any analysis variations), together with marks, commentary and puzzle
//! flags, and provides what a renderer and a transport layer need on top of
//! it.
//!
//! ## Modules
//!
//! - [`tree`] - The move tree: insertion, lookup, traversal, removal
//! - [`node`] - A single move record
//! - [`cursor`] - Per-viewer forward/back navigation
//! - [`isobranch`] - Transposition detection between unrelated lines
//! - [`layout`] - Grid layout for the variation diagram
//! - [`snapshot`] - JSON snapshot and two-phase restore
//! - [`sgf`] - SGF export
//! - [`conditional`] - Planned conditional responses
//! - [`board`], [`coords`], [`marks`] - Board matrices, coordinates, annotations
//!
//! ## Example
//!
//! ```
//! use goban_tree::board::{BoardState, Color};
//! use goban_tree::coords::Point;
//! use goban_tree::layout::{layout, LayoutOptions};
//! use goban_tree::tree::MoveTree;
//!
//! let mut tree = MoveTree::with_size(9, 9).unwrap();
//! let root = tree.root();
//! let state = BoardState::empty(9, 9);
//! let a = tree
//!     .insert_or_advance(root, Point::new(2, 2), true, false, Color::Black, 1, state)
//!     .unwrap();
//!
//! layout(&mut tree, &LayoutOptions::default());
//! assert_eq!((tree[a].layout_x, tree[a].layout_y), (1, 0));
//! println!("{}", goban_tree::sgf::to_sgf_game(&tree).unwrap());
//! ```

pub mod board;
pub mod conditional;
pub mod constants;
pub mod coords;
pub mod cursor;
pub mod error;
pub mod isobranch;
pub mod layout;
pub mod marks;
pub mod node;
pub mod sgf;
pub mod snapshot;
pub mod tree;

pub use error::{Result, TreeError};
pub use node::{Node, NodeId};
pub use tree::MoveTree;
