//! Goban-Tree command line tool.
//!
//! ## Usage
//!
//! - `goban-tree sgf <snapshot.json>` - Replay a JSON snapshot and print SGF
//! - `goban-tree layout <snapshot.json>` - Print the variation diagram
//! - `goban-tree demo` - Grow a random analysis tree and show it

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use goban_tree::board::{BoardState, Color};
use goban_tree::constants::DEFAULT_BOARD_SIZE;
use goban_tree::coords::Point;
use goban_tree::layout::{LayoutOptions, layout, render_ascii};
use goban_tree::snapshot::{BoardReplayer, NodeSnapshot, Replayer, restore};
use goban_tree::{MoveTree, NodeId};

/// Goban-Tree: inspect and export Go move trees
#[derive(Parser)]
#[command(name = "goban-tree")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a JSON snapshot onto an empty board and print it as SGF
    Sgf {
        snapshot: PathBuf,
        /// Board size
        #[arg(long, default_value_t = DEFAULT_BOARD_SIZE)]
        size: usize,
    },
    /// Print the variation diagram of a JSON snapshot
    Layout {
        snapshot: PathBuf,
        /// Board size
        #[arg(long, default_value_t = DEFAULT_BOARD_SIZE)]
        size: usize,
    },
    /// Grow a random analysis tree and print its diagram and SGF
    Demo {
        /// Random seed
        #[arg(long, default_value_t = 7)]
        seed: u64,
        /// Number of moves to add
        #[arg(long, default_value_t = 40)]
        moves: usize,
        /// Board size
        #[arg(long, default_value_t = 9)]
        size: usize,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Some(Commands::Sgf { snapshot, size }) => {
            let tree = load_tree(&snapshot, size)?;
            println!("{}", goban_tree::sgf::to_sgf_game(&tree)?);
        }
        Some(Commands::Layout { snapshot, size }) => {
            let mut tree = load_tree(&snapshot, size)?;
            print_diagram(&mut tree);
        }
        Some(Commands::Demo { seed, moves, size }) => {
            let mut tree = random_tree(seed, moves, size)?;
            print_diagram(&mut tree);
            println!();
            println!("{}", goban_tree::sgf::to_sgf_game(&tree)?);
        }
        None => {
            let mut tree = random_tree(7, 40, 9)?;
            print_diagram(&mut tree);
        }
    }
    Ok(())
}

fn load_tree(path: &Path, size: usize) -> Result<MoveTree> {
    let json = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let snapshot = NodeSnapshot::from_json(&json).with_context(|| format!("parsing {}", path.display()))?;
    let mut tree = MoveTree::new(BoardState::empty(size, size))?;
    let root = tree.root();
    let mut replayer = BoardReplayer::new();
    restore(&mut tree, root, &snapshot, &mut replayer).context("replaying snapshot")?;
    info!(nodes = tree.len(), illegal = replayer.illegal_moves(), "snapshot loaded");
    Ok(tree)
}

fn print_diagram(tree: &mut MoveTree) {
    let result = layout(tree, &LayoutOptions::default());
    let index = tree.recompute_isobranches();
    println!("{}", render_ascii(tree, &result));
    println!(
        "{} nodes, {} columns, {} rows, {} transposed positions",
        tree.len(),
        result.columns,
        result.rows,
        index.shared().count()
    );

    let last = tree.trunk_end();
    let board = tree[last].state.board();
    println!();
    print!("{board}");
    println!(
        "main line ends at move {}: {} black, {} white stones",
        tree[last].move_number,
        board.count(Color::Black),
        board.count(Color::White)
    );
}

/// Play random moves from random nodes. Moves from trunk nodes without a
/// continuation extend the main line; everything else opens a variation.
fn random_tree(seed: u64, moves: usize, size: usize) -> Result<MoveTree> {
    let mut rng = fastrand::Rng::with_seed(seed);
    let mut tree = MoveTree::new(BoardState::empty(size, size))?;
    let mut replayer = BoardReplayer::new();
    let mut nodes: Vec<NodeId> = vec![tree.root()];
    for _ in 0..moves {
        let at = nodes[rng.usize(..nodes.len())];
        let point = Point::new(rng.i32(0..size as i32), rng.i32(0..size as i32));
        let trunk = tree[at].is_trunk() && tree[at].trunk_next().is_none();
        let id = replayer.place(&mut tree, at, point, trunk)?;
        // A new trunk move can absorb a branch at the same point.
        nodes.retain(|&n| tree.contains(n));
        if !nodes.contains(&id) {
            nodes.push(id);
        }
    }
    info!(nodes = tree.len(), seed, illegal = replayer.illegal_moves(), "random tree grown");
    Ok(tree)
}
