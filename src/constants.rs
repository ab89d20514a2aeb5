//! Constants for board geometry and the tree diagram.
//!
//! Runtime knobs that a renderer may want to override are gathered in
//! [`LayoutOptions`](crate::layout::LayoutOptions), whose defaults come from
//! this module.

// =============================================================================
// Board Geometry
// =============================================================================

/// Board size used when none is given (standard 19x19 board).
pub const DEFAULT_BOARD_SIZE: usize = 19;

/// Largest supported side length. Coordinates are encoded as single letters
/// `a..z`, so 25 leaves room for every letter on a square board.
pub const MAX_BOARD_SIZE: usize = 25;

/// Coordinate value used on both axes for a pass.
pub const PASS_COORD: i32 = -1;

/// Column letters used for human readable coordinates (`I` is skipped).
pub const PRETTY_COLUMNS: &[u8] = b"ABCDEFGHJKLMNOPQRSTUVWXYZ";

// =============================================================================
// Tree Diagram
// =============================================================================

/// Side of one layout cell in pixels.
pub const LAYOUT_CELL_SIZE: i32 = 28;

/// Line colors for variation lines. Index 0 is the main line color.
pub const LINE_COLORS: &[&str] = &[
    "#ff0000", "#00ff00", "#0000ff", "#00ffff", "#ffff00", "#ff9a00", "#9200ff",
];
