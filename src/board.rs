//! Board matrix snapshots stored on every tree node.
//!
//! The tree never enforces the rules of Go; it records whatever the engine
//! hands it. [`Board::play`] exists so that snapshots can be replayed onto a
//! plain board (see [`BoardReplayer`](crate::snapshot::BoardReplayer)).

use std::cell::OnceCell;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::coords::Point;
use crate::error::{Result, TreeError};

/// Color of a stone, or of the player who made a move.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    #[default]
    Empty,
    Black,
    White,
}

impl Color {
    pub fn opponent(self) -> Color {
        match self {
            Color::Black => Color::White,
            Color::White => Color::Black,
            Color::Empty => Color::Empty,
        }
    }

    /// Single character used in position digests.
    fn digest_char(self) -> char {
        match self {
            Color::Empty => '.',
            Color::Black => 'b',
            Color::White => 'w',
        }
    }
}

/// Numeric player ids as used on the wire: 0 = none, 1 = black, 2 = white.
impl TryFrom<i64> for Color {
    type Error = TreeError;

    fn try_from(value: i64) -> Result<Self> {
        match value {
            0 => Ok(Color::Empty),
            1 => Ok(Color::Black),
            2 => Ok(Color::White),
            other => Err(TreeError::InvalidArgument(format!(
                "player color must be 0, 1 or 2 (got {other})"
            ))),
        }
    }
}

impl From<Color> for i64 {
    fn from(color: Color) -> i64 {
        match color {
            Color::Empty => 0,
            Color::Black => 1,
            Color::White => 2,
        }
    }
}

impl FromStr for Color {
    type Err = TreeError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "b" | "black" => Ok(Color::Black),
            "w" | "white" => Ok(Color::White),
            "e" | "empty" | "none" => Ok(Color::Empty),
            _ => {
                if let Ok(n) = s.parse::<i64>() {
                    Color::try_from(n)
                } else {
                    Err(TreeError::InvalidArgument(format!("unknown player color {s:?}")))
                }
            }
        }
    }
}

/// Full board matrix, row-major.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Board {
    width: usize,
    height: usize,
    cells: Vec<Color>,
}

impl Board {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![Color::Empty; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    fn idx(&self, x: usize, y: usize) -> usize {
        y * self.width + x
    }

    fn in_bounds(&self, p: Point) -> Option<(usize, usize)> {
        if p.x < 0 || p.y < 0 {
            return None;
        }
        let (x, y) = (p.x as usize, p.y as usize);
        (x < self.width && y < self.height).then_some((x, y))
    }

    /// Color at an intersection. Off-board points read as empty.
    pub fn get(&self, p: Point) -> Color {
        match self.in_bounds(p) {
            Some((x, y)) => self.cells[self.idx(x, y)],
            None => Color::Empty,
        }
    }

    /// Overwrite an intersection. Off-board points are ignored.
    pub fn set(&mut self, p: Point, color: Color) {
        if let Some((x, y)) = self.in_bounds(p) {
            let i = self.idx(x, y);
            self.cells[i] = color;
        }
    }

    /// Number of stones of the given color.
    pub fn count(&self, color: Color) -> usize {
        self.cells.iter().filter(|&&c| c == color).count()
    }

    fn neighbors(&self, x: usize, y: usize) -> impl Iterator<Item = (usize, usize)> + use<> {
        let (w, h) = (self.width, self.height);
        let mut v = Vec::with_capacity(4);
        if x > 0 {
            v.push((x - 1, y));
        }
        if x + 1 < w {
            v.push((x + 1, y));
        }
        if y > 0 {
            v.push((x, y - 1));
        }
        if y + 1 < h {
            v.push((x, y + 1));
        }
        v.into_iter()
    }

    /// Place a stone and remove opponent groups left without liberties.
    ///
    /// Passes and off-board points leave the board untouched. Occupied points
    /// and suicides are reported and not played.
    pub fn play(&mut self, p: Point, color: Color) -> MoveResult {
        if p.is_pass() || color == Color::Empty {
            return MoveResult::default();
        }
        let Some((x, y)) = self.in_bounds(p) else {
            return MoveResult::illegal();
        };
        if self.cells[self.idx(x, y)] != Color::Empty {
            return MoveResult::illegal();
        }
        let idx = self.idx(x, y);
        self.cells[idx] = color;

        let opp = color.opponent();
        let mut to_remove = Vec::new();
        for (nx, ny) in self.neighbors(x, y) {
            if self.cells[self.idx(nx, ny)] == opp && self.group_liberties(nx, ny) == 0 {
                self.collect_group(nx, ny, &mut to_remove);
            }
        }
        to_remove.sort_unstable();
        to_remove.dedup();
        for &i in &to_remove {
            self.cells[i] = Color::Empty;
        }

        if to_remove.is_empty() && self.group_liberties(x, y) == 0 {
            self.cells[idx] = Color::Empty;
            return MoveResult {
                legal: false,
                captures: 0,
                suicide: true,
            };
        }
        MoveResult {
            legal: true,
            captures: to_remove.len(),
            suicide: false,
        }
    }

    fn collect_group(&self, x: usize, y: usize, out: &mut Vec<usize>) {
        let color = self.cells[self.idx(x, y)];
        let mut stack = vec![(x, y)];
        let mut visited = vec![false; self.cells.len()];
        while let Some((cx, cy)) = stack.pop() {
            let i = self.idx(cx, cy);
            if visited[i] || self.cells[i] != color {
                continue;
            }
            visited[i] = true;
            out.push(i);
            stack.extend(self.neighbors(cx, cy));
        }
    }

    fn group_liberties(&self, x: usize, y: usize) -> usize {
        let color = self.cells[self.idx(x, y)];
        if color == Color::Empty {
            return 0;
        }
        let mut stack = vec![(x, y)];
        let mut visited = vec![false; self.cells.len()];
        let mut liberties = 0;
        while let Some((cx, cy)) = stack.pop() {
            let i = self.idx(cx, cy);
            if visited[i] {
                continue;
            }
            visited[i] = true;
            match self.cells[i] {
                Color::Empty => liberties += 1,
                c if c == color => stack.extend(self.neighbors(cx, cy)),
                _ => {}
            }
        }
        liberties
    }

    /// Stable fingerprint of the matrix plus the player to move.
    pub fn digest(&self, to_move: Color) -> String {
        let mut s: String = self.cells.iter().map(|c| c.digest_char()).collect();
        s.push(':');
        s.push(to_move.digest_char());
        s
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MoveResult {
    pub legal: bool,
    pub captures: usize,
    pub suicide: bool,
}

impl MoveResult {
    fn illegal() -> Self {
        MoveResult {
            legal: false,
            captures: 0,
            suicide: false,
        }
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for y in 0..self.height {
            for x in 0..self.width {
                let ch = match self.cells[self.idx(x, y)] {
                    Color::Black => 'X',
                    Color::White => 'O',
                    Color::Empty => '.',
                };
                write!(f, "{ch} ")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Board position recorded on a node: the matrix and the player to move.
///
/// The digest is computed on first use and cached until the board or the
/// player to move is changed through [`board_mut`](Self::board_mut) or
/// [`set_to_move`](Self::set_to_move).
#[derive(Clone, Debug)]
pub struct BoardState {
    board: Board,
    to_move: Color,
    digest: OnceCell<String>,
}

impl BoardState {
    pub fn new(board: Board, to_move: Color) -> Self {
        Self {
            board,
            to_move,
            digest: OnceCell::new(),
        }
    }

    /// Empty board with black to move.
    pub fn empty(width: usize, height: usize) -> Self {
        Self::new(Board::new(width, height), Color::Black)
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Mutable access to the matrix. Drops the cached digest.
    pub fn board_mut(&mut self) -> &mut Board {
        self.digest.take();
        &mut self.board
    }

    pub fn to_move(&self) -> Color {
        self.to_move
    }

    pub fn set_to_move(&mut self, to_move: Color) {
        self.digest.take();
        self.to_move = to_move;
    }

    pub fn digest(&self) -> &str {
        self.digest.get_or_init(|| self.board.digest(self.to_move))
    }

    pub fn has_digest(&self) -> bool {
        self.digest.get().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_from_number() {
        assert_eq!(Color::try_from(1), Ok(Color::Black));
        assert_eq!(Color::try_from(2), Ok(Color::White));
        assert_eq!(Color::try_from(0), Ok(Color::Empty));
        assert!(matches!(Color::try_from(3), Err(TreeError::InvalidArgument(_))));
        assert!(matches!(Color::try_from(-1), Err(TreeError::InvalidArgument(_))));
    }

    #[test]
    fn test_color_from_str() {
        assert_eq!("black".parse::<Color>(), Ok(Color::Black));
        assert_eq!("W".parse::<Color>(), Ok(Color::White));
        assert_eq!("2".parse::<Color>(), Ok(Color::White));
        assert!("purple".parse::<Color>().is_err());
    }

    #[test]
    fn test_capture_single_stone() {
        let mut board = Board::new(9, 9);
        board.play(Point::new(1, 0), Color::Black);
        board.play(Point::new(0, 1), Color::Black);
        board.play(Point::new(0, 0), Color::White);
        assert_eq!(board.get(Point::new(0, 0)), Color::Empty, "suicide must be undone");

        board.play(Point::new(4, 4), Color::White);
        board.play(Point::new(3, 4), Color::Black);
        board.play(Point::new(5, 4), Color::Black);
        board.play(Point::new(4, 3), Color::Black);
        let result = board.play(Point::new(4, 5), Color::Black);
        assert!(result.legal);
        assert_eq!(result.captures, 1);
        assert_eq!(board.get(Point::new(4, 4)), Color::Empty);
    }

    #[test]
    fn test_occupied_is_illegal() {
        let mut board = Board::new(9, 9);
        assert!(board.play(Point::new(2, 2), Color::Black).legal);
        assert!(!board.play(Point::new(2, 2), Color::White).legal);
        assert_eq!(board.get(Point::new(2, 2)), Color::Black);
    }

    #[test]
    fn test_display_and_count() {
        let mut board = Board::new(3, 2);
        board.play(Point::new(0, 0), Color::Black);
        board.play(Point::new(2, 1), Color::White);
        assert_eq!(board.to_string(), "X . . \n. . O \n");
        assert_eq!(board.count(Color::Black), 1);
        assert_eq!(board.count(Color::White), 1);
        assert_eq!(board.count(Color::Empty), 4);
    }

    #[test]
    fn test_pass_leaves_board_untouched() {
        let mut board = Board::new(9, 9);
        board.play(Point::PASS, Color::Black);
        assert_eq!(board.count(Color::Empty), 81);
    }

    #[test]
    fn test_digest_includes_player_to_move() {
        let mut board = Board::new(3, 3);
        board.set(Point::new(1, 1), Color::Black);
        assert_eq!(board.digest(Color::White), "....b....:w");
        assert_ne!(board.digest(Color::White), board.digest(Color::Black));
    }

    #[test]
    fn test_state_digest_is_cached() {
        let state = BoardState::empty(3, 3);
        assert!(!state.has_digest());
        assert_eq!(state.digest(), ".........:b");
        assert!(state.has_digest());
    }

    #[test]
    fn test_state_mutation_refreshes_digest() {
        let mut state = BoardState::empty(3, 3);
        assert_eq!(state.digest(), ".........:b");

        state.board_mut().set(Point::new(1, 1), Color::Black);
        assert!(!state.has_digest());
        assert_eq!(state.digest(), "....b....:b");

        state.set_to_move(Color::White);
        assert!(!state.has_digest());
        assert_eq!(state.digest(), "....b....:w");
        assert_eq!(state.board().get(Point::new(1, 1)), Color::Black);
        assert_eq!(state.to_move(), Color::White);
    }
}
