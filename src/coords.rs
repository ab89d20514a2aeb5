//! Intersection coordinates and their text encodings.
//!
//! Three encodings are in use:
//! - move strings: two letters per move (`"cd"`), `".."` for a pass
//! - SGF points: two letters, empty for a pass
//! - pretty coordinates: `"D16"` with the column letter `I` skipped and rows
//!   counted from the bottom edge

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::{PASS_COORD, PRETTY_COLUMNS};
use crate::error::{Result, TreeError};

/// An intersection, `(-1, -1)` for a pass.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const PASS: Point = Point {
        x: PASS_COORD,
        y: PASS_COORD,
    };

    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn is_pass(self) -> bool {
        self.x == PASS_COORD
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_pass() {
            write!(f, "pass")
        } else {
            write!(f, "({}, {})", self.x, self.y)
        }
    }
}

/// Letter for a coordinate in `0..26`.
fn num2char(n: i32) -> Option<char> {
    u8::try_from(n)
        .ok()
        .filter(|v| *v < 26)
        .map(|v| (b'a' + v) as char)
}

fn encode_point(p: Point) -> Result<String> {
    match (num2char(p.x), num2char(p.y)) {
        (Some(x), Some(y)) => Ok(format!("{x}{y}")),
        _ => Err(TreeError::InvalidArgument(format!(
            "point {p} has no letter encoding"
        ))),
    }
}

fn char2num(c: u8) -> Option<i32> {
    c.is_ascii_lowercase().then(|| (c - b'a') as i32)
}

/// Encode a single move as two letters.
pub fn encode_move(p: Point) -> Result<String> {
    if p.is_pass() {
        Ok("..".to_string())
    } else {
        encode_point(p)
    }
}

/// Encode a sequence of moves.
pub fn encode_moves(points: &[Point]) -> Result<String> {
    points.iter().map(|&p| encode_move(p)).collect()
}

/// Decode a move string produced by [`encode_moves`].
pub fn decode_moves(s: &str) -> Result<Vec<Point>> {
    let bytes = s.as_bytes();
    if bytes.len() % 2 != 0 {
        return Err(TreeError::InvalidArgument(format!(
            "move string must have an even length (got {s:?})"
        )));
    }
    bytes
        .chunks_exact(2)
        .map(|pair| {
            if pair == b".." {
                return Ok(Point::PASS);
            }
            match (char2num(pair[0]), char2num(pair[1])) {
                (Some(x), Some(y)) => Ok(Point::new(x, y)),
                _ => Err(TreeError::InvalidArgument(format!(
                    "bad move {:?} in move string",
                    String::from_utf8_lossy(pair)
                ))),
            }
        })
        .collect()
}

/// SGF point value; passes are the empty value.
pub fn sgf_coord(p: Point) -> Result<String> {
    if p.is_pass() {
        Ok(String::new())
    } else {
        encode_point(p)
    }
}

/// Human readable coordinate such as `"D4"`, or `"pass"`.
pub fn pretty_coords(p: Point, height: usize) -> String {
    if p.is_pass() {
        return "pass".into();
    }
    let col = PRETTY_COLUMNS
        .get(p.x as usize)
        .map(|&c| c as char)
        .unwrap_or('?');
    format!("{}{}", col, height as i32 - p.y)
}

/// Inverse of [`pretty_coords`].
pub fn parse_pretty(s: &str, height: usize) -> Result<Point> {
    if s.eq_ignore_ascii_case("pass") {
        return Ok(Point::PASS);
    }
    let bad = || TreeError::InvalidArgument(format!("bad coordinate {s:?}"));
    let bytes = s.as_bytes();
    let (&col_char, rest) = bytes.split_first().ok_or_else(bad)?;
    let x = PRETTY_COLUMNS
        .iter()
        .position(|&c| c == col_char.to_ascii_uppercase())
        .ok_or_else(bad)?;
    let row: i32 = std::str::from_utf8(rest)
        .ok()
        .and_then(|r| r.parse().ok())
        .ok_or_else(bad)?;
    let y = height as i32 - row;
    if row < 1 || y < 0 {
        return Err(bad());
    }
    Ok(Point::new(x as i32, y))
}
