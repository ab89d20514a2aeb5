//! Per-node annotations: intersection marks, pen strokes and chat.

use serde::{Deserialize, Serialize};

use crate::board::Color;
use crate::coords::Point;

fn is_false(b: &bool) -> bool {
    !*b
}

/// Everything that can be drawn on one intersection.
///
/// Serializes as an object containing only the keys that are set.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkSet {
    #[serde(skip_serializing_if = "is_false")]
    pub triangle: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub square: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub circle: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub cross: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub black: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub white: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub chat_triangle: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub sub_triangle: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub remove: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub stone_removed: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub mark_x: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub hint: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<Color>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub letter: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subscript: Option<String>,
}

impl MarkSet {
    pub fn is_empty(&self) -> bool {
        *self == MarkSet::default()
    }
}

/// Sparse width x height grid of [`MarkSet`]s.
///
/// Nothing is allocated until the first mutable access.
#[derive(Clone, Debug)]
pub struct MarkGrid {
    width: usize,
    height: usize,
    cells: Option<Vec<MarkSet>>,
}

impl MarkGrid {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: None,
        }
    }

    pub fn is_materialized(&self) -> bool {
        self.cells.is_some()
    }

    fn idx(&self, p: Point) -> Option<usize> {
        if p.x < 0 || p.y < 0 || p.x as usize >= self.width || p.y as usize >= self.height {
            return None;
        }
        Some(p.y as usize * self.width + p.x as usize)
    }

    pub fn get(&self, p: Point) -> Option<&MarkSet> {
        let i = self.idx(p)?;
        self.cells.as_ref().map(|cells| &cells[i])
    }

    /// Mutable marks at `p`, materializing the grid. `None` off the board.
    pub fn get_mut(&mut self, p: Point) -> Option<&mut MarkSet> {
        let i = self.idx(p)?;
        let len = self.width * self.height;
        let cells = self.cells.get_or_insert_with(|| vec![MarkSet::default(); len]);
        Some(&mut cells[i])
    }

    /// Intersections with at least one mark, row-major.
    pub fn iter(&self) -> impl Iterator<Item = (Point, &MarkSet)> + '_ {
        let width = self.width;
        self.cells
            .iter()
            .flatten()
            .enumerate()
            .filter(|(_, m)| !m.is_empty())
            .map(move |(i, m)| (Point::new((i % width) as i32, (i / width) as i32), m))
    }

    pub fn has_marks(&self) -> bool {
        self.iter().next().is_some()
    }

    pub fn clear(&mut self) {
        self.cells = None;
    }
}

/// A freehand stroke: a color and a flat list of `x, y` pixel pairs.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PenMark {
    pub color: String,
    pub points: Vec<i32>,
}

/// One chat message attached to a move.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatLine {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub player_id: Option<u64>,
    pub username: String,
    pub body: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_is_lazy() {
        let mut grid = MarkGrid::new(9, 9);
        assert!(grid.get(Point::new(1, 1)).is_none());
        assert!(!grid.is_materialized());
        assert!(!grid.has_marks());

        grid.get_mut(Point::new(1, 1)).unwrap().triangle = true;
        assert!(grid.is_materialized());
        assert!(grid.get(Point::new(1, 1)).unwrap().triangle);
        assert!(grid.get(Point::new(2, 1)).unwrap().is_empty());
    }

    #[test]
    fn test_off_board_is_none() {
        let mut grid = MarkGrid::new(9, 9);
        assert!(grid.get_mut(Point::PASS).is_none());
        assert!(grid.get_mut(Point::new(9, 0)).is_none());
        assert!(!grid.is_materialized());
    }

    #[test]
    fn test_iter_only_marked() {
        let mut grid = MarkGrid::new(9, 9);
        grid.get_mut(Point::new(4, 2)).unwrap().letter = Some("A".into());
        grid.get_mut(Point::new(1, 5)).unwrap().circle = true;
        let marked: Vec<Point> = grid.iter().map(|(p, _)| p).collect();
        assert_eq!(marked, vec![Point::new(4, 2), Point::new(1, 5)]);
    }

    #[test]
    fn test_markset_serializes_only_set_keys() {
        let marks = MarkSet {
            square: true,
            letter: Some("B".into()),
            ..Default::default()
        };
        let json = serde_json::to_string(&marks).unwrap();
        assert_eq!(json, r#"{"square":true,"letter":"B"}"#);
        let back: MarkSet = serde_json::from_str(&json).unwrap();
        assert_eq!(back, marks);
    }
}
