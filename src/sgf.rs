//! Export of a move tree as Smart Game Format (SGF) text.

use crate::board::Color;
use crate::coords::sgf_coord;
use crate::error::Result;
use crate::node::{Node, NodeId};
use crate::tree::MoveTree;

/// Escape free text for an SGF value. Newlines become spaces.
pub fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            ']' => out.push_str("\\]"),
            '\n' => out.push(' '),
            '\r' => {}
            c => out.push(c),
        }
    }
    out
}

fn player_letter(player: Color) -> char {
    match player {
        Color::Black => 'B',
        Color::White => 'W',
        Color::Empty => 'E',
    }
}

fn push_property(out: &mut String, ident: &str, values: &[String]) {
    if values.is_empty() {
        return;
    }
    out.push_str(ident);
    for v in values {
        out.push('[');
        out.push_str(v);
        out.push(']');
    }
}

fn write_marks(node: &Node, out: &mut String) -> Result<()> {
    let mut triangles = Vec::new();
    let mut squares = Vec::new();
    let mut crosses = Vec::new();
    let mut circles = Vec::new();
    let mut labels = Vec::new();
    for (p, m) in node.marks().iter() {
        let at = sgf_coord(p)?;
        if m.triangle {
            triangles.push(at.clone());
        }
        if m.square {
            squares.push(at.clone());
        }
        if m.cross {
            crosses.push(at.clone());
        }
        if m.circle {
            circles.push(at.clone());
        }
        if let Some(label) = m.letter.as_ref().or(m.subscript.as_ref()) {
            labels.push(format!("{at}:{}", escape_text(label)));
        }
    }
    push_property(out, "TR", &triangles);
    push_property(out, "SQ", &squares);
    push_property(out, "MA", &crosses);
    push_property(out, "CR", &circles);
    push_property(out, "LB", &labels);
    Ok(())
}

fn write_comment(node: &Node, out: &mut String) {
    let mut parts: Vec<String> = Vec::new();
    if !node.text.is_empty() {
        parts.push(node.text.clone());
    }
    parts.extend(
        node.chat_log
            .iter()
            .map(|line| format!("{}: {}", line.username, line.body)),
    );
    if !parts.is_empty() {
        out.push_str("C[");
        out.push_str(&escape_text(&parts.join("\n")));
        out.push(']');
    }
}

fn write_node(tree: &MoveTree, id: NodeId, out: &mut String) -> Result<()> {
    let node = &tree[id];
    if node.parent().is_some() {
        out.push(';');
        if node.edited {
            out.push('A');
        }
        out.push(player_letter(node.player));
        out.push('[');
        out.push_str(&sgf_coord(node.point)?);
        out.push(']');
    }
    write_marks(node, out)?;
    write_comment(node, out);

    let children: Vec<NodeId> = node.children().collect();
    match children.as_slice() {
        [] => {}
        [only] => write_node(tree, *only, out)?,
        many => {
            for &child in many {
                out.push('(');
                write_node(tree, child, out)?;
                out.push(')');
            }
        }
    }
    Ok(())
}

/// SGF sequence for `id` and its subtree. The root contributes only its
/// annotations, as properties of whatever node the caller puts them on.
pub fn to_sgf(tree: &MoveTree, id: NodeId) -> Result<String> {
    let mut out = String::new();
    write_node(tree, id, &mut out)?;
    Ok(out)
}

/// Complete SGF game record for the whole tree.
pub fn to_sgf_game(tree: &MoveTree) -> Result<String> {
    let size = if tree.width() == tree.height() {
        tree.width().to_string()
    } else {
        format!("{}:{}", tree.width(), tree.height())
    };
    Ok(format!("(;FF[4]GM[1]SZ[{size}]{})", to_sgf(tree, tree.root())?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::BoardState;
    use crate::coords::Point;
    use crate::marks::ChatLine;

    fn add(tree: &mut MoveTree, at: NodeId, p: Point, trunk: bool, player: Color) -> NodeId {
        let number = tree[at].move_number + 1;
        tree.insert_or_advance(at, p, trunk, false, player, number, BoardState::empty(9, 9))
            .unwrap()
    }

    #[test]
    fn test_escape_text() {
        assert_eq!(escape_text(r"a\b"), r"a\\b");
        assert_eq!(escape_text("x]y"), r"x\]y");
        assert_eq!(escape_text("two\nlines\r\n"), "two lines ");
    }

    #[test]
    fn test_single_line_is_inlined() {
        let mut tree = MoveTree::with_size(9, 9).unwrap();
        let root = tree.root();
        let a = add(&mut tree, root, Point::new(2, 2), true, Color::Black);
        add(&mut tree, a, Point::PASS, true, Color::White);
        assert_eq!(to_sgf(&tree, root).unwrap(), ";B[cc];W[]");
        assert_eq!(to_sgf_game(&tree).unwrap(), "(;FF[4]GM[1]SZ[9];B[cc];W[])");
    }

    #[test]
    fn test_variations_are_parenthesized() {
        let mut tree = MoveTree::with_size(9, 9).unwrap();
        let root = tree.root();
        let a = add(&mut tree, root, Point::new(2, 2), true, Color::Black);
        add(&mut tree, a, Point::new(3, 3), true, Color::White);
        let b = add(&mut tree, a, Point::new(5, 5), false, Color::White);
        add(&mut tree, b, Point::new(6, 6), false, Color::Black);
        assert_eq!(to_sgf(&tree, root).unwrap(), ";B[cc](;W[dd])(;W[ff];B[gg])");
    }

    #[test]
    fn test_edited_marks_and_comment() {
        let mut tree = MoveTree::with_size(9, 9).unwrap();
        let root = tree.root();
        let a = tree
            .insert_or_advance(root, Point::new(0, 1), false, true, Color::White, 0, BoardState::empty(9, 9))
            .unwrap();
        let node = &mut tree[a];
        node.marks_at_mut(Point::new(1, 1)).unwrap().triangle = true;
        node.marks_at_mut(Point::new(2, 1)).unwrap().triangle = true;
        node.marks_at_mut(Point::new(0, 0)).unwrap().square = true;
        node.marks_at_mut(Point::new(3, 0)).unwrap().cross = true;
        node.marks_at_mut(Point::new(4, 0)).unwrap().circle = true;
        node.marks_at_mut(Point::new(5, 5)).unwrap().letter = Some("A".into());
        node.set_text("look [here]");
        node.push_chat(ChatLine {
            player_id: Some(7),
            username: "bob".into(),
            body: "nice\nmove".into(),
        });

        assert_eq!(
            to_sgf(&tree, a).unwrap(),
            ";AW[ab]TR[bb][cb]SQ[aa]MA[da]CR[ea]LB[ff:A]C[look [here\\] bob: nice move]"
        );
    }

    #[test]
    fn test_largest_board_edge() {
        let mut tree = MoveTree::with_size(25, 25).unwrap();
        let root = tree.root();
        let a = tree
            .insert_or_advance(root, Point::new(24, 0), true, false, Color::Black, 1, BoardState::empty(25, 25))
            .unwrap();
        tree[a].marks_at_mut(Point::new(24, 24)).unwrap().circle = true;
        assert_eq!(to_sgf_game(&tree).unwrap(), "(;FF[4]GM[1]SZ[25];B[ya]CR[yy])");
    }

    #[test]
    fn test_root_annotations_join_game_root() {
        let mut tree = MoveTree::with_size(13, 9).unwrap();
        let root = tree.root();
        tree[root].set_text("start");
        assert_eq!(to_sgf_game(&tree).unwrap(), "(;FF[4]GM[1]SZ[13:9]C[start])");
    }
}
