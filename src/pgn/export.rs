//! Movetext writer.
//!
//! Renders the display linearization into PGN-style movetext: move-number
//! tokens on white moves and on the first move of any branch, `{...}`
//! comments immediately after the move they annotate, `(...)` variations
//! immediately after their branch point. Positions are not written;
//! import recomputes them through the rules engine.

use crate::tree::{GameTree, NodeId};

/// Renders the tree as movetext. Re-importing the result and exporting
/// again yields a byte-identical string.
pub fn write_notation(tree: &GameTree) -> String {
    let facts = tree.start_facts();
    let mut out = String::new();
    if let Some(comment) = tree.get(tree.root()).comment() {
        push_token(&mut out, &format!("{{{comment}}}"));
    }
    emit_from(
        tree,
        tree.root(),
        facts.white_to_move,
        facts.fullmove_number,
        true,
        &mut out,
    );
    out
}

fn emit_from(
    tree: &GameTree,
    from: NodeId,
    mut white: bool,
    mut number: u32,
    mut first: bool,
    out: &mut String,
) {
    let mut cursor = from;
    loop {
        let children = tree.get(cursor).children();
        let (&main, variations) = match children.split_first() {
            Some(split) => split,
            None => break,
        };
        emit_move(tree, main, white, number, first, out);
        for &variation in variations {
            push_token(out, "(");
            emit_move(tree, variation, white, number, true, out);
            let (var_white, var_number) = advance(white, number);
            emit_from(tree, variation, var_white, var_number, false, out);
            out.push(')');
        }
        let (next_white, next_number) = advance(white, number);
        white = next_white;
        number = next_number;
        first = false;
        cursor = main;
    }
}

fn emit_move(
    tree: &GameTree,
    node: NodeId,
    white: bool,
    number: u32,
    branch_start: bool,
    out: &mut String,
) {
    let node = tree.get(node);
    let san = node.san().unwrap_or_default();
    debug_assert!(!san.is_empty(), "non-root node {} has no move", node.id());
    if white {
        push_token(out, &format!("{number}. {san}"));
    } else if branch_start {
        push_token(out, &format!("{number}... {san}"));
    } else {
        push_token(out, san);
    }
    if let Some(comment) = node.comment() {
        push_token(out, &format!("{{{comment}}}"));
    }
}

fn advance(white: bool, number: u32) -> (bool, u32) {
    if white {
        (false, number)
    } else {
        (true, number + 1)
    }
}

fn push_token(out: &mut String, token: &str) {
    if !out.is_empty() && !out.ends_with('(') {
        out.push(' ');
    }
    out.push_str(token);
}
