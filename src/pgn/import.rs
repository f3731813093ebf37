//! Movetext reader.
//!
//! A bracket-balance pre-scan reports malformed nesting with byte
//! positions, then a `pgn-reader` visitor replays every move token
//! through the rules engine into a fresh tree. Positions are never taken
//! from the text; they are recomputed move by move.

use log::{info, warn};
use pgn_reader::{BufferedReader, Nag, RawComment, SanPlus, Skip, Visitor};

use crate::error::{Error, Result};
use crate::rules::Rules;
use crate::tree::{GameTree, NodeId};

/// Parses movetext into a tree rooted at `start_fen`. The cursor of the
/// returned tree is on the root.
///
/// Bracket-nesting violations carry the byte offset of the offending
/// bracket; an unresolvable move token carries its ply ordinal instead.
pub fn read_notation(start_fen: &str, text: &str, rules: &impl Rules) -> Result<GameTree> {
    scan_brackets(text)?;
    let tree = GameTree::new(start_fen, rules)?;
    let cursor = tree.root();
    let mut builder = TreeBuilder {
        rules,
        tree,
        cursor,
        stack: Vec::new(),
        ply_index: 0,
        error: None,
    };
    let mut reader = BufferedReader::new_cursor(text.as_bytes());
    reader.read_game(&mut builder)?;
    if let Some(error) = builder.error {
        return Err(error);
    }
    info!(
        "imported movetext into {} node(s)",
        builder.tree.node_count()
    );
    Ok(builder.tree)
}

/// Rejects unbalanced parentheses and braces before any token parsing.
/// Braces do not nest; everything up to the first `}` is comment text.
fn scan_brackets(text: &str) -> Result<()> {
    let mut opens: Vec<usize> = Vec::new();
    let mut comment_start: Option<usize> = None;
    for (position, byte) in text.bytes().enumerate() {
        match (comment_start, byte) {
            (Some(_), b'}') => comment_start = None,
            (Some(_), _) => {}
            (None, b'{') => comment_start = Some(position),
            (None, b'}') => {
                return Err(Error::Parse {
                    position,
                    reason: "unmatched '}'".to_string(),
                })
            }
            (None, b'(') => opens.push(position),
            (None, b')') => {
                if opens.pop().is_none() {
                    return Err(Error::Parse {
                        position,
                        reason: "unmatched ')'".to_string(),
                    });
                }
            }
            _ => {}
        }
    }
    if let Some(position) = comment_start {
        return Err(Error::Parse {
            position,
            reason: "unterminated comment".to_string(),
        });
    }
    if let Some(position) = opens.pop() {
        return Err(Error::Parse {
            position,
            reason: "unclosed variation".to_string(),
        });
    }
    Ok(())
}

struct TreeBuilder<'a, R: Rules> {
    rules: &'a R,
    tree: GameTree,
    /// Node whose position the next move token extends.
    cursor: NodeId,
    /// Cursors to resume at when open variations close.
    stack: Vec<NodeId>,
    /// Running move-token ordinal, for error positions.
    ply_index: usize,
    error: Option<Error>,
}

impl<R: Rules> Visitor for TreeBuilder<'_, R> {
    type Result = ();

    fn san(&mut self, san_plus: SanPlus) {
        if self.error.is_some() {
            return;
        }
        self.ply_index += 1;
        let requested = san_plus.to_string();
        let played = match self
            .rules
            .try_move(self.tree.get(self.cursor).position(), &requested)
        {
            Ok(played) => played,
            Err(cause) => {
                self.error = Some(Error::Parse {
                    position: self.ply_index,
                    reason: format!("unresolvable move {requested}: {cause}"),
                });
                return;
            }
        };
        match self.tree.add_move(self.cursor, &played.san, &played.position) {
            Ok(id) => self.cursor = id,
            Err(error) => self.error = Some(error),
        }
    }

    fn nag(&mut self, nag: Nag) {
        if self.error.is_some() {
            return;
        }
        if self.cursor == self.tree.root() {
            warn!("ignoring annotation glyph before any move");
            return;
        }
        let mut tags = self.tree.get(self.cursor).annotations().to_vec();
        tags.push(format!("${}", nag.0));
        if let Err(error) = self.tree.set_annotations(self.cursor, tags) {
            self.error = Some(error);
        }
    }

    fn comment(&mut self, comment: RawComment<'_>) {
        if self.error.is_some() {
            return;
        }
        let text = String::from_utf8_lossy(comment.as_bytes())
            .trim()
            .to_string();
        if text.is_empty() {
            return;
        }
        // A comment before any move annotates the root; consecutive
        // comments on one move are merged.
        let merged = match self.tree.get(self.cursor).comment() {
            Some(existing) => format!("{existing} {text}"),
            None => text,
        };
        if let Err(error) = self.tree.set_comment(self.cursor, &merged) {
            self.error = Some(error);
        }
    }

    fn begin_variation(&mut self) -> Skip {
        if self.error.is_some() {
            return Skip(true);
        }
        match self.tree.get(self.cursor).parent() {
            Some(parent) => {
                self.stack.push(self.cursor);
                self.cursor = parent;
                Skip(false)
            }
            None => {
                self.error = Some(Error::Parse {
                    position: self.ply_index,
                    reason: "variation opens before any move".to_string(),
                });
                Skip(true)
            }
        }
    }

    fn end_variation(&mut self) {
        if let Some(resume) = self.stack.pop() {
            self.cursor = resume;
        }
    }

    fn end_game(&mut self) -> Self::Result {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pgn::export::write_notation;
    use crate::rules::{ShakmatyRules, STARTING_POSITION};

    fn read(text: &str) -> GameTree {
        read_notation(STARTING_POSITION, text, &ShakmatyRules).unwrap()
    }

    #[test]
    fn test_read_main_line() {
        let tree = read("1. e4 e5 2. Nf3");
        assert_eq!(tree.main_line_sans(), vec!["e4", "e5", "Nf3"]);
        assert_eq!(tree.current(), tree.root());

        // Positions are recomputed through the rules engine, not read
        // from the text.
        let e4 = tree.main_line()[1];
        assert_eq!(
            tree.node(e4).unwrap().position(),
            "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1"
        );
    }

    #[test]
    fn test_read_variations_into_sibling_branches() {
        let tree = read("1. e4 e5 (1... c5) 2. Nf3");
        let root = tree.root();
        let e4 = tree.node(root).unwrap().children()[0];
        let children = tree.node(e4).unwrap().children();
        assert_eq!(children.len(), 2);
        let e5 = children[0];
        let c5 = children[1];
        assert_eq!(tree.node(e5).unwrap().san(), Some("e5"));
        assert_eq!(tree.node(c5).unwrap().san(), Some("c5"));
        assert!(tree.is_main_line(e5).unwrap());
        assert!(!tree.is_main_line(c5).unwrap());
        assert_eq!(tree.main_line_sans(), vec!["e4", "e5", "Nf3"]);
    }

    #[test]
    fn test_read_comments_and_nags() {
        let tree = read("{annotated game} 1. e4 $2 {king pawn} e5");
        let root = tree.root();
        assert_eq!(tree.node(root).unwrap().comment(), Some("annotated game"));
        let e4 = tree.node(root).unwrap().children()[0];
        assert_eq!(tree.node(e4).unwrap().comment(), Some("king pawn"));
        assert_eq!(tree.node(e4).unwrap().annotations(), ["$2"]);
    }

    #[test]
    fn test_read_collapses_duplicate_variation() {
        let tree = read("1. e4 (1. e4)");
        assert_eq!(tree.node(tree.root()).unwrap().children().len(), 1);
    }

    #[test]
    fn test_read_rejects_unclosed_variation() {
        let err = read_notation(STARTING_POSITION, "1. e4 (1... c5", &ShakmatyRules).unwrap_err();
        match err {
            Error::Parse { position, reason } => {
                assert_eq!(position, 6);
                assert_eq!(reason, "unclosed variation");
            }
            other => panic!("expected Parse error, got {other:?}"),
        }
    }

    #[test]
    fn test_read_rejects_unmatched_close() {
        let err = read_notation(STARTING_POSITION, "1. e4) e5", &ShakmatyRules).unwrap_err();
        assert!(matches!(err, Error::Parse { position: 5, .. }));

        let err = read_notation(STARTING_POSITION, "} 1. e4", &ShakmatyRules).unwrap_err();
        assert!(matches!(err, Error::Parse { position: 0, .. }));
    }

    #[test]
    fn test_read_rejects_unterminated_comment() {
        let err = read_notation(STARTING_POSITION, "1. e4 {never closed", &ShakmatyRules)
            .unwrap_err();
        assert!(matches!(err, Error::Parse { position: 6, .. }));
    }

    #[test]
    fn test_read_rejects_unresolvable_move() {
        let err = read_notation(STARTING_POSITION, "1. e4 Ke4", &ShakmatyRules).unwrap_err();
        match err {
            Error::Parse { position, reason } => {
                assert_eq!(position, 2);
                assert!(reason.contains("Ke4"));
            }
            other => panic!("expected Parse error, got {other:?}"),
        }
    }

    #[test]
    fn test_round_trip_is_byte_identical() {
        let text = "{annotated game} 1. e4 {king pawn} (1. d4 d5 (1... Nf6) 2. c4) e5 2. Nf3 Nc6";
        let tree = read(text);
        let exported = write_notation(&tree);
        assert_eq!(exported, text);
        let again = read(&exported);
        assert_eq!(write_notation(&again), exported);
    }

    #[test]
    fn test_round_trip_survives_mutations() {
        let tree = {
            let mut tree = read("1. e4 e5 (1... c5 2. Nf3 d6) 2. Nf3 Nc6");
            let e4 = tree.node(tree.root()).unwrap().children()[0];
            let c5 = tree.node(e4).unwrap().children()[1];
            tree.promote_variation(c5).unwrap();
            tree.set_comment(c5, "the sharp choice").unwrap();
            let e5 = tree.node(e4).unwrap().children()[1];
            let e5_reply = tree.node(e5).unwrap().children()[0];
            tree.delete_from(e5_reply).unwrap();
            tree
        };
        let exported = write_notation(&tree);
        assert_eq!(
            exported,
            "1. e4 c5 {the sharp choice} (1... e5) 2. Nf3 d6"
        );
        let reread = read_notation(STARTING_POSITION, &exported, &ShakmatyRules).unwrap();
        assert_eq!(write_notation(&reread), exported);
    }

    #[test]
    fn test_round_trip_from_black_to_move_start() {
        let after_e4 = "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1";
        let text = "1... e5 (1... c5 2. Nf3) 2. Nf3";
        let tree = read_notation(after_e4, text, &ShakmatyRules).unwrap();
        assert_eq!(write_notation(&tree), text);
    }

    #[test]
    fn test_read_empty_text_gives_root_only_tree() {
        let tree = read("");
        assert_eq!(tree.node_count(), 1);
        assert_eq!(tree.current(), tree.root());
    }
}
