//! Display linearization of the tree.
//!
//! Consumers rely on this ordering to match conventional movetext: each
//! move is followed by its sibling variations, fully parenthesized, before
//! the main line resumes.

use serde::Serialize;
use specta::Type;

use crate::tree::game::GameTree;
use crate::tree::node::NodeId;

/// One step of the display linearization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Type)]
#[serde(tag = "type", content = "value", rename_all = "camelCase")]
pub enum WalkEvent {
    /// A move to render next.
    Move(NodeId),
    /// A variation opens, branching from the move just rendered.
    BeginVariation,
    /// The innermost open variation closes.
    EndVariation,
}

impl GameTree {
    /// Linearizes the tree for display, root excluded.
    ///
    /// Pre-order with variation nesting: a node's move is emitted, then
    /// each variation sibling (child indices >= 1 of the same parent, in
    /// order) is emitted fully parenthesized, then the main line
    /// continues. This is a hard contract shared by the renderer and the
    /// notation exporter.
    pub fn walk(&self) -> Vec<WalkEvent> {
        let mut events = Vec::with_capacity(self.node_count().saturating_sub(1) * 2);
        self.walk_from(self.root(), &mut events);
        events
    }

    fn walk_from(&self, from: NodeId, events: &mut Vec<WalkEvent>) {
        let mut cursor = from;
        loop {
            let children = self.get(cursor).children();
            let (&main, variations) = match children.split_first() {
                Some(split) => split,
                None => break,
            };
            events.push(WalkEvent::Move(main));
            for &variation in variations {
                events.push(WalkEvent::BeginVariation);
                events.push(WalkEvent::Move(variation));
                self.walk_from(variation, events);
                events.push(WalkEvent::EndVariation);
            }
            cursor = main;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{PlayedMove, PositionFacts, Rules};

    struct StubRules;

    impl Rules for StubRules {
        fn validate_position(&self, _fen: &str) -> crate::Result<PositionFacts> {
            Ok(PositionFacts {
                white_to_move: true,
                fullmove_number: 1,
            })
        }

        fn try_move(&self, fen: &str, san: &str) -> crate::Result<PlayedMove> {
            Ok(PlayedMove {
                san: san.to_string(),
                position: format!("{fen}/{san}"),
            })
        }
    }

    #[test]
    fn test_walk_emits_variations_before_main_line_resumes() {
        let mut tree = GameTree::new("P0", &StubRules).unwrap();
        let e4 = tree.add_move(tree.root(), "e4", "P1").unwrap();
        let e5 = tree.add_move(e4, "e5", "P2").unwrap();
        let c5 = tree.add_move(e4, "c5", "P2b").unwrap();
        let nc6 = tree.add_move(c5, "Nc6", "P3b").unwrap();

        assert_eq!(
            tree.walk(),
            vec![
                WalkEvent::Move(e4),
                WalkEvent::Move(e5),
                WalkEvent::BeginVariation,
                WalkEvent::Move(c5),
                WalkEvent::Move(nc6),
                WalkEvent::EndVariation,
            ]
        );
    }

    #[test]
    fn test_walk_nests_variations_of_variations() {
        let mut tree = GameTree::new("P0", &StubRules).unwrap();
        let root = tree.root();
        let e4 = tree.add_move(root, "e4", "P1").unwrap();
        let d4 = tree.add_move(root, "d4", "P1b").unwrap();
        let d5 = tree.add_move(d4, "d5", "P2b").unwrap();
        let nf6 = tree.add_move(d4, "Nf6", "P2c").unwrap();

        assert_eq!(
            tree.walk(),
            vec![
                WalkEvent::Move(e4),
                WalkEvent::BeginVariation,
                WalkEvent::Move(d4),
                WalkEvent::Move(d5),
                WalkEvent::BeginVariation,
                WalkEvent::Move(nf6),
                WalkEvent::EndVariation,
                WalkEvent::EndVariation,
            ]
        );
    }

    #[test]
    fn test_walk_events_serialize_for_the_renderer() {
        let event = serde_json::to_value(WalkEvent::BeginVariation).unwrap();
        assert_eq!(event, serde_json::json!({ "type": "beginVariation" }));

        let mut tree = GameTree::new("P0", &StubRules).unwrap();
        let e4 = tree.add_move(tree.root(), "e4", "P1").unwrap();
        let moved = serde_json::to_value(WalkEvent::Move(e4)).unwrap();
        assert_eq!(moved, serde_json::json!({ "type": "move", "value": 1 }));
    }
}
