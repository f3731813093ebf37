//! Move-variation tree engine for chess game review.
//!
//! Represents one game as a tree of moves: a main line plus arbitrarily
//! nested side variations, with a cursor for the position being viewed.
//! The engine manages structure only: creation, navigation, deletion,
//! promotion, annotation, and movetext serialization. Move legality is
//! delegated to a rules-engine collaborator ([`Rules`], with a
//! shakmaty-backed production implementation); callers validate a move
//! first and hand the canonical notation plus resulting position to
//! [`GameTree::add_move`].
//!
//! Trees are single-threaded, synchronous, in-memory values; hosts that
//! share one across tasks must serialize access externally.

mod error;
mod pgn;
mod rules;
mod tree;

pub use error::{Error, Result};
pub use pgn::{read_notation, write_notation};
pub use rules::{PlayedMove, PositionFacts, Rules, ShakmatyRules, STARTING_POSITION};
pub use tree::{GameTree, Node, NodeId, WalkEvent};
