//! Rules-engine collaborator boundary.
//!
//! The tree engine never decides chess legality itself. Construction and
//! the notation importers go through the [`Rules`] trait; interactive
//! callers resolve their move first and hand the result to
//! [`GameTree::add_move`](crate::GameTree::add_move).

use shakmaty::{fen::Fen, san::SanPlus, CastlingMode, Chess, Color, EnPassantMode, Position};

use crate::error::{Error, Result};

/// The standard chess starting position.
pub const STARTING_POSITION: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// Facts about a starting position the tree needs for move numbering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionFacts {
    pub white_to_move: bool,
    pub fullmove_number: u32,
}

/// Outcome of resolving a move request against a position: canonical
/// notation plus the resulting position encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayedMove {
    pub san: String,
    pub position: String,
}

pub trait Rules {
    /// Checks that `fen` is a well-formed position encoding and reports
    /// side to move and full-move counter. This validates the encoding
    /// only, not chess legality of the arrangement.
    fn validate_position(&self, fen: &str) -> Result<PositionFacts>;

    /// Resolves a move request against `fen`.
    fn try_move(&self, fen: &str, san: &str) -> Result<PlayedMove>;
}

/// Production rules engine backed by shakmaty.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShakmatyRules;

impl Rules for ShakmatyRules {
    fn validate_position(&self, fen: &str) -> Result<PositionFacts> {
        let fen: Fen = fen
            .parse()
            .map_err(|e: shakmaty::fen::ParseFenError| Error::InvalidPosition(e.to_string()))?;
        let setup = fen.into_setup();
        Ok(PositionFacts {
            white_to_move: setup.turn == Color::White,
            fullmove_number: setup.fullmoves.get(),
        })
    }

    fn try_move(&self, fen: &str, san: &str) -> Result<PlayedMove> {
        let mut position: Chess = fen
            .parse::<Fen>()
            .map_err(|e| Error::InvalidPosition(e.to_string()))?
            .into_position(CastlingMode::Standard)
            .map_err(|e| Error::InvalidPosition(e.to_string()))?;

        let illegal = || Error::IllegalMove {
            san: san.to_string(),
            position: fen.to_string(),
        };
        let requested: SanPlus = san.parse().map_err(|_| illegal())?;
        let mv = requested.san.to_move(&position).map_err(|_| illegal())?;

        // Re-render the notation so disambiguation and check suffixes are
        // canonical regardless of how the caller spelled the request.
        let canonical = SanPlus::from_move_and_play_unchecked(&mut position, &mv);
        Ok(PlayedMove {
            san: canonical.to_string(),
            position: Fen::from_setup(position.into_setup(EnPassantMode::Legal)).to_string(),
        })
    }
}
