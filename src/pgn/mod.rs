//! Movetext (PGN-style) boundary.
//!
//! The only on-disk/on-the-wire form the engine defines: move-number
//! tokens, SAN move tokens, `{...}` comments, and nested `(...)`
//! variations. Positions are never stored in the text; import recomputes
//! them through the rules engine.

mod export;
mod import;

pub use export::write_notation;
pub use import::read_notation;
