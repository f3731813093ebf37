//! The move-variation tree: data model, navigation, and mutation.
//!
//! ## Module Responsibilities
//!
//! - **node**: node identity and per-ply payload
//! - **game**: the `GameTree` aggregate and every structural operation
//! - **walk**: the display-linearization contract shared by renderer and
//!   exporter

mod game;
mod node;
mod walk;

pub use game::GameTree;
pub use node::{Node, NodeId};
pub use walk::WalkEvent;
