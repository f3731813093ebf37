//! The move-variation tree aggregate.
//!
//! Nodes live in an id-keyed arena; `children` vectors own the structure
//! and `parent` ids are non-owning back-references, so there are no
//! ownership cycles. Reachability from the root is the source of truth;
//! the arena map doubles as the O(1) id lookup.

use std::collections::HashMap;

use log::info;

use crate::error::{Error, Result};
use crate::rules::{PositionFacts, Rules};
use crate::tree::node::{Node, NodeId};

#[derive(Debug)]
pub struct GameTree {
    nodes: HashMap<NodeId, Node>,
    root: NodeId,
    current: NodeId,
    next_id: u32,
    start: PositionFacts,
}

impl GameTree {
    /// Builds a tree containing only the root node at `start_fen`.
    ///
    /// The rules engine is consulted once to check that the encoding is
    /// well-formed and to capture side-to-move and full-move counter for
    /// move numbering. Games may start mid-position.
    pub fn new(start_fen: &str, rules: &impl Rules) -> Result<Self> {
        let start = rules.validate_position(start_fen)?;
        let root = NodeId(0);
        let mut nodes = HashMap::new();
        nodes.insert(
            root,
            Node {
                id: root,
                san: None,
                position: start_fen.to_string(),
                comment: None,
                annotations: Vec::new(),
                parent: None,
                children: Vec::new(),
            },
        );
        Ok(Self {
            nodes,
            root,
            current: root,
            next_id: 1,
            start,
        })
    }

    /// Replays a flat sequence of moves as a single main line, resolving
    /// each against the rules engine. The cursor ends on the last
    /// replayed node. The first failing move aborts the import, wrapped
    /// with its index.
    pub fn from_moves<S: AsRef<str>>(
        start_fen: &str,
        moves: &[S],
        rules: &impl Rules,
    ) -> Result<Self> {
        let mut tree = Self::new(start_fen, rules)?;
        for (index, san) in moves.iter().enumerate() {
            let parent = tree.current;
            let played = rules
                .try_move(tree.get(parent).position(), san.as_ref())
                .map_err(|cause| Error::Import {
                    index,
                    cause: Box::new(cause),
                })?;
            let child = tree
                .add_move(parent, &played.san, &played.position)
                .map_err(|cause| Error::Import {
                    index,
                    cause: Box::new(cause),
                })?;
            tree.current = child;
        }
        info!("replayed {} moves into a new tree", moves.len());
        Ok(tree)
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn current(&self) -> NodeId {
        self.current
    }

    /// Side/move-counter facts of the starting position, captured at
    /// construction.
    pub fn start_facts(&self) -> PositionFacts {
        self.start
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn node(&self, id: NodeId) -> Result<&Node> {
        self.nodes.get(&id).ok_or(Error::UnknownNode(id))
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut Node> {
        self.nodes.get_mut(&id).ok_or(Error::UnknownNode(id))
    }

    /// Arena access for ids the engine itself produced. A miss here means
    /// a structural invariant was broken and is a defect, not a
    /// recoverable error.
    pub(crate) fn get(&self, id: NodeId) -> &Node {
        match self.nodes.get(&id) {
            Some(node) => node,
            None => unreachable!("node {id} missing from the arena"),
        }
    }

    /// Appends a move below `parent`.
    ///
    /// Replaying a move that already exists below `parent` returns the
    /// existing child instead of branching again, so interactive re-entry
    /// never duplicates variations. A genuinely new move lands at child
    /// index 0 if it is the first continuation, otherwise at the end as
    /// the newest variation. The cursor is never moved; callers decide
    /// whether to advance it.
    pub fn add_move(&mut self, parent: NodeId, san: &str, position: &str) -> Result<NodeId> {
        let parent_node = self
            .nodes
            .get(&parent)
            .ok_or(Error::DetachedParent(parent))?;
        if let Some(existing) = parent_node
            .children
            .iter()
            .copied()
            .find(|id| self.nodes[id].san.as_deref() == Some(san))
        {
            return Ok(existing);
        }

        let id = NodeId(self.next_id);
        if self.nodes.contains_key(&id) {
            return Err(Error::DuplicateId(id));
        }
        self.next_id += 1;
        self.nodes.insert(
            id,
            Node {
                id,
                san: Some(san.to_string()),
                position: position.to_string(),
                comment: None,
                annotations: Vec::new(),
                parent: Some(parent),
                children: Vec::new(),
            },
        );
        if let Some(p) = self.nodes.get_mut(&parent) {
            p.children.push(id);
        }
        Ok(id)
    }

    /// Moves the cursor.
    pub fn set_current(&mut self, node: NodeId) -> Result<()> {
        if !self.nodes.contains_key(&node) {
            return Err(Error::UnknownNode(node));
        }
        self.current = node;
        Ok(())
    }

    /// Ancestry of `node`, root first, `node` last.
    pub fn path_to_root(&self, node: NodeId) -> Result<Vec<NodeId>> {
        self.node(node)?;
        let mut path = vec![node];
        let mut cursor = node;
        while let Some(parent) = self.get(cursor).parent {
            debug_assert!(
                self.get(parent).children.contains(&cursor),
                "node {parent} does not list {cursor} as a child"
            );
            path.push(parent);
            cursor = parent;
        }
        path.reverse();
        Ok(path)
    }

    /// The main line: child index 0 followed from the root until a
    /// childless node. Root first.
    pub fn main_line(&self) -> Vec<NodeId> {
        let mut line = vec![self.root];
        let mut cursor = self.root;
        while let Some(&next) = self.get(cursor).children.first() {
            line.push(next);
            cursor = next;
        }
        line
    }

    /// Flat notation of the main line, in order.
    pub fn main_line_sans(&self) -> Vec<String> {
        self.main_line()
            .into_iter()
            .filter_map(|id| self.get(id).san.clone())
            .collect()
    }

    /// True iff every step from the root to `node` went through child
    /// index 0. Derived from structure, never cached.
    pub fn is_main_line(&self, node: NodeId) -> Result<bool> {
        let path = self.path_to_root(node)?;
        for step in path.windows(2) {
            if self.get(step[0]).children.first() != Some(&step[1]) {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Ply depth of `node` from the root (root is 0).
    pub fn ply(&self, node: NodeId) -> Result<usize> {
        Ok(self.path_to_root(node)?.len() - 1)
    }

    /// Full-move number of the move that produced `node`, derived from
    /// ply depth and the starting position's counters. For the root this
    /// is the starting full-move counter itself.
    pub fn move_number(&self, node: NodeId) -> Result<u32> {
        let ply = self.ply(node)?;
        if ply == 0 {
            return Ok(self.start.fullmove_number);
        }
        let offset = if self.start.white_to_move { 0 } else { 1 };
        Ok(self.start.fullmove_number + ((ply - 1 + offset) / 2) as u32)
    }

    /// Whether white was to move in the position `node` branches from,
    /// i.e. whether white played `node`'s move. For the root this is the
    /// side to move at the start.
    pub fn white_to_move_before(&self, node: NodeId) -> Result<bool> {
        let ply = self.ply(node)?;
        if ply == 0 {
            return Ok(self.start.white_to_move);
        }
        Ok(self.start.white_to_move == ((ply - 1) % 2 == 0))
    }

    /// Removes `node` and its entire subtree.
    ///
    /// If the cursor was on `node` or any descendant it is reassigned to
    /// `node`'s parent, so it never dangles. Sibling order of the
    /// remaining children is preserved.
    pub fn delete_from(&mut self, node: NodeId) -> Result<()> {
        let parent = match self.node(node)?.parent {
            Some(parent) => parent,
            None => return Err(Error::CannotDeleteRoot),
        };
        if self.path_to_root(self.current)?.contains(&node) {
            self.current = parent;
        }
        if let Some(p) = self.nodes.get_mut(&parent) {
            p.children.retain(|&child| child != node);
        }
        let removed = self.remove_subtree(node);
        info!("deleted subtree of {} node(s) below {}", removed, parent);
        Ok(())
    }

    /// Removes an entire side branch. Only valid when `node` is not the
    /// main-line child of its parent; main-line truncation goes through
    /// [`delete_from`](Self::delete_from) instead, since callers treat
    /// the two intents differently upstream.
    pub fn delete_variation(&mut self, node: NodeId) -> Result<()> {
        match self.node(node)?.parent {
            None => Err(Error::CannotDeleteRoot),
            Some(_) if self.child_index(node)? == 0 => Err(Error::NotAVariation(node)),
            Some(_) => self.delete_from(node),
        }
    }

    /// Reorders `node` to be the main-line child of its parent. The
    /// previous main-line child shifts to index 1; other variations keep
    /// their relative order. One level only: promoting a deep variation
    /// all the way up takes repeated calls, each at its own branch point.
    pub fn promote_variation(&mut self, node: NodeId) -> Result<()> {
        let parent = self.node(node)?.parent.ok_or(Error::DetachedNode(node))?;
        let index = self.child_index(node)?;
        if index == 0 {
            return Err(Error::AlreadyMainLine(node));
        }
        if let Some(p) = self.nodes.get_mut(&parent) {
            p.children.remove(index);
            p.children.insert(0, node);
        }
        info!("promoted {} to the main line below {}", node, parent);
        Ok(())
    }

    /// Sets or clears (`""` clears) the free-text comment on `node`.
    pub fn set_comment(&mut self, node: NodeId, text: &str) -> Result<()> {
        let node = self.node_mut(node)?;
        node.comment = if text.is_empty() {
            None
        } else {
            Some(text.to_string())
        };
        Ok(())
    }

    /// Replaces the annotation tags on `node` wholesale. The tags are
    /// opaque payload produced and consumed by external analysis.
    pub fn set_annotations(&mut self, node: NodeId, tags: Vec<String>) -> Result<()> {
        self.node_mut(node)?.annotations = tags;
        Ok(())
    }

    fn child_index(&self, node: NodeId) -> Result<usize> {
        let parent = self.node(node)?.parent.ok_or(Error::DetachedNode(node))?;
        match self.get(parent).children.iter().position(|&c| c == node) {
            Some(index) => Ok(index),
            None => unreachable!("node {node} missing from its parent's children"),
        }
    }

    fn remove_subtree(&mut self, node: NodeId) -> usize {
        let mut stack = vec![node];
        let mut removed = 0;
        while let Some(id) = stack.pop() {
            if let Some(n) = self.nodes.remove(&id) {
                removed += 1;
                stack.extend(n.children);
            }
        }
        removed
    }
}
