//! # Delegate Module
//!
//! Exclusion rules and the pluggable per-node geometry strategy.
//!
//! A [`ShapeDelegate`] is consulted for every leaf node that has no custom
//! trace. If it reports the node as handled the default strategy is skipped,
//! so at most one of the two contributes geometry for a node.

use std::collections::HashSet;
use std::fmt;

use kurbo::Point;

use crate::node::{Node, NodeId};
use crate::path::SilhouettePath;

/// Nodes (with their subtrees) that must not be traced.
#[derive(Default)]
pub enum Exclusion {
    #[default]
    None,
    Ids(HashSet<NodeId>),
    Predicate(Box<dyn Fn(&Node) -> bool>),
}

impl Exclusion {
    pub fn ids<I, T>(ids: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<NodeId>,
    {
        Exclusion::Ids(ids.into_iter().map(Into::into).collect())
    }

    pub fn predicate(f: impl Fn(&Node) -> bool + 'static) -> Self {
        Exclusion::Predicate(Box::new(f))
    }

    pub fn excludes(&self, node: &Node) -> bool {
        match self {
            Exclusion::None => false,
            Exclusion::Ids(ids) => node.id.as_ref().is_some_and(|id| ids.contains(id)),
            Exclusion::Predicate(f) => f(node),
        }
    }
}

impl fmt::Debug for Exclusion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Exclusion::None => f.write_str("Exclusion::None"),
            Exclusion::Ids(ids) => f.debug_tuple("Exclusion::Ids").field(ids).finish(),
            Exclusion::Predicate(_) => f.write_str("Exclusion::Predicate(..)"),
        }
    }
}

/// Caller-supplied silhouette strategy for individual nodes.
pub trait ShapeDelegate {
    /// Optionally appends the silhouette of `node` to `path`.
    ///
    /// # Arguments
    /// * `node` - A leaf node without custom tracing.
    /// * `path` - The in-progress silhouette.
    /// * `exclusion` - The exclusion rules of the current trace pass.
    /// * `offset` - Absolute top-left of `node` relative to the trace root.
    ///
    /// # Returns
    /// * `true` if the node's silhouette has been fully handled.
    fn handle(
        &self,
        node: &Node,
        path: &mut SilhouettePath,
        exclusion: &Exclusion,
        offset: Point,
    ) -> bool;
}

impl<F> ShapeDelegate for F
where
    F: Fn(&Node, &mut SilhouettePath, &Exclusion, Point) -> bool,
{
    fn handle(
        &self,
        node: &Node,
        path: &mut SilhouettePath,
        exclusion: &Exclusion,
        offset: Point,
    ) -> bool {
        self(node, path, exclusion, offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Rect;

    #[test]
    fn id_exclusion_ignores_anonymous_nodes() {
        let exclusion = Exclusion::ids(["avatar"]);
        assert!(exclusion.excludes(&Node::generic(Rect::ZERO).with_id("avatar")));
        assert!(!exclusion.excludes(&Node::generic(Rect::ZERO).with_id("title")));
        assert!(!exclusion.excludes(&Node::generic(Rect::ZERO)));
    }

    #[test]
    fn predicate_exclusion() {
        let exclusion = Exclusion::predicate(|node| node.width() > 50.0);
        assert!(exclusion.excludes(&Node::generic(Rect::new(0.0, 0.0, 60.0, 1.0))));
        assert!(!exclusion.excludes(&Node::generic(Rect::new(0.0, 0.0, 40.0, 1.0))));
        assert!(!Exclusion::None.excludes(&Node::generic(Rect::ZERO)));
    }
}
