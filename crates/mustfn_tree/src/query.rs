//! Tree query toolkit shared by every validator.
//!
//! All helpers are read-only and keep no state between calls. The "exactly
//! one" rule lives here: a lookup that finds several matches is treated the
//! same as one that finds none, and each caller decides what that means for
//! its verdict.

use std::slice;

use tracing::trace;

use crate::ChildOrder;
use crate::Filter;
use crate::Node;
use crate::XpathNode;

/// Follow `path` one filter per level from every node in `nodes`.
///
/// An empty path returns `nodes` unchanged. Sibling order in the result
/// follows the source tree but callers must not depend on it.
pub fn resolve_descendants(nodes: &[Node], path: &[Filter]) -> Vec<Node> {
    let mut current = nodes.to_vec();
    for filter in path {
        current = current
            .iter()
            .flat_map(|node| node.children(filter, ChildOrder::AsConfigured))
            .collect();
    }
    current
}

/// [`resolve_descendants`] from a single starting node.
pub fn descendants(node: &Node, path: &[Filter]) -> Vec<Node> {
    resolve_descendants(slice::from_ref(node), path)
}

/// The child selected by `filter`, if there is exactly one.
pub fn single_child(node: &dyn XpathNode, filter: &Filter) -> Option<Node> {
    let mut children = node.children(filter, ChildOrder::AsConfigured);
    if children.len() != 1 {
        trace!(
            parent = node.name(),
            %filter,
            matches = children.len(),
            "expected exactly one child"
        );
        return None;
    }
    children.pop()
}

/// Value of the child selected by `filter`, if there is exactly one.
pub fn single_child_value(node: &dyn XpathNode, filter: &Filter) -> Option<String> {
    single_child(node, filter).map(|child| child.value().to_string())
}

/// Set of `{filter -> expected value}` pairs a node's children must satisfy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequiredValues {
    fields: Vec<(Filter, String)>,
}

impl RequiredValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Require the child selected by `filter` to have `value`. A filter
    /// already present has its expected value replaced.
    pub fn with(mut self, filter: Filter, value: impl Into<String>) -> Self {
        let value = value.into();
        match self.fields.iter_mut().find(|(f, _)| *f == filter) {
            Some((_, expected)) => *expected = value,
            None => self.fields.push((filter, value)),
        }
        self
    }

    /// True iff, for every pair, `node` has exactly one matching child and
    /// that child carries the expected value.
    pub fn is_matched_by(&self, node: &dyn XpathNode) -> bool {
        self.fields.iter().all(|(filter, expected)| {
            single_child(node, filter).is_some_and(|child| child.value() == expected)
        })
    }
}

/// Number of nodes in `nodes` that satisfy every entry of `required`.
pub fn count_matching(nodes: &[Node], required: &RequiredValues) -> usize {
    nodes
        .iter()
        .filter(|&node| required.is_matched_by(&**node))
        .count()
}
