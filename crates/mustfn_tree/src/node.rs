use std::fmt;
use std::sync::Arc;

use crate::Filter;

/// Shared handle to a node in a configuration snapshot.
pub type Node = Arc<dyn XpathNode>;

/// Order in which [`XpathNode::children`] returns matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChildOrder {
    /// Order as configured.
    #[default]
    AsConfigured,
    /// Sorted by local name, then value, for deterministic iteration.
    Sorted,
}

/// Capability contract for a node in a configuration tree.
///
/// Implementations expose an immutable snapshot: nothing reachable through
/// this trait may change for the duration of a predicate call, and handles
/// may be shared between threads evaluating predicates against the same
/// snapshot.
///
/// List entries report their key as `value()`, leaves report their value,
/// containers report an empty string.
pub trait XpathNode: Send + Sync + fmt::Debug {
    fn name(&self) -> &str;

    fn value(&self) -> &str;

    /// `None` at the root.
    fn parent(&self) -> Option<Node>;

    fn root(&self) -> Node;

    /// Children selected by `filter`.
    fn children(&self, filter: &Filter, order: ChildOrder) -> Vec<Node>;
}
