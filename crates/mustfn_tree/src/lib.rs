//! Read-only access to a YANG-style configuration tree.
//!
//! The validators in `mustfn` only ever see a tree through the [`XpathNode`]
//! capability: a local name, a scalar value, a parent, the root, and children
//! selected by a [`Filter`]. This crate defines that contract, the small query
//! toolkit built on it, and [`Tree`], an in-memory implementation used by tests
//! and by the `mustfn` command line tool.

mod filter;
mod node;
mod path;
pub mod query;
mod tree;

pub use filter::Filter;
pub use filter::Scope;
pub use node::ChildOrder;
pub use node::Node;
pub use node::XpathNode;
pub use path::PathElement;
pub use path::PathError;
pub use query::RequiredValues;
pub use tree::Tree;
pub use tree::TreeBuilder;
pub use tree::TreeNode;
