use std::fmt;

use mustfn_tree::Node;
use serde::Serialize;
use strum::Display;

/// Type of an argument or return value, as named in signatures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum DatumType {
    Nodeset,
    Number,
    Bool,
}

/// A value passed to or returned from a custom function.
#[derive(Debug, Clone)]
pub enum Datum {
    Bool(bool),
    Number(f64),
    Nodeset(Vec<Node>),
}

impl Datum {
    pub fn datum_type(&self) -> DatumType {
        match self {
            Datum::Bool(_) => DatumType::Bool,
            Datum::Number(_) => DatumType::Number,
            Datum::Nodeset(_) => DatumType::Nodeset,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Datum::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Datum::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_nodeset(&self) -> Option<&[Node]> {
        match self {
            Datum::Nodeset(nodes) => Some(nodes),
            _ => None,
        }
    }

    /// The only node of a nodeset holding exactly one node.
    ///
    /// Every function in this crate accepts being applied to a single node;
    /// an empty or larger nodeset is a malformed call.
    pub fn single_node(&self) -> Option<&Node> {
        match self.as_nodeset()? {
            [node] => Some(node),
            _ => None,
        }
    }
}

impl From<bool> for Datum {
    fn from(b: bool) -> Self {
        Datum::Bool(b)
    }
}

impl From<f64> for Datum {
    fn from(n: f64) -> Self {
        Datum::Number(n)
    }
}

impl From<Node> for Datum {
    fn from(node: Node) -> Self {
        Datum::Nodeset(vec![node])
    }
}

impl fmt::Display for Datum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Datum::Bool(b) => write!(f, "{}", b),
            Datum::Number(n) => write!(f, "{}", n),
            Datum::Nodeset(nodes) => write!(f, "nodeset({})", nodes.len()),
        }
    }
}

#[cfg(test)]
mod tests {
    use mustfn_tree::Tree;

    use super::*;

    #[test]
    fn test_type_names() {
        assert_eq!(DatumType::Nodeset.to_string(), "nodeset");
        assert_eq!(DatumType::Number.to_string(), "number");
        assert_eq!(DatumType::Bool.to_string(), "bool");
    }

    #[test]
    fn test_single_node() {
        let paths: &[&[&str]] = &[&["a", "b+1"], &["a", "b+2"]];
        let tree = Tree::from_paths(paths).unwrap();

        let one = Datum::from(tree.find_first("/a/b").unwrap());
        assert_eq!(one.single_node().map(|n| n.value()), Some("1"));

        let two = Datum::Nodeset(tree.find_all("/a/b"));
        assert!(two.single_node().is_none());
        assert!(Datum::Nodeset(Vec::new()).single_node().is_none());
        assert!(Datum::Bool(true).single_node().is_none());
    }

    #[test]
    fn test_display() {
        assert_eq!(Datum::Bool(false).to_string(), "false");
        assert_eq!(Datum::Number(8.0).to_string(), "8");
        assert_eq!(Datum::Nodeset(Vec::new()).to_string(), "nodeset(0)");
    }
}
