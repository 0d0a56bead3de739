use std::fmt;
use std::sync::Arc;

use crate::ChildOrder;
use crate::Filter;
use crate::Node;
use crate::PathElement;
use crate::PathError;
use crate::XpathNode;

const ROOT: usize = 0;

#[derive(Debug, Clone)]
struct Entry {
    name: String,
    value: String,
    state: bool,
    parent: Option<usize>,
    children: Vec<usize>,
}

impl Entry {
    fn new(name: &str, value: &str, state: bool, parent: Option<usize>) -> Self {
        Self {
            name: name.to_string(),
            value: value.to_string(),
            state,
            parent,
            children: Vec::new(),
        }
    }
}

/// Immutable in-memory configuration snapshot.
///
/// Built from fixture paths (see [`PathElement`] for the element grammar).
/// Cloning a `Tree` or any of its node handles is cheap; all of them share
/// one arena.
///
/// ```
/// use mustfn_tree::{Tree, XpathNode};
///
/// let tree = Tree::from_paths(&[
///     ["interfaces", "dataplane/tagnode+dp0xe20", "speed+10g"],
///     ["interfaces", "dataplane/tagnode+dp0xe21", "speed+auto"],
/// ])
/// .unwrap();
///
/// let speed = tree.find_first("/interfaces/dataplane/speed").unwrap();
/// assert_eq!(speed.value(), "10g");
/// ```
#[derive(Debug, Clone)]
pub struct Tree {
    entries: Arc<[Entry]>,
}

/// Incrementally assembles a [`Tree`].
///
/// Paths that share a prefix share nodes: an element is merged with an
/// existing sibling when both local name and value are equal.
#[derive(Debug, Clone)]
pub struct TreeBuilder {
    entries: Vec<Entry>,
}

impl Default for TreeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self {
            entries: vec![Entry::new("", "", false, None)],
        }
    }

    /// Add a path of configuration nodes.
    pub fn path<S: AsRef<str>>(&mut self, path: &[S]) -> Result<&mut Self, PathError> {
        self.insert(path, false)
    }

    /// Add a path whose final node is operational (state-only) data.
    pub fn state_path<S: AsRef<str>>(&mut self, path: &[S]) -> Result<&mut Self, PathError> {
        self.insert(path, true)
    }

    pub fn build(&self) -> Tree {
        Tree {
            entries: Arc::from(self.entries.clone()),
        }
    }

    fn insert<S: AsRef<str>>(&mut self, path: &[S], state: bool) -> Result<&mut Self, PathError> {
        let elements = path
            .iter()
            .map(|elem| elem.as_ref().parse::<PathElement>())
            .collect::<Result<Vec<_>, _>>()?;

        let last = elements.len().saturating_sub(1);
        let mut current = ROOT;
        for (i, elem) in elements.iter().enumerate() {
            current = self.child(current, elem.name(), elem.value(), state && i == last);
            if let PathElement::ListEntry { key, value, .. } = elem {
                self.child(current, key, value, false);
            }
        }
        Ok(self)
    }

    fn child(&mut self, parent: usize, name: &str, value: &str, state: bool) -> usize {
        let existing = self.entries[parent].children.iter().copied().find(|&id| {
            let entry = &self.entries[id];
            entry.name == name && entry.value == value && entry.state == state
        });
        if let Some(id) = existing {
            return id;
        }

        let id = self.entries.len();
        self.entries.push(Entry::new(name, value, state, Some(parent)));
        self.entries[parent].children.push(id);
        id
    }
}

impl Tree {
    pub fn builder() -> TreeBuilder {
        TreeBuilder::new()
    }

    /// Build a configuration-only tree from a list of fixture paths.
    pub fn from_paths<P, S>(paths: &[P]) -> Result<Self, PathError>
    where
        P: AsRef<[S]>,
        S: AsRef<str>,
    {
        let mut builder = TreeBuilder::new();
        for path in paths {
            builder.path(path.as_ref())?;
        }
        Ok(builder.build())
    }

    pub fn root(&self) -> Node {
        self.node(ROOT)
    }

    /// Number of nodes, including the root.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.len() <= 1
    }

    /// First node, depth-first in configured order, whose chain of local names
    /// from the root matches `path` (e.g. `/interfaces/dataplane/speed`).
    pub fn find_first(&self, path: &str) -> Option<Node> {
        self.find_all(path).into_iter().next()
    }

    /// Every node whose chain of local names from the root matches `path`.
    pub fn find_all(&self, path: &str) -> Vec<Node> {
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        let mut found = Vec::new();
        self.collect(ROOT, &segments, &mut found);
        found.into_iter().map(|id| self.node(id)).collect()
    }

    fn collect(&self, id: usize, segments: &[&str], found: &mut Vec<usize>) {
        let Some((first, rest)) = segments.split_first() else {
            found.push(id);
            return;
        };
        for &child in &self.entries[id].children {
            if self.entries[child].name == *first {
                self.collect(child, rest, found);
            }
        }
    }

    fn node(&self, id: usize) -> Node {
        Arc::new(TreeNode {
            entries: Arc::clone(&self.entries),
            id,
        })
    }
}

/// Handle to one node of a [`Tree`].
#[derive(Clone)]
pub struct TreeNode {
    entries: Arc<[Entry]>,
    id: usize,
}

impl TreeNode {
    fn entry(&self) -> &Entry {
        &self.entries[self.id]
    }

    fn handle(&self, id: usize) -> Node {
        Arc::new(TreeNode {
            entries: Arc::clone(&self.entries),
            id,
        })
    }
}

impl fmt::Debug for TreeNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TreeNode")
            .field("name", &self.entry().name)
            .field("value", &self.entry().value)
            .finish()
    }
}

impl XpathNode for TreeNode {
    fn name(&self) -> &str {
        &self.entry().name
    }

    fn value(&self) -> &str {
        &self.entry().value
    }

    fn parent(&self) -> Option<Node> {
        self.entry().parent.map(|id| self.handle(id))
    }

    fn root(&self) -> Node {
        self.handle(ROOT)
    }

    fn children(&self, filter: &Filter, order: ChildOrder) -> Vec<Node> {
        let mut ids: Vec<usize> = self
            .entry()
            .children
            .iter()
            .copied()
            .filter(|&id| {
                let child = &self.entries[id];
                filter.matches(&child.name, child.state)
            })
            .collect();

        if order == ChildOrder::Sorted {
            ids.sort_by(|&a, &b| {
                let (a, b) = (&self.entries[a], &self.entries[b]);
                a.name.cmp(&b.name).then_with(|| a.value.cmp(&b.value))
            });
        }

        ids.into_iter().map(|id| self.handle(id)).collect()
    }
}
