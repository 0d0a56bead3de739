use std::fmt;

/// Which data a filter is allowed to see.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    /// Configuration data only. Operational (state-only) nodes are skipped.
    ConfigOnly,
    /// Configuration and state data.
    All,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum LocalName {
    Exact(&'static str),
    /// Any immediate child.
    Any,
}

/// Immutable child selector.
///
/// Filters are const-constructible so validators can keep them in statics and
/// share them across calls.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Filter {
    name: LocalName,
    scope: Scope,
}

impl Filter {
    /// Select configuration children with the given local name.
    pub const fn config_only(name: &'static str) -> Self {
        Self {
            name: LocalName::Exact(name),
            scope: Scope::ConfigOnly,
        }
    }

    /// Select every immediate configuration child.
    pub const fn any() -> Self {
        Self {
            name: LocalName::Any,
            scope: Scope::ConfigOnly,
        }
    }

    pub fn with_scope(mut self, scope: Scope) -> Self {
        self.scope = scope;
        self
    }

    /// Returns true if a child called `name` is selected by this filter.
    /// `state` marks operational data.
    pub fn matches(&self, name: &str, state: bool) -> bool {
        if state && self.scope == Scope::ConfigOnly {
            return false;
        }
        match &self.name {
            LocalName::Exact(expected) => *expected == name,
            LocalName::Any => true,
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            LocalName::Exact(name) => write!(f, "{}", name),
            LocalName::Any => write!(f, "*"),
        }
    }
}
