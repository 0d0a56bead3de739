use std::fmt;
use std::str::FromStr;

/// One step of a fixture path.
///
/// | Text             | Element                                    |
/// |------------------|--------------------------------------------|
/// | `name`           | container                                  |
/// | `list/key+value` | list entry keyed by leaf `key` = `value`   |
/// | `leaf+value`     | leaf                                       |
/// | `leaf@value`     | leaf-list entry                            |
/// | `leaf%`          | empty-typed leaf                           |
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathElement {
    Container { name: String },
    ListEntry { list: String, key: String, value: String },
    Leaf { name: String, value: String },
    LeafListEntry { name: String, value: String },
    EmptyLeaf { name: String },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PathError {
    #[error("empty path element")]
    Empty,

    #[error("path element '{0}' has an empty name")]
    EmptyName(String),

    #[error("list entry '{0}' must be written as list/key+value")]
    MissingKeyValue(String),

    #[error("path element '{0}' has an empty value")]
    EmptyValue(String),
}

impl PathElement {
    /// Local name of the node this element creates.
    pub fn name(&self) -> &str {
        match self {
            PathElement::Container { name }
            | PathElement::Leaf { name, .. }
            | PathElement::LeafListEntry { name, .. }
            | PathElement::EmptyLeaf { name } => name,
            PathElement::ListEntry { list, .. } => list,
        }
    }

    /// Value of the node this element creates.
    pub fn value(&self) -> &str {
        match self {
            PathElement::Container { .. } | PathElement::EmptyLeaf { .. } => "",
            PathElement::ListEntry { value, .. }
            | PathElement::Leaf { value, .. }
            | PathElement::LeafListEntry { value, .. } => value,
        }
    }
}

fn split_named(text: &str, sep: char) -> Result<(String, String), PathError> {
    let (name, value) = text
        .split_once(sep)
        .ok_or_else(|| PathError::MissingKeyValue(text.to_string()))?;
    if name.is_empty() {
        return Err(PathError::EmptyName(text.to_string()));
    }
    if value.is_empty() {
        return Err(PathError::EmptyValue(text.to_string()));
    }
    Ok((name.to_string(), value.to_string()))
}

impl FromStr for PathElement {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(PathError::Empty);
        }

        if let Some((list, entry)) = s.split_once('/') {
            if list.is_empty() {
                return Err(PathError::EmptyName(s.to_string()));
            }
            let (key, value) = split_named(entry, '+').map_err(|e| match e {
                PathError::MissingKeyValue(_) => PathError::MissingKeyValue(s.to_string()),
                PathError::EmptyName(_) => PathError::EmptyName(s.to_string()),
                PathError::EmptyValue(_) => PathError::EmptyValue(s.to_string()),
                PathError::Empty => PathError::Empty,
            })?;
            return Ok(PathElement::ListEntry {
                list: list.to_string(),
                key,
                value,
            });
        }

        if let Some(name) = s.strip_suffix('%') {
            if name.is_empty() {
                return Err(PathError::EmptyName(s.to_string()));
            }
            return Ok(PathElement::EmptyLeaf {
                name: name.to_string(),
            });
        }

        if s.contains('+') {
            let (name, value) = split_named(s, '+')?;
            return Ok(PathElement::Leaf { name, value });
        }

        if s.contains('@') {
            let (name, value) = split_named(s, '@')?;
            return Ok(PathElement::LeafListEntry { name, value });
        }

        Ok(PathElement::Container {
            name: s.to_string(),
        })
    }
}

impl fmt::Display for PathElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathElement::Container { name } => write!(f, "{}", name),
            PathElement::ListEntry { list, key, value } => write!(f, "{}/{}+{}", list, key, value),
            PathElement::Leaf { name, value } => write!(f, "{}+{}", name, value),
            PathElement::LeafListEntry { name, value } => write!(f, "{}@{}", name, value),
            PathElement::EmptyLeaf { name } => write!(f, "{}%", name),
        }
    }
}
