//! Slash-separated key paths and their resolution against a dictionary tree
//!
//! `solvers/p/solver` names the entry `solver` inside the sub-dictionary `p`
//! inside `solvers`. The empty key and `.` name the root dictionary.

use std::fmt;

use tracing::trace;

use crate::domain::error::{DomainError, DomainResult};
use crate::domain::node::{Dict, Keyword, Node, Token};
use crate::domain::parser::validate_keyword;

pub const DELIMITER: char = '/';

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct KeyPath {
    components: Vec<String>,
}

impl KeyPath {
    /// Split a key on `/`. Empty components are dropped; `.` alone is the root.
    pub fn parse(key: &str) -> Self {
        if key.trim() == "." {
            return Self::root();
        }
        let components = key
            .split(DELIMITER)
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(String::from)
            .collect();
        Self { components }
    }

    pub fn root() -> Self {
        Self::default()
    }

    pub fn is_root(&self) -> bool {
        self.components.is_empty()
    }

    pub fn components(&self) -> &[String] {
        &self.components
    }

    /// Terminal component, `None` for the root.
    pub fn name(&self) -> Option<&str> {
        self.components.last().map(String::as_str)
    }

    /// Parent path and terminal component, `None` for the root.
    pub fn split_last(&self) -> Option<(KeyPath, &str)> {
        let (last, parent) = self.components.split_last()?;
        Some((
            KeyPath {
                components: parent.to_vec(),
            },
            last.as_str(),
        ))
    }

    fn prefix(&self, len: usize) -> String {
        self.components[..len].join("/")
    }
}

impl From<&str> for KeyPath {
    fn from(key: &str) -> Self {
        KeyPath::parse(key)
    }
}

impl fmt::Display for KeyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_root() {
            write!(f, ".")
        } else {
            write!(f, "{}", self.components.join("/"))
        }
    }
}

/// Outcome of walking a path through the tree.
#[derive(Debug, PartialEq, Eq)]
pub enum Resolution<'a> {
    FoundLeaf(&'a [Token]),
    FoundDict(&'a Dict),
    /// `missing` is the path up to the first absent component, or up to a
    /// leaf that the path tried to descend into.
    NotFound { missing: String },
}

impl Resolution<'_> {
    pub fn is_found(&self) -> bool {
        !matches!(self, Resolution::NotFound { .. })
    }
}

pub fn resolve<'a>(root: &'a Dict, path: &KeyPath) -> Resolution<'a> {
    let mut current = root;
    let last = path.components.len();
    for (i, component) in path.components.iter().enumerate() {
        match current.get(component) {
            None => {
                return Resolution::NotFound {
                    missing: path.prefix(i + 1),
                }
            }
            Some(Node::Dict(dict)) => current = dict,
            Some(Node::Leaf(tokens)) if i + 1 == last => return Resolution::FoundLeaf(tokens),
            Some(Node::Leaf(_)) => {
                return Resolution::NotFound {
                    missing: path.prefix(i + 1),
                }
            }
        }
    }
    Resolution::FoundDict(current)
}

/// Read-only existence check. The root always exists.
pub fn exists(root: &Dict, path: &KeyPath) -> bool {
    let found = resolve(root, path).is_found();
    trace!("exists: path={} found={}", path, found);
    found
}

/// Container-only walk: every component must exist and be a dictionary.
pub fn sub_dict<'a>(root: &'a Dict, path: &KeyPath) -> DomainResult<&'a Dict> {
    let mut current = root;
    for (i, component) in path.components.iter().enumerate() {
        current = match current.get(component) {
            Some(Node::Dict(dict)) => dict,
            Some(Node::Leaf(_)) => return Err(DomainError::not_a_dict(path.prefix(i + 1))),
            None => return Err(DomainError::not_found(path.prefix(i + 1))),
        };
    }
    Ok(current)
}

pub fn sub_dict_mut<'a>(root: &'a mut Dict, path: &KeyPath) -> DomainResult<&'a mut Dict> {
    let mut current = root;
    for (i, component) in path.components.iter().enumerate() {
        current = match current.get_mut(component) {
            Some(Node::Dict(dict)) => dict,
            Some(Node::Leaf(_)) => return Err(DomainError::not_a_dict(path.prefix(i + 1))),
            None => return Err(DomainError::not_found(path.prefix(i + 1))),
        };
    }
    Ok(current)
}

/// Like `mkdir -p`: missing components are appended as empty dictionaries.
/// A leaf in the way is a type mismatch and a missing name that is not a plain
/// keyword is invalid; nothing is created in either case.
pub fn sub_dict_create<'a>(root: &'a mut Dict, path: &KeyPath) -> DomainResult<&'a mut Dict> {
    check_creatable(root, path)?;
    let mut current = root;
    for (i, component) in path.components.iter().enumerate() {
        if !current.contains(component) {
            trace!("sub_dict_create: creating {}", path.prefix(i + 1));
            current.set(Keyword::Word(component.clone()), Node::Dict(Dict::new()));
        }
        current = match current.get_mut(component) {
            Some(Node::Dict(dict)) => dict,
            _ => return Err(DomainError::not_a_dict(path.prefix(i + 1))),
        };
    }
    Ok(current)
}

/// Walks the existing part of `path`; the rest must be creatable keywords.
fn check_creatable(root: &Dict, path: &KeyPath) -> DomainResult<()> {
    let mut current = root;
    for (i, component) in path.components.iter().enumerate() {
        match current.get(component) {
            Some(Node::Dict(dict)) => current = dict,
            Some(Node::Leaf(_)) => return Err(DomainError::not_a_dict(path.prefix(i + 1))),
            None => {
                return path.components[i..]
                    .iter()
                    .try_for_each(|c| validate_keyword(c));
            }
        }
    }
    Ok(())
}
