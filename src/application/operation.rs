//! Operation requests: what to do to which dictionary, and where the result goes

use std::fmt;
use std::path::PathBuf;

use crate::domain::KeyPath;

/// Fallback for a lookup of a missing key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fallback {
    /// Print the value, leave the file alone
    Default(String),
    /// Print the value and write it into the file
    AddDefault(String),
}

/// One dictionary operation. Exactly one runs per invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    Toc,
    Keys,
    PatternKeys,
    Found,
    Lookup { fallback: Option<Fallback> },
    Set { value: String },
    Merge { text: String },
    MergeSub { source: KeyPath },
    Remove,
    ChangeKey { new_key: String },
    Clear,
}

impl Operation {
    pub fn name(&self) -> &'static str {
        match self {
            Operation::Toc => "toc",
            Operation::Keys => "keys",
            Operation::PatternKeys => "patternKeys",
            Operation::Found => "found",
            Operation::Lookup { .. } => "lookup",
            Operation::Set { .. } => "set",
            Operation::Merge { .. } => "merge",
            Operation::MergeSub { .. } => "mergeSub",
            Operation::Remove => "remove",
            Operation::ChangeKey { .. } => "changeKey",
            Operation::Clear => "clear",
        }
    }

    /// Operations that address a single entry and cannot default to the root.
    pub fn requires_key(&self) -> bool {
        matches!(
            self,
            Operation::Found
                | Operation::Lookup { .. }
                | Operation::Set { .. }
                | Operation::Remove
                | Operation::ChangeKey { .. }
        )
    }

    /// Read-only operations print to stdout and never honour a destination.
    pub fn is_read_only(&self) -> bool {
        match self {
            Operation::Toc | Operation::Keys | Operation::PatternKeys | Operation::Found => true,
            Operation::Lookup { fallback } => !matches!(fallback, Some(Fallback::AddDefault(_))),
            _ => false,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Where a mutated document is written.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Destination {
    #[default]
    Stdout,
    File(PathBuf),
    InPlace,
}

/// A validated request: dictionary file, optional key, operation and destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub dict: PathBuf,
    pub key: Option<KeyPath>,
    pub operation: Operation,
    pub destination: Destination,
}

impl Request {
    pub fn new(dict: impl Into<PathBuf>, operation: Operation) -> Self {
        Self {
            dict: dict.into(),
            key: None,
            operation,
            destination: Destination::Stdout,
        }
    }

    pub fn with_key(mut self, key: impl Into<KeyPath>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn with_destination(mut self, destination: Destination) -> Self {
        self.destination = destination;
        self
    }

    /// The key path, or the root when none was given.
    pub fn key_or_root(&self) -> KeyPath {
        self.key.clone().unwrap_or_default()
    }
}
