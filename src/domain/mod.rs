//! Domain layer: dictionary tree, paths, parsing, editing and rendering
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod edit;
pub mod error;
pub mod node;
pub mod parser;
pub mod path;
pub mod render;

pub use error::{DomainError, DomainResult};
pub use node::{Dict, Entry, Keyword, Node, NodeRef, Token, HEADER_KEY};
pub use parser::{parse_dict_body, parse_document, parse_entry, validate_keyword};
pub use path::{exists, resolve, KeyPath, Resolution};
pub use render::{FormatOptions, Renderer};
