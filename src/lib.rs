//! Query and edit OpenFOAM dictionary files.
//!
//! A dictionary is parsed into an ordered tree ([`domain::Dict`]), addressed
//! with slash-separated key paths ([`domain::KeyPath`]), edited in memory and
//! rendered back in OpenFOAM layout.
//!
//! ```
//! use foamdict::domain::{edit, parse_document, KeyPath, Renderer};
//!
//! let mut root = parse_document("solvers { p { solver PCG; } }").unwrap();
//! edit::set(&mut root, &KeyPath::parse("solvers/p/tolerance"), "1e-06").unwrap();
//! let text = Renderer::default().render_document(&root);
//! assert!(text.contains("tolerance       1e-06;"));
//! ```

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;
