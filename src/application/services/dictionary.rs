//! Dictionary operation service
//!
//! Loads a dictionary file, runs one operation against the tree and routes the
//! result to stdout or a destination file.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, instrument};

use crate::application::operation::{Destination, Fallback, Operation, Request};
use crate::application::{ApplicationError, ApplicationResult, IoResultExt};
use crate::config::Settings;
use crate::domain::edit;
use crate::domain::path::sub_dict;
use crate::domain::{exists, parse_document, Dict, DomainError, KeyPath, Keyword, Renderer};
use crate::infrastructure::traits::FileSystem;

/// Result of one operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Outcome {
    /// Text for stdout, newline terminated
    pub output: Option<String>,
    /// File that was rewritten
    pub written: Option<PathBuf>,
    /// False only when `found` did not find the key
    pub found: bool,
}

impl Outcome {
    fn print(text: String) -> Self {
        Self {
            output: Some(text),
            written: None,
            found: true,
        }
    }

    fn lines<I: IntoIterator<Item = String>>(lines: I) -> Self {
        let text: String = lines.into_iter().map(|l| l + "\n").collect();
        Self::print(text)
    }
}

/// Service running dictionary operations.
pub struct DictionaryService {
    fs: Arc<dyn FileSystem>,
    settings: Arc<Settings>,
}

impl DictionaryService {
    /// Create a new dictionary service.
    pub fn new(fs: Arc<dyn FileSystem>, settings: Arc<Settings>) -> Self {
        Self { fs, settings }
    }

    pub fn renderer(&self) -> Renderer {
        Renderer::new(self.settings.format())
    }

    /// Read and parse a dictionary file.
    pub fn load(&self, path: &Path) -> ApplicationResult<Dict> {
        if !self.fs.exists(path) {
            return Err(ApplicationError::DictionaryNotFound(path.to_path_buf()));
        }
        if !self.fs.is_file(path) {
            return Err(ApplicationError::Unreadable {
                path: path.to_path_buf(),
                source: std::io::Error::new(std::io::ErrorKind::InvalidInput, "not a file"),
            });
        }
        let content = self.fs.read_to_string(path).or_unreadable(path)?;
        let root = parse_document(&content)?;
        debug!("load: {} root entries from {}", root.len(), path.display());
        Ok(root)
    }

    /// Run the request. Nothing is written unless the operation succeeded.
    #[instrument(skip(self, request), fields(op = %request.operation, dict = %request.dict.display()))]
    pub fn execute(&self, request: &Request) -> ApplicationResult<Outcome> {
        let op = &request.operation;
        if op.requires_key() && request.key.is_none() {
            return Err(ApplicationError::InvalidOperation(format!(
                "the {} operation requires --key",
                op
            )));
        }
        if op.is_read_only() && request.destination != Destination::Stdout {
            debug!("execute: {} is read-only, ignoring {:?}", op, request.destination);
        }

        let mut root = self.load(&request.dict)?;
        let key = request.key_or_root();
        debug!("execute: key={}", key);

        match op {
            Operation::Toc => {
                let dict = sub_dict(&root, &key)?;
                return Ok(Outcome::lines(dict.toc().iter().map(|k| k.to_string())));
            }
            Operation::Keys => {
                return Ok(Outcome::lines(listed(&root, &key, false)?));
            }
            Operation::PatternKeys => {
                return Ok(Outcome::lines(listed(&root, &key, true)?));
            }
            Operation::Found => {
                return Ok(Outcome {
                    found: exists(&root, &key),
                    ..Outcome::default()
                });
            }
            Operation::Lookup { fallback } => {
                return self.lookup(&mut root, &key, fallback.as_ref(), &request.dict);
            }
            Operation::Set { value } => edit::set(&mut root, &key, value)?,
            Operation::Merge { text } => edit::merge_text(&mut root, &key, text)?,
            Operation::MergeSub { source } => edit::merge_sub(&mut root, &key, source)?,
            Operation::Remove => {
                let removed = edit::remove(&mut root, &key)?;
                debug!("execute: removed={}", removed);
            }
            Operation::ChangeKey { new_key } => edit::rename(&mut root, &key, new_key)?,
            Operation::Clear => edit::clear(&mut root, &key, self.settings.preserve_header)?,
        }

        self.emit(&root, &request.destination, &request.dict)
    }

    fn lookup(
        &self,
        root: &mut Dict,
        key: &KeyPath,
        fallback: Option<&Fallback>,
        source: &Path,
    ) -> ApplicationResult<Outcome> {
        if exists(root, key) {
            let value = edit::lookup(root, key)?;
            return Ok(Outcome::print(self.renderer().render_value(value) + "\n"));
        }
        match fallback {
            None => Err(DomainError::not_found(key.to_string()).into()),
            Some(Fallback::Default(value)) => {
                debug!("lookup: {} missing, using default", key);
                Ok(Outcome::print(format!("{}\n", value)))
            }
            Some(Fallback::AddDefault(value)) => {
                debug!("lookup: {} missing, adding default", key);
                edit::add_default(root, key, value)?;
                let mut outcome = self.write(root, source)?;
                outcome.output = Some(format!("{}\n", value));
                Ok(outcome)
            }
        }
    }

    fn emit(
        &self,
        root: &Dict,
        destination: &Destination,
        source: &Path,
    ) -> ApplicationResult<Outcome> {
        match destination {
            Destination::Stdout => Ok(Outcome::print(self.renderer().render_document(root))),
            Destination::File(path) => self.write(root, path),
            Destination::InPlace => self.write(root, source),
        }
    }

    fn write(&self, root: &Dict, path: &Path) -> ApplicationResult<Outcome> {
        let text = self.renderer().render_document(root);
        debug!("write: {} bytes to {}", text.len(), path.display());
        self.fs.write_atomic(path, &text).or_unwritable(path)?;
        Ok(Outcome {
            output: None,
            written: Some(path.to_path_buf()),
            found: true,
        })
    }
}

/// Plain (`patterns == false`) or pattern keys of the dictionary at `key`.
fn listed(root: &Dict, key: &KeyPath, patterns: bool) -> ApplicationResult<Vec<String>> {
    let dict = sub_dict(root, key)?;
    Ok(dict
        .toc()
        .into_iter()
        .filter(|k| matches!(k, Keyword::Pattern(_)) == patterns)
        .map(|k| k.to_string())
        .collect())
}
