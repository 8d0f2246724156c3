//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Parser, ValueHint};
use itertools::Itertools;

use crate::application::{Destination, Fallback, Operation, Request};
use crate::cli::{CliError, CliResult};
use crate::domain::KeyPath;

/// Query and edit OpenFOAM dictionary files
#[derive(Parser, Debug)]
#[command(name = "foamdict")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Dictionary file to operate on
    #[arg(long, value_hint = ValueHint::FilePath, required_unless_present = "completion")]
    pub dict: Option<PathBuf>,

    /// Key path, sub-dictionaries separated by '/' (e.g. solvers/p/solver)
    #[arg(long, allow_hyphen_values = true)]
    pub key: Option<String>,

    /// Print the table of contents
    #[arg(long)]
    pub toc: bool,

    /// Print the plain keys
    #[arg(long)]
    pub keys: bool,

    /// Print the pattern keys
    #[arg(long = "patternKeys")]
    pub pattern_keys: bool,

    /// Exit with 0 if the key exists, 1 otherwise
    #[arg(long)]
    pub found: bool,

    /// Print the value of the key
    #[arg(long)]
    pub lookup: bool,

    /// Value printed by --lookup if the key is missing
    #[arg(long, value_name = "VALUE", allow_hyphen_values = true, conflicts_with = "add_default")]
    pub default: Option<String>,

    /// Like --default, but also writes the value into the dictionary
    #[arg(long = "addDefault", value_name = "VALUE", allow_hyphen_values = true)]
    pub add_default: Option<String>,

    /// Set the key to the given value, creating parent dictionaries
    #[arg(long, value_name = "VALUE", allow_hyphen_values = true)]
    pub set: Option<String>,

    /// Merge dictionary text into the dictionary at --key (default: root)
    #[arg(long, value_name = "TEXT")]
    pub merge: Option<String>,

    /// Merge the sub-dictionary at KEY into the dictionary at --key (default: root)
    #[arg(long = "mergeSub", value_name = "KEY")]
    pub merge_sub: Option<String>,

    /// Remove the key
    #[arg(long)]
    pub remove: bool,

    /// Rename the key, keeping value and position
    #[arg(long = "changeKey", value_name = "NEW_KEY")]
    pub change_key: Option<String>,

    /// Remove all entries of the dictionary at --key (default: root)
    #[arg(long)]
    pub clear: bool,

    /// Write the result to this file instead of stdout
    #[arg(short, long, value_hint = ValueHint::FilePath, conflicts_with = "inplace")]
    pub output: Option<PathBuf>,

    /// Write the result back to the dictionary file
    #[arg(short, long)]
    pub inplace: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Generate shell completions
    #[arg(long, value_enum, value_name = "SHELL")]
    pub completion: Option<clap_complete::Shell>,
}

impl Cli {
    /// The single selected operation.
    pub fn operation(&self) -> CliResult<Operation> {
        let mut selected: Vec<Operation> = Vec::new();
        if self.toc {
            selected.push(Operation::Toc);
        }
        if self.keys {
            selected.push(Operation::Keys);
        }
        if self.pattern_keys {
            selected.push(Operation::PatternKeys);
        }
        if self.found {
            selected.push(Operation::Found);
        }
        if self.lookup {
            let fallback = match (&self.default, &self.add_default) {
                (Some(value), _) => Some(Fallback::Default(value.clone())),
                (None, Some(value)) => Some(Fallback::AddDefault(value.clone())),
                (None, None) => None,
            };
            selected.push(Operation::Lookup { fallback });
        }
        if let Some(value) = &self.set {
            selected.push(Operation::Set {
                value: value.clone(),
            });
        }
        if let Some(text) = &self.merge {
            selected.push(Operation::Merge { text: text.clone() });
        }
        if let Some(source) = &self.merge_sub {
            selected.push(Operation::MergeSub {
                source: KeyPath::parse(source),
            });
        }
        if self.remove {
            selected.push(Operation::Remove);
        }
        if let Some(new_key) = &self.change_key {
            selected.push(Operation::ChangeKey {
                new_key: new_key.clone(),
            });
        }
        if self.clear {
            selected.push(Operation::Clear);
        }

        if selected.len() > 1 {
            return Err(CliError::InvalidArgs(format!(
                "multiple operations specified: {}",
                selected.iter().map(Operation::name).join(", ")
            )));
        }
        let operation = selected
            .pop()
            .ok_or_else(|| CliError::InvalidArgs("no operation specified".to_string()))?;

        if !self.lookup && (self.default.is_some() || self.add_default.is_some()) {
            return Err(CliError::InvalidArgs(
                "--default and --addDefault are only valid with --lookup".to_string(),
            ));
        }
        Ok(operation)
    }

    /// Validated request for the dictionary service.
    pub fn request(&self) -> CliResult<Request> {
        let operation = self.operation()?;
        let dict = self
            .dict
            .clone()
            .ok_or_else(|| CliError::InvalidArgs("missing --dict".to_string()))?;
        if operation.requires_key() && self.key.is_none() {
            return Err(CliError::InvalidArgs(format!(
                "the {} operation requires --key",
                operation
            )));
        }

        let destination = match (&self.output, self.inplace) {
            (Some(path), _) => Destination::File(path.clone()),
            (None, true) => Destination::InPlace,
            (None, false) => Destination::Stdout,
        };

        let mut request = Request::new(dict, operation).with_destination(destination);
        if let Some(key) = &self.key {
            request = request.with_key(KeyPath::parse(key));
        }
        Ok(request)
    }
}
