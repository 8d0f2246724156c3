//! Dictionary tree: tokens, keywords, nodes and ordered dictionaries

use std::fmt;

/// Root entry holding the file header, rendered as a preamble.
pub const HEADER_KEY: &str = "FoamFile";

/// A primitive token on the right-hand side of an entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// Bare word: `uniform`, `PCG`, `$internalField`, `#calc`
    Word(String),
    /// Double-quoted string, raw content between the quotes (escapes kept as written)
    Str(String),
    /// Numeric lexeme kept verbatim so `1e-05` renders as `1e-05`
    Number(String),
    /// Punctuation inside values: `( ) [ ] { } ; ,`
    Punct(char),
}

impl Token {
    pub fn word(s: impl Into<String>) -> Self {
        Token::Word(s.into())
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Token::Number(n) => n.parse().ok(),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Token::Number(n) => n.parse().ok(),
            _ => None,
        }
    }

    /// Tokens that take no space after them when rendered.
    pub(crate) fn is_opening(&self) -> bool {
        matches!(self, Token::Punct('(') | Token::Punct('['))
    }

    /// Tokens that take no space before them when rendered.
    pub(crate) fn is_closing(&self) -> bool {
        matches!(
            self,
            Token::Punct(')') | Token::Punct(']') | Token::Punct(';') | Token::Punct(',')
        )
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Word(w) | Token::Number(w) => write!(f, "{}", w),
            Token::Str(s) => write!(f, "\"{}\"", s),
            Token::Punct(c) => write!(f, "{}", c),
        }
    }
}

/// Left-hand side of an entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Keyword {
    /// Plain keyword
    Word(String),
    /// Quoted keyword, a regular-expression key. Listed, never matched.
    Pattern(String),
    /// Function entry at keyword position, name includes the leading `#`
    Directive(String),
}

impl Keyword {
    pub fn as_str(&self) -> &str {
        match self {
            Keyword::Word(s) | Keyword::Pattern(s) | Keyword::Directive(s) => s,
        }
    }

    pub fn is_directive(&self) -> bool {
        matches!(self, Keyword::Directive(_))
    }

    pub fn is_pattern(&self) -> bool {
        matches!(self, Keyword::Pattern(_))
    }

    /// Addressable keywords are the ones a path component can name.
    fn matches(&self, key: &str) -> bool {
        match self {
            Keyword::Word(s) | Keyword::Pattern(s) => s == key,
            Keyword::Directive(_) => false,
        }
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Keyword::Word(s) | Keyword::Directive(s) => write!(f, "{}", s),
            Keyword::Pattern(s) => write!(f, "\"{}\"", s),
        }
    }
}

/// A dictionary entry value: either a leaf token sequence or a nested dictionary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Leaf(Vec<Token>),
    Dict(Dict),
}

impl Node {
    pub fn is_dict(&self) -> bool {
        matches!(self, Node::Dict(_))
    }

    pub fn as_dict(&self) -> Option<&Dict> {
        match self {
            Node::Dict(d) => Some(d),
            Node::Leaf(_) => None,
        }
    }

    pub fn as_dict_mut(&mut self) -> Option<&mut Dict> {
        match self {
            Node::Dict(d) => Some(d),
            Node::Leaf(_) => None,
        }
    }

    pub fn as_leaf(&self) -> Option<&[Token]> {
        match self {
            Node::Leaf(tokens) => Some(tokens),
            Node::Dict(_) => None,
        }
    }
}

/// Borrowed view of a resolved node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeRef<'a> {
    Leaf(&'a [Token]),
    Dict(&'a Dict),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub keyword: Keyword,
    pub node: Node,
}

impl Entry {
    pub fn new(keyword: Keyword, node: Node) -> Self {
        Self { keyword, node }
    }

    pub fn is_header(&self) -> bool {
        matches!(&self.keyword, Keyword::Word(k) if k == HEADER_KEY) && self.node.is_dict()
    }
}

/// Ordered dictionary. Word and pattern keys are unique, directives may repeat.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dict {
    entries: Vec<Entry>,
}

impl Dict {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entry> {
        self.entries.iter()
    }

    pub fn position(&self, key: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.keyword.matches(key))
    }

    pub fn contains(&self, key: &str) -> bool {
        self.position(key).is_some()
    }

    pub fn get(&self, key: &str) -> Option<&Node> {
        self.entries
            .iter()
            .find(|e| e.keyword.matches(key))
            .map(|e| &e.node)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Node> {
        self.entries
            .iter_mut()
            .find(|e| e.keyword.matches(key))
            .map(|e| &mut e.node)
    }

    /// Insert or overwrite. An overwritten entry keeps its position and keyword.
    pub fn set(&mut self, keyword: Keyword, node: Node) {
        if !keyword.is_directive() {
            if let Some(idx) = self.position(keyword.as_str()) {
                self.entries[idx].node = node;
                return;
            }
        }
        self.entries.push(Entry::new(keyword, node));
    }

    pub fn push(&mut self, entry: Entry) {
        self.set(entry.keyword, entry.node);
    }

    pub fn remove(&mut self, key: &str) -> Option<Node> {
        let idx = self.position(key)?;
        Some(self.entries.remove(idx).node)
    }

    /// Replace the keyword of `old` in place. Returns false if `old` is absent.
    pub(crate) fn rename(&mut self, old: &str, new: Keyword) -> bool {
        match self.position(old) {
            Some(idx) => {
                self.entries[idx].keyword = new;
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub(crate) fn retain(&mut self, f: impl FnMut(&Entry) -> bool) {
        self.entries.retain(f);
    }

    /// All addressable keywords in document order.
    pub fn toc(&self) -> Vec<&Keyword> {
        self.entries
            .iter()
            .map(|e| &e.keyword)
            .filter(|k| !k.is_directive())
            .collect()
    }
}

impl FromIterator<Entry> for Dict {
    fn from_iter<I: IntoIterator<Item = Entry>>(iter: I) -> Self {
        let mut dict = Dict::new();
        for entry in iter {
            dict.push(entry);
        }
        dict
    }
}
