//! Dictionary tree to OpenFOAM text

use crate::domain::node::{Dict, Entry, Node, NodeRef, Token};

const BANNER_TOP: &str =
    "/*--------------------------------*- C++ -*----------------------------------*\\";
const BANNER_BOTTOM: &str =
    "\\*---------------------------------------------------------------------------*/";
const BANNER_LEFT: [&str; 5] = [
    "=========",
    "\\\\      /  F ield",
    " \\\\    /   O peration",
    "  \\\\  /    A nd",
    "   \\\\/     M anipulation",
];
const BANNER_LEFT_WIDTH: usize = 26;
const BANNER_RIGHT_WIDTH: usize = 48;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatOptions {
    /// Column at which values start, counted from the keyword
    pub keyword_width: usize,
    pub indent_width: usize,
    pub banner_version: String,
    pub banner_web: String,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            keyword_width: 16,
            indent_width: 4,
            banner_version: "2.1.x".to_string(),
            banner_web: "www.OpenFOAM.org".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Renderer {
    options: FormatOptions,
}

impl Renderer {
    pub fn new(options: FormatOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &FormatOptions {
        &self.options
    }

    /// Render a complete file. A `FoamFile` header at the root is emitted first,
    /// framed by the banner and the divider.
    pub fn render_document(&self, root: &Dict) -> String {
        let mut out = String::new();
        let header = root.iter().find(|e| e.is_header());
        if let Some(header) = header {
            out.push_str(&self.banner());
            self.write_entry(&mut out, header, 0);
            out.push_str(&divider());
            out.push_str("\n\n");
        }

        let body: Vec<&Entry> = root.iter().filter(|e| !e.is_header()).collect();
        for (i, entry) in body.iter().enumerate() {
            if i > 0 {
                out.push('\n');
            }
            self.write_entry(&mut out, entry, 0);
        }

        if header.is_some() {
            out.push_str("\n\n");
            out.push_str(&end_divider());
            out.push('\n');
        }
        out
    }

    /// Render a looked-up value: a leaf as its token line, a dictionary as a
    /// braced block.
    pub fn render_value(&self, node: NodeRef<'_>) -> String {
        match node {
            NodeRef::Leaf(tokens) => join_tokens(tokens),
            NodeRef::Dict(dict) => {
                let mut out = String::from("{\n");
                for entry in dict.iter() {
                    self.write_entry(&mut out, entry, 1);
                }
                out.push('}');
                out
            }
        }
    }

    pub fn banner(&self) -> String {
        let right = [
            String::new(),
            "OpenFOAM: The Open Source CFD Toolbox".to_string(),
            format!("Version:  {}", self.options.banner_version),
            format!("Web:      {}", self.options.banner_web),
            String::new(),
        ];
        let mut out = String::from(BANNER_TOP);
        out.push('\n');
        for (left, right) in BANNER_LEFT.iter().zip(right.iter()) {
            out.push_str(&format!(
                "| {:<lw$}| {:<rw$}|\n",
                left,
                right,
                lw = BANNER_LEFT_WIDTH,
                rw = BANNER_RIGHT_WIDTH
            ));
        }
        out.push_str(BANNER_BOTTOM);
        out.push('\n');
        out
    }

    fn write_entry(&self, out: &mut String, entry: &Entry, level: usize) {
        let indent = " ".repeat(level * self.options.indent_width);
        let keyword = entry.keyword.to_string();
        match &entry.node {
            Node::Dict(dict) => {
                out.push_str(&format!("{indent}{keyword}\n{indent}{{\n"));
                for child in dict.iter() {
                    self.write_entry(out, child, level + 1);
                }
                out.push_str(&format!("{indent}}}\n"));
            }
            Node::Leaf(tokens) if entry.keyword.is_directive() => {
                if tokens.is_empty() {
                    out.push_str(&format!("{indent}{keyword}\n"));
                } else {
                    out.push_str(&format!("{indent}{keyword} {}\n", join_tokens(tokens)));
                }
            }
            Node::Leaf(tokens) if tokens.is_empty() => {
                out.push_str(&format!("{indent}{keyword};\n"));
            }
            Node::Leaf(tokens) => {
                let pad = self
                    .options
                    .keyword_width
                    .saturating_sub(keyword.chars().count())
                    .max(1);
                out.push_str(&format!(
                    "{indent}{keyword}{}{};\n",
                    " ".repeat(pad),
                    join_tokens(tokens)
                ));
            }
        }
    }
}

/// Space-separated tokens, tight inside brackets and before separators.
pub fn join_tokens(tokens: &[Token]) -> String {
    let mut out = String::new();
    let mut previous: Option<&Token> = None;
    for token in tokens {
        if let Some(prev) = previous {
            if !prev.is_opening() && !token.is_closing() {
                out.push(' ');
            }
        }
        out.push_str(&token.to_string());
        previous = Some(token);
    }
    out
}

fn divider() -> String {
    format!("// {}//", "* ".repeat(37))
}

fn end_divider() -> String {
    format!("// {} //", "*".repeat(73))
}
