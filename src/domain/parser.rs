//! Tokenizer and parser for OpenFOAM dictionary text, built on `nom`
//!
//! Comments (`//` and `/* */`) are dropped. Words may carry balanced
//! parentheses, so `div(phi,U)` is one keyword. Repeated keys follow the
//! OpenFOAM merge mode: a repeated dictionary merges into the first one, a
//! repeated leaf overwrites it in place.

use nom::branch::alt;
use nom::bytes::complete::{is_not, tag, take_till, take_until};
use nom::character::complete::{anychar, char, multispace1, one_of};
use nom::combinator::{all_consuming, map, not, opt, recognize, value};
use nom::error::{ErrorKind, ParseError};
use nom::multi::many0;
use nom::sequence::{delimited, pair, preceded, terminated};
use nom::{IResult, Parser};
use tracing::{instrument, trace};

use crate::domain::edit::merge;
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::node::{Dict, Entry, Keyword, Node, Token};

/// Parse failure at `at`, the unconsumed rest of the source.
#[derive(Debug, Clone)]
struct SyntaxError<'a> {
    at: &'a str,
    message: String,
}

impl<'a> SyntaxError<'a> {
    fn new(at: &'a str, message: impl Into<String>) -> Self {
        Self {
            at,
            message: message.into(),
        }
    }

    /// Line and column within `src`. At end of input the error points at the last line.
    fn locate(self, src: &str) -> DomainError {
        let (line, column) = if self.at.is_empty() {
            (src.lines().count().max(1), 1)
        } else {
            let offset = src.len().saturating_sub(self.at.len());
            let consumed = src.get(..offset).unwrap_or_default();
            let line = consumed.matches('\n').count() + 1;
            let column = consumed
                .rsplit('\n')
                .next()
                .map_or(0, |l| l.chars().count())
                + 1;
            (line, column)
        };
        DomainError::Parse {
            line,
            column,
            message: self.message,
        }
    }
}

impl<'a> ParseError<&'a str> for SyntaxError<'a> {
    fn from_error_kind(input: &'a str, kind: ErrorKind) -> Self {
        Self::new(input, format!("unexpected input ({:?})", kind))
    }

    fn append(_: &'a str, _: ErrorKind, other: Self) -> Self {
        other
    }
}

type PResult<'a, O> = IResult<&'a str, O, SyntaxError<'a>>;

/// Unrecoverable error: stops every enclosing `alt`.
fn fail<'a, O>(at: &'a str, message: impl Into<String>) -> PResult<'a, O> {
    Err(nom::Err::Failure(SyntaxError::new(at, message)))
}

fn finish<O>(src: &str, result: PResult<'_, O>) -> DomainResult<O> {
    match result {
        Ok((_, out)) => Ok(out),
        Err(nom::Err::Error(e) | nom::Err::Failure(e)) => Err(e.locate(src)),
        Err(nom::Err::Incomplete(_)) => Err(SyntaxError::new("", "incomplete input").locate(src)),
    }
}

// ============================================================
// TOKENS
// ============================================================

/// Characters ending a word outside parentheses.
const WORD_STOP: &str = " \t\r\n\"{}()[];,/";
/// Inside parentheses a comma belongs to the word: `div(phi,U)`.
const GROUP_STOP: &str = " \t\r\n\"{}()[];/";

fn line_comment(input: &str) -> PResult<'_, &str> {
    recognize(pair(tag("//"), take_till(|c: char| c == '\n')))(input)
}

fn block_comment(input: &str) -> PResult<'_, &str> {
    let (rest, _) = tag("/*")(input)?;
    let closed: PResult<'_, &str> = terminated(take_until("*/"), tag("*/"))(rest);
    closed.or_else(|_| fail(input, "unterminated comment"))
}

/// Whitespace and comments.
fn trivia(input: &str) -> PResult<'_, ()> {
    value((), many0(alt((multispace1, line_comment, block_comment))))(input)
}

/// Like `ws`, but only leading trivia: the token position stays exact.
fn lexeme<'a, O, F>(inner: F) -> impl FnMut(&'a str) -> PResult<'a, O>
where
    F: Parser<&'a str, O, SyntaxError<'a>>,
{
    preceded(trivia, inner)
}

/// A `/` that does not open a comment.
fn slash(input: &str) -> PResult<'_, &str> {
    terminated(tag("/"), not(one_of("/*")))(input)
}

fn word_chunk(input: &str) -> PResult<'_, &str> {
    alt((is_not(WORD_STOP), slash))(input)
}

fn paren_group(input: &str) -> PResult<'_, &str> {
    recognize(delimited(
        char('('),
        many0(alt((is_not(GROUP_STOP), slash, paren_group))),
        char(')'),
    ))(input)
}

fn looks_numeric(s: &str) -> bool {
    let mut chars = s.chars();
    let leading = match chars.next() {
        Some(c) => c,
        None => return false,
    };
    let starts_like_number = leading.is_ascii_digit()
        || (matches!(leading, '-' | '+' | '.') && s.chars().any(|c| c.is_ascii_digit()));
    starts_like_number
        && s.chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '+' | '-'))
        && s.parse::<f64>().is_ok()
}

/// `1e-05`, `uniform`, `grad(U)`. A number never takes a group: `3(1 2 3)`
/// is a sized list.
fn word_or_number(input: &str) -> PResult<'_, Token> {
    let (rest, head) = word_chunk(input)?;
    if looks_numeric(head) {
        return Ok((rest, Token::Number(head.to_string())));
    }
    let (rest, _) = many0(alt((word_chunk, paren_group)))(rest)?;
    let text = &input[..input.len() - rest.len()];
    if rest.starts_with('(') {
        return fail(input, format!("unbalanced '(' in word '{}'", text));
    }
    Ok((rest, Token::Word(text.to_string())))
}

/// Raw content between double quotes, escapes kept as written.
fn string(input: &str) -> PResult<'_, Token> {
    let (rest, _) = char('"')(input)?;
    let body: PResult<'_, &str> = terminated(
        recognize(many0(alt((
            is_not("\\\""),
            recognize(pair(char('\\'), anychar)),
        )))),
        char('"'),
    )(rest);
    match body {
        Ok((rest, raw)) => Ok((rest, Token::Str(raw.to_string()))),
        Err(_) => fail(input, "unterminated string"),
    }
}

fn punct(input: &str) -> PResult<'_, Token> {
    map(one_of("{}()[];,"), Token::Punct)(input)
}

fn raw_token(input: &str) -> PResult<'_, Token> {
    alt((string, punct, word_or_number))(input)
}

/// Skips trivia. Returns the position of the next token together with the
/// token and the input after it, or `None` at end of input.
fn next_token(input: &str) -> PResult<'_, Option<(Token, &str)>> {
    let (at, _) = trivia(input)?;
    if at.is_empty() {
        return Ok((at, None));
    }
    let (rest, token) = raw_token(at)?;
    Ok((at, Some((token, rest))))
}

// ============================================================
// GRAMMAR
// ============================================================

/// Entries until end of input, or through the closing `}` when `nested`.
fn entries(input: &str, nested: bool) -> PResult<'_, Dict> {
    let mut dict = Dict::new();
    let mut input = input;
    loop {
        let (at, next) = next_token(input)?;
        match next {
            None if nested => return fail(at, "missing '}' at end of input"),
            None => return Ok((at, dict)),
            Some((Token::Punct('}'), rest)) if nested => return Ok((rest, dict)),
            Some((Token::Punct('}'), _)) => return fail(at, "unexpected '}'"),
            Some((Token::Punct(';'), rest)) => input = rest,
            Some(_) => {
                let (rest, entry) = entry(at)?;
                insert_merging(&mut dict, entry);
                input = rest;
            }
        }
    }
}

fn entry(input: &str) -> PResult<'_, Entry> {
    let (at, next) = next_token(input)?;
    let (input, keyword) = match next {
        None => return fail(at, "expected keyword"),
        Some((Token::Word(w), rest)) if w.starts_with('#') => (rest, Keyword::Directive(w)),
        Some((Token::Word(w) | Token::Number(w), rest)) => (rest, Keyword::Word(w)),
        Some((Token::Str(s), rest)) => (rest, Keyword::Pattern(s)),
        Some((Token::Punct(c), _)) => {
            return fail(at, format!("expected keyword, found '{}'", c))
        }
    };
    trace!("entry: keyword={}", keyword);

    if keyword.is_directive() {
        let (input, node) = directive_args(input)?;
        let (input, _) = opt(lexeme(char(';')))(input)?;
        return Ok((input, Entry::new(keyword, node)));
    }

    let (_, next) = next_token(input)?;
    if let Some((Token::Punct('{'), rest)) = next {
        let (input, dict) = entries(rest, true)?;
        return Ok((input, Entry::new(keyword, Node::Dict(dict))));
    }

    let (input, tokens) = leaf_value(input, &keyword)?;
    Ok((input, Entry::new(keyword, Node::Leaf(tokens))))
}

/// Tokens up to the terminating `;` at nesting depth zero.
fn leaf_value<'a>(input: &'a str, keyword: &Keyword) -> PResult<'a, Vec<Token>> {
    let mut tokens = Vec::new();
    let mut depth = 0usize;
    let mut input = input;
    loop {
        let (at, next) = next_token(input)?;
        let Some((token, rest)) = next else {
            return fail(at, format!("missing ';' after entry '{}'", keyword));
        };
        match token {
            Token::Punct(';') if depth == 0 => return Ok((rest, tokens)),
            Token::Punct('}') if depth == 0 => {
                return fail(at, format!("missing ';' after entry '{}'", keyword))
            }
            Token::Punct(c @ (')' | ']')) if depth == 0 => {
                return fail(at, format!("unbalanced '{}'", c))
            }
            Token::Punct('(' | '[' | '{') => depth += 1,
            Token::Punct(')' | ']' | '}') => depth -= 1,
            _ => {}
        }
        tokens.push(token);
        input = rest;
    }
}

/// A directive takes one token, a balanced list or a block.
fn directive_args(input: &str) -> PResult<'_, Node> {
    let (_, next) = next_token(input)?;
    if let Some((Token::Punct('{'), rest)) = next {
        let (input, dict) = entries(rest, true)?;
        return Ok((input, Node::Dict(dict)));
    }
    let mut tokens = Vec::new();
    let mut depth = 0usize;
    let mut input = input;
    loop {
        let (at, next) = next_token(input)?;
        let Some((token, rest)) = next else {
            break;
        };
        match token {
            Token::Punct(';' | '}') if depth == 0 => break,
            Token::Punct('(' | '[') => depth += 1,
            Token::Punct(c @ (')' | ']')) => {
                if depth == 0 {
                    return fail(at, format!("unbalanced '{}'", c));
                }
                depth -= 1;
            }
            _ => {}
        }
        tokens.push(token);
        input = rest;
        if depth == 0 {
            break;
        }
    }
    Ok((input, Node::Leaf(tokens)))
}

/// One entry, optional trailing `;`, nothing else.
fn single_entry(input: &str) -> PResult<'_, Entry> {
    let (input, entry) = entry(input)?;
    let (input, _) = many0(lexeme(char(';')))(input)?;
    let (at, next) = next_token(input)?;
    if let Some((token, _)) = next {
        return fail(
            at,
            format!("unexpected '{}' after entry '{}'", token, entry.keyword),
        );
    }
    Ok((at, entry))
}

fn insert_merging(dict: &mut Dict, entry: Entry) {
    if entry.keyword.is_directive() {
        dict.push(entry);
        return;
    }
    if let (Some(Node::Dict(existing)), Node::Dict(incoming)) =
        (dict.get_mut(entry.keyword.as_str()), &entry.node)
    {
        merge(existing, incoming);
        return;
    }
    dict.set(entry.keyword, entry.node);
}

/// Parse a sequence of entries, e.g. the text given to `--merge`.
#[instrument(level = "trace", skip(src), fields(len = src.len()))]
pub fn parse_dict_body(src: &str) -> DomainResult<Dict> {
    finish(src, entries(src, false))
}

/// Parse a complete dictionary file. The `FoamFile` header, if present, is an
/// ordinary root entry of the result.
pub fn parse_document(src: &str) -> DomainResult<Dict> {
    parse_dict_body(src)
}

/// Parse exactly one entry, e.g. `name uniform (0 0 0);`.
pub fn parse_entry(src: &str) -> DomainResult<Entry> {
    finish(src, single_entry(src))
}

/// A keyword created from user input must render back as the same plain
/// keyword: one word, no `/`, not a directive.
pub fn validate_keyword(key: &str) -> DomainResult<()> {
    if key.contains('/') {
        return Err(DomainError::invalid_key(key, "must be a single word without '/'"));
    }
    match all_consuming(word_or_number)(key) {
        Ok((_, Token::Word(w) | Token::Number(w))) if !w.starts_with('#') => Ok(()),
        _ => Err(DomainError::invalid_key(key, "must be a single word")),
    }
}
