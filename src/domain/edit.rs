//! Mutation engine: set, merge, remove, rename, clear and default injection
//!
//! Every function takes the root dictionary and resolves its path afresh, so
//! no mutable borrow into the tree outlives a single call. Arguments are
//! parsed before the tree is touched: a parse error leaves it unchanged.

use itertools::Itertools;
use tracing::{debug, trace};

use crate::domain::error::{DomainError, DomainResult};
use crate::domain::node::{Dict, Keyword, Node, NodeRef};
use crate::domain::parser::{parse_dict_body, parse_entry, validate_keyword};
use crate::domain::path::{exists, resolve, sub_dict_create, sub_dict_mut, KeyPath, Resolution};

/// Placeholder keyword used to parse a bare value literal as an entry.
const VALUE_PLACEHOLDER: &str = "value";

/// Look up an existing node.
pub fn lookup<'a>(root: &'a Dict, path: &KeyPath) -> DomainResult<NodeRef<'a>> {
    match resolve(root, path) {
        Resolution::FoundLeaf(tokens) => Ok(NodeRef::Leaf(tokens)),
        Resolution::FoundDict(dict) => Ok(NodeRef::Dict(dict)),
        Resolution::NotFound { .. } => Err(DomainError::not_found(path.to_string())),
    }
}

/// Parse the right-hand side of an entry: `uniform (0 0 0)` or `{ a 1; }`.
pub fn parse_value(literal: &str) -> DomainResult<Node> {
    let entry = parse_entry(&format!("{} {}\n;", VALUE_PLACEHOLDER, literal))?;
    Ok(entry.node)
}

/// Insert or overwrite the entry at `path`, creating missing parent dictionaries.
/// An existing dictionary is replaced wholesale. Names that would not read back
/// as the same plain keyword are rejected before anything changes.
pub fn set(root: &mut Dict, path: &KeyPath, literal: &str) -> DomainResult<()> {
    let (parent, name) = path
        .split_last()
        .ok_or_else(|| DomainError::invalid_key(".", "cannot assign to the root dictionary"))?;
    validate_keyword(name)?;
    let node = parse_value(literal)?;
    debug!("set: path={} dict={}", path, node.is_dict());
    sub_dict_create(root, &parent)?.set(Keyword::Word(name.to_string()), node);
    Ok(())
}

/// Recursive union of `source` into `target`.
///
/// New keys are appended in source order, existing keys keep their position.
/// Two dictionaries merge recursively, any other pairing is overwritten by the
/// source. Directives are appended unless an identical one is already present.
pub fn merge(target: &mut Dict, source: &Dict) {
    for entry in source.iter() {
        if entry.keyword.is_directive() {
            if !target.entries().contains(entry) {
                target.push(entry.clone());
            }
            continue;
        }
        match (target.get_mut(entry.keyword.as_str()), &entry.node) {
            (Some(Node::Dict(existing)), Node::Dict(incoming)) => merge(existing, incoming),
            (Some(slot), incoming) => *slot = incoming.clone(),
            (None, _) => {
                trace!("merge: appending {}", entry.keyword);
                target.push(entry.clone());
            }
        }
    }
}

/// Merge dictionary text into the dictionary at `path`, creating it if needed.
pub fn merge_text(root: &mut Dict, path: &KeyPath, text: &str) -> DomainResult<()> {
    let source = parse_dict_body(text)?;
    debug!("merge_text: path={} entries={}", path, source.len());
    merge(sub_dict_create(root, path)?, &source);
    Ok(())
}

/// Merge the existing dictionary at `src` into the dictionary at `dst`.
pub fn merge_sub(root: &mut Dict, dst: &KeyPath, src: &KeyPath) -> DomainResult<()> {
    let source = match resolve(root, src) {
        Resolution::FoundDict(dict) => dict.clone(),
        Resolution::FoundLeaf(_) => return Err(DomainError::not_a_dict(src.to_string())),
        Resolution::NotFound { .. } => return Err(DomainError::not_found(src.to_string())),
    };
    debug!("merge_sub: {} -> {}", src, dst);
    merge(sub_dict_create(root, dst)?, &source);
    Ok(())
}

/// Remove the entry at `path`. Returns false, leaving the tree untouched, when
/// the path does not exist.
pub fn remove(root: &mut Dict, path: &KeyPath) -> DomainResult<bool> {
    let Some((parent, name)) = path.split_last() else {
        return Err(DomainError::invalid_key(".", "cannot remove the root dictionary"));
    };
    if !exists(root, path) {
        debug!("remove: {} not found, nothing to do", path);
        return Ok(false);
    }
    Ok(sub_dict_mut(root, &parent)?.remove(name).is_some())
}

/// Change the keyword of the entry at `path`, keeping its value and position.
pub fn rename(root: &mut Dict, path: &KeyPath, new_key: &str) -> DomainResult<()> {
    validate_keyword(new_key)?;
    let Some((parent, name)) = path.split_last() else {
        return Err(DomainError::invalid_key(".", "cannot rename the root dictionary"));
    };
    if !exists(root, path) {
        return Err(DomainError::not_found(path.to_string()));
    }
    if name == new_key {
        return Ok(());
    }
    let dict = sub_dict_mut(root, &parent)?;
    if dict.contains(new_key) {
        let sibling = parent
            .components()
            .iter()
            .map(String::as_str)
            .chain(std::iter::once(new_key))
            .join("/");
        return Err(DomainError::KeyExists { key: sibling });
    }
    dict.rename(name, Keyword::Word(new_key.to_string()));
    Ok(())
}

/// Empty the dictionary at `path`. On the root, `preserve_header` keeps the
/// `FoamFile` entry.
pub fn clear(root: &mut Dict, path: &KeyPath, preserve_header: bool) -> DomainResult<()> {
    if path.is_root() {
        if preserve_header {
            root.retain(|e| e.is_header());
        } else {
            root.clear();
        }
        return Ok(());
    }
    match resolve(root, path) {
        Resolution::NotFound { .. } => return Err(DomainError::not_found(path.to_string())),
        Resolution::FoundLeaf(_) => return Err(DomainError::not_a_dict(path.to_string())),
        Resolution::FoundDict(_) => {}
    }
    sub_dict_mut(root, path)?.clear();
    Ok(())
}

/// Create `path` with `literal` when it does not exist yet, together with the
/// missing parent dictionaries. Returns whether the tree changed.
///
/// The literal must be exactly one entry value and every created name a plain
/// keyword; otherwise the tree is left untouched.
pub fn add_default(root: &mut Dict, path: &KeyPath, literal: &str) -> DomainResult<bool> {
    if exists(root, path) {
        return Ok(false);
    }
    let Some((parent, name)) = path.split_last() else {
        return Ok(false);
    };
    validate_keyword(name)?;
    let node = parse_value(literal)?;
    trace!("add_default: path={} dict={}", path, node.is_dict());
    sub_dict_create(root, &parent)?.set(Keyword::Word(name.to_string()), node);
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::node::Token;
    use rstest::rstest;

    fn doc(src: &str) -> Dict {
        parse_dict_body(src).expect("parse test document")
    }

    fn path(key: &str) -> KeyPath {
        KeyPath::parse(key)
    }

    fn leaf_of(root: &Dict, key: &str) -> Vec<Token> {
        match lookup(root, &path(key)).expect("lookup") {
            NodeRef::Leaf(tokens) => tokens.to_vec(),
            NodeRef::Dict(_) => panic!("{} is a dictionary", key),
        }
    }

    fn keys(dict: &Dict) -> Vec<String> {
        dict.iter().map(|e| e.keyword.to_string()).collect()
    }

    #[test]
    fn given_sample_document_when_editing_then_follows_scenario() {
        let mut root = doc("a { b 1; } c 2;");

        assert_eq!(leaf_of(&root, "a/b"), vec![Token::Number("1".into())]);

        set(&mut root, &path("a/b"), "2").unwrap();
        assert_eq!(leaf_of(&root, "a/b"), vec![Token::Number("2".into())]);

        assert!(remove(&mut root, &path("c")).unwrap());
        assert!(!exists(&root, &path("c")));

        clear(&mut root, &path("a"), true).unwrap();
        assert_eq!(
            lookup(&root, &path("a/b")).unwrap_err(),
            DomainError::not_found("a/b")
        );
    }

    #[test]
    fn given_entry_when_renaming_then_keeps_value_and_position() {
        let mut root = doc("a 1; c 2; d 3;");
        rename(&mut root, &path("c"), "cc").unwrap();

        assert!(exists(&root, &path("cc")));
        assert!(!exists(&root, &path("c")));
        assert_eq!(keys(&root), vec!["a", "cc", "d"]);
        assert_eq!(leaf_of(&root, "cc"), vec![Token::Number("2".into())]);
    }

    #[rstest]
    #[case("x/y")]
    #[case("two words")]
    #[case("")]
    #[case("#include")]
    #[case("a;b")]
    fn given_bad_new_key_when_renaming_then_invalid_key(#[case] new_key: &str) {
        let mut root = doc("a 1;");
        assert!(matches!(
            rename(&mut root, &path("a"), new_key),
            Err(DomainError::InvalidKey { .. })
        ));
    }

    #[test]
    fn given_existing_sibling_when_renaming_then_key_exists() {
        let mut root = doc("s { a 1; b 2; }");
        assert_eq!(
            rename(&mut root, &path("s/a"), "b").unwrap_err(),
            DomainError::KeyExists { key: "s/b".into() }
        );
    }

    #[test]
    fn given_missing_entry_when_renaming_then_not_found() {
        let mut root = doc("a 1;");
        assert_eq!(
            rename(&mut root, &path("b"), "c").unwrap_err(),
            DomainError::not_found("b")
        );
    }

    #[test]
    fn given_missing_parents_when_setting_then_creates_them() {
        let mut root = doc("a 1;");
        set(&mut root, &path("x/y/z"), "uniform (0 0 0)").unwrap();

        assert_eq!(keys(&root), vec!["a", "x"]);
        assert_eq!(
            leaf_of(&root, "x/y/z"),
            vec![
                Token::word("uniform"),
                Token::Punct('('),
                Token::Number("0".into()),
                Token::Number("0".into()),
                Token::Number("0".into()),
                Token::Punct(')'),
            ]
        );
    }

    #[test]
    fn given_dict_literal_when_setting_then_replaces_wholesale() {
        let mut root = doc("s { a 1; b 2; }");
        set(&mut root, &path("s"), "{ c 3; }").unwrap();

        let s = root.get("s").and_then(Node::as_dict).unwrap();
        assert_eq!(keys(s), vec!["c"]);
    }

    #[test]
    fn given_leaf_parent_when_setting_then_type_mismatch_and_unchanged() {
        let mut root = doc("a 1;");
        let before = root.clone();
        assert_eq!(
            set(&mut root, &path("a/b"), "2").unwrap_err(),
            DomainError::not_a_dict("a")
        );
        assert_eq!(root, before);
    }

    #[test]
    fn given_malformed_literal_when_setting_then_parse_error_and_unchanged() {
        let mut root = doc("a 1;");
        let before = root.clone();
        assert!(matches!(
            set(&mut root, &path("n/m"), "(1 2"),
            Err(DomainError::Parse { .. })
        ));
        assert_eq!(root, before);
    }

    #[test]
    fn given_root_path_when_setting_then_invalid_key() {
        let mut root = doc("a 1;");
        assert!(matches!(
            set(&mut root, &KeyPath::root(), "1"),
            Err(DomainError::InvalidKey { .. })
        ));
    }

    #[test]
    fn given_overlapping_dicts_when_merging_then_unions_in_order() {
        let mut target = doc("a { x 1; y 2; } b 1; c { k 1; }");
        let source = doc("d 4; a { y 20; z 30; } c 5; b { n 1; }");

        merge(&mut target, &source);

        assert_eq!(keys(&target), vec!["a", "b", "c", "d"]);
        let a = target.get("a").and_then(Node::as_dict).unwrap();
        assert_eq!(keys(a), vec!["x", "y", "z"]);
        assert_eq!(leaf_of(&target, "a/y"), vec![Token::Number("20".into())]);
        assert!(target.get("b").map(Node::is_dict).unwrap_or(false));
        assert_eq!(leaf_of(&target, "c"), vec![Token::Number("5".into())]);
    }

    #[test]
    fn given_same_source_when_merging_twice_then_idempotent() {
        let mut once = doc("a { x 1; } #include \"base\"");
        let source = doc("a { y 2; } b 3; #include \"extra\"");
        merge(&mut once, &source);

        let mut twice = once.clone();
        merge(&mut twice, &source);
        assert_eq!(once, twice);

        let mut self_merged = source.clone();
        merge(&mut self_merged, &source);
        merge(&mut self_merged, &source);
        assert_eq!(self_merged, source);
    }

    #[test]
    fn given_sub_dict_when_merge_sub_then_copies_into_destination() {
        let mut root = doc("defaults { type zeroGradient; value 0; } inlet { type fixedValue; }");
        merge_sub(&mut root, &path("inlet"), &path("defaults")).unwrap();

        assert_eq!(leaf_of(&root, "inlet/type"), vec![Token::word("zeroGradient")]);
        assert_eq!(leaf_of(&root, "inlet/value"), vec![Token::Number("0".into())]);
        assert!(exists(&root, &path("defaults/type")));
    }

    #[test]
    fn given_missing_destination_when_merge_sub_then_creates_it() {
        let mut root = doc("src { a 1; }");
        merge_sub(&mut root, &path("x/y"), &path("src")).unwrap();
        assert_eq!(leaf_of(&root, "x/y/a"), vec![Token::Number("1".into())]);
    }

    #[test]
    fn given_bad_source_when_merge_sub_then_fails() {
        let mut root = doc("src 1;");
        assert_eq!(
            merge_sub(&mut root, &KeyPath::root(), &path("src")).unwrap_err(),
            DomainError::not_a_dict("src")
        );
        assert_eq!(
            merge_sub(&mut root, &KeyPath::root(), &path("nope")).unwrap_err(),
            DomainError::not_found("nope")
        );
    }

    #[test]
    fn given_text_when_merge_text_at_key_then_merges_there() {
        let mut root = doc("s { a 1; }");
        merge_text(&mut root, &path("s"), "b 2; a 3;").unwrap();
        assert_eq!(leaf_of(&root, "s/a"), vec![Token::Number("3".into())]);
        assert_eq!(leaf_of(&root, "s/b"), vec![Token::Number("2".into())]);
    }

    #[rstest]
    #[case("nope")]
    #[case("a/nope")]
    #[case("c/deeper")]
    fn given_missing_path_when_removing_then_noop(#[case] key: &str) {
        let mut root = doc("a { b 1; } c 2;");
        let before = root.clone();
        assert!(!remove(&mut root, &path(key)).unwrap());
        assert_eq!(root, before);
    }

    #[test]
    fn given_header_when_clearing_root_then_policy_decides() {
        let src = "FoamFile { version 2.0; } a 1; b { c 2; }";

        let mut kept = doc(src);
        clear(&mut kept, &KeyPath::root(), true).unwrap();
        assert_eq!(keys(&kept), vec!["FoamFile"]);

        let mut dropped = doc(src);
        clear(&mut dropped, &KeyPath::root(), false).unwrap();
        assert!(dropped.is_empty());
    }

    #[test]
    fn given_leaf_when_clearing_then_type_mismatch() {
        let mut root = doc("a 1;");
        assert_eq!(
            clear(&mut root, &path("a"), true).unwrap_err(),
            DomainError::not_a_dict("a")
        );
        assert_eq!(
            clear(&mut root, &path("b"), true).unwrap_err(),
            DomainError::not_found("b")
        );
    }

    #[test]
    fn given_missing_path_when_add_default_then_creates_path() {
        let mut root = doc("a { x 1; }");
        assert!(add_default(&mut root, &path("a/b/c"), "bar").unwrap());

        assert_eq!(leaf_of(&root, "a/b/c"), vec![Token::word("bar")]);
        assert_eq!(leaf_of(&root, "a/x"), vec![Token::Number("1".into())]);
    }

    #[test]
    fn given_leaf_on_path_when_add_default_then_type_mismatch() {
        let mut root = doc("a 1;");
        assert_eq!(
            add_default(&mut root, &path("a/b"), "bar").unwrap_err(),
            DomainError::not_a_dict("a")
        );
    }

    #[rstest]
    #[case("a/b", "1; evil 2")]
    #[case("a/b", "(1 2")]
    #[case("a/b;c", "1")]
    #[case("a/n;m/c", "1")]
    #[case("a/#x", "1")]
    fn given_literal_or_name_that_is_not_one_entry_when_add_default_then_rejected_and_unchanged(
        #[case] key: &str,
        #[case] literal: &str,
    ) {
        let mut root = doc("a { x 1; }");
        let before = root.clone();

        assert!(matches!(
            add_default(&mut root, &path(key), literal),
            Err(DomainError::Parse { .. } | DomainError::InvalidKey { .. })
        ));
        assert_eq!(root, before);
        assert!(!exists(&root, &path("a/evil")));
    }

    #[test]
    fn given_dict_literal_when_add_default_then_inserts_dictionary() {
        let mut root = doc("a { x 1; }");
        assert!(add_default(&mut root, &path("a/b"), "{ c 2; }").unwrap());
        assert_eq!(leaf_of(&root, "a/b/c"), vec![Token::Number("2".into())]);
        assert_eq!(keys(root.get("a").and_then(Node::as_dict).unwrap()), vec!["x", "b"]);
    }

    #[rstest]
    #[case("x y")]
    #[case("#x")]
    #[case("n;m/k")]
    #[case("\"(U|k)\"")]
    fn given_name_that_reparses_differently_when_setting_then_invalid_key_and_unchanged(
        #[case] key: &str,
    ) {
        let mut root = doc("a 1;");
        let before = root.clone();

        assert!(matches!(
            set(&mut root, &path(key), "2"),
            Err(DomainError::InvalidKey { .. })
        ));
        assert_eq!(root, before);
    }

    #[test]
    fn given_set_and_merge_when_rendered_then_reparses_to_same_tree() {
        let mut root = doc("FoamFile { object testDict; } s { a 1; }");
        set(&mut root, &path("s/div(phi,U)"), "Gauss linear").unwrap();
        set(&mut root, &path("x/y"), "uniform (0 0 1)").unwrap();
        merge_text(&mut root, &path("m/n"), "\"(U|k)\" { solver PBiCG; } #include \"base\"").unwrap();

        let text = crate::domain::Renderer::default().render_document(&root);
        assert_eq!(parse_dict_body(&text).unwrap(), root);
    }

    #[test]
    fn given_existing_path_when_add_default_then_unchanged() {
        let mut root = doc("a 1;");
        let before = root.clone();
        assert!(!add_default(&mut root, &path("a"), "bar").unwrap());
        assert_eq!(root, before);
    }
}
