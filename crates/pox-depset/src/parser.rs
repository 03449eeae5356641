//! DepSet string parsing

use indexmap::IndexMap;

use crate::condition::FlagMatch;
use crate::depset::DepSet;
use crate::element::Element;
use crate::error::{ElementCause, ParseError};
use crate::node::{BoolOp, Conditional, Group, Node};

/// Deepest group/conditional nesting accepted by default
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Options controlling how a DepSet string is parsed
#[derive(Debug, Clone, PartialEq)]
pub struct ParseOptions {
    operators: IndexMap<String, BoolOp>,
    allow_src_uri_file_renames: bool,
    transitive_use_atoms: bool,
    max_depth: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        let mut operators = IndexMap::new();
        operators.insert(String::new(), BoolOp::And);
        operators.insert("||".to_string(), BoolOp::Or);
        ParseOptions {
            operators,
            allow_src_uri_file_renames: false,
            transitive_use_atoms: false,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl ParseOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the operator map. The `""` key is the combinator used for a
    /// bare `(`.
    pub fn with_operators<I, S>(mut self, operators: I) -> Self
    where
        I: IntoIterator<Item = (S, BoolOp)>,
        S: Into<String>,
    {
        self.operators = operators.into_iter().map(|(k, v)| (k.into(), v)).collect();
        self
    }

    /// Add or replace a single operator token
    pub fn operator(mut self, token: impl Into<String>, op: BoolOp) -> Self {
        self.operators.insert(token.into(), op);
        self
    }

    /// Accept `uri -> filename` pairs
    pub fn allow_src_uri_file_renames(mut self, allow: bool) -> Self {
        self.allow_src_uri_file_renames = allow;
        self
    }

    /// Scan for transitive leaves when no explicit conditional was parsed
    pub fn transitive_use_atoms(mut self, enable: bool) -> Self {
        self.transitive_use_atoms = enable;
        self
    }

    /// Reject input nested deeper than `depth` groups and conditionals.
    /// Evaluation, rendering and dropping a tree all recurse per level.
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    pub fn operators(&self) -> &IndexMap<String, BoolOp> {
        &self.operators
    }

    pub fn allows_renames(&self) -> bool {
        self.allow_src_uri_file_renames
    }

    pub fn scans_transitive(&self) -> bool {
        self.transitive_use_atoms
    }

    pub fn depth_limit(&self) -> usize {
        self.max_depth
    }
}

/// What opened a pending frame
enum Tag {
    Operator(BoolOp),
    Conditional(FlagMatch),
}

struct Frame<T> {
    tag: Tag,
    children: Vec<Node<T>>,
}

/// Parse `dep_str` into a [`DepSet`], building leaves with `element_func`.
///
/// `element_func` receives the leaf token and, under the rename extension,
/// the target name that followed `->`.
pub(crate) fn parse_depset<T, F, E>(
    dep_str: &str,
    options: &ParseOptions,
    mut element_func: F,
) -> Result<DepSet<T>, ParseError>
where
    T: Element,
    F: FnMut(&str, Option<&str>) -> Result<T, E>,
    E: Into<ElementCause>,
{
    let depset = || dep_str.to_string();

    let mut root: Vec<Node<T>> = Vec::new();
    let mut frames: Vec<Frame<T>> = Vec::new();
    let mut has_conditionals = false;

    let mut words = dep_str.split_whitespace().peekable();

    while let Some(word) = words.next() {
        match word {
            ")" => {
                let frame = match frames.pop() {
                    Some(frame) if !frame.children.is_empty() => frame,
                    _ => return Err(ParseError::UnbalancedGroup { depset: depset() }),
                };

                let Frame { tag, mut children } = frame;
                let node = match tag {
                    Tag::Operator(_) if children.len() == 1 => children.pop(),
                    Tag::Operator(op) => Some(Node::Group(Group::new(op, children))),
                    Tag::Conditional(restriction) => {
                        has_conditionals = true;
                        Some(Node::Conditional(Conditional::from_parts(restriction, children)))
                    }
                };

                let parent = frames.last_mut().map_or(&mut root, |f| &mut f.children);
                parent.extend(node);
                log::trace!("Closed group, depth now {}", frames.len());
            }
            "(" => {
                check_depth(frames.len(), options, word, &depset)?;
                let op = options
                    .operators
                    .get("")
                    .copied()
                    .ok_or_else(|| ParseError::MissingOperator { depset: depset() })?;
                frames.push(Frame {
                    tag: Tag::Operator(op),
                    children: Vec::new(),
                });
            }
            _ => {
                let tag = if let Some(op) = options.operators.get(word) {
                    Some(Tag::Operator(*op))
                } else if word.contains('|') {
                    return Err(ParseError::IllegalToken {
                        depset: depset(),
                        token: word.to_string(),
                    });
                } else if word.ends_with('?') {
                    let restriction = FlagMatch::from_tag(word).ok_or_else(|| ParseError::IllegalToken {
                        depset: depset(),
                        token: word.to_string(),
                    })?;
                    Some(Tag::Conditional(restriction))
                } else {
                    None
                };

                if let Some(tag) = tag {
                    check_depth(frames.len(), options, word, &depset)?;
                    match words.next() {
                        Some("(") => frames.push(Frame {
                            tag,
                            children: Vec::new(),
                        }),
                        Some(_) => {
                            return Err(ParseError::ExpectedOpenParen {
                                depset: depset(),
                                token: word.to_string(),
                            })
                        }
                        None => {
                            return Err(ParseError::UnexpectedEnd {
                                depset: depset(),
                                token: word.to_string(),
                            })
                        }
                    }
                    continue;
                }

                let rename = if options.allow_src_uri_file_renames && words.peek() == Some(&"->") {
                    words.next();
                    let target = words.next().ok_or_else(|| ParseError::UnexpectedEnd {
                        depset: depset(),
                        token: word.to_string(),
                    })?;
                    Some(target)
                } else {
                    None
                };

                let element = element_func(word, rename).map_err(|e| ParseError::Element {
                    depset: depset(),
                    token: word.to_string(),
                    source: e.into(),
                })?;

                let parent = frames.last_mut().map_or(&mut root, |f| &mut f.children);
                parent.push(Node::Leaf(element));
            }
        }
    }

    if !frames.is_empty() {
        return Err(ParseError::UnclosedGroup { depset: depset() });
    }

    if options.transitive_use_atoms && !has_conditionals {
        has_conditionals = has_transitive_leaves(&root);
    }

    log::debug!(
        "Parsed depset with {} top-level nodes (conditionals: {})",
        root.len(),
        has_conditionals
    );

    Ok(DepSet::from_parts(root, has_conditionals))
}

fn check_depth(
    open: usize,
    options: &ParseOptions,
    token: &str,
    depset: &dyn Fn() -> String,
) -> Result<(), ParseError> {
    if open >= options.max_depth {
        return Err(ParseError::TooDeep {
            depset: depset(),
            token: token.to_string(),
            limit: options.max_depth,
        });
    }
    Ok(())
}

fn has_transitive_leaves<T: Element>(nodes: &[Node<T>]) -> bool {
    nodes.iter().any(|node| match node {
        Node::Leaf(leaf) => leaf.is_transitive(),
        _ => has_transitive_leaves(node.children()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atom::Atom;
    use crate::fetchable::Fetchable;

    fn parse(s: &str) -> Result<DepSet<String>, ParseError> {
        DepSet::parse(s)
    }

    fn leaf(s: &str) -> Node<String> {
        Node::Leaf(s.to_string())
    }

    #[test]
    fn test_single_leaf() {
        let d = parse("a/b").unwrap();
        assert_eq!(d.restrictions(), &[leaf("a/b")]);
        assert!(!d.has_conditionals());
    }

    #[test]
    fn test_empty_string() {
        let d = parse("").unwrap();
        assert!(d.is_empty());
        let d = parse("   \n\t ").unwrap();
        assert!(d.is_empty());
    }

    #[test]
    fn test_or_group() {
        let d = parse("|| ( a/b a/c )").unwrap();
        assert_eq!(
            d.restrictions(),
            &[Node::Group(Group::new(BoolOp::Or, vec![leaf("a/b"), leaf("a/c")]))]
        );
    }

    #[test]
    fn test_single_child_groups_collapse() {
        assert_eq!(parse("( a/b )").unwrap().restrictions(), &[leaf("a/b")]);
        assert_eq!(parse("|| ( a/b )").unwrap().restrictions(), &[leaf("a/b")]);
        assert_eq!(parse("( ( ( a/b ) ) )").unwrap().restrictions(), &[leaf("a/b")]);
    }

    #[test]
    fn test_and_group_is_kept() {
        let d = parse("( a b ) c").unwrap();
        assert_eq!(
            d.restrictions(),
            &[Node::Group(Group::new(BoolOp::And, vec![leaf("a"), leaf("b")])), leaf("c")]
        );
    }

    #[test]
    fn test_single_child_conditional_is_kept() {
        let d = parse("x? ( a )").unwrap();
        let expected = Conditional::from_parts(FlagMatch::new("x", false), vec![leaf("a")]);
        assert_eq!(d.restrictions(), &[Node::Conditional(expected)]);
        assert!(d.has_conditionals());
    }

    #[test]
    fn test_negated_conditional() {
        let d = parse("!x? ( a b )").unwrap();
        match &d.restrictions()[0] {
            Node::Conditional(c) => {
                assert_eq!(c.restriction(), &FlagMatch::new("x", true));
                assert_eq!(c.payload().len(), 2);
            }
            other => panic!("expected conditional, got {:?}", other),
        }
    }

    #[test]
    fn test_unbalanced_close() {
        assert!(matches!(parse("a/b )"), Err(ParseError::UnbalancedGroup { .. })));
        assert!(matches!(parse(")"), Err(ParseError::UnbalancedGroup { .. })));
        assert!(matches!(parse("( a ) )"), Err(ParseError::UnbalancedGroup { .. })));
    }

    #[test]
    fn test_empty_groups() {
        assert!(matches!(parse("( )"), Err(ParseError::UnbalancedGroup { .. })));
        assert!(matches!(parse("x? ( )"), Err(ParseError::UnbalancedGroup { .. })));
        assert!(matches!(parse("|| ( )"), Err(ParseError::UnbalancedGroup { .. })));
    }

    #[test]
    fn test_tag_without_paren() {
        let err = parse("x? a/b").unwrap_err();
        assert!(matches!(err, ParseError::ExpectedOpenParen { .. }));
        assert_eq!(err.token(), Some("x?"));
        assert_eq!(err.depset(), "x? a/b");

        assert!(matches!(parse("|| a"), Err(ParseError::ExpectedOpenParen { .. })));
    }

    #[test]
    fn test_tag_at_end() {
        assert!(matches!(parse("a x?"), Err(ParseError::UnexpectedEnd { .. })));
        assert!(matches!(parse("||"), Err(ParseError::UnexpectedEnd { .. })));
    }

    #[test]
    fn test_illegal_pipes() {
        for s in ["|", "a | b", "||| ( a )", "a|b", "| ( a )"] {
            assert!(
                matches!(parse(s), Err(ParseError::IllegalToken { .. })),
                "{} should be illegal",
                s
            );
        }
    }

    #[test]
    fn test_empty_flag_name() {
        assert!(matches!(parse("? ( a )"), Err(ParseError::IllegalToken { .. })));
        assert!(matches!(parse("!? ( a )"), Err(ParseError::IllegalToken { .. })));
    }

    #[test]
    fn test_unclosed() {
        assert!(matches!(parse("( a"), Err(ParseError::UnclosedGroup { .. })));
        assert!(matches!(parse("x? ( y? ( a )"), Err(ParseError::UnclosedGroup { .. })));
    }

    #[test]
    fn test_element_failure_is_wrapped() {
        let err = DepSet::<Atom>::parse("a/b notanatom").unwrap_err();
        match &err {
            ParseError::Element { token, .. } => assert_eq!(token, "notanatom"),
            other => panic!("unexpected error {:?}", other),
        }
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_custom_element_func() {
        let opts = ParseOptions::default();
        let d = DepSet::parse_with("a b", &opts, |token, _| {
            Ok::<_, std::io::Error>(token.to_uppercase())
        })
        .unwrap();
        assert_eq!(d.restrictions(), &[leaf("A"), leaf("B")]);
    }

    #[test]
    fn test_custom_operators() {
        let opts = ParseOptions::default()
            .operator("^^", BoolOp::ExactlyOneOf)
            .operator("??", BoolOp::AtMostOneOf);
        let d = DepSet::<String>::parse_with_options("^^ ( a b ) ?? ( c d )", &opts).unwrap();
        assert_eq!(
            d.restrictions(),
            &[
                Node::Group(Group::new(BoolOp::ExactlyOneOf, vec![leaf("a"), leaf("b")])),
                Node::Group(Group::new(BoolOp::AtMostOneOf, vec![leaf("c"), leaf("d")])),
            ]
        );
        assert!(!d.has_conditionals());
    }

    #[test]
    fn test_unmapped_operator_token_is_illegal() {
        let d = parse("?? ( a )");
        assert!(matches!(d, Err(ParseError::IllegalToken { .. })));
    }

    #[test]
    fn test_missing_and_operator() {
        let opts = ParseOptions::default().with_operators([("||", BoolOp::Or)]);
        let err = DepSet::<String>::parse_with_options("( a b )", &opts).unwrap_err();
        assert!(matches!(err, ParseError::MissingOperator { .. }));
        assert!(DepSet::<String>::parse_with_options("|| ( a b )", &opts).is_ok());
    }

    #[test]
    fn test_renames() {
        let opts = ParseOptions::default().allow_src_uri_file_renames(true);
        let d = DepSet::<Fetchable>::parse_with_options(
            "https://a/x.tgz -> y.tgz https://a/z.tgz",
            &opts,
        )
        .unwrap();
        assert_eq!(d.len(), 2);
        assert_eq!(d[0].as_leaf().unwrap().filename(), "y.tgz");
        assert_eq!(d[1].as_leaf().unwrap().filename(), "z.tgz");
    }

    #[test]
    fn test_rename_missing_target() {
        let opts = ParseOptions::default().allow_src_uri_file_renames(true);
        let err = DepSet::<Fetchable>::parse_with_options("https://a/x.tgz ->", &opts).unwrap_err();
        assert!(matches!(err, ParseError::UnexpectedEnd { .. }));
        assert_eq!(err.token(), Some("https://a/x.tgz"));
    }

    #[test]
    fn test_rename_target_cannot_be_a_paren() {
        let opts = ParseOptions::default().allow_src_uri_file_renames(true);
        let err = DepSet::<Fetchable>::parse_with_options("( http://a/b -> ) )", &opts).unwrap_err();
        assert!(matches!(err, ParseError::Element { .. }));
        assert_eq!(err.token(), Some("http://a/b"));
    }

    #[test]
    fn test_rename_arrow_rejected_without_extension() {
        let err = DepSet::<Fetchable>::parse("https://a/x.tgz -> y.tgz").unwrap_err();
        assert!(matches!(err, ParseError::Element { .. }));
        assert_eq!(err.token(), Some("->"));
    }

    fn nested(depth: usize) -> String {
        format!("{}a{}", "x? ( ".repeat(depth), " )".repeat(depth))
    }

    #[test]
    fn test_depth_limit() {
        let opts = ParseOptions::default().max_depth(2);
        assert!(DepSet::<String>::parse_with_options("x? ( || ( a b ) )", &opts).is_ok());

        let err = DepSet::<String>::parse_with_options("x? ( y? ( ( a b ) ) )", &opts).unwrap_err();
        match &err {
            ParseError::TooDeep { token, limit, .. } => {
                assert_eq!(token, "(");
                assert_eq!(*limit, 2);
            }
            other => panic!("unexpected error {:?}", other),
        }

        let err = DepSet::<String>::parse_with_options("x? ( y? ( z? ( a ) ) )", &opts).unwrap_err();
        assert_eq!(err.token(), Some("z?"));
    }

    #[test]
    fn test_deep_nesting_is_rejected_not_overflowed() {
        let err = parse(&nested(20_000)).unwrap_err();
        assert!(matches!(err, ParseError::TooDeep { limit: DEFAULT_MAX_DEPTH, .. }));
        assert_eq!(err.token(), Some("x?"));
    }

    #[test]
    fn test_nesting_at_default_limit_is_usable() {
        let d = parse(&nested(DEFAULT_MAX_DEPTH)).unwrap();
        assert_eq!(d.evaluate_depset(&["x"], None).to_string(), "a");
        assert!(d.evaluate_depset(&[] as &[&str], None).is_empty());
        assert_eq!(d.to_string(), nested(DEFAULT_MAX_DEPTH));
        assert!(parse(&nested(DEFAULT_MAX_DEPTH + 1)).is_err());
    }

    #[test]
    fn test_transitive_scan() {
        let plain = DepSet::<Atom>::parse("a/b[x?]").unwrap();
        assert!(!plain.has_conditionals());

        let opts = ParseOptions::default().transitive_use_atoms(true);
        let scanned = DepSet::<Atom>::parse_with_options("|| ( c/d a/b[x?] )", &opts).unwrap();
        assert!(scanned.has_conditionals());
        assert_eq!(scanned.to_string(), "|| ( c/d a/b[x?] )");
    }
}
