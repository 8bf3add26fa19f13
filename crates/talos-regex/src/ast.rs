//! The abstract syntax tree for extended regular expressions.
//!
//! Nodes are built through the constructor functions on [`Node`], which
//! apply local normalization (adjacent literal runs fuse into a single
//! [`Node::Str`]) so that trees stay shallow and the printed form stays
//! canonical.

use indexmap::IndexSet;

use crate::error::Error;

/// One node of a parsed expression.
///
/// Children are boxed; a tree is built bottom-up during parsing and is
/// immutable afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Node {
    /// `L|R`
    Union(Box<Node>, Box<Node>),
    /// `LR`
    Concat(Box<Node>, Box<Node>),
    /// `L&R`
    Intersection(Box<Node>, Box<Node>),
    /// `E?`
    Optional(Box<Node>),
    /// `E*`
    Repeat(Box<Node>),
    /// `E{min,}`
    RepeatMin(Box<Node>, u32),
    /// `E{min,max}`
    RepeatMinMax(Box<Node>, u32, u32),
    /// `~E`
    Complement(Box<Node>),
    /// A literal code point.
    Char(char),
    /// An inclusive code point range `[from-to]`.
    CharRange(char, char),
    /// `.`
    AnyChar,
    /// `#`, the empty language.
    Empty,
    /// A literal string.
    Str(String),
    /// `@`, the language of all strings.
    AnyStr,
    /// `<identifier>`, an externally supplied automaton.
    Named(String),
    /// `<min-max>`, decimal strings valued in `min..=max`, zero-padded to
    /// the given width when it is nonzero.
    Interval(u32, u32, usize),
}

fn is_literal(node: &Node) -> bool {
    matches!(node, Node::Char(_) | Node::Str(_))
}

fn merge_literals(left: Node, right: Node) -> Node {
    let mut text = match left {
        Node::Char(c) => c.to_string(),
        Node::Str(s) => s,
        _ => unreachable!("merge_literals called on a non-literal"),
    };
    match right {
        Node::Char(c) => text.push(c),
        Node::Str(s) => text.push_str(&s),
        _ => unreachable!("merge_literals called on a non-literal"),
    }
    Node::Str(text)
}

impl Node {
    /// `exp1|exp2`
    pub fn union(exp1: Node, exp2: Node) -> Node {
        Node::Union(Box::new(exp1), Box::new(exp2))
    }

    /// `exp1exp2`, fusing adjacent literal runs.
    ///
    /// Two literal operands collapse into one [`Node::Str`]; a literal that
    /// meets the literal edge of an existing concatenation is folded into
    /// that edge. This keeps `abc` a single string rather than a chain of
    /// characters.
    pub fn concat(exp1: Node, exp2: Node) -> Node {
        match (exp1, exp2) {
            (exp1, exp2) if is_literal(&exp1) && is_literal(&exp2) => merge_literals(exp1, exp2),
            (Node::Concat(left, right), exp2) if is_literal(&right) && is_literal(&exp2) => {
                Node::Concat(left, Box::new(merge_literals(*right, exp2)))
            }
            (exp1, Node::Concat(left, right)) if is_literal(&exp1) && is_literal(&left) => {
                Node::Concat(Box::new(merge_literals(exp1, *left)), right)
            }
            (exp1, exp2) => Node::Concat(Box::new(exp1), Box::new(exp2)),
        }
    }

    /// `exp1&exp2`
    pub fn intersection(exp1: Node, exp2: Node) -> Node {
        Node::Intersection(Box::new(exp1), Box::new(exp2))
    }

    /// `exp?`
    pub fn optional(exp: Node) -> Node {
        Node::Optional(Box::new(exp))
    }

    /// `exp*`
    pub fn repeat(exp: Node) -> Node {
        Node::Repeat(Box::new(exp))
    }

    /// `exp{min,}`
    pub fn repeat_min(exp: Node, min: u32) -> Node {
        Node::RepeatMin(Box::new(exp), min)
    }

    /// `exp{min,max}`
    pub fn repeat_range(exp: Node, min: u32, max: u32) -> Node {
        Node::RepeatMinMax(Box::new(exp), min, max)
    }

    /// `~exp`
    pub fn complement(exp: Node) -> Node {
        Node::Complement(Box::new(exp))
    }

    /// A literal code point.
    pub fn char(c: char) -> Node {
        Node::Char(c)
    }

    /// An inclusive code point range; fails when `from > to`.
    pub fn char_range(from: char, to: char) -> Result<Node, Error> {
        if from > to {
            return Err(Error::InvalidRange { from, to });
        }
        Ok(Node::CharRange(from, to))
    }

    /// `.`
    pub fn any_char() -> Node {
        Node::AnyChar
    }

    /// `#`
    pub fn empty() -> Node {
        Node::Empty
    }

    /// A literal string.
    pub fn string(s: impl Into<String>) -> Node {
        Node::Str(s.into())
    }

    /// `@`
    pub fn any_string() -> Node {
        Node::AnyStr
    }

    /// `<name>`
    pub fn named(name: impl Into<String>) -> Node {
        Node::Named(name.into())
    }

    /// `<min-max>`; the caller has already ordered the bounds and chosen the
    /// padding width.
    pub fn interval(min: u32, max: u32, digits: usize) -> Node {
        Node::Interval(min, max, digits)
    }

    /// Adds every named-automaton identifier occurring in this subtree to
    /// `into`.
    pub fn collect_identifiers(&self, into: &mut IndexSet<String>) {
        match self {
            Node::Union(exp1, exp2)
            | Node::Concat(exp1, exp2)
            | Node::Intersection(exp1, exp2) => {
                exp1.collect_identifiers(into);
                exp2.collect_identifiers(into);
            }
            Node::Optional(exp)
            | Node::Repeat(exp)
            | Node::RepeatMin(exp, _)
            | Node::RepeatMinMax(exp, _, _)
            | Node::Complement(exp) => exp.collect_identifiers(into),
            Node::Named(name) => {
                into.insert(name.clone());
            }
            Node::Char(_)
            | Node::CharRange(_, _)
            | Node::AnyChar
            | Node::Empty
            | Node::Str(_)
            | Node::AnyStr
            | Node::Interval(_, _, _) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn concat_fuses_adjacent_chars() {
        let node = Node::concat(Node::char('a'), Node::char('b'));
        assert_eq!(node, Node::string("ab"));
    }

    #[test]
    fn concat_fuses_adjacent_strings() {
        let node = Node::concat(Node::string("ab"), Node::string("cd"));
        assert_eq!(node, Node::string("abcd"));
    }

    #[test]
    fn concat_fuses_into_the_right_edge() {
        let node = Node::concat(
            Node::concat(Node::any_char(), Node::string("a")),
            Node::string("b"),
        );
        assert_eq!(
            node,
            Node::Concat(Box::new(Node::AnyChar), Box::new(Node::string("ab"))),
        );
    }

    #[test]
    fn concat_fuses_into_the_left_edge() {
        let node = Node::concat(
            Node::string("a"),
            Node::Concat(Box::new(Node::string("b")), Box::new(Node::AnyChar)),
        );
        assert_eq!(
            node,
            Node::Concat(Box::new(Node::string("ab")), Box::new(Node::AnyChar)),
        );
    }

    #[test]
    fn concat_leaves_non_literals_alone() {
        let node = Node::concat(Node::any_char(), Node::char('a'));
        assert_eq!(
            node,
            Node::Concat(Box::new(Node::AnyChar), Box::new(Node::Char('a'))),
        );
    }

    #[test]
    fn char_range_rejects_reversed_endpoints() {
        let err = Node::char_range('b', 'a').unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid range: from (b) cannot be > to (a)",
        );
        assert!(Node::char_range('a', 'a').is_ok());
    }

    #[test]
    fn collect_identifiers_finds_every_reference() {
        let node = Node::union(
            Node::concat(Node::named("digits"), Node::named("letters")),
            Node::complement(Node::named("digits")),
        );
        let mut names = IndexSet::new();
        node.collect_identifiers(&mut names);
        let names: Vec<&str> = names.iter().map(String::as_str).collect();
        assert_eq!(names, ["digits", "letters"]);
    }
}
