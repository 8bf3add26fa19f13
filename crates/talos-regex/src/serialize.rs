//! Serialization of syntax trees back to surface syntax.
//!
//! The printed form is canonical rather than original: operators always
//! parenthesize their operands, literal characters are always escaped, and
//! interval bounds are re-padded. Reparsing the output with all flags
//! enabled yields an expression for the same language, though not
//! necessarily the same tree.

use std::fmt;

use crate::ast::Node;

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Union(exp1, exp2) => write!(f, "({exp1}|{exp2})"),
            Node::Concat(exp1, exp2) => write!(f, "{exp1}{exp2}"),
            Node::Intersection(exp1, exp2) => write!(f, "({exp1}&{exp2})"),
            Node::Optional(exp) => write!(f, "({exp})?"),
            Node::Repeat(exp) => write!(f, "({exp})*"),
            Node::RepeatMin(exp, min) => write!(f, "({exp}){{{min},}}"),
            Node::RepeatMinMax(exp, min, max) => write!(f, "({exp}){{{min},{max}}}"),
            Node::Complement(exp) => write!(f, "~({exp})"),
            Node::Char(c) => write!(f, "\\{c}"),
            Node::CharRange(from, to) => write!(f, "[\\{from}-\\{to}]"),
            Node::AnyChar => f.write_str("."),
            Node::Empty => f.write_str("#"),
            // An interior quote would make the output unparseable; see the
            // module docs. Contents are emitted verbatim.
            Node::Str(s) => write!(f, "\"{s}\""),
            Node::AnyStr => f.write_str("@"),
            Node::Named(name) => write!(f, "<{name}>"),
            Node::Interval(min, max, digits) => {
                if *digits > 0 {
                    write!(f, "<{min:0width$}-{max:0width$}>", width = *digits)
                } else {
                    write!(f, "<{min}-{max}>")
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flags::SyntaxFlags;
    use crate::parser::Parser;
    use expect_test::expect;

    fn printed(source: &str) -> String {
        Parser::new(source, SyntaxFlags::ALL)
            .parse()
            .unwrap()
            .to_string()
    }

    #[test]
    fn union_parenthesizes_and_escapes() {
        expect![[r"(\a|\b)"]].assert_eq(&printed("a|b"));
    }

    #[test]
    fn literal_runs_print_as_quoted_strings() {
        expect![[r#""abc""#]].assert_eq(&printed("abc"));
    }

    #[test]
    fn operators_wrap_their_operands() {
        expect![[r"(\a)?"]].assert_eq(&printed("a?"));
        expect![[r"(\a)*"]].assert_eq(&printed("a*"));
        expect![[r"(\a){1,}"]].assert_eq(&printed("a+"));
        expect![[r"(\a){2,5}"]].assert_eq(&printed("a{2,5}"));
        expect![[r"~(\a)"]].assert_eq(&printed("~a"));
        expect![[r"(\a&\b)"]].assert_eq(&printed("a&b"));
    }

    #[test]
    fn leaves_print_their_markers() {
        expect!["."].assert_eq(&printed("."));
        expect!["#"].assert_eq(&printed("#"));
        expect!["@"].assert_eq(&printed("@"));
        expect!["<digits>"].assert_eq(&printed("<digits>"));
    }

    #[test]
    fn char_ranges_escape_both_endpoints() {
        expect![[r"[\a-\z]"]].assert_eq(&printed("[a-z]"));
    }

    #[test]
    fn negated_class_prints_its_desugaring() {
        expect![[r"(.&~((\a|\b)))"]].assert_eq(&printed("[^ab]"));
    }

    #[test]
    fn interval_bounds_are_repadded() {
        expect!["<5-12>"].assert_eq(&printed("<5-12>"));
        expect!["<05-12>"].assert_eq(&printed("<05-12>"));
        expect!["<005-012>"].assert_eq(&printed("<005-012>"));
        expect!["<05-42>"].assert_eq(&printed("<42-05>"));
    }

    #[test]
    fn printed_form_reparses() {
        for source in [
            "a|b",
            "ab*c",
            "[a-z]+",
            "~(ab)",
            "a&b?",
            "<5-12>",
            "<007-012>",
            "(a|b){2,4}",
            "\"lit\"",
        ] {
            let node = Parser::new(source, SyntaxFlags::ALL).parse().unwrap();
            let reparsed = Parser::new(&node.to_string(), SyntaxFlags::ALL)
                .parse()
                .unwrap_or_else(|e| panic!("{source}: {e}"));
            // The reparse of canonical output is already canonical.
            assert_eq!(node.to_string(), reparsed.to_string(), "on {source}");
        }
    }
}
