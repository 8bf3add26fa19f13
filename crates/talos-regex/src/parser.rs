//! Recursive-descent parser for the extended regular-expression syntax.
//!
//! One function per precedence level, lowest binding first: union,
//! intersection, concatenation, repetition, complement, character class,
//! simple expression, character. The cursor is a byte offset into the
//! source; it advances by whole code points.

use crate::ast::Node;
use crate::error::Error;
use crate::flags::SyntaxFlags;

/// Metacharacters that must be escaped (or quoted) to stand for themselves.
///
/// The set is independent of the syntax flags: a cleared flag downgrades its
/// marker from operator to error, never to literal, so an expression that
/// parses under restrictive flags means the same thing under permissive
/// ones.
const RESERVED: &str = "|&?*+{}()[]^-.#@\"<>~\\";

pub(crate) struct Parser<'a> {
    source: &'a str,
    flags: SyntaxFlags,
    pos: usize,
}

impl<'a> Parser<'a> {
    pub(crate) fn new(source: &'a str, flags: SyntaxFlags) -> Parser<'a> {
        Parser {
            source,
            flags,
            pos: 0,
        }
    }

    /// Parses the whole source; the empty string parses as `Str("")`.
    pub(crate) fn parse(mut self) -> Result<Node, Error> {
        if self.source.is_empty() {
            return Ok(Node::string(""));
        }
        let node = self.parse_union_exp()?;
        if self.more() {
            return Err(Error::ExpectedEndOfString { position: self.pos });
        }
        Ok(node)
    }

    fn more(&self) -> bool {
        self.pos < self.source.len()
    }

    fn peek_char(&self) -> Option<char> {
        self.source[self.pos..].chars().next()
    }

    fn peek(&self, set: &str) -> bool {
        self.peek_char().is_some_and(|c| set.contains(c))
    }

    fn next_char(&mut self) -> Result<char, Error> {
        let c = self.peek_char().ok_or(Error::UnexpectedEndOfString)?;
        self.pos += c.len_utf8();
        Ok(c)
    }

    fn match_char(&mut self, expected: char) -> bool {
        if self.peek_char() == Some(expected) {
            self.pos += expected.len_utf8();
            true
        } else {
            false
        }
    }

    fn check(&self, flag: SyntaxFlags) -> bool {
        self.flags.check(flag)
    }

    fn parse_union_exp(&mut self) -> Result<Node, Error> {
        let first = self.parse_inter_exp()?;
        let mut rest = Vec::new();
        while self.match_char('|') {
            rest.push(self.parse_inter_exp()?);
        }
        Ok(fold_right(first, rest, Node::union))
    }

    fn parse_inter_exp(&mut self) -> Result<Node, Error> {
        let first = self.parse_concat_exp()?;
        if !self.check(SyntaxFlags::INTERSECTION) {
            return Ok(first);
        }
        let mut rest = Vec::new();
        while self.match_char('&') {
            rest.push(self.parse_concat_exp()?);
        }
        Ok(fold_right(first, rest, Node::intersection))
    }

    fn parse_concat_exp(&mut self) -> Result<Node, Error> {
        let first = self.parse_repeat_exp()?;
        let mut rest = Vec::new();
        while self.continues_concat() {
            rest.push(self.parse_repeat_exp()?);
        }
        Ok(fold_right(first, rest, Node::concat))
    }

    /// Another concatenation term follows unless the input is exhausted, the
    /// enclosing group or union continues, or an intersection begins.
    fn continues_concat(&self) -> bool {
        self.more()
            && !self.peek(")|")
            && !(self.check(SyntaxFlags::INTERSECTION) && self.peek("&"))
    }

    fn parse_repeat_exp(&mut self) -> Result<Node, Error> {
        let mut exp = self.parse_compl_exp()?;
        while self.peek("?*+{") {
            if self.match_char('?') {
                exp = Node::optional(exp);
            } else if self.match_char('*') {
                exp = Node::repeat(exp);
            } else if self.match_char('+') {
                exp = Node::repeat_min(exp, 1);
            } else if self.match_char('{') {
                let min = self.parse_integer()?;
                let max = if self.match_char(',') {
                    if self.peek("0123456789") {
                        Some(self.parse_integer()?)
                    } else {
                        None
                    }
                } else {
                    Some(min)
                };
                if !self.match_char('}') {
                    return Err(Error::Expected {
                        expected: '}',
                        position: self.pos,
                    });
                }
                exp = match max {
                    Some(max) => Node::repeat_range(exp, min, max),
                    None => Node::repeat_min(exp, min),
                };
            }
        }
        Ok(exp)
    }

    fn parse_integer(&mut self) -> Result<u32, Error> {
        let start = self.pos;
        while self.peek("0123456789") {
            self.next_char()?;
        }
        if start == self.pos {
            return Err(Error::ExpectedInteger { position: self.pos });
        }
        // Overflow of the 32-bit bound is reported like a missing integer.
        self.source[start..self.pos]
            .parse()
            .map_err(|_| Error::ExpectedInteger { position: start })
    }

    fn parse_compl_exp(&mut self) -> Result<Node, Error> {
        if self.check(SyntaxFlags::COMPLEMENT) && self.match_char('~') {
            Ok(Node::complement(self.parse_compl_exp()?))
        } else {
            self.parse_char_class_exp()
        }
    }

    fn parse_char_class_exp(&mut self) -> Result<Node, Error> {
        if self.match_char('[') {
            let negate = self.match_char('^');
            let mut exp = self.parse_char_class()?;
            while self.more() && !self.peek("]") {
                exp = Node::union(exp, self.parse_char_class()?);
            }
            if negate {
                exp = Node::intersection(Node::any_char(), Node::complement(exp));
            }
            if !self.match_char(']') {
                return Err(Error::Expected {
                    expected: ']',
                    position: self.pos,
                });
            }
            Ok(exp)
        } else {
            self.parse_simple_exp()
        }
    }

    fn parse_char_class(&mut self) -> Result<Node, Error> {
        let first = self.parse_char_exp()?;
        if self.match_char('-') {
            Node::char_range(first, self.parse_char_exp()?)
        } else {
            Ok(Node::char(first))
        }
    }

    fn parse_simple_exp(&mut self) -> Result<Node, Error> {
        if self.match_char('.') {
            Ok(Node::any_char())
        } else if self.check(SyntaxFlags::EMPTY) && self.match_char('#') {
            Ok(Node::empty())
        } else if self.check(SyntaxFlags::ANYSTRING) && self.match_char('@') {
            Ok(Node::any_string())
        } else if self.match_char('"') {
            let start = self.pos;
            while self.more() && !self.peek("\"") {
                self.next_char()?;
            }
            if !self.match_char('"') {
                return Err(Error::Expected {
                    expected: '"',
                    position: self.pos,
                });
            }
            Ok(Node::string(&self.source[start..self.pos - 1]))
        } else if self.match_char('(') {
            if self.match_char(')') {
                return Ok(Node::string(""));
            }
            let exp = self.parse_union_exp()?;
            if !self.match_char(')') {
                return Err(Error::Expected {
                    expected: ')',
                    position: self.pos,
                });
            }
            Ok(exp)
        } else if (self.check(SyntaxFlags::AUTOMATON) || self.check(SyntaxFlags::INTERVAL))
            && self.match_char('<')
        {
            self.parse_named_or_interval()
        } else {
            Ok(Node::char(self.parse_char_exp()?))
        }
    }

    /// Parses the contents of a `<...>` group, already past the `<`.
    ///
    /// Exactly one interior `-` makes it a numeric interval; none makes it a
    /// named-automaton reference. Reversed interval bounds are swapped, and
    /// the padding width is the bounds' shared length, or zero when their
    /// lengths differ.
    fn parse_named_or_interval(&mut self) -> Result<Node, Error> {
        let start = self.pos;
        while self.more() && !self.peek(">") {
            self.next_char()?;
        }
        if !self.match_char('>') {
            return Err(Error::Expected {
                expected: '>',
                position: self.pos,
            });
        }
        let position = self.pos - 1;
        let text = &self.source[start..position];
        match text.find('-') {
            None => {
                if !self.check(SyntaxFlags::AUTOMATON) {
                    return Err(Error::IntervalSyntax { position });
                }
                Ok(Node::named(text))
            }
            Some(i) => {
                if !self.check(SyntaxFlags::INTERVAL) {
                    return Err(Error::IllegalIdentifier { position });
                }
                if i == 0 || i == text.len() - 1 || text[i + 1..].contains('-') {
                    return Err(Error::IntervalSyntax { position });
                }
                let (smin, smax) = (&text[..i], &text[i + 1..]);
                if !is_decimal(smin) || !is_decimal(smax) {
                    return Err(Error::IntervalSyntax { position });
                }
                let imin: u32 = smin.parse().map_err(|_| Error::IntervalSyntax { position })?;
                let imax: u32 = smax.parse().map_err(|_| Error::IntervalSyntax { position })?;
                let digits = if smin.len() == smax.len() { smin.len() } else { 0 };
                let (imin, imax) = if imin > imax { (imax, imin) } else { (imin, imax) };
                Ok(Node::interval(imin, imax, digits))
            }
        }
    }

    /// Parses a single literal code point: either `\` followed by any code
    /// point, or an unreserved code point standing for itself.
    fn parse_char_exp(&mut self) -> Result<char, Error> {
        if self.match_char('\\') {
            return self.next_char();
        }
        let position = self.pos;
        let c = self.next_char()?;
        if RESERVED.contains(c) {
            return Err(Error::Reserved { ch: c, position });
        }
        Ok(c)
    }
}

fn fold_right(first: Node, mut rest: Vec<Node>, join: impl Fn(Node, Node) -> Node) -> Node {
    let mut node = match rest.pop() {
        Some(last) => last,
        None => return first,
    };
    while let Some(term) = rest.pop() {
        node = join(term, node);
    }
    join(first, node)
}

fn is_decimal(s: &str) -> bool {
    s.bytes().all(|b| b.is_ascii_digit())
}
