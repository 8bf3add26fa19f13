#![doc = include_str!("../README.md")]
#![forbid(unsafe_code)]
#![deny(missing_debug_implementations, nonstandard_style)]
#![warn(missing_docs, future_incompatible, unreachable_pub, rust_2018_idioms)]

use std::fmt;
use std::str::FromStr;

use indexmap::{IndexMap, IndexSet};
use talos_automaton::Automaton;

pub use talos_automaton as automaton;

mod ast;
mod error;
mod flags;
mod lower;
mod parser;
mod serialize;

pub use crate::ast::Node;
pub use crate::error::Error;
pub use crate::flags::SyntaxFlags;
pub use crate::lower::AutomatonProvider;

use crate::lower::Lowerer;
use crate::parser::Parser;

/// A parsed extended regular expression.
///
/// Parsing happens at construction; the compiled automaton is produced on
/// demand by the [`to_automaton`][RegExp::to_automaton] family of methods.
///
/// ### Example
/// ```rust
/// use talos_regex::RegExp;
///
/// let re = RegExp::new("a|b").unwrap();
/// assert_eq!(re.to_string(), r"(\a|\b)");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegExp {
    source: String,
    flags: SyntaxFlags,
    node: Node,
}

impl RegExp {
    /// Parses `source` with every optional production enabled.
    pub fn new(source: &str) -> Result<RegExp, Error> {
        RegExp::with_flags(source, SyntaxFlags::ALL)
    }

    /// Parses `source`, permitting only the productions selected by
    /// `flags`.
    ///
    /// ### Example
    /// ```rust
    /// use talos_regex::{RegExp, SyntaxFlags};
    ///
    /// assert!(RegExp::with_flags("<5-12>", SyntaxFlags::INTERVAL).is_ok());
    /// assert!(RegExp::with_flags("<5-12>", SyntaxFlags::NONE).is_err());
    /// ```
    pub fn with_flags(source: &str, flags: SyntaxFlags) -> Result<RegExp, Error> {
        let node = Parser::new(source, flags).parse()?;
        Ok(RegExp {
            source: source.to_string(),
            flags,
            node,
        })
    }

    /// The root of the syntax tree.
    pub fn node(&self) -> &Node {
        &self.node
    }

    /// The flags this expression was parsed with.
    pub fn flags(&self) -> SyntaxFlags {
        self.flags
    }

    /// The source string this expression was parsed from.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Every named-automaton identifier referenced by this expression, in
    /// first-occurrence order.
    ///
    /// ### Example
    /// ```rust
    /// use talos_regex::RegExp;
    ///
    /// let re = RegExp::new("<alpha>|<beta>").unwrap();
    /// let names = re.identifiers();
    /// let names: Vec<&str> = names.iter().map(|s| s.as_str()).collect();
    /// assert_eq!(names, ["alpha", "beta"]);
    /// ```
    pub fn identifiers(&self) -> IndexSet<String> {
        let mut names = IndexSet::new();
        self.node.collect_identifiers(&mut names);
        names
    }

    /// Compiles the expression to a minimal deterministic automaton.
    ///
    /// Fails with [`Error::NotFound`] if the expression references a named
    /// automaton.
    ///
    /// ### Example
    /// ```rust
    /// use talos_automaton::operations;
    /// use talos_regex::RegExp;
    ///
    /// let a = RegExp::new("ab*c").unwrap().to_automaton().unwrap();
    /// assert!(operations::run(&a, "abbc"));
    /// assert!(!operations::run(&a, "abcc"));
    /// ```
    pub fn to_automaton(&self) -> Result<Automaton, Error> {
        self.to_automaton_with(None, None)
    }

    /// Compiles the expression, resolving named automata against `automata`.
    pub fn to_automaton_with_map(
        &self,
        automata: &IndexMap<String, Automaton>,
    ) -> Result<Automaton, Error> {
        self.to_automaton_with(Some(automata), None)
    }

    /// Compiles the expression, resolving named automata through
    /// `provider`.
    pub fn to_automaton_with_provider(
        &self,
        provider: &dyn AutomatonProvider,
    ) -> Result<Automaton, Error> {
        self.to_automaton_with(None, Some(provider))
    }

    /// Compiles the expression, resolving named automata against the
    /// mapping first and the provider second.
    ///
    /// Resolved automata are copied before use, so the caller may freely
    /// mutate the mapping afterwards without affecting the returned
    /// automaton.
    pub fn to_automaton_with(
        &self,
        automata: Option<&IndexMap<String, Automaton>>,
        provider: Option<&dyn AutomatonProvider>,
    ) -> Result<Automaton, Error> {
        Lowerer { automata, provider }.lower(&self.node)
    }
}

impl fmt::Display for RegExp {
    /// Writes the canonical form of the expression.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.node, f)
    }
}

impl FromStr for RegExp {
    type Err = Error;

    /// Parses with every optional production enabled.
    fn from_str(s: &str) -> Result<RegExp, Error> {
        RegExp::new(s)
    }
}
