use std::io;

use thiserror::Error;

/// Errors raised while parsing an expression or compiling it to an
/// automaton.
///
/// Syntax errors carry the byte offset into the source string at which the
/// failure was detected.
#[derive(Debug, Error)]
pub enum Error {
    /// Input remained after a complete expression was parsed.
    #[error("end-of-string expected at position {position}")]
    ExpectedEndOfString {
        /// Offset of the first unconsumed character.
        position: usize,
    },

    /// The source ended in the middle of a construct.
    #[error("unexpected end-of-string")]
    UnexpectedEndOfString,

    /// A `{n,m}` quantifier bound was missing or out of range.
    #[error("integer expected at position {position}")]
    ExpectedInteger {
        /// Offset at which an integer was required.
        position: usize,
    },

    /// A required delimiter was missing.
    #[error("expected '{expected}' at position {position}")]
    Expected {
        /// The delimiter that was required.
        expected: char,
        /// Offset at which it was required.
        position: usize,
    },

    /// A `<...>` group could not be read as a numeric interval.
    #[error("interval syntax error at position {position}")]
    IntervalSyntax {
        /// Offset of the closing `>`.
        position: usize,
    },

    /// A `<...>` group could not be read as an identifier.
    #[error("illegal identifier at position {position}")]
    IllegalIdentifier {
        /// Offset of the closing `>`.
        position: usize,
    },

    /// A reserved metacharacter appeared unescaped where a literal was
    /// required.
    #[error("'{ch}' must be escaped at position {position}")]
    Reserved {
        /// The offending character.
        ch: char,
        /// Its offset.
        position: usize,
    },

    /// A character range with reversed endpoints.
    #[error("invalid range: from ({from}) cannot be > to ({to})")]
    InvalidRange {
        /// Lower endpoint as written.
        from: char,
        /// Upper endpoint as written.
        to: char,
    },

    /// A named automaton was not found in the mapping or the provider.
    #[error("'<{name}>' not found")]
    NotFound {
        /// The unresolved identifier.
        name: String,
    },

    /// The automaton provider failed while loading a named automaton.
    #[error("failed to load automaton '<{name}>'")]
    Provider {
        /// The identifier being resolved.
        name: String,
        /// The underlying I/O failure.
        #[source]
        source: io::Error,
    },

    /// An automaton constructor rejected its arguments.
    #[error(transparent)]
    Automaton(#[from] talos_automaton::Error),
}
