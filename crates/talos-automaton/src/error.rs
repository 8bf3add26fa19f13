use thiserror::Error;

/// Errors raised by automaton constructors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// A decimal interval was requested with `min > max`.
    #[error("invalid interval: min ({min}) cannot be > max ({max})")]
    IntervalOrder {
        /// Requested lower bound.
        min: u32,
        /// Requested upper bound.
        max: u32,
    },

    /// A decimal interval's upper bound does not fit the fixed width.
    #[error("invalid interval: {max} cannot be expressed with {digits} digits")]
    IntervalWidth {
        /// Requested upper bound.
        max: u32,
        /// Requested fixed width.
        digits: usize,
    },
}
