#![doc = include_str!("../README.md")]
#![forbid(unsafe_code)]
#![deny(missing_debug_implementations, nonstandard_style)]
#![warn(missing_docs, future_incompatible, unreachable_pub, rust_2018_idioms)]

mod automaton;
mod error;

pub mod automata;
pub mod operations;

pub use crate::automaton::{Automaton, StateId, Transition, MAX_CODE_POINT};
pub use crate::error::Error;
