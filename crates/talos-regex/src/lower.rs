//! Compilation of syntax trees into automata.
//!
//! Each non-leaf construction is minimized as soon as it is built, so the
//! final automaton is deterministic, minimal, and free of transitions to
//! dead states. Union and concatenation chains are flattened first and
//! handed to the variadic combinators in one call, which avoids
//! re-minimizing every link of a long spine.

use std::collections::HashMap;
use std::io;

use indexmap::IndexMap;
use talos_automaton::{automata, operations, Automaton};

use crate::ast::Node;
use crate::error::Error;

/// Source of automata for `<identifier>` references.
///
/// `Ok(None)` means the provider does not know the identifier; an `Err` is
/// reported to the caller wrapped with the identifier being resolved.
pub trait AutomatonProvider {
    /// Returns the automaton bound to `name`, if any.
    fn get(&self, name: &str) -> io::Result<Option<Automaton>>;
}

impl AutomatonProvider for IndexMap<String, Automaton> {
    fn get(&self, name: &str) -> io::Result<Option<Automaton>> {
        Ok(IndexMap::get(self, name).cloned())
    }
}

impl AutomatonProvider for HashMap<String, Automaton> {
    fn get(&self, name: &str) -> io::Result<Option<Automaton>> {
        Ok(HashMap::get(self, name).cloned())
    }
}

pub(crate) struct Lowerer<'a> {
    pub(crate) automata: Option<&'a IndexMap<String, Automaton>>,
    pub(crate) provider: Option<&'a dyn AutomatonProvider>,
}

impl Lowerer<'_> {
    pub(crate) fn lower(&self, node: &Node) -> Result<Automaton, Error> {
        Ok(match node {
            Node::Union(_, _) => {
                let mut parts = Vec::new();
                flatten_unions(node, &mut parts);
                operations::minimize(operations::union(self.lower_all(&parts)?))
            }
            Node::Concat(_, _) => {
                let mut parts = Vec::new();
                flatten_concats(node, &mut parts);
                operations::minimize(operations::concatenate(self.lower_all(&parts)?))
            }
            Node::Intersection(exp1, exp2) => operations::minimize(operations::intersection(
                self.lower(exp1)?,
                self.lower(exp2)?,
            )),
            Node::Optional(exp) => operations::minimize(operations::optional(self.lower(exp)?)),
            Node::Repeat(exp) => operations::minimize(operations::repeat(self.lower(exp)?)),
            Node::RepeatMin(exp, min) => {
                operations::minimize(operations::repeat_min(self.lower(exp)?, *min))
            }
            Node::RepeatMinMax(exp, min, max) => {
                operations::minimize(operations::repeat_range(self.lower(exp)?, *min, *max))
            }
            Node::Complement(exp) => {
                operations::minimize(operations::complement(self.lower(exp)?))
            }
            Node::Char(c) => automata::make_char(*c),
            Node::CharRange(from, to) => automata::make_char_range(*from, *to),
            Node::AnyChar => automata::make_any_char(),
            Node::Empty => automata::make_empty(),
            Node::Str(s) => automata::make_string(s),
            Node::AnyStr => automata::make_any_string(),
            Node::Named(name) => self.resolve(name)?,
            Node::Interval(min, max, digits) => {
                automata::make_decimal_interval(*min, *max, *digits)?
            }
        })
    }

    fn lower_all(&self, parts: &[&Node]) -> Result<Vec<Automaton>, Error> {
        parts.iter().map(|node| self.lower(node)).collect()
    }

    /// Resolves a named automaton: the mapping first, then the provider.
    ///
    /// The result is always an owned copy, so later mutation of the mapping
    /// cannot reach into automata previously returned by compilation.
    fn resolve(&self, name: &str) -> Result<Automaton, Error> {
        if let Some(map) = self.automata {
            if let Some(automaton) = map.get(name) {
                return Ok(automaton.clone());
            }
        }
        if let Some(provider) = self.provider {
            match provider.get(name) {
                Ok(Some(automaton)) => return Ok(automaton),
                Ok(None) => {}
                Err(source) => {
                    return Err(Error::Provider {
                        name: name.to_string(),
                        source,
                    })
                }
            }
        }
        Err(Error::NotFound {
            name: name.to_string(),
        })
    }
}

fn flatten_unions<'n>(node: &'n Node, out: &mut Vec<&'n Node>) {
    match node {
        Node::Union(exp1, exp2) => {
            flatten_unions(exp1, out);
            flatten_unions(exp2, out);
        }
        _ => out.push(node),
    }
}

fn flatten_concats<'n>(node: &'n Node, out: &mut Vec<&'n Node>) {
    match node {
        Node::Concat(exp1, exp2) => {
            flatten_concats(exp1, out);
            flatten_concats(exp2, out);
        }
        _ => out.push(node),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lower(node: &Node) -> Automaton {
        Lowerer {
            automata: None,
            provider: None,
        }
        .lower(node)
        .unwrap()
    }

    #[test]
    fn flattening_collects_whole_spines() {
        let node = Node::union(
            Node::union(Node::char('a'), Node::char('b')),
            Node::union(Node::char('c'), Node::char('d')),
        );
        let mut parts = Vec::new();
        flatten_unions(&node, &mut parts);
        assert_eq!(parts.len(), 4);
    }

    #[test]
    fn lowered_automata_are_minimal_dfas() {
        let node = Node::union(Node::string("ab"), Node::string("ac"));
        let a = lower(&node);
        assert!(a.is_deterministic());
        assert_eq!(a.num_states(), 3);
    }

    #[test]
    fn unknown_names_fail_with_the_identifier() {
        let err = Lowerer {
            automata: None,
            provider: None,
        }
        .lower(&Node::named("missing"))
        .unwrap_err();
        assert_eq!(err.to_string(), "'<missing>' not found");
    }

    #[test]
    fn provider_errors_are_wrapped() {
        struct Failing;
        impl AutomatonProvider for Failing {
            fn get(&self, _name: &str) -> io::Result<Option<Automaton>> {
                Err(io::Error::new(io::ErrorKind::Other, "disk on fire"))
            }
        }
        let err = Lowerer {
            automata: None,
            provider: Some(&Failing),
        }
        .lower(&Node::named("ext"))
        .unwrap_err();
        assert_eq!(err.to_string(), "failed to load automaton '<ext>'");
    }

    #[test]
    fn mapping_wins_over_the_provider() {
        struct Panicking;
        impl AutomatonProvider for Panicking {
            fn get(&self, _name: &str) -> io::Result<Option<Automaton>> {
                panic!("provider consulted despite mapping hit");
            }
        }
        let mut map = IndexMap::new();
        map.insert("x".to_string(), automata::make_char('x'));
        let a = Lowerer {
            automata: Some(&map),
            provider: Some(&Panicking),
        }
        .lower(&Node::named("x"))
        .unwrap();
        assert!(operations::run(&a, "x"));
    }
}
