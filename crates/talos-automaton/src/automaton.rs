use std::fmt;

/// Largest valid Unicode code point.
pub const MAX_CODE_POINT: u32 = 0x10FFFF;

/// Identifier of a single state within an [`Automaton`].
pub type StateId = usize;

/// A transition labeled with an inclusive range of code points.
///
/// Labels are `u32` rather than `char` because complementation produces
/// ranges that span the surrogate block; such ranges are harmless since
/// automata are only ever run against Unicode scalar values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Transition {
    /// Lowest code point matched by this transition.
    pub min: u32,
    /// Highest code point matched by this transition (inclusive).
    pub max: u32,
    /// Destination state.
    pub dest: StateId,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct State {
    pub(crate) accept: bool,
    pub(crate) transitions: Vec<Transition>,
    pub(crate) epsilons: Vec<StateId>,
}

/// A finite-state machine over Unicode code points.
///
/// State `0` is always the initial state. Epsilon transitions are kept in a
/// separate per-state list; an automaton with no epsilons and no overlapping
/// outgoing ranges is deterministic.
///
/// ### Example
/// ```rust
/// use talos_automaton::Automaton;
///
/// let mut a = Automaton::new();
/// let s = a.add_state();
/// a.set_accept(s, true);
/// a.add_transition(0, 'a' as u32, 'z' as u32, s);
/// assert!(a.is_deterministic());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Automaton {
    pub(crate) states: Vec<State>,
}

impl Automaton {
    /// Creates an automaton with a single non-accepting state, i.e. the
    /// empty language.
    pub fn new() -> Self {
        Automaton {
            states: vec![State::default()],
        }
    }

    /// Adds a new state and returns its id.
    pub fn add_state(&mut self) -> StateId {
        self.states.push(State::default());
        self.states.len() - 1
    }

    /// Number of states.
    pub fn num_states(&self) -> usize {
        self.states.len()
    }

    /// The initial state id. Always `0`.
    pub fn initial(&self) -> StateId {
        0
    }

    /// Marks or unmarks `state` as accepting.
    pub fn set_accept(&mut self, state: StateId, accept: bool) {
        self.states[state].accept = accept;
    }

    /// Whether `state` is accepting.
    pub fn is_accept(&self, state: StateId) -> bool {
        self.states[state].accept
    }

    /// Ids of all accepting states.
    pub fn accept_states(&self) -> Vec<StateId> {
        self.states
            .iter()
            .enumerate()
            .filter(|(_, s)| s.accept)
            .map(|(id, _)| id)
            .collect()
    }

    /// Adds a transition from `from` to `dest` over the inclusive code point
    /// range `min..=max`.
    pub fn add_transition(&mut self, from: StateId, min: u32, max: u32, dest: StateId) {
        debug_assert!(min <= max);
        debug_assert!(max <= MAX_CODE_POINT);
        self.states[from].transitions.push(Transition { min, max, dest });
    }

    /// Adds an epsilon transition from `from` to `dest`.
    pub fn add_epsilon(&mut self, from: StateId, dest: StateId) {
        self.states[from].epsilons.push(dest);
    }

    /// Outgoing range transitions of `state`.
    pub fn transitions(&self, state: StateId) -> &[Transition] {
        &self.states[state].transitions
    }

    /// Outgoing epsilon transitions of `state`.
    pub fn epsilons(&self, state: StateId) -> &[StateId] {
        &self.states[state].epsilons
    }

    /// Whether the automaton is deterministic: no epsilon transitions and no
    /// state with overlapping outgoing ranges.
    pub fn is_deterministic(&self) -> bool {
        for state in &self.states {
            if !state.epsilons.is_empty() {
                return false;
            }
            let mut ranges: Vec<(u32, u32)> =
                state.transitions.iter().map(|t| (t.min, t.max)).collect();
            ranges.sort_unstable();
            for pair in ranges.windows(2) {
                if pair[1].0 <= pair[0].1 {
                    return false;
                }
            }
        }
        true
    }

    /// Copies all states of `other` into `self`, offsetting state ids, and
    /// returns the id that `other`'s initial state was mapped to.
    pub(crate) fn append(&mut self, other: Automaton) -> StateId {
        let offset = self.states.len();
        for mut state in other.states {
            for t in &mut state.transitions {
                t.dest += offset;
            }
            for e in &mut state.epsilons {
                *e += offset;
            }
            self.states.push(state);
        }
        offset
    }
}

impl Default for Automaton {
    fn default() -> Self {
        Self::new()
    }
}

fn fmt_code_point(f: &mut fmt::Formatter<'_>, cp: u32) -> fmt::Result {
    match char::from_u32(cp) {
        Some(c) if c.is_ascii_graphic() => write!(f, "{c}"),
        _ => write!(f, "U+{cp:04X}"),
    }
}

impl fmt::Display for Automaton {
    /// Renders a compact state table, one state per line group.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (id, state) in self.states.iter().enumerate() {
            let accept = if state.accept { " [accept]" } else { "" };
            writeln!(f, "state {id}{accept}:")?;
            let mut transitions = state.transitions.clone();
            transitions.sort_unstable();
            for t in &transitions {
                f.write_str("  ")?;
                fmt_code_point(f, t.min)?;
                if t.max != t.min {
                    f.write_str("-")?;
                    fmt_code_point(f, t.max)?;
                }
                writeln!(f, " -> {}", t.dest)?;
            }
            for e in &state.epsilons {
                writeln!(f, "  eps -> {e}")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn new_automaton_is_a_single_dead_state() {
        let a = Automaton::new();
        assert_eq!(a.num_states(), 1);
        assert!(!a.is_accept(0));
        assert!(a.is_deterministic());
    }

    #[test]
    fn overlapping_ranges_are_not_deterministic() {
        let mut a = Automaton::new();
        let s = a.add_state();
        a.add_transition(0, 'a' as u32, 'm' as u32, s);
        a.add_transition(0, 'k' as u32, 'z' as u32, s);
        assert!(!a.is_deterministic());
    }

    #[test]
    fn epsilons_are_not_deterministic() {
        let mut a = Automaton::new();
        let s = a.add_state();
        a.add_epsilon(0, s);
        assert!(!a.is_deterministic());
    }

    #[test]
    fn display_renders_a_state_table() {
        let a = crate::automata::make_string("ab");
        assert_eq!(
            a.to_string(),
            "state 0:\n  a -> 1\nstate 1:\n  b -> 2\nstate 2 [accept]:\n",
        );
    }

    #[test]
    fn append_offsets_state_ids() {
        let mut a = Automaton::new();
        let mut b = Automaton::new();
        let s = b.add_state();
        b.add_transition(0, 'x' as u32, 'x' as u32, s);
        b.set_accept(s, true);

        let offset = a.append(b);
        assert_eq!(offset, 1);
        assert_eq!(a.num_states(), 3);
        assert_eq!(a.transitions(1)[0].dest, 2);
        assert!(a.is_accept(2));
    }
}
