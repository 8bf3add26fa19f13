//! Operations on automata.
//!
//! Combinators take their operands by value: ownership transfer is what
//! makes the in-place construction paths safe, so there is no global toggle
//! choosing between copying and mutating algorithms.

use std::collections::{BTreeSet, HashMap};

use crate::automata;
use crate::automaton::{Automaton, StateId, Transition, MAX_CODE_POINT};

/// Returns an automaton accepting the union of the languages of `list`.
///
/// An empty list yields the empty language.
pub fn union(list: Vec<Automaton>) -> Automaton {
    let mut result = Automaton::new();
    for a in list {
        let initial = result.append(a);
        result.add_epsilon(0, initial);
    }
    result
}

/// Returns an automaton accepting the concatenation of the languages of
/// `list`, in order.
///
/// An empty list yields the empty-string language.
pub fn concatenate(list: Vec<Automaton>) -> Automaton {
    let mut parts = list.into_iter();
    let mut result = match parts.next() {
        Some(first) => first,
        None => return automata::make_empty_string(),
    };
    for a in parts {
        let accepts = result.accept_states();
        let initial = result.append(a);
        for s in accepts {
            result.set_accept(s, false);
            result.add_epsilon(s, initial);
        }
    }
    result
}

/// Returns an automaton accepting the language of `a` plus the empty string.
pub fn optional(a: Automaton) -> Automaton {
    let mut result = Automaton::new();
    result.set_accept(0, true);
    let initial = result.append(a);
    result.add_epsilon(0, initial);
    result
}

/// Returns an automaton accepting zero or more repetitions of the language
/// of `a` (Kleene star).
pub fn repeat(a: Automaton) -> Automaton {
    let mut result = Automaton::new();
    result.set_accept(0, true);
    let initial = result.append(a);
    result.add_epsilon(0, initial);
    for s in result.accept_states() {
        if s != 0 {
            result.add_epsilon(s, 0);
        }
    }
    result
}

/// Returns an automaton accepting `min` or more repetitions of the language
/// of `a`.
pub fn repeat_min(a: Automaton, min: u32) -> Automaton {
    let mut list: Vec<Automaton> = (0..min).map(|_| a.clone()).collect();
    list.push(repeat(a));
    concatenate(list)
}

/// Returns an automaton accepting between `min` and `max` repetitions of the
/// language of `a`.
///
/// `min > max` yields the empty language; `repeat_range(a, 0, 0)` is the
/// empty-string automaton.
pub fn repeat_range(a: Automaton, min: u32, max: u32) -> Automaton {
    if min > max {
        return automata::make_empty();
    }
    let mut tail = automata::make_empty_string();
    for _ in min..max {
        tail = optional(concatenate(vec![a.clone(), tail]));
    }
    let mut list: Vec<Automaton> = (0..min).map(|_| a.clone()).collect();
    list.push(tail);
    concatenate(list)
}

/// Returns an automaton accepting the intersection of the languages of `a`
/// and `b`, via the product construction over determinized operands.
pub fn intersection(a: Automaton, b: Automaton) -> Automaton {
    let a = determinize(a);
    let b = determinize(b);

    let mut result = Automaton::new();
    result.set_accept(0, a.is_accept(0) && b.is_accept(0));

    let mut ids: HashMap<(StateId, StateId), StateId> = HashMap::new();
    ids.insert((0, 0), 0);
    let mut worklist = vec![(0, 0)];

    while let Some((s1, s2)) = worklist.pop() {
        let id = ids[&(s1, s2)];
        for t1 in a.transitions(s1) {
            for t2 in b.transitions(s2) {
                let min = t1.min.max(t2.min);
                let max = t1.max.min(t2.max);
                if min > max {
                    continue;
                }
                let pair = (t1.dest, t2.dest);
                let dest = *ids.entry(pair).or_insert_with(|| {
                    let d = result.add_state();
                    result.set_accept(d, a.is_accept(t1.dest) && b.is_accept(t2.dest));
                    worklist.push(pair);
                    d
                });
                result.add_transition(id, min, max, dest);
            }
        }
    }
    result
}

/// Returns an automaton accepting exactly the strings that `a` rejects.
pub fn complement(a: Automaton) -> Automaton {
    let mut a = determinize(a);
    totalize(&mut a);
    for s in 0..a.num_states() {
        let accept = a.is_accept(s);
        a.set_accept(s, !accept);
    }
    remove_dead_states(a)
}

/// Adds a sink state and transitions so that every state covers the whole
/// code point space.
fn totalize(a: &mut Automaton) {
    let sink = a.add_state();
    a.add_transition(sink, 0, MAX_CODE_POINT, sink);
    for s in 0..a.num_states() {
        let mut ranges: Vec<(u32, u32)> = a.transitions(s).iter().map(|t| (t.min, t.max)).collect();
        ranges.sort_unstable();
        let mut next = 0u32;
        let mut gaps = Vec::new();
        for (min, max) in ranges {
            if min > next {
                gaps.push((next, min - 1));
            }
            if max >= MAX_CODE_POINT {
                next = MAX_CODE_POINT + 1;
                break;
            }
            next = next.max(max + 1);
        }
        if next <= MAX_CODE_POINT {
            gaps.push((next, MAX_CODE_POINT));
        }
        for (min, max) in gaps {
            a.add_transition(s, min, max, sink);
        }
    }
}

/// Returns an automaton accepting the reverse of the language of `a`.
pub fn reverse(a: Automaton) -> Automaton {
    let n = a.num_states();
    let mut result = Automaton::new();
    for _ in 0..n {
        result.add_state();
    }
    // Old state `s` becomes `s + 1`; the fresh initial state fans out to the
    // old accept states and the old initial state becomes accepting.
    result.set_accept(1, true);
    for s in 0..n {
        if a.is_accept(s) {
            result.add_epsilon(0, s + 1);
        }
        for t in a.transitions(s) {
            result.add_transition(t.dest + 1, t.min, t.max, s + 1);
        }
        for &e in a.epsilons(s) {
            result.add_epsilon(e + 1, s + 1);
        }
    }
    result
}

fn epsilon_closure(a: &Automaton, set: &BTreeSet<StateId>) -> BTreeSet<StateId> {
    let mut closure = set.clone();
    let mut stack: Vec<StateId> = set.iter().copied().collect();
    while let Some(s) = stack.pop() {
        for &e in a.epsilons(s) {
            if closure.insert(e) {
                stack.push(e);
            }
        }
    }
    closure
}

/// Epsilon closure with inert states dropped.
///
/// A state that neither accepts nor has outgoing range transitions cannot
/// influence any future step, so keeping it in a powerset key would only
/// split subsets that are behaviorally identical. Normalizing the keys this
/// way is what makes the powerset of a reversed automaton come out minimal.
fn useful_closure(a: &Automaton, set: &BTreeSet<StateId>) -> BTreeSet<StateId> {
    let mut closure = epsilon_closure(a, set);
    closure.retain(|&s| a.is_accept(s) || !a.transitions(s).is_empty());
    closure
}

/// Returns a deterministic automaton accepting the same language, built with
/// the powerset construction.
///
/// The alphabet is split at every code point where some transition range
/// begins or ends, and adjacent equal-destination ranges in the result are
/// re-coalesced. Already-deterministic automata are returned unchanged.
pub fn determinize(a: Automaton) -> Automaton {
    if a.is_deterministic() {
        return a;
    }

    let mut points = BTreeSet::new();
    points.insert(0u32);
    for s in 0..a.num_states() {
        for t in a.transitions(s) {
            points.insert(t.min);
            if t.max < MAX_CODE_POINT {
                points.insert(t.max + 1);
            }
        }
    }
    let points: Vec<u32> = points.into_iter().collect();

    let initial = useful_closure(&a, &BTreeSet::from([0]));

    let mut result = Automaton::new();
    result.set_accept(0, initial.iter().any(|&s| a.is_accept(s)));

    let mut ids: HashMap<Vec<StateId>, StateId> = HashMap::new();
    ids.insert(initial.iter().copied().collect(), 0);
    let mut sets: Vec<BTreeSet<StateId>> = vec![initial];
    let mut worklist = vec![0];

    while let Some(id) = worklist.pop() {
        let current = sets[id].clone();
        for (i, &p) in points.iter().enumerate() {
            let hi = points.get(i + 1).map_or(MAX_CODE_POINT, |&next| next - 1);
            let mut targets = BTreeSet::new();
            for &s in &current {
                for t in a.transitions(s) {
                    if t.min <= p && p <= t.max {
                        targets.insert(t.dest);
                    }
                }
            }
            let targets = useful_closure(&a, &targets);
            if targets.is_empty() {
                continue;
            }
            let key: Vec<StateId> = targets.iter().copied().collect();
            let dest = match ids.get(&key) {
                Some(&dest) => dest,
                None => {
                    let dest = result.add_state();
                    result.set_accept(dest, targets.iter().any(|&s| a.is_accept(s)));
                    ids.insert(key, dest);
                    sets.push(targets);
                    worklist.push(dest);
                    dest
                }
            };
            result.add_transition(id, p, hi, dest);
        }
    }

    coalesce(&mut result);
    result
}

/// Merges adjacent equal-destination ranges; requires disjoint ranges.
fn coalesce(a: &mut Automaton) {
    for state in &mut a.states {
        state.transitions.sort_unstable();
        let mut merged: Vec<Transition> = Vec::with_capacity(state.transitions.len());
        for t in state.transitions.drain(..) {
            match merged.last_mut() {
                Some(last) if last.dest == t.dest && last.max + 1 == t.min => {
                    last.max = t.max;
                }
                _ => merged.push(t),
            }
        }
        state.transitions = merged;
    }
}

/// Removes states that are unreachable from the initial state or from which
/// no accept state can be reached. The initial state is always kept.
pub fn remove_dead_states(a: Automaton) -> Automaton {
    let n = a.num_states();

    let mut reachable = vec![false; n];
    reachable[0] = true;
    let mut stack = vec![0];
    while let Some(s) = stack.pop() {
        for t in a.transitions(s) {
            if !reachable[t.dest] {
                reachable[t.dest] = true;
                stack.push(t.dest);
            }
        }
        for &e in a.epsilons(s) {
            if !reachable[e] {
                reachable[e] = true;
                stack.push(e);
            }
        }
    }

    let mut predecessors: Vec<Vec<StateId>> = vec![Vec::new(); n];
    for s in 0..n {
        for t in a.transitions(s) {
            predecessors[t.dest].push(s);
        }
        for &e in a.epsilons(s) {
            predecessors[e].push(s);
        }
    }
    let mut live = vec![false; n];
    let mut stack: Vec<StateId> = a.accept_states();
    for &s in &stack {
        live[s] = true;
    }
    while let Some(s) = stack.pop() {
        for &p in &predecessors[s] {
            if !live[p] {
                live[p] = true;
                stack.push(p);
            }
        }
    }

    let keep: Vec<bool> = (0..n).map(|s| s == 0 || (reachable[s] && live[s])).collect();
    let mut mapping = vec![usize::MAX; n];
    let mut result = Automaton::new();
    mapping[0] = 0;
    for s in 1..n {
        if keep[s] {
            mapping[s] = result.add_state();
        }
    }
    for s in 0..n {
        if !keep[s] {
            continue;
        }
        result.set_accept(mapping[s], a.is_accept(s));
        for t in a.transitions(s) {
            if keep[t.dest] {
                result.add_transition(mapping[s], t.min, t.max, mapping[t.dest]);
            }
        }
        for &e in a.epsilons(s) {
            if keep[e] {
                result.add_epsilon(mapping[s], mapping[e]);
            }
        }
    }
    result
}

/// Returns the canonical minimal deterministic automaton for the language of
/// `a`, with no transitions to dead states.
///
/// Uses Brzozowski's algorithm: reverse, determinize, reverse, determinize.
pub fn minimize(a: Automaton) -> Automaton {
    let a = determinize(reverse(determinize(reverse(a))));
    remove_dead_states(a)
}

/// Tests whether `a` accepts `input`.
///
/// Deterministic automata are walked directly; others are simulated with
/// epsilon-closed state sets.
pub fn run(a: &Automaton, input: &str) -> bool {
    if a.is_deterministic() {
        let mut state = 0;
        for c in input.chars() {
            let cp = c as u32;
            match a.transitions(state).iter().find(|t| t.min <= cp && cp <= t.max) {
                Some(t) => state = t.dest,
                None => return false,
            }
        }
        a.is_accept(state)
    } else {
        let mut current = epsilon_closure(a, &BTreeSet::from([0]));
        for c in input.chars() {
            let cp = c as u32;
            let mut next = BTreeSet::new();
            for &s in &current {
                for t in a.transitions(s) {
                    if t.min <= cp && cp <= t.max {
                        next.insert(t.dest);
                    }
                }
            }
            if next.is_empty() {
                return false;
            }
            current = epsilon_closure(a, &next);
        }
        current.iter().any(|&s| a.is_accept(s))
    }
}

/// Tests whether `a` and `b` accept the same language.
///
/// Both operands are minimized; the canonical results are then compared for
/// isomorphism by parallel traversal from the initial states.
pub fn same_language(a: &Automaton, b: &Automaton) -> bool {
    let a = minimize(a.clone());
    let b = minimize(b.clone());
    if a.num_states() != b.num_states() {
        return false;
    }

    let mut forward = vec![usize::MAX; a.num_states()];
    let mut backward = vec![usize::MAX; b.num_states()];
    forward[0] = 0;
    backward[0] = 0;
    let mut stack = vec![(0, 0)];
    while let Some((s1, s2)) = stack.pop() {
        if a.is_accept(s1) != b.is_accept(s2) {
            return false;
        }
        let mut t1 = a.transitions(s1).to_vec();
        let mut t2 = b.transitions(s2).to_vec();
        if t1.len() != t2.len() {
            return false;
        }
        t1.sort_unstable();
        t2.sort_unstable();
        for (x, y) in t1.iter().zip(&t2) {
            if x.min != y.min || x.max != y.max {
                return false;
            }
            if forward[x.dest] == usize::MAX && backward[y.dest] == usize::MAX {
                forward[x.dest] = y.dest;
                backward[y.dest] = x.dest;
                stack.push((x.dest, y.dest));
            } else if forward[x.dest] != y.dest || backward[y.dest] != x.dest {
                return false;
            }
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::automata::{
        make_any_char, make_char, make_char_range, make_empty, make_empty_string, make_string,
    };
    use pretty_assertions::assert_eq;

    #[test]
    fn union_accepts_either_operand() {
        let a = union(vec![make_string("cat"), make_string("dog")]);
        assert!(run(&a, "cat"));
        assert!(run(&a, "dog"));
        assert!(!run(&a, "cow"));
    }

    #[test]
    fn union_of_nothing_is_empty() {
        let a = union(Vec::new());
        assert!(!run(&a, ""));
    }

    #[test]
    fn concatenate_chains_operands() {
        let a = concatenate(vec![make_string("ab"), make_string("cd"), make_char('e')]);
        assert!(run(&a, "abcde"));
        assert!(!run(&a, "abcd"));
        assert!(!run(&a, "abcdef"));
    }

    #[test]
    fn concatenate_of_nothing_is_empty_string() {
        let a = concatenate(Vec::new());
        assert!(run(&a, ""));
        assert!(!run(&a, "a"));
    }

    #[test]
    fn optional_adds_empty_string() {
        let a = optional(make_string("ab"));
        assert!(run(&a, ""));
        assert!(run(&a, "ab"));
        assert!(!run(&a, "abab"));
    }

    #[test]
    fn repeat_is_kleene_star() {
        let a = repeat(make_string("ab"));
        assert!(run(&a, ""));
        assert!(run(&a, "ab"));
        assert!(run(&a, "ababab"));
        assert!(!run(&a, "aba"));
    }

    #[test]
    fn repeat_min_requires_a_floor() {
        let a = repeat_min(make_char('a'), 2);
        assert!(!run(&a, ""));
        assert!(!run(&a, "a"));
        assert!(run(&a, "aa"));
        assert!(run(&a, "aaaaa"));
    }

    #[test]
    fn repeat_min_zero_is_star() {
        let a = repeat_min(make_char('a'), 0);
        let b = repeat(make_char('a'));
        assert!(same_language(&a, &b));
    }

    #[test]
    fn repeat_range_bounds_both_sides() {
        let a = repeat_range(make_char('a'), 1, 3);
        assert!(!run(&a, ""));
        assert!(run(&a, "a"));
        assert!(run(&a, "aa"));
        assert!(run(&a, "aaa"));
        assert!(!run(&a, "aaaa"));
    }

    #[test]
    fn repeat_range_zero_zero_is_empty_string() {
        let a = repeat_range(make_char('a'), 0, 0);
        assert!(same_language(&a, &make_empty_string()));
    }

    #[test]
    fn repeat_range_reversed_bounds_is_empty() {
        let a = repeat_range(make_char('a'), 3, 1);
        assert!(same_language(&a, &make_empty()));
    }

    #[test]
    fn intersection_keeps_common_strings() {
        let vowels = union(vec![make_char('a'), make_char('e'), make_char('i')]);
        let low = make_char_range('a', 'f');
        let a = intersection(vowels, low);
        assert!(run(&a, "a"));
        assert!(run(&a, "e"));
        assert!(!run(&a, "i"));
        assert!(!run(&a, "b"));
    }

    #[test]
    fn complement_flips_membership() {
        let a = complement(make_string("ab"));
        assert!(run(&a, ""));
        assert!(run(&a, "a"));
        assert!(run(&a, "abc"));
        assert!(!run(&a, "ab"));
    }

    #[test]
    fn complement_of_complement_is_identity() {
        let a = make_string("ab");
        let b = complement(complement(a.clone()));
        assert!(same_language(&a, &b));
    }

    #[test]
    fn determinize_preserves_the_language() {
        let a = union(vec![make_string("ab"), make_string("ac"), make_char('a')]);
        let d = determinize(a.clone());
        assert!(d.is_deterministic());
        for input in ["a", "ab", "ac", "", "ad", "abc"] {
            assert_eq!(run(&a, input), run(&d, input), "on {input:?}");
        }
    }

    #[test]
    fn minimize_produces_the_smallest_dfa() {
        // a(b|c) needs exactly three states.
        let a = concatenate(vec![
            make_char('a'),
            union(vec![make_char('b'), make_char('c')]),
        ]);
        let m = minimize(a);
        assert!(m.is_deterministic());
        assert_eq!(m.num_states(), 3);
        assert!(run(&m, "ab"));
        assert!(run(&m, "ac"));
        assert!(!run(&m, "a"));
    }

    #[test]
    fn minimize_merges_equivalent_branches() {
        // Both branches accept the same two-letter language.
        let a = union(vec![
            concatenate(vec![make_char('x'), make_char('y')]),
            concatenate(vec![make_char('x'), make_char('y')]),
        ]);
        let m = minimize(a);
        assert_eq!(m.num_states(), 3);
    }

    #[test]
    fn minimize_of_empty_language_is_a_single_state() {
        let m = minimize(union(vec![make_empty(), make_empty()]));
        assert_eq!(m.num_states(), 1);
        assert!(!m.is_accept(0));
        assert!(m.transitions(0).is_empty());
    }

    #[test]
    fn minimized_automata_have_no_dead_transitions() {
        // The 'b' branch of the union is dead once intersected away.
        let a = intersection(
            union(vec![make_string("ab"), make_string("cd")]),
            make_string("ab"),
        );
        let m = minimize(a);
        for s in 0..m.num_states() {
            for t in m.transitions(s) {
                let mut reaches_accept = false;
                let mut stack = vec![t.dest];
                let mut seen = vec![false; m.num_states()];
                while let Some(x) = stack.pop() {
                    if m.is_accept(x) {
                        reaches_accept = true;
                        break;
                    }
                    for t in m.transitions(x) {
                        if !seen[t.dest] {
                            seen[t.dest] = true;
                            stack.push(t.dest);
                        }
                    }
                }
                assert!(reaches_accept, "transition to dead state from {s}");
            }
        }
    }

    #[test]
    fn reverse_reverses_the_language() {
        let a = reverse(make_string("abc"));
        assert!(run(&a, "cba"));
        assert!(!run(&a, "abc"));
    }

    #[test]
    fn same_language_ignores_structure() {
        let a = union(vec![make_char('a'), make_char('b'), make_char('c')]);
        let b = make_char_range('a', 'c');
        assert!(same_language(&a, &b));
    }

    #[test]
    fn same_language_detects_differences() {
        let a = make_char_range('a', 'c');
        let b = make_char_range('a', 'd');
        assert!(!same_language(&a, &b));
        assert!(!same_language(&make_empty(), &make_empty_string()));
        assert!(!same_language(&make_any_char(), &make_char('a')));
    }

    #[test]
    fn run_simulates_nondeterministic_automata() {
        let a = union(vec![make_string("ab"), make_string("aab")]);
        assert!(!a.is_deterministic());
        assert!(run(&a, "ab"));
        assert!(run(&a, "aab"));
        assert!(!run(&a, "aab0"));
    }
}
