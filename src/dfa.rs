use std::{
    fmt::{Debug, Write},
    path::Path,
};

use itertools::Itertools;
use serde::{de::Error as _, Deserialize, Deserializer, Serialize};

use crate::{
    ts::{MinimalRepresentatives, State},
    Alphabet, DfaError, StateId, StateStatus, Symbol, TransitionFunction,
};

/// A deterministic finite automaton whose states carry a tri-state [`StateStatus`].
///
/// The automaton owns its states, its [`TransitionFunction`] and the [`Alphabet`] of all
/// symbols that label a transition. States are referenced by their [`StateId`], which is their
/// position in the state list, so identifiers are always exactly `0..size`. The structure only
/// ever grows: states and transitions can be added but not removed.
///
/// # Example
/// ```
/// use dfa_toolkit::{Dfa, StateStatus};
///
/// let mut dfa = Dfa::new();
/// let q0 = dfa.starting_state();
/// let q1 = dfa.add_state(StateStatus::Accepting);
/// dfa.add_transition(q0, 'a', q1).unwrap();
/// assert_eq!(dfa.run(&['a']), Some(q1));
/// assert_eq!(dfa.accepting_states(), vec![q1]);
/// ```
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct Dfa<S: Symbol = char> {
    states: Vec<State>,
    transitions: TransitionFunction<S>,
    alphabet: Alphabet<S>,
    starting_state: StateId,
}

impl<S: Symbol> Dfa<S> {
    /// Creates a DFA that consists of a single starting state with status [`StateStatus::Unknown`]
    /// and no transitions.
    pub fn new() -> Self {
        Self {
            states: vec![State::new(StateStatus::Unknown)],
            transitions: TransitionFunction::new(),
            alphabet: Alphabet::new(),
            starting_state: 0,
        }
    }

    /// Returns the designated starting state.
    pub fn starting_state(&self) -> StateId {
        self.starting_state
    }

    /// Adds a state with the given `status` and returns its identifier, which is the next
    /// free one in the dense range.
    pub fn add_state(&mut self, status: StateStatus) -> StateId {
        let id = self.states.len();
        self.states.push(State::new(status));
        id
    }

    /// Adds a transition from `from` to `to` on `symbol`. Both states must exist, otherwise
    /// [`DfaError::InvalidState`] is returned. Registering a transition that already exists is
    /// a no-op, a different target for an existing `(from, symbol)` pair is rejected with
    /// [`DfaError::Conflict`]. The symbol becomes part of the alphabet once the transition
    /// has been accepted.
    pub fn add_transition(&mut self, from: StateId, symbol: S, to: StateId) -> Result<(), DfaError> {
        self.check_state(from)?;
        self.check_state(to)?;
        self.transitions.add_transition(from, symbol, to)?;
        self.alphabet.insert(symbol);
        Ok(())
    }

    /// Records `symbol` as part of the alphabet without adding a transition. Returns `true`
    /// if the symbol was not known before.
    pub fn add_symbol(&mut self, symbol: S) -> bool {
        self.alphabet.insert(symbol).1
    }

    /// Overwrites the status of `state`. Any change is permitted, checking that labels are
    /// consistent is up to the caller.
    pub fn set_status(&mut self, state: StateId, status: StateStatus) -> Result<(), DfaError> {
        self.check_state(state)?;
        self.states[state].set_status(status);
        Ok(())
    }

    /// Returns the status of `state` or `None` if the state does not exist.
    pub fn status(&self, state: StateId) -> Option<StateStatus> {
        self.states.get(state).map(|q| q.status())
    }

    /// Returns true if a state with the given identifier exists.
    pub fn contains_state(&self, state: StateId) -> bool {
        state < self.states.len()
    }

    fn check_state(&self, state: StateId) -> Result<(), DfaError> {
        if self.contains_state(state) {
            Ok(())
        } else {
            Err(DfaError::InvalidState {
                state,
                size: self.states.len(),
            })
        }
    }

    /// The number of states.
    pub fn size(&self) -> usize {
        self.states.len()
    }

    /// All states, indexed by their identifier.
    pub fn states(&self) -> &[State] {
        &self.states
    }

    /// The symbols that label at least one transition (or were added explicitly).
    pub fn alphabet(&self) -> &Alphabet<S> {
        &self.alphabet
    }

    /// The underlying transition function.
    pub fn transitions(&self) -> &TransitionFunction<S> {
        &self.transitions
    }

    /// Looks up the successor of `from` on `symbol`.
    pub fn transition(&self, from: StateId, symbol: S) -> Option<StateId> {
        self.transitions.transition(from, symbol)
    }

    /// Iterates over the outgoing transitions of `from` in ascending symbol order.
    pub fn transitions_from(&self, from: StateId) -> impl Iterator<Item = (S, StateId)> + '_ {
        self.transitions.transitions_from(from)
    }

    fn states_with_status(&self, status: StateStatus) -> Vec<StateId> {
        self.states
            .iter()
            .enumerate()
            .filter_map(|(id, q)| (q.status() == status).then_some(id))
            .collect()
    }

    /// Returns the indices of all states that are accepting, in ascending order.
    pub fn accepting_states(&self) -> Vec<StateId> {
        self.states_with_status(StateStatus::Accepting)
    }

    /// Returns the indices of all states that are rejecting, in ascending order.
    pub fn rejecting_states(&self) -> Vec<StateId> {
        self.states_with_status(StateStatus::Rejecting)
    }

    /// Returns the indices of all states without a label, in ascending order.
    pub fn unknown_states(&self) -> Vec<StateId> {
        self.states_with_status(StateStatus::Unknown)
    }

    /// The number of states that are either accepting or rejecting.
    pub fn labelled_states_count(&self) -> usize {
        self.states.iter().filter(|q| q.status().is_labelled()).count()
    }

    /// The number of transitions.
    pub fn transitions_count(&self) -> usize {
        self.transitions.len()
    }

    /// The number of transitions labelled with `symbol`.
    pub fn transitions_count_for_symbol(&self, symbol: S) -> usize {
        self.transitions.count_for_symbol(symbol)
    }

    /// The number of transitions that lead from a reachable state back to a state which is
    /// strictly closer to the starting state. Transitions between states of the same depth,
    /// self loops included, are not counted. A tree has no loops.
    pub fn loops_count(&self) -> usize {
        let mut depth = vec![None; self.size()];
        for (access, q) in self.minimal_representatives() {
            depth[q] = Some(access.len());
        }
        self.transitions
            .iter()
            .filter(|t| match (depth[t.source()], depth[t.target()]) {
                (Some(from), Some(to)) => to < from,
                _ => false,
            })
            .count()
    }

    /// The number of states without outgoing transitions.
    pub fn leaves_count(&self) -> usize {
        (0..self.size())
            .filter(|q| self.transitions.out_degree(*q) == 0)
            .count()
    }

    /// The number of transitions entering `state`.
    pub fn in_degree(&self, state: StateId) -> usize {
        self.transitions.in_degree(state)
    }

    /// The number of transitions leaving `state`.
    pub fn out_degree(&self, state: StateId) -> usize {
        self.transitions.out_degree(state)
    }

    /// Checks whether the transition structure is a tree rooted in the starting state, i.e.
    /// the starting state has no incoming transition and every other state has exactly one.
    pub fn is_tree(&self) -> bool {
        let mut incoming = vec![0usize; self.size()];
        for transition in self.transitions.iter() {
            incoming[transition.target()] += 1;
        }
        incoming.iter().enumerate().all(|(q, count)| {
            if q == self.starting_state {
                *count == 0
            } else {
                *count == 1
            }
        })
    }

    /// Checks whether every state has a transition for every symbol of the alphabet.
    pub fn is_complete(&self) -> bool {
        (0..self.size()).all(|q| self.transitions.out_degree(q) == self.alphabet.len())
    }

    /// Follows `word` from the starting state and returns the state that is reached, or `None`
    /// if some symbol has no transition.
    pub fn run(&self, word: &[S]) -> Option<StateId> {
        word.iter()
            .try_fold(self.starting_state, |q, sym| self.transition(q, *sym))
    }

    /// Returns the status of the state reached by `word`. Words on which the run fails are
    /// classified as [`StateStatus::Unknown`].
    pub fn classify(&self, word: &[S]) -> StateStatus {
        self.run(word)
            .and_then(|q| self.status(q))
            .unwrap_or(StateStatus::Unknown)
    }

    /// Breadth-first traversal from the starting state, producing every reachable state together
    /// with its length-lexicographically minimal access word.
    pub fn minimal_representatives(&self) -> MinimalRepresentatives<'_, S> {
        MinimalRepresentatives::new(&self.transitions, self.starting_state)
    }

    /// The maximum over all reachable states of the length of a shortest path from the starting
    /// state to it.
    pub fn depth(&self) -> usize {
        self.minimal_representatives()
            .last()
            .map(|(access, _)| access.len())
            .unwrap_or(0)
    }

    /// The reachable states in breadth-first order, where successors are visited in ascending
    /// symbol order.
    pub fn ordered_states(&self) -> Vec<StateId> {
        self.minimal_representatives().map(|(_, q)| q).collect()
    }

    /// States that cannot be reached from the starting state, in ascending order.
    pub fn unreachable_states(&self) -> Vec<StateId> {
        let mut reachable = vec![false; self.size()];
        for (_, q) in self.minimal_representatives() {
            reachable[q] = true;
        }
        reachable
            .into_iter()
            .enumerate()
            .filter_map(|(q, r)| (!r).then_some(q))
            .collect()
    }

    /// Produces a human readable report of the structure. States are listed in ascending order
    /// of their identifier, each followed by its outgoing transitions in ascending symbol order,
    /// so the output is stable and can be compared in tests.
    pub fn describe(&self) -> String {
        let mut out = String::new();
        // writing into a String cannot fail
        let _ = writeln!(
            out,
            "DFA with {} states over {} symbols",
            self.size(),
            self.alphabet.len()
        );
        let _ = writeln!(
            out,
            "Alphabet: {{{}}}",
            self.alphabet.sorted().iter().map(|sym| sym.show()).join(", ")
        );
        let _ = writeln!(out, "Starting state: {}", self.starting_state);
        let _ = writeln!(out, "States:");
        for (id, state) in self.states.iter().enumerate() {
            let _ = writeln!(out, "{} {}", id, state.status());
            for (sym, target) in self.transitions_from(id) {
                let _ = writeln!(out, "  {} --{}--> {}", id, sym.show(), target);
            }
        }
        out
    }

    /// Renders the transition structure as a table with one row per state and one column
    /// per symbol.
    pub fn transition_table(&self) -> String {
        let symbols = self.alphabet.sorted();
        let mut builder = tabled::builder::Builder::default();
        builder.push_record(
            std::iter::once("State".to_string()).chain(symbols.iter().map(|s| s.show())),
        );
        for (id, state) in self.states.iter().enumerate() {
            let marker = if id == self.starting_state { "-> " } else { "" };
            let mut row = vec![format!("{marker}{id} : {}", state.status())];
            for &sym in &symbols {
                match self.transition(id, sym) {
                    Some(target) => row.push(target.to_string()),
                    None => row.push("-".to_string()),
                }
            }
            builder.push_record(row);
        }

        builder
            .build()
            .with(tabled::settings::Style::rounded())
            .to_string()
    }
}

impl<S: Symbol + Serialize> Dfa<S> {
    /// Serializes the DFA into pretty printed JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Writes the JSON representation to `path`, see [`Dfa::to_json`].
    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> std::io::Result<()> {
        std::fs::write(path, self.to_json()?)
    }
}

impl<S: Symbol + serde::de::DeserializeOwned> Dfa<S> {
    /// Reads a DFA from its JSON representation. Identifiers that do not refer to a state
    /// and conflicting transitions are rejected.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Reads a DFA from the JSON file at `path`, see [`Dfa::from_json`].
    pub fn load_json<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Ok(Self::from_json(&contents)?)
    }
}

#[derive(Deserialize)]
struct DfaRepr<S: Symbol> {
    states: Vec<State>,
    transitions: TransitionFunction<S>,
    alphabet: Alphabet<S>,
    starting_state: StateId,
}

impl<'de, S: Symbol + Deserialize<'de>> Deserialize<'de> for Dfa<S> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let DfaRepr {
            states,
            transitions,
            mut alphabet,
            starting_state,
        } = DfaRepr::deserialize(deserializer)?;
        let size = states.len();
        let invalid = |state| D::Error::custom(DfaError::InvalidState { state, size });

        if starting_state >= size {
            return Err(invalid(starting_state));
        }
        for t in transitions.iter() {
            if t.source() >= size {
                return Err(invalid(t.source()));
            }
            if t.target() >= size {
                return Err(invalid(t.target()));
            }
            alphabet.insert(t.symbol());
        }
        Ok(Self {
            states,
            transitions,
            alphabet,
            starting_state,
        })
    }
}

impl<S: Symbol> Default for Dfa<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Symbol> Debug for Dfa<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{}", self.transition_table())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::{DfaError, StateStatus};

    use super::Dfa;

    fn ab_chain() -> Dfa {
        let mut dfa = Dfa::new();
        let q0 = dfa.starting_state();
        dfa.set_status(q0, StateStatus::Rejecting).unwrap();
        let q1 = dfa.add_state(StateStatus::Accepting);
        let q2 = dfa.add_state(StateStatus::Rejecting);
        dfa.add_transition(q0, 'a', q1).unwrap();
        dfa.add_transition(q1, 'b', q2).unwrap();
        dfa
    }

    #[test]
    fn new_dfa_has_single_unknown_state() {
        let dfa: Dfa = Dfa::new();
        assert_eq!(dfa.size(), 1);
        assert_eq!(dfa.status(dfa.starting_state()), Some(StateStatus::Unknown));
        assert_eq!(dfa.transitions_count(), 0);
        assert!(dfa.alphabet().is_empty());
        assert!(dfa.is_tree());
        assert_eq!(dfa.depth(), 0);
    }

    #[test]
    fn identifiers_are_dense() {
        let mut dfa: Dfa = Dfa::new();
        let ids: Vec<_> = (0..4).map(|_| dfa.add_state(StateStatus::Unknown)).collect();
        assert_eq!(ids, vec![1, 2, 3, 4]);
        assert_eq!(dfa.size(), 5);
    }

    #[test]
    fn invalid_states_are_rejected() {
        let mut dfa = ab_chain();
        let before = dfa.clone();
        assert_eq!(
            dfa.add_transition(0, 'c', 3),
            Err(DfaError::InvalidState { state: 3, size: 3 })
        );
        assert_eq!(
            dfa.add_transition(9, 'c', 0),
            Err(DfaError::InvalidState { state: 9, size: 3 })
        );
        assert_eq!(
            dfa.set_status(5, StateStatus::Accepting),
            Err(DfaError::InvalidState { state: 5, size: 3 })
        );
        assert_eq!(dfa, before);
        assert!(!dfa.alphabet().contains('c'));
        assert_eq!(dfa.status(5), None);
    }

    #[test]
    fn conflicting_transition_leaves_dfa_untouched() {
        let mut dfa = ab_chain();
        let before = dfa.clone();
        assert!(matches!(
            dfa.add_transition(0, 'a', 2),
            Err(DfaError::Conflict { existing: 1, attempted: 2, .. })
        ));
        assert_eq!(dfa, before);
        assert_eq!(dfa.add_transition(0, 'a', 1), Ok(()));
        assert_eq!(dfa, before);
    }

    #[test]
    fn structural_queries() {
        let mut dfa = ab_chain();
        assert_eq!(dfa.accepting_states(), vec![1]);
        assert_eq!(dfa.rejecting_states(), vec![0, 2]);
        assert!(dfa.unknown_states().is_empty());
        assert_eq!(dfa.labelled_states_count(), 3);
        assert_eq!(dfa.leaves_count(), 1);
        assert_eq!(dfa.in_degree(1), 1);
        assert_eq!(dfa.out_degree(1), 1);
        assert!(dfa.is_tree());
        assert!(!dfa.is_complete());
        assert_eq!(dfa.depth(), 2);
        assert_eq!(dfa.ordered_states(), vec![0, 1, 2]);

        assert_eq!(dfa.run(&['a', 'b']), Some(2));
        assert_eq!(dfa.run(&[]), Some(0));
        assert_eq!(dfa.run(&['b']), None);
        assert_eq!(dfa.classify(&['a']), StateStatus::Accepting);
        assert_eq!(dfa.classify(&['a', 'a']), StateStatus::Unknown);

        let orphan = dfa.add_state(StateStatus::Unknown);
        assert_eq!(dfa.unreachable_states(), vec![orphan]);
        assert!(!dfa.is_tree());

        dfa.add_transition(2, 'a', 0).unwrap();
        assert!(!dfa.is_tree());
    }

    #[test]
    fn completeness() {
        let mut dfa: Dfa = Dfa::new();
        dfa.add_transition(0, 'a', 0).unwrap();
        assert!(dfa.is_complete());
        assert!(dfa.add_symbol('b'));
        assert!(!dfa.add_symbol('b'));
        assert!(!dfa.is_complete());
    }

    #[test]
    fn describe_is_deterministic() {
        let mut dfa = ab_chain();
        dfa.add_transition(0, 'b', 2).unwrap();
        let expected = "\
DFA with 3 states over 2 symbols
Alphabet: {a, b}
Starting state: 0
States:
0 REJECTING
  0 --a--> 1
  0 --b--> 2
1 ACCEPTING
  1 --b--> 2
2 REJECTING
";
        assert_eq!(dfa.describe(), expected);
    }

    #[test]
    fn symbol_and_loop_counts() {
        let mut dfa = ab_chain();
        assert_eq!(dfa.transitions_count_for_symbol('a'), 1);
        assert_eq!(dfa.transitions_count_for_symbol('c'), 0);
        assert_eq!(dfa.loops_count(), 0);

        dfa.add_transition(2, 'a', 0).unwrap();
        dfa.add_transition(2, 'b', 1).unwrap();
        dfa.add_transition(1, 'a', 1).unwrap();
        assert_eq!(dfa.transitions_count_for_symbol('a'), 3);
        assert_eq!(dfa.transitions_count_for_symbol('b'), 2);
        assert_eq!(dfa.loops_count(), 2);
    }

    #[test]
    fn json_round_trip() {
        let mut dfa = ab_chain();
        dfa.add_transition(2, 'a', 0).unwrap();
        dfa.add_symbol('z');
        dfa.add_state(StateStatus::Unknown);

        let json = dfa.to_json().unwrap();
        assert!(json.contains("\"starting_state\": 0"));
        let back: Dfa = Dfa::from_json(&json).unwrap();
        assert_eq!(back, dfa);
        assert_eq!(back.describe(), dfa.describe());

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dfa.json");
        dfa.save_json(&path).unwrap();
        assert_eq!(Dfa::<char>::load_json(&path).unwrap(), dfa);
    }

    #[test]
    fn json_with_dangling_state_is_rejected() {
        let dangling = r#"{
            "states": [{"status": "Accepting"}],
            "transitions": [{"source": 0, "symbol": "a", "target": 3}],
            "alphabet": ["a"],
            "starting_state": 0
        }"#;
        let err = Dfa::<char>::from_json(dangling).unwrap_err();
        assert!(err.to_string().contains("State 3 does not exist"));

        let bad_start = r#"{"states": [], "transitions": [], "alphabet": [], "starting_state": 0}"#;
        assert!(Dfa::<char>::from_json(bad_start).is_err());
        assert!(Dfa::<char>::load_json("/does/not/exist.json").is_err());
    }

    #[test]
    fn transition_table_lists_every_state() {
        let dfa = ab_chain();
        let table = dfa.transition_table();
        println!("{:?}", dfa);
        assert!(table.contains("-> 0 : REJECTING"));
        assert!(table.contains("1 : ACCEPTING"));
        assert!(table.contains("2 : REJECTING"));
    }
}
