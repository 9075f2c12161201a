use std::{
    collections::BTreeMap,
    fmt::{Debug, Display},
};

use serde::{de::Error as _, Deserialize, Deserializer, Serialize, Serializer};

use crate::{alphabet::Symbol, DfaError};

use super::StateId;

/// A single entry of a [`TransitionFunction`], i.e. the fact that reading `symbol` in state
/// `source` leads to state `target`.
#[derive(Clone, Copy, Eq, PartialEq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Transition<S> {
    source: StateId,
    symbol: S,
    target: StateId,
}

impl<S: Symbol> Transition<S> {
    /// Creates a new transition with the given source and target state and symbol.
    pub fn new(source: StateId, symbol: S, target: StateId) -> Self {
        Self {
            source,
            symbol,
            target,
        }
    }

    /// Returns the source state.
    pub fn source(&self) -> StateId {
        self.source
    }

    /// Returns the symbol that triggers the transition.
    pub fn symbol(&self) -> S {
        self.symbol
    }

    /// Returns the target state.
    pub fn target(&self) -> StateId {
        self.target
    }
}

impl<S: Symbol> Display for Transition<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} --{}--> {}",
            self.source,
            self.symbol.show(),
            self.target
        )
    }
}

impl<S: Symbol> Debug for Transition<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} --{:?}--> {}", self.source, self.symbol, self.target)
    }
}

/// A partial, deterministic mapping from a source state and a symbol to a target state.
///
/// Outgoing transitions are stored in one row per source state, the rows are indexed by
/// [`StateId`] and keep their symbols ordered. Rows are created lazily, so the function
/// does not need to know how many states exist. Entries can only be added, never removed.
#[derive(Clone, Eq, PartialEq)]
pub struct TransitionFunction<S> {
    rows: Vec<BTreeMap<S, StateId>>,
    count: usize,
}

impl<S: Symbol> TransitionFunction<S> {
    /// Creates an empty transition function.
    pub fn new() -> Self {
        Self {
            rows: Vec::new(),
            count: 0,
        }
    }

    /// Registers that reading `symbol` in `from` leads to `to`. Returns `Ok(true)` if the
    /// transition is new and `Ok(false)` if exactly this transition was present already.
    /// If `(from, symbol)` already leads somewhere else, a [`DfaError::Conflict`] is
    /// returned and nothing changes.
    pub fn add_transition(&mut self, from: StateId, symbol: S, to: StateId) -> Result<bool, DfaError> {
        if let Some(existing) = self.transition(from, symbol) {
            if existing == to {
                return Ok(false);
            }
            return Err(DfaError::Conflict {
                source: from,
                symbol: symbol.show(),
                existing,
                attempted: to,
            });
        }
        if from >= self.rows.len() {
            self.rows.resize_with(from + 1, BTreeMap::new);
        }
        self.rows[from].insert(symbol, to);
        self.count += 1;
        Ok(true)
    }

    /// Looks up the target of reading `symbol` in `from`. `None` means that no such
    /// transition has been registered (yet).
    pub fn transition(&self, from: StateId, symbol: S) -> Option<StateId> {
        self.rows.get(from).and_then(|row| row.get(&symbol)).copied()
    }

    /// Iterates over all `(symbol, target)` pairs leaving `from`, in ascending symbol order.
    pub fn transitions_from(&self, from: StateId) -> impl Iterator<Item = (S, StateId)> + '_ {
        self.rows
            .get(from)
            .into_iter()
            .flat_map(|row| row.iter().map(|(sym, target)| (*sym, *target)))
    }

    /// Iterates over all transitions, ordered by source and then by symbol.
    pub fn iter(&self) -> impl Iterator<Item = Transition<S>> + '_ {
        self.rows.iter().enumerate().flat_map(|(source, row)| {
            row.iter()
                .map(move |(sym, target)| Transition::new(source, *sym, *target))
        })
    }

    /// The number of outgoing transitions of `state`.
    pub fn out_degree(&self, state: StateId) -> usize {
        self.rows.get(state).map(|row| row.len()).unwrap_or(0)
    }

    /// The number of transitions labelled with `symbol`.
    pub fn count_for_symbol(&self, symbol: S) -> usize {
        self.rows.iter().filter(|row| row.contains_key(&symbol)).count()
    }

    /// The number of transitions that lead into `state`.
    pub fn in_degree(&self, state: StateId) -> usize {
        self.rows
            .iter()
            .flat_map(|row| row.values())
            .filter(|target| **target == state)
            .count()
    }

    /// The total number of registered transitions.
    pub fn len(&self) -> usize {
        self.count
    }

    /// Returns true if no transition has been registered.
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

impl<S: Symbol> Default for TransitionFunction<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Symbol> Debug for TransitionFunction<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

/// Serialized as the flat list of its transitions, see [`TransitionFunction::iter`].
impl<S: Symbol + Serialize> Serialize for TransitionFunction<S> {
    fn serialize<Ser: Serializer>(&self, serializer: Ser) -> Result<Ser::Ok, Ser::Error> {
        serializer.collect_seq(self.iter())
    }
}

/// Rebuilds the rows transition by transition, so a list that maps some pair to two
/// different targets is rejected.
impl<'de, S: Symbol + Deserialize<'de>> Deserialize<'de> for TransitionFunction<S> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let mut delta = TransitionFunction::new();
        for t in Vec::<Transition<S>>::deserialize(deserializer)? {
            delta
                .add_transition(t.source, t.symbol, t.target)
                .map_err(D::Error::custom)?;
        }
        Ok(delta)
    }
}
