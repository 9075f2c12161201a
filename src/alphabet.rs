use std::{
    fmt::{Debug, Display},
    hash::Hash,
};

use itertools::Itertools;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::Map;

/// A symbol of an alphabet, which is also the type of the symbols in a word and the label
/// of a transition. Any small, totally ordered value type works, the usual choices are
/// `char` for hand-written samples and `u32` or `usize` for datasets read from files.
pub trait Symbol: PartialEq + Eq + Debug + Copy + Ord + PartialOrd + Hash {
    /// We do not want to force symbols to implement `Display` so we use this method for turning a single
    /// symbol into a `String`.
    fn show(&self) -> String;
}

impl<S: PartialEq + Eq + Debug + Copy + Ord + PartialOrd + Hash + Display> Symbol for S {
    fn show(&self) -> String {
        self.to_string()
    }
}

/// The set of symbols that have been observed so far. An alphabet is never declared up front,
/// instead it grows whenever a new symbol is encountered. Each symbol is assigned a dense index
/// in the order in which it was first seen.
///
/// # Example
/// ```
/// use dfa_toolkit::Alphabet;
///
/// let mut alphabet = Alphabet::from_iter(['b', 'a']);
/// assert_eq!(alphabet.insert('c'), (2, true));
/// assert_eq!(alphabet.insert('a'), (1, false));
/// assert_eq!(alphabet.sorted(), vec!['a', 'b', 'c']);
/// ```
#[derive(Clone)]
pub struct Alphabet<S: Symbol> {
    symbols: Vec<S>,
    indices: Map<S, usize>,
}

impl<S: Symbol> Alphabet<S> {
    /// Creates a new, empty alphabet.
    pub fn new() -> Self {
        Self {
            symbols: Vec::new(),
            indices: Map::default(),
        }
    }

    /// Adds `symbol` to the alphabet if it is not yet present. Returns the index of the symbol
    /// together with a flag that is `true` iff the symbol was newly inserted.
    pub fn insert(&mut self, symbol: S) -> (usize, bool) {
        if let Some(&index) = self.indices.get(&symbol) {
            return (index, false);
        }
        let index = self.symbols.len();
        self.symbols.push(symbol);
        self.indices.insert(symbol, index);
        (index, true)
    }

    /// Returns true if the given symbol is present in the alphabet.
    pub fn contains(&self, symbol: S) -> bool {
        self.indices.contains_key(&symbol)
    }

    /// Returns the index that was assigned to `symbol`, if it is part of the alphabet.
    pub fn index_of(&self, symbol: S) -> Option<usize> {
        self.indices.get(&symbol).copied()
    }

    /// Returns the symbol with the given index.
    pub fn symbol(&self, index: usize) -> Option<S> {
        self.symbols.get(index).copied()
    }

    /// The number of distinct symbols.
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    /// Returns true if no symbol has been observed yet.
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Iterates over the symbols in the order in which they were first seen.
    pub fn iter(&self) -> impl Iterator<Item = S> + '_ {
        self.symbols.iter().copied()
    }

    /// Returns all symbols in ascending order.
    pub fn sorted(&self) -> Vec<S> {
        self.symbols.iter().copied().sorted().collect()
    }
}

impl<S: Symbol> Default for Alphabet<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Symbol> FromIterator<S> for Alphabet<S> {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        let mut alphabet = Self::new();
        for symbol in iter {
            alphabet.insert(symbol);
        }
        alphabet
    }
}

impl<S: Symbol> Extend<S> for Alphabet<S> {
    fn extend<T: IntoIterator<Item = S>>(&mut self, iter: T) {
        for symbol in iter {
            self.insert(symbol);
        }
    }
}

impl<S: Symbol> PartialEq for Alphabet<S> {
    fn eq(&self, other: &Self) -> bool {
        self.symbols == other.symbols
    }
}

impl<S: Symbol> Eq for Alphabet<S> {}

impl<S: Symbol> Debug for Alphabet<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{{{}}}",
            self.symbols.iter().map(|sym| sym.show()).join(", ")
        )
    }
}

impl<S: Symbol + Serialize> Serialize for Alphabet<S> {
    fn serialize<Ser: Serializer>(&self, serializer: Ser) -> Result<Ser::Ok, Ser::Error> {
        self.symbols.serialize(serializer)
    }
}

impl<'de, S: Symbol + Deserialize<'de>> Deserialize<'de> for Alphabet<S> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(Vec::<S>::deserialize(deserializer)?.into_iter().collect())
    }
}

/// Helper macro for creating an [`Alphabet`]. Is called simply with a list of symbols
/// that are separated by commata.
#[macro_export]
macro_rules! alphabet {
    ($($c:expr),* $(,)?) => {
        $crate::alphabet::Alphabet::from_iter([$($c),*])
    };
}
