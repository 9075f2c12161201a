//! Library for building and inspecting deterministic finite automata that are inferred
//! from labelled sample strings.
//!
//! The central entry point is the [`PtaBuilder`], which consumes [`StringSample`]s one
//! at a time and grows a prefix tree acceptor in the form of a [`Dfa`].
#![warn(missing_docs)]

/// Symbols and the growing alphabet that collects them.
pub mod alphabet;
pub use alphabet::{Alphabet, Symbol};

mod error;
pub use error::{DfaError, LabelConflict};

/// Building blocks of the transition structure: states, the transition function,
/// breadth-first traversal and DOT output.
pub mod ts;
pub use ts::{StateId, StateStatus, ToDot, Transition, TransitionFunction};

mod dfa;
pub use dfa::Dfa;

/// Labelled sample strings, datasets and their file formats.
#[macro_use]
pub mod sample;
pub use sample::{
    abbadingo::AbbadingoParseError, Dataset, DatasetError, DatasetFormat, StringSample,
};

/// Construction of prefix tree acceptors.
pub mod prefixtree;
pub use prefixtree::{prefix_tree, ConsistencyMode, PtaBuilder, PtaKind};

/// Hash map used throughout the crate.
#[cfg(feature = "ahash")]
pub type Map<K, V> = std::collections::HashMap<K, V, ahash::RandomState>;
/// Hash map used throughout the crate.
#[cfg(not(feature = "ahash"))]
pub type Map<K, V> = std::collections::HashMap<K, V>;

/// Hash set used throughout the crate.
#[cfg(feature = "ahash")]
pub type Set<T> = std::collections::HashSet<T, ahash::RandomState>;
/// Hash set used throughout the crate.
#[cfg(not(feature = "ahash"))]
pub type Set<T> = std::collections::HashSet<T>;

/// Re-exports the types that are needed in almost every use of the crate.
pub mod prelude {
    pub use crate::{
        prefix_tree, Alphabet, ConsistencyMode, Dataset, DatasetError, DatasetFormat, Dfa,
        DfaError, LabelConflict, PtaBuilder, PtaKind, StateId, StateStatus, StringSample, Symbol,
        ToDot,
    };
}
