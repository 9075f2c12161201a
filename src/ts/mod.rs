/// States and their tri-state status.
pub mod state;
pub use state::{State, StateStatus};

/// The deterministic, partial transition function.
pub mod transition;
pub use transition::{Transition, TransitionFunction};

mod reachable;
pub use reachable::{MinimalRepresentative, MinimalRepresentatives};

/// Conversion into the graphviz DOT format.
pub mod dot;
pub use dot::ToDot;

/// Identifies a state. Identifiers are handed out densely, starting from 0, and never change
/// once assigned.
pub type StateId = usize;
