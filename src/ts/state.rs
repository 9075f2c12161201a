use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// Classification of a state according to the label evidence that was collected for it.
/// A state on which no sample has ended yet is [`StateStatus::Unknown`].
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum StateStatus {
    /// Some accepted sample ends in the state.
    Accepting,
    /// Some rejected sample ends in the state.
    Rejecting,
    /// No evidence either way.
    #[default]
    Unknown,
}

impl StateStatus {
    /// Returns true iff `self` is [`StateStatus::Accepting`].
    pub fn is_accepting(&self) -> bool {
        matches!(self, StateStatus::Accepting)
    }

    /// Returns true iff `self` is [`StateStatus::Rejecting`].
    pub fn is_rejecting(&self) -> bool {
        matches!(self, StateStatus::Rejecting)
    }

    /// Returns true iff `self` is [`StateStatus::Unknown`].
    pub fn is_unknown(&self) -> bool {
        matches!(self, StateStatus::Unknown)
    }

    /// A state is labelled if it is either accepting or rejecting.
    pub fn is_labelled(&self) -> bool {
        !self.is_unknown()
    }

    /// Two statuses contradict each other if one is accepting and the other one is rejecting.
    /// [`StateStatus::Unknown`] is compatible with everything.
    pub fn contradicts(&self, other: StateStatus) -> bool {
        matches!(
            (self, other),
            (StateStatus::Accepting, StateStatus::Rejecting)
                | (StateStatus::Rejecting, StateStatus::Accepting)
        )
    }
}

impl Display for StateStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StateStatus::Accepting => write!(f, "ACCEPTING"),
            StateStatus::Rejecting => write!(f, "REJECTING"),
            StateStatus::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

/// A state of a [`crate::Dfa`]. It only stores the status, the identifier of a state is its
/// position in the state list of the owning automaton.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct State {
    status: StateStatus,
}

impl State {
    /// Creates a new state with the given status.
    pub fn new(status: StateStatus) -> Self {
        Self { status }
    }

    /// Returns the current status.
    pub fn status(&self) -> StateStatus {
        self.status
    }

    /// Overwrites the status, any transition between statuses is allowed here.
    pub fn set_status(&mut self, status: StateStatus) {
        self.status = status;
    }
}
