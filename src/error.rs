use std::fmt::Display;

use crate::{StateId, StateStatus};

/// Records that a labelled sample ended in a state which already carries the opposite
/// label. `sample` is the position of the offending sample in the order in which samples
/// were handed to the builder.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub struct LabelConflict {
    /// Position of the sample that caused the contradiction.
    pub sample: usize,
    /// The state in which the sample ended.
    pub state: StateId,
    /// The status the state had before the sample was inserted.
    pub existing: StateStatus,
    /// The status the sample asked for.
    pub attempted: StateStatus,
}

impl Display for LabelConflict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "sample {} reaches state {} which is {}, cannot mark it as {}",
            self.sample, self.state, self.existing, self.attempted
        )
    }
}

/// Represents the different types of error that can occur when a [`crate::Dfa`] is mutated or
/// built up from samples. A failed operation never leaves a partially applied change behind.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum DfaError {
    /// A state identifier outside of the dense range `0..size` was used.
    InvalidState {
        /// The offending identifier.
        state: StateId,
        /// The number of states at the time of the call.
        size: usize,
    },
    /// The pair `(source, symbol)` already leads to `existing`, so it cannot also lead to
    /// `attempted`.
    Conflict {
        /// Source state of the transition.
        source: StateId,
        /// Rendering of the symbol labelling the transition.
        symbol: String,
        /// The target that is already registered.
        existing: StateId,
        /// The target that was rejected.
        attempted: StateId,
    },
    /// A sample contradicts the label that an earlier sample put on the same state.
    LabelConsistency(LabelConflict),
}

impl Display for DfaError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DfaError::InvalidState { state, size } => {
                write!(f, "State {} does not exist, the DFA has {} states", state, size)
            }
            DfaError::Conflict {
                source,
                symbol,
                existing,
                attempted,
            } => write!(
                f,
                "Transition {} --{}--> {} conflicts with existing target {}",
                source, symbol, attempted, existing
            ),
            DfaError::LabelConsistency(conflict) => {
                write!(f, "Inconsistent labels, {}", conflict)
            }
        }
    }
}

impl std::error::Error for DfaError {}

impl From<LabelConflict> for DfaError {
    fn from(value: LabelConflict) -> Self {
        DfaError::LabelConsistency(value)
    }
}

#[cfg(test)]
mod tests {
    use crate::StateStatus;

    use super::{DfaError, LabelConflict};

    #[test]
    fn error_messages() {
        let conflict = LabelConflict {
            sample: 1,
            state: 3,
            existing: StateStatus::Accepting,
            attempted: StateStatus::Rejecting,
        };
        assert_eq!(
            DfaError::from(conflict).to_string(),
            "Inconsistent labels, sample 1 reaches state 3 which is ACCEPTING, cannot mark it as REJECTING"
        );
        assert_eq!(
            DfaError::InvalidState { state: 4, size: 2 }.to_string(),
            "State 4 does not exist, the DFA has 2 states"
        );
        assert_eq!(
            DfaError::Conflict {
                source: 0,
                symbol: "a".to_string(),
                existing: 1,
                attempted: 2
            }
            .to_string(),
            "Transition 0 --a--> 2 conflicts with existing target 1"
        );
    }
}
