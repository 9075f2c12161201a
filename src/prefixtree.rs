use tracing::{debug, trace, warn};

use crate::{Dfa, DfaError, LabelConflict, StateId, StateStatus, StringSample, Symbol};

/// Determines which samples make it into the prefix tree.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Default)]
pub enum PtaKind {
    /// Only accepted and unlabelled samples are inserted, rejected ones are skipped.
    Pta,
    /// The augmented prefix tree acceptor, which also inserts rejected samples and marks
    /// the states they reach as rejecting.
    #[default]
    Apta,
}

/// Decides what happens when a sample contradicts the label of the state it reaches.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Default)]
pub enum ConsistencyMode {
    /// Abort the insertion with [`DfaError::LabelConsistency`].
    #[default]
    Strict,
    /// Keep the label that was there first and record the contradiction, see
    /// [`PtaBuilder::conflicts`].
    BestEffort,
}

/// Incrementally grows a prefix tree acceptor from labelled samples.
///
/// Every sample is walked from the starting state. Existing transitions are followed and
/// missing ones are created together with a fresh state of status [`StateStatus::Unknown`],
/// so words with a common prefix share the states of that prefix. Once the word is consumed,
/// the label of the sample is put on the state that was reached. The resulting [`Dfa`] is a
/// tree rooted in the starting state and its accepting states are exactly those reached by
/// accepted samples.
///
/// # Example
/// ```
/// use dfa_toolkit::{PtaBuilder, StateStatus, StringSample};
///
/// let mut builder = PtaBuilder::new();
/// builder.insert(&StringSample::accepted("ab".chars())).unwrap();
/// builder.insert(&StringSample::rejected("a".chars())).unwrap();
/// let pta = builder.finish();
/// assert_eq!(pta.size(), 3);
/// assert_eq!(pta.classify(&['a', 'b']), StateStatus::Accepting);
/// assert_eq!(pta.classify(&['a']), StateStatus::Rejecting);
/// ```
#[derive(Debug, Clone)]
pub struct PtaBuilder<S: Symbol> {
    dfa: Dfa<S>,
    kind: PtaKind,
    mode: ConsistencyMode,
    conflicts: Vec<LabelConflict>,
    seen: usize,
}

impl<S: Symbol> PtaBuilder<S> {
    /// Creates a builder for an augmented prefix tree in strict mode, which holds just the
    /// starting state.
    pub fn new() -> Self {
        Self {
            dfa: Dfa::new(),
            kind: PtaKind::default(),
            mode: ConsistencyMode::default(),
            conflicts: vec![],
            seen: 0,
        }
    }

    /// Sets the [`PtaKind`].
    pub fn with_kind(mut self, kind: PtaKind) -> Self {
        self.kind = kind;
        self
    }

    /// Sets the [`ConsistencyMode`].
    pub fn with_mode(mut self, mode: ConsistencyMode) -> Self {
        self.mode = mode;
        self
    }

    /// Inserts a single sample and returns the state in which its word ends. Rejected samples
    /// are skipped when building a [`PtaKind::Pta`], in which case `None` is returned.
    ///
    /// If the sample contradicts the label of the state it ends in, strict mode returns
    /// [`DfaError::LabelConsistency`] and leaves every status unchanged. States created while
    /// walking the word are kept, they are valid extensions of the tree either way.
    pub fn insert(&mut self, sample: &StringSample<S>) -> Result<Option<StateId>, DfaError> {
        let index = self.seen;
        self.seen += 1;

        if self.kind == PtaKind::Pta && sample.label.is_rejecting() {
            debug!("skipping rejected sample {index} {:?}", sample);
            return Ok(None);
        }

        let mut current = self.dfa.starting_state();
        for &sym in &sample.word {
            current = match self.dfa.transition(current, sym) {
                Some(next) => {
                    trace!("following {current} --{}--> {next}", sym.show());
                    next
                }
                None => {
                    let next = self.dfa.add_state(StateStatus::Unknown);
                    self.dfa.add_transition(current, sym, next)?;
                    trace!("created {current} --{}--> {next}", sym.show());
                    next
                }
            };
        }

        if sample.label.is_unknown() {
            debug!("unlabelled sample {index} ends in state {current}");
            return Ok(Some(current));
        }

        let existing = self
            .dfa
            .status(current)
            .ok_or(DfaError::InvalidState {
                state: current,
                size: self.dfa.size(),
            })?;
        if existing.contradicts(sample.label) {
            let conflict = LabelConflict {
                sample: index,
                state: current,
                existing,
                attempted: sample.label,
            };
            return match self.mode {
                ConsistencyMode::Strict => Err(DfaError::LabelConsistency(conflict)),
                ConsistencyMode::BestEffort => {
                    warn!("ignoring label: {conflict}");
                    self.conflicts.push(conflict);
                    Ok(Some(current))
                }
            };
        }

        self.dfa.set_status(current, sample.label)?;
        debug!("sample {index} marks state {current} as {}", sample.label);
        Ok(Some(current))
    }

    /// Inserts all samples in the order in which they are produced, stopping at the first
    /// error.
    pub fn extend<'a, I>(&mut self, samples: I) -> Result<(), DfaError>
    where
        I: IntoIterator<Item = &'a StringSample<S>>,
        S: 'a,
    {
        for sample in samples {
            self.insert(sample)?;
        }
        Ok(())
    }

    /// The contradictions that were ignored in [`ConsistencyMode::BestEffort`], in the order
    /// in which they occurred.
    pub fn conflicts(&self) -> &[LabelConflict] {
        &self.conflicts
    }

    /// The tree built so far.
    pub fn dfa(&self) -> &Dfa<S> {
        &self.dfa
    }

    /// Consumes the builder and returns the tree.
    pub fn finish(self) -> Dfa<S> {
        self.dfa
    }
}

impl<S: Symbol> Default for PtaBuilder<S> {
    fn default() -> Self {
        Self::new()
    }
}

/// Builds the augmented prefix tree acceptor of the given samples in strict mode.
pub fn prefix_tree<'a, S, I>(samples: I) -> Result<Dfa<S>, DfaError>
where
    S: Symbol + 'a,
    I: IntoIterator<Item = &'a StringSample<S>>,
{
    let mut builder = PtaBuilder::new();
    builder.extend(samples)?;
    Ok(builder.finish())
}
