use std::collections::VecDeque;

use crate::{Set, Symbol};

use super::{StateId, TransitionFunction};

/// Type alias for a minimal representative of a state which is its length-lexicographically minimal
/// access sequence and its state index.
pub type MinimalRepresentative<S> = (Vec<S>, StateId);

/// Breadth-first traversal of a [`TransitionFunction`] starting in some origin. Successors are
/// explored in ascending symbol order, so every reachable state is produced exactly once, together
/// with the length-lexicographically minimal word that reaches it from the origin. The length of
/// that word is the distance of the state from the origin.
#[derive(Debug, Clone)]
pub struct MinimalRepresentatives<'a, S: Symbol> {
    transitions: &'a TransitionFunction<S>,
    seen: Set<StateId>,
    queue: VecDeque<MinimalRepresentative<S>>,
}

impl<'a, S: Symbol> MinimalRepresentatives<'a, S> {
    /// Starts a traversal of `transitions` in `origin`.
    pub fn new(transitions: &'a TransitionFunction<S>, origin: StateId) -> Self {
        let seen = Set::from_iter([origin]);
        let queue = [(vec![], origin)].into_iter().collect();
        Self {
            transitions,
            seen,
            queue,
        }
    }
}

impl<'a, S: Symbol> Iterator for MinimalRepresentatives<'a, S> {
    type Item = MinimalRepresentative<S>;

    fn next(&mut self) -> Option<Self::Item> {
        let (access, q) = self.queue.pop_front()?;
        for (sym, p) in self.transitions.transitions_from(q) {
            if self.seen.insert(p) {
                let mut new_access = access.clone();
                new_access.push(sym);
                self.queue.push_back((new_access, p));
            }
        }
        Some((access, q))
    }
}
