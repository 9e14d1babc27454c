//! Append-only store of derived states.

use crate::CachedGameState;
use sgfplay_core::BoardPosition;
use sgfplay_jitter::Offset2D;
use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock};

/// States of one game indexed by move index.
///
/// Entry `i` always holds move index `i`; the only way to grow the store is
/// appending the next index. Readers take the lock only long enough to clone
/// an `Arc`.
#[derive(Debug, Default)]
pub struct GameStateCache {
    states: RwLock<Vec<Arc<CachedGameState>>>,
}

impl GameStateCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.states.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, index: usize) -> Option<Arc<CachedGameState>> {
        self.states
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(index)
            .cloned()
    }

    /// Append the state for the next index.
    ///
    /// Returns false, leaving the store untouched, if `state.move_index` is
    /// not the current length.
    pub fn push(&self, state: Arc<CachedGameState>) -> bool {
        let mut states = self.states.write().unwrap_or_else(PoisonError::into_inner);
        if state.move_index != states.len() {
            return false;
        }
        states.push(state);
        true
    }

    /// Every cached state, in order
    pub fn snapshot(&self) -> Vec<Arc<CachedGameState>> {
        self.states.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Swap the offsets of the first `offsets.len()` states in one step.
    ///
    /// Board, captures and bowls are shared with the replaced states.
    pub fn replace_offsets(&self, offsets: Vec<BTreeMap<BoardPosition, Offset2D>>) -> usize {
        let mut states = self.states.write().unwrap_or_else(PoisonError::into_inner);
        let mut replaced = 0;
        for (slot, offsets) in states.iter_mut().zip(offsets) {
            *slot = Arc::new(slot.with_offsets(offsets));
            replaced += 1;
        }
        replaced
    }
}
