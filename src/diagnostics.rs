//! Runtime diagnostics for the LED subsystem.
//!
//! Keeps a fixed-capacity ring of the most recent animation-state
//! transitions. Purely advisory, for bench debugging over the serial
//! console — nothing in the control path reads it back.

use heapless::Deque;
use log::info;

use crate::drivers::animator::AnimationState;

/// Number of transitions retained. Old entries are evicted silently.
const HISTORY_SLOTS: usize = 16;

/// One recorded transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionRecord {
    /// Monotonic timestamp of the transition (ms since boot, wrapping).
    pub at_ms: u32,
    pub from: AnimationState,
    pub to: AnimationState,
}

/// Fixed-capacity transition history. Stack-allocated, no heap.
#[derive(Default)]
pub struct TransitionLog {
    entries: Deque<TransitionRecord, HISTORY_SLOTS>,
}

impl TransitionLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a transition, evicting the oldest entry when full.
    pub fn record(&mut self, at_ms: u32, from: AnimationState, to: AnimationState) {
        let record = TransitionRecord { at_ms, from, to };
        if self.entries.is_full() {
            let _ = self.entries.pop_front();
        }
        // Cannot fail: a slot was just freed if needed.
        let _ = self.entries.push_back(record);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Oldest-first iteration over the retained transitions.
    pub fn iter(&self) -> impl Iterator<Item = &TransitionRecord> {
        self.entries.iter()
    }

    /// Print the retained history to the log (serial console on hardware).
    pub fn dump(&self) {
        info!("led transition history ({} entries):", self.len());
        for record in self.iter() {
            info!(
                "  t+{}ms {:?} -> {:?}",
                record.at_ms, record.from, record.to
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_in_order() {
        let mut log = TransitionLog::new();
        assert!(log.is_empty());
        log.record(10, AnimationState::Idle, AnimationState::Recording);
        log.record(20, AnimationState::Recording, AnimationState::Uploading);
        assert_eq!(log.len(), 2);
        let first = log.iter().next().unwrap();
        assert_eq!(first.at_ms, 10);
        assert_eq!(first.to, AnimationState::Recording);
    }

    #[test]
    fn evicts_oldest_when_full() {
        let mut log = TransitionLog::new();
        for i in 0..HISTORY_SLOTS as u32 + 4 {
            log.record(i, AnimationState::Idle, AnimationState::Error);
        }
        assert_eq!(log.len(), HISTORY_SLOTS);
        // The 4 oldest entries (t=0..3) were evicted.
        assert_eq!(log.iter().next().unwrap().at_ms, 4);
    }
}
