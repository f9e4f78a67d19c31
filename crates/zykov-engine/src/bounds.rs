// Copyright (c) 2025 Felix Kahle.
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

//! # Bound State (Best Upper Bound Holder)
//!
//! The per-process holder of the best coloring upper bound and the best
//! reconstructible branch. It exposes a fast, lock-free upper bound via an
//! atomic and stores the witnessing `Branch` behind a `Mutex` as the
//! source of truth. Every thread of the engine reads the bound; the
//! worker, the gatherer and the terminator write it.
//!
//! ## Motivation
//!
//! - Fast pruning checks: a cheap atomic upper bound lets the worker
//!   discard dominated nodes without locking.
//! - Correctness by locking: the snapshot used for coloring
//!   reconstruction is a composite value and lives under a `Mutex`.
//! - Simple sentinel: the bound starts at `u16::MAX` meaning "no coloring
//!   observed yet".
//!
//! ## Ordering
//!
//! Atomic accesses use `Ordering::Relaxed`. The bound is monotonically
//! non-increasing (every write goes through `fetch_min`), so a stale
//! read can only defer a pruning decision, never un-prune a node. The
//! snapshot mutex orders the composite updates that reconstruction
//! depends on.

use crate::branch::Branch;
use std::sync::{
    atomic::{AtomicU16, Ordering},
    Mutex,
};

/// The sentinel bound meaning "no coloring observed yet".
pub const UNBOUNDED: u16 = u16::MAX;

/// Concurrent holder of the best upper bound and its witnessing branch.
#[derive(Debug, Default)]
pub struct BoundState {
    /// Best upper bound on χ ever observed by this process. Monotonically
    /// non-increasing.
    best_ub: AtomicU16,
    /// The best (lowest-ub) branch complete enough to reconstruct a
    /// coloring from. Holds a cloned graph, decoupling its lifetime from
    /// any worker's active branch.
    current_best: Mutex<Option<Branch>>,
}

impl BoundState {
    /// Creates a bound state at the sentinel maximum.
    #[inline]
    pub fn new() -> Self {
        Self {
            best_ub: AtomicU16::new(UNBOUNDED),
            current_best: Mutex::new(None),
        }
    }

    /// The current best upper bound.
    #[inline]
    pub fn best_ub(&self) -> u16 {
        self.best_ub.load(Ordering::Relaxed)
    }

    /// Lowers the best upper bound to `ub` if it improves it. Returns the
    /// previous bound.
    #[inline]
    pub fn record_ub(&self, ub: u16) -> u16 {
        self.best_ub.fetch_min(ub, Ordering::Relaxed)
    }

    /// Attempts to install `branch` as the new best snapshot, lowering the
    /// atomic bound alongside. Returns `true` if the snapshot was taken.
    ///
    /// The candidate is compared against the branch actually stored under
    /// the mutex, not against the atomic hint: another thread may have
    /// installed a better snapshot while this one was waiting for the
    /// lock.
    pub fn try_install(&self, branch: Branch) -> bool {
        let mut guard = self
            .current_best
            .lock()
            .expect("best branch mutex poisoned");
        if let Some(current) = guard.as_ref() {
            if branch.ub >= current.ub {
                return false;
            }
        }
        self.best_ub.fetch_min(branch.ub, Ordering::Relaxed);
        *guard = Some(branch);
        true
    }

    /// A clone of the best snapshot, if any.
    pub fn snapshot(&self) -> Option<Branch> {
        self.current_best
            .lock()
            .expect("best branch mutex poisoned")
            .clone()
    }
}

impl std::fmt::Display for BoundState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "BoundState(best_ub: {})", self.best_ub())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;
    use zykov_graph::Graph;

    fn candidate(ub: u16) -> Branch {
        Branch::new(Graph::new(2), 1, ub, 1)
    }

    #[test]
    fn test_initial_state() {
        let bounds = BoundState::new();
        assert_eq!(bounds.best_ub(), UNBOUNDED);
        assert!(bounds.snapshot().is_none());
    }

    #[test]
    fn test_record_ub_is_monotone() {
        let bounds = BoundState::new();
        assert_eq!(bounds.record_ub(10), UNBOUNDED);
        assert_eq!(bounds.best_ub(), 10);

        // A worse value never raises the bound.
        bounds.record_ub(12);
        assert_eq!(bounds.best_ub(), 10);

        bounds.record_ub(7);
        assert_eq!(bounds.best_ub(), 7);
    }

    #[test]
    fn test_install_better_updates_bound_and_snapshot() {
        let bounds = BoundState::new();
        assert!(bounds.try_install(candidate(9)));
        assert_eq!(bounds.best_ub(), 9);
        assert_eq!(bounds.snapshot().unwrap().ub, 9);
    }

    #[test]
    fn test_reject_worse_or_equal_candidates() {
        let bounds = BoundState::new();
        assert!(bounds.try_install(candidate(5)));
        assert!(!bounds.try_install(candidate(5)));
        assert!(!bounds.try_install(candidate(8)));
        assert_eq!(bounds.best_ub(), 5);
        assert_eq!(bounds.snapshot().unwrap().ub, 5);
    }

    #[test]
    fn test_concurrent_installs_minimum_wins() {
        let bounds = Arc::new(BoundState::new());
        let ubs = vec![30u16, 20, 40, 5, 12, 7, 50, 6, 9];

        let mut handles = Vec::new();
        for ub in ubs.iter().copied() {
            let bounds = Arc::clone(&bounds);
            handles.push(thread::spawn(move || bounds.try_install(candidate(ub))));
        }
        let results: Vec<bool> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert!(results.iter().any(|&r| r), "at least one install succeeds");

        let min = *ubs.iter().min().unwrap();
        assert_eq!(bounds.best_ub(), min);
        assert_eq!(bounds.snapshot().unwrap().ub, min);
    }

    #[test]
    fn test_gatherer_race_cannot_raise_bound() {
        // A gathered global minimum arriving after a local improvement
        // must not undo it.
        let bounds = BoundState::new();
        bounds.record_ub(6);
        bounds.record_ub(8); // stale gather result
        assert_eq!(bounds.best_ub(), 6);
    }
}
