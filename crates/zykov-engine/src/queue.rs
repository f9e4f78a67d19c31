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

//! The shared branch queue.
//!
//! A max-heap keyed by branch depth behind a single mutex. Prioritizing
//! deeper nodes approximates depth-first exploration, which keeps the
//! frontier (and therefore memory) small while pruning aggressively
//! against the best known upper bound; a best-first queue would blow up
//! on exactly the instances worth distributing.
//!
//! Branches move in and out of the queue; the graph inside a branch is
//! never copied by a queue operation.

use crate::branch::Branch;
use std::collections::BinaryHeap;
use std::sync::Mutex;

/// A depth-prioritized queue of branches shared by the worker and the
/// employer thread.
#[derive(Debug, Default)]
pub struct BranchQueue {
    heap: Mutex<BinaryHeap<Branch>>,
}

impl BranchQueue {
    /// Creates an empty queue.
    #[inline]
    pub fn new() -> Self {
        Self {
            heap: Mutex::new(BinaryHeap::new()),
        }
    }

    /// Pushes a branch.
    pub fn push(&self, branch: Branch) {
        self.heap
            .lock()
            .expect("branch queue mutex poisoned")
            .push(branch);
    }

    /// Pops the deepest branch, if any.
    pub fn pop(&self) -> Option<Branch> {
        self.heap
            .lock()
            .expect("branch queue mutex poisoned")
            .pop()
    }

    /// Pops the deepest branch only if at least one other branch remains
    /// for local progress. This is the employer's steal rule: no queue is
    /// ever drained by stealing.
    pub fn steal_if_spare(&self) -> Option<Branch> {
        let mut heap = self.heap.lock().expect("branch queue mutex poisoned");
        if heap.len() >= 2 {
            heap.pop()
        } else {
            None
        }
    }

    /// Number of queued branches.
    pub fn len(&self) -> usize {
        self.heap
            .lock()
            .expect("branch queue mutex poisoned")
            .len()
    }

    /// Returns `true` if no branch is queued.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
