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

//! Per-engine shared state.
//!
//! Everything the four role threads share lives here: the termination
//! flag, the branch queue, the bound state, the trace sink, the pristine
//! root graph and the run configuration. Bundling it per engine instead
//! of using process globals lets any number of engines (one per rank of
//! the in-process fabric) coexist in one process.
//!
//! Lock discipline: the queue, trace and best-branch mutexes are each
//! acquired on their own; no code path holds two of them at once, and no
//! thread holds any of them while waiting on a message.

use crate::bounds::BoundState;
use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::queue::BranchQueue;
use crate::trace::SearchTrace;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use zykov_graph::Graph;

/// The state shared by an engine's role threads.
#[derive(Debug)]
pub struct EngineContext {
    /// Run settings, identical across ranks.
    pub config: EngineConfig,
    /// The pristine root instance; received branches replay against it
    /// and the final coloring is expressed on it.
    pub root: Graph,
    /// The local branch frontier.
    pub queue: BranchQueue,
    /// Best upper bound and best reconstructible branch.
    pub bounds: BoundState,
    /// Per-rank search trace.
    pub trace: SearchTrace,
    termination: AtomicBool,
    start: Instant,
}

impl EngineContext {
    /// Builds the context for one rank, opening the trace file if the
    /// configuration asks for one.
    pub fn new(root: Graph, config: EngineConfig, rank: usize) -> Result<Self, EngineError> {
        let trace = match &config.trace_dir {
            Some(dir) => SearchTrace::create(dir, rank).map_err(EngineError::Trace)?,
            None => SearchTrace::disabled(),
        };
        Ok(Self {
            config,
            root,
            queue: BranchQueue::new(),
            bounds: BoundState::new(),
            trace,
            termination: AtomicBool::new(false),
            start: Instant::now(),
        })
    }

    /// The process-wide termination flag, for cancelable waits.
    #[inline]
    pub fn termination_flag(&self) -> &AtomicBool {
        &self.termination
    }

    /// Returns `true` once the run is shutting down.
    #[inline]
    pub fn terminated(&self) -> bool {
        self.termination.load(Ordering::Relaxed)
    }

    /// Raises the termination flag. Only the terminator thread and
    /// erroring role threads call this.
    #[inline]
    pub fn raise_termination(&self) {
        self.termination.store(true, Ordering::Relaxed);
    }

    /// Wall-clock time since this engine started.
    #[inline]
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Returns `true` once the wall-clock budget is exhausted.
    #[inline]
    pub fn timed_out(&self) -> bool {
        self.elapsed() >= self.config.timeout
    }
}
