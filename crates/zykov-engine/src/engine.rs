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

//! # The Per-Rank Engine
//!
//! One engine instance is one rank of the distributed search. `solve`
//! builds the shared context, derives the balanced seed if configured,
//! and pins the four protocol roles to four scoped threads:
//!
//! - **T0 terminator**: termination detection; master coordination on
//!   rank 0.
//! - **T1 gatherer**: periodic best-bound all-gather.
//! - **T2 employer**: serves incoming steal requests.
//! - **T3 worker**: the branch-and-bound search itself.
//!
//! A role thread that fails raises the process-wide termination flag on
//! its way out, so the siblings unwind through their cancelable waits
//! instead of hanging; the first error surfaces from `solve`. The final
//! barrier mirrors the fabric-wide close-out every rank must reach
//! before its endpoint may go away.

use crate::config::EngineConfig;
use crate::context::EngineContext;
use crate::employer::run_employer;
use crate::error::EngineError;
use crate::fabric::Fabric;
use crate::gatherer::run_gatherer;
use crate::partition::initial_seed;
use crate::strategy::Strategies;
use crate::terminator::{run_terminator, TerminatorVerdict};
use crate::worker::{run_worker, ChildPolicy};
use std::time::{Duration, Instant};

/// Role threads per rank.
pub const THREADS_PER_RANK: usize = 4;

/// What a finished run reports.
#[derive(Debug, Clone)]
pub struct SolveOutcome {
    /// The best upper bound this rank holds at shutdown; on rank 0 this
    /// is the reported chromatic bound.
    pub best_ub: u16,
    /// Full coloring of the root instance witnessing the bound. Present
    /// on rank 0.
    pub coloring: Option<Vec<u16>>,
    /// Wall-clock duration of the run.
    pub wall_time: Duration,
    /// Time at which the optimum was declared, if the run did not time
    /// out.
    pub optimum_time: Option<Duration>,
    /// `true` if the wall-clock budget ended the run.
    pub timed_out: bool,
}

impl std::fmt::Display for SolveOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "SolveOutcome(best_ub: {}, timed_out: {}, wall_time: {:.3}s)",
            self.best_ub,
            self.timed_out,
            self.wall_time.as_secs_f64()
        )
    }
}

/// One rank of the distributed branch-and-bound search.
#[derive(Debug)]
pub struct Engine<F> {
    fabric: F,
    config: EngineConfig,
}

impl<F: Fabric> Engine<F> {
    /// Creates the engine for one fabric endpoint.
    #[inline]
    pub fn new(fabric: F, config: EngineConfig) -> Self {
        Self { fabric, config }
    }

    /// Runs the search on this rank until global termination and returns
    /// the rank's outcome. Rank 0's outcome carries the reconstructed
    /// coloring.
    pub fn solve(
        &self,
        root: zykov_graph::Graph,
        mut strategies: Strategies,
    ) -> Result<SolveOutcome, EngineError> {
        let start = Instant::now();
        let ctx = EngineContext::new(root, self.config.clone(), self.fabric.rank())?;

        let (policy, seed) = if self.config.balanced {
            let seed = initial_seed(
                &ctx.root,
                self.fabric.rank(),
                self.fabric.size(),
                &mut strategies,
            );
            (ChildPolicy::Both, Some(seed))
        } else {
            (ChildPolicy::DepthRankGated, None)
        };

        let result = std::thread::scope(|scope| -> Result<TerminatorVerdict, EngineError> {
            let ctx = &ctx;
            let fabric = &self.fabric;

            let terminator = scope.spawn(move || {
                let result = run_terminator(ctx, fabric);
                if result.is_err() {
                    ctx.raise_termination();
                }
                result
            });
            let gatherer = scope.spawn(move || {
                let result = run_gatherer(ctx, fabric);
                if result.is_err() {
                    ctx.raise_termination();
                }
                result
            });
            let employer = scope.spawn(move || {
                let result = run_employer(ctx, fabric);
                if result.is_err() {
                    ctx.raise_termination();
                }
                result
            });
            let worker = scope.spawn(move || {
                let result = run_worker(ctx, fabric, strategies, policy, seed);
                if result.is_err() {
                    ctx.raise_termination();
                }
                result
            });

            let verdict = terminator.join().expect("terminator thread panicked")?;
            gatherer.join().expect("gatherer thread panicked")?;
            employer.join().expect("employer thread panicked")?;
            worker.join().expect("worker thread panicked")?;
            Ok(verdict)
        });

        // Every rank reaches the close-out barrier, error or not, so no
        // peer is left waiting on a rank that failed.
        let barrier_result = self.fabric.barrier();
        let verdict = result?;
        barrier_result?;

        Ok(SolveOutcome {
            best_ub: ctx.bounds.best_ub(),
            coloring: verdict.coloring,
            wall_time: start.elapsed(),
            optimum_time: verdict.optimum_time,
            timed_out: verdict.timed_out,
        })
    }
}
