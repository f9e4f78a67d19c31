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

//! The solution gatherer (thread T1).
//!
//! Every `sol_gather_period` the gatherer all-gathers the per-rank best
//! upper bounds and installs the global minimum locally. Piggybacking
//! bound propagation on a collective keeps the chatter at O(P) per
//! period regardless of search rate, and gives best-UB eventual
//! consistency with a bounded lag. The collective requires every rank on
//! the same cadence, which is why the period is part of the shared
//! configuration.

use crate::context::EngineContext;
use crate::error::EngineError;
use crate::fabric::Fabric;
use std::time::{Duration, Instant};

/// Sleep between cadence checks.
const IDLE_INTERVAL: Duration = Duration::from_millis(100);

/// Runs the gatherer loop until termination.
pub fn run_gatherer<F: Fabric>(ctx: &EngineContext, fabric: &F) -> Result<(), EngineError> {
    let mut last_gather = Instant::now();

    while !ctx.terminated() {
        if last_gather.elapsed() >= ctx.config.sol_gather_period {
            let local = ctx.bounds.best_ub();
            let Some(gathered) =
                fabric.all_gather_word(local, ctx.termination_flag())?
            else {
                // Canceled mid-collective by termination.
                return Ok(());
            };

            let global = gathered.iter().copied().min().unwrap_or(local);
            ctx.bounds.record_ub(global);
            ctx.trace
                .log("gatherer", 0, &format!("[UPDATE] gathered best_ub {global}"));

            last_gather = Instant::now();
        }
        std::thread::sleep(IDLE_INTERVAL);
    }
    Ok(())
}
