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

//! Running a whole cluster in one process.
//!
//! Builds a [`LocalFabric`] mesh of P ranks and runs one engine per rank
//! on its own thread, P x 4 role threads in total. Every rank gets its
//! own clone of the root instance and its own heuristic bundle from the
//! factory, mirroring how each process of a multi-process deployment
//! loads the instance and constructs its strategies on its own.
//!
//! The returned outcome is rank 0's: the master holds the reconstructed
//! coloring. Any rank failing fails the run, matching the
//! abort-the-whole-job semantics of a fabric error.

use crate::config::EngineConfig;
use crate::engine::{Engine, SolveOutcome};
use crate::error::EngineError;
use crate::fabric::{local::LocalFabric, Fabric};
use crate::strategy::Strategies;
use zykov_graph::Graph;

/// Runs the distributed search over `workers` in-process ranks and
/// returns the master's outcome.
///
/// # Panics
///
/// Panics if `workers` is zero.
pub fn run_cluster<S>(
    root: &Graph,
    workers: usize,
    config: EngineConfig,
    make_strategies: S,
) -> Result<SolveOutcome, EngineError>
where
    S: Fn(usize) -> Strategies,
{
    assert!(workers > 0, "called `run_cluster` with zero workers");

    let endpoints = LocalFabric::mesh(workers);

    std::thread::scope(|scope| {
        let mut handles = Vec::with_capacity(workers);
        for fabric in endpoints {
            let rank = fabric.rank();
            let config = config.clone();
            let root = root.clone();
            let strategies = make_strategies(rank);
            handles.push(scope.spawn(move || Engine::new(fabric, config).solve(root, strategies)));
        }

        let mut master_outcome = None;
        for (rank, handle) in handles.into_iter().enumerate() {
            let outcome = handle.join().expect("engine rank thread panicked")?;
            if rank == 0 {
                master_outcome = Some(outcome);
            }
        }
        Ok(master_outcome.expect("cluster has at least one rank"))
    })
}
