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

//! # Termination (thread T0)
//!
//! A single authoritative rank (rank 0, the master) owns every
//! termination decision; workers never decide. Exactly three things end
//! a run: a rank reports a proven optimum on `SOLUTION_FOUND`, every
//! rank reports idle, or the wall clock runs out. Each master iteration
//! checks the clock, drains solution and idle traffic, and then
//! broadcasts the `solution_found` and `timeout` signals; every rank
//! participates in the two broadcasts, which keeps the protocol
//! finite-state.
//!
//! Before raising the termination flag the master collects one best-
//! snapshot branch from every other rank on `TIMEOUT_SOLUTION` and
//! adopts the best reconstructible candidate, including its own
//! snapshot, so a bound held by rank 0 is never lost, and also on the
//! all-idle path, so an exhausted search still surfaces the coloring
//! that proved its bound. A rank with nothing to report sends the
//! sentinel branch, which the master skips.

use crate::branch::Branch;
use crate::context::EngineContext;
use crate::error::EngineError;
use crate::fabric::{Fabric, Tag};
use crate::messaging::{recv_branch, recv_int, recv_word, send_branch};
use std::time::Duration;

/// Sleep per master loop iteration.
const LOOP_INTERVAL: Duration = Duration::from_millis(10);

/// What the terminator thread hands back to the engine.
#[derive(Debug, Clone, Default)]
pub struct TerminatorVerdict {
    /// The reconstructed full coloring of the root instance. Present on
    /// rank 0 whenever any rank could witness its bound.
    pub coloring: Option<Vec<u16>>,
    /// Time at which the optimum was declared, if the run ended by
    /// solution or idle consensus rather than timeout.
    pub optimum_time: Option<Duration>,
    /// `true` if the run ended by wall-clock timeout.
    pub timed_out: bool,
}

/// Reconstructs a full coloring of the root instance from an optimal
/// branch: every surviving vertex hands its color to its whole merge
/// class. Uses at most `branch.ub` colors when the branch carries the
/// coloring that produced that bound.
pub fn reconstruct_coloring(root_vertices: usize, branch: &Branch) -> Vec<u16> {
    let mut coloring = vec![0u16; root_vertices];
    for v in branch.graph.vertices() {
        let color = branch.graph.color(v);
        coloring[v as usize] = color;
        for &member in branch.graph.merged_vertices(v) {
            coloring[member as usize] = color;
        }
    }
    coloring
}

/// Canceled mid-broadcast by a failed sibling thread: make a best-effort
/// attempt to still hand the master its snapshot so its shutdown
/// collection is not left waiting on this rank.
fn abandon<F: Fabric>(ctx: &EngineContext, fabric: &F, is_master: bool) -> TerminatorVerdict {
    if !is_master {
        let snapshot = ctx.bounds.snapshot().unwrap_or_else(Branch::sentinel);
        let _ = send_branch(fabric, 0, Tag::TimeoutSolution, &snapshot);
    }
    TerminatorVerdict::default()
}

/// Runs the termination protocol until it raises the process-wide flag.
pub fn run_terminator<F: Fabric>(
    ctx: &EngineContext,
    fabric: &F,
) -> Result<TerminatorVerdict, EngineError> {
    let is_master = fabric.rank() == 0;
    let size = fabric.size();

    let mut solution_found = 0i32;
    let mut timeout_signal = 0i32;
    let mut idle_status = vec![0i32; size];

    let mut coloring: Option<Vec<u16>> = None;
    let mut coloring_ub = u16::MAX;
    let mut optimum_time: Option<Duration> = None;

    loop {
        if is_master {
            // A failed sibling thread raises the flag directly; fold that
            // into the normal shutdown broadcast so every rank unwinds.
            if ctx.terminated() {
                solution_found = 1;
            }
            if ctx.timed_out() {
                timeout_signal = 1;
                ctx.trace.log("terminator", 0, "[TERMINATION] timeout reached");
            }

            // A rank announces a proven optimum: the bound, then the
            // witnessing branch.
            if let Some(source) = fabric.try_probe(Tag::SolutionFound) {
                if let Some(bound) =
                    recv_word(fabric, source, Tag::SolutionFound, ctx.termination_flag())?
                {
                    ctx.bounds.record_ub(bound);
                    if let Some(branch) = recv_branch(
                        fabric,
                        source,
                        Tag::SolutionFound,
                        ctx.termination_flag(),
                        &ctx.root,
                    )? {
                        ctx.bounds.record_ub(branch.ub);
                        coloring = Some(reconstruct_coloring(ctx.root.total_vertices(), &branch));
                        coloring_ub = branch.ub;
                        solution_found = 1;
                        optimum_time = Some(ctx.elapsed());
                        ctx.trace.log(
                            "terminator",
                            0,
                            &format!("[TERMINATION] optimum {} from rank {source}", branch.ub),
                        );
                    }
                }
            }

            // Drain idleness reports.
            while let Some(source) = fabric.try_probe(Tag::Idle) {
                match recv_int(fabric, source, Tag::Idle, ctx.termination_flag())? {
                    Some(status) => idle_status[source] = status,
                    None => break,
                }
            }

            if idle_status.iter().all(|&status| status == 1) {
                solution_found = 1;
                optimum_time.get_or_insert_with(|| ctx.elapsed());
                ctx.trace
                    .log("terminator", 0, "[TERMINATION] all processes idle");
            }
        }

        let Some(found) = fabric.broadcast_int(0, solution_found, ctx.termination_flag())? else {
            return Ok(abandon(ctx, fabric, is_master));
        };
        solution_found = found;
        let Some(timed) = fabric.broadcast_int(0, timeout_signal, ctx.termination_flag())? else {
            return Ok(abandon(ctx, fabric, is_master));
        };
        timeout_signal = timed;

        if solution_found == 1 || timeout_signal == 1 {
            if is_master {
                let mut best = ctx.bounds.snapshot().filter(|b| !b.is_sentinel());
                for source in 1..size {
                    let Some(candidate) = recv_branch(
                        fabric,
                        source,
                        Tag::TimeoutSolution,
                        ctx.termination_flag(),
                        &ctx.root,
                    )?
                    else {
                        break;
                    };
                    if candidate.is_sentinel() || candidate.ub > ctx.bounds.best_ub() {
                        continue;
                    }
                    if best.as_ref().map_or(true, |b| candidate.ub < b.ub) {
                        best = Some(candidate);
                    }
                }
                if let Some(branch) = best {
                    if branch.ub < coloring_ub {
                        ctx.bounds.record_ub(branch.ub);
                        coloring = Some(reconstruct_coloring(ctx.root.total_vertices(), &branch));
                        coloring_ub = branch.ub;
                    }
                }
            } else {
                let snapshot = ctx.bounds.snapshot().unwrap_or_else(Branch::sentinel);
                send_branch(fabric, 0, Tag::TimeoutSolution, &snapshot)?;
            }

            ctx.raise_termination();
            ctx.trace.log("terminator", 0, "[TERMINATION] finalizing");
            return Ok(TerminatorVerdict {
                coloring,
                optimum_time: if timeout_signal == 1 { None } else { optimum_time },
                timed_out: timeout_signal == 1,
            });
        }

        std::thread::sleep(LOOP_INTERVAL);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use zykov_graph::Graph;

    #[test]
    fn test_reconstruction_propagates_merge_classes() {
        // Square 0-1-2-3-0, merge the diagonal 0,2: a proper 2-coloring
        // of the contracted graph colors all four original vertices.
        let root = Graph::from_edges(4, &[(0, 1), (1, 2), (2, 3), (3, 0)]);
        let mut graph = root.clone();
        graph.merge_vertices(0, 2);
        graph.set_color(0, 1);
        graph.set_color(1, 2);
        graph.set_color(3, 2);
        let branch = Branch::new(graph, 2, 2, 2);

        let coloring = reconstruct_coloring(root.total_vertices(), &branch);
        assert_eq!(coloring, vec![1, 2, 1, 2]);

        // The reconstruction is proper on the root.
        for u in root.vertices() {
            for v in root.neighbors(u) {
                assert_ne!(coloring[u as usize], coloring[v as usize]);
            }
        }
    }

    #[test]
    fn test_reconstruction_uses_at_most_ub_colors() {
        let root = Graph::from_edges(3, &[(0, 1), (1, 2)]);
        let mut graph = root.clone();
        graph.merge_vertices(0, 2);
        graph.set_color(0, 1);
        graph.set_color(1, 2);
        let branch = Branch::new(graph, 2, 2, 2);

        let coloring = reconstruct_coloring(3, &branch);
        let distinct: std::collections::BTreeSet<u16> =
            coloring.iter().copied().filter(|&c| c != 0).collect();
        assert!(distinct.len() as u16 <= branch.ub);
    }
}
