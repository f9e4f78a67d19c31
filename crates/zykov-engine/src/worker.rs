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

//! # The Search Worker (thread T3)
//!
//! The worker pops the deepest branch, bounds it, prunes it against the
//! shared best upper bound, or splits it on a Zykov pair: the merge
//! child forces the pair onto one color, the add-edge child forces it
//! apart; exhausting both directions exhausts χ. Children get fresh
//! clique and coloring bounds on creation, and any child whose coloring
//! improves the process-wide bound becomes the new best snapshot before
//! it enters the queue.
//!
//! The two engine variants differ only in which children a node emits.
//! Under [`ChildPolicy::DepthRankGated`] (the unbalanced variant, all
//! ranks seeded with the same root) the first `rank + 1` levels emit a
//! single child (add-edge above the gate depth, merge at it), which
//! assigns each rank its own path through the shared top of the binary
//! tree before full two-way branching begins. Under [`ChildPolicy::Both`]
//! (the balanced variant, each rank seeded by the initial partition)
//! every node emits both children.
//!
//! An empty queue sends the worker into the steal protocol: report idle
//! to rank 0, steal from random victims until a branch arrives or the
//! run terminates, report busy again.

use crate::branch::Branch;
use crate::context::EngineContext;
use crate::employer::request_work;
use crate::error::EngineError;
use crate::fabric::{Envelope, Fabric, Tag};
use crate::messaging::send_branch;
use crate::strategy::Strategies;
use rand::{rngs::StdRng, SeedableRng};
use std::time::Duration;

/// Sleep between steal attempts while idle.
const RETRY_INTERVAL: Duration = Duration::from_millis(10);

/// Which children a processed node emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildPolicy {
    /// Single-child emission for the first `rank + 1` levels, then both.
    DepthRankGated,
    /// Both children always.
    Both,
}

/// Runs the worker loop until the search is done or the run terminates.
///
/// `seed` is the rank's initial branch from the balanced partition;
/// without one the worker bounds the shared root itself and starts
/// there.
pub fn run_worker<F: Fabric>(
    ctx: &EngineContext,
    fabric: &F,
    mut strategies: Strategies,
    policy: ChildPolicy,
    seed: Option<Branch>,
) -> Result<(), EngineError> {
    let mut rng = StdRng::seed_from_u64(fabric.rank() as u64);

    let mut first_iteration = match seed {
        Some(branch) => {
            ctx.bounds.record_ub(branch.ub);
            ctx.bounds.try_install(branch.clone());
            ctx.trace.log(
                "worker",
                0,
                &format!(
                    "[INITIALIZATION] seed at depth {}: lb = {}, ub = {}",
                    branch.depth, branch.lb, branch.ub
                ),
            );
            ctx.queue.push(branch);
            false
        }
        None => {
            let mut root = ctx.root.clone();
            let lb = strategies.clique.find_clique(&root);
            let ub = strategies.color.color(&mut root);
            ctx.bounds.record_ub(ub);
            ctx.bounds.try_install(Branch::new(root.clone(), lb, ub, 1));
            ctx.trace.log(
                "worker",
                0,
                &format!("[INITIALIZATION] initial bounds: lb = {lb}, ub = {ub}"),
            );
            ctx.queue.push(Branch::new(root, lb, ub, 1));
            true
        }
    };

    while !ctx.terminated() {
        let Some(current) = ctx.queue.pop() else {
            // Tell the master this rank ran dry, then go stealing.
            fabric.send(0, Tag::Idle, Envelope::Int(1))?;
            ctx.trace.log("worker", 0, "[REQUEST] requesting work");

            let mut acquired = false;
            while !ctx.terminated() {
                if let Some(branch) = request_work(ctx, fabric, &mut rng)? {
                    ctx.queue.push(branch);
                    acquired = true;
                    break;
                }
                std::thread::sleep(RETRY_INTERVAL);
            }
            if !acquired {
                break;
            }
            fabric.send(0, Tag::Idle, Envelope::Int(0))?;
            ctx.trace.log("worker", 0, "[REQUEST] work received");
            continue;
        };

        // Only the very first node a worker processes may claim the
        // root-proven-optimum path below.
        let is_first = std::mem::replace(&mut first_iteration, false);
        let depth = current.depth;

        ctx.trace.log(
            "worker",
            depth,
            &format!(
                "[BRANCH] processing node: lb = {}, ub = {}",
                current.lb, current.ub
            ),
        );

        // A node matching the known chromatic number ends the whole run.
        if ctx.config.expected_chi == Some(current.ub) {
            ctx.bounds.record_ub(current.ub);
            fabric.send(0, Tag::SolutionFound, Envelope::Word(current.ub))?;
            send_branch(fabric, 0, Tag::SolutionFound, &current)?;
            ctx.trace.log(
                "worker",
                depth,
                &format!("[FOUND] chromatic number found: {}", current.ub),
            );
            break;
        }

        if current.lb == i32::from(current.ub) {
            if is_first {
                // The root itself is proven optimal. Sound to report
                // before any broadcast: best-UB was initialized to this
                // very ub.
                ctx.bounds.record_ub(current.ub);
                ctx.bounds.try_install(current.clone());
                fabric.send(0, Tag::SolutionFound, Envelope::Word(current.ub))?;
                send_branch(fabric, 0, Tag::SolutionFound, &current)?;
                ctx.trace.log(
                    "worker",
                    depth,
                    &format!(
                        "[FOUND] chromatic number found at root: {}",
                        current.ub
                    ),
                );
                break;
            }
            if current.ub < ctx.bounds.best_ub() {
                ctx.bounds.try_install(current.clone());
            }
            ctx.trace.log(
                "worker",
                depth,
                &format!("[PRUNE] lb == ub == {}", current.ub),
            );
            continue;
        }

        if current.lb >= i32::from(ctx.bounds.best_ub()) {
            ctx.trace.log(
                "worker",
                depth,
                &format!(
                    "[PRUNE] lb = {} >= best_ub = {}",
                    current.lb,
                    ctx.bounds.best_ub()
                ),
            );
            continue;
        }

        let Some((u, v)) = strategies.branching.choose(&current.graph) else {
            // Residual graph is complete; its order is a coloring bound.
            let order = current.graph.num_vertices() as u16;
            if order < ctx.bounds.best_ub() {
                ctx.bounds.record_ub(order);
                ctx.bounds.try_install(current.clone());
                ctx.trace.log(
                    "worker",
                    depth,
                    &format!("[UPDATE] complete residual of order {order}"),
                );
            }
            continue;
        };

        ctx.trace.log(
            "worker",
            depth,
            &format!("[BRANCH] branching on u = {u}, v = {v}"),
        );

        let gate = fabric.rank() as i32 + 1;
        match policy {
            ChildPolicy::DepthRankGated if depth < gate => {
                let child = expand_child(&mut strategies, &current.graph, u, v, false, depth);
                ctx.trace.log(
                    "worker",
                    depth,
                    &format!("[ADD EDGE] lb = {}, ub = {}", child.lb, child.ub),
                );
                ctx.queue.push(child);
            }
            ChildPolicy::DepthRankGated if depth == gate => {
                let child = expand_child(&mut strategies, &current.graph, u, v, true, depth);
                ctx.trace.log(
                    "worker",
                    depth,
                    &format!("[MERGE] lb = {}, ub = {}", child.lb, child.ub),
                );
                ctx.queue.push(child);
            }
            _ => {
                let merged = expand_child(&mut strategies, &current.graph, u, v, true, depth);
                let added = expand_child(&mut strategies, &current.graph, u, v, false, depth);

                let previous = ctx.bounds.best_ub();
                if merged.ub < previous && merged.ub <= added.ub {
                    ctx.bounds.try_install(merged.clone());
                    ctx.trace.log(
                        "worker",
                        depth,
                        &format!("[UPDATE] best_ub {}", merged.ub),
                    );
                } else if added.ub < previous {
                    ctx.bounds.try_install(added.clone());
                    ctx.trace.log(
                        "worker",
                        depth,
                        &format!("[UPDATE] best_ub {}", added.ub),
                    );
                }

                ctx.queue.push(merged);
                ctx.queue.push(added);
            }
        }
    }

    ctx.trace.log("worker", 0, "[TERMINATION] worker done");
    Ok(())
}

/// Builds one child: clone, apply the Zykov operation, bound it.
fn expand_child(
    strategies: &mut Strategies,
    parent: &zykov_graph::Graph,
    u: u32,
    v: u32,
    merge: bool,
    depth: i32,
) -> Branch {
    let mut graph = parent.clone();
    if merge {
        graph.merge_vertices(u, v);
    } else {
        graph.add_edge(u, v);
    }
    let lb = strategies.clique.find_clique(&graph);
    let ub = strategies.color.color(&mut graph);
    Branch::new(graph, lb, ub, depth + 1)
}
