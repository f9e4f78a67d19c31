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

//! Work stealing: the employer (thread T2) and the requester side the
//! idle worker runs.
//!
//! The employer answers incoming steal attempts out of the local queue.
//! It only ever gives away the deepest branch, and only while a second
//! branch remains for local progress; no queue is drained by stealing.
//!
//! The requester picks victims uniformly at random (per-worker generator
//! seeded from the rank; no global RNG state), which avoids pathological
//! bias without any coordination. A missed steal is not an error; the
//! worker sleeps briefly and tries another victim.

use crate::branch::Branch;
use crate::context::EngineContext;
use crate::error::EngineError;
use crate::fabric::{Envelope, Fabric, Tag};
use crate::messaging::{recv_branch, recv_int, send_branch};
use rand::{rngs::StdRng, Rng};
use std::time::Duration;

/// Sleep between employer probes and between steal retries.
const RETRY_INTERVAL: Duration = Duration::from_millis(10);

/// Runs the employer loop until termination.
pub fn run_employer<F: Fabric>(ctx: &EngineContext, fabric: &F) -> Result<(), EngineError> {
    while !ctx.terminated() {
        if let Some(source) = fabric.try_probe(Tag::WorkRequest) {
            // Consume the request before answering it.
            let _ = fabric.try_recv(source, Tag::WorkRequest)?;

            match ctx.queue.steal_if_spare() {
                Some(branch) => {
                    fabric.send(source, Tag::WorkResponse, Envelope::Int(1))?;
                    send_branch(fabric, source, Tag::WorkStealing, &branch)?;
                    ctx.trace.log(
                        "employer",
                        branch.depth,
                        &format!("[STEAL] sent branch to rank {source}"),
                    );
                }
                None => {
                    fabric.send(source, Tag::WorkResponse, Envelope::Int(0))?;
                }
            }
        }
        std::thread::sleep(RETRY_INTERVAL);
    }
    Ok(())
}

/// One steal attempt against a random victim. Returns the stolen branch,
/// or `None` on a miss or cancellation. With a single rank there is no
/// eligible victim; the attempt degenerates to a cancelable sleep so the
/// idle-consensus path can end the run.
pub fn request_work<F: Fabric>(
    ctx: &EngineContext,
    fabric: &F,
    rng: &mut StdRng,
) -> Result<Option<Branch>, EngineError> {
    let size = fabric.size();
    if size == 1 {
        std::thread::sleep(RETRY_INTERVAL);
        return Ok(None);
    }

    let mut victim = fabric.rank();
    while victim == fabric.rank() {
        victim = rng.gen_range(0..size);
    }

    fabric.send(victim, Tag::WorkRequest, Envelope::Empty)?;
    match recv_int(fabric, victim, Tag::WorkResponse, ctx.termination_flag())? {
        Some(1) => recv_branch(
            fabric,
            victim,
            Tag::WorkStealing,
            ctx.termination_flag(),
            &ctx.root,
        ),
        // Miss, or canceled while waiting for the response.
        _ => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::fabric::local::LocalFabric;
    use rand::SeedableRng;
    use zykov_graph::Graph;

    fn context(root: Graph) -> EngineContext {
        EngineContext::new(root, EngineConfig::default(), 0).unwrap()
    }

    fn branch(root: &Graph, depth: i32) -> Branch {
        Branch::new(root.clone(), 1, 3, depth)
    }

    #[test]
    fn test_employer_hands_out_spare_branch() {
        let mesh = LocalFabric::mesh(2);
        let root = Graph::from_edges(3, &[(0, 1), (1, 2)]);

        let employer_ctx = context(root.clone());
        employer_ctx.queue.push(branch(&root, 2));
        employer_ctx.queue.push(branch(&root, 5));

        let thief_ctx = context(root.clone());
        let mut rng = StdRng::seed_from_u64(1);

        std::thread::scope(|scope| {
            let employer = &mesh[0];
            let ctx = &employer_ctx;
            scope.spawn(move || {
                // Serve exactly one request, then shut down.
                while ctx.queue.len() == 2 {
                    if let Some(source) = employer.try_probe(Tag::WorkRequest) {
                        let _ = employer.try_recv(source, Tag::WorkRequest).unwrap();
                        let stolen = ctx.queue.steal_if_spare().unwrap();
                        employer
                            .send(source, Tag::WorkResponse, Envelope::Int(1))
                            .unwrap();
                        send_branch(employer, source, Tag::WorkStealing, &stolen).unwrap();
                    }
                }
            });

            let got = request_work(&thief_ctx, &mesh[1], &mut rng)
                .unwrap()
                .expect("steal succeeds");
            assert_eq!(got.depth, 5, "the deepest branch travels");
        });

        assert_eq!(employer_ctx.queue.len(), 1, "one branch stays local");
    }

    #[test]
    fn test_employer_refuses_last_branch() {
        let mesh = LocalFabric::mesh(2);
        let root = Graph::from_edges(3, &[(0, 1)]);

        let employer_ctx = context(root.clone());
        employer_ctx.queue.push(branch(&root, 1));

        let thief_ctx = context(root.clone());
        let mut rng = StdRng::seed_from_u64(2);

        std::thread::scope(|scope| {
            let employer = &mesh[0];
            let ctx = &employer_ctx;
            let handle = scope.spawn(move || {
                loop {
                    if let Some(source) = employer.try_probe(Tag::WorkRequest) {
                        let _ = employer.try_recv(source, Tag::WorkRequest).unwrap();
                        assert!(ctx.queue.steal_if_spare().is_none());
                        employer
                            .send(source, Tag::WorkResponse, Envelope::Int(0))
                            .unwrap();
                        break;
                    }
                }
            });

            let got = request_work(&thief_ctx, &mesh[1], &mut rng).unwrap();
            assert!(got.is_none(), "a refused steal is a miss, not an error");
            handle.join().unwrap();
        });

        assert_eq!(employer_ctx.queue.len(), 1);
    }

    #[test]
    fn test_single_rank_steal_is_a_cancelable_miss() {
        let mesh = LocalFabric::mesh(1);
        let ctx = context(Graph::new(2));
        let mut rng = StdRng::seed_from_u64(3);
        assert!(request_work(&ctx, &mesh[0], &mut rng).unwrap().is_none());
    }
}
