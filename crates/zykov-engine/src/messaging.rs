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

//! Cancelable messaging primitives.
//!
//! The typed send/receive layer the protocol threads use. A receive is a
//! poll-test-sleep loop over the fabric's non-blocking operations that
//! checks the process-wide termination flag every iteration and returns
//! `None` once it is raised, the sentinel the protocols treat as
//! "canceled, shut down". No thread ever blocks in the transport without
//! a cancellation path, because the transport cannot know the engine is
//! being torn down.
//!
//! A received branch envelope is decoded against the pristine root graph;
//! a decode failure indicates version skew between processes and is
//! fatal.

use crate::branch::Branch;
use crate::error::EngineError;
use crate::fabric::{Envelope, Fabric, Tag};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use zykov_graph::Graph;

/// Sleep between receive polls.
const POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Serializes and posts a branch.
pub fn send_branch<F: Fabric>(
    fabric: &F,
    dest: usize,
    tag: Tag,
    branch: &Branch,
) -> Result<(), EngineError> {
    fabric
        .send(dest, tag, Envelope::Bytes(branch.serialize()))
        .map_err(EngineError::from)
}

/// Receives the next envelope from `source` on `tag`, polling until it
/// arrives or `termination` is raised (`None`).
pub fn recv_envelope<F: Fabric>(
    fabric: &F,
    source: usize,
    tag: Tag,
    termination: &AtomicBool,
) -> Result<Option<Envelope>, EngineError> {
    loop {
        if let Some(envelope) = fabric.try_recv(source, tag)? {
            return Ok(Some(envelope));
        }
        if termination.load(Ordering::Relaxed) {
            return Ok(None);
        }
        std::thread::sleep(POLL_INTERVAL);
    }
}

/// Receives an integer, canceling on termination.
pub fn recv_int<F: Fabric>(
    fabric: &F,
    source: usize,
    tag: Tag,
    termination: &AtomicBool,
) -> Result<Option<i32>, EngineError> {
    match recv_envelope(fabric, source, tag, termination)? {
        None => Ok(None),
        Some(Envelope::Int(value)) => Ok(Some(value)),
        Some(_) => Err(EngineError::UnexpectedEnvelope {
            tag,
            expected: "int",
        }),
    }
}

/// Receives a `u16`, canceling on termination.
pub fn recv_word<F: Fabric>(
    fabric: &F,
    source: usize,
    tag: Tag,
    termination: &AtomicBool,
) -> Result<Option<u16>, EngineError> {
    match recv_envelope(fabric, source, tag, termination)? {
        None => Ok(None),
        Some(Envelope::Word(value)) => Ok(Some(value)),
        Some(_) => Err(EngineError::UnexpectedEnvelope {
            tag,
            expected: "word",
        }),
    }
}

/// Receives and materializes a branch, canceling on termination.
pub fn recv_branch<F: Fabric>(
    fabric: &F,
    source: usize,
    tag: Tag,
    termination: &AtomicBool,
    root: &Graph,
) -> Result<Option<Branch>, EngineError> {
    match recv_envelope(fabric, source, tag, termination)? {
        None => Ok(None),
        Some(Envelope::Bytes(bytes)) => Branch::deserialize(&bytes, root)
            .map(Some)
            .map_err(EngineError::from),
        Some(_) => Err(EngineError::UnexpectedEnvelope {
            tag,
            expected: "branch",
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fabric::local::LocalFabric;

    #[test]
    fn test_branch_travels_whole() {
        let mesh = LocalFabric::mesh(2);
        let termination = AtomicBool::new(false);

        let root = Graph::from_edges(4, &[(0, 1), (1, 2), (2, 3)]);
        let mut graph = root.clone();
        graph.merge_vertices(0, 2);
        graph.set_color(0, 1);
        graph.set_color(1, 2);
        graph.set_color(3, 1);
        let branch = Branch::new(graph, 2, 2, 3);

        send_branch(&mesh[0], 1, Tag::WorkStealing, &branch).unwrap();
        let received = recv_branch(&mesh[1], 0, Tag::WorkStealing, &termination, &root)
            .unwrap()
            .expect("branch arrives");

        assert_eq!(received.lb, 2);
        assert_eq!(received.ub, 2);
        assert_eq!(received.depth, 3);
        assert_eq!(received.graph.num_vertices(), 3);
        assert_eq!(received.graph.color(0), 1);
    }

    #[test]
    fn test_recv_cancels_on_termination() {
        let mesh = LocalFabric::mesh(2);
        let termination = AtomicBool::new(false);

        std::thread::scope(|scope| {
            let endpoint = &mesh[1];
            let flag = &termination;
            let handle =
                scope.spawn(move || recv_int(endpoint, 0, Tag::WorkResponse, flag).unwrap());
            std::thread::sleep(Duration::from_millis(20));
            termination.store(true, Ordering::Relaxed);
            assert_eq!(handle.join().unwrap(), None);
        });
    }

    #[test]
    fn test_envelope_kind_mismatch_is_fatal() {
        let mesh = LocalFabric::mesh(2);
        let termination = AtomicBool::new(false);

        mesh[0]
            .send(1, Tag::WorkResponse, Envelope::Word(3))
            .unwrap();
        match recv_int(&mesh[1], 0, Tag::WorkResponse, &termination) {
            Err(EngineError::UnexpectedEnvelope { expected: "int", .. }) => {}
            other => panic!("expected UnexpectedEnvelope, got {:?}", other),
        }
    }
}
