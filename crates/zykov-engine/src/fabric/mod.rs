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

//! # Message Fabric
//!
//! The narrow transport seam the engine talks through. A fabric links P
//! ranks with tagged point-to-point messaging (non-blocking send, probe
//! and receive), two cancelable collectives (integer broadcast and a
//! `u16` all-gather) and a barrier: exactly the operation set the
//! termination, gathering and stealing protocols consume.
//!
//! Everything above this trait polls: a blocking receive is a
//! test-sleep loop over [`Fabric::try_recv`] that also watches the
//! engine's termination flag, so no thread is ever parked inside the
//! transport while the run is being torn down. The collectives take the
//! flag directly and return `None` when canceled.
//!
//! The shipped implementation is the in-process channel mesh in
//! [`local`]; a process-per-rank transport slots in behind the same
//! trait without touching any protocol code.

pub mod local;

use std::sync::atomic::AtomicBool;

/// The point-to-point message tags of the engine protocols.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tag {
    /// A steal attempt; carries no payload.
    WorkRequest,
    /// Employer's answer to a steal attempt: `1` = a branch follows on
    /// `WorkStealing`, `0` = nothing to spare.
    WorkResponse,
    /// A stolen branch.
    WorkStealing,
    /// Worker idleness report to rank 0: `1` = idle, `0` = busy again.
    Idle,
    /// A proven optimum: the `u16` bound, then the witnessing branch.
    SolutionFound,
    /// A rank's best snapshot, collected by rank 0 at shutdown.
    TimeoutSolution,
}

impl Tag {
    /// Number of point-to-point tags.
    pub(crate) const COUNT: usize = 6;

    /// Dense lane index for per-tag channel storage.
    #[inline]
    pub(crate) fn lane(self) -> usize {
        match self {
            Self::WorkRequest => 0,
            Self::WorkResponse => 1,
            Self::WorkStealing => 2,
            Self::Idle => 3,
            Self::SolutionFound => 4,
            Self::TimeoutSolution => 5,
        }
    }
}

impl std::fmt::Display for Tag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::WorkRequest => write!(f, "WORK_REQUEST"),
            Self::WorkResponse => write!(f, "WORK_RESPONSE"),
            Self::WorkStealing => write!(f, "WORK_STEALING"),
            Self::Idle => write!(f, "IDLE"),
            Self::SolutionFound => write!(f, "SOLUTION_FOUND"),
            Self::TimeoutSolution => write!(f, "TIMEOUT_SOLUTION"),
        }
    }
}

/// A message payload: a fixed-width scalar or a length-delimited byte
/// buffer (a serialized branch).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Envelope {
    Empty,
    Int(i32),
    Word(u16),
    Bytes(Vec<u8>),
}

impl Envelope {
    /// The scalar if this is an `Int` envelope.
    #[inline]
    pub fn as_int(&self) -> Option<i32> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// The scalar if this is a `Word` envelope.
    #[inline]
    pub fn as_word(&self) -> Option<u16> {
        match self {
            Self::Word(v) => Some(*v),
            _ => None,
        }
    }

    /// The buffer if this is a `Bytes` envelope.
    #[inline]
    pub fn into_bytes(self) -> Option<Vec<u8>> {
        match self {
            Self::Bytes(bytes) => Some(bytes),
            _ => None,
        }
    }
}

/// The error type for fabric operations. Any of these means a peer is
/// gone and the job must abort.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FabricError {
    /// The channel to or from `peer` is closed.
    Disconnected { peer: usize },
}

impl std::fmt::Display for FabricError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Disconnected { peer } => write!(f, "rank {} is disconnected", peer),
        }
    }
}

impl std::error::Error for FabricError {}

/// The transport the engine runs over.
pub trait Fabric: Send + Sync {
    /// This process's rank in `0..size()`.
    fn rank(&self) -> usize;

    /// Number of ranks.
    fn size(&self) -> usize;

    /// Posts a message. Never blocks.
    fn send(&self, dest: usize, tag: Tag, envelope: Envelope) -> Result<(), FabricError>;

    /// Reports a rank with a pending message on `tag`, if any. The
    /// message stays queued.
    fn try_probe(&self, tag: Tag) -> Option<usize>;

    /// Takes the next pending message from `source` on `tag`, if any.
    /// Never blocks.
    fn try_recv(&self, source: usize, tag: Tag) -> Result<Option<Envelope>, FabricError>;

    /// Broadcasts an integer from `root` to every rank. Collective: all
    /// ranks must call it in the same order. Returns `None` if canceled
    /// while polling.
    fn broadcast_int(
        &self,
        root: usize,
        value: i32,
        cancel: &AtomicBool,
    ) -> Result<Option<i32>, FabricError>;

    /// Gathers every rank's word; entry `r` of the result came from rank
    /// `r`. Collective: all ranks must call it in the same order. Returns
    /// `None` if canceled while polling.
    fn all_gather_word(
        &self,
        value: u16,
        cancel: &AtomicBool,
    ) -> Result<Option<Vec<u16>>, FabricError>;

    /// Blocks until every rank has arrived. Collective; fails instead of
    /// hanging when a peer died before reaching it.
    fn barrier(&self) -> Result<(), FabricError>;
}
