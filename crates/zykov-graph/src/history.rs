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

//! # Graph History
//!
//! The replayable operation log that makes search nodes cheap to move.
//! Instead of serializing adjacency data, a node ships the minimal
//! sequence of add-edge / merge operations that leads from the root
//! instance to its graph; the receiver materializes the node by replaying
//! the log against its own copy of the root.
//!
//! ## Wire layout
//!
//! All integers are little-endian and the layout is stable across
//! versions:
//!
//! ```text
//! u32 op_count | op_count × (u8 kind | u32 u | u32 v)
//! ```
//!
//! with kind `0` = add-edge and `1` = merge. A decode failure indicates
//! version skew between processes and is treated as fatal by the engine.

use crate::graph::Graph;

/// A single Zykov branching operation in root vertex ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryOp {
    /// Force the pair apart.
    AddEdge(u32, u32),
    /// Contract the second vertex into the first.
    Merge(u32, u32),
}

const KIND_ADD_EDGE: u8 = 0;
const KIND_MERGE: u8 = 1;

/// Encoded size of one operation record.
const OP_RECORD_LEN: usize = 1 + 4 + 4;

/// The error type for history decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistoryDecodeError {
    /// The buffer ended before the declared records did.
    Truncated { needed: usize, got: usize },
    /// An operation record carried an unknown kind byte.
    UnknownOpKind(u8),
    /// An operation referenced a vertex outside the root instance.
    VertexOutOfRange { vertex: u32, num_vertices: usize },
}

impl std::fmt::Display for HistoryDecodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Truncated { needed, got } => write!(
                f,
                "history buffer truncated: needed {} bytes but got {}",
                needed, got
            ),
            Self::UnknownOpKind(kind) => write!(f, "unknown history op kind {}", kind),
            Self::VertexOutOfRange {
                vertex,
                num_vertices,
            } => write!(
                f,
                "history references vertex {} but the root has {} vertices",
                vertex, num_vertices
            ),
        }
    }
}

impl std::error::Error for HistoryDecodeError {}

/// An append-only log of the operations applied since the root instance.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GraphHistory {
    ops: Vec<HistoryOp>,
}

impl GraphHistory {
    /// Creates an empty history.
    #[inline]
    pub fn new() -> Self {
        Self { ops: Vec::new() }
    }

    /// Appends an operation.
    #[inline]
    pub fn push(&mut self, op: HistoryOp) {
        self.ops.push(op);
    }

    /// Number of recorded operations.
    #[inline]
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    /// Returns `true` if no operation has been recorded.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// The recorded operations in application order.
    #[inline]
    pub fn ops(&self) -> &[HistoryOp] {
        &self.ops
    }

    /// Encoded size of this history on the wire.
    #[inline]
    pub fn encoded_len(&self) -> usize {
        4 + self.ops.len() * OP_RECORD_LEN
    }

    /// Appends the wire encoding of this history to `out`.
    pub fn encode_into(&self, out: &mut Vec<u8>) {
        out.reserve(self.encoded_len());
        out.extend_from_slice(&(self.ops.len() as u32).to_le_bytes());
        for op in &self.ops {
            let (kind, u, v) = match *op {
                HistoryOp::AddEdge(u, v) => (KIND_ADD_EDGE, u, v),
                HistoryOp::Merge(u, v) => (KIND_MERGE, u, v),
            };
            out.push(kind);
            out.extend_from_slice(&u.to_le_bytes());
            out.extend_from_slice(&v.to_le_bytes());
        }
    }

    /// Decodes a history from the front of `bytes`, returning it together
    /// with the number of bytes consumed.
    pub fn decode(bytes: &[u8]) -> Result<(Self, usize), HistoryDecodeError> {
        if bytes.len() < 4 {
            return Err(HistoryDecodeError::Truncated {
                needed: 4,
                got: bytes.len(),
            });
        }
        let count = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as usize;
        let needed = 4 + count * OP_RECORD_LEN;
        if bytes.len() < needed {
            return Err(HistoryDecodeError::Truncated {
                needed,
                got: bytes.len(),
            });
        }

        let mut ops = Vec::with_capacity(count);
        let mut at = 4;
        for _ in 0..count {
            let kind = bytes[at];
            let u = u32::from_le_bytes([bytes[at + 1], bytes[at + 2], bytes[at + 3], bytes[at + 4]]);
            let v = u32::from_le_bytes([bytes[at + 5], bytes[at + 6], bytes[at + 7], bytes[at + 8]]);
            ops.push(match kind {
                KIND_ADD_EDGE => HistoryOp::AddEdge(u, v),
                KIND_MERGE => HistoryOp::Merge(u, v),
                other => return Err(HistoryDecodeError::UnknownOpKind(other)),
            });
            at += OP_RECORD_LEN;
        }

        Ok((Self { ops }, at))
    }

    /// Materializes the graph this history leads to by replaying it
    /// against `root`.
    ///
    /// The replay re-records every operation, so the materialized graph
    /// serializes back to the same log (prefixed by whatever history
    /// `root` itself carries; the engine always replays against a
    /// pristine root).
    pub fn replay(&self, root: &Graph) -> Result<Graph, HistoryDecodeError> {
        let limit = root.total_vertices() as u32;
        let mut graph = root.clone();
        for &op in &self.ops {
            let (u, v) = match op {
                HistoryOp::AddEdge(u, v) | HistoryOp::Merge(u, v) => (u, v),
            };
            if u >= limit || v >= limit {
                return Err(HistoryDecodeError::VertexOutOfRange {
                    vertex: u.max(v),
                    num_vertices: limit as usize,
                });
            }
            graph.apply(op);
        }
        Ok(graph)
    }
}

impl std::fmt::Display for GraphHistory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "GraphHistory({} ops)", self.ops.len())
    }
}
