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

//! # Search Branch
//!
//! A node of the Zykov search tree: the graph state at that node together
//! with its clique lower bound, coloring upper bound and tree depth. A
//! branch is a linear resource: it lives in the queue, on the wire, or in
//! the hands of exactly one thread, and it moves between those places
//! without copying the graph.
//!
//! ## Wire layout
//!
//! Stable little-endian layout, fixed prefix then the graph state:
//!
//! ```text
//! i32 lb | u16 ub | i32 depth | graph state
//! ```
//!
//! The graph state is the replayable operation log of
//! [`zykov_graph::GraphHistory`] followed by the colors of the surviving
//! vertices (`u32 count | count × (u32 vertex, u16 color)`); the receiver
//! materializes the graph by replaying the log against its copy of the
//! root and reinstating the colors, which the final coloring
//! reconstruction reads. A decode failure indicates version skew between
//! processes and is fatal.

use zykov_graph::{Graph, GraphHistory, HistoryDecodeError};

/// Byte length of the fixed `lb | ub | depth` prefix.
const WIRE_PREFIX_LEN: usize = 4 + 2 + 4;

/// Byte length of one `(vertex, color)` record.
const COLOR_RECORD_LEN: usize = 4 + 2;

/// The error type for branch decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BranchDecodeError {
    /// The buffer ended before the declared content did.
    Truncated { needed: usize, got: usize },
    /// The embedded graph history failed to decode or replay.
    History(HistoryDecodeError),
    /// Bytes remained after the final color record.
    TrailingBytes { leftover: usize },
    /// A color record referenced a vertex outside the root instance.
    ColorVertexOutOfRange { vertex: u32, num_vertices: usize },
}

impl std::fmt::Display for BranchDecodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Truncated { needed, got } => write!(
                f,
                "branch buffer truncated: needed {} bytes but got {}",
                needed, got
            ),
            Self::History(e) => write!(f, "graph state: {}", e),
            Self::TrailingBytes { leftover } => {
                write!(f, "{} trailing bytes after branch payload", leftover)
            }
            Self::ColorVertexOutOfRange {
                vertex,
                num_vertices,
            } => write!(
                f,
                "color record references vertex {} but the root has {} vertices",
                vertex, num_vertices
            ),
        }
    }
}

impl std::error::Error for BranchDecodeError {}

impl From<HistoryDecodeError> for BranchDecodeError {
    fn from(e: HistoryDecodeError) -> Self {
        Self::History(e)
    }
}

/// A search-tree node. Ordered by depth so the branch queue pops the
/// deepest node first.
#[derive(Debug, Clone)]
pub struct Branch {
    /// Graph state at this node, exclusively owned.
    pub graph: Graph,
    /// Clique lower bound on χ of this subproblem.
    pub lb: i32,
    /// Coloring upper bound on χ of this subproblem.
    pub ub: u16,
    /// Depth in the search tree; the root sits at depth 1.
    pub depth: i32,
}

impl Branch {
    #[inline]
    pub fn new(graph: Graph, lb: i32, ub: u16, depth: i32) -> Self {
        Self {
            graph,
            lb,
            ub,
            depth,
        }
    }

    /// The placeholder a process sends when it has nothing to report: an
    /// empty graph state with the sentinel upper bound. Receivers skip it
    /// via [`Branch::is_sentinel`].
    #[inline]
    pub fn sentinel() -> Self {
        Self {
            graph: Graph::new(0),
            lb: 0,
            ub: u16::MAX,
            depth: 0,
        }
    }

    /// Returns `true` if this is the nothing-to-report placeholder.
    #[inline]
    pub fn is_sentinel(&self) -> bool {
        self.ub == u16::MAX
    }

    /// Encodes this branch into its wire representation.
    pub fn serialize(&self) -> Vec<u8> {
        let colored: Vec<(u32, u16)> = self
            .graph
            .vertices()
            .map(|v| (v, self.graph.color(v)))
            .filter(|&(_, c)| c != 0)
            .collect();

        let mut out = Vec::with_capacity(
            WIRE_PREFIX_LEN + self.graph.history().encoded_len() + 4 + colored.len() * COLOR_RECORD_LEN,
        );
        out.extend_from_slice(&self.lb.to_le_bytes());
        out.extend_from_slice(&self.ub.to_le_bytes());
        out.extend_from_slice(&self.depth.to_le_bytes());
        self.graph.history().encode_into(&mut out);
        out.extend_from_slice(&(colored.len() as u32).to_le_bytes());
        for (vertex, color) in colored {
            out.extend_from_slice(&vertex.to_le_bytes());
            out.extend_from_slice(&color.to_le_bytes());
        }
        out
    }

    /// Decodes a branch, materializing its graph by replaying the embedded
    /// operation log against `root`.
    pub fn deserialize(bytes: &[u8], root: &Graph) -> Result<Self, BranchDecodeError> {
        if bytes.len() < WIRE_PREFIX_LEN {
            return Err(BranchDecodeError::Truncated {
                needed: WIRE_PREFIX_LEN,
                got: bytes.len(),
            });
        }
        let lb = i32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
        let ub = u16::from_le_bytes([bytes[4], bytes[5]]);
        let depth = i32::from_le_bytes([bytes[6], bytes[7], bytes[8], bytes[9]]);

        let (history, consumed) = GraphHistory::decode(&bytes[WIRE_PREFIX_LEN..])?;
        let mut graph = history.replay(root)?;

        let rest = &bytes[WIRE_PREFIX_LEN + consumed..];
        if rest.len() < 4 {
            return Err(BranchDecodeError::Truncated {
                needed: WIRE_PREFIX_LEN + consumed + 4,
                got: bytes.len(),
            });
        }
        let count = u32::from_le_bytes([rest[0], rest[1], rest[2], rest[3]]) as usize;
        let needed = 4 + count * COLOR_RECORD_LEN;
        if rest.len() < needed {
            return Err(BranchDecodeError::Truncated {
                needed: WIRE_PREFIX_LEN + consumed + needed,
                got: bytes.len(),
            });
        }
        if rest.len() > needed {
            return Err(BranchDecodeError::TrailingBytes {
                leftover: rest.len() - needed,
            });
        }

        let mut at = 4;
        for _ in 0..count {
            let vertex = u32::from_le_bytes([rest[at], rest[at + 1], rest[at + 2], rest[at + 3]]);
            let color = u16::from_le_bytes([rest[at + 4], rest[at + 5]]);
            if vertex as usize >= root.total_vertices() {
                return Err(BranchDecodeError::ColorVertexOutOfRange {
                    vertex,
                    num_vertices: root.total_vertices(),
                });
            }
            graph.set_color(vertex, color);
            at += COLOR_RECORD_LEN;
        }

        Ok(Self {
            graph,
            lb,
            ub,
            depth,
        })
    }
}

// Branches compare by depth alone: the queue is a max-heap approximating
// depth-first order, and nothing else about a node participates in its
// priority.
impl PartialEq for Branch {
    fn eq(&self, other: &Self) -> bool {
        self.depth == other.depth
    }
}

impl Eq for Branch {}

impl PartialOrd for Branch {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Branch {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.depth.cmp(&other.depth)
    }
}

impl std::fmt::Display for Branch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Branch(lb: {}, ub: {}, depth: {}, vertices: {})",
            self.lb,
            self.ub,
            self.depth,
            self.graph.num_vertices()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn root() -> Graph {
        Graph::from_edges(6, &[(0, 1), (1, 2), (2, 3), (3, 4), (4, 5), (5, 0)])
    }

    fn derived_branch() -> (Graph, Branch) {
        let root = root();
        let mut graph = root.clone();
        graph.add_edge(0, 3);
        graph.merge_vertices(1, 4);
        graph.set_color(0, 1);
        graph.set_color(1, 2);
        graph.set_color(2, 1);
        graph.set_color(3, 2);
        graph.set_color(5, 3);
        (root, Branch::new(graph, 2, 3, 4))
    }

    #[test]
    fn test_wire_prefix_layout() {
        let (_, branch) = derived_branch();
        let bytes = branch.serialize();
        assert_eq!(&bytes[0..4], &2i32.to_le_bytes());
        assert_eq!(&bytes[4..6], &3u16.to_le_bytes());
        assert_eq!(&bytes[6..10], &4i32.to_le_bytes());
    }

    #[test]
    fn test_serialize_deserialize_roundtrip() {
        let (root, branch) = derived_branch();
        let bytes = branch.serialize();
        let decoded = Branch::deserialize(&bytes, &root).expect("roundtrip decodes");

        assert_eq!(decoded.lb, branch.lb);
        assert_eq!(decoded.ub, branch.ub);
        assert_eq!(decoded.depth, branch.depth);
        assert_eq!(decoded.graph.num_vertices(), branch.graph.num_vertices());
        for u in branch.graph.vertices() {
            assert!(decoded.graph.is_active(u));
            assert_eq!(decoded.graph.color(u), branch.graph.color(u));
            assert_eq!(
                decoded.graph.merged_vertices(u),
                branch.graph.merged_vertices(u)
            );
            for v in branch.graph.vertices() {
                assert_eq!(decoded.graph.has_edge(u, v), branch.graph.has_edge(u, v));
            }
        }
    }

    #[test]
    fn test_sentinel_roundtrip() {
        let root = root();
        let sentinel = Branch::sentinel();
        assert!(sentinel.is_sentinel());
        let decoded = Branch::deserialize(&sentinel.serialize(), &root).unwrap();
        assert!(decoded.is_sentinel());
    }

    #[test]
    fn test_truncated_buffer_is_rejected() {
        let (root, branch) = derived_branch();
        let mut bytes = branch.serialize();
        bytes.truncate(bytes.len() - 1);
        match Branch::deserialize(&bytes, &root) {
            Err(BranchDecodeError::Truncated { .. }) => {}
            other => panic!("expected Truncated, got {:?}", other.err()),
        }
    }

    #[test]
    fn test_trailing_bytes_are_rejected() {
        let (root, branch) = derived_branch();
        let mut bytes = branch.serialize();
        bytes.push(0);
        match Branch::deserialize(&bytes, &root) {
            Err(BranchDecodeError::TrailingBytes { leftover: 1 }) => {}
            other => panic!("expected TrailingBytes, got {:?}", other.err()),
        }
    }

    #[test]
    fn test_ordering_is_by_depth() {
        let g = Graph::new(1);
        let shallow = Branch::new(g.clone(), 0, 5, 1);
        let deep = Branch::new(g, 0, 2, 7);
        assert!(deep > shallow);
        assert_eq!(shallow, Branch::new(Graph::new(2), 9, 9, 1));
    }
}
