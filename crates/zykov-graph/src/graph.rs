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

//! The mutable search graph.
//!
//! A `Graph` is always a Zykov derivative of some root instance: a sequence
//! of add-edge and merge operations applied to it. Vertices are identified
//! by their original (root) ids for the whole lifetime of the graph; a merge
//! deactivates the absorbed vertex instead of renumbering, so the op log in
//! `GraphHistory` stays replayable and the union of all merge classes
//! partitions the root vertex set.
//!
//! Colors are `u16` with `0` meaning "uncolored". Coloring heuristics only
//! ever color active vertices; the full coloring of the root instance is
//! recovered by propagating each surviving vertex's color to its merge
//! class.

use crate::history::{GraphHistory, HistoryOp};
use fixedbitset::FixedBitSet;
use smallvec::SmallVec;

/// Merge classes are tiny for most of the search; four inline slots cover
/// the common case without heap traffic.
type MergeClass = SmallVec<[u32; 4]>;

/// A simple undirected graph under Zykov branching.
#[derive(Debug, Clone)]
pub struct Graph {
    /// Adjacency rows indexed by original vertex id. Rows of active
    /// vertices reference active vertices only; rows of absorbed vertices
    /// are stale and must not be read.
    adj: Vec<FixedBitSet>,
    /// The surviving vertices.
    active: FixedBitSet,
    /// For every active vertex, the original vertices absorbed into it
    /// (transitively, excluding the vertex itself).
    merged: Vec<MergeClass>,
    /// Per original vertex color, `0` = uncolored.
    colors: Vec<u16>,
    /// Operations applied since the root instance.
    history: GraphHistory,
    /// Cached number of active vertices.
    live: usize,
}

impl Graph {
    /// Creates an edgeless graph on `n` vertices.
    #[inline]
    pub fn new(n: usize) -> Self {
        let mut active = FixedBitSet::with_capacity(n);
        active.insert_range(..);
        Self {
            adj: vec![FixedBitSet::with_capacity(n); n],
            active,
            merged: vec![MergeClass::new(); n],
            colors: vec![0; n],
            history: GraphHistory::new(),
            live: n,
        }
    }

    /// Creates a graph on `n` vertices from an edge list. Self-loops and
    /// duplicate edges are ignored.
    pub fn from_edges(n: usize, edges: &[(u32, u32)]) -> Self {
        let mut graph = Self::new(n);
        for &(u, v) in edges {
            if u != v {
                graph.adj[u as usize].insert(v as usize);
                graph.adj[v as usize].insert(u as usize);
            }
        }
        graph
    }

    /// Number of vertices of the root instance this graph derives from.
    #[inline]
    pub fn total_vertices(&self) -> usize {
        self.adj.len()
    }

    /// Number of surviving vertices.
    #[inline]
    pub fn num_vertices(&self) -> usize {
        self.live
    }

    /// Number of edges between surviving vertices.
    pub fn num_edges(&self) -> usize {
        self.vertices()
            .map(|v| self.adj[v as usize].count_ones(..))
            .sum::<usize>()
            / 2
    }

    /// Iterates over the surviving vertices in ascending id order.
    #[inline]
    pub fn vertices(&self) -> impl Iterator<Item = u32> + '_ {
        self.active.ones().map(|v| v as u32)
    }

    /// Returns `true` if `v` survives in this graph.
    #[inline]
    pub fn is_active(&self, v: u32) -> bool {
        self.active.contains(v as usize)
    }

    /// Returns `true` if the surviving vertices `u` and `v` are adjacent.
    #[inline]
    pub fn has_edge(&self, u: u32, v: u32) -> bool {
        self.adj[u as usize].contains(v as usize)
    }

    /// Iterates over the neighbors of the surviving vertex `v`.
    #[inline]
    pub fn neighbors(&self, v: u32) -> impl Iterator<Item = u32> + '_ {
        self.adj[v as usize].ones().map(|w| w as u32)
    }

    /// The adjacency row of the surviving vertex `v`, for bitset-level set
    /// operations in the heuristics.
    #[inline]
    pub fn neighbor_row(&self, v: u32) -> &FixedBitSet {
        &self.adj[v as usize]
    }

    /// Degree of the surviving vertex `v`.
    #[inline]
    pub fn degree(&self, v: u32) -> usize {
        self.adj[v as usize].count_ones(..)
    }

    /// Forces `u` and `v` apart by inserting the edge between them.
    ///
    /// # Panics
    ///
    /// In debug builds, panics if either vertex has been absorbed.
    pub fn add_edge(&mut self, u: u32, v: u32) {
        debug_assert!(
            self.is_active(u) && self.is_active(v),
            "called `Graph::add_edge` on an absorbed vertex: u = {}, v = {}",
            u,
            v
        );
        debug_assert_ne!(u, v, "called `Graph::add_edge` with u == v");

        self.adj[u as usize].insert(v as usize);
        self.adj[v as usize].insert(u as usize);
        self.history.push(HistoryOp::AddEdge(u, v));
    }

    /// Forces `u` and `v` to share a color by contracting `v` into `u`.
    /// `v` leaves the active set and joins `u`'s merge class along with
    /// everything previously absorbed into `v`.
    ///
    /// # Panics
    ///
    /// In debug builds, panics if the pair is adjacent (a Zykov merge is
    /// only defined for non-adjacent vertices) or if either vertex has
    /// been absorbed.
    pub fn merge_vertices(&mut self, u: u32, v: u32) {
        debug_assert!(
            self.is_active(u) && self.is_active(v),
            "called `Graph::merge_vertices` on an absorbed vertex: u = {}, v = {}",
            u,
            v
        );
        debug_assert_ne!(u, v, "called `Graph::merge_vertices` with u == v");
        debug_assert!(
            !self.has_edge(u, v),
            "called `Graph::merge_vertices` on an adjacent pair: u = {}, v = {}",
            u,
            v
        );

        let n = self.adj.len();
        let row_v = std::mem::replace(&mut self.adj[v as usize], FixedBitSet::with_capacity(n));
        for w in row_v.ones() {
            self.adj[w].set(v as usize, false);
            self.adj[w].insert(u as usize);
        }
        self.adj[u as usize].union_with(&row_v);
        self.adj[u as usize].set(u as usize, false);

        self.active.set(v as usize, false);
        self.live -= 1;

        let absorbed = std::mem::take(&mut self.merged[v as usize]);
        self.merged[u as usize].push(v);
        self.merged[u as usize].extend(absorbed);

        self.history.push(HistoryOp::Merge(u, v));
    }

    /// The original vertices absorbed into the surviving vertex `v`.
    #[inline]
    pub fn merged_vertices(&self, v: u32) -> &[u32] {
        &self.merged[v as usize]
    }

    /// Color of `v` (`0` = uncolored).
    #[inline]
    pub fn color(&self, v: u32) -> u16 {
        self.colors[v as usize]
    }

    /// Sets the color of `v`.
    #[inline]
    pub fn set_color(&mut self, v: u32, color: u16) {
        self.colors[v as usize] = color;
    }

    /// Clears every vertex color back to the uncolored state.
    #[inline]
    pub fn reset_colors(&mut self) {
        self.colors.fill(0);
    }

    /// The per-original-vertex color vector.
    #[inline]
    pub fn full_coloring(&self) -> Vec<u16> {
        self.colors.clone()
    }

    /// Installs a per-original-vertex color vector.
    ///
    /// # Panics
    ///
    /// Panics if the length does not match the root vertex count.
    pub fn set_full_coloring(&mut self, coloring: &[u16]) {
        assert_eq!(
            coloring.len(),
            self.colors.len(),
            "full coloring length {} does not match vertex count {}",
            coloring.len(),
            self.colors.len()
        );
        self.colors.copy_from_slice(coloring);
    }

    /// The largest color in use, which for a gap-free coloring is the
    /// number of colors.
    #[inline]
    pub fn max_color(&self) -> u16 {
        self.colors.iter().copied().max().unwrap_or(0)
    }

    /// The operations applied since the root instance.
    #[inline]
    pub fn history(&self) -> &GraphHistory {
        &self.history
    }

    /// Re-applies a single history operation. Used by history replay;
    /// records the op again so the materialized graph re-serializes to the
    /// same log.
    #[inline]
    pub(crate) fn apply(&mut self, op: HistoryOp) {
        match op {
            HistoryOp::AddEdge(u, v) => self.add_edge(u, v),
            HistoryOp::Merge(u, v) => self.merge_vertices(u, v),
        }
    }
}

impl std::fmt::Display for Graph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Graph(vertices: {}/{}, edges: {}, ops: {})",
            self.num_vertices(),
            self.total_vertices(),
            self.num_edges(),
            self.history.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path_graph(n: usize) -> Graph {
        let edges: Vec<(u32, u32)> = (0..n as u32 - 1).map(|i| (i, i + 1)).collect();
        Graph::from_edges(n, &edges)
    }

    #[test]
    fn test_from_edges_basic_shape() {
        let g = Graph::from_edges(4, &[(0, 1), (1, 2), (2, 3), (0, 1)]);
        assert_eq!(g.total_vertices(), 4);
        assert_eq!(g.num_vertices(), 4);
        assert_eq!(g.num_edges(), 3, "duplicate edges must not be counted");
        assert!(g.has_edge(0, 1));
        assert!(g.has_edge(1, 0));
        assert!(!g.has_edge(0, 2));
    }

    #[test]
    fn test_add_edge_records_history() {
        let mut g = Graph::from_edges(3, &[(0, 1)]);
        g.add_edge(1, 2);
        assert!(g.has_edge(1, 2));
        assert_eq!(g.history().len(), 1);
        assert_eq!(g.history().ops()[0], HistoryOp::AddEdge(1, 2));
    }

    #[test]
    fn test_merge_contracts_and_rewires() {
        // 0-1, 2-3; merge 0 and 2.
        let mut g = Graph::from_edges(4, &[(0, 1), (2, 3)]);
        g.merge_vertices(0, 2);

        assert_eq!(g.num_vertices(), 3);
        assert!(!g.is_active(2));
        assert!(g.has_edge(0, 1));
        assert!(g.has_edge(0, 3), "neighbors of the absorbed vertex move");
        assert!(!g.has_edge(1, 3));
        assert_eq!(g.merged_vertices(0), &[2]);

        // The absorbed vertex no longer appears in any active row.
        for v in g.vertices() {
            assert!(!g.has_edge(v, 2), "vertex {} still references 2", v);
        }
    }

    #[test]
    fn test_merge_classes_are_transitive() {
        let mut g = Graph::new(5);
        g.merge_vertices(3, 4);
        g.merge_vertices(0, 3);
        let mut class = g.merged_vertices(0).to_vec();
        class.sort_unstable();
        assert_eq!(class, vec![3, 4]);
        assert_eq!(g.num_vertices(), 3);
    }

    #[test]
    fn test_merge_classes_partition_root() {
        let mut g = path_graph(6);
        g.merge_vertices(0, 2);
        g.merge_vertices(3, 5);
        g.merge_vertices(0, 4);

        let mut seen: Vec<u32> = g.vertices().collect();
        for v in g.vertices() {
            seen.extend_from_slice(g.merged_vertices(v));
        }
        seen.sort_unstable();
        assert_eq!(seen, vec![0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_colors_roundtrip() {
        let mut g = Graph::new(3);
        g.set_color(1, 7);
        assert_eq!(g.color(1), 7);
        assert_eq!(g.max_color(), 7);
        let full = g.full_coloring();
        assert_eq!(full, vec![0, 7, 0]);

        g.reset_colors();
        assert_eq!(g.max_color(), 0);
        g.set_full_coloring(&full);
        assert_eq!(g.color(1), 7);
    }

    #[test]
    fn test_num_edges_after_merge() {
        // Square 0-1-2-3-0; merging the diagonal 0,2 leaves a path 1-0'-3
        // (the parallel edges collapse).
        let mut g = Graph::from_edges(4, &[(0, 1), (1, 2), (2, 3), (3, 0)]);
        g.merge_vertices(0, 2);
        assert_eq!(g.num_vertices(), 3);
        assert_eq!(g.num_edges(), 2);
    }
}
