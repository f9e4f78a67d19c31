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

//! Greedy clique lower bound.

use crate::CliqueStrategy;
use zykov_graph::Graph;

/// Grows a clique greedily from each of the highest-degree seeds and
/// keeps the largest. Candidate sets are bitset intersections of
/// neighbor rows, so a growth step is O(n / 64).
#[derive(Debug, Clone, Copy)]
pub struct GreedyCliqueStrategy {
    seeds: usize,
}

impl Default for GreedyCliqueStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl GreedyCliqueStrategy {
    /// Default number of growth seeds.
    const DEFAULT_SEEDS: usize = 4;

    #[inline]
    pub fn new() -> Self {
        Self {
            seeds: Self::DEFAULT_SEEDS,
        }
    }

    /// Creates a strategy growing from the given number of seeds.
    #[inline]
    pub fn with_seeds(seeds: usize) -> Self {
        Self { seeds: seeds.max(1) }
    }

    fn grow(graph: &Graph, seed: u32) -> usize {
        let mut size = 1;
        let mut candidates = graph.neighbor_row(seed).clone();

        loop {
            // Highest-degree candidate, ties to the lowest id.
            let mut next: Option<(usize, u32)> = None;
            for v in candidates.ones() {
                let degree = graph.degree(v as u32);
                match next {
                    Some((best, _)) if degree <= best => {}
                    _ => next = Some((degree, v as u32)),
                }
            }
            let Some((_, v)) = next else {
                return size;
            };

            size += 1;
            candidates.intersect_with(graph.neighbor_row(v));
        }
    }
}

impl CliqueStrategy for GreedyCliqueStrategy {
    fn find_clique(&mut self, graph: &Graph) -> i32 {
        let mut vertices: Vec<u32> = graph.vertices().collect();
        if vertices.is_empty() {
            return 0;
        }
        vertices.sort_by(|&a, &b| graph.degree(b).cmp(&graph.degree(a)).then(a.cmp(&b)));

        let mut best = 1;
        for &seed in vertices.iter().take(self.seeds) {
            best = best.max(Self::grow(graph, seed));
        }
        best as i32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_graph() {
        let g = Graph::new(0);
        assert_eq!(GreedyCliqueStrategy::new().find_clique(&g), 0);
    }

    #[test]
    fn test_edgeless_graph_is_one() {
        let g = Graph::new(5);
        assert_eq!(GreedyCliqueStrategy::new().find_clique(&g), 1);
    }

    #[test]
    fn test_complete_graph() {
        let mut edges = Vec::new();
        for u in 0..5u32 {
            for v in u + 1..5 {
                edges.push((u, v));
            }
        }
        let g = Graph::from_edges(5, &edges);
        assert_eq!(GreedyCliqueStrategy::new().find_clique(&g), 5);
    }

    #[test]
    fn test_triangle_with_pendant() {
        let g = Graph::from_edges(4, &[(0, 1), (0, 2), (1, 2), (2, 3)]);
        assert_eq!(GreedyCliqueStrategy::new().find_clique(&g), 3);
    }

    #[test]
    fn test_bound_is_never_above_omega() {
        // Bipartite: ω = 2, so the heuristic may report at most 2.
        let g = Graph::from_edges(6, &[(0, 3), (0, 4), (1, 3), (1, 5), (2, 4), (2, 5)]);
        let clique = GreedyCliqueStrategy::new().find_clique(&g);
        assert!(clique >= 1 && clique <= 2, "got {}", clique);
    }
}
