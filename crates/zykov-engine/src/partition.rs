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

//! Balanced initial partition.
//!
//! Before the parallel region starts, every rank walks the top of the
//! Zykov tree by binary search over the rank interval `[0, P-1]`: at
//! each level the upper half of the interval takes the merge child, the
//! lower half the add-edge child, until the interval is a single rank.
//! Each rank ends up with a disjoint subproblem of comparable size,
//! even for P not a power of two, so no initial idling or stealing
//! wave is needed.
//!
//! Every rank replays the same pair choices from the same root, which is
//! why the branching strategy must be deterministic.

use crate::branch::Branch;
use crate::strategy::Strategies;
use zykov_graph::Graph;

/// Derives this rank's seed branch and bounds it.
pub fn initial_seed(
    root: &Graph,
    rank: usize,
    size: usize,
    strategies: &mut Strategies,
) -> Branch {
    let mut graph = root.clone();
    let mut lo = 0usize;
    let mut hi = size - 1;
    let mut depth = 1i32;

    while lo != hi {
        depth += 1;
        // A residual too small to split leaves the interval early; the
        // affected ranks simply start from the same subproblem.
        let Some((u, v)) = strategies.branching.choose(&graph) else {
            break;
        };
        let delta = (hi + 1 - lo) / 2;
        if rank >= lo + delta {
            graph.merge_vertices(u, v);
            lo += delta;
        } else {
            graph.add_edge(u, v);
            hi -= delta;
        }
    }

    let lb = strategies.clique.find_clique(&graph);
    let ub = strategies.color.color(&mut graph);
    Branch::new(graph, lb, ub, depth)
}

#[cfg(test)]
mod tests {
    use super::*;
    use zykov_heur::ColorStrategyKind;

    fn cycle(n: usize) -> Graph {
        let edges: Vec<(u32, u32)> = (0..n as u32).map(|i| (i, (i + 1) % n as u32)).collect();
        Graph::from_edges(n, &edges)
    }

    #[test]
    fn test_single_rank_keeps_the_root() {
        let root = cycle(8);
        let seed = initial_seed(&root, 0, 1, &mut Strategies::standard(ColorStrategyKind::Greedy));
        assert_eq!(seed.depth, 1);
        assert_eq!(seed.graph.num_vertices(), 8);
        assert!(seed.graph.history().is_empty());
    }

    #[test]
    fn test_two_ranks_split_on_the_first_pair() {
        let root = cycle(8);
        let seed0 = initial_seed(&root, 0, 2, &mut Strategies::standard(ColorStrategyKind::Greedy));
        let seed1 = initial_seed(&root, 1, 2, &mut Strategies::standard(ColorStrategyKind::Greedy));

        assert_eq!(seed0.depth, 2);
        assert_eq!(seed1.depth, 2);
        // Lower half adds the edge, upper half merges.
        assert_eq!(seed0.graph.num_vertices(), 8);
        assert_eq!(seed1.graph.num_vertices(), 7);
        assert_eq!(seed0.graph.history().len(), 1);
        assert_eq!(seed1.graph.history().len(), 1);
    }

    #[test]
    fn test_four_ranks_get_disjoint_seeds() {
        let root = cycle(10);
        let seeds: Vec<Branch> = (0..4)
            .map(|rank| {
                initial_seed(
                    &root,
                    rank,
                    4,
                    &mut Strategies::standard(ColorStrategyKind::Greedy),
                )
            })
            .collect();

        for seed in &seeds {
            assert_eq!(seed.depth, 3, "two split levels for four ranks");
        }
        // All four op logs differ pairwise: the subproblems are disjoint.
        for i in 0..4 {
            for j in i + 1..4 {
                assert_ne!(
                    seeds[i].graph.history(),
                    seeds[j].graph.history(),
                    "ranks {i} and {j} received the same subproblem"
                );
            }
        }
    }

    #[test]
    fn test_three_ranks_terminate() {
        let root = cycle(9);
        for rank in 0..3 {
            let seed = initial_seed(
                &root,
                rank,
                3,
                &mut Strategies::standard(ColorStrategyKind::Greedy),
            );
            assert!(seed.depth >= 2);
            assert!(seed.lb >= 1);
            assert!(seed.ub >= 1);
        }
    }

    #[test]
    fn test_complete_root_falls_back_to_root_seed() {
        let mut edges = Vec::new();
        for u in 0..4u32 {
            for v in u + 1..4 {
                edges.push((u, v));
            }
        }
        let root = Graph::from_edges(4, &edges);
        let seed = initial_seed(&root, 1, 4, &mut Strategies::standard(ColorStrategyKind::Greedy));
        // No non-adjacent pair to split on: the rank starts from the root.
        assert!(seed.graph.history().is_empty());
        assert_eq!(seed.ub, 4);
        assert_eq!(seed.lb, 4);
    }
}
