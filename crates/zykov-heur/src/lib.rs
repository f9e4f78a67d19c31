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

//! # Heuristic Strategies
//!
//! The capability interfaces the branch-and-bound engine consumes
//! (branching-pair selection, clique lower bounds, coloring upper
//! bounds) together with their heuristic implementations. The engine never
//! depends on a concrete heuristic: every bound it uses flows through one
//! of the three traits defined here.
//!
//! None of the heuristics claims exactness. A clique found greedily is a
//! valid lower bound on χ because every clique needs pairwise-distinct
//! colors; any proper coloring is a valid upper bound. Tight bounds shrink
//! the search tree but wrong pruning is impossible.

pub mod branching;
pub mod clique;
pub mod color;

pub use branching::CommonNeighborsBranching;
pub use clique::GreedyCliqueStrategy;
pub use color::{
    ColorNRecolorStrategy, ColorStrategyKind, DSaturColorStrategy, GreedyColorStrategy,
    GreedySwapRecolor, InterleavedColorStrategy,
};

use zykov_graph::Graph;

/// Selects the next Zykov branching pair: two surviving, non-adjacent
/// vertices. Returns `None` when the residual graph is complete (no
/// non-adjacent pair remains).
///
/// Implementations must be deterministic: the balanced initial partition
/// relies on every process deriving the same branching path from the same
/// graph.
pub trait BranchingStrategy {
    fn choose(&mut self, graph: &Graph) -> Option<(u32, u32)>;
}

/// Produces a heuristic lower bound on χ by finding a (not necessarily
/// maximum) clique.
pub trait CliqueStrategy {
    fn find_clique(&mut self, graph: &Graph) -> i32;
}

/// Produces a heuristic proper coloring. Implementations set the
/// per-vertex colors on the graph (1-based, `0` = uncolored) and return
/// the number of colors used.
pub trait ColorStrategy {
    fn color(&mut self, graph: &mut Graph) -> u16;
}

/// Improves an existing proper coloring in place, returning the possibly
/// reduced color count.
pub trait RecolorStrategy {
    fn recolor(&mut self, graph: &mut Graph, colors_used: u16) -> u16;
}
