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

//! The heuristic bundle a worker runs with.

use zykov_heur::{
    BranchingStrategy, CliqueStrategy, ColorStrategy, ColorStrategyKind,
    CommonNeighborsBranching, GreedyCliqueStrategy,
};

/// The three capability interfaces the engine consumes, boxed so the
/// concrete mix is a runtime choice. Each rank owns its own bundle;
/// strategies are stateful (the interleaved colorers count calls) and
/// are never shared between threads.
pub struct Strategies {
    pub branching: Box<dyn BranchingStrategy + Send>,
    pub clique: Box<dyn CliqueStrategy + Send>,
    pub color: Box<dyn ColorStrategy + Send>,
}

impl Strategies {
    /// The standard bundle: common-neighbors branching, greedy clique,
    /// and the coloring family selected by `kind`.
    pub fn standard(kind: ColorStrategyKind) -> Self {
        Self {
            branching: Box::new(CommonNeighborsBranching::new()),
            clique: Box::new(GreedyCliqueStrategy::new()),
            color: kind.build(),
        }
    }
}

impl std::fmt::Debug for Strategies {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Strategies").finish_non_exhaustive()
    }
}
