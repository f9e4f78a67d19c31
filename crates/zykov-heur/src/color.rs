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

//! # Coloring Upper Bounds
//!
//! A family of proper-coloring heuristics behind the `ColorStrategy`
//! trait. The search calls a color strategy on every generated node, so
//! cost matters as much as quality:
//!
//! - `GreedyColorStrategy`: first-fit in vertex id order. Cheapest,
//!   loosest.
//! - `DSaturColorStrategy`: saturation-degree ordering. Noticeably tighter
//!   on structured instances for an extra O(n²) pass.
//! - `ColorNRecolorStrategy`: a base coloring followed by a recolor
//!   improvement pass.
//! - `InterleavedColorStrategy`: alternates a cheap and an expensive
//!   strategy on a fixed cadence, spending the expensive one sparsely
//!   across the search tree.
//!
//! Colors are 1-based; `0` means uncolored. Every strategy recolors the
//! graph from scratch and returns the number of colors it used.

use crate::{ColorStrategy, RecolorStrategy};
use fixedbitset::FixedBitSet;
use zykov_graph::Graph;

/// First-fit coloring in ascending vertex id order.
#[derive(Debug, Clone, Copy, Default)]
pub struct GreedyColorStrategy;

impl GreedyColorStrategy {
    #[inline]
    pub fn new() -> Self {
        Self
    }
}

impl ColorStrategy for GreedyColorStrategy {
    fn color(&mut self, graph: &mut Graph) -> u16 {
        graph.reset_colors();
        let vertices: Vec<u32> = graph.vertices().collect();
        let mut used = FixedBitSet::with_capacity(vertices.len() + 2);
        let mut max_color = 0u16;

        for &v in &vertices {
            used.clear();
            for w in graph.neighbors(v) {
                let c = graph.color(w);
                if c != 0 {
                    used.insert(c as usize);
                }
            }
            let mut c = 1u16;
            while used.contains(c as usize) {
                c += 1;
            }
            graph.set_color(v, c);
            max_color = max_color.max(c);
        }
        max_color
    }
}

/// DSATUR: repeatedly colors the uncolored vertex whose neighborhood
/// already carries the most distinct colors (ties to higher degree, then
/// lower id).
#[derive(Debug, Clone, Copy, Default)]
pub struct DSaturColorStrategy;

impl DSaturColorStrategy {
    #[inline]
    pub fn new() -> Self {
        Self
    }
}

impl ColorStrategy for DSaturColorStrategy {
    fn color(&mut self, graph: &mut Graph) -> u16 {
        graph.reset_colors();
        let vertices: Vec<u32> = graph.vertices().collect();
        if vertices.is_empty() {
            return 0;
        }

        // Per-vertex set of colors present in the neighborhood, indexed by
        // original id; only entries of surviving vertices are touched.
        let mut neighbor_colors =
            vec![FixedBitSet::with_capacity(vertices.len() + 2); graph.total_vertices()];
        let mut max_color = 0u16;

        for _ in 0..vertices.len() {
            let mut pick: Option<(usize, usize, u32)> = None;
            for &v in &vertices {
                if graph.color(v) != 0 {
                    continue;
                }
                let saturation = neighbor_colors[v as usize].count_ones(..);
                let degree = graph.degree(v);
                let better = match pick {
                    None => true,
                    Some((s, d, id)) => {
                        saturation > s
                            || (saturation == s && (degree > d || (degree == d && v < id)))
                    }
                };
                if better {
                    pick = Some((saturation, degree, v));
                }
            }
            let (_, _, v) = pick.expect("an uncolored vertex remains");

            let taken = &neighbor_colors[v as usize];
            let mut c = 1u16;
            while taken.contains(c as usize) {
                c += 1;
            }
            graph.set_color(v, c);
            max_color = max_color.max(c);
            for w in graph.neighbors(v) {
                neighbor_colors[w as usize].insert(c as usize);
            }
        }
        max_color
    }
}

/// Tries to empty the top color class, moving each of its vertices either
/// directly into a lower class or via a single Kempe-style swap with one
/// conflicting neighbor. Repeats while a class can be emptied; aborts a
/// round atomically when one vertex cannot move.
#[derive(Debug, Clone, Copy, Default)]
pub struct GreedySwapRecolor;

impl GreedySwapRecolor {
    #[inline]
    pub fn new() -> Self {
        Self
    }

    fn try_eliminate_top(graph: &mut Graph, top: u16) -> bool {
        let victims: Vec<u32> = graph.vertices().filter(|&v| graph.color(v) == top).collect();
        let mut undo: Vec<(u32, u16)> = Vec::new();

        for &v in &victims {
            if !Self::move_vertex(graph, v, top, &mut undo) {
                for &(w, c) in undo.iter().rev() {
                    graph.set_color(w, c);
                }
                return false;
            }
        }
        true
    }

    fn move_vertex(graph: &mut Graph, v: u32, top: u16, undo: &mut Vec<(u32, u16)>) -> bool {
        // Direct move into a free lower class.
        for c in 1..top {
            if graph.neighbors(v).all(|w| graph.color(w) != c) {
                undo.push((v, graph.color(v)));
                graph.set_color(v, c);
                return true;
            }
        }

        // Swap: a class blocked by exactly one neighbor which itself can
        // move elsewhere.
        for c in 1..top {
            let w = {
                let mut conflicts = graph.neighbors(v).filter(|&w| graph.color(w) == c);
                let (Some(w), None) = (conflicts.next(), conflicts.next()) else {
                    continue;
                };
                w
            };
            for c2 in 1..top {
                if c2 == c {
                    continue;
                }
                if graph.neighbors(w).all(|x| x == v || graph.color(x) != c2) {
                    undo.push((w, graph.color(w)));
                    graph.set_color(w, c2);
                    undo.push((v, graph.color(v)));
                    graph.set_color(v, c);
                    return true;
                }
            }
        }
        false
    }
}

impl RecolorStrategy for GreedySwapRecolor {
    fn recolor(&mut self, graph: &mut Graph, mut colors_used: u16) -> u16 {
        while colors_used > 1 && Self::try_eliminate_top(graph, colors_used) {
            colors_used -= 1;
        }
        colors_used
    }
}

/// A base coloring followed by a recolor improvement pass.
#[derive(Debug, Clone, Copy, Default)]
pub struct ColorNRecolorStrategy<B, R> {
    base: B,
    recolor: R,
}

impl<B, R> ColorNRecolorStrategy<B, R> {
    #[inline]
    pub fn new(base: B, recolor: R) -> Self {
        Self { base, recolor }
    }
}

impl<B, R> ColorStrategy for ColorNRecolorStrategy<B, R>
where
    B: ColorStrategy,
    R: RecolorStrategy,
{
    fn color(&mut self, graph: &mut Graph) -> u16 {
        let colors = self.base.color(graph);
        self.recolor.recolor(graph, colors)
    }
}

/// Alternates a light and a heavy strategy: out of every `period` calls
/// the final `heavy_calls` use the heavy one, so the expensive heuristic
/// touches a fixed fraction of the search tree.
#[derive(Debug, Clone)]
pub struct InterleavedColorStrategy<L, H> {
    light: L,
    heavy: H,
    period: u32,
    heavy_calls: u32,
    calls: u32,
}

impl<L, H> InterleavedColorStrategy<L, H> {
    /// # Panics
    ///
    /// Panics if `period` is zero or `heavy_calls > period`.
    pub fn new(light: L, heavy: H, period: u32, heavy_calls: u32) -> Self {
        assert!(period > 0, "interleave period must be positive");
        assert!(
            heavy_calls <= period,
            "heavy_calls {} exceeds period {}",
            heavy_calls,
            period
        );
        Self {
            light,
            heavy,
            period,
            heavy_calls,
            calls: 0,
        }
    }
}

impl<L, H> ColorStrategy for InterleavedColorStrategy<L, H>
where
    L: ColorStrategy,
    H: ColorStrategy,
{
    fn color(&mut self, graph: &mut Graph) -> u16 {
        let phase = self.calls % self.period;
        self.calls = self.calls.wrapping_add(1);
        if phase >= self.period - self.heavy_calls {
            self.heavy.color(graph)
        } else {
            self.light.color(graph)
        }
    }
}

/// The coloring strategies selectable from the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorStrategyKind {
    /// `0`: first-fit greedy.
    Greedy,
    /// `1`: greedy interleaved with DSATUR + recolor.
    MixedGreedy,
    /// `2`: DSATUR.
    DSatur,
    /// `3`: DSATUR interleaved with DSATUR + recolor.
    MixedDSatur,
}

impl ColorStrategyKind {
    /// Period and heavy-call count of the interleaved variants.
    const INTERLEAVE_PERIOD: u32 = 5;
    const INTERLEAVE_HEAVY: u32 = 2;

    /// Maps a `--color_strategy` id.
    pub fn from_id(id: u8) -> Option<Self> {
        match id {
            0 => Some(Self::Greedy),
            1 => Some(Self::MixedGreedy),
            2 => Some(Self::DSatur),
            3 => Some(Self::MixedDSatur),
            _ => None,
        }
    }

    /// Builds a fresh strategy instance.
    pub fn build(self) -> Box<dyn ColorStrategy + Send> {
        match self {
            Self::Greedy => Box::new(GreedyColorStrategy::new()),
            Self::MixedGreedy => Box::new(InterleavedColorStrategy::new(
                GreedyColorStrategy::new(),
                ColorNRecolorStrategy::new(DSaturColorStrategy::new(), GreedySwapRecolor::new()),
                Self::INTERLEAVE_PERIOD,
                Self::INTERLEAVE_HEAVY,
            )),
            Self::DSatur => Box::new(DSaturColorStrategy::new()),
            Self::MixedDSatur => Box::new(InterleavedColorStrategy::new(
                DSaturColorStrategy::new(),
                ColorNRecolorStrategy::new(DSaturColorStrategy::new(), GreedySwapRecolor::new()),
                Self::INTERLEAVE_PERIOD,
                Self::INTERLEAVE_HEAVY,
            )),
        }
    }
}

impl std::fmt::Display for ColorStrategyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Greedy => write!(f, "greedy"),
            Self::MixedGreedy => write!(f, "greedy+recolor"),
            Self::DSatur => write!(f, "dsatur"),
            Self::MixedDSatur => write!(f, "dsatur+recolor"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_proper(graph: &Graph) {
        for v in graph.vertices() {
            assert_ne!(graph.color(v), 0, "vertex {} is uncolored", v);
            for w in graph.neighbors(v) {
                assert_ne!(
                    graph.color(v),
                    graph.color(w),
                    "vertices {} and {} share a color",
                    v,
                    w
                );
            }
        }
    }

    fn complete_graph(n: usize) -> Graph {
        let mut edges = Vec::new();
        for u in 0..n as u32 {
            for v in u + 1..n as u32 {
                edges.push((u, v));
            }
        }
        Graph::from_edges(n, &edges)
    }

    fn crown_graph() -> Graph {
        // Bipartite complement of a perfect matching on 3+3 vertices;
        // the classic instance where id-order greedy wastes colors.
        let mut edges = Vec::new();
        for u in 0..3u32 {
            for v in 3..6u32 {
                if v - 3 != u {
                    edges.push((u, v));
                }
            }
        }
        Graph::from_edges(6, &edges)
    }

    #[test]
    fn test_greedy_is_proper() {
        let mut g = crown_graph();
        let k = GreedyColorStrategy::new().color(&mut g);
        assert_proper(&g);
        assert_eq!(k, g.max_color());
    }

    #[test]
    fn test_greedy_on_complete_graph() {
        let mut g = complete_graph(5);
        assert_eq!(GreedyColorStrategy::new().color(&mut g), 5);
        assert_proper(&g);
    }

    #[test]
    fn test_dsatur_on_even_cycle() {
        let mut g = Graph::from_edges(6, &[(0, 1), (1, 2), (2, 3), (3, 4), (4, 5), (5, 0)]);
        assert_eq!(DSaturColorStrategy::new().color(&mut g), 2);
        assert_proper(&g);
    }

    #[test]
    fn test_dsatur_on_odd_cycle() {
        let mut g = Graph::from_edges(5, &[(0, 1), (1, 2), (2, 3), (3, 4), (4, 0)]);
        assert_eq!(DSaturColorStrategy::new().color(&mut g), 3);
        assert_proper(&g);
    }

    #[test]
    fn test_dsatur_on_empty_graph() {
        let mut g = Graph::new(4);
        assert_eq!(DSaturColorStrategy::new().color(&mut g), 1);
    }

    #[test]
    fn test_recolor_never_worsens_and_stays_proper() {
        let mut g = crown_graph();
        let base = GreedyColorStrategy::new().color(&mut g);
        let improved = GreedySwapRecolor::new().recolor(&mut g, base);
        assert!(improved <= base);
        assert!(improved >= 2);
        assert_proper(&g);
    }

    #[test]
    fn test_color_n_recolor_is_proper() {
        let mut g = crown_graph();
        let mut strategy =
            ColorNRecolorStrategy::new(DSaturColorStrategy::new(), GreedySwapRecolor::new());
        let k = strategy.color(&mut g);
        assert_proper(&g);
        assert!(k >= 2 && k <= 6, "got {}", k);
    }

    #[test]
    fn test_interleaved_cadence() {
        // With period 5 / heavy 2 the call pattern is L L L H H repeating.
        #[derive(Default)]
        struct Probe(u16);
        impl ColorStrategy for Probe {
            fn color(&mut self, _graph: &mut Graph) -> u16 {
                self.0
            }
        }

        let mut g = Graph::new(2);
        let mut strategy = InterleavedColorStrategy::new(Probe(1), Probe(2), 5, 2);
        let pattern: Vec<u16> = (0..10).map(|_| strategy.color(&mut g)).collect();
        assert_eq!(pattern, vec![1, 1, 1, 2, 2, 1, 1, 1, 2, 2]);
    }

    #[test]
    fn test_kind_mapping() {
        assert_eq!(ColorStrategyKind::from_id(0), Some(ColorStrategyKind::Greedy));
        assert_eq!(
            ColorStrategyKind::from_id(3),
            Some(ColorStrategyKind::MixedDSatur)
        );
        assert_eq!(ColorStrategyKind::from_id(4), None);
    }

    #[test]
    fn test_all_kinds_produce_proper_colorings() {
        for id in 0..4u8 {
            let mut g = crown_graph();
            let mut strategy = ColorStrategyKind::from_id(id).unwrap().build();
            let k = strategy.color(&mut g);
            assert!(k >= 2, "strategy {} returned {}", id, k);
            assert_proper(&g);
        }
    }
}
