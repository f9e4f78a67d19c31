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

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use std::hint::black_box;
use zykov_graph::Graph;

/// A ring with chords, big enough that replay cost is dominated by the
/// merge rewiring rather than the clone.
fn build_root(n: usize) -> Graph {
    let mut edges: Vec<(u32, u32)> = (0..n as u32).map(|i| (i, (i + 1) % n as u32)).collect();
    for i in 0..n as u32 {
        edges.push((i, (i + 7) % n as u32));
    }
    Graph::from_edges(n, &edges)
}

/// Applies an alternating add-edge / merge walk and returns the derived graph.
fn derive(root: &Graph, ops: usize) -> Graph {
    let mut graph = root.clone();
    let mut step = 0usize;
    'outer: for _ in 0..ops {
        let vertices: Vec<u32> = graph.vertices().collect();
        for (i, &u) in vertices.iter().enumerate() {
            for &v in &vertices[i + 1..] {
                if !graph.has_edge(u, v) {
                    if step % 2 == 0 {
                        graph.add_edge(u, v);
                    } else {
                        graph.merge_vertices(u, v);
                    }
                    step += 1;
                    continue 'outer;
                }
            }
        }
        break;
    }
    graph
}

fn bench_history_replay(c: &mut Criterion) {
    let mut group = c.benchmark_group("history_replay");
    for &n in &[64usize, 256] {
        let root = build_root(n);
        let derived = derive(&root, n / 2);
        let history = derived.history().clone();

        group.bench_with_input(BenchmarkId::new("replay", n), &n, |b, _| {
            b.iter(|| {
                let graph = history.replay(black_box(&root)).expect("replay succeeds");
                black_box(graph)
            })
        });

        group.bench_with_input(BenchmarkId::new("encode", n), &n, |b, _| {
            b.iter(|| {
                let mut bytes = Vec::new();
                history.encode_into(black_box(&mut bytes));
                black_box(bytes)
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_history_replay);
criterion_main!(benches);
