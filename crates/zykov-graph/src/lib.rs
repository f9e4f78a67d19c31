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

//! # Zykov Graph
//!
//! Graph primitives for Zykov-style branch-and-bound coloring. This crate
//! provides the mutable search graph (`Graph`) with its two branching
//! operations, contracting a non-adjacent vertex pair (`merge_vertices`)
//! and forcing one apart (`add_edge`), together with a replayable
//! operation log (`GraphHistory`) and a DIMACS instance loader.
//!
//! ## Modules
//!
//! - `graph`: bitset-adjacency search graph with an active-vertex set,
//!   per-vertex merge classes and per-vertex colors.
//! - `history`: compact little-endian op log replayable against a root
//!   graph, used to move search nodes between processes without shipping
//!   adjacency data.
//! - `dimacs`: loader for DIMACS `.col` instances.

pub mod dimacs;
pub mod graph;
pub mod history;

pub use dimacs::{DimacsError, DimacsLoader};
pub use graph::Graph;
pub use history::{GraphHistory, HistoryDecodeError, HistoryOp};
