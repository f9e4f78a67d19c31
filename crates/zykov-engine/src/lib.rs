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

//! # Zykov Engine
//!
//! The distributed parallel branch-and-bound core: P ranks, each running
//! four fixed-role threads, cooperatively exploring a Zykov search tree
//! to prove a chromatic number. Work moves between ranks by random-victim
//! stealing, bounds propagate through a periodic all-gather, and a single
//! master rank owns termination: optimum found, all ranks idle, or
//! wall-clock timeout.
//!
//! ## Modules
//!
//! - `branch`: the search node and its stable wire codec.
//! - `queue`: the depth-prioritized branch queue behind a single mutex.
//! - `fabric`: the transport seam and the in-process channel mesh.
//! - `messaging`: cancelable typed send/receive over the fabric.
//! - `bounds`: atomic best upper bound plus the best-branch snapshot.
//! - `gatherer`, `employer`, `terminator`, `worker`: the four role
//!   threads.
//! - `partition`: the balanced initial partition of the tree across
//!   ranks.
//! - `engine`: one rank; context construction, role threads, outcome.
//! - `cluster`: a whole cluster of ranks inside one process.

pub mod bounds;
pub mod branch;
pub mod cluster;
pub mod config;
pub mod context;
pub mod employer;
pub mod engine;
pub mod error;
pub mod fabric;
pub mod gatherer;
pub mod messaging;
pub mod partition;
pub mod queue;
pub mod strategy;
pub mod terminator;
pub mod trace;
pub mod worker;

pub use branch::Branch;
pub use cluster::run_cluster;
pub use config::EngineConfig;
pub use engine::{Engine, SolveOutcome, THREADS_PER_RANK};
pub use error::EngineError;
pub use fabric::{local::LocalFabric, Fabric};
pub use strategy::Strategies;
pub use worker::ChildPolicy;
