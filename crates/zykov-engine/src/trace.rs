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

//! Per-rank search trace.
//!
//! One trace file per rank, shared by the four role threads under a
//! dedicated mutex. Lines carry the rank, the writing role, a timestamp
//! relative to engine start and an indentation proportional to search
//! depth, so a trace reads like the tree it explored. Disabled tracing
//! is a no-op with no file handle at all.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::Mutex;
use std::time::Instant;

#[derive(Debug)]
struct TraceInner {
    writer: BufWriter<File>,
    rank: usize,
    start: Instant,
}

/// A mutex-guarded trace sink, or a no-op when tracing is off.
#[derive(Debug, Default)]
pub struct SearchTrace {
    inner: Option<Mutex<TraceInner>>,
}

impl SearchTrace {
    /// A trace that drops everything.
    #[inline]
    pub fn disabled() -> Self {
        Self { inner: None }
    }

    /// Opens `log_<rank>.txt` under `dir`, creating the directory if
    /// needed.
    pub fn create(dir: &Path, rank: usize) -> std::io::Result<Self> {
        std::fs::create_dir_all(dir)?;
        let file = File::create(dir.join(format!("log_{rank}.txt")))?;
        Ok(Self {
            inner: Some(Mutex::new(TraceInner {
                writer: BufWriter::new(file),
                rank,
                start: Instant::now(),
            })),
        })
    }

    /// Returns `true` if lines are being written.
    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.inner.is_some()
    }

    /// Writes one trace line. Errors on the trace stream are swallowed;
    /// tracing must never take the search down.
    pub fn log(&self, role: &str, depth: i32, message: &str) {
        let Some(inner) = &self.inner else {
            return;
        };
        let mut inner = inner.lock().expect("trace mutex poisoned");
        let elapsed = inner.start.elapsed().as_secs_f64();
        let rank = inner.rank;
        let indent = " ".repeat((depth.max(0) as usize) * 2);
        let _ = writeln!(
            inner.writer,
            "{indent}[Rank {rank} | {role}] [Time {elapsed:.3}] {message}"
        );
    }
}
