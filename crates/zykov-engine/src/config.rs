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

//! Engine configuration.

use std::path::PathBuf;
use std::time::Duration;

/// Per-run engine settings, identical across ranks. The solution-gather
/// period in particular must match on every rank: the gather is a
/// collective, and every rank has to enter it on the same cadence.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Wall-clock budget for the whole run.
    pub timeout: Duration,
    /// Cadence of the best-bound all-gather.
    pub sol_gather_period: Duration,
    /// `true` = balanced initial partition, both children always;
    /// `false` = depth-rank gated children from a shared root.
    pub balanced: bool,
    /// Known chromatic number used as an early-termination target.
    pub expected_chi: Option<u16>,
    /// Directory for per-rank search trace files; `None` disables
    /// tracing.
    pub trace_dir: Option<PathBuf>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(60),
            sol_gather_period: Duration::from_secs(10),
            balanced: true,
            expected_chi: None,
            trace_dir: None,
        }
    }
}
