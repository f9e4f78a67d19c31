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

//! Command line surface.
//!
//! Flag names keep the historical `--key=value` spelling with
//! underscores, so existing run scripts keep working.

use anyhow::bail;
use clap::Parser;
use std::path::PathBuf;
use zykov_heur::ColorStrategyKind;

#[derive(Parser, Debug)]
#[command(
    name = "zykov",
    version,
    about = "Distributed branch-and-bound chromatic number solver for DIMACS instances"
)]
pub struct Args {
    /// DIMACS instance to solve.
    pub instance: PathBuf,

    /// Wall-clock limit in seconds.
    #[arg(long, default_value_t = 60)]
    pub timeout: u64,

    /// Seconds between best-bound gather rounds.
    #[arg(long = "sol_gather_period", default_value_t = 10)]
    pub sol_gather_period: u64,

    /// 1 = balanced initial partition, 0 = depth-rank gated start.
    #[arg(long, default_value_t = 1)]
    pub balanced: u8,

    /// Coloring heuristic: 0 greedy, 1 greedy+recolor, 2 dsatur,
    /// 3 dsatur+recolor.
    #[arg(long = "color_strategy", default_value_t = 0)]
    pub color_strategy: u8,

    /// Report file.
    #[arg(long, default_value = "output.txt")]
    pub output: PathBuf,

    /// 1 = write per-rank search traces under logs/.
    #[arg(long, default_value_t = 0)]
    pub logging: u8,

    /// Number of worker ranks.
    #[arg(long, default_value_t = 1)]
    pub workers: usize,
}

impl Args {
    /// Range checks beyond what the parser enforces.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.timeout == 0 {
            bail!("timeout must be a positive number of seconds");
        }
        if self.sol_gather_period == 0 {
            bail!("sol_gather_period must be a positive number of seconds");
        }
        if self.balanced > 1 {
            bail!("balanced must be 0 or 1");
        }
        if self.logging > 1 {
            bail!("logging must be 0 or 1");
        }
        if ColorStrategyKind::from_id(self.color_strategy).is_none() {
            bail!("color_strategy must be one of 0, 1, 2, 3");
        }
        if self.workers == 0 {
            bail!("workers must be at least 1");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["zykov", "queen5_5.col"]).unwrap();
        assert_eq!(args.instance, PathBuf::from("queen5_5.col"));
        assert_eq!(args.timeout, 60);
        assert_eq!(args.sol_gather_period, 10);
        assert_eq!(args.balanced, 1);
        assert_eq!(args.color_strategy, 0);
        assert_eq!(args.output, PathBuf::from("output.txt"));
        assert_eq!(args.logging, 0);
        assert_eq!(args.workers, 1);
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_equals_style_flags() {
        let args = Args::try_parse_from([
            "zykov",
            "myciel3.col",
            "--timeout=120",
            "--sol_gather_period=5",
            "--balanced=0",
            "--color_strategy=2",
            "--output=result.txt",
            "--logging=1",
            "--workers=4",
        ])
        .unwrap();
        assert_eq!(args.timeout, 120);
        assert_eq!(args.sol_gather_period, 5);
        assert_eq!(args.balanced, 0);
        assert_eq!(args.color_strategy, 2);
        assert_eq!(args.output, PathBuf::from("result.txt"));
        assert_eq!(args.logging, 1);
        assert_eq!(args.workers, 4);
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_missing_instance_is_rejected() {
        assert!(Args::try_parse_from(["zykov"]).is_err());
    }

    #[test]
    fn test_validate_rejects_bad_ranges() {
        let bad = [
            vec!["zykov", "g.col", "--timeout=0"],
            vec!["zykov", "g.col", "--sol_gather_period=0"],
            vec!["zykov", "g.col", "--balanced=2"],
            vec!["zykov", "g.col", "--color_strategy=7"],
            vec!["zykov", "g.col", "--workers=0"],
        ];
        for argv in bad {
            let args = Args::try_parse_from(argv.clone()).unwrap();
            assert!(args.validate().is_err(), "{argv:?} should be rejected");
        }
    }
}
