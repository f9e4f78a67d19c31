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

mod args;
mod expected;
mod report;

use anyhow::Context;
use args::Args;
use clap::Parser;
use log::info;
use report::RunReport;
use std::path::Path;
use std::time::{Duration, Instant};
use zykov_engine::{run_cluster, EngineConfig, Strategies, THREADS_PER_RANK};
use zykov_graph::DimacsLoader;
use zykov_heur::ColorStrategyKind;

/// The expected-χ table next to the working directory.
const EXPECTED_CHI_TABLE: &str = "expected_chi.txt";

fn main() {
    // Argument errors exit with 1; clap's default would be 2.
    let parsed = match Args::try_parse() {
        Ok(parsed) => parsed,
        Err(err) => {
            let _ = err.print();
            let code = match err.kind() {
                clap::error::ErrorKind::DisplayHelp | clap::error::ErrorKind::DisplayVersion => 0,
                _ => 1,
            };
            std::process::exit(code);
        }
    };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(err) = run(parsed) {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

fn run(args: Args) -> anyhow::Result<()> {
    args.validate()?;

    let expected_chi = expected::lookup(Path::new(EXPECTED_CHI_TABLE), &args.instance)?;
    let graph = DimacsLoader::new()
        .from_path(&args.instance)
        .with_context(|| format!("could not read instance {}", args.instance.display()))?;

    let kind = ColorStrategyKind::from_id(args.color_strategy)
        .expect("color strategy id was validated");

    info!(
        "instance {} ({} vertices, {} edges), expected chi {}",
        args.instance.display(),
        graph.total_vertices(),
        graph.num_edges(),
        expected_chi
    );
    info!(
        "timeout {}s, gather period {}s, balanced {}, color strategy {}, {} workers",
        args.timeout, args.sol_gather_period, args.balanced, kind, args.workers
    );

    let config = EngineConfig {
        timeout: Duration::from_secs(args.timeout),
        sol_gather_period: Duration::from_secs(args.sol_gather_period),
        balanced: args.balanced == 1,
        expected_chi: Some(expected_chi),
        trace_dir: (args.logging == 1).then(|| "logs".into()),
    };

    let start = Instant::now();
    let outcome = run_cluster(&graph, args.workers, config, |_| Strategies::standard(kind))
        .context("solver run failed")?;
    let wall_time = start.elapsed();

    info!("{}", outcome);
    if let Some(optimum_time) = outcome.optimum_time {
        info!("optimum found after {:.3}s", optimum_time.as_secs_f64());
    } else {
        info!("run ended by timeout");
    }

    // A run torn down before any rank could witness a bound (for
    // instance a timeout shorter than initialization) still reports a
    // coloring: fall back to a fresh heuristic one.
    let coloring = match outcome.coloring {
        Some(coloring) => coloring,
        None => {
            let mut fallback = graph.clone();
            kind.build().color(&mut fallback);
            fallback.full_coloring()
        }
    };

    if !report::is_proper_coloring(&graph, &coloring) {
        println!("Coloring is not valid!");
    }

    if outcome.best_ub == expected_chi {
        println!("Succeeded: Chromatic number: {}", outcome.best_ub);
    } else {
        println!(
            "Failed: expected {} but got {}",
            expected_chi, outcome.best_ub
        );
    }

    let run_report = RunReport {
        instance: &args.instance,
        cmd_line: std::env::args().collect::<Vec<_>>().join(" "),
        solver_version: env!("CARGO_PKG_VERSION"),
        num_vertices: graph.total_vertices(),
        num_edges: graph.num_edges(),
        time_limit_secs: args.timeout,
        worker_processes: args.workers,
        cores_per_worker: THREADS_PER_RANK,
        wall_time,
        within_time_limit: !outcome.timed_out,
        coloring: &coloring,
    };
    report::write_report(&args.output, &run_report)
        .with_context(|| format!("could not write report to {}", args.output.display()))?;

    Ok(())
}
