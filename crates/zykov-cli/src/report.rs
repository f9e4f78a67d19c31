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

//! The persisted run report: one key per line, then the coloring as
//! `<vertex> <color>` pairs in 1-based DIMACS vertex ids.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::time::Duration;
use zykov_graph::Graph;

/// Everything the report file records about a run.
#[derive(Debug)]
pub struct RunReport<'a> {
    pub instance: &'a Path,
    pub cmd_line: String,
    pub solver_version: &'a str,
    pub num_vertices: usize,
    pub num_edges: usize,
    pub time_limit_secs: u64,
    pub worker_processes: usize,
    pub cores_per_worker: usize,
    pub wall_time: Duration,
    pub within_time_limit: bool,
    /// Full per-vertex coloring, 0-based indexing, 1-based colors.
    pub coloring: &'a [u16],
}

/// Writes the report file.
pub fn write_report(path: &Path, report: &RunReport<'_>) -> std::io::Result<()> {
    let mut out = BufWriter::new(File::create(path)?);

    let instance_name = report
        .instance
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| report.instance.display().to_string());

    writeln!(out, "problem_instance_file_name {}", instance_name)?;
    writeln!(out, "cmd line {}", report.cmd_line)?;
    writeln!(out, "solver version {}", report.solver_version)?;
    writeln!(out, "number_of_vertices {}", report.num_vertices)?;
    writeln!(out, "number_of_edges {}", report.num_edges)?;
    writeln!(out, "time_limit_sec {}", report.time_limit_secs)?;
    writeln!(out, "number_of_worker_processes {}", report.worker_processes)?;
    writeln!(out, "number_of_cores_per_worker {}", report.cores_per_worker)?;
    writeln!(out, "wall_time_sec {:.3}", report.wall_time.as_secs_f64())?;
    writeln!(out, "is_within_time_limit {}", report.within_time_limit)?;

    let number_of_colors = report.coloring.iter().copied().max().unwrap_or(0);
    writeln!(out, "number_of_colors {}", number_of_colors)?;

    for (vertex, color) in report.coloring.iter().enumerate() {
        writeln!(out, "{} {}", vertex + 1, color)?;
    }
    out.flush()
}

/// Integrity check on the heuristic chain: every vertex colored, no edge
/// monochromatic.
pub fn is_proper_coloring(graph: &Graph, coloring: &[u16]) -> bool {
    if coloring.len() != graph.total_vertices() {
        return false;
    }
    for v in graph.vertices() {
        if coloring[v as usize] == 0 {
            return false;
        }
        for w in graph.neighbors(v) {
            if coloring[v as usize] == coloring[w as usize] {
                return false;
            }
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn report_path(tag: &str) -> PathBuf {
        std::env::temp_dir().join(format!("zykov-report-{}-{}.txt", std::process::id(), tag))
    }

    #[test]
    fn test_report_format() {
        let path = report_path("format");
        let coloring = vec![1u16, 2, 1];
        let report = RunReport {
            instance: Path::new("graphs/myciel3.col"),
            cmd_line: "zykov myciel3.col --timeout=60".to_string(),
            solver_version: "0.3.0",
            num_vertices: 3,
            num_edges: 2,
            time_limit_secs: 60,
            worker_processes: 2,
            cores_per_worker: 4,
            wall_time: Duration::from_millis(1234),
            within_time_limit: true,
            coloring: &coloring,
        };
        write_report(&path, &report).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "problem_instance_file_name myciel3.col");
        assert_eq!(lines[1], "cmd line zykov myciel3.col --timeout=60");
        assert_eq!(lines[2], "solver version 0.3.0");
        assert_eq!(lines[3], "number_of_vertices 3");
        assert_eq!(lines[4], "number_of_edges 2");
        assert_eq!(lines[5], "time_limit_sec 60");
        assert_eq!(lines[6], "number_of_worker_processes 2");
        assert_eq!(lines[7], "number_of_cores_per_worker 4");
        assert!(lines[8].starts_with("wall_time_sec 1.234"));
        assert_eq!(lines[9], "is_within_time_limit true");
        assert_eq!(lines[10], "number_of_colors 2");
        assert_eq!(lines[11], "1 1");
        assert_eq!(lines[12], "2 2");
        assert_eq!(lines[13], "3 1");

        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn test_proper_coloring_check() {
        let graph = Graph::from_edges(3, &[(0, 1), (1, 2)]);
        assert!(is_proper_coloring(&graph, &[1, 2, 1]));
        assert!(!is_proper_coloring(&graph, &[1, 1, 2]), "monochromatic edge");
        assert!(!is_proper_coloring(&graph, &[1, 2, 0]), "uncolored vertex");
        assert!(!is_proper_coloring(&graph, &[1, 2]), "length mismatch");
    }
}
