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

//! DIMACS `.col` instance loader.
//!
//! The loader accepts any `BufRead`, file path, raw reader, or string
//! slice. Comment lines (`c`) are skipped, the problem line (`p edge N M`,
//! `col` accepted as a descriptor alias) fixes the vertex count, and edge
//! lines (`e u v`) use 1-based vertex ids as the format prescribes.
//! Errors are descriptive and point at the offending line.

use crate::graph::Graph;
use std::{
    fs::File,
    io::{BufRead, BufReader, Read},
    path::Path,
};

/// The error type for DIMACS loading.
#[derive(Debug)]
pub enum DimacsError {
    /// An I/O error occurred while reading the input stream.
    Io(std::io::Error),
    /// The stream ended without a problem line.
    MissingProblemLine,
    /// A second problem line appeared.
    DuplicateProblemLine { line: usize },
    /// A line did not have the expected number of fields.
    MalformedLine { line: usize },
    /// A numeric token could not be parsed.
    Parse { line: usize, token: String },
    /// An edge referenced a vertex outside `1..=N`.
    VertexOutOfRange {
        line: usize,
        vertex: usize,
        num_vertices: usize,
    },
    /// A line started with an unknown descriptor.
    UnknownDescriptor { line: usize, descriptor: String },
}

impl std::fmt::Display for DimacsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::MissingProblemLine => write!(f, "no `p edge` problem line found"),
            Self::DuplicateProblemLine { line } => {
                write!(f, "line {}: duplicate problem line", line)
            }
            Self::MalformedLine { line } => write!(f, "line {}: malformed line", line),
            Self::Parse { line, token } => {
                write!(f, "line {}: could not parse token '{}'", line, token)
            }
            Self::VertexOutOfRange {
                line,
                vertex,
                num_vertices,
            } => write!(
                f,
                "line {}: vertex {} out of range 1..={}",
                line, vertex, num_vertices
            ),
            Self::UnknownDescriptor { line, descriptor } => {
                write!(f, "line {}: unknown descriptor '{}'", line, descriptor)
            }
        }
    }
}

impl std::error::Error for DimacsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for DimacsError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

/// Loader for DIMACS graph-coloring instances.
#[derive(Debug, Clone, Copy, Default)]
pub struct DimacsLoader;

impl DimacsLoader {
    /// Creates a loader.
    #[inline]
    pub fn new() -> Self {
        Self
    }

    /// Loads an instance from a file path.
    pub fn from_path<P: AsRef<Path>>(&self, path: P) -> Result<Graph, DimacsError> {
        let file = File::open(path)?;
        self.from_buf_read(BufReader::new(file))
    }

    /// Loads an instance from a raw reader.
    pub fn from_reader<R: Read>(&self, reader: R) -> Result<Graph, DimacsError> {
        self.from_buf_read(BufReader::new(reader))
    }

    /// Loads an instance from an in-memory string.
    pub fn from_str(&self, text: &str) -> Result<Graph, DimacsError> {
        self.from_buf_read(text.as_bytes())
    }

    /// Loads an instance from any buffered reader.
    pub fn from_buf_read<R: BufRead>(&self, reader: R) -> Result<Graph, DimacsError> {
        let mut num_vertices: Option<usize> = None;
        let mut edges: Vec<(u32, u32)> = Vec::new();

        for (index, line) in reader.lines().enumerate() {
            let line = line?;
            let line_no = index + 1;
            let mut fields = line.split_whitespace();
            let Some(descriptor) = fields.next() else {
                continue;
            };

            match descriptor {
                "c" => {}
                "p" => {
                    if num_vertices.is_some() {
                        return Err(DimacsError::DuplicateProblemLine { line: line_no });
                    }
                    // `p <format> <vertices> <edges>`; the edge count is
                    // advisory and recomputed from the edge lines.
                    let _format = fields
                        .next()
                        .ok_or(DimacsError::MalformedLine { line: line_no })?;
                    let n = parse_token(fields.next(), line_no)?;
                    let _m: usize = parse_token(fields.next(), line_no)?;
                    num_vertices = Some(n);
                }
                "e" => {
                    let n = num_vertices.ok_or(DimacsError::MissingProblemLine)?;
                    let u: usize = parse_token(fields.next(), line_no)?;
                    let v: usize = parse_token(fields.next(), line_no)?;
                    for vertex in [u, v] {
                        if vertex == 0 || vertex > n {
                            return Err(DimacsError::VertexOutOfRange {
                                line: line_no,
                                vertex,
                                num_vertices: n,
                            });
                        }
                    }
                    edges.push((u as u32 - 1, v as u32 - 1));
                }
                other => {
                    return Err(DimacsError::UnknownDescriptor {
                        line: line_no,
                        descriptor: other.to_string(),
                    });
                }
            }
        }

        let n = num_vertices.ok_or(DimacsError::MissingProblemLine)?;
        Ok(Graph::from_edges(n, &edges))
    }
}

fn parse_token<T: std::str::FromStr>(
    token: Option<&str>,
    line: usize,
) -> Result<T, DimacsError> {
    let token = token.ok_or(DimacsError::MalformedLine { line })?;
    token.parse().map_err(|_| DimacsError::Parse {
        line,
        token: token.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SQUARE: &str = "\
c a 4-cycle
p edge 4 4
e 1 2
e 2 3
e 3 4
e 4 1
";

    #[test]
    fn test_load_square() {
        let g = DimacsLoader::new().from_str(SQUARE).expect("square loads");
        assert_eq!(g.total_vertices(), 4);
        assert_eq!(g.num_edges(), 4);
        assert!(g.has_edge(0, 1));
        assert!(g.has_edge(3, 0));
        assert!(!g.has_edge(0, 2));
    }

    #[test]
    fn test_comments_and_blank_lines_are_ignored() {
        let text = "c header\n\nc more\np col 2 1\ne 1 2\n";
        let g = DimacsLoader::new().from_str(text).unwrap();
        assert_eq!(g.total_vertices(), 2);
        assert!(g.has_edge(0, 1));
    }

    #[test]
    fn test_missing_problem_line() {
        match DimacsLoader::new().from_str("e 1 2\n") {
            Err(DimacsError::MissingProblemLine) => {}
            other => panic!("expected MissingProblemLine, got {:?}", other.err()),
        }
    }

    #[test]
    fn test_vertex_out_of_range() {
        match DimacsLoader::new().from_str("p edge 3 1\ne 1 4\n") {
            Err(DimacsError::VertexOutOfRange {
                line: 2, vertex: 4, ..
            }) => {}
            other => panic!("expected VertexOutOfRange, got {:?}", other.err()),
        }
    }

    #[test]
    fn test_unparsable_token() {
        match DimacsLoader::new().from_str("p edge x 1\n") {
            Err(DimacsError::Parse { line: 1, token }) => assert_eq!(token, "x"),
            other => panic!("expected Parse, got {:?}", other.err()),
        }
    }

    #[test]
    fn test_duplicate_problem_line() {
        match DimacsLoader::new().from_str("p edge 2 0\np edge 3 0\n") {
            Err(DimacsError::DuplicateProblemLine { line: 2 }) => {}
            other => panic!("expected DuplicateProblemLine, got {:?}", other.err()),
        }
    }
}
