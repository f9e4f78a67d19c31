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

//! The expected-χ table.
//!
//! `expected_chi.txt` maps instance file names to their known chromatic
//! numbers, one `name value` pair per line. The value feeds the engine's
//! early-termination target; a missing table or entry is a fatal
//! argument error.

use anyhow::{bail, Context};
use std::path::Path;

/// Looks up the expected chromatic number for `instance`.
pub fn lookup(table: &Path, instance: &Path) -> anyhow::Result<u16> {
    let key = instance
        .file_name()
        .and_then(|name| name.to_str())
        .with_context(|| format!("instance path {} has no file name", instance.display()))?;

    let text = std::fs::read_to_string(table)
        .with_context(|| format!("could not open expected results table {}", table.display()))?;

    for (index, line) in text.lines().enumerate() {
        let mut fields = line.split_whitespace();
        let (Some(name), Some(value)) = (fields.next(), fields.next()) else {
            continue;
        };
        if name == key {
            return value.parse().with_context(|| {
                format!(
                    "{}:{}: expected chromatic number '{}' is not an integer",
                    table.display(),
                    index + 1,
                    value
                )
            });
        }
    }

    bail!(
        "no expected chromatic number for {} in {}",
        key,
        table.display()
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn write_table(lines: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!(
            "zykov-expected-{}-{:p}.txt",
            std::process::id(),
            lines
        ));
        std::fs::write(&path, lines).unwrap();
        path
    }

    #[test]
    fn test_lookup_finds_entry() {
        let table = write_table("myciel3.col 4\nqueen5_5.col 5\n");
        let chi = lookup(&table, Path::new("graphs/queen5_5.col")).unwrap();
        assert_eq!(chi, 5);
        let _ = std::fs::remove_file(table);
    }

    #[test]
    fn test_missing_entry_fails() {
        let table = write_table("myciel3.col 4\n");
        assert!(lookup(&table, Path::new("dsjc125.col")).is_err());
        let _ = std::fs::remove_file(table);
    }

    #[test]
    fn test_missing_table_fails() {
        assert!(lookup(Path::new("/nonexistent/expected_chi.txt"), Path::new("a.col")).is_err());
    }

    #[test]
    fn test_malformed_value_fails() {
        let table = write_table("myciel3.col four\n");
        assert!(lookup(&table, Path::new("myciel3.col")).is_err());
        let _ = std::fs::remove_file(table);
    }
}
