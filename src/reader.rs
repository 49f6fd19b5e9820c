//! Line-oriented readers for the numeric text files written by the solver.

use anyhow::{Context, Result};
use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

/// Why a data row was dropped.
#[derive(Debug, Clone, PartialEq)]
pub enum RowIssue {
    /// A token did not parse as a float.
    NotNumeric { token: String },
    /// The row parsed but had the wrong number of columns.
    WrongLength { expected: usize, found: usize },
    /// The row is not valid UTF-8.
    NotUtf8,
}

/// A dropped row, kept so callers can inspect what was skipped.
#[derive(Debug, Clone, PartialEq)]
pub struct RowDiagnostic {
    /// One-based line number in the source file.
    pub line_no: usize,
    pub line: String,
    pub issue: RowIssue,
}

/// Parsed numeric rows, all exactly `n_cols` wide.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    n_cols: usize,
    rows: Vec<Vec<f64>>,
    diagnostics: Vec<RowDiagnostic>,
}

impl Table {
    pub fn n_cols(&self) -> usize {
        self.n_cols
    }

    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }

    pub fn diagnostics(&self) -> &[RowDiagnostic] {
        &self.diagnostics
    }

    /// Copy column `i_col` out as its own vector.
    pub fn column(&self, i_col: usize) -> Vec<f64> {
        self.rows.iter().map(|row| row[i_col]).collect()
    }
}

/// Read a force or moment file.
///
/// Blank lines and `#` comments are skipped, parentheses around tokens are
/// stripped and only rows with exactly `n_cols` numbers are kept.
///
/// # Errors
/// Returns an error if the file cannot be opened or read.
pub fn read_table<P: AsRef<Path>>(file: P, n_cols: usize) -> Result<Table> {
    let file = file.as_ref();
    let reader = open(file)?;
    let table = parse_table(reader, n_cols, 0).with_context(|| format!("failed to read {file:?}"))?;
    log_table(file, &table);
    Ok(table)
}

/// Read a fixed-format file, skipping the first `n_header` lines.
///
/// Rows are plain numbers (no parentheses); comments and blank lines after
/// the header are skipped as well.
///
/// # Errors
/// Returns an error if the file cannot be opened or read.
pub fn read_fixed_table<P: AsRef<Path>>(file: P, n_cols: usize, n_header: usize) -> Result<Table> {
    let file = file.as_ref();
    let reader = open(file)?;
    let table =
        parse_table(reader, n_cols, n_header).with_context(|| format!("failed to read {file:?}"))?;
    log_table(file, &table);
    Ok(table)
}

fn open(file: &Path) -> Result<BufReader<File>> {
    let file = File::open(file).with_context(|| format!("failed to open {file:?}"))?;
    Ok(BufReader::new(file))
}

fn log_table(file: &Path, table: &Table) {
    for diag in &table.diagnostics {
        log::warn!(
            "dropped line {} of {file:?} ({:?}): {}",
            diag.line_no,
            diag.issue,
            diag.line
        );
    }
    log::info!("read {} rows from {file:?}", table.n_rows());
}

/// Parse rows from any buffered source.
pub fn parse_table<R: BufRead>(reader: R, n_cols: usize, n_header: usize) -> Result<Table> {
    let mut rows = Vec::new();
    let mut diagnostics = Vec::new();

    let mut reader = reader;
    let mut buf = Vec::new();
    let mut i_line = 0;
    loop {
        buf.clear();
        let n_bytes = reader
            .read_until(b'\n', &mut buf)
            .with_context(|| format!("failed to read line {}", i_line + 1))?;
        if n_bytes == 0 {
            break;
        }
        i_line += 1;
        if i_line <= n_header {
            continue;
        }

        let (line, parsed) = match std::str::from_utf8(&buf) {
            Ok(line) => {
                let line = line.trim_end_matches(['\n', '\r']);
                (line.to_string(), parse_row(line, n_cols))
            }
            Err(_) => {
                let line = String::from_utf8_lossy(&buf);
                let line = line.trim_end_matches(['\n', '\r']).to_string();
                (line, Some(Err(RowIssue::NotUtf8)))
            }
        };
        match parsed {
            None => {}
            Some(Ok(row)) => rows.push(row),
            Some(Err(issue)) => diagnostics.push(RowDiagnostic {
                line_no: i_line,
                line,
                issue,
            }),
        }
    }

    Ok(Table {
        n_cols,
        rows,
        diagnostics,
    })
}

/// Returns `None` for lines that carry no data at all.
fn parse_row(line: &str, n_cols: usize) -> Option<Result<Vec<f64>, RowIssue>> {
    let trimmed = line.trim_start();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return None;
    }

    let mut row = Vec::with_capacity(n_cols);
    for token in trimmed.split_whitespace() {
        let token = token.trim_matches(|c| c == '(' || c == ')');
        match token.parse::<f64>() {
            Ok(val) => row.push(val),
            Err(_) => {
                return Some(Err(RowIssue::NotNumeric {
                    token: token.to_string(),
                }));
            }
        }
    }

    if row.len() != n_cols {
        return Some(Err(RowIssue::WrongLength {
            expected: n_cols,
            found: row.len(),
        }));
    }
    Some(Ok(row))
}

#[cfg(test)]
mod tests {
    use super::*;

    const FORCE_LINES: &str = "\
# Forces
# Time forces(pressure viscous porous) moment(pressure viscous porous)

0.0 (1 2 3) (4 5 6) (7 8 9)
1.0\t(1 2 3) (4 5 6) (7 8 9)
1.5 (1 2 3) (4 5 6)
2.0 (1 2 3) (4 five 6) (7 8 9)
3.0 (1 2 3) (4 5 6) (7 8 9)
";

    #[test]
    fn keeps_only_well_formed_rows() {
        let table = parse_table(FORCE_LINES.as_bytes(), 10, 0).unwrap();
        assert_eq!(table.n_rows(), 3);
        assert!(table.rows().iter().all(|row| row.len() == 10));
        assert_eq!(table.column(0), vec![0.0, 1.0, 3.0]);
        assert_eq!(table.rows()[2], vec![3.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0]);
    }

    #[test]
    fn reports_dropped_rows() {
        let table = parse_table(FORCE_LINES.as_bytes(), 10, 0).unwrap();
        let diags = table.diagnostics();
        assert_eq!(diags.len(), 2);

        assert_eq!(diags[0].line_no, 6);
        assert_eq!(
            diags[0].issue,
            RowIssue::WrongLength {
                expected: 10,
                found: 7
            }
        );

        assert_eq!(diags[1].line_no, 7);
        assert_eq!(
            diags[1].issue,
            RowIssue::NotNumeric {
                token: "five".to_string()
            }
        );
    }

    #[test]
    fn drops_rows_that_are_not_utf8() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(b"0.0 (1 2 3) (4 5 6) (7 8 9)\n");
        bytes.extend_from_slice(b"1.0 (1 2 3) (4 \xff 6) (7 8 9)\n");
        bytes.extend_from_slice(b"2.0 (1 2 3) (4 5 6) (7 8 9)");

        let table = parse_table(bytes.as_slice(), 10, 0).unwrap();
        assert_eq!(table.column(0), vec![0.0, 2.0]);
        assert_eq!(table.diagnostics().len(), 1);
        assert_eq!(table.diagnostics()[0].line_no, 2);
        assert_eq!(table.diagnostics()[0].issue, RowIssue::NotUtf8);
    }

    #[test]
    fn skips_header_lines() {
        let mut text = String::new();
        for i_line in 0..13 {
            text += &format!("header line {i_line}\n");
        }
        text += "# comment after header\n";
        text += "0.5 1 2 3 4 5 6 7 8 9 10 11 12\n";
        text += "1.0 1 2 3 4 5 6 7 8 9 10 11 12\n";

        let table = parse_table(text.as_bytes(), 13, 13).unwrap();
        assert_eq!(table.n_rows(), 2);
        assert!(table.diagnostics().is_empty());
        assert_eq!(table.column(0), vec![0.5, 1.0]);
    }

    #[test]
    fn empty_source_gives_empty_table() {
        let table = parse_table("# only a comment\n\n".as_bytes(), 10, 0).unwrap();
        assert_eq!(table.n_rows(), 0);
        assert_eq!(table.n_cols(), 10);
        assert!(table.column(0).is_empty());
    }

    #[test]
    fn missing_file_is_io_not_found() {
        let err = read_table("/nonexistent/case/force.dat", 10).unwrap_err();
        let io_err = err.downcast_ref::<std::io::Error>().unwrap();
        assert_eq!(io_err.kind(), std::io::ErrorKind::NotFound);
    }
}
