/// CSV loading into a single numeric matrix.
///
/// Supported format:
/// - UTF-8, comma-separated, optional header row (caller decides)
/// - Double-quoted fields with embedded commas are handled correctly
/// - Empty cells, `NA`, `NULL`, `N/A`, `?` and anything that does not parse
///   as a number become NaN; impute them before training
/// - The column count comes from the first line; short rows are padded with
///   NaN and extra cells are ignored
use std::path::Path;

use crate::error::{NnError, Result};
use crate::math::matrix::Matrix;

const MISSING_MARKERS: [&str; 4] = ["NA", "NULL", "N/A", "?"];

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

pub fn load_csv(path: impl AsRef<Path>, has_header: bool) -> Result<Matrix> {
    let text = std::fs::read_to_string(path)?;
    parse_csv(&text, has_header)
}

/// Parses CSV text into a `rows × cols` matrix.
pub fn parse_csv(text: &str, has_header: bool) -> Result<Matrix> {
    let mut lines = text.lines();
    let first = lines
        .clone()
        .next()
        .ok_or_else(|| NnError::format("CSV file is empty"))?;
    let num_cols = parse_csv_row(first).len();

    if has_header {
        lines.next();
    }

    let mut data = Vec::new();
    let mut num_rows = 0;
    for line in lines {
        if line.trim().is_empty() {
            continue;
        }
        let mut cells: Vec<f64> = parse_csv_row(line)
            .iter()
            .take(num_cols)
            .map(|c| parse_cell(c))
            .collect();
        cells.resize(num_cols, f64::NAN);
        data.extend(cells);
        num_rows += 1;
    }

    if num_rows == 0 {
        return Err(NnError::format("CSV contains no data rows"));
    }
    Matrix::from_vec(num_rows, num_cols, data)
}

// ---------------------------------------------------------------------------
// Private helpers
// ---------------------------------------------------------------------------

fn parse_cell(cell: &str) -> f64 {
    let t = cell.trim();
    if t.is_empty() || MISSING_MARKERS.iter().any(|m| t.eq_ignore_ascii_case(m)) {
        return f64::NAN;
    }
    t.parse::<f64>().unwrap_or(f64::NAN)
}

/// Parses a single CSV row, handling double-quoted fields.
fn parse_csv_row(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                // Escaped quote inside quoted field.
                current.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => fields.push(std::mem::take(&mut current)),
            c => current.push(c),
        }
    }
    fields.push(current);
    fields
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_markers_become_nan() {
        let m = parse_csv("a,b,c\n1,NA,3\n,2.5,?\n", true).unwrap();
        assert_eq!(m.shape(), (2, 3));
        assert_eq!(m[(0, 0)], 1.0);
        assert!(m[(0, 1)].is_nan());
        assert!(m[(1, 0)].is_nan());
        assert_eq!(m[(1, 1)], 2.5);
        assert!(m[(1, 2)].is_nan());
    }

    #[test]
    fn short_rows_are_padded_and_blank_lines_skipped() {
        let m = parse_csv("1,2,3\n\n4\n", false).unwrap();
        assert_eq!(m.shape(), (2, 3));
        assert_eq!(m.row(0), &[1.0, 2.0, 3.0]);
        assert_eq!(m[(1, 0)], 4.0);
        assert!(m[(1, 2)].is_nan());
    }

    #[test]
    fn quoted_fields_keep_commas() {
        assert_eq!(parse_csv_row(r#"1,"a, b",2"#), vec!["1", "a, b", "2"]);
        assert_eq!(parse_csv_row(r#""say ""hi""""#), vec![r#"say "hi""#]);
    }

    #[test]
    fn header_only_file_is_an_error() {
        assert!(parse_csv("x,y\n", true).is_err());
        assert!(parse_csv("", false).is_err());
    }
}
