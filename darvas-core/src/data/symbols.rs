//! Symbol roster loading.
//!
//! The roster is a CSV file with a header row. Symbols are read from the named
//! column (first column if it is absent), trimmed, and deduplicated keeping
//! first-occurrence order so runs are reproducible.

use super::provider::DataError;
use std::collections::HashSet;
use std::path::Path;

/// Default roster column name.
pub const DEFAULT_SYMBOL_COLUMN: &str = "stock_symbol";

pub fn load_symbol_list(path: &Path, column: &str) -> Result<Vec<String>, DataError> {
    let file = std::fs::File::open(path).map_err(|source| DataError::Io {
        path: path.display().to_string(),
        source,
    })?;
    parse_symbol_list(file, column)
}

pub fn parse_symbol_list(input: impl std::io::Read, column: &str) -> Result<Vec<String>, DataError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(input);

    let headers = reader.headers()?.clone();
    let index = headers.iter().position(|h| h == column).unwrap_or(0);
    if headers.get(index).is_none() {
        return Ok(Vec::new());
    }

    let mut cells = Vec::new();
    for record in reader.records() {
        if let Some(cell) = record?.get(index) {
            cells.push(cell.to_string());
        }
    }
    Ok(dedup_symbols(&cells))
}

/// Trim, drop blanks, keep the first occurrence of each symbol.
fn dedup_symbols<S: AsRef<str>>(symbols: &[S]) -> Vec<String> {
    let mut seen = HashSet::new();
    symbols
        .iter()
        .map(|s| s.as_ref().trim())
        .filter(|s| !s.is_empty() && seen.insert(s.to_string()))
        .map(String::from)
        .collect()
}
