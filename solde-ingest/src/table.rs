//! Uniform tabular view over CSV and spreadsheet exports.
//!
//! Whatever the source format, a statement file becomes a header row, data
//! rows of string cells, and the preamble rows the bank printed above the
//! table. All reads are whole-file and blocking; statement files are small.

use std::fs;
use std::path::Path;

use calamine::{Data, Reader, open_workbook_auto};
use solde_core::{LedgerError, LedgerResult};

use crate::header::locate_header;

/// Rows of a spreadsheet scanned for the header; banks put at most a few
/// preamble lines above the table.
const SPREADSHEET_SCAN_ROWS: usize = 10;

#[derive(Debug, Clone, Default)]
pub struct Table {
    /// Rows above the header row (bank preamble, disclaimers, metadata).
    pub preamble: Vec<Vec<String>>,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    /// Index of a named column, if present.
    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h.trim() == name)
    }

    /// Cell of a data row by column index; empty string when the row is short.
    pub fn cell<'a>(&'a self, row: &'a [String], column: usize) -> &'a str {
        row.get(column).map(String::as_str).unwrap_or("")
    }

    fn from_raw(mut raw: Vec<Vec<String>>, header_row: usize) -> Self {
        if raw.is_empty() {
            return Self::default();
        }
        let header_row = header_row.min(raw.len() - 1);
        let rows = raw.split_off(header_row + 1);
        let headers = raw.pop().map(|h| h.iter().map(|c| c.trim().to_string()).collect()).unwrap_or_default();
        Self {
            preamble: raw,
            headers,
            rows,
        }
    }
}

/// Load a statement file into a [`Table`], dispatching on the extension:
/// `.csv` for delimited text, anything starting with `.xls` for workbooks.
pub fn load_table(path: &Path) -> LedgerResult<Table> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();
    if extension == "csv" {
        load_csv(path)
    } else if extension.starts_with("xls") {
        load_workbook(path)
    } else {
        Err(LedgerError::UnsupportedFileType { extension })
    }
}

fn load_csv(path: &Path) -> LedgerResult<Table> {
    // Lossy decoding: a bad byte in a disclaimer line must not sink the
    // import.
    let bytes = fs::read(path).map_err(|source| LedgerError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let text = String::from_utf8_lossy(&bytes);

    let delimiter = sniff_delimiter(&text);
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter)
        .from_reader(text.as_bytes());

    let mut raw: Vec<Vec<String>> = Vec::new();
    for record in reader.records() {
        let Ok(record) = record else { continue };
        raw.push(record.iter().map(|c| c.to_string()).collect());
    }

    let header_row = locate_header(&raw, None);
    Ok(Table::from_raw(raw, header_row))
}

fn load_workbook(path: &Path) -> LedgerResult<Table> {
    let mut workbook = open_workbook_auto(path).map_err(|e| LedgerError::Io {
        path: path.display().to_string(),
        source: std::io::Error::other(e),
    })?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| LedgerError::EmptyImport)?
        .map_err(|e| LedgerError::Io {
            path: path.display().to_string(),
            source: std::io::Error::other(e),
        })?;

    let raw: Vec<Vec<String>> = range
        .rows()
        .map(|row| row.iter().map(cell_to_string).collect())
        .collect();

    let header_row = locate_header(&raw, Some(SPREADSHEET_SCAN_ROWS));
    Ok(Table::from_raw(raw, header_row))
}

/// Render a workbook cell the way it prints: whole floats without a trailing
/// `.0` (account numbers come through as floats), dates in ISO.
fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", *f as i64),
        Data::Float(f) => f.to_string(),
        Data::Int(i) => i.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => dt
            .as_datetime()
            .map(|d| d.date().format("%Y-%m-%d").to_string())
            .unwrap_or_default(),
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        Data::Error(e) => format!("{e:?}"),
    }
}

/// Decide between `;` and `,` delimited text by counting candidates on the
/// line where the header was spotted (French exports use both).
fn sniff_delimiter(text: &str) -> u8 {
    let line = text
        .lines()
        .find(|l| crate::dialect::date_tokens().any(|t| l.contains(t)))
        .or_else(|| text.lines().find(|l| !l.trim().is_empty()))
        .unwrap_or("");
    if line.matches(';').count() > line.matches(',').count() {
        b';'
    } else {
        b','
    }
}
