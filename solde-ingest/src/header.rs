//! Header-row discovery: where does tabular data actually begin?
//!
//! Bank exports open with preamble rows (export date, disclaimers, account
//! summaries) before the real header. The locator scans for any registered
//! dialect's date-column token and falls back to row 0.

use crate::dialect::date_tokens;

/// Zero-based index of the row where the table header sits.
///
/// `scan_limit` caps the scan (spreadsheets look at the first 10 rows);
/// `None` scans everything, the delimited-text behavior. A file where no
/// token appears yields 0 rather than an error.
pub fn locate_header(rows: &[Vec<String>], scan_limit: Option<usize>) -> usize {
    let limit = scan_limit.unwrap_or(rows.len()).min(rows.len());
    for (i, row) in rows[..limit].iter().enumerate() {
        let hit = row
            .iter()
            .any(|cell| date_tokens().any(|token| cell.contains(token)));
        if hit {
            log::debug!("header row located at index {i}");
            return i;
        }
    }
    0
}
