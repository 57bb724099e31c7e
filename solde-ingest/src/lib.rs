//! solde-ingest: statement ingestion for the solde ledger.
//!
//! Loads bank exports (CSV or spreadsheet) into a uniform table, finds where
//! tabular data begins, matches the layout against the dialect registry,
//! normalizes dates and amounts, resolves the target account (back-calculating
//! an opening balance for first-seen accounts) and merges the result into the
//! ledger through `solde-core`'s reconciliation engine.

pub mod dialect;
pub mod header;
pub mod import;
pub mod statement;
pub mod table;

pub use dialect::{DIALECTS, Dialect, MetadataRule, detect_dialect};
pub use header::locate_header;
pub use import::{AccountResolution, Collaborator, ImportOutcome, import_file, import_with_mapping};
pub use statement::{
    ColumnMapping, DialectStatement, Statement, StatementRow, parse_statement, parse_with_mapping,
};
pub use table::{Table, load_table};
