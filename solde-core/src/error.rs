//! Typed error taxonomy for ledger and import operations.
//!
//! The core never retries on its own; every variant carries the offending
//! value so the caller can decide between retry-with-different-input and
//! abandonment.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LedgerError {
    /// File extension is neither CSV nor a spreadsheet. Fatal, no retry.
    #[error("unsupported file type: .{extension}")]
    UnsupportedFileType { extension: String },

    /// No registered dialect matched the file. Recoverable: retry the import
    /// with a manual column mapping built from `columns`.
    #[error("no known dialect matched; column mapping required (columns: {})", columns.join(", "))]
    MappingRequired { columns: Vec<String> },

    /// Dialect or mapping produced zero usable rows.
    #[error("import produced no usable rows")]
    EmptyImport,

    /// The user declined account resolution. The ledger is left unchanged.
    #[error("import cancelled during account resolution")]
    ImportCancelled,

    /// Bad category pair or non-positive amount on a virtual transfer.
    #[error("invalid transfer: {reason}")]
    InvalidTransfer { reason: String },

    #[error("account '{name}' already exists")]
    DuplicateAccountName { name: String },

    #[error("unknown account '{name}'")]
    UnknownAccount { name: String },

    #[error("invalid category '{name}'")]
    InvalidCategory { name: String },

    /// Operation index out of range for edit/delete.
    #[error("no operation at index {index}")]
    UnknownOperation { index: usize },

    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

pub type LedgerResult<T> = Result<T, LedgerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mapping_required_lists_columns() {
        let err = LedgerError::MappingRequired {
            columns: vec!["Datum".to_string(), "Betrag".to_string()],
        };
        let msg = err.to_string();
        assert!(msg.contains("Datum"));
        assert!(msg.contains("Betrag"));
    }

    #[test]
    fn test_offending_value_in_message() {
        let err = LedgerError::UnknownAccount {
            name: "Joint".to_string(),
        };
        assert!(err.to_string().contains("Joint"));
    }
}
