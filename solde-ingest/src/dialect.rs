//! Registry of known bank export layouts.
//!
//! A dialect is one declarative table entry: the column headers that identify
//! it, its date-format convention, and where it keeps the account number and
//! statement balance. Supporting another bank means adding a row here, not a
//! code path.

/// Where a dialect embeds account metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetadataRule {
    /// Number and running balance are dedicated columns of every data row;
    /// the first row carries the statement-closing values.
    Columns {
        number: &'static str,
        balance: &'static str,
    },
    /// Number and closing balance sit at fixed cells of the single preamble
    /// line above the table.
    Preamble {
        number_cell: usize,
        balance_cell: usize,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dialect {
    pub name: &'static str,
    pub date_column: &'static str,
    pub label_column: &'static str,
    pub amount_column: &'static str,
    /// Explicit format for ambiguous day/month locales; `None` means ISO.
    pub date_format: Option<&'static str>,
    pub metadata: MetadataRule,
}

/// Known dialects, in priority order: detection takes the first structural
/// match, which matters because layouts can share column names with
/// different meanings.
pub const DIALECTS: &[Dialect] = &[
    Dialect {
        name: "BNP",
        date_column: "Date operation",
        label_column: "Libelle operation",
        amount_column: "Montant operation en euro",
        date_format: Some("%d/%m/%Y"),
        metadata: MetadataRule::Preamble {
            number_cell: 2,
            balance_cell: 5,
        },
    },
    Dialect {
        name: "BoursoBank",
        date_column: "dateOp",
        label_column: "label",
        amount_column: "amount",
        date_format: None,
        metadata: MetadataRule::Columns {
            number: "accountNum",
            balance: "accountbalance",
        },
    },
];

/// Match a header row against the registry. The distinguishing signature of
/// a dialect is its amount column; first registered match wins.
pub fn detect_dialect(headers: &[String]) -> Option<&'static Dialect> {
    DIALECTS
        .iter()
        .find(|d| headers.iter().any(|h| h.trim() == d.amount_column))
}

/// Date-column tokens of every registered dialect, used by the header
/// locator to spot where tabular data begins.
pub fn date_tokens() -> impl Iterator<Item = &'static str> {
    DIALECTS.iter().map(|d| d.date_column)
}
