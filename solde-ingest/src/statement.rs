//! Turn a loaded table into normalized statement rows.
//!
//! Dates go through the dialect's format (or ISO), amount text is normalized
//! for locale quirks (decimal comma, grouping spaces, currency signs). Rows
//! whose date or amount cannot be parsed are dropped and counted; they are
//! never allowed to collapse into a silent 0.

use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use solde_core::{BalanceSnapshot, LedgerError, LedgerResult};

use crate::dialect::{Dialect, MetadataRule, detect_dialect};
use crate::table::Table;

/// One normalized statement row, not yet attached to an account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatementRow {
    pub date: NaiveDate,
    pub label: String,
    /// Negative = debit, as in the ledger.
    pub amount: f64,
}

/// Caller-supplied column names for layouts no dialect recognizes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMapping {
    pub date: String,
    pub name: String,
    pub amount: String,
}

/// Parsed statement rows. This is all the manual-mapping path can produce;
/// account metadata only exists on the dialect path.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub rows: Vec<StatementRow>,
    /// Rows dropped for unparseable date or amount.
    pub dropped: usize,
}

/// A statement recognized by the dialect registry. Account metadata is not
/// optional here: a dialect whose embedded number or balance cannot be
/// extracted falls back to [`LedgerError::MappingRequired`] instead.
#[derive(Debug, Clone, PartialEq)]
pub struct DialectStatement {
    pub dialect: &'static str,
    pub account_number: String,
    /// Statement-closing balance snapshot.
    pub closing: BalanceSnapshot,
    pub statement: Statement,
}

/// Parse via the dialect registry.
///
/// No structural match (or a matched dialect whose embedded metadata cannot
/// be extracted) reports [`LedgerError::MappingRequired`] with the available
/// columns so the caller can retry through [`parse_with_mapping`]. Zero
/// surviving rows is [`LedgerError::EmptyImport`].
pub fn parse_statement(table: &Table) -> LedgerResult<DialectStatement> {
    let Some(dialect) = detect_dialect(&table.headers) else {
        return Err(mapping_required(table));
    };
    log::info!("statement matches dialect '{}'", dialect.name);

    let (rows, dropped) = parse_rows(
        table,
        dialect.date_column,
        dialect.label_column,
        dialect.amount_column,
        dialect.date_format,
    )?;
    if rows.is_empty() {
        return Err(LedgerError::EmptyImport);
    }

    let (account_number, closing) = match extract_metadata(table, dialect, &rows) {
        Some((number, closing)) => (number, closing),
        // Structurally a known dialect, but the metadata cells are gone:
        // treat as unrecognized and let the manual path take over.
        None => return Err(mapping_required(table)),
    };

    Ok(DialectStatement {
        dialect: dialect.name,
        account_number,
        closing,
        statement: Statement { rows, dropped },
    })
}

/// Parse with an explicit `{date, name, amount}` mapping. No metadata is
/// inferred on this path; the caller owns account selection.
pub fn parse_with_mapping(table: &Table, mapping: &ColumnMapping) -> LedgerResult<Statement> {
    let (rows, dropped) = parse_rows(table, &mapping.date, &mapping.name, &mapping.amount, None)?;
    if rows.is_empty() {
        return Err(LedgerError::EmptyImport);
    }
    Ok(Statement { rows, dropped })
}

fn mapping_required(table: &Table) -> LedgerError {
    LedgerError::MappingRequired {
        columns: table.headers.clone(),
    }
}

fn parse_rows(
    table: &Table,
    date_column: &str,
    label_column: &str,
    amount_column: &str,
    date_format: Option<&str>,
) -> LedgerResult<(Vec<StatementRow>, usize)> {
    let missing = LedgerError::MappingRequired {
        columns: table.headers.clone(),
    };
    let Some(date_idx) = table.column(date_column) else {
        return Err(missing);
    };
    let Some(label_idx) = table.column(label_column) else {
        return Err(missing);
    };
    let Some(amount_idx) = table.column(amount_column) else {
        return Err(missing);
    };

    let whitespace = Regex::new(r"\s+").expect("static pattern");
    let mut rows = Vec::new();
    let mut dropped = 0usize;
    for row in &table.rows {
        if row.iter().all(|c| c.trim().is_empty()) {
            continue; // trailing blank lines are not data
        }
        let date = parse_date(table.cell(row, date_idx), date_format);
        let amount = parse_amount(table.cell(row, amount_idx), &whitespace);
        match (date, amount) {
            (Some(date), Some(amount)) => rows.push(StatementRow {
                date,
                label: table.cell(row, label_idx).trim().to_string(),
                amount,
            }),
            _ => {
                dropped += 1;
                log::warn!("dropping unparseable statement row: {row:?}");
            }
        }
    }
    Ok((rows, dropped))
}

fn parse_date(text: &str, format: Option<&str>) -> Option<NaiveDate> {
    let text = text.trim();
    match format {
        Some(fmt) => NaiveDate::parse_from_str(text, fmt).ok(),
        // Generic ISO, tolerating a trailing time component.
        None => NaiveDate::parse_from_str(text, "%Y-%m-%d")
            .ok()
            .or_else(|| text.get(..10).and_then(|t| NaiveDate::parse_from_str(t, "%Y-%m-%d").ok())),
    }
}

/// Locale normalization: decimal comma becomes a point, grouping whitespace
/// (including non-breaking spaces) and euro signs are stripped. Anything
/// still unparseable is a missing value, not a zero.
fn parse_amount(text: &str, whitespace: &Regex) -> Option<f64> {
    let cleaned = whitespace.replace_all(text, "").replace(',', ".").replace('€', "");
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok()
}

fn extract_metadata(
    table: &Table,
    dialect: &Dialect,
    rows: &[StatementRow],
) -> Option<(String, BalanceSnapshot)> {
    let whitespace = Regex::new(r"\s+").expect("static pattern");
    match dialect.metadata {
        MetadataRule::Columns { number, balance } => {
            let number_idx = table.column(number)?;
            let balance_idx = table.column(balance)?;
            let first = table.rows.first()?;
            let account_number = table.cell(first, number_idx).trim().to_string();
            let balance = parse_amount(table.cell(first, balance_idx), &whitespace)?;
            let date = parse_date(table.cell(first, table.column(dialect.date_column)?), dialect.date_format)
                .or_else(|| rows.first().map(|r| r.date))?;
            if account_number.is_empty() {
                return None;
            }
            Some((account_number, BalanceSnapshot { date, balance }))
        }
        MetadataRule::Preamble {
            number_cell,
            balance_cell,
        } => {
            let preamble = table.preamble.first()?;
            let account_number = preamble.get(number_cell)?.trim().to_string();
            let balance = parse_amount(preamble.get(balance_cell)?, &whitespace)?;
            if account_number.is_empty() {
                return None;
            }
            // The preamble has no date of its own; the statement's balance is
            // as of its last row.
            let date = rows.last().map(|r| r.date)?;
            Some((account_number, BalanceSnapshot { date, balance }))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(headers: &[&str], rows: &[&[&str]]) -> Table {
        Table {
            preamble: Vec::new(),
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: rows
                .iter()
                .map(|r| r.iter().map(|c| c.to_string()).collect())
                .collect(),
        }
    }

    fn bourso_table(rows: &[&[&str]]) -> Table {
        table(&["dateOp", "label", "amount", "accountNum", "accountbalance"], rows)
    }

    #[test]
    fn test_bourso_statement() {
        let t = bourso_table(&[
            &["2024-01-31", "CARTE 30/01 VIAL", "-12,40", "00112233", "837,60"],
            &["2024-01-05", "VIR SEPA SALAIRE", "850,00", "00112233", "850,00"],
        ]);
        let stmt = parse_statement(&t).unwrap();
        assert_eq!(stmt.dialect, "BoursoBank");
        assert_eq!(stmt.statement.rows.len(), 2);
        assert_eq!(stmt.statement.rows[0].amount, -12.40);
        assert_eq!(stmt.account_number, "00112233");
        assert_eq!(stmt.closing.balance, 837.60);
        assert_eq!(stmt.closing.date, NaiveDate::from_ymd_opt(2024, 1, 31).unwrap());
        assert_eq!(stmt.statement.dropped, 0);
    }

    #[test]
    fn test_bnp_statement_with_preamble() {
        let mut t = table(
            &["Date operation", "Libelle operation", "Montant operation en euro"],
            &[
                &["05/01/2024", "VIR SALAIRE", "1 200,00"],
                &["31/01/2024", "CARTE AUTOROUTE", "-25,50"],
            ],
        );
        t.preamble = vec![vec![
            "Compte".into(),
            "".into(),
            "FR7600112233".into(),
            "".into(),
            "Solde au 31/01".into(),
            "1174,50".into(),
        ]];
        let stmt = parse_statement(&t).unwrap();
        assert_eq!(stmt.dialect, "BNP");
        assert_eq!(stmt.statement.rows[0].date, NaiveDate::from_ymd_opt(2024, 1, 5).unwrap());
        assert_eq!(stmt.statement.rows[0].amount, 1200.0);
        assert_eq!(stmt.account_number, "FR7600112233");
        assert_eq!(stmt.closing.balance, 1174.50);
        assert_eq!(stmt.closing.date, NaiveDate::from_ymd_opt(2024, 1, 31).unwrap());
    }

    #[test]
    fn test_unparseable_amount_drops_row_never_zero() {
        let t = bourso_table(&[
            &["2024-01-05", "OK", "-1,00", "1", "10,00"],
            &["2024-01-06", "BROKEN", "n/a", "1", "10,00"],
            &["not-a-date", "BROKEN TOO", "-2,00", "1", "10,00"],
        ]);
        let stmt = parse_statement(&t).unwrap().statement;
        assert_eq!(stmt.rows.len(), 1);
        assert_eq!(stmt.dropped, 2);
        assert!(stmt.rows.iter().all(|r| r.amount != 0.0));
    }

    #[test]
    fn test_unknown_layout_requires_mapping() {
        let t = table(&["Datum", "Text", "Betrag"], &[&["2024-01-05", "x", "-1.0"]]);
        let err = parse_statement(&t).unwrap_err();
        match err {
            LedgerError::MappingRequired { columns } => {
                assert_eq!(columns, vec!["Datum", "Text", "Betrag"]);
            }
            other => panic!("expected MappingRequired, got {other:?}"),
        }
    }

    #[test]
    fn test_mapping_path() {
        let t = table(
            &["Datum", "Text", "Betrag"],
            &[&["2024-01-05", "MIETE", "-700.0"], &["2024-01-28", "GEHALT", "2100.0"]],
        );
        let mapping = ColumnMapping {
            date: "Datum".into(),
            name: "Text".into(),
            amount: "Betrag".into(),
        };
        let stmt = parse_with_mapping(&t, &mapping).unwrap();
        assert_eq!(stmt.rows.len(), 2);
        assert_eq!(stmt.dropped, 0);
    }

    #[test]
    fn test_empty_import() {
        let t = bourso_table(&[&["", "", "", "", ""]]);
        assert!(matches!(parse_statement(&t), Err(LedgerError::EmptyImport)));
    }

    #[test]
    fn test_metadata_gone_falls_back_to_mapping() {
        // BNP columns but no preamble line: dialect matched, metadata absent.
        let t = table(
            &["Date operation", "Libelle operation", "Montant operation en euro"],
            &[&["05/01/2024", "VIR", "1,00"]],
        );
        assert!(matches!(
            parse_statement(&t),
            Err(LedgerError::MappingRequired { .. })
        ));
    }

    #[test]
    fn test_iso_date_with_time_suffix() {
        let t = bourso_table(&[&["2024-01-05 00:00:00", "X", "-1,00", "1", "9,00"]]);
        let stmt = parse_statement(&t).unwrap();
        assert_eq!(
            stmt.statement.rows[0].date,
            NaiveDate::from_ymd_opt(2024, 1, 5).unwrap()
        );
    }
}
