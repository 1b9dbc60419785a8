//! Record normalization: turns the untyped rows of one position date into
//! [`RawRecord`]s.
//!
//! Text cells are trimmed. Monetary cells that cannot be read as a decimal
//! number become `0.0` and are counted in the [`NormalizationReport`]; rows are
//! never dropped, so the output always has as many records as the input.

use crate::error::{ComparisonError, Result};
use crate::schema::{ComparisonConfig, CustomerId, Period, RawRecord, RawRow};
use chrono::NaiveDate;
use log::{debug, warn};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct NormalizationReport {
    pub rows: usize,
    /// Debt cells that were missing or unparsable and were read as zero.
    pub invalid_debt_values: usize,
    /// Purchase cells that were missing or unparsable and were read as zero.
    pub invalid_purchase_values: usize,
    pub unparsed_issue_dates: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct NormalizedPeriod {
    pub period: Period,
    pub records: Vec<RawRecord>,
    pub report: NormalizationReport,
}

impl NormalizedPeriod {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Normalizes rows that may arrive as arbitrary JSON values; every row must be
/// a JSON object.
pub fn normalize_values(
    period: Period,
    rows: &[Value],
    config: &ComparisonConfig,
) -> Result<NormalizedPeriod> {
    let objects = rows
        .iter()
        .enumerate()
        .map(|(idx, value)| match value {
            Value::Object(map) => Ok(map),
            other => Err(ComparisonError::MalformedRow {
                period,
                row: idx,
                details: format!("expected an object, found {}", json_kind(other)),
            }),
        })
        .collect::<Result<Vec<&RawRow>>>()?;

    normalize_iter(period, objects, config)
}

pub fn normalize_rows(
    period: Period,
    rows: &[RawRow],
    config: &ComparisonConfig,
) -> Result<NormalizedPeriod> {
    normalize_iter(period, rows.iter(), config)
}

fn normalize_iter<'a>(
    period: Period,
    rows: impl IntoIterator<Item = &'a RawRow>,
    config: &ComparisonConfig,
) -> Result<NormalizedPeriod> {
    let columns = &config.columns;
    let mut report = NormalizationReport::default();
    let mut records = Vec::new();

    for (idx, row) in rows.into_iter().enumerate() {
        let customer_id = id_cell(row, &columns.customer_id)
            .ok_or(ComparisonError::MissingCustomerId { period, row: idx })?;

        let debt_due = amount_cell(row, &columns.debt_due).unwrap_or_else(|| {
            report.invalid_debt_values += 1;
            0.0
        });
        let purchase_total = amount_cell(row, &columns.purchase_total).unwrap_or_else(|| {
            report.invalid_purchase_values += 1;
            0.0
        });

        let issue_date = text_cell(row, &columns.issue_date);
        let issued_on = NaiveDate::parse_from_str(&issue_date, &config.issue_date_format).ok();
        if issued_on.is_none() {
            report.unparsed_issue_dates += 1;
        }

        records.push(RawRecord {
            customer_id,
            customer_name: text_cell(row, &columns.customer_name),
            customer_document: text_cell(row, &columns.customer_document),
            region: columns
                .region
                .as_ref()
                .map(|column| text_cell(row, column))
                .filter(|region| !region.is_empty()),
            debt_due,
            purchase_total,
            document_number: text_cell(row, &columns.document_number),
            issue_date,
            issued_on,
            installment: text_cell(row, &columns.installment),
            reference_month: text_cell(row, &columns.reference_month),
        });
    }

    report.rows = records.len();

    if records.is_empty() {
        warn!("No rows found for period {}", period);
    }
    if report.invalid_debt_values > 0 {
        warn!(
            "Found {} invalid values in column {} for period {}; read as zero",
            report.invalid_debt_values, columns.debt_due, period
        );
    }
    if report.invalid_purchase_values > 0 {
        warn!(
            "Found {} invalid values in column {} for period {}; read as zero",
            report.invalid_purchase_values, columns.purchase_total, period
        );
    }
    debug!(
        "Normalized {} rows for period {} ({} issue dates unparsed)",
        report.rows, period, report.unparsed_issue_dates
    );

    Ok(NormalizedPeriod {
        period,
        records,
        report,
    })
}

fn text_cell(row: &RawRow, column: &str) -> String {
    match row.get(column) {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Number(n)) => number_to_text(n),
        Some(Value::Bool(b)) => b.to_string(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

fn id_cell(row: &RawRow, column: &str) -> Option<CustomerId> {
    let text = match row.get(column)? {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => number_to_text(n),
        _ => return None,
    };

    if text.is_empty() {
        None
    } else {
        Some(CustomerId::new(text))
    }
}

/// Reads a monetary cell. `None` means the cell is absent or not a finite number.
fn amount_cell(row: &RawRow, column: &str) -> Option<f64> {
    let value = match row.get(column)? {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };

    value.is_finite().then_some(value)
}

fn number_to_text(n: &Number) -> String {
    if n.is_i64() || n.is_u64() {
        return n.to_string();
    }
    match n.as_f64() {
        Some(f) if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e15 => {
            format!("{}", f as i64)
        }
        _ => n.to_string(),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
