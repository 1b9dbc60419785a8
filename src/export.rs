//! Full-detail aggregation for spreadsheet/CSV export.
//!
//! Unlike [`crate::aggregation`], records are grouped by
//! `(customer id, name, document)`, so one customer id can yield several
//! groups when its name or document varies within a period. Document numbers
//! and issue dates of each group are sorted and joined into a single text
//! field. The export join then pairs groups on customer id alone.

use crate::ingestion::NormalizedPeriod;
use crate::reconciliation::{outer_join_by_id, percent_variation};
use crate::schema::{ComparisonConfig, CustomerId, RawRecord};
use crate::utils::{coalesce_text, join_sorted};
use log::{debug, info};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct DetailedCustomerSummary {
    pub customer_id: CustomerId,
    pub customer_name: String,
    pub customer_document: String,
    pub debt_due: f64,
    pub purchase_total: f64,
    /// Sorted document numbers joined with the configured separator.
    pub documents: String,
    /// Sorted issue-date strings joined with the configured separator.
    pub issue_dates: String,
    pub record_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct DetailedComparisonRow {
    pub customer_id: CustomerId,
    pub customer_name: String,
    pub customer_document: String,
    pub debt_a: f64,
    pub debt_b: f64,
    pub debt_delta: f64,
    pub percent_variation: f64,
    pub purchases_a: f64,
    pub purchases_b: f64,
    pub purchase_delta: f64,
    pub documents_a: String,
    pub issue_dates_a: String,
    pub documents_b: String,
    pub issue_dates_b: String,
}

impl DetailedComparisonRow {
    fn from_pair(
        customer_id: &CustomerId,
        a: Option<&DetailedCustomerSummary>,
        b: Option<&DetailedCustomerSummary>,
    ) -> Self {
        let debt_a = a.map_or(0.0, |s| s.debt_due);
        let debt_b = b.map_or(0.0, |s| s.debt_due);
        let purchases_a = a.map_or(0.0, |s| s.purchase_total);
        let purchases_b = b.map_or(0.0, |s| s.purchase_total);

        Self {
            customer_id: customer_id.clone(),
            customer_name: coalesce_text([
                a.map(|s| s.customer_name.as_str()),
                b.map(|s| s.customer_name.as_str()),
            ]),
            customer_document: coalesce_text([
                a.map(|s| s.customer_document.as_str()),
                b.map(|s| s.customer_document.as_str()),
            ]),
            debt_a,
            debt_b,
            debt_delta: debt_a - debt_b,
            percent_variation: percent_variation(debt_a, debt_b),
            purchases_a,
            purchases_b,
            purchase_delta: purchases_a - purchases_b,
            documents_a: a.map(|s| s.documents.clone()).unwrap_or_default(),
            issue_dates_a: a.map(|s| s.issue_dates.clone()).unwrap_or_default(),
            documents_b: b.map(|s| s.documents.clone()).unwrap_or_default(),
            issue_dates_b: b.map(|s| s.issue_dates.clone()).unwrap_or_default(),
        }
    }
}

/// Everything the export writers need: the joined detail rows plus both
/// periods' normalized records, untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ExportBundle {
    pub rows: Vec<DetailedComparisonRow>,
    pub records_a: Vec<RawRecord>,
    pub records_b: Vec<RawRecord>,
}

type DetailKey = (CustomerId, String, String);

/// Groups one period's records by `(customer id, name, document)`, sorted by
/// that key.
pub fn aggregate_detailed(records: &[RawRecord], separator: &str) -> Vec<DetailedCustomerSummary> {
    let mut groups: BTreeMap<DetailKey, Vec<&RawRecord>> = BTreeMap::new();

    for record in records {
        groups
            .entry((
                record.customer_id.clone(),
                record.customer_name.clone(),
                record.customer_document.clone(),
            ))
            .or_default()
            .push(record);
    }

    groups
        .into_iter()
        .map(|((customer_id, customer_name, customer_document), members)| {
            DetailedCustomerSummary {
                customer_id,
                customer_name,
                customer_document,
                debt_due: members.iter().map(|r| r.debt_due).sum(),
                purchase_total: members.iter().map(|r| r.purchase_total).sum(),
                documents: join_sorted(
                    members.iter().map(|r| r.document_number.as_str()),
                    separator,
                ),
                issue_dates: join_sorted(members.iter().map(|r| r.issue_date.as_str()), separator),
                record_count: members.len(),
            }
        })
        .collect()
}

/// Joins the detailed groups of both periods on customer id.
///
/// An id with several groups on a side yields one row per pairing of its
/// A-groups with its B-groups; an id present on one side only yields one row
/// per group with the other side zeroed and its text fields empty.
pub fn compare_detailed(
    period_a: &[DetailedCustomerSummary],
    period_b: &[DetailedCustomerSummary],
) -> Vec<DetailedComparisonRow> {
    let joined = outer_join_by_id(period_a, period_b, |s| &s.customer_id);
    let mut rows = Vec::new();

    for (customer_id, (a_groups, b_groups)) in &joined {
        match (a_groups.is_empty(), b_groups.is_empty()) {
            (false, true) => rows.extend(
                a_groups
                    .iter()
                    .map(|a| DetailedComparisonRow::from_pair(customer_id, Some(*a), None)),
            ),
            (true, false) => rows.extend(
                b_groups
                    .iter()
                    .map(|b| DetailedComparisonRow::from_pair(customer_id, None, Some(*b))),
            ),
            _ => {
                for a in a_groups {
                    for b in b_groups {
                        rows.push(DetailedComparisonRow::from_pair(customer_id, Some(*a), Some(*b)));
                    }
                }
            }
        }
    }

    rows
}

pub fn build_export(
    period_a: &NormalizedPeriod,
    period_b: &NormalizedPeriod,
    config: &ComparisonConfig,
) -> ExportBundle {
    let detailed_a = aggregate_detailed(&period_a.records, &config.detail_separator);
    let detailed_b = aggregate_detailed(&period_b.records, &config.detail_separator);
    debug!(
        "Detailed aggregation: {} groups in period A, {} groups in period B",
        detailed_a.len(),
        detailed_b.len()
    );

    let rows = compare_detailed(&detailed_a, &detailed_b);
    info!("Prepared {} detailed export rows", rows.len());

    ExportBundle {
        rows,
        records_a: period_a.records.clone(),
        records_b: period_b.records.clone(),
    }
}
