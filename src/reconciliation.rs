//! Full outer join of two periods' customer summaries.
//!
//! Every customer id from either side yields exactly one [`ReconciledRow`].
//! Identity fields prefer period A and fall back to period B; monetary fields
//! missing on one side are zero for that side. Disjoint or empty inputs are
//! ordinary cases, not errors.

use crate::aggregation::CustomerSummary;
use crate::schema::CustomerId;
use crate::utils::{coalesce, coalesce_text};
use log::debug;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ReconciledRow {
    pub customer_id: CustomerId,
    pub customer_name: String,
    pub customer_document: String,
    pub region: Option<String>,
    pub debt_a: f64,
    pub debt_b: f64,
    pub purchases_a: f64,
    pub purchases_b: f64,
    /// `debt_a - debt_b`
    pub debt_delta: f64,
    /// `purchases_a - purchases_b`
    pub purchase_delta: f64,
    /// Debt delta as a percentage of `debt_b`; zero when `debt_b` is zero.
    pub percent_variation: f64,
    pub in_period_a: bool,
    pub in_period_b: bool,
}

impl ReconciledRow {
    fn from_sides(
        customer_id: CustomerId,
        a: Option<&CustomerSummary>,
        b: Option<&CustomerSummary>,
    ) -> Self {
        let debt_a = a.map_or(0.0, |s| s.debt_due);
        let debt_b = b.map_or(0.0, |s| s.debt_due);
        let purchases_a = a.map_or(0.0, |s| s.purchase_total);
        let purchases_b = b.map_or(0.0, |s| s.purchase_total);

        Self {
            customer_id,
            customer_name: coalesce_text([
                a.map(|s| s.customer_name.as_str()),
                b.map(|s| s.customer_name.as_str()),
            ]),
            customer_document: coalesce_text([
                a.map(|s| s.customer_document.as_str()),
                b.map(|s| s.customer_document.as_str()),
            ]),
            region: coalesce([
                a.and_then(|s| s.region.clone()),
                b.and_then(|s| s.region.clone()),
            ]),
            debt_a,
            debt_b,
            purchases_a,
            purchases_b,
            debt_delta: debt_a - debt_b,
            purchase_delta: purchases_a - purchases_b,
            percent_variation: percent_variation(debt_a, debt_b),
            in_period_a: a.is_some(),
            in_period_b: b.is_some(),
        }
    }
}

/// `(a - b) / b * 100`, or `0.0` when `b` is zero.
///
/// The zero case is a reporting convention: a customer with no debt in the
/// base period shows no percentage, whatever the current amount is.
pub fn percent_variation(a: f64, b: f64) -> f64 {
    if b == 0.0 {
        0.0
    } else {
        (a - b) / b * 100.0
    }
}

/// Pairs up the items of both sides by customer id, keeping every id of either
/// side. Within one id, items keep their input order.
pub(crate) fn outer_join_by_id<'a, T>(
    a: &'a [T],
    b: &'a [T],
    key: impl Fn(&T) -> &CustomerId,
) -> BTreeMap<CustomerId, (Vec<&'a T>, Vec<&'a T>)> {
    let mut joined: BTreeMap<CustomerId, (Vec<&'a T>, Vec<&'a T>)> = BTreeMap::new();

    for item in a {
        joined.entry(key(item).clone()).or_default().0.push(item);
    }
    for item in b {
        joined.entry(key(item).clone()).or_default().1.push(item);
    }

    joined
}

/// Reconciles the customer summaries of period A against period B.
///
/// Summaries are expected to be unique per customer id, as produced by
/// [`crate::aggregation::aggregate_by_customer`]; if an id repeats, its first
/// summary is used. Output is sorted by customer id.
pub fn reconcile(period_a: &[CustomerSummary], period_b: &[CustomerSummary]) -> Vec<ReconciledRow> {
    let joined = outer_join_by_id(period_a, period_b, |s| &s.customer_id);

    let rows: Vec<ReconciledRow> = joined
        .into_iter()
        .map(|(id, (a, b))| {
            ReconciledRow::from_sides(id, a.first().copied(), b.first().copied())
        })
        .collect();

    debug!(
        "Reconciled {} + {} customer summaries into {} rows",
        period_a.len(),
        period_b.len(),
        rows.len()
    );

    rows
}
