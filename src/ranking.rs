//! Ranking of reconciled rows and purchase lines. Sorts are stable, so rows
//! with equal values keep their input order.

use crate::reconciliation::ReconciledRow;
use crate::schema::RawRecord;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum RankOrder {
    /// Descending by the selected value.
    Largest,
    /// Ascending by the selected value.
    Smallest,
}

/// Numeric column of a [`ReconciledRow`] that can be ranked on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum RankField {
    DebtA,
    DebtB,
    PurchasesA,
    PurchasesB,
    DebtDelta,
    PurchaseDelta,
    PercentVariation,
}

impl RankField {
    pub fn value(&self, row: &ReconciledRow) -> f64 {
        match self {
            RankField::DebtA => row.debt_a,
            RankField::DebtB => row.debt_b,
            RankField::PurchasesA => row.purchases_a,
            RankField::PurchasesB => row.purchases_b,
            RankField::DebtDelta => row.debt_delta,
            RankField::PurchaseDelta => row.purchase_delta,
            RankField::PercentVariation => row.percent_variation,
        }
    }
}

/// Returns up to `n` items ordered by `key`. Equal keys keep their input order.
pub fn top_n_by<T: Clone>(
    items: &[T],
    n: usize,
    order: RankOrder,
    key: impl Fn(&T) -> f64,
) -> Vec<T> {
    let mut ranked: Vec<&T> = items.iter().collect();
    match order {
        RankOrder::Largest => ranked.sort_by(|x, y| key(*y).total_cmp(&key(*x))),
        RankOrder::Smallest => ranked.sort_by(|x, y| key(*x).total_cmp(&key(*y))),
    }
    ranked.into_iter().take(n).cloned().collect()
}

pub fn top_n(rows: &[ReconciledRow], field: RankField, n: usize, order: RankOrder) -> Vec<ReconciledRow> {
    top_n_by(rows, n, order, |row| field.value(row))
}

/// The reconciled rows whose debt changed, split by direction.
///
/// Both partitions keep the reconciled (customer id) order; use
/// [`VariationSet::top_increases`] and [`VariationSet::top_decreases`] for
/// magnitude ordering.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct VariationSet {
    pub increases: Vec<ReconciledRow>,
    pub decreases: Vec<ReconciledRow>,
}

impl VariationSet {
    pub fn from_rows(rows: &[ReconciledRow]) -> Self {
        let (increases, decreases): (Vec<ReconciledRow>, Vec<ReconciledRow>) = rows
            .iter()
            .filter(|row| row.debt_delta != 0.0)
            .cloned()
            .partition(|row| row.debt_delta > 0.0);

        Self {
            increases,
            decreases,
        }
    }

    pub fn len(&self) -> usize {
        self.increases.len() + self.decreases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.increases.is_empty() && self.decreases.is_empty()
    }

    /// Largest increases first.
    pub fn top_increases(&self, n: usize) -> Vec<ReconciledRow> {
        top_n(&self.increases, RankField::DebtDelta, n, RankOrder::Largest)
    }

    /// Most negative decreases first.
    pub fn top_decreases(&self, n: usize) -> Vec<ReconciledRow> {
        top_n(&self.decreases, RankField::DebtDelta, n, RankOrder::Smallest)
    }

    /// Up to `n` increases plus up to `n` decreases, ordered by debt delta
    /// descending: biggest increase first, biggest decrease last. Never padded
    /// with unchanged rows.
    pub fn highlights(&self, n: usize) -> Vec<ReconciledRow> {
        let mut merged = self.top_increases(n);
        merged.extend(self.top_decreases(n));
        top_n(&merged, RankField::DebtDelta, merged.len(), RankOrder::Largest)
    }
}

pub fn highlight_variations(rows: &[ReconciledRow], n: usize) -> Vec<ReconciledRow> {
    VariationSet::from_rows(rows).highlights(n)
}

/// The `n` largest purchase lines of one period, taken from the normalized
/// per-document records.
pub fn top_purchasers(records: &[RawRecord], n: usize) -> Vec<RawRecord> {
    top_n_by(records, n, RankOrder::Largest, |record| record.purchase_total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregation::CustomerSummary;
    use crate::reconciliation::reconcile;

    fn rows_with_deltas(deltas: &[f64]) -> Vec<ReconciledRow> {
        let a: Vec<CustomerSummary> = deltas
            .iter()
            .enumerate()
            .map(|(idx, delta)| CustomerSummary {
                customer_id: (idx as i64 + 1).into(),
                customer_name: format!("Customer {}", idx + 1),
                customer_document: String::new(),
                region: None,
                debt_due: 100.0 + delta,
                purchase_total: 0.0,
                record_count: 1,
            })
            .collect();
        let b: Vec<CustomerSummary> = a
            .iter()
            .map(|s| CustomerSummary {
                debt_due: 100.0,
                ..s.clone()
            })
            .collect();
        reconcile(&a, &b)
    }

    fn deltas(rows: &[ReconciledRow]) -> Vec<f64> {
        rows.iter().map(|r| r.debt_delta).collect()
    }

    #[test]
    fn test_partition_excludes_unchanged() {
        let rows = rows_with_deltas(&[10.0, 0.0, -5.0, 3.0]);
        let set = VariationSet::from_rows(&rows);

        assert_eq!(set.len(), 3);
        assert_eq!(deltas(&set.increases), vec![10.0, 3.0]);
        assert_eq!(deltas(&set.decreases), vec![-5.0]);
        assert!(set.increases.iter().all(|r| r.debt_delta > 0.0));
        assert!(set.decreases.iter().all(|r| r.debt_delta < 0.0));
    }

    #[test]
    fn test_highlights_fewer_than_requested() {
        let rows = rows_with_deltas(&[5.0, -20.0, 30.0, 0.0, 10.0]);

        let highlighted = highlight_variations(&rows, 5);
        assert_eq!(deltas(&highlighted), vec![30.0, 10.0, 5.0, -20.0]);
    }

    #[test]
    fn test_highlights_cap_each_side() {
        let rows = rows_with_deltas(&[
            1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, -1.0, -2.0, -3.0, -4.0, -5.0, -6.0, -7.0,
        ]);

        let highlighted = highlight_variations(&rows, 5);
        assert_eq!(
            deltas(&highlighted),
            vec![7.0, 6.0, 5.0, 4.0, 3.0, -3.0, -4.0, -5.0, -6.0, -7.0]
        );
    }

    #[test]
    fn test_ties_keep_input_order() {
        let rows = rows_with_deltas(&[8.0, 8.0, 8.0]);

        let top = top_n(&rows, RankField::DebtDelta, 2, RankOrder::Largest);
        let ids: Vec<&str> = top.iter().map(|r| r.customer_id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2"]);
    }

    #[test]
    fn test_smallest_order() {
        let rows = rows_with_deltas(&[4.0, -9.0, 1.0]);
        let bottom = top_n(&rows, RankField::DebtDelta, 2, RankOrder::Smallest);
        assert_eq!(deltas(&bottom), vec![-9.0, 1.0]);
    }

    #[test]
    fn test_empty_variation_set() {
        let set = VariationSet::from_rows(&rows_with_deltas(&[0.0, 0.0]));
        assert!(set.is_empty());
        assert!(set.highlights(5).is_empty());
    }

    fn purchase_line(document: &str, purchases: f64) -> RawRecord {
        RawRecord {
            customer_id: crate::schema::CustomerId::from(1_i64),
            customer_name: "Alpha".to_string(),
            customer_document: String::new(),
            region: None,
            debt_due: 0.0,
            purchase_total: purchases,
            document_number: document.to_string(),
            issue_date: String::new(),
            issued_on: None,
            installment: String::new(),
            reference_month: String::new(),
        }
    }

    #[test]
    fn test_top_purchasers_caps_at_ten() {
        let amounts = [
            5.0, 90.0, 40.0, 40.0, 12.0, 70.0, 40.0, 3.0, 55.0, 90.0, 1.0, 20.0, 40.0, 8.0,
        ];
        let records: Vec<RawRecord> = amounts
            .iter()
            .enumerate()
            .map(|(idx, amount)| purchase_line(&format!("NF-{}", idx), *amount))
            .collect();

        let top = top_purchasers(&records, 10);

        assert_eq!(top.len(), 10);
        let totals: Vec<f64> = top.iter().map(|r| r.purchase_total).collect();
        assert_eq!(
            totals,
            vec![90.0, 90.0, 70.0, 55.0, 40.0, 40.0, 40.0, 40.0, 20.0, 12.0]
        );
        let documents: Vec<&str> = top.iter().map(|r| r.document_number.as_str()).collect();
        assert_eq!(
            documents,
            vec!["NF-1", "NF-9", "NF-5", "NF-8", "NF-2", "NF-3", "NF-6", "NF-12", "NF-11", "NF-4"]
        );
    }
}
