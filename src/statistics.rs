use crate::reconciliation::ReconciledRow;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SummaryStats {
    /// Every reconciled customer, unchanged ones included.
    pub total_customers: usize,
    pub increased: usize,
    pub decreased: usize,
    /// Sum of all debt deltas.
    pub net_variation: f64,
}

impl SummaryStats {
    pub fn from_rows(rows: &[ReconciledRow]) -> Self {
        rows.iter().fold(
            SummaryStats {
                total_customers: rows.len(),
                ..SummaryStats::default()
            },
            |mut stats, row| {
                if row.debt_delta > 0.0 {
                    stats.increased += 1;
                } else if row.debt_delta < 0.0 {
                    stats.decreased += 1;
                }
                if row.debt_delta != 0.0 {
                    stats.net_variation += row.debt_delta;
                }
                stats
            },
        )
    }

    /// Customers whose debt did not move between the two dates.
    pub fn unchanged(&self) -> usize {
        self.total_customers - self.increased - self.decreased
    }
}
