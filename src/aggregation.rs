use crate::schema::{CustomerId, RawRecord};
use crate::utils::{coalesce, coalesce_text};
use log::debug;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One customer's totals for a single position date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CustomerSummary {
    pub customer_id: CustomerId,
    pub customer_name: String,
    pub customer_document: String,
    pub region: Option<String>,
    pub debt_due: f64,
    pub purchase_total: f64,
    /// Number of records folded into this summary.
    pub record_count: usize,
}

impl CustomerSummary {
    fn seed(record: &RawRecord) -> Self {
        Self {
            customer_id: record.customer_id.clone(),
            customer_name: record.customer_name.clone(),
            customer_document: record.customer_document.clone(),
            region: record.region.clone(),
            debt_due: 0.0,
            purchase_total: 0.0,
            record_count: 0,
        }
    }

    fn absorb(&mut self, record: &RawRecord) {
        self.customer_name = coalesce_text([
            Some(self.customer_name.as_str()),
            Some(record.customer_name.as_str()),
        ]);
        self.customer_document = coalesce_text([
            Some(self.customer_document.as_str()),
            Some(record.customer_document.as_str()),
        ]);
        self.region = coalesce([self.region.take(), record.region.clone()]);
        self.debt_due += record.debt_due;
        self.purchase_total += record.purchase_total;
        self.record_count += 1;
    }
}

/// Groups the records of one period by customer id.
///
/// Name, document and region come from the first record seen for the customer
/// that has them filled in, so callers must pass records in the order the
/// report query returned them.
/// Monetary fields are summed in that same order. The output is sorted by
/// customer id; an empty input yields an empty vector.
pub fn aggregate_by_customer(records: &[RawRecord]) -> Vec<CustomerSummary> {
    let mut groups: BTreeMap<CustomerId, CustomerSummary> = BTreeMap::new();

    for record in records {
        groups
            .entry(record.customer_id.clone())
            .or_insert_with(|| CustomerSummary::seed(record))
            .absorb(record);
    }

    debug!(
        "Aggregated {} records into {} customers",
        records.len(),
        groups.len()
    );

    groups.into_values().collect()
}
