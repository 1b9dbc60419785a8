//! # Period Comparison
//!
//! A library that compares two position-date snapshots of a receivables report
//! customer by customer: how much each customer owed (and had purchased) on
//! date A versus date B, which customers moved the most, and the totals behind
//! the movement.
//!
//! ## Core Concepts
//!
//! - **Position date**: the as-of date a report snapshot was taken for. Rows for
//!   each date are fetched elsewhere and handed to this crate already loaded.
//! - **Normalization**: untyped query rows become [`RawRecord`]s; unreadable
//!   monetary cells count as zero and are reported, never dropped.
//! - **Aggregation**: records collapse to one [`CustomerSummary`] per customer
//!   id and period.
//! - **Reconciliation**: both periods are outer-joined on customer id into
//!   [`ReconciledRow`]s carrying debt delta and percent variation.
//! - **Ranking & statistics**: the biggest increases and decreases, the
//!   largest purchase lines per period, and [`SummaryStats`].
//!
//! Every stage is a pure function of its inputs: the same two row sets always
//! produce the same report.
//!
//! ## Example
//!
//! ```rust,ignore
//! use period_comparison::*;
//! use serde_json::json;
//!
//! let config = ComparisonConfig::default();
//! let rows_a = vec![json!({ "cod_cliente": 1, "cliente": "Alpha", "vlr_total_vencidos": 100.0 })];
//! let rows_b = vec![json!({ "cod_cliente": 2, "cliente": "Beta", "vlr_total_vencidos": 50.0 })];
//!
//! let report = compare_period_values(&config, &rows_a, &rows_b).unwrap();
//! assert_eq!(report.stats.total_customers, 2);
//! ```

pub mod aggregation;
pub mod error;
pub mod export;
pub mod ingestion;
pub mod ranking;
pub mod reconciliation;
pub mod schema;
pub mod statistics;
pub mod utils;

pub use aggregation::{aggregate_by_customer, CustomerSummary};
pub use error::{ComparisonError, Result};
pub use export::{
    aggregate_detailed, build_export, compare_detailed, DetailedComparisonRow,
    DetailedCustomerSummary, ExportBundle,
};
pub use ingestion::{normalize_rows, normalize_values, NormalizationReport, NormalizedPeriod};
pub use ranking::{
    highlight_variations, top_n, top_n_by, top_purchasers, RankField, RankOrder, VariationSet,
};
pub use reconciliation::{percent_variation, reconcile, ReconciledRow};
pub use schema::*;
pub use statistics::SummaryStats;
pub use utils::*;

use log::{debug, info};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Everything the presentation layer needs for one comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ComparisonReport {
    /// One row per customer seen on either date, sorted by customer id.
    pub reconciled: Vec<ReconciledRow>,
    /// Largest increases then largest decreases, by debt delta descending.
    pub highlighted_variations: Vec<ReconciledRow>,
    pub variations: VariationSet,
    pub stats: SummaryStats,
    pub top_purchasers_a: Vec<RawRecord>,
    pub top_purchasers_b: Vec<RawRecord>,
    pub documents_a: Vec<DocumentRef>,
    pub documents_b: Vec<DocumentRef>,
    pub details_a: Vec<RawRecord>,
    pub details_b: Vec<RawRecord>,
    pub normalization_a: NormalizationReport,
    pub normalization_b: NormalizationReport,
}

impl ComparisonReport {
    /// `false` when neither date returned any rows.
    pub fn has_data(&self) -> bool {
        !(self.details_a.is_empty() && self.details_b.is_empty())
    }

    pub fn generate_json_schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(ComparisonReport)
    }

    pub fn schema_as_json() -> std::result::Result<String, serde_json::Error> {
        let schema = Self::generate_json_schema();
        serde_json::to_string_pretty(&schema)
    }
}

pub struct PeriodComparisonProcessor;

impl PeriodComparisonProcessor {
    /// Runs the interactive comparison over two periods that are already
    /// normalized.
    pub fn process(
        config: &ComparisonConfig,
        period_a: &NormalizedPeriod,
        period_b: &NormalizedPeriod,
    ) -> Result<ComparisonReport> {
        config.validate()?;

        info!(
            "Comparing {} records (period A) against {} records (period B)",
            period_a.records.len(),
            period_b.records.len()
        );

        let summaries_a = aggregate_by_customer(&period_a.records);
        let summaries_b = aggregate_by_customer(&period_b.records);
        debug!(
            "Customers per period: A={}, B={}",
            summaries_a.len(),
            summaries_b.len()
        );

        let reconciled = reconcile(&summaries_a, &summaries_b);
        let variations = VariationSet::from_rows(&reconciled);
        let highlighted_variations = variations.highlights(config.top_variation_count);
        let stats = SummaryStats::from_rows(&reconciled);

        info!(
            "Comparison finished: {} customers, {} increased, {} decreased, net variation {:.2}",
            stats.total_customers, stats.increased, stats.decreased, stats.net_variation
        );

        Ok(ComparisonReport {
            highlighted_variations,
            variations,
            stats,
            top_purchasers_a: top_purchasers(&period_a.records, config.top_purchaser_count),
            top_purchasers_b: top_purchasers(&period_b.records, config.top_purchaser_count),
            documents_a: period_a.records.iter().map(RawRecord::document_ref).collect(),
            documents_b: period_b.records.iter().map(RawRecord::document_ref).collect(),
            details_a: period_a.records.clone(),
            details_b: period_b.records.clone(),
            normalization_a: period_a.report.clone(),
            normalization_b: period_b.report.clone(),
            reconciled,
        })
    }

    /// Normalizes both raw row sets, then runs [`Self::process`].
    pub fn process_rows(
        config: &ComparisonConfig,
        rows_a: &[RawRow],
        rows_b: &[RawRow],
    ) -> Result<ComparisonReport> {
        let period_a = normalize_rows(Period::A, rows_a, config)?;
        let period_b = normalize_rows(Period::B, rows_b, config)?;
        Self::process(config, &period_a, &period_b)
    }

    /// Normalizes both raw row sets and prepares the detailed export.
    pub fn export_rows(
        config: &ComparisonConfig,
        rows_a: &[RawRow],
        rows_b: &[RawRow],
    ) -> Result<ExportBundle> {
        config.validate()?;
        let period_a = normalize_rows(Period::A, rows_a, config)?;
        let period_b = normalize_rows(Period::B, rows_b, config)?;
        Ok(build_export(&period_a, &period_b, config))
    }
}

pub fn compare_periods(
    config: &ComparisonConfig,
    rows_a: &[RawRow],
    rows_b: &[RawRow],
) -> Result<ComparisonReport> {
    PeriodComparisonProcessor::process_rows(config, rows_a, rows_b)
}

/// Same as [`compare_periods`] for rows held as `serde_json::Value`s.
pub fn compare_period_values(
    config: &ComparisonConfig,
    rows_a: &[serde_json::Value],
    rows_b: &[serde_json::Value],
) -> Result<ComparisonReport> {
    let period_a = normalize_values(Period::A, rows_a, config)?;
    let period_b = normalize_values(Period::B, rows_b, config)?;
    PeriodComparisonProcessor::process(config, &period_a, &period_b)
}

pub fn export_periods(
    config: &ComparisonConfig,
    rows_a: &[RawRow],
    rows_b: &[RawRow],
) -> Result<ExportBundle> {
    PeriodComparisonProcessor::export_rows(config, rows_a, rows_b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_end_to_end_comparison() {
        let config = ComparisonConfig::default();
        let rows_a = vec![
            json!({ "cod_cliente": 1, "cliente": "Alpha", "vlr_total_vencidos": "60.00", "vlr_totalcompras": 500, "documento": "NF-1", "data_emissao": "10/09/2025", "parcela": "1" }),
            json!({ "cod_cliente": 1, "cliente": "Alpha", "vlr_total_vencidos": "40.00", "vlr_totalcompras": 500, "documento": "NF-2", "data_emissao": "12/09/2025", "parcela": "1" }),
            json!({ "cod_cliente": 3, "cliente": "Gama", "vlr_total_vencidos": 30, "vlr_totalcompras": 80, "documento": "NF-7", "data_emissao": "01/09/2025", "parcela": "2" }),
        ];
        let rows_b = vec![
            json!({ "cod_cliente": 1, "cliente": "Alpha", "vlr_total_vencidos": 80, "vlr_totalcompras": 450, "documento": "NF-1", "data_emissao": "10/09/2025", "parcela": "1" }),
            json!({ "cod_cliente": 2, "cliente": "Beta", "vlr_total_vencidos": 50, "vlr_totalcompras": 90, "documento": "NF-5", "data_emissao": "15/08/2025", "parcela": "1" }),
        ];

        let report = compare_period_values(&config, &rows_a, &rows_b).unwrap();

        assert!(report.has_data());
        assert_eq!(report.reconciled.len(), 3);
        assert_eq!(report.stats.total_customers, 3);
        assert_eq!(report.stats.increased, 2);
        assert_eq!(report.stats.decreased, 1);
        assert!((report.stats.net_variation - 0.0).abs() < 1e-9);

        let alpha = &report.reconciled[0];
        assert_eq!(alpha.debt_a, 100.0);
        assert_eq!(alpha.debt_b, 80.0);
        assert_eq!(alpha.percent_variation, 25.0);

        let highlighted: Vec<f64> = report
            .highlighted_variations
            .iter()
            .map(|r| r.debt_delta)
            .collect();
        assert_eq!(highlighted, vec![30.0, 20.0, -50.0]);

        assert_eq!(report.top_purchasers_a.len(), 3);
        assert_eq!(report.top_purchasers_a[0].document_number, "NF-1");
        assert_eq!(report.top_purchasers_b[0].purchase_total, 450.0);
        assert_eq!(report.documents_a.len(), 3);
        assert_eq!(report.documents_b[1].document_number, "NF-5");
    }

    #[test]
    fn test_empty_periods() {
        let report = compare_periods(&ComparisonConfig::default(), &[], &[]).unwrap();

        assert!(!report.has_data());
        assert!(report.reconciled.is_empty());
        assert!(report.variations.is_empty());
        assert!(report.highlighted_variations.is_empty());
        assert_eq!(report.stats, SummaryStats::default());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = ComparisonConfig {
            top_purchaser_count: 0,
            ..ComparisonConfig::default()
        };
        let result = compare_periods(&config, &[], &[]);
        assert!(matches!(result, Err(ComparisonError::InvalidConfig(_))));
    }

    #[test]
    fn test_report_schema_generation() {
        let schema_json = ComparisonReport::schema_as_json().unwrap();
        assert!(schema_json.contains("highlighted_variations"));
        assert!(schema_json.contains("net_variation"));
    }
}
