use crate::error::{ComparisonError, Result};
use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt;

/// One untyped row as handed over by the report query: column name to cell.
pub type RawRow = serde_json::Map<String, serde_json::Value>;

/// Which side of the comparison a row set belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum Period {
    A,
    B,
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Period::A => write!(f, "A"),
            Period::B => write!(f, "B"),
        }
    }
}

/// Stable customer key shared by both periods.
///
/// Ids that parse as integers order numerically and sort before free-text ids,
/// so `"9"` precedes `"10"` the way the report's integer codes do.
/// Deserialized values are trimmed the same way [`CustomerId::new`] trims.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(from = "String", into = "String")]
#[schemars(transparent)]
pub struct CustomerId(String);

impl CustomerId {
    pub fn new(value: impl Into<String>) -> Self {
        let value = value.into();
        Self(value.trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn numeric(&self) -> Option<i128> {
        self.0.parse().ok()
    }
}

impl Ord for CustomerId {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.numeric(), other.numeric()) {
            (Some(a), Some(b)) => a.cmp(&b).then_with(|| self.0.cmp(&other.0)),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => self.0.cmp(&other.0),
        }
    }
}

impl PartialOrd for CustomerId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for CustomerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for CustomerId {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<CustomerId> for String {
    fn from(id: CustomerId) -> Self {
        id.0
    }
}

impl From<&str> for CustomerId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<i64> for CustomerId {
    fn from(value: i64) -> Self {
        Self(value.to_string())
    }
}

/// Maps logical fields to the column names produced by the report query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct ColumnMapping {
    #[schemars(description = "Column holding the stable customer code used as the join key")]
    pub customer_id: String,

    #[schemars(description = "Column holding the customer display name")]
    pub customer_name: String,

    #[schemars(description = "Column holding the customer tax id (CPF/CNPJ)")]
    pub customer_document: String,

    #[schemars(description = "Optional column holding the customer region or city")]
    pub region: Option<String>,

    #[schemars(description = "Column holding the overdue amount of the document line")]
    pub debt_due: String,

    #[schemars(description = "Column holding the customer purchase total of the document line")]
    pub purchase_total: String,

    #[schemars(description = "Column holding the document (invoice) number")]
    pub document_number: String,

    #[schemars(description = "Column holding the issue date as day/month/year text")]
    pub issue_date: String,

    #[schemars(description = "Column holding the installment identifier")]
    pub installment: String,

    #[schemars(description = "Column holding the reference month")]
    pub reference_month: String,
}

impl Default for ColumnMapping {
    fn default() -> Self {
        Self {
            customer_id: "cod_cliente".to_string(),
            customer_name: "cliente".to_string(),
            customer_document: "documento_cliente".to_string(),
            region: None,
            debt_due: "vlr_total_vencidos".to_string(),
            purchase_total: "vlr_totalcompras".to_string(),
            document_number: "documento".to_string(),
            issue_date: "data_emissao".to_string(),
            installment: "parcela".to_string(),
            reference_month: "mes_referencia".to_string(),
        }
    }
}

impl ColumnMapping {
    /// All configured column names, in field declaration order.
    pub fn columns(&self) -> Vec<&str> {
        let mut columns = vec![
            self.customer_id.as_str(),
            self.customer_name.as_str(),
            self.customer_document.as_str(),
        ];
        if let Some(region) = &self.region {
            columns.push(region.as_str());
        }
        columns.extend([
            self.debt_due.as_str(),
            self.purchase_total.as_str(),
            self.document_number.as_str(),
            self.issue_date.as_str(),
            self.installment.as_str(),
            self.reference_month.as_str(),
        ]);
        columns
    }

    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for column in self.columns() {
            if column.trim().is_empty() {
                return Err(ComparisonError::InvalidColumnMapping(
                    "column names must not be blank".to_string(),
                ));
            }
            if !seen.insert(column) {
                return Err(ComparisonError::InvalidColumnMapping(format!(
                    "column '{}' is mapped to more than one field",
                    column
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct ComparisonConfig {
    #[schemars(description = "Report-query column names for every logical field")]
    pub columns: ColumnMapping,

    #[schemars(
        description = "How many of the largest increases and, separately, the largest decreases to highlight"
    )]
    pub top_variation_count: usize,

    #[schemars(description = "How many of the largest purchase lines to list per period")]
    pub top_purchaser_count: usize,

    #[schemars(description = "chrono format string used to parse the issue-date column")]
    pub issue_date_format: String,

    #[schemars(
        description = "Separator used when joining document numbers and issue dates in the detailed export"
    )]
    pub detail_separator: String,
}

impl Default for ComparisonConfig {
    fn default() -> Self {
        Self {
            columns: ColumnMapping::default(),
            top_variation_count: 5,
            top_purchaser_count: 10,
            issue_date_format: "%d/%m/%Y".to_string(),
            detail_separator: ", ".to_string(),
        }
    }
}

impl ComparisonConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.columns.validate()?;

        if self.top_variation_count == 0 {
            return Err(ComparisonError::InvalidConfig(
                "top_variation_count must be greater than zero".to_string(),
            ));
        }
        if self.top_purchaser_count == 0 {
            return Err(ComparisonError::InvalidConfig(
                "top_purchaser_count must be greater than zero".to_string(),
            ));
        }
        if self.issue_date_format.trim().is_empty() {
            return Err(ComparisonError::InvalidConfig(
                "issue_date_format must not be blank".to_string(),
            ));
        }

        Ok(())
    }

    pub fn generate_json_schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(ComparisonConfig)
    }

    pub fn schema_as_json() -> std::result::Result<String, serde_json::Error> {
        let schema = Self::generate_json_schema();
        serde_json::to_string_pretty(&schema)
    }
}

/// One document/installment line of a period after normalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RawRecord {
    pub customer_id: CustomerId,
    pub customer_name: String,
    pub customer_document: String,
    pub region: Option<String>,
    pub debt_due: f64,
    pub purchase_total: f64,
    pub document_number: String,
    /// Issue date exactly as reported (day/month/year text).
    pub issue_date: String,
    /// `issue_date` parsed with the configured format, when it parses.
    pub issued_on: Option<NaiveDate>,
    pub installment: String,
    pub reference_month: String,
}

impl RawRecord {
    pub fn document_ref(&self) -> DocumentRef {
        DocumentRef {
            document_number: self.document_number.clone(),
            issue_date: self.issue_date.clone(),
            installment: self.installment.clone(),
        }
    }
}

/// Document number, issue date and installment of one record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct DocumentRef {
    pub document_number: String,
    pub issue_date: String,
    pub installment: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_customer_id_numeric_ordering() {
        let mut ids: Vec<CustomerId> = vec!["10".into(), "9".into(), "ACME".into(), "100".into()];
        ids.sort();
        let ordered: Vec<&str> = ids.iter().map(|id| id.as_str()).collect();
        assert_eq!(ordered, vec!["9", "10", "100", "ACME"]);
    }

    #[test]
    fn test_customer_id_trims() {
        assert_eq!(CustomerId::new("  42 "), CustomerId::from(42_i64));
    }

    #[test]
    fn test_customer_id_deserialize_trims() {
        let id: CustomerId = serde_json::from_str("\" 42\"").unwrap();
        assert_eq!(id, CustomerId::from(42_i64));
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"42\"");

        let ids: Vec<CustomerId> = serde_json::from_str(r#"["9 ", "\t10"]"#).unwrap();
        assert!(ids[0] < ids[1]);
    }

    #[test]
    fn test_default_mapping_is_valid() {
        let config = ComparisonConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.columns.columns().len(), 9);
    }

    #[test]
    fn test_duplicate_column_rejected() {
        let mut mapping = ColumnMapping::default();
        mapping.purchase_total = mapping.debt_due.clone();
        assert!(matches!(
            mapping.validate(),
            Err(ComparisonError::InvalidColumnMapping(_))
        ));
    }

    #[test]
    fn test_zero_counts_rejected() {
        let config = ComparisonConfig {
            top_variation_count: 0,
            ..ComparisonConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ComparisonError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_config_from_partial_json() {
        let config = ComparisonConfig::from_json_str(
            r#"{ "top_variation_count": 3, "columns": { "region": "cidade" } }"#,
        )
        .unwrap();
        assert_eq!(config.top_variation_count, 3);
        assert_eq!(config.top_purchaser_count, 10);
        assert_eq!(config.columns.customer_id, "cod_cliente");
        assert_eq!(config.columns.region.as_deref(), Some("cidade"));
    }

    #[test]
    fn test_schema_generation() {
        let schema_json = ComparisonConfig::schema_as_json().unwrap();
        assert!(schema_json.contains("columns"));
        assert!(schema_json.contains("top_variation_count"));
        assert!(schema_json.contains("customer_id"));
    }
}
