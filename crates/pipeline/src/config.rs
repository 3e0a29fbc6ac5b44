use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::PipelineError;
use crate::join::DuplicateSkuPolicy;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub usage: UsageConfig,
    pub commitment: CommitmentConfig,
    pub report: ReportSettings,
}

// ---------------------------------------------------------------------------
// Usage table
// ---------------------------------------------------------------------------

/// Where the usage table lives and how to read it.
///
/// `header_row` is zero-based. The current-usage export carries seven
/// preamble rows above its header, hence the default of 7; flat exports use 0.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UsageConfig {
    pub file: Option<PathBuf>,
    pub header_row: usize,
    pub sheet: Option<String>,
    pub columns: UsageColumns,
}

impl Default for UsageConfig {
    fn default() -> Self {
        Self {
            file: None,
            header_row: 7,
            sheet: None,
            columns: UsageColumns::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UsageColumns {
    pub tenant: String,
    pub service: String,
    pub edition: String,
    pub sku: String,
    pub metric_name: String,
    pub metric_unit: String,
    pub total_usage: String,
}

impl Default for UsageColumns {
    fn default() -> Self {
        Self {
            tenant: "Tenant name".into(),
            service: "Service name".into(),
            edition: "Edition".into(),
            sku: "SKU".into(),
            metric_name: "Metric name".into(),
            metric_unit: "Metric unit".into(),
            total_usage: "Total usage".into(),
        }
    }
}

impl UsageColumns {
    /// Column names in export order.
    pub fn names(&self) -> [&str; 7] {
        [
            self.tenant.as_str(),
            self.service.as_str(),
            self.edition.as_str(),
            self.sku.as_str(),
            self.metric_name.as_str(),
            self.metric_unit.as_str(),
            self.total_usage.as_str(),
        ]
    }
}

// ---------------------------------------------------------------------------
// Commitment table
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CommitmentConfig {
    pub file: Option<PathBuf>,
    pub header_row: usize,
    pub sheet: Option<String>,
    pub sku_column: String,
    /// Per-unit price column.
    pub price_column: String,
    pub duplicate_skus: DuplicateSkuPolicy,
}

impl Default for CommitmentConfig {
    fn default() -> Self {
        Self {
            file: None,
            header_row: 0,
            sheet: None,
            sku_column: "SKU".into(),
            price_column: "Commitment 4".into(),
            duplicate_skus: DuplicateSkuPolicy::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PageLayout {
    /// A4 portrait, 8 table columns including SKU.
    #[default]
    Portrait,
    /// A4 landscape, 7 table columns without SKU.
    Landscape,
}

impl std::fmt::Display for PageLayout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Portrait => write!(f, "portrait"),
            Self::Landscape => write!(f, "landscape"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ReportSettings {
    pub title: String,
    pub layout: PageLayout,
    pub currency_symbol: String,
    pub top_n: usize,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            title: "Billing Review".into(),
            layout: PageLayout::Portrait,
            currency_symbol: "$".into(),
            top_n: 30,
        }
    }
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl PipelineConfig {
    pub fn from_toml(input: &str) -> Result<Self, PipelineError> {
        let config: PipelineConfig =
            toml::from_str(input).map_err(|e| PipelineError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), PipelineError> {
        let required_names = [
            ("usage.columns.tenant", &self.usage.columns.tenant),
            ("usage.columns.service", &self.usage.columns.service),
            ("usage.columns.edition", &self.usage.columns.edition),
            ("usage.columns.sku", &self.usage.columns.sku),
            ("usage.columns.metric_name", &self.usage.columns.metric_name),
            ("usage.columns.metric_unit", &self.usage.columns.metric_unit),
            ("usage.columns.total_usage", &self.usage.columns.total_usage),
            ("commitment.sku_column", &self.commitment.sku_column),
            ("commitment.price_column", &self.commitment.price_column),
        ];
        for (key, value) in required_names {
            if value.trim().is_empty() {
                return Err(PipelineError::ConfigValidation(format!("{key} must not be empty")));
            }
        }

        if self.commitment.price_column == self.commitment.sku_column {
            return Err(PipelineError::ConfigValidation(
                "commitment.price_column must differ from commitment.sku_column".into(),
            ));
        }

        if self.report.top_n == 0 {
            return Err(PipelineError::ConfigValidation("report.top_n must be at least 1".into()));
        }

        if self.report.currency_symbol.is_empty() {
            return Err(PipelineError::ConfigValidation(
                "report.currency_symbol must not be empty".into(),
            ));
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
