use serde::Serialize;

use crate::table::Cell;

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// One row of raw consumption data.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UsageRecord {
    pub tenant: String,
    pub service: String,
    pub edition: String,
    /// `None` when the SKU cell is empty.
    pub sku: Option<String>,
    pub metric_name: String,
    pub metric_unit: String,
    pub total_usage: Option<f64>,
    /// Remaining cells of the row, aligned with `UsageTable::extra_columns`.
    #[serde(skip)]
    pub extra: Vec<Cell>,
}

impl UsageRecord {
    pub fn sku_str(&self) -> &str {
        self.sku.as_deref().unwrap_or("")
    }
}

#[derive(Debug, Clone, Default)]
pub struct UsageTable {
    pub extra_columns: Vec<String>,
    pub records: Vec<UsageRecord>,
}

/// One row of pricing data.
#[derive(Debug, Clone, PartialEq)]
pub struct CommitmentRecord {
    pub sku: String,
    pub price: Option<f64>,
    pub extra: Vec<Cell>,
}

#[derive(Debug, Clone, Default)]
pub struct CommitmentTable {
    pub extra_columns: Vec<String>,
    pub records: Vec<CommitmentRecord>,
}

// ---------------------------------------------------------------------------
// Join
// ---------------------------------------------------------------------------

/// A usage row priced against its commitment.
///
/// `per_unit` and `total_cost` are `None` when the SKU has no commitment;
/// `total_cost` is also `None` when the usage quantity is blank.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BilledLine {
    #[serde(flatten)]
    pub usage: UsageRecord,
    pub per_unit: Option<f64>,
    pub total_cost: Option<f64>,
    /// Matched commitment's other cells, aligned with
    /// `JoinedDataset::commitment_columns`. Empty cells when unmatched.
    #[serde(skip)]
    pub commitment_extra: Vec<Cell>,
}

impl BilledLine {
    pub fn is_priced(&self) -> bool {
        self.per_unit.is_some()
    }
}

#[derive(Debug, Clone, Default)]
pub struct JoinedDataset {
    pub usage_columns: Vec<String>,
    pub commitment_columns: Vec<String>,
    pub lines: Vec<BilledLine>,
}

impl JoinedDataset {
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn unpriced_count(&self) -> usize {
        self.lines.iter().filter(|l| !l.is_priced()).count()
    }
}

// ---------------------------------------------------------------------------
// Aggregates
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TenantTotal {
    pub tenant: String,
    pub total_cost: f64,
    pub line_count: usize,
    /// Lines whose cost is undefined and therefore excluded from the sum.
    pub unpriced_lines: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProductFilter {
    pub service: Option<String>,
    pub sku: Option<String>,
}

impl ProductFilter {
    pub fn matches(&self, line: &BilledLine) -> bool {
        if let Some(ref service) = self.service {
            if &line.usage.service != service {
                return false;
            }
        }
        if let Some(ref sku) = self.sku {
            if line.usage.sku.as_ref() != Some(sku) {
                return false;
            }
        }
        true
    }

    /// Human label, e.g. `"Backup - SKU1"` or `"All Services - All SKUs"`.
    pub fn label(&self) -> String {
        format!(
            "{} - {}",
            self.service.as_deref().unwrap_or("All Services"),
            self.sku.as_deref().unwrap_or("All SKUs")
        )
    }
}

/// Per-tenant rollup inside a product selection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductSummary {
    pub tenant: String,
    pub total_usage: f64,
    pub total_cost: f64,
    /// First defined per-unit price within the group.
    pub per_unit: Option<f64>,
    pub edition: String,
    pub metric_name: String,
    pub metric_unit: String,
    pub line_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductStats {
    pub customers: usize,
    pub total_quantity: f64,
    pub total_revenue: f64,
    pub avg_quantity_per_customer: Option<f64>,
    pub metric_unit: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductBreakdown {
    pub filter: ProductFilter,
    pub rows: Vec<ProductSummary>,
    pub stats: ProductStats,
}

/// Rows ranked in the "top customers" slice of a product view.
pub const TOP_CUSTOMERS: usize = 10;

impl ProductBreakdown {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The `n` highest-revenue customers. Empty for a single customer, where
    /// a ranking says nothing the row itself does not.
    pub fn top_customers(&self, n: usize) -> &[ProductSummary] {
        if self.rows.len() < 2 {
            return &[];
        }
        &self.rows[..n.min(self.rows.len())]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServiceCost {
    pub service: String,
    pub total_cost: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TenantDetail {
    pub tenant: String,
    pub lines: Vec<BilledLine>,
    pub total_cost: f64,
    /// `total_cost / lines.len()`, `None` when the tenant has no lines.
    pub average_cost: Option<f64>,
    pub unpriced_lines: usize,
    /// Cost per service in first-appearance order.
    pub cost_by_service: Vec<ServiceCost>,
}

impl TenantDetail {
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}
