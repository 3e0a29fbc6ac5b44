//! Request/response entry point for front ends.
//!
//! A front end describes what it wants in a [`ViewRequest`] and gets back a
//! [`View`]. Nothing is cached between calls.

use serde::{Deserialize, Serialize};

use crate::aggregate::{largest_tenant_total, product_breakdown, tenant_detail, top_tenants};
use crate::error::PipelineError;
use crate::model::{JoinedDataset, ProductBreakdown, ProductFilter, TenantDetail, TenantTotal};
use crate::options::{selection_options, SelectionOptions};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Action {
    TopTenants { n: usize },
    ProductBreakdown,
    TenantDetail,
    SelectionOptions,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ViewRequest {
    #[serde(default)]
    pub service_filter: Option<String>,
    #[serde(default)]
    pub sku_filter: Option<String>,
    #[serde(default)]
    pub tenant: Option<String>,
    pub action: Action,
}

impl ViewRequest {
    pub fn new(action: Action) -> Self {
        Self {
            service_filter: None,
            sku_filter: None,
            tenant: None,
            action,
        }
    }

    pub fn from_toml(input: &str) -> Result<Self, PipelineError> {
        let request: ViewRequest =
            toml::from_str(input).map_err(|e| PipelineError::ConfigParse(e.to_string()))?;
        if let Action::TopTenants { n: 0 } = request.action {
            return Err(PipelineError::ConfigValidation("top_tenants requires n >= 1".into()));
        }
        Ok(request)
    }

    pub fn product_filter(&self) -> ProductFilter {
        ProductFilter {
            service: self.service_filter.clone(),
            sku: self.sku_filter.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum View {
    TopTenants {
        tenants: Vec<TenantTotal>,
    },
    Products {
        breakdown: ProductBreakdown,
    },
    Tenant {
        detail: TenantDetail,
        largest_tenant_total: Option<f64>,
    },
    Options {
        options: SelectionOptions,
    },
}

impl View {
    /// True when the selection matched no rows.
    pub fn is_empty(&self) -> bool {
        match self {
            View::TopTenants { tenants } => tenants.is_empty(),
            View::Products { breakdown } => breakdown.is_empty(),
            View::Tenant { detail, .. } => detail.is_empty(),
            View::Options { options } => options.tenants.is_empty(),
        }
    }
}

pub fn build_view(dataset: &JoinedDataset, request: &ViewRequest) -> View {
    let lines = &dataset.lines;
    match request.action {
        Action::TopTenants { n } => View::TopTenants {
            tenants: top_tenants(lines, n),
        },
        Action::ProductBreakdown => View::Products {
            breakdown: product_breakdown(lines, &request.product_filter()),
        },
        Action::TenantDetail => View::Tenant {
            detail: tenant_detail(lines, request.tenant.as_deref().unwrap_or("")),
            largest_tenant_total: largest_tenant_total(lines),
        },
        Action::SelectionOptions => View::Options {
            options: selection_options(lines, request.service_filter.as_deref()),
        },
    }
}
