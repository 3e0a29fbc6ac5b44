//! Choices offered to the user when narrowing a view.

use serde::Serialize;

use crate::model::BilledLine;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkuOption {
    pub metric_name: String,
    pub sku: String,
    /// `"<metric name> - <sku>"`
    pub label: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SelectionOptions {
    pub services: Vec<String>,
    pub skus: Vec<SkuOption>,
    pub tenants: Vec<String>,
}

impl SelectionOptions {
    /// Map a SKU option label back to its SKU.
    pub fn resolve_sku_option(&self, label: &str) -> Option<&str> {
        self.skus
            .iter()
            .find(|o| o.label == label)
            .map(|o| o.sku.as_str())
    }
}

fn push_unique(list: &mut Vec<String>, value: &str) {
    if !list.iter().any(|v| v == value) {
        list.push(value.to_string());
    }
}

/// Unique services, SKU options and tenants in first-appearance order.
///
/// SKU options are restricted to `service_filter` when given; services and
/// tenants always cover the whole dataset.
pub fn selection_options(lines: &[BilledLine], service_filter: Option<&str>) -> SelectionOptions {
    let mut options = SelectionOptions::default();

    for line in lines {
        let u = &line.usage;
        push_unique(&mut options.services, &u.service);
        push_unique(&mut options.tenants, &u.tenant);

        if service_filter.is_some_and(|s| s != u.service) {
            continue;
        }
        let sku = u.sku_str();
        let seen = options
            .skus
            .iter()
            .any(|o| o.metric_name == u.metric_name && o.sku == sku);
        if !seen {
            options.skus.push(SkuOption {
                metric_name: u.metric_name.clone(),
                sku: sku.to_string(),
                label: format!("{} - {}", u.metric_name, sku),
            });
        }
    }

    options
}
