use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::model::{
    BilledLine, ProductBreakdown, ProductFilter, ProductStats, ProductSummary, ServiceCost,
    TenantDetail, TenantTotal,
};

/// Descending by cost. `sort_by` is stable, so equal costs keep group order.
fn by_cost_desc(a: f64, b: f64) -> Ordering {
    b.partial_cmp(&a).unwrap_or(Ordering::Equal)
}

/// Non-finite values never reach a sum; they count as missing.
fn finite(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

/// Group by tenant name (ascending), sum defined costs.
pub fn total_by_tenant(lines: &[BilledLine]) -> Vec<TenantTotal> {
    let mut groups: BTreeMap<&str, TenantTotal> = BTreeMap::new();

    for line in lines {
        let entry = groups.entry(line.usage.tenant.as_str()).or_insert_with(|| TenantTotal {
            tenant: line.usage.tenant.clone(),
            total_cost: 0.0,
            line_count: 0,
            unpriced_lines: 0,
        });
        entry.line_count += 1;
        match finite(line.total_cost) {
            Some(cost) => entry.total_cost += cost,
            None => entry.unpriced_lines += 1,
        }
    }

    groups.into_values().collect()
}

/// Reference value for the "largest tenant" comparison.
pub fn largest_tenant_total(lines: &[BilledLine]) -> Option<f64> {
    total_by_tenant(lines)
        .into_iter()
        .map(|t| t.total_cost)
        .max_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal))
}

/// The `n` most expensive tenants, most expensive first.
pub fn top_tenants(lines: &[BilledLine], n: usize) -> Vec<TenantTotal> {
    let mut totals = total_by_tenant(lines);
    totals.sort_by(|a, b| by_cost_desc(a.total_cost, b.total_cost));
    totals.truncate(n);
    totals
}

/// Per-customer rollup for one service and/or SKU.
pub fn product_breakdown(lines: &[BilledLine], filter: &ProductFilter) -> ProductBreakdown {
    let mut groups: BTreeMap<&str, ProductSummary> = BTreeMap::new();

    for line in lines.iter().filter(|l| filter.matches(l)) {
        let u = &line.usage;
        let entry = groups.entry(u.tenant.as_str()).or_insert_with(|| ProductSummary {
            tenant: u.tenant.clone(),
            total_usage: 0.0,
            total_cost: 0.0,
            per_unit: None,
            edition: String::new(),
            metric_name: String::new(),
            metric_unit: String::new(),
            line_count: 0,
        });

        entry.line_count += 1;
        entry.total_usage += finite(u.total_usage).unwrap_or(0.0);
        entry.total_cost += finite(line.total_cost).unwrap_or(0.0);

        // First non-blank value wins for the descriptive columns
        if entry.per_unit.is_none() {
            entry.per_unit = line.per_unit;
        }
        for (slot, value) in [
            (&mut entry.edition, &u.edition),
            (&mut entry.metric_name, &u.metric_name),
            (&mut entry.metric_unit, &u.metric_unit),
        ] {
            if slot.is_empty() && !value.is_empty() {
                slot.clone_from(value);
            }
        }
    }

    let mut rows: Vec<ProductSummary> = groups.into_values().collect();
    rows.sort_by(|a, b| by_cost_desc(a.total_cost, b.total_cost));

    let stats = product_stats(&rows);
    ProductBreakdown {
        filter: filter.clone(),
        rows,
        stats,
    }
}

fn product_stats(rows: &[ProductSummary]) -> ProductStats {
    let customers = rows.len();
    let total_quantity: f64 = rows.iter().map(|r| r.total_usage).sum();
    let total_revenue: f64 = rows.iter().map(|r| r.total_cost).sum();
    let avg_quantity_per_customer = if customers > 0 {
        Some(total_quantity / customers as f64)
    } else {
        None
    };

    ProductStats {
        customers,
        total_quantity,
        total_revenue,
        avg_quantity_per_customer,
        metric_unit: rows.first().map(|r| r.metric_unit.clone()).unwrap_or_default(),
    }
}

/// All lines of one tenant plus summary figures.
pub fn tenant_detail(lines: &[BilledLine], tenant: &str) -> TenantDetail {
    let tenant_lines: Vec<BilledLine> = lines
        .iter()
        .filter(|l| l.usage.tenant == tenant)
        .cloned()
        .collect();

    let mut total_cost = 0.0;
    let mut unpriced_lines = 0;
    let mut cost_by_service: Vec<ServiceCost> = Vec::new();

    for line in &tenant_lines {
        let cost = match finite(line.total_cost) {
            Some(cost) => cost,
            None => {
                unpriced_lines += 1;
                0.0
            }
        };
        total_cost += cost;

        match cost_by_service.iter_mut().find(|s| s.service == line.usage.service) {
            Some(service) => service.total_cost += cost,
            None => cost_by_service.push(ServiceCost {
                service: line.usage.service.clone(),
                total_cost: cost,
            }),
        }
    }

    let average_cost = if tenant_lines.is_empty() {
        None
    } else {
        Some(total_cost / tenant_lines.len() as f64)
    };

    TenantDetail {
        tenant: tenant.to_string(),
        lines: tenant_lines,
        total_cost,
        average_cost,
        unpriced_lines,
        cost_by_service,
    }
}
