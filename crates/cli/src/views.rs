// Read-only views: top, products, tenant, options, request

use std::io::Write;
use std::path::Path;

use skucalc_pipeline::model::{ProductBreakdown, TenantDetail, TenantTotal, TOP_CUSTOMERS};
use skucalc_pipeline::options::{selection_options, SelectionOptions};
use skucalc_pipeline::{build_view, Action, View, ViewRequest};
use skucalc_report::currency::format_quantity;
use skucalc_report::document::report_lines;
use skucalc_report::format_currency;

use crate::dataset;
use crate::util::{Align, TextTable};
use crate::{CliError, InputArgs};

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

pub(crate) fn emit(text: &str) -> Result<(), CliError> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    out.write_all(text.as_bytes())
        .and_then(|_| out.flush())
        .map_err(|e| CliError::io(format!("cannot write output: {}", e)))
}

fn emit_json(view: &View) -> Result<(), CliError> {
    let json = serde_json::to_string_pretty(view)
        .map_err(|e| CliError::other(format!("cannot serialize view: {}", e)))?;
    emit(&format!("{}\n", json))
}

fn quantity_with_unit(value: f64, unit: &str) -> String {
    let q = format_quantity(Some(value));
    if unit.is_empty() {
        q
    } else {
        format!("{} {}", q, unit)
    }
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

pub(crate) fn render_top(tenants: &[TenantTotal], symbol: &str) -> String {
    if tenants.is_empty() {
        return "No data found: no billable usage lines.\n".to_string();
    }
    let mut table = TextTable::new(&[
        ("#", Align::Right),
        ("Tenant", Align::Left),
        ("Total cost", Align::Right),
        ("Lines", Align::Right),
        ("Unpriced", Align::Right),
    ]);
    for (i, t) in tenants.iter().enumerate() {
        table.push(vec![
            (i + 1).to_string(),
            t.tenant.clone(),
            format_currency(Some(t.total_cost), symbol),
            t.line_count.to_string(),
            t.unpriced_lines.to_string(),
        ]);
    }
    format!("Top {} tenants by total cost\n\n{}", tenants.len(), table.render())
}

pub(crate) fn render_products(breakdown: &ProductBreakdown, symbol: &str, top: usize) -> String {
    let label = breakdown.filter.label();
    if breakdown.is_empty() {
        return format!("No data found for {}.\n", label);
    }

    let mut table = TextTable::new(&[
        ("Tenant", Align::Left),
        ("Edition", Align::Left),
        ("Metric name", Align::Left),
        ("Metric unit", Align::Left),
        ("Total usage", Align::Right),
        ("Per unit", Align::Right),
        ("Total", Align::Right),
    ]);
    for row in &breakdown.rows {
        table.push(vec![
            row.tenant.clone(),
            row.edition.clone(),
            row.metric_name.clone(),
            row.metric_unit.clone(),
            format_quantity(Some(row.total_usage)),
            format_currency(row.per_unit, symbol),
            format_currency(Some(row.total_cost), symbol),
        ]);
    }

    let stats = &breakdown.stats;
    let average = match stats.avg_quantity_per_customer {
        Some(avg) => quantity_with_unit(avg, &stats.metric_unit),
        None => "n/a".to_string(),
    };
    let mut out = format!(
        "{}\n\n{}\nCustomers: {}\nTotal quantity: {}\nTotal revenue: {}\nAverage per customer: {}\n",
        label,
        table.render(),
        stats.customers,
        quantity_with_unit(stats.total_quantity, &stats.metric_unit),
        format_currency(Some(stats.total_revenue), symbol),
        average,
    );

    let ranked = breakdown.top_customers(top);
    if !ranked.is_empty() {
        let mut table = TextTable::new(&[("#", Align::Right), ("Tenant", Align::Left), ("Total", Align::Right)]);
        for (i, row) in ranked.iter().enumerate() {
            table.push(vec![
                (i + 1).to_string(),
                row.tenant.clone(),
                format_currency(Some(row.total_cost), symbol),
            ]);
        }
        out.push_str(&format!("\nTop {} customers by revenue\n\n{}", ranked.len(), table.render()));
    }
    out
}

pub(crate) fn render_tenant(detail: &TenantDetail, largest: Option<f64>, symbol: &str) -> String {
    if detail.is_empty() {
        return format!("No data found for tenant '{}'.\n", detail.tenant);
    }

    let mut table = TextTable::new(&[
        ("Service name", Align::Left),
        ("Edition", Align::Left),
        ("SKU", Align::Left),
        ("Metric name", Align::Left),
        ("Metric unit", Align::Left),
        ("Total usage", Align::Right),
        ("Per unit", Align::Right),
        ("Total", Align::Right),
    ]);
    for line in report_lines(detail, symbol) {
        table.push(vec![
            line.service,
            line.edition,
            line.sku,
            line.metric_name,
            line.metric_unit,
            line.total_usage,
            line.per_unit,
            line.total,
        ]);
    }

    let mut out = format!("Report for {}\n\n{}\n", detail.tenant, table.render());
    out.push_str(&format!(
        "Total Usage Amount: {}\n",
        format_currency(Some(detail.total_cost), symbol)
    ));
    out.push_str(&format!(
        "Average per line: {}\n",
        format_currency(detail.average_cost, symbol)
    ));
    out.push_str(&format!("Largest tenant total: {}\n", format_currency(largest, symbol)));
    if detail.unpriced_lines > 0 {
        out.push_str(&format!(
            "Note: {} line(s) have no commitment price and are not in the total.\n",
            detail.unpriced_lines
        ));
    }
    out
}

pub(crate) fn render_options(options: &SelectionOptions, service: Option<&str>) -> String {
    if options.tenants.is_empty() {
        return "No data found: no billable usage lines.\n".to_string();
    }
    let mut out = String::from("Services:\n");
    for s in &options.services {
        out.push_str(&format!("  {}\n", s));
    }
    match service {
        Some(s) => out.push_str(&format!("\nSKUs ({}):\n", s)),
        None => out.push_str("\nSKUs:\n"),
    }
    if options.skus.is_empty() {
        out.push_str("  (none)\n");
    }
    for o in &options.skus {
        out.push_str(&format!("  {}\n", o.label));
    }
    out.push_str("\nTenants:\n");
    for t in &options.tenants {
        out.push_str(&format!("  {}\n", t));
    }
    out
}

fn print_view(view: &View, json: bool, symbol: &str, service: Option<&str>) -> Result<(), CliError> {
    if json {
        return emit_json(view);
    }
    let text = match view {
        View::TopTenants { tenants } => render_top(tenants, symbol),
        View::Products { breakdown } => render_products(breakdown, symbol, TOP_CUSTOMERS),
        View::Tenant { detail, largest_tenant_total } => {
            render_tenant(detail, *largest_tenant_total, symbol)
        }
        View::Options { options } => render_options(options, service),
    };
    emit(&text)
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

pub fn cmd_top(args: &InputArgs, n: Option<usize>, json: bool) -> Result<(), CliError> {
    let loaded = dataset::load(args)?;
    let n = n.unwrap_or(loaded.config.report.top_n);
    if n == 0 {
        return Err(CliError::args("-n must be at least 1"));
    }
    let view = build_view(&loaded.dataset, &ViewRequest::new(Action::TopTenants { n }));
    print_view(&view, json, &loaded.config.report.currency_symbol, None)
}

pub fn cmd_products(
    args: &InputArgs,
    service: Option<String>,
    sku: Option<String>,
    top: Option<usize>,
    json: bool,
) -> Result<(), CliError> {
    let top = top.unwrap_or(TOP_CUSTOMERS);
    if top == 0 {
        return Err(CliError::args("--top must be at least 1"));
    }
    let loaded = dataset::load(args)?;

    // A "<metric> - <sku>" label as listed by `options` selects its SKU
    let sku = sku.map(|value| {
        let options = selection_options(&loaded.dataset.lines, service.as_deref());
        match options.resolve_sku_option(&value) {
            Some(resolved) => resolved.to_string(),
            None => value,
        }
    });

    let mut request = ViewRequest::new(Action::ProductBreakdown);
    request.service_filter = service;
    request.sku_filter = sku;
    let view = build_view(&loaded.dataset, &request);
    let symbol = &loaded.config.report.currency_symbol;
    match &view {
        View::Products { breakdown } if !json => emit(&render_products(breakdown, symbol, top)),
        _ => print_view(&view, json, symbol, None),
    }
}

pub fn cmd_tenant(args: &InputArgs, name: String, json: bool) -> Result<(), CliError> {
    let loaded = dataset::load(args)?;
    let mut request = ViewRequest::new(Action::TenantDetail);
    request.tenant = Some(name);
    let view = build_view(&loaded.dataset, &request);
    print_view(&view, json, &loaded.config.report.currency_symbol, None)
}

pub fn cmd_options(args: &InputArgs, service: Option<String>, json: bool) -> Result<(), CliError> {
    let loaded = dataset::load(args)?;
    let mut request = ViewRequest::new(Action::SelectionOptions);
    request.service_filter = service.clone();
    let view = build_view(&loaded.dataset, &request);
    print_view(&view, json, &loaded.config.report.currency_symbol, service.as_deref())
}

pub fn cmd_request(args: &InputArgs, file: &Path) -> Result<(), CliError> {
    let text = std::fs::read_to_string(file)
        .map_err(|e| CliError::io(format!("cannot read request {}: {}", file.display(), e)))?;
    let request = ViewRequest::from_toml(&text)
        .map_err(|e| CliError::config(format!("{}: {}", file.display(), e)))?;

    let loaded = dataset::load(args)?;
    let view = build_view(&loaded.dataset, &request);
    tracing::debug!(empty = view.is_empty(), "answered request {}", file.display());
    emit_json(&view)
}

#[cfg(test)]
mod tests {
    use super::*;
    use skucalc_pipeline::aggregate::{product_breakdown, tenant_detail, top_tenants};
    use skucalc_pipeline::model::{BilledLine, ProductFilter, UsageRecord};

    fn line(tenant: &str, service: &str, sku: &str, qty: f64, price: Option<f64>) -> BilledLine {
        BilledLine {
            usage: UsageRecord {
                tenant: tenant.into(),
                service: service.into(),
                edition: "Standard".into(),
                sku: Some(sku.into()),
                metric_name: "Storage".into(),
                metric_unit: "GB".into(),
                total_usage: Some(qty),
                extra: Vec::new(),
            },
            per_unit: price,
            total_cost: price.map(|p| p * qty),
            commitment_extra: Vec::new(),
        }
    }

    fn lines() -> Vec<BilledLine> {
        vec![
            line("Acme", "Backup", "S1", 100.0, Some(1.5)),
            line("Acme", "Backup", "S9", 5.0, None),
            line("Beta", "Backup", "S1", 10.0, Some(1.5)),
        ]
    }

    #[test]
    fn top_lists_rank_and_cost() {
        let text = render_top(&top_tenants(&lines(), 5), "$");
        assert!(text.starts_with("Top 2 tenants by total cost"));
        let acme = text.lines().find(|l| l.contains("Acme")).unwrap();
        assert!(acme.trim_start().starts_with('1'));
        assert!(acme.contains("$150.00"));
    }

    #[test]
    fn empty_selection_prints_no_data() {
        let filter = ProductFilter { service: Some("Backup".into()), sku: Some("S404".into()) };
        let text = render_products(&product_breakdown(&lines(), &filter), "$", TOP_CUSTOMERS);
        assert_eq!(text, "No data found for Backup - S404.\n");
        assert_eq!(
            render_tenant(&tenant_detail(&lines(), "Nobody"), None, "$"),
            "No data found for tenant 'Nobody'.\n"
        );
    }

    #[test]
    fn tenant_text_shows_totals_and_unpriced_note() {
        let text = render_tenant(&tenant_detail(&lines(), "Acme"), Some(150.0), "$");
        assert!(text.starts_with("Report for Acme"));
        assert!(text.contains("Total Usage Amount: $150.00"));
        assert!(text.contains("Average per line: $75.00"));
        assert!(text.contains("Note: 1 line(s)"));
        let unpriced = text.lines().find(|l| l.contains("S9")).unwrap();
        assert!(unpriced.contains("n/a"));
    }

    #[test]
    fn products_text_has_stats_block() {
        let filter = ProductFilter { service: None, sku: Some("S1".into()) };
        let text = render_products(&product_breakdown(&lines(), &filter), "$", TOP_CUSTOMERS);
        assert!(text.starts_with("All Services - S1"));
        assert!(text.contains("Customers: 2"));
        assert!(text.contains("Total quantity: 110.00 GB"));
        assert!(text.contains("Total revenue: $165.00"));
        assert!(text.contains("Average per customer: 55.00 GB"));
    }

    #[test]
    fn products_text_ranks_top_customers() {
        let filter = ProductFilter { service: None, sku: Some("S1".into()) };
        let breakdown = product_breakdown(&lines(), &filter);

        let text = render_products(&breakdown, "$", TOP_CUSTOMERS);
        assert!(text.contains("Top 2 customers by revenue"));
        let ranking = &text[text.find("Top 2 customers").unwrap()..];
        let first = ranking.lines().find(|l| l.contains("Acme")).unwrap();
        assert!(first.trim_start().starts_with('1'));
        assert!(first.contains("$150.00"));

        let text = render_products(&breakdown, "$", 1);
        assert!(text.contains("Top 1 customers by revenue"));
        let ranking = &text[text.find("Top 1 customers").unwrap()..];
        assert!(!ranking.contains("Beta"));
    }

    #[test]
    fn single_customer_has_no_ranking() {
        let filter = ProductFilter { service: None, sku: Some("S9".into()) };
        let text = render_products(&product_breakdown(&lines(), &filter), "$", TOP_CUSTOMERS);
        assert!(text.contains("Customers: 1"));
        assert!(!text.contains("customers by revenue"));
    }

    #[test]
    fn options_text_lists_labels() {
        let text = render_options(&selection_options(&lines(), Some("Backup")), Some("Backup"));
        assert!(text.contains("SKUs (Backup):\n  Storage - S1\n  Storage - S9\n"));
        assert!(text.contains("Tenants:\n  Acme\n  Beta\n"));
    }
}
