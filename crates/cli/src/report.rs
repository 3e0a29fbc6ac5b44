// File outputs: joined-dataset export and per-tenant PDF report

use std::path::{Path, PathBuf};

use skucalc_io::DEFAULT_EXPORT_FILE;
use skucalc_pipeline::aggregate::{largest_tenant_total, tenant_detail};
use skucalc_pipeline::config::PageLayout;
use skucalc_report::{render_tenant_report, report_filename, save_report};
use skucalc_report::{ReportInput, ReportLayout, ReportOptions};

use crate::dataset;
use crate::views::emit;
use crate::{CliError, InputArgs};

pub fn cmd_export(args: &InputArgs, output: Option<PathBuf>) -> Result<(), CliError> {
    let loaded = dataset::load(args)?;
    let path = output.unwrap_or_else(|| PathBuf::from(DEFAULT_EXPORT_FILE));

    skucalc_io::write_joined(&loaded.dataset, &loaded.config.usage.columns, &path)
        .map_err(|e| CliError::io(format!("{}: {}", path.display(), e)))?;

    emit(&format!("Exported {} rows to {}\n", loaded.dataset.len(), path.display()))
}

/// `-o DIR` (existing directory) gets the default file name inside it.
pub(crate) fn report_path(output: Option<&Path>, tenant: &str) -> PathBuf {
    let name = report_filename(tenant, "pdf");
    match output {
        Some(dir) if dir.is_dir() => dir.join(name),
        Some(file) => file.to_path_buf(),
        None => PathBuf::from(name),
    }
}

pub fn cmd_report(
    args: &InputArgs,
    tenant: &str,
    layout: Option<PageLayout>,
    output: Option<PathBuf>,
) -> Result<(), CliError> {
    let loaded = dataset::load(args)?;
    let settings = &loaded.config.report;
    let lines = &loaded.dataset.lines;

    let detail = tenant_detail(lines, tenant);
    if detail.is_empty() {
        tracing::warn!("tenant '{}' has no billed lines; the report will be empty", tenant);
    }

    let layout = ReportLayout::for_kind(layout.unwrap_or(settings.layout));
    let options = ReportOptions::from_settings(settings);
    let input = ReportInput::from_detail(
        &detail,
        largest_tenant_total(lines),
        &layout,
        &options.currency_symbol,
    );
    let bytes = render_tenant_report(input, &layout, &options)?;

    let path = report_path(output.as_deref(), tenant);
    save_report(&bytes, &path)?;

    emit(&format!("Wrote {} report for {} to {}\n", layout.kind, tenant, path.display()))
}
