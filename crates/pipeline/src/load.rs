//! Map loaded tables onto usage and commitment records.

use crate::config::{CommitmentConfig, UsageColumns};
use crate::error::PipelineError;
use crate::filter::is_billable_sku;
use crate::model::{CommitmentRecord, CommitmentTable, UsageRecord, UsageTable};
use crate::table::{Row, Table};

pub const USAGE_TABLE: &str = "usage";
pub const COMMITMENT_TABLE: &str = "commitment";

fn column_index(table: &Table, table_name: &str, column: &str) -> Result<usize, PipelineError> {
    table.column(column).ok_or_else(|| PipelineError::MissingColumn {
        table: table_name.into(),
        column: column.into(),
    })
}

fn number_at(
    row: &Row,
    idx: usize,
    table_name: &str,
    column: &str,
) -> Result<Option<f64>, PipelineError> {
    row.get(idx).as_number().map_err(|value| PipelineError::InvalidNumber {
        table: table_name.into(),
        row: row.number,
        column: column.into(),
        value,
    })
}

fn text_at(row: &Row, idx: usize) -> String {
    row.get(idx).as_text().unwrap_or_default()
}

/// Indices of the columns not claimed by `used`, with their names.
fn extra_columns(table: &Table, used: &[usize]) -> (Vec<usize>, Vec<String>) {
    table
        .headers
        .iter()
        .enumerate()
        .filter(|(i, h)| !used.contains(i) && !h.is_empty())
        .map(|(i, h)| (i, h.clone()))
        .unzip()
}

/// Read usage records. Every configured column must be present.
pub fn load_usage(table: &Table, columns: &UsageColumns) -> Result<UsageTable, PipelineError> {
    let idx = |name: &str| column_index(table, USAGE_TABLE, name);

    let tenant_idx = idx(&columns.tenant)?;
    let service_idx = idx(&columns.service)?;
    let edition_idx = idx(&columns.edition)?;
    let sku_idx = idx(&columns.sku)?;
    let metric_name_idx = idx(&columns.metric_name)?;
    let metric_unit_idx = idx(&columns.metric_unit)?;
    let usage_idx = idx(&columns.total_usage)?;

    let used = [
        tenant_idx,
        service_idx,
        edition_idx,
        sku_idx,
        metric_name_idx,
        metric_unit_idx,
        usage_idx,
    ];
    let (extra_idx, extra_names) = extra_columns(table, &used);

    let mut records = Vec::with_capacity(table.rows.len());
    let mut lenient = 0usize;
    for row in &table.rows {
        let sku = row.get(sku_idx).as_text();
        // Rows the billable filter drops never fail the load
        let total_usage = if is_billable_sku(sku.as_deref()) {
            number_at(row, usage_idx, USAGE_TABLE, &columns.total_usage)?
        } else {
            row.get(usage_idx).as_number().unwrap_or_else(|_| {
                lenient += 1;
                None
            })
        };
        records.push(UsageRecord {
            tenant: text_at(row, tenant_idx),
            service: text_at(row, service_idx),
            edition: text_at(row, edition_idx),
            sku,
            metric_name: text_at(row, metric_name_idx),
            metric_unit: text_at(row, metric_unit_idx),
            total_usage,
            extra: extra_idx.iter().map(|&i| row.get(i).clone()).collect(),
        });
    }

    if lenient > 0 {
        log::debug!("usage table: ignored {lenient} unparsable quantities on non-billable rows");
    }
    log::debug!("usage table: {} rows, {} extra columns", records.len(), extra_names.len());
    Ok(UsageTable {
        extra_columns: extra_names,
        records,
    })
}

/// Read commitment records. Rows without a SKU are skipped.
pub fn load_commitments(
    table: &Table,
    config: &CommitmentConfig,
) -> Result<CommitmentTable, PipelineError> {
    let sku_idx = column_index(table, COMMITMENT_TABLE, &config.sku_column)?;
    let price_idx = column_index(table, COMMITMENT_TABLE, &config.price_column)?;
    let (extra_idx, extra_names) = extra_columns(table, &[sku_idx, price_idx]);

    let mut records = Vec::with_capacity(table.rows.len());
    let mut skipped = 0usize;
    for row in &table.rows {
        let Some(sku) = row.get(sku_idx).as_text() else {
            skipped += 1;
            continue;
        };
        records.push(CommitmentRecord {
            sku,
            price: number_at(row, price_idx, COMMITMENT_TABLE, &config.price_column)?,
            extra: extra_idx.iter().map(|&i| row.get(i).clone()).collect(),
        });
    }

    if skipped > 0 {
        log::debug!("commitment table: skipped {skipped} row(s) without a SKU");
    }
    Ok(CommitmentTable {
        extra_columns: extra_names,
        records,
    })
}
