// File I/O operations

pub mod csv;
pub mod xlsx;

use std::collections::HashSet;
use std::path::Path;

use skucalc_pipeline::config::UsageColumns;
use skucalc_pipeline::{Cell, JoinedDataset, Table};

/// Default name for the joined dataset export.
pub const DEFAULT_EXPORT_FILE: &str = "MergedUsageWithCosts.xlsx";

/// Input/output formats, picked by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Workbook,
    Csv,
    Tsv,
}

impl FileFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "xlsx" | "xlsm" | "xls" | "xlsb" | "ods" => Some(FileFormat::Workbook),
            "csv" | "txt" => Some(FileFormat::Csv),
            "tsv" | "tab" => Some(FileFormat::Tsv),
            _ => None,
        }
    }
}

fn unsupported(path: &Path) -> String {
    format!(
        "Unsupported file type: {} (expected .xlsx, .xls, .xlsb, .ods, .csv or .tsv)",
        path.display()
    )
}

/// Read one sheet of `path` into a table whose headers come from the
/// zero-based `header_row`. Rows above the header are ignored.
pub fn read_table(path: &Path, header_row: usize, sheet: Option<&str>) -> Result<Table, String> {
    let table = match FileFormat::from_path(path) {
        Some(FileFormat::Workbook) => xlsx::import_table(path, header_row, sheet)?,
        Some(FileFormat::Csv) => csv::import_table(path, header_row)?,
        Some(FileFormat::Tsv) => csv::import_table_with_delimiter(path, header_row, b'\t')?,
        None => return Err(unsupported(path)),
    };
    log::debug!(
        "read {}: {} columns, {} rows",
        path.display(),
        table.headers.len(),
        table.len()
    );
    Ok(table)
}

/// Write the joined dataset as xlsx or csv, by extension.
pub fn write_joined(dataset: &JoinedDataset, columns: &UsageColumns, path: &Path) -> Result<(), String> {
    match FileFormat::from_path(path) {
        Some(FileFormat::Workbook) => xlsx::export_joined(dataset, columns, path),
        Some(FileFormat::Csv) => csv::export_joined(dataset, columns, path),
        Some(FileFormat::Tsv) => csv::export_joined_with_delimiter(dataset, columns, path, b'\t'),
        None => Err(unsupported(path)),
    }
}

/// Export header: core usage columns, usage extras, commitment extras,
/// then the price and cost columns. A name present on both sides of the
/// join is written as `<name>_x` (usage) and `<name>_y` (commitment).
pub fn export_headers(dataset: &JoinedDataset, columns: &UsageColumns) -> Vec<String> {
    let usage: Vec<&str> = columns
        .names()
        .into_iter()
        .chain(dataset.usage_columns.iter().map(String::as_str))
        .collect();
    let commitment = &dataset.commitment_columns;

    let shared: HashSet<&str> = usage
        .iter()
        .copied()
        .filter(|&name| commitment.iter().any(|c| c == name))
        .collect();
    if !shared.is_empty() {
        log::debug!("export: {} column name(s) on both sides get _x/_y suffixes", shared.len());
    }

    let suffixed = |name: &str, suffix: &str| {
        if shared.contains(name) {
            format!("{name}{suffix}")
        } else {
            name.to_string()
        }
    };

    let mut headers: Vec<String> = usage.iter().map(|&name| suffixed(name, "_x")).collect();
    headers.extend(commitment.iter().map(|name| suffixed(name.as_str(), "_y")));
    headers.push("perunit".into());
    headers.push("total".into());
    headers
}

/// Cells of every billed line, aligned with [`export_headers`].
pub fn export_rows(dataset: &JoinedDataset) -> Vec<Vec<Cell>> {
    let text = text_cell;
    let number = |n: Option<f64>| n.map(Cell::Number).unwrap_or(Cell::Empty);

    dataset
        .lines
        .iter()
        .map(|line| {
            let u = &line.usage;
            let mut cells = vec![
                text(&u.tenant),
                text(&u.service),
                text(&u.edition),
                text(u.sku_str()),
                text(&u.metric_name),
                text(&u.metric_unit),
                number(u.total_usage),
            ];
            cells.extend(u.extra.iter().cloned());
            cells.extend(line.commitment_extra.iter().cloned());
            cells.push(number(line.per_unit));
            cells.push(number(line.total_cost));
            cells
        })
        .collect()
}

/// Data cell as stored in a table: empty strings become `Cell::Empty`.
pub(crate) fn text_cell(s: &str) -> Cell {
    if s.is_empty() {
        Cell::Empty
    } else {
        Cell::Text(s.to_string())
    }
}
