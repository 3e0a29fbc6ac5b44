// Excel file import (xlsx, xls, xlsb, ods) and export (xlsx only)
//
// Import: one sheet into a header + rows table. Values keep their calamine
// type; dates come through as serial numbers.
// Export: flat data sheet of the joined dataset, bold header row.

use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader, Sheets};
use rust_xlsxwriter::{Format, Workbook as XlsxWorkbook};
use skucalc_pipeline::config::UsageColumns;
use skucalc_pipeline::{Cell, JoinedDataset, Table};

use crate::{export_headers, export_rows, text_cell};

/// Name of the single sheet written by [`export_joined`].
pub const EXPORT_SHEET_NAME: &str = "Sheet1";

fn data_to_cell(data: &Data) -> Cell {
    match data {
        Data::Empty => Cell::Empty,
        Data::String(s) => text_cell(s),
        Data::Float(n) => Cell::Number(*n),
        Data::Int(n) => Cell::Number(*n as f64),
        Data::Bool(b) => Cell::Bool(*b),
        Data::Error(e) => Cell::Text(format!("#{:?}", e)),
        Data::DateTime(dt) => Cell::Number(dt.as_f64()),
        Data::DateTimeIso(s) => text_cell(s),
        Data::DurationIso(s) => text_cell(s),
    }
}

fn header_text(data: &Data) -> String {
    data_to_cell(data).to_string().trim().to_string()
}

/// Import one sheet (`sheet`, or the first one) with headers at the
/// zero-based `header_row`.
///
/// Row numbers on the returned rows are 1-based sheet rows, so error
/// messages point at what the user sees in their spreadsheet program.
pub fn import_table(path: &Path, header_row: usize, sheet: Option<&str>) -> Result<Table, String> {
    let mut workbook: Sheets<_> = open_workbook_auto(path)
        .map_err(|e| format!("Failed to open Excel file: {}", e))?;

    let sheet_names: Vec<String> = workbook.sheet_names().to_vec();
    let sheet_name = match sheet {
        Some(name) => sheet_names
            .iter()
            .find(|n| n.as_str() == name)
            .cloned()
            .ok_or_else(|| {
                format!("Sheet '{}' not found (available: {})", name, sheet_names.join(", "))
            })?,
        None => sheet_names
            .first()
            .cloned()
            .ok_or_else(|| "Excel file contains no sheets".to_string())?,
    };

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| format!("Failed to read sheet '{}': {}", sheet_name, e))?;

    // Range start offset (data may not begin at A1)
    let (data_start_row, data_start_col) = range.start().unwrap_or((0, 0));
    let col_offset = data_start_col as usize;

    let mut table: Option<Table> = None;

    for (row_idx, row) in range.rows().enumerate() {
        let sheet_row = data_start_row as usize + row_idx;
        if sheet_row < header_row {
            continue;
        }

        match table.as_mut() {
            None => {
                if sheet_row > header_row {
                    // Header row lies in the blank area before the used range
                    break;
                }
                let mut headers = vec![String::new(); col_offset];
                headers.extend(row.iter().map(header_text));
                table = Some(Table::new(headers));
            }
            Some(table) => {
                let mut cells = vec![Cell::Empty; col_offset];
                cells.extend(row.iter().map(data_to_cell));
                if cells.iter().all(Cell::is_empty) {
                    continue;
                }
                table.push_row(sheet_row + 1, cells);
            }
        }
    }

    table.ok_or_else(|| {
        format!("Header row {} not found in sheet '{}'", header_row, sheet_name)
    })
}

/// Export the joined dataset as a single-sheet workbook.
pub fn export_joined(dataset: &JoinedDataset, columns: &UsageColumns, path: &Path) -> Result<(), String> {
    let mut xlsx_workbook = XlsxWorkbook::new();
    let worksheet = xlsx_workbook
        .add_worksheet()
        .set_name(EXPORT_SHEET_NAME)
        .map_err(|e| format!("Failed to create sheet: {}", e))?;

    let header_format = Format::new().set_bold();
    for (col, header) in export_headers(dataset, columns).iter().enumerate() {
        worksheet
            .write_string_with_format(0, col as u16, header, &header_format)
            .map_err(|e| format!("Failed to write header: {}", e))?;
    }

    for (row_idx, row) in export_rows(dataset).iter().enumerate() {
        let xl_row = row_idx as u32 + 1;
        for (col, cell) in row.iter().enumerate() {
            let xl_col = col as u16;
            let written = match cell {
                Cell::Empty => continue,
                Cell::Text(s) => worksheet.write_string(xl_row, xl_col, s),
                Cell::Number(n) => worksheet.write_number(xl_row, xl_col, *n),
                Cell::Bool(b) => worksheet.write_boolean(xl_row, xl_col, *b),
            };
            written.map_err(|e| format!("Failed to write row {}: {}", xl_row + 1, e))?;
        }
    }

    xlsx_workbook
        .save(path)
        .map_err(|e| format!("Failed to save XLSX file: {}", e))?;

    log::info!("wrote {} rows to {}", dataset.len(), path.display());
    Ok(())
}
