// CSV/TSV import/export

use std::io::Read;
use std::path::Path;

use skucalc_pipeline::config::UsageColumns;
use skucalc_pipeline::{Cell, JoinedDataset, Table};

use crate::{export_headers, export_rows, text_cell};

pub fn import_table(path: &Path, header_row: usize) -> Result<Table, String> {
    let content = read_file_as_utf8(path)?;
    let delimiter = sniff_delimiter(after_line(&content, header_row));
    table_from_string(&content, header_row, delimiter)
}

pub fn import_table_with_delimiter(path: &Path, header_row: usize, delimiter: u8) -> Result<Table, String> {
    let content = read_file_as_utf8(path)?;
    table_from_string(&content, header_row, delimiter)
}

/// Text from zero-based physical line `line` onward. Blank lines count,
/// unlike csv records.
fn after_line(content: &str, line: usize) -> &str {
    if line == 0 {
        return content;
    }
    match content.match_indices('\n').nth(line - 1) {
        Some((i, _)) => &content[i + 1..],
        None => "",
    }
}

const SNIFF_LINES: usize = 10;

/// Pick comma, semicolon or tab for a table whose header is the first
/// non-blank line of `body`.
///
/// A candidate must split the header into several fields; the winner is the
/// one whose following records most often have the header's width.
fn sniff_delimiter(body: &str) -> u8 {
    let mut best = (b',', 0usize, 0usize);

    for delim in [b',', b';', b'\t'] {
        let widths: Vec<usize> = csv::ReaderBuilder::new()
            .delimiter(delim)
            .has_headers(false)
            .flexible(true)
            .from_reader(body.as_bytes())
            .records()
            .take(SNIFF_LINES)
            .map_while(Result::ok)
            .map(|r| r.len())
            .collect();

        let Some((&width, rest)) = widths.split_first() else {
            continue;
        };
        if width < 2 {
            continue;
        }
        let agreeing = rest.iter().filter(|&&w| w == width).count();
        if (agreeing, width) > (best.1, best.2) {
            best = (delim, agreeing, width);
        }
    }

    best.0
}

/// Read file and convert to UTF-8 if needed (handles Windows-1252, Latin-1, etc.)
pub fn read_file_as_utf8(path: &Path) -> Result<String, String> {
    let mut file = std::fs::File::open(path)
        .map_err(|e| format!("Failed to open {}: {}", path.display(), e))?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)
        .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;

    let text = match String::from_utf8(bytes) {
        Ok(s) => s,
        Err(e) => {
            let bytes = e.into_bytes();
            log::debug!("{} is not UTF-8, decoding as Windows-1252", path.display());
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(&bytes);
            decoded.into_owned()
        }
    };

    Ok(match text.strip_prefix('\u{feff}') {
        Some(rest) => rest.to_string(),
        None => text,
    })
}

fn table_from_string(content: &str, header_row: usize, delimiter: u8) -> Result<Table, String> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(after_line(content, header_row).as_bytes());

    let mut table: Option<Table> = None;

    for result in reader.records() {
        let record = result.map_err(|e| format!("CSV parse error: {}", e))?;

        match table.as_mut() {
            None => {
                let headers = record.iter().map(|h| h.trim().to_string()).collect();
                table = Some(Table::new(headers));
            }
            Some(table) => {
                let cells: Vec<Cell> = record.iter().map(text_cell).collect();
                if cells.iter().all(Cell::is_empty) {
                    continue;
                }
                // 1-based line in the file where the record starts
                let line = record.position().map_or(0, |p| p.line() as usize);
                table.push_row(header_row + line, cells);
            }
        }
    }

    table.ok_or_else(|| format!("Header row {} not found (file has fewer rows)", header_row))
}

pub fn export_joined(dataset: &JoinedDataset, columns: &UsageColumns, path: &Path) -> Result<(), String> {
    export_joined_with_delimiter(dataset, columns, path, b',')
}

pub fn export_joined_with_delimiter(
    dataset: &JoinedDataset,
    columns: &UsageColumns,
    path: &Path,
    delimiter: u8,
) -> Result<(), String> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_path(path)
        .map_err(|e| format!("Failed to create {}: {}", path.display(), e))?;

    writer
        .write_record(export_headers(dataset, columns))
        .map_err(|e| e.to_string())?;

    for row in export_rows(dataset) {
        let record: Vec<String> = row.iter().map(|c| c.to_string()).collect();
        writer.write_record(&record).map_err(|e| e.to_string())?;
    }

    writer.flush().map_err(|e| e.to_string())?;
    Ok(())
}
