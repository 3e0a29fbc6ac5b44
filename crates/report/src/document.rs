//! Tenant report: heading, cost charts and the line-item table.

use std::path::Path;

use skucalc_pipeline::config::ReportSettings;
use skucalc_pipeline::model::TenantDetail;

use crate::chart::{bar_chart, pie_chart, ChartImage, LegendEntry};
use crate::currency::{format_currency, format_quantity};
use crate::error::ReportError;
use crate::layout::{Field, ReportLayout};
use crate::pdf::{fit_text, text_width, Canvas, Font, ImageRef, PdfDocument, PT_PER_MM};

/// Label of the reference slice in the share chart.
pub const LARGEST_TENANT_LABEL: &str = "Largest Tenant";
pub const DONUT_HOLE: f64 = 0.3;

const TITLE_SIZE: f64 = 16.0;
const HEADING_SIZE: f64 = 12.0;
const NOTE_SIZE: f64 = 10.0;
const CAPTION_SIZE: f64 = 11.0;
const TABLE_SIZE: f64 = 9.0;
const LEGEND_SIZE: f64 = 9.0;
const FOOTER_SIZE: f64 = 8.0;
const CELL_PADDING: f64 = 1.0;
const LEGEND_ROW: f64 = 6.0;
const LEGEND_SWATCH: f64 = 3.0;
const CHART_GAP: f64 = 4.0;

fn bar_caption(tenant: &str) -> String {
    format!("Total Cost by Service for {tenant}")
}

fn pie_caption(tenant: &str) -> String {
    format!("Total Cost Comparison of {tenant} with Largest Tenant")
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReportOptions {
    pub title: String,
    pub currency_symbol: String,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            title: "Billing Review".to_string(),
            currency_symbol: "$".to_string(),
        }
    }
}

impl ReportOptions {
    pub fn from_settings(settings: &ReportSettings) -> Self {
        Self {
            title: settings.title.clone(),
            currency_symbol: settings.currency_symbol.clone(),
        }
    }
}

/// One table row, already formatted for print.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportLine {
    pub service: String,
    pub edition: String,
    pub sku: String,
    pub metric_name: String,
    pub metric_unit: String,
    pub total_usage: String,
    pub per_unit: String,
    pub total: String,
}

impl ReportLine {
    pub fn field(&self, field: Field) -> &str {
        match field {
            Field::Service => &self.service,
            Field::Edition => &self.edition,
            Field::Sku => &self.sku,
            Field::MetricName => &self.metric_name,
            Field::MetricUnit => &self.metric_unit,
            Field::TotalUsage => &self.total_usage,
            Field::PerUnit => &self.per_unit,
            Field::Total => &self.total,
        }
    }
}

pub fn report_lines(detail: &TenantDetail, currency_symbol: &str) -> Vec<ReportLine> {
    detail
        .lines
        .iter()
        .map(|line| {
            let u = &line.usage;
            ReportLine {
                service: u.service.clone(),
                edition: u.edition.clone(),
                sku: u.sku_str().to_string(),
                metric_name: u.metric_name.clone(),
                metric_unit: u.metric_unit.clone(),
                total_usage: format_quantity(u.total_usage),
                per_unit: format_currency(line.per_unit, currency_symbol),
                total: format_currency(line.total_cost, currency_symbol),
            }
        })
        .collect()
}

/// Everything the renderer needs. Owns both chart rasters.
#[derive(Debug, Clone)]
pub struct ReportInput {
    pub tenant: String,
    pub total_cost: f64,
    pub unpriced_lines: usize,
    pub lines: Vec<ReportLine>,
    pub bar: ChartImage,
    pub pie: ChartImage,
}

impl ReportInput {
    /// Format the tenant's lines and draw its charts at the layout's raster
    /// size: cost by service, and the tenant's total against the largest
    /// tenant's total.
    pub fn from_detail(
        detail: &TenantDetail,
        largest_tenant_total: Option<f64>,
        layout: &ReportLayout,
        currency_symbol: &str,
    ) -> Self {
        let (width, height) = layout.chart_pixels;
        let services: Vec<(&str, f64)> = detail
            .cost_by_service
            .iter()
            .map(|s| (s.service.as_str(), s.total_cost))
            .collect();
        let share = [
            (detail.tenant.as_str(), detail.total_cost),
            (LARGEST_TENANT_LABEL, largest_tenant_total.unwrap_or(0.0)),
        ];

        Self {
            tenant: detail.tenant.clone(),
            total_cost: detail.total_cost,
            unpriced_lines: detail.unpriced_lines,
            lines: report_lines(detail, currency_symbol),
            bar: bar_chart(&services, width, height),
            pie: pie_chart(&share, width, height, DONUT_HOLE),
        }
    }
}

/// `Report_<tenant>.<ext>` with path separators and control characters
/// replaced by `_`.
pub fn report_filename(tenant: &str, ext: &str) -> String {
    let safe: String = tenant
        .chars()
        .map(|c| if matches!(c, '/' | '\\') || c.is_control() { '_' } else { c })
        .collect();
    format!("Report_{safe}.{ext}")
}

pub fn save_report(bytes: &[u8], path: &Path) -> Result<(), ReportError> {
    std::fs::write(path, bytes).map_err(|source| ReportError::Io {
        path: path.display().to_string(),
        source,
    })?;
    log::info!("wrote report {} ({} bytes)", path.display(), bytes.len());
    Ok(())
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

/// Top-down cursor over a growing list of pages.
struct PageFlow<'a> {
    layout: &'a ReportLayout,
    pages: Vec<Canvas>,
    canvas: Canvas,
    y: f64,
}

/// Baseline for text vertically centred in a box of height `h`.
fn baseline(y: f64, h: f64, size_pt: f64) -> f64 {
    y + h / 2.0 + 0.3 * size_pt / PT_PER_MM
}

impl<'a> PageFlow<'a> {
    fn new(layout: &'a ReportLayout) -> Self {
        Self {
            layout,
            pages: Vec::new(),
            canvas: Canvas::new(layout.page_height),
            y: layout.margin,
        }
    }

    fn new_page(&mut self) {
        let full = std::mem::replace(&mut self.canvas, Canvas::new(self.layout.page_height));
        self.pages.push(full);
        self.y = self.layout.margin;
    }

    /// Break the page unless `h` mm still fit above the bottom margin.
    fn ensure_space(&mut self, h: f64) {
        if self.y + h > self.layout.content_bottom() && self.y > self.layout.margin {
            self.new_page();
        }
    }

    fn centered(&mut self, text: &str, font: Font, size_pt: f64) {
        self.ensure_space(self.layout.line_height);
        self.centered_here(text, font, size_pt);
    }

    /// One centered line at the cursor, no page break.
    fn centered_here(&mut self, text: &str, font: Font, size_pt: f64) {
        let h = self.layout.line_height;
        let w = text_width(text, font, size_pt);
        let x = ((self.layout.page_width - w) / 2.0).max(self.layout.margin);
        self.canvas.text(x, baseline(self.y, h, size_pt), font, size_pt, text);
        self.y += h;
    }

    fn legend_rows(&self, legend: &[LegendEntry], symbol: &str) -> Vec<Vec<(String, [u8; 3])>> {
        let max_x = self.layout.margin + self.layout.chart_width;
        let mut rows: Vec<Vec<(String, [u8; 3])>> = Vec::new();
        let mut x = self.layout.margin;
        for entry in legend {
            let label = format!("{}: {}", entry.label, format_currency(Some(entry.value), symbol));
            let w = LEGEND_SWATCH + 1.5 + text_width(&label, Font::Regular, LEGEND_SIZE) + 6.0;
            if rows.is_empty() || (x + w > max_x && x > self.layout.margin) {
                rows.push(Vec::new());
                x = self.layout.margin;
            }
            x += w;
            if let Some(row) = rows.last_mut() {
                row.push((label, entry.color));
            }
        }
        rows
    }

    /// Caption, image and legend, kept together on one page.
    fn chart(&mut self, caption: &str, image: &ImageRef, raster: &ChartImage, symbol: &str) {
        let img_h = self.layout.chart_height((raster.width, raster.height));
        let rows = self.legend_rows(&raster.legend, symbol);
        self.ensure_space(self.layout.line_height + img_h + rows.len() as f64 * LEGEND_ROW);
        self.centered_here(caption, Font::Bold, CAPTION_SIZE);

        let x0 = self.layout.margin;
        self.canvas.image(image, x0, self.y, self.layout.chart_width, img_h);
        self.y += img_h;

        for row in rows {
            let mut x = x0;
            for (label, color) in row {
                let top = self.y + (LEGEND_ROW - LEGEND_SWATCH) / 2.0;
                self.canvas.fill_rect(x, top, LEGEND_SWATCH, LEGEND_SWATCH, color);
                x += LEGEND_SWATCH + 1.5;
                self.canvas.text(
                    x,
                    baseline(self.y, LEGEND_ROW, LEGEND_SIZE),
                    Font::Regular,
                    LEGEND_SIZE,
                    &label,
                );
                x += text_width(&label, Font::Regular, LEGEND_SIZE) + 6.0;
            }
            self.y += LEGEND_ROW;
        }
        self.y += CHART_GAP;
    }

    fn cell(&mut self, x: f64, w: f64, text: &str, font: Font, right_align: bool) {
        let h = self.layout.row_height;
        self.canvas.stroke_rect(x, self.y, w, h);
        let fitted = fit_text(text, font, TABLE_SIZE, w - 2.0 * CELL_PADDING);
        let tx = if right_align {
            x + w - CELL_PADDING - text_width(&fitted, font, TABLE_SIZE)
        } else {
            x + CELL_PADDING
        };
        self.canvas
            .text(tx, baseline(self.y, h, TABLE_SIZE), font, TABLE_SIZE, &fitted);
    }

    fn table_header(&mut self) {
        let layout = self.layout;
        let mut x = layout.margin;
        for col in &layout.columns {
            self.cell(x, col.width, col.header, Font::Bold, false);
            x += col.width;
        }
        self.y += self.layout.row_height;
    }

    fn table(&mut self, lines: &[ReportLine]) {
        let row_h = self.layout.row_height;
        // Header plus at least one row on the page it starts on
        self.ensure_space(2.0 * row_h);
        self.table_header();

        let layout = self.layout;
        for line in lines {
            if self.y + row_h > layout.content_bottom() {
                self.new_page();
                self.table_header();
            }
            let mut x = layout.margin;
            for col in &layout.columns {
                self.cell(x, col.width, line.field(col.field), Font::Regular, col.field.is_numeric());
                x += col.width;
            }
            self.y += row_h;
        }
    }

    /// Close the flow and stamp page numbers.
    fn into_pages(mut self) -> Vec<Canvas> {
        self.pages.push(self.canvas);
        let total = self.pages.len();
        let footer_y = self.layout.page_height - self.layout.bottom_margin / 2.0;
        for (i, page) in self.pages.iter_mut().enumerate() {
            let text = format!("Page {} of {}", i + 1, total);
            let x = (self.layout.page_width - text_width(&text, Font::Regular, FOOTER_SIZE)) / 2.0;
            page.text(x, footer_y, Font::Regular, FOOTER_SIZE, &text);
        }
        self.pages
    }
}

/// Render the tenant report as PDF bytes.
pub fn render_tenant_report(
    input: ReportInput,
    layout: &ReportLayout,
    options: &ReportOptions,
) -> Result<Vec<u8>, ReportError> {
    let symbol = options.currency_symbol.as_str();
    let mut doc = PdfDocument::new(layout.page_width, layout.page_height);
    let bar = doc.add_image("cost by service", &input.bar)?;
    let pie = doc.add_image("tenant share", &input.pie)?;

    let mut flow = PageFlow::new(layout);
    flow.centered(&options.title, Font::Bold, TITLE_SIZE);
    flow.centered(&format!("Report for {}", input.tenant), Font::Regular, HEADING_SIZE);
    flow.centered(
        &format!("Total Usage Amount: {}", format_currency(Some(input.total_cost), symbol)),
        Font::Regular,
        HEADING_SIZE,
    );
    if input.unpriced_lines > 0 {
        flow.centered(
            &format!("{} line(s) without a commitment price are excluded from the total", input.unpriced_lines),
            Font::Regular,
            NOTE_SIZE,
        );
    }

    flow.chart(&bar_caption(&input.tenant), &bar, &input.bar, symbol);
    flow.chart(&pie_caption(&input.tenant), &pie, &input.pie, symbol);

    if input.lines.is_empty() {
        flow.centered("No line items", Font::Regular, HEADING_SIZE);
    } else {
        flow.table(&input.lines);
    }

    let pages = flow.into_pages();
    log::debug!(
        "report for {}: {} lines on {} page(s)",
        input.tenant,
        input.lines.len(),
        pages.len()
    );
    for page in pages {
        doc.add_page(page)?;
    }
    doc.finish()
}
