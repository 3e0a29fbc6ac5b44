//! Page geometry for the two report orientations. All lengths in mm.

use skucalc_pipeline::config::PageLayout;

/// Which line-item value a table column shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Service,
    Edition,
    Sku,
    MetricName,
    MetricUnit,
    TotalUsage,
    PerUnit,
    Total,
}

impl Field {
    /// Numbers are right-aligned in their cell.
    pub fn is_numeric(self) -> bool {
        matches!(self, Field::TotalUsage | Field::PerUnit | Field::Total)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub header: &'static str,
    pub field: Field,
    pub width: f64,
}

const fn column(header: &'static str, field: Field, width: f64) -> Column {
    Column { header, field, width }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReportLayout {
    pub kind: PageLayout,
    pub page_width: f64,
    pub page_height: f64,
    pub margin: f64,
    /// Content may not extend below `page_height - bottom_margin`.
    pub bottom_margin: f64,
    pub line_height: f64,
    pub row_height: f64,
    pub chart_width: f64,
    /// Raster size the charts are drawn at.
    pub chart_pixels: (u32, u32),
    pub columns: Vec<Column>,
}

impl ReportLayout {
    pub fn portrait() -> Self {
        Self {
            kind: PageLayout::Portrait,
            page_width: 210.0,
            page_height: 297.0,
            margin: 10.0,
            bottom_margin: 20.0,
            line_height: 10.0,
            row_height: 10.0,
            chart_width: 190.0,
            chart_pixels: (900, 300),
            columns: vec![
                column("Service name", Field::Service, 25.0),
                column("Edition", Field::Edition, 25.0),
                column("SKU", Field::Sku, 20.0),
                column("Metric name", Field::MetricName, 40.0),
                column("Metric unit", Field::MetricUnit, 20.0),
                column("Total usage", Field::TotalUsage, 25.0),
                column("Per unit", Field::PerUnit, 20.0),
                column("Total", Field::Total, 25.0),
            ],
        }
    }

    pub fn landscape() -> Self {
        Self {
            kind: PageLayout::Landscape,
            page_width: 297.0,
            page_height: 210.0,
            margin: 10.0,
            bottom_margin: 20.0,
            line_height: 10.0,
            row_height: 10.0,
            chart_width: 260.0,
            chart_pixels: (1050, 250),
            columns: vec![
                column("Service name", Field::Service, 40.0),
                column("Edition", Field::Edition, 40.0),
                column("Metric name", Field::MetricName, 50.0),
                column("Metric unit", Field::MetricUnit, 30.0),
                column("Total usage", Field::TotalUsage, 40.0),
                column("Per unit", Field::PerUnit, 30.0),
                column("Total", Field::Total, 40.0),
            ],
        }
    }

    pub fn for_kind(kind: PageLayout) -> Self {
        match kind {
            PageLayout::Portrait => Self::portrait(),
            PageLayout::Landscape => Self::landscape(),
        }
    }

    pub fn table_width(&self) -> f64 {
        self.columns.iter().map(|c| c.width).sum()
    }

    /// Lowest y a row may end at.
    pub fn content_bottom(&self) -> f64 {
        self.page_height - self.bottom_margin
    }

    /// Printed height of a chart drawn at `chart_width`.
    pub fn chart_height(&self, pixels: (u32, u32)) -> f64 {
        let (w, h) = pixels;
        if w == 0 {
            return 0.0;
        }
        self.chart_width * h as f64 / w as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tables_fit_on_page() {
        for layout in [ReportLayout::portrait(), ReportLayout::landscape()] {
            assert!(layout.table_width() <= layout.page_width - layout.margin);
            assert!(layout.chart_width <= layout.page_width - 2.0 * layout.margin);
        }
    }

    #[test]
    fn portrait_has_sku_column_landscape_does_not() {
        let has_sku = |l: &ReportLayout| l.columns.iter().any(|c| c.field == Field::Sku);
        assert_eq!(ReportLayout::portrait().columns.len(), 8);
        assert!(has_sku(&ReportLayout::portrait()));
        assert_eq!(ReportLayout::landscape().columns.len(), 7);
        assert!(!has_sku(&ReportLayout::landscape()));
    }

    #[test]
    fn chart_height_follows_aspect_ratio() {
        let layout = ReportLayout::portrait();
        let h = layout.chart_height(layout.chart_pixels);
        assert!((h - 190.0 / 3.0).abs() < 1e-9);
        assert_eq!(ReportLayout::for_kind(PageLayout::Landscape).kind, PageLayout::Landscape);
    }
}
