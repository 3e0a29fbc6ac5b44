//! `skucalc-report`: paginated tenant reports.
//!
//! Charts are rasterized in memory and embedded as images; the document is
//! written as a self-contained PDF byte buffer.

pub mod chart;
pub mod currency;
pub mod document;
pub mod error;
pub mod layout;
pub mod pdf;

pub use chart::ChartImage;
pub use currency::{format_currency, format_grouped};
pub use document::{render_tenant_report, report_filename, save_report, ReportInput, ReportOptions};
pub use error::ReportError;
pub use layout::ReportLayout;
