//! `skucalc-pipeline`: usage/commitment join and billing aggregation.
//!
//! Pure engine crate: receives pre-loaded tables, returns billed lines and
//! summaries. No CLI or IO dependencies.

pub mod aggregate;
pub mod config;
pub mod engine;
pub mod error;
pub mod filter;
pub mod join;
pub mod load;
pub mod model;
pub mod options;
pub mod table;
pub mod view;

pub use config::PipelineConfig;
pub use engine::run;
pub use error::PipelineError;
pub use model::{BilledLine, CommitmentRecord, JoinedDataset, UsageRecord};
pub use table::{Cell, Row, Table};
pub use view::{build_view, Action, View, ViewRequest};
