use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use crate::error::PipelineError;
use crate::model::{BilledLine, CommitmentRecord, CommitmentTable, JoinedDataset, UsageTable};
use crate::table::Cell;

/// What to do when the commitment table lists a SKU more than once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicateSkuPolicy {
    /// Each usage row fans out into one line per duplicate.
    #[default]
    FanOut,
    /// Refuse to join.
    Reject,
}

/// Index commitment rows by SKU, keeping table order within each SKU.
fn index_by_sku(commitments: &[CommitmentRecord]) -> HashMap<&str, Vec<&CommitmentRecord>> {
    let mut index: HashMap<&str, Vec<&CommitmentRecord>> = HashMap::new();
    for record in commitments {
        index.entry(record.sku.as_str()).or_default().push(record);
    }
    index
}

/// Error on the first SKU (in table order) that appears more than once.
pub fn check_unique_skus(commitments: &[CommitmentRecord]) -> Result<(), PipelineError> {
    let index = index_by_sku(commitments);
    for record in commitments {
        let count = index.get(record.sku.as_str()).map(|v| v.len()).unwrap_or(0);
        if count > 1 {
            return Err(PipelineError::DuplicateSku {
                sku: record.sku.clone(),
                count,
            });
        }
    }
    Ok(())
}

/// Left outer join of usage onto commitments by SKU.
///
/// Every usage row survives. Rows without a matching commitment get
/// `per_unit = None` and `total_cost = None`.
pub fn join_costs(usage: UsageTable, commitments: &CommitmentTable) -> JoinedDataset {
    let index = index_by_sku(&commitments.records);
    let blank_extra = vec![Cell::Empty; commitments.extra_columns.len()];

    let duplicated = index.values().filter(|v| v.len() > 1).count();
    if duplicated > 0 {
        log::warn!("commitment table has {duplicated} SKU(s) listed more than once; matching usage rows fan out");
    }

    let mut lines = Vec::with_capacity(usage.records.len());
    let mut unmatched: BTreeSet<String> = BTreeSet::new();

    for record in usage.records {
        let matches = record
            .sku
            .as_deref()
            .and_then(|sku| index.get(sku))
            .filter(|m| !m.is_empty());

        match matches {
            Some(matches) => {
                for commitment in matches {
                    let total_cost = match (record.total_usage, commitment.price) {
                        (Some(qty), Some(price)) => Some(qty * price),
                        _ => None,
                    };
                    lines.push(BilledLine {
                        usage: record.clone(),
                        per_unit: commitment.price,
                        total_cost,
                        commitment_extra: commitment.extra.clone(),
                    });
                }
            }
            None => {
                unmatched.insert(record.sku_str().to_string());
                lines.push(BilledLine {
                    usage: record,
                    per_unit: None,
                    total_cost: None,
                    commitment_extra: blank_extra.clone(),
                });
            }
        }
    }

    if !unmatched.is_empty() {
        let sample: Vec<&str> = unmatched.iter().take(10).map(String::as_str).collect();
        log::warn!(
            "{} usage SKU(s) have no commitment price: {}{}",
            unmatched.len(),
            sample.join(", "),
            if unmatched.len() > sample.len() { ", ..." } else { "" }
        );
    }
    log::debug!("cost join: {} billed lines", lines.len());

    JoinedDataset {
        usage_columns: usage.extra_columns,
        commitment_columns: commitments.extra_columns.clone(),
        lines,
    }
}
