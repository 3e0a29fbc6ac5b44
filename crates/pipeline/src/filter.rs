use crate::model::UsageRecord;

/// Text a missing SKU turns into when a sheet column is stringified.
pub const MISSING_SKU: &str = "nan";

/// SKUs starting with this character are commitment/credit lines, never billed.
pub const NON_BILLABLE_PREFIX: char = 'C';

pub fn is_billable_sku(sku: Option<&str>) -> bool {
    match sku {
        None => false,
        Some(s) => s != MISSING_SKU && !s.starts_with(NON_BILLABLE_PREFIX),
    }
}

/// Keep only billable consumption rows, in their original order.
pub fn filter_billable(records: Vec<UsageRecord>) -> Vec<UsageRecord> {
    let before = records.len();
    let kept: Vec<UsageRecord> = records
        .into_iter()
        .filter(|r| is_billable_sku(r.sku.as_deref()))
        .collect();
    log::debug!("usage filter: kept {} of {} rows", kept.len(), before);
    kept
}
