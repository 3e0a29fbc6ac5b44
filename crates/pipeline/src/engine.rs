use crate::config::PipelineConfig;
use crate::error::PipelineError;
use crate::filter::filter_billable;
use crate::join::{check_unique_skus, join_costs, DuplicateSkuPolicy};
use crate::load::{load_commitments, load_usage};
use crate::model::{JoinedDataset, UsageTable};
use crate::table::Table;

/// Load, filter and join per config. Returns the priced dataset every view
/// is computed from.
pub fn run(
    usage: &Table,
    commitment: &Table,
    config: &PipelineConfig,
) -> Result<JoinedDataset, PipelineError> {
    let usage = load_usage(usage, &config.usage.columns)?;
    let commitments = load_commitments(commitment, &config.commitment)?;

    if config.commitment.duplicate_skus == DuplicateSkuPolicy::Reject {
        check_unique_skus(&commitments.records)?;
    }

    let billable = UsageTable {
        extra_columns: usage.extra_columns,
        records: filter_billable(usage.records),
    };

    Ok(join_costs(billable, &commitments))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Cell;

    fn usage_table(rows: &[(&str, &str, f64)]) -> Table {
        let mut table = Table::new(
            [
                "Tenant name",
                "Service name",
                "Edition",
                "SKU",
                "Metric name",
                "Metric unit",
                "Total usage",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        );
        for (i, (tenant, sku, qty)) in rows.iter().enumerate() {
            table.push_row(
                i + 2,
                vec![
                    Cell::Text(tenant.to_string()),
                    Cell::Text("Backup".into()),
                    Cell::Text("Standard".into()),
                    Cell::Text(sku.to_string()),
                    Cell::Text("Storage".into()),
                    Cell::Text("GB".into()),
                    Cell::Number(*qty),
                ],
            );
        }
        table
    }

    fn commitment_table(rows: &[(&str, f64)]) -> Table {
        let mut table = Table::new(vec!["SKU".into(), "Commitment 4".into()]);
        for (i, (sku, price)) in rows.iter().enumerate() {
            table.push_row(i + 2, vec![Cell::Text(sku.to_string()), Cell::Number(*price)]);
        }
        table
    }

    #[test]
    fn run_filters_then_joins() {
        let usage = usage_table(&[("Acme", "S1", 100.0), ("Acme", "C-CREDIT", 5.0), ("Beta", "nan", 1.0)]);
        let commitment = commitment_table(&[("S1", 1.5), ("C-CREDIT", 9.0)]);
        let joined = run(&usage, &commitment, &PipelineConfig::default()).unwrap();
        assert_eq!(joined.lines.len(), 1);
        assert_eq!(joined.lines[0].total_cost, Some(150.0));
    }

    #[test]
    fn nan_quantity_is_an_unpriced_line() {
        let mut usage = usage_table(&[("Acme", "S1", 100.0), ("Acme", "S1", 0.0), ("Beta", "S1", 10.0)]);
        usage.rows[1].cells[6] = Cell::Text("nan".into());
        let commitment = commitment_table(&[("S1", 1.5)]);

        let joined = run(&usage, &commitment, &PipelineConfig::default()).unwrap();
        let totals = crate::aggregate::total_by_tenant(&joined.lines);
        assert_eq!(totals[0].tenant, "Acme");
        assert_eq!(totals[0].total_cost, 150.0);
        assert_eq!(totals[0].unpriced_lines, 1);
        assert_eq!(totals[1].total_cost, 15.0);
    }

    #[test]
    fn infinite_quantity_fails_the_run() {
        let mut usage = usage_table(&[("Acme", "S1", 1.0)]);
        usage.rows[0].cells[6] = Cell::Text("inf".into());
        let commitment = commitment_table(&[("S1", 1.5)]);
        let err = run(&usage, &commitment, &PipelineConfig::default()).unwrap_err();
        assert!(matches!(err, PipelineError::InvalidNumber { row: 2, .. }));
    }

    #[test]
    fn credit_row_with_text_quantity_is_dropped() {
        let mut usage = usage_table(&[("Acme", "S1", 100.0), ("Acme", "C-CREDIT", 0.0)]);
        usage.rows[1].cells[6] = Cell::Text("N/A".into());
        let commitment = commitment_table(&[("S1", 1.5)]);

        let joined = run(&usage, &commitment, &PipelineConfig::default()).unwrap();
        assert_eq!(joined.lines.len(), 1);
        assert_eq!(joined.lines[0].total_cost, Some(150.0));
    }

    #[test]
    fn run_rejects_duplicates_when_configured() {
        let usage = usage_table(&[("Acme", "S1", 1.0)]);
        let commitment = commitment_table(&[("S1", 1.0), ("S1", 2.0)]);

        let fan_out = run(&usage, &commitment, &PipelineConfig::default()).unwrap();
        assert_eq!(fan_out.lines.len(), 2);

        let mut config = PipelineConfig::default();
        config.commitment.duplicate_skus = DuplicateSkuPolicy::Reject;
        let err = run(&usage, &commitment, &config).unwrap_err();
        assert!(matches!(err, PipelineError::DuplicateSku { .. }));
    }
}
