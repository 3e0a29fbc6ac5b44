use std::path::{Path, PathBuf};

use skucalc_pipeline::{JoinedDataset, PipelineConfig, Table};

use crate::settings;
use crate::{CliError, InputArgs};

/// Resolved config plus the joined dataset every command works from.
pub struct Loaded {
    pub config: PipelineConfig,
    pub dataset: JoinedDataset,
}

fn required(path: &Option<PathBuf>, flag: &str, key: &str) -> Result<PathBuf, CliError> {
    path.clone().ok_or_else(|| {
        CliError::args(format!("no {} table given", key))
            .with_hint(format!("pass {} FILE or set [{}] file in {}", flag, key, settings::CONFIG_FILE_NAME))
    })
}

fn read(path: &Path, header_row: usize, sheet: Option<&str>) -> Result<Table, CliError> {
    if !path.exists() {
        return Err(CliError::io(format!("file not found: {}", path.display())));
    }
    skucalc_io::read_table(path, header_row, sheet)
        .map_err(|e| CliError::io(format!("{}: {}", path.display(), e)))
}

pub fn load(args: &InputArgs) -> Result<Loaded, CliError> {
    let config = settings::resolve(args)?;

    let usage_path = required(&config.usage.file, "--usage", "usage")?;
    let commitment_path = required(&config.commitment.file, "--commitment", "commitment")?;

    let usage = read(&usage_path, config.usage.header_row, config.usage.sheet.as_deref())?;
    let commitment = read(
        &commitment_path,
        config.commitment.header_row,
        config.commitment.sheet.as_deref(),
    )?;

    let dataset = skucalc_pipeline::run(&usage, &commitment, &config)?;
    tracing::info!(
        lines = dataset.len(),
        unpriced = dataset.unpriced_count(),
        "joined {} usage rows against {} commitment rows",
        usage.len(),
        commitment.len()
    );
    Ok(Loaded { config, dataset })
}
