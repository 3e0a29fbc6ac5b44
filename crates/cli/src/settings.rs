//! Config file discovery and command-line overrides.
//!
//! Lookup order: `--config FILE`, `./skucalc.toml`, then
//! `<config dir>/skucalc/config.toml`. No file at all means built-in
//! defaults. Relative input paths inside a config file are resolved against
//! the file's directory.

use std::path::{Path, PathBuf};

use skucalc_pipeline::PipelineConfig;

use crate::{CliError, InputArgs};

pub const CONFIG_FILE_NAME: &str = "skucalc.toml";

fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("skucalc").join("config.toml"))
}

/// The config file to load, if any. An explicit path is returned even when it
/// does not exist so the caller can report it.
pub fn find_config(explicit: Option<&Path>, cwd: &Path) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    let local = cwd.join(CONFIG_FILE_NAME);
    if local.is_file() {
        return Some(local);
    }
    user_config_path().filter(|p| p.is_file())
}

fn resolve_relative(path: &mut Option<PathBuf>, base: &Path) {
    if let Some(p) = path.as_mut() {
        if p.is_relative() {
            *p = base.join(&*p);
        }
    }
}

pub fn load_config_file(path: &Path) -> Result<PipelineConfig, CliError> {
    let text = std::fs::read_to_string(path).map_err(|e| {
        CliError::io(format!("cannot read config {}: {}", path.display(), e))
    })?;
    let mut config = PipelineConfig::from_toml(&text)
        .map_err(|e| CliError::config(format!("{}: {}", path.display(), e)))?;

    let base = path.parent().unwrap_or_else(|| Path::new(""));
    resolve_relative(&mut config.usage.file, base);
    resolve_relative(&mut config.commitment.file, base);
    tracing::debug!(config = %path.display(), "loaded config");
    Ok(config)
}

/// Config from the first file found, or defaults.
pub fn load_config(explicit: Option<&Path>) -> Result<PipelineConfig, CliError> {
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    match find_config(explicit, &cwd) {
        Some(path) => load_config_file(&path),
        None => Ok(PipelineConfig::default()),
    }
}

/// Overlay command-line flags onto the loaded config.
pub fn apply_overrides(config: &mut PipelineConfig, args: &InputArgs) {
    if let Some(ref path) = args.usage {
        config.usage.file = Some(path.clone());
    }
    if let Some(ref path) = args.commitment {
        config.commitment.file = Some(path.clone());
    }
    if let Some(row) = args.usage_header_row {
        config.usage.header_row = row;
    }
    if let Some(row) = args.commitment_header_row {
        config.commitment.header_row = row;
    }
    if let Some(ref sheet) = args.usage_sheet {
        config.usage.sheet = Some(sheet.clone());
    }
    if let Some(ref sheet) = args.commitment_sheet {
        config.commitment.sheet = Some(sheet.clone());
    }
    if let Some(ref column) = args.price_column {
        config.commitment.price_column = column.clone();
    }
}

/// Load, overlay flags, and validate the result.
pub fn resolve(args: &InputArgs) -> Result<PipelineConfig, CliError> {
    let mut config = load_config(args.config.as_deref())?;
    apply_overrides(&mut config, args);
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_path_wins() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE_NAME), "").unwrap();
        let explicit = dir.path().join("other.toml");
        assert_eq!(find_config(Some(&explicit), dir.path()), Some(explicit));
    }

    #[test]
    fn local_file_is_found() {
        let dir = tempfile::tempdir().unwrap();
        let local = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&local, "").unwrap();
        assert_eq!(find_config(None, dir.path()), Some(local));
    }

    #[test]
    fn relative_inputs_follow_the_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(
            &path,
            "[usage]\nfile = \"data/usage.xlsx\"\n\n[commitment]\nfile = \"/abs/commit.xlsx\"\n",
        )
        .unwrap();
        let config = load_config_file(&path).unwrap();
        assert_eq!(config.usage.file, Some(dir.path().join("data/usage.xlsx")));
        assert_eq!(config.commitment.file, Some(PathBuf::from("/abs/commit.xlsx")));
    }

    #[test]
    fn flags_override_config() {
        let mut config = PipelineConfig::default();
        let args = InputArgs {
            usage: Some("u.csv".into()),
            usage_header_row: Some(0),
            price_column: Some("Commitment 3".into()),
            ..InputArgs::default()
        };
        apply_overrides(&mut config, &args);
        assert_eq!(config.usage.file, Some(PathBuf::from("u.csv")));
        assert_eq!(config.usage.header_row, 0);
        assert_eq!(config.commitment.header_row, 0);
        assert_eq!(config.commitment.price_column, "Commitment 3");
    }

    #[test]
    fn invalid_config_maps_to_config_exit_code() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "[report]\ntop_n = 0\n").unwrap();
        let err = load_config_file(&path).unwrap_err();
        assert_eq!(err.code, crate::exit_codes::EXIT_INVALID_CONFIG);
    }

    #[test]
    fn missing_explicit_config_is_io_error() {
        let err = load_config(Some(Path::new("/nonexistent/skucalc.toml"))).unwrap_err();
        assert_eq!(err.code, crate::exit_codes::EXIT_IO);
    }
}
