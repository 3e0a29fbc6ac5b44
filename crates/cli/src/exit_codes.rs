//! CLI Exit Code Registry
//!
//! Single source of truth for every exit code `skucalc` returns. Scripts
//! rely on these, so existing values never change meaning.
//!
//! | Code | Meaning                                                    |
//! |------|------------------------------------------------------------|
//! | 0    | Success (including "no data found" for an empty selection) |
//! | 1    | General error (unspecified)                                |
//! | 2    | Usage error (bad arguments, no input file given)           |
//! | 3    | I/O error (file missing, unreadable, or not writable)      |
//! | 4    | Invalid input table (missing column, bad number, dup SKU)  |
//! | 5    | Invalid config or request file                             |
//! | 6    | Report rendering failed                                    |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant with the next free value
//! 2. Document what triggers it
//! 3. Update the table above

use skucalc_pipeline::PipelineError;
use skucalc_report::ReportError;

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, missing required options.
pub const EXIT_USAGE: u8 = 2;

/// A file could not be read or written.
pub const EXIT_IO: u8 = 3;

/// The usage or commitment table does not have the expected shape.
pub const EXIT_INVALID_INPUT: u8 = 4;

/// Config file or view request failed to parse or validate.
pub const EXIT_INVALID_CONFIG: u8 = 5;

/// The PDF report could not be produced.
pub const EXIT_REPORT: u8 = 6;

/// Map a PipelineError to its exit code.
pub fn pipeline_exit_code(err: &PipelineError) -> u8 {
    if err.is_input_error() {
        return EXIT_INVALID_INPUT;
    }
    match err {
        PipelineError::ConfigParse(_) | PipelineError::ConfigValidation(_) => EXIT_INVALID_CONFIG,
        _ => EXIT_ERROR,
    }
}

/// Map a ReportError to its exit code.
pub fn report_exit_code(err: &ReportError) -> u8 {
    match err {
        ReportError::Io { .. } => EXIT_IO,
        ReportError::InvalidImage { .. } | ReportError::Encode(_) => EXIT_REPORT,
    }
}
