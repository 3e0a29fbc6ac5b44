use std::fmt;

#[derive(Debug)]
pub enum ReportError {
    /// Chart buffer does not match its declared dimensions.
    InvalidImage { name: String, reason: String },
    /// Stream compression failed.
    Encode(String),
    /// Writing the finished document failed.
    Io { path: String, source: std::io::Error },
}

impl fmt::Display for ReportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidImage { name, reason } => write!(f, "invalid chart image '{name}': {reason}"),
            Self::Encode(msg) => write!(f, "cannot encode report: {msg}"),
            Self::Io { path, source } => write!(f, "cannot write {path}: {source}"),
        }
    }
}

impl std::error::Error for ReportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}
