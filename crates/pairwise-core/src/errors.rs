use std::fmt;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct ConfigError(pub String);

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "config error: {}", self.0)
    }
}

impl std::error::Error for ConfigError {}

/// Failures specific to the preference log and its tabular mirror.
#[derive(Debug)]
pub enum StoreError {
    /// A non-blank log line that is not a valid record. `line_no` is 1-based.
    MalformedLine {
        path: PathBuf,
        line_no: usize,
        message: String,
    },
    /// An export was requested for an artifact that has never been written.
    MissingArtifact { path: PathBuf },
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::MalformedLine {
                path,
                line_no,
                message,
            } => write!(
                f,
                "malformed record at {}:{}: {}",
                path.display(),
                line_no,
                message
            ),
            StoreError::MissingArtifact { path } => {
                write!(f, "nothing to export: {} does not exist", path.display())
            }
        }
    }
}

impl std::error::Error for StoreError {}

/// Returns the config error if one is anywhere in the chain.
pub fn as_config_error(err: &anyhow::Error) -> Option<&ConfigError> {
    err.chain().find_map(|e| e.downcast_ref::<ConfigError>())
}
