use std::path::PathBuf;
use thiserror::Error;

/// Custom error types for the fixture filler
#[derive(Debug, Error)]
pub enum FillerError {
    #[error("Discovery error in {path}: {message}")]
    DiscoveryError { path: PathBuf, message: String },

    #[error("Unit {address} is defined twice in package {package}")]
    DuplicateUnit { package: String, address: String },

    #[error("Failed to parse filler module {path}: {source}")]
    ManifestError {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Error in external tool {tool}: {message}")]
    ExternalToolError { tool: String, message: String },

    #[error("Execution of {address} failed: {message}")]
    ExecutionFailure { address: String, message: String },

    #[error("I/O error on {path}: {source}")]
    IoFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize fixture: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl FillerError {
    /// Wrap an I/O error with the path it happened on
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        FillerError::IoFailure { path: path.into(), source }
    }

    /// Attach a unit address to a failure raised while executing that unit
    pub fn for_unit(self, address: &str) -> Self {
        match self {
            FillerError::ExecutionFailure { .. } => self,
            other =>
                FillerError::ExecutionFailure {
                    address: address.to_string(),
                    message: other.to_string(),
                },
        }
    }

    /// Whether this error aborts the whole run rather than a single unit
    pub fn is_run_fatal(&self) -> bool {
        matches!(
            self,
            FillerError::DiscoveryError { .. } |
                FillerError::DuplicateUnit { .. } |
                FillerError::ManifestError { .. } |
                FillerError::InvalidInput(_)
        )
    }
}

/// Result type specific to filler operations
pub type FillerResult<T> = Result<T, FillerError>;
