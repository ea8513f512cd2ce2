use std::path::PathBuf;

use thiserror::Error;

use crate::embedding::EmbeddingError;

/// Run-level failure of a mapping run. Any of these aborts the run before an
/// output document is written.
///
/// Reasoning failures never surface here; they degrade a single match
/// (see `mapping::reasoning`).
#[derive(Debug, Error)]
pub enum MappingError {
    #[error("Required input file not found: {}", .path.display())]
    MissingInput { path: PathBuf },

    #[error("Could not read input file {}: {source}", .path.display())]
    ReadInput {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Input file {} is not valid: {source}", .path.display())]
    InvalidInput {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Embedding service failed: {0}")]
    Embedding(#[from] EmbeddingError),

    #[error("Could not serialize mappings: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("Could not write mappings to {}: {source}", .path.display())]
    OutputWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl MappingError {
    /// Maps an I/O error on an input file to `MissingInput` or `ReadInput`.
    pub fn from_read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            MappingError::MissingInput { path }
        } else {
            MappingError::ReadInput { path, source }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_becomes_missing_input() {
        let err = MappingError::from_read(
            "data/job_data.json",
            std::io::Error::from(std::io::ErrorKind::NotFound),
        );
        assert!(matches!(err, MappingError::MissingInput { .. }));
        assert_eq!(
            err.to_string(),
            "Required input file not found: data/job_data.json"
        );
    }

    #[test]
    fn test_other_io_errors_become_read_input() {
        let err = MappingError::from_read(
            "data/job_data.json",
            std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        );
        assert!(matches!(err, MappingError::ReadInput { .. }));
    }
}
