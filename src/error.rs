//! Error types for the changepoint-epochs library.

use thiserror::Error;

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, EpochError>;

/// Errors that can occur while building signals, detecting peaks or
/// segmenting records into epochs.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EpochError {
    /// Input data is empty.
    #[error("empty input data")]
    EmptyData,

    /// Invalid parameter value.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Dimension mismatch between data structures.
    #[error("dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    /// Index out of bounds.
    #[error("index out of bounds: {index} (size: {size})")]
    IndexOutOfBounds { index: usize, size: usize },

    /// A detection probability outside [0, 1] or not finite.
    #[error("invalid probability: {value} is not in [0, 1]")]
    InvalidProbability { value: f64 },

    /// Date conversion or time grid error.
    #[error("invalid date: {0}")]
    InvalidDate(String),

    /// A record key appears more than once.
    #[error("duplicate record key: {0}")]
    DuplicateKey(String),

    /// A post-condition of a pipeline stage does not hold.
    #[error("invariant violated: {0}")]
    InvariantViolation(String),

    /// Reading or writing a dataset failed.
    #[error("storage error: {0}")]
    Storage(String),

    /// A dataset or configuration could not be (de)serialized.
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for EpochError {
    fn from(err: serde_json::Error) -> Self {
        EpochError::Serialization(err.to_string())
    }
}

impl From<std::io::Error> for EpochError {
    fn from(err: std::io::Error) -> Self {
        EpochError::Storage(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages_are_descriptive() {
        let err = EpochError::EmptyData;
        assert_eq!(err.to_string(), "empty input data");

        let err = EpochError::InvalidParameter("window must be positive".to_string());
        assert_eq!(
            err.to_string(),
            "invalid parameter: window must be positive"
        );

        let err = EpochError::DimensionMismatch {
            expected: 3,
            got: 2,
        };
        assert_eq!(err.to_string(), "dimension mismatch: expected 3, got 2");

        let err = EpochError::InvalidProbability { value: 1.5 };
        assert_eq!(err.to_string(), "invalid probability: 1.5 is not in [0, 1]");

        let err = EpochError::DuplicateKey("post-17".to_string());
        assert_eq!(err.to_string(), "duplicate record key: post-17");

        let err = EpochError::InvariantViolation("epoch 2 has 1 posts".to_string());
        assert_eq!(err.to_string(), "invariant violated: epoch 2 has 1 posts");
    }

    #[test]
    fn errors_are_clonable_and_comparable() {
        let err1 = EpochError::EmptyData;
        let err2 = err1.clone();
        assert_eq!(err1, err2);
    }

    #[test]
    fn io_errors_map_to_storage() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing.json");
        let err: EpochError = io.into();
        assert!(matches!(err, EpochError::Storage(msg) if msg.contains("missing.json")));
    }
}
