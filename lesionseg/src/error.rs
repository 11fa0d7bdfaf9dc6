use thiserror::Error;

/// The error type for `lesionseg-burn` operations.
///
/// This enum covers every failure the library surfaces, from unreadable
/// dataset files to inconsistent configurations. There is no retry or
/// degraded-mode behavior anywhere: every error propagates to the caller
/// and halts the run.
#[derive(Error, Debug)]
pub enum LesionSegError {
    /// Error for when an image or mask file cannot be read or decoded.
    #[error("Failed to decode {path}: {reason}")]
    Decode {
        /// The path of the offending file.
        path: String,
        /// The underlying decoder message.
        reason: String,
    },

    /// Error for when a tensor buffer cannot take the expected shape, or
    /// two tensors disagree in length after flattening.
    #[error("Shape mismatch: expected {expected}, got {actual}")]
    Shape {
        /// The expected shape or element count.
        expected: String,
        /// The actual shape or element count.
        actual: String,
    },

    /// Error for when the dataset archive cannot be fetched or extracted.
    #[error("Download failed: {reason}")]
    Download {
        /// The reason for the fetch or extraction failure.
        reason: String,
    },

    /// Error for when dataset discovery or loading fails.
    #[error("Dataset error: {message}")]
    Dataset {
        /// The error message.
        message: String,
    },

    /// Error for when a configuration is logically inconsistent.
    #[error("Invalid configuration: {reason}")]
    InvalidConfiguration {
        /// The reason why the configuration is invalid.
        reason: String,
    },
}

/// A specialized `Result` type for `lesionseg-burn` operations.
pub type LesionSegResult<T> = Result<T, LesionSegError>;
