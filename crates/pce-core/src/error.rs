//! Error types for the frontend core

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for the frontend core
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Load error: {0}")]
    Load(#[from] LoadError),

    #[error("State error: {0}")]
    State(#[from] StateError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config error: {0}")]
    Config(String),
}

/// Content-load failures
///
/// All variants are recoverable: the load is aborted, any partially
/// opened disc interface is released, and the error propagates to the
/// host. No retry is attempted internally.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Content has no containing directory")]
    MissingDirectory,

    #[error("No system card set (looked at {0})")]
    MissingFirmware(PathBuf),

    #[error("Content exceeds the maximum image size of {limit} bytes")]
    ContentTooLarge { limit: usize },

    #[error("Failed to read content: {0}")]
    ReadFailure(String),

    #[error("Failed to open disc image: {0}")]
    DiscOpenFailure(String),
}

/// Save-state persistence failures
///
/// Reported, not retried; the active session survives either variant.
#[derive(Error, Debug)]
pub enum StateError {
    #[error("Failed to write state to {path}")]
    StateWriteFailed { path: PathBuf },

    #[error("Failed to read state from {path}")]
    StateReadFailed { path: PathBuf },
}

/// Result type alias for frontend-core operations
pub type Result<T> = std::result::Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = LoadError::ContentTooLarge { limit: 0x30_0000 };
        assert_eq!(
            format!("{}", err),
            "Content exceeds the maximum image size of 3145728 bytes"
        );

        let err = LoadError::MissingFirmware(PathBuf::from("/bios/syscard3.pce"));
        assert_eq!(
            format!("{}", err),
            "No system card set (looked at /bios/syscard3.pce)"
        );
    }

    #[test]
    fn test_error_conversion() {
        let load_err = LoadError::MissingDirectory;
        let core_err: CoreError = load_err.into();
        assert!(matches!(core_err, CoreError::Load(_)));

        let state_err = StateError::StateReadFailed {
            path: PathBuf::from("save.q0"),
        };
        let core_err: CoreError = state_err.into();
        assert!(matches!(core_err, CoreError::State(_)));
    }
}
