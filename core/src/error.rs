//! Error types for gentimer core operations

use std::path::PathBuf;
use thiserror::Error;

/// Errors while sending a command to the UI thread
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum DispatchError {
    #[error("UI thread is no longer receiving commands")]
    Disconnected,
}

/// Errors returned by control plane operations
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ControlError {
    #[error("timer window is not ready yet")]
    SurfaceNotReady,

    #[error("timer window has been closed")]
    SurfaceClosed,
}

impl From<DispatchError> for ControlError {
    fn from(err: DispatchError) -> Self {
        match err {
            DispatchError::Disconnected => ControlError::SurfaceClosed,
        }
    }
}

/// Errors during configuration operations
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration from {path}")]
    LoadPath {
        path: PathBuf,
        #[source]
        source: confy::ConfyError,
    },
}
