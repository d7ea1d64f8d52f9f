//! Startup failures that end the process

use std::io;

use gentimer_core::ConfigError;
use gentimer_overlay::PlatformError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("timer window: {0}")]
    Platform(#[from] PlatformError),

    #[error("failed to bind control server on {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: io::Error,
    },

    #[error("runtime: {0}")]
    Runtime(#[source] io::Error),
}
