//! gentimer: an always-on-top elapsed time overlay controlled over HTTP
//!
//! The binary wires together the crates of this workspace:
//! `gentimer-core` (timer state, ticker, control plane), `gentimer-overlay`
//! (window and UI thread) and the HTTP server defined here.

pub mod cli;
pub mod error;
pub mod logging;
pub mod server;

pub use error::AppError;
