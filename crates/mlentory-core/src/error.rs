//! Error type for the core crate.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    /// Confidence scores live in `[0, 1]`.
    #[error("confidence must be within [0, 1], got {0}")]
    InvalidConfidence(f64),

    #[error("not an execution folder name: '{0}'")]
    InvalidExecutionFolder(String),
}
