//! Driver error types.

use std::path::PathBuf;

use domain::OrderError;
use fulfillment::PipelineError;
use thiserror::Error;

/// Errors surfaced by the checkout driver.
#[derive(Debug, Error)]
pub enum AppError {
    /// Invalid configuration value.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The order file could not be read.
    #[error("Cannot read order file {path}: {source}")]
    OrderFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The order file or output could not be (de)serialized.
    #[error("Invalid order JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The order failed validation.
    #[error("Invalid order: {0}")]
    Order(#[from] OrderError),

    /// The pipeline rejected the order.
    #[error("Order processing failed: {0}")]
    Pipeline(#[from] PipelineError),
}

impl AppError {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            AppError::Pipeline(_) => 1,
            AppError::Config(_)
            | AppError::OrderFile { .. }
            | AppError::Json(_)
            | AppError::Order(_) => 2,
        }
    }
}
