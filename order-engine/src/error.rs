//! Error types for order-engine.

use service_core::error::AppError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Validation error on '{field}': {message}")]
    Validation { field: String, message: String },

    #[error("Validation error: {0}")]
    ValidationErrors(#[from] validator::ValidationErrors),

    #[error("Invalid order status: '{0}'")]
    InvalidStatus(String),

    #[error("Unknown garment type: '{0}'")]
    UnknownGarmentType(String),

    #[error("Unknown standard outfit: '{0}'")]
    UnknownOutfit(String),

    #[error("No {collection} entry at index {index}")]
    ItemNotFound {
        collection: &'static str,
        index: usize,
    },

    #[error(transparent)]
    Core(#[from] AppError),
}

impl EngineError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        EngineError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Arithmetic on `field` left the representable `Decimal` range.
    pub fn out_of_range(field: impl Into<String>) -> Self {
        Self::validation(field, "amount is out of range")
    }
}

impl From<EngineError> for AppError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::Core(inner) => inner,
            other @ (EngineError::UnknownGarmentType(_) | EngineError::UnknownOutfit(_)) => {
                AppError::NotFound(anyhow::Error::new(other))
            }
            other => AppError::BadRequest(anyhow::Error::new(other)),
        }
    }
}
