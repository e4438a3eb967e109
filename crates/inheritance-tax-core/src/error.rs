use thiserror::Error;

use crate::validation::ValidationResult;

#[derive(Debug, Error)]
pub enum InheritanceTaxError {
    #[error("Invalid input: {field}: {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Validation failed: {0}")]
    Validation(ValidationResult),

    #[error("Arithmetic overflow in {context}")]
    Overflow { context: String },

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl InheritanceTaxError {
    /// Validation report carried by this error, if any.
    pub fn validation(&self) -> Option<&ValidationResult> {
        match self {
            InheritanceTaxError::Validation(report) => Some(report),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for InheritanceTaxError {
    fn from(e: serde_json::Error) -> Self {
        InheritanceTaxError::SerializationError(e.to_string())
    }
}
