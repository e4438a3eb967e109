pub mod error;
pub mod heirs;
pub mod pipeline;
pub mod tax;
pub mod types;
pub mod validation;

pub use error::InheritanceTaxError;
pub use types::*;

/// Standard result type for all inheritance-tax operations
pub type InheritanceTaxResult<T> = Result<T, InheritanceTaxError>;
