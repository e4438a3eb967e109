use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::InheritanceTaxError;
use crate::InheritanceTaxResult;

/// Monetary amounts in whole yen. Yen has no minor unit.
pub type Yen = i64;

/// Fractions of an estate (0.5 = one half). Never percentages.
pub type Share = Decimal;

/// Marginal rates expressed as decimals (0.30 = 30%).
pub type Rate = Decimal;

/// Standard computation output envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

/// Metadata for every computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub computation_time_us: u64,
    pub precision: String,
}

/// Helper to wrap computation results with metadata
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: elapsed_us,
            precision: "rust_decimal_128bit".to_string(),
        },
    }
}

/// Truncate toward zero and narrow to whole yen.
pub fn truncate_to_yen(value: Decimal, context: &str) -> InheritanceTaxResult<Yen> {
    value
        .trunc()
        .to_i64()
        .ok_or_else(|| InheritanceTaxError::Overflow {
            context: context.to_string(),
        })
}
