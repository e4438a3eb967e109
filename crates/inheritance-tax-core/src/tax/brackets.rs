use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::InheritanceTaxError;
use crate::types::{truncate_to_yen, with_metadata, ComputationOutput, Rate, Yen};
use crate::InheritanceTaxResult;

/// One row of the quick-calculation table (相続税の速算表).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxBracket {
    pub min_amount: Yen,
    /// Inclusive upper bound; `None` for the open top bracket
    pub max_amount: Option<Yen>,
    pub tax_rate: Rate,
    pub deduction: Yen,
}

impl TaxBracket {
    pub fn contains(&self, amount: Yen) -> bool {
        self.max_amount.map_or(true, |max| amount <= max)
    }
}

/// Progressive rates for deaths on or after 1 January 2015.
pub const TAX_BRACKETS: [TaxBracket; 8] = [
    TaxBracket {
        min_amount: 0,
        max_amount: Some(10_000_000),
        tax_rate: dec!(0.10),
        deduction: 0,
    },
    TaxBracket {
        min_amount: 10_000_001,
        max_amount: Some(30_000_000),
        tax_rate: dec!(0.15),
        deduction: 500_000,
    },
    TaxBracket {
        min_amount: 30_000_001,
        max_amount: Some(50_000_000),
        tax_rate: dec!(0.20),
        deduction: 2_000_000,
    },
    TaxBracket {
        min_amount: 50_000_001,
        max_amount: Some(100_000_000),
        tax_rate: dec!(0.30),
        deduction: 7_000_000,
    },
    TaxBracket {
        min_amount: 100_000_001,
        max_amount: Some(200_000_000),
        tax_rate: dec!(0.40),
        deduction: 17_000_000,
    },
    TaxBracket {
        min_amount: 200_000_001,
        max_amount: Some(300_000_000),
        tax_rate: dec!(0.45),
        deduction: 27_000_000,
    },
    TaxBracket {
        min_amount: 300_000_001,
        max_amount: Some(600_000_000),
        tax_rate: dec!(0.50),
        deduction: 42_000_000,
    },
    TaxBracket {
        min_amount: 600_000_001,
        max_amount: None,
        tax_rate: dec!(0.55),
        deduction: 72_000_000,
    },
];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BracketTableOutput {
    pub effective_from: NaiveDate,
    pub brackets: Vec<TaxBracket>,
}

/// First bracket whose upper bound covers `amount`.
pub fn find_bracket(amount: Yen) -> Option<&'static TaxBracket> {
    TAX_BRACKETS.iter().find(|row| row.contains(amount))
}

/// Tax on one heir's statutory portion: `floor(amount * rate) - deduction`.
///
/// Returns 0 when no row matches, which the open top bracket rules out.
pub fn tax_from_table(amount: Yen) -> InheritanceTaxResult<Yen> {
    match find_bracket(amount) {
        Some(row) => {
            let gross = truncate_to_yen(Decimal::from(amount) * row.tax_rate, "bracket tax")?;
            Ok(gross - row.deduction)
        }
        None => Ok(0),
    }
}

/// The static bracket table.
pub fn tax_bracket_table() -> InheritanceTaxResult<ComputationOutput<BracketTableOutput>> {
    let start = Instant::now();

    let effective_from =
        NaiveDate::from_ymd_opt(2015, 1, 1).ok_or_else(|| InheritanceTaxError::InvalidInput {
            field: "effective_from".into(),
            reason: "invalid table effective date".into(),
        })?;

    let output = BracketTableOutput {
        effective_from,
        brackets: TAX_BRACKETS.to_vec(),
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Inheritance tax quick-calculation table: tax = amount x rate - deduction",
        &serde_json::json!({ "rows": TAX_BRACKETS.len() }),
        Vec::new(),
        elapsed,
        output,
    ))
}
