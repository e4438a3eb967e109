//! Input validators.
//!
//! Validators never fail. They collect every violation into a
//! [`ValidationResult`] and leave the decision to the caller; public
//! operations turn a non-empty report into
//! [`InheritanceTaxError::Validation`].

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::InheritanceTaxError;
use crate::heirs::family::{FamilyComposition, Heir};
use crate::tax::division::{DivisionInput, DivisionMode};
use crate::types::Yen;
use crate::InheritanceTaxResult;

/// Machine-readable validation failure codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValidationCode {
    /// A count is negative
    InvalidValue,
    /// Counts contradict each other (more adopted than children, ...)
    InconsistentCount,
    /// No spouse, children, parents or siblings
    NoHeirs,
    NonPositiveAmount,
    /// Per-heir mapping absent for the selected division mode
    Missing,
    MissingHeir,
    InvalidSum,
}

impl ValidationCode {
    pub fn as_str(self) -> &'static str {
        match self {
            ValidationCode::InvalidValue => "INVALID_VALUE",
            ValidationCode::InconsistentCount => "INCONSISTENT_COUNT",
            ValidationCode::NoHeirs => "NO_HEIRS",
            ValidationCode::NonPositiveAmount => "NON_POSITIVE_AMOUNT",
            ValidationCode::Missing => "MISSING",
            ValidationCode::MissingHeir => "MISSING_HEIR",
            ValidationCode::InvalidSum => "INVALID_SUM",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    pub field: String,
    pub code: ValidationCode,
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} [{}]: {}", self.field, self.code.as_str(), self.message)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<ValidationError>,
}

impl Default for ValidationResult {
    fn default() -> Self {
        Self::ok()
    }
}

impl ValidationResult {
    pub fn ok() -> Self {
        ValidationResult {
            is_valid: true,
            errors: Vec::new(),
        }
    }

    pub fn add_error(&mut self, field: &str, code: ValidationCode, message: impl Into<String>) {
        self.errors.push(ValidationError {
            field: field.to_string(),
            code,
            message: message.into(),
        });
        self.is_valid = false;
    }

    pub fn merge(&mut self, other: ValidationResult) {
        self.is_valid &= other.is_valid;
        self.errors.extend(other.errors);
    }

    pub fn has_code(&self, code: ValidationCode) -> bool {
        self.errors.iter().any(|e| e.code == code)
    }

    /// `Ok(())` when valid, otherwise the whole report as an error.
    pub fn into_result(self) -> InheritanceTaxResult<()> {
        if self.is_valid {
            Ok(())
        } else {
            Err(InheritanceTaxError::Validation(self))
        }
    }
}

impl std::fmt::Display for ValidationResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let lines: Vec<String> = self.errors.iter().map(|e| e.to_string()).collect();
        f.write_str(&lines.join("; "))
    }
}

// ---------------------------------------------------------------------------
// Family structure
// ---------------------------------------------------------------------------

/// Check counts for sign and consistency and require at least one heir.
pub fn validate_family_structure(family: &FamilyComposition) -> ValidationResult {
    let mut report = ValidationResult::ok();

    let counts = [
        ("children_count", family.children_count),
        ("adopted_children_count", family.adopted_children_count),
        ("grandchild_adopted_count", family.grandchild_adopted_count),
        ("parents_alive", family.parents_alive),
        ("grandparents_alive", family.grandparents_alive),
        ("siblings_count", family.siblings_count),
        ("half_siblings_count", family.half_siblings_count),
        ("non_heirs_count", family.non_heirs_count),
    ];
    for (field, value) in counts {
        if value < 0 {
            report.add_error(
                field,
                ValidationCode::InvalidValue,
                format!("{field} must be 0 or greater, got {value}"),
            );
        }
    }

    if family.adopted_children_count > family.children_count.max(0) {
        report.add_error(
            "adopted_children_count",
            ValidationCode::InconsistentCount,
            "Adopted children cannot outnumber children",
        );
    }
    if family.grandchild_adopted_count > family.adopted_children_count.max(0) {
        report.add_error(
            "grandchild_adopted_count",
            ValidationCode::InconsistentCount,
            "Grandchildren by adoption cannot outnumber adopted children",
        );
    }
    if family.parents_alive > 2 {
        report.add_error(
            "parents_alive",
            ValidationCode::InconsistentCount,
            format!("At most 2 parents can be alive, got {}", family.parents_alive),
        );
    }

    let total_heirs = i64::from(family.spouse_exists)
        + i64::from(family.children_count)
        + i64::from(family.adopted_children_count)
        + i64::from(family.grandchild_adopted_count)
        + i64::from(family.parents_alive)
        + i64::from(family.siblings_count)
        + i64::from(family.half_siblings_count);
    if total_heirs == 0 {
        report.add_error(
            "family_structure",
            ValidationCode::NoHeirs,
            "No statutory heirs: a spouse, children, parents or siblings are required",
        );
    }

    report
}

/// The aggregate taxable amount must be strictly positive.
pub fn validate_taxable_amount(taxable_amount: Yen) -> ValidationResult {
    let mut report = ValidationResult::ok();
    if taxable_amount <= 0 {
        report.add_error(
            "taxable_amount",
            ValidationCode::NonPositiveAmount,
            format!("Taxable amount must be positive, got {taxable_amount}"),
        );
    }
    report
}

// ---------------------------------------------------------------------------
// Division
// ---------------------------------------------------------------------------

/// Check that every heir has an entry and that the entries add up.
///
/// Amounts must sum to `total_amount` exactly; percentages must sum to 100
/// after rounding to 5 decimal places.
pub fn validate_division_input(input: &DivisionInput, heirs: &[Heir]) -> ValidationResult {
    let mut report = ValidationResult::ok();

    match input.mode {
        DivisionMode::Amount => match input.amounts.as_ref().filter(|m| !m.is_empty()) {
            None => report.add_error(
                "amounts",
                ValidationCode::Missing,
                "Enter the amount each heir acquires",
            ),
            Some(amounts) => {
                for heir in heirs {
                    if !amounts.contains_key(&heir.id) {
                        report.add_error(
                            "amounts",
                            ValidationCode::MissingHeir,
                            format!("No amount for {}", heir.name),
                        );
                    }
                }
                for (heir_id, amount) in amounts.iter().filter(|(_, a)| **a < 0) {
                    report.add_error(
                        "amounts",
                        ValidationCode::InvalidValue,
                        format!("Amount for {heir_id} must be 0 or greater, got {amount}"),
                    );
                }
                let sum: i128 = amounts.values().map(|v| i128::from(*v)).sum();
                if sum != i128::from(input.total_amount) {
                    report.add_error(
                        "amounts",
                        ValidationCode::InvalidSum,
                        format!(
                            "Acquired amounts total {sum}, which does not match \
                             the taxable amount {}",
                            input.total_amount
                        ),
                    );
                }
            }
        },
        DivisionMode::Percentage => {
            match input.percentages.as_ref().filter(|m| !m.is_empty()) {
                None => report.add_error(
                    "percentages",
                    ValidationCode::Missing,
                    "Enter the percentage each heir acquires",
                ),
                Some(percentages) => {
                    for heir in heirs {
                        if !percentages.contains_key(&heir.id) {
                            report.add_error(
                                "percentages",
                                ValidationCode::MissingHeir,
                                format!("No percentage for {}", heir.name),
                            );
                        }
                    }
                    for (heir_id, pct) in percentages.iter().filter(|(_, p)| **p < Decimal::ZERO) {
                        report.add_error(
                            "percentages",
                            ValidationCode::InvalidValue,
                            format!("Percentage for {heir_id} must be 0 or greater, got {pct}"),
                        );
                    }
                    let sum = percentages
                        .values()
                        .try_fold(Decimal::ZERO, |acc, p| acc.checked_add(*p));
                    let is_hundred =
                        sum.is_some_and(|s| s.round_dp(5) == Decimal::ONE_HUNDRED);
                    if !is_hundred {
                        report.add_error(
                            "percentages",
                            ValidationCode::InvalidSum,
                            "Acquired percentages do not add up to 100%",
                        );
                    }
                }
            }
        }
    }

    report
}
