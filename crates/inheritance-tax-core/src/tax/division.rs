use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::time::Instant;
use tracing::{debug, instrument};

use crate::error::InheritanceTaxError;
use crate::heirs::family::{spouse_share, Heir, Relationship};
use crate::tax::deduction::basic_deduction;
use crate::types::{truncate_to_yen, with_metadata, ComputationOutput, Rate, Share, Yen};
use crate::validation::validate_division_input;
use crate::InheritanceTaxResult;

/// Two-fold addition (相続税額の2割加算).
pub const SURCHARGE_RATE: Rate = dec!(0.2);

/// Spouse reduction floor: 160,000,000 yen (配偶者の税額軽減).
pub const SPOUSE_REDUCTION_FLOOR: Yen = 160_000_000;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DivisionMode {
    /// Per-heir yen amounts
    #[default]
    Amount,
    /// Per-heir percentages of the total (0-100)
    Percentage,
}

/// How a percentage of the total becomes whole yen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundingPolicy {
    /// Nearest yen, ties to even
    #[default]
    Round,
    Floor,
    Ceil,
}

impl RoundingPolicy {
    pub fn apply(self, value: Decimal) -> Decimal {
        match self {
            RoundingPolicy::Round => {
                value.round_dp_with_strategy(0, RoundingStrategy::MidpointNearestEven)
            }
            RoundingPolicy::Floor => value.floor(),
            RoundingPolicy::Ceil => value.ceil(),
        }
    }
}

impl std::str::FromStr for RoundingPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "round" => Ok(RoundingPolicy::Round),
            "floor" => Ok(RoundingPolicy::Floor),
            "ceil" => Ok(RoundingPolicy::Ceil),
            other => Err(format!("unknown rounding policy '{other}' (round, floor, ceil)")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DivisionInput {
    #[serde(default)]
    pub mode: DivisionMode,
    /// Aggregate taxable amount (課税価格の合計額)
    pub total_amount: Yen,
    /// Heir list as returned by resolution
    pub heirs: Vec<Heir>,
    /// Aggregate tax from the legal-share stage
    pub total_tax_amount: Yen,
    #[serde(default)]
    pub amounts: Option<BTreeMap<String, Yen>>,
    #[serde(default)]
    pub percentages: Option<BTreeMap<String, Decimal>>,
    #[serde(default, alias = "rounding_method")]
    pub rounding: RoundingPolicy,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DivisionTaxDetail {
    pub heir_id: String,
    pub name: String,
    pub relationship: Relationship,
    /// Amount actually acquired
    pub inheritance_amount: Yen,
    pub actual_share: Share,
    /// Aggregate tax apportioned by actual share
    pub tax_amount: Yen,
    /// Two-fold addition component (0 when not liable)
    pub surcharge: Yen,
    /// Spouse reduction component (0 for everyone else)
    pub spouse_reduction: Yen,
    /// `surcharge - spouse_reduction`
    pub surcharge_deduction_amount: Yen,
    pub final_tax_amount: Yen,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DivisionOutput {
    pub taxable_amount: Yen,
    pub basic_deduction: Yen,
    pub taxable_estate: Yen,
    /// Aggregate tax carried in from the legal-share stage
    pub statutory_total_tax: Yen,
    /// Sum of the per-heir final amounts
    pub total_tax_amount: Yen,
    pub heir_details: Vec<DivisionTaxDetail>,
}

// ---------------------------------------------------------------------------
// Percentage conversion
// ---------------------------------------------------------------------------

/// Convert per-heir percentages of `total_amount` to yen.
///
/// Each heir is rounded on its own; the residual against `total_amount` is
/// left as is.
pub fn convert_percentages(
    percentages: &BTreeMap<String, Decimal>,
    total_amount: Yen,
    rounding: RoundingPolicy,
) -> InheritanceTaxResult<BTreeMap<String, Yen>> {
    let total = Decimal::from(total_amount);
    let mut amounts = BTreeMap::new();
    for (heir_id, pct) in percentages {
        let amount = (*pct / Decimal::ONE_HUNDRED)
            .checked_mul(total)
            .ok_or_else(|| InheritanceTaxError::Overflow {
                context: format!("percentage conversion for {heir_id}"),
            })?;
        let rounded = truncate_to_yen(rounding.apply(amount), "percentage conversion")?;
        amounts.insert(heir_id.clone(), rounded);
    }
    Ok(amounts)
}

// ---------------------------------------------------------------------------
// Actual division
// ---------------------------------------------------------------------------

/// Re-apportion the statutory aggregate tax by what each heir actually takes.
///
/// Every heir first receives `floor(aggregate x actual_share)`. Surcharge-liable
/// heirs then add 20% of that. The spouse subtracts the reduction, bounded by
/// the apportioned tax. Final amounts never go below zero and the reported
/// total is their sum, which may differ slightly from the statutory aggregate.
#[instrument(skip_all, fields(mode = ?input.mode, heirs = input.heirs.len()))]
pub fn calculate_actual_division(
    input: &DivisionInput,
) -> InheritanceTaxResult<ComputationOutput<DivisionOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    validate_division_input(input, &input.heirs).into_result()?;
    check_heir_set(input)?;

    let actual_amounts = resolve_amounts(input)?;
    let resolved_sum = sum_yen(actual_amounts.values().copied(), "acquired amounts")?;
    if input.mode == DivisionMode::Percentage && resolved_sum != input.total_amount {
        warnings.push(format!(
            "Percentage rounding ({:?}) gives {} in total, {} yen from the taxable amount {}.",
            input.rounding,
            resolved_sum,
            resolved_sum - input.total_amount,
            input.total_amount
        ));
    }

    let output = divide(input, &actual_amounts)?;

    if output.total_tax_amount != output.statutory_total_tax {
        warnings.push(format!(
            "Sum of final taxes {} differs from the statutory aggregate {} after surcharge, \
             spouse reduction and per-heir truncation.",
            output.total_tax_amount, output.statutory_total_tax
        ));
    }
    if let Some(spouse) = output
        .heir_details
        .iter()
        .find(|d| d.relationship == Relationship::Spouse)
    {
        if spouse.tax_amount > 0 && spouse.final_tax_amount == 0 {
            warnings.push("Spouse reduction eliminates the spouse's tax entirely.".to_string());
        }
    }

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Actual-division apportionment: aggregate tax by actual share, 20% two-fold \
         addition, spouse reduction up to max(160M yen, statutory share), floored at zero",
        &serde_json::json!({
            "mode": input.mode,
            "rounding": input.rounding,
            "total_amount": input.total_amount,
            "total_tax_amount": input.total_tax_amount,
            "heirs": input.heirs.len(),
        }),
        warnings,
        elapsed,
        output,
    ))
}

/// The arithmetic of the division stage over already-resolved amounts.
pub fn divide(
    input: &DivisionInput,
    actual_amounts: &BTreeMap<String, Yen>,
) -> InheritanceTaxResult<DivisionOutput> {
    let heirs = &input.heirs;
    let aggregate = Decimal::from(input.total_tax_amount);

    let mut total_actual = sum_yen(actual_amounts.values().copied(), "acquired amounts")?;
    if total_actual == 0 {
        total_actual = 1;
    }
    let total_actual = Decimal::from(total_actual);

    let spouse_statutory_share = spouse_share(heirs);
    let reduction_limit = Decimal::from(SPOUSE_REDUCTION_FLOOR)
        .max(Decimal::from(input.total_amount) * spouse_statutory_share);
    let reduction_denominator = if input.total_amount > 0 {
        Decimal::from(input.total_amount)
    } else {
        Decimal::ONE
    };

    let mut heir_details: Vec<DivisionTaxDetail> = Vec::with_capacity(heirs.len());
    let mut total_tax_amount: Yen = 0;

    for heir in heirs {
        let actual_amount = actual_amounts.get(&heir.id).copied().unwrap_or(0);
        let actual_share = Decimal::from(actual_amount) / total_actual;
        let tax_amount = truncate_to_yen(aggregate * actual_share, "apportioned tax")?;

        let surcharge = if heir.surcharge_liable {
            truncate_to_yen(Decimal::from(tax_amount) * SURCHARGE_RATE, "two-fold addition")?
        } else {
            0
        };

        let spouse_reduction = if heir.is_spouse() {
            let reduction_base = Decimal::from(actual_amount).min(reduction_limit);
            let max_reduction = truncate_to_yen(
                aggregate * (reduction_base / reduction_denominator),
                "spouse reduction",
            )?;
            tax_amount.min(max_reduction)
        } else {
            0
        };

        let adjustment = surcharge - spouse_reduction;
        let final_tax_amount = tax_amount
            .checked_add(adjustment)
            .ok_or_else(|| overflow("final tax"))?
            .max(0);
        total_tax_amount = total_tax_amount
            .checked_add(final_tax_amount)
            .ok_or_else(|| overflow("total final tax"))?;

        debug!(
            heir = %heir.id,
            actual_amount, tax_amount, adjustment, final_tax_amount, "heir division tax"
        );

        heir_details.push(DivisionTaxDetail {
            heir_id: heir.id.clone(),
            name: heir.name.clone(),
            relationship: heir.relationship,
            inheritance_amount: actual_amount,
            actual_share,
            tax_amount,
            surcharge,
            spouse_reduction,
            surcharge_deduction_amount: adjustment,
            final_tax_amount,
        });
    }

    let basic_deduction = basic_deduction(heirs);
    Ok(DivisionOutput {
        taxable_amount: input.total_amount,
        basic_deduction,
        taxable_estate: (input.total_amount - basic_deduction).max(0),
        statutory_total_tax: input.total_tax_amount,
        total_tax_amount,
        heir_details,
    })
}

/// Sum whole-yen amounts, failing instead of wrapping.
fn sum_yen(values: impl IntoIterator<Item = Yen>, context: &str) -> InheritanceTaxResult<Yen> {
    values
        .into_iter()
        .try_fold(0 as Yen, |acc, v| acc.checked_add(v))
        .ok_or_else(|| overflow(context))
}

fn overflow(context: &str) -> InheritanceTaxError {
    InheritanceTaxError::Overflow {
        context: context.to_string(),
    }
}

fn resolve_amounts(input: &DivisionInput) -> InheritanceTaxResult<BTreeMap<String, Yen>> {
    let missing = |field: &str| InheritanceTaxError::InvalidInput {
        field: field.to_string(),
        reason: format!("required for {:?} mode", input.mode),
    };
    match input.mode {
        DivisionMode::Amount => input.amounts.clone().ok_or_else(|| missing("amounts")),
        DivisionMode::Percentage => {
            let percentages = input.percentages.as_ref().ok_or_else(|| missing("percentages"))?;
            convert_percentages(percentages, input.total_amount, input.rounding)
        }
    }
}

/// Heir ids must be unique and the carried-in aggregate non-negative.
fn check_heir_set(input: &DivisionInput) -> InheritanceTaxResult<()> {
    let mut seen: HashSet<&str> = HashSet::new();
    for heir in &input.heirs {
        if !seen.insert(heir.id.as_str()) {
            return Err(InheritanceTaxError::InvalidInput {
                field: "heirs".into(),
                reason: format!("duplicate heir id '{}'", heir.id),
            });
        }
    }
    if input.total_tax_amount < 0 {
        return Err(InheritanceTaxError::InvalidInput {
            field: "total_tax_amount".into(),
            reason: "aggregate tax cannot be negative".into(),
        });
    }
    Ok(())
}
