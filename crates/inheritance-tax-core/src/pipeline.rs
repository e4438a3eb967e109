//! Single-request flow: resolve heirs, compute the legal-share tax and, when
//! an allocation is supplied, the actual division, all over one heir set.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Instant;
use tracing::instrument;

use crate::heirs::family::{FamilyComposition, Heir};
use crate::heirs::resolver::determine_legal_heirs;
use crate::tax::deduction::count_heirs_for_deduction;
use crate::tax::division::{
    calculate_actual_division, DivisionInput, DivisionMode, DivisionOutput, RoundingPolicy,
};
use crate::tax::legal_share::{legal_share_warnings, tax_by_legal_share, LegalShareTaxOutput};
use crate::types::{with_metadata, ComputationOutput, Yen};
use crate::validation::{validate_family_structure, validate_taxable_amount};
use crate::InheritanceTaxResult;

/// How the estate was actually divided, keyed by heir id.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AllocationPlan {
    #[serde(default)]
    pub mode: DivisionMode,
    #[serde(default)]
    pub amounts: Option<BTreeMap<String, Yen>>,
    #[serde(default)]
    pub percentages: Option<BTreeMap<String, Decimal>>,
    #[serde(default, alias = "rounding_method")]
    pub rounding: RoundingPolicy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InheritanceTaxInput {
    pub taxable_amount: Yen,
    pub family: FamilyComposition,
    #[serde(default)]
    pub allocation: Option<AllocationPlan>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InheritanceTaxOutput {
    pub heirs: Vec<Heir>,
    pub deduction_heirs_count: u32,
    pub legal_share: LegalShareTaxOutput,
    pub division: Option<DivisionOutput>,
}

/// Run every stage for one request without an intermediate heir round trip.
#[instrument(skip_all, fields(taxable_amount = input.taxable_amount))]
pub fn calculate_inheritance_tax(
    input: &InheritanceTaxInput,
) -> InheritanceTaxResult<ComputationOutput<InheritanceTaxOutput>> {
    let start = Instant::now();

    let mut report = validate_taxable_amount(input.taxable_amount);
    report.merge(validate_family_structure(&input.family));
    report.into_result()?;

    let heirs = determine_legal_heirs(&input.family)?;
    let legal_share = tax_by_legal_share(input.taxable_amount, &heirs)?;
    let mut warnings = legal_share_warnings(&legal_share);

    let division = match &input.allocation {
        Some(plan) => {
            let division_input = DivisionInput {
                mode: plan.mode,
                total_amount: input.taxable_amount,
                heirs: heirs.clone(),
                total_tax_amount: legal_share.total_tax_amount,
                amounts: plan.amounts.clone(),
                percentages: plan.percentages.clone(),
                rounding: plan.rounding,
            };
            let out = calculate_actual_division(&division_input)?;
            warnings.extend(out.warnings);
            Some(out.result)
        }
        None => None,
    };

    let output = InheritanceTaxOutput {
        deduction_heirs_count: count_heirs_for_deduction(&heirs),
        heirs,
        legal_share,
        division,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Inheritance tax pipeline: statutory heirs, legal-share aggregate tax, \
         actual-division apportionment with two-fold addition and spouse reduction",
        &serde_json::json!({
            "taxable_amount": input.taxable_amount,
            "family": input.family,
            "allocation_mode": input.allocation.as_ref().map(|a| a.mode),
        }),
        warnings,
        elapsed,
        output,
    ))
}
