use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, instrument};

use crate::heirs::family::{FamilyComposition, Heir, HeirClass, Relationship};
use crate::heirs::resolver::determine_legal_heirs;
use crate::tax::brackets::tax_from_table;
use crate::tax::deduction::basic_deduction;
use crate::types::{truncate_to_yen, with_metadata, ComputationOutput, Share, Yen};
use crate::validation::{validate_family_structure, validate_taxable_amount};
use crate::InheritanceTaxResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LegalShareTaxInput {
    /// Aggregate taxable price of everything acquired (課税価格の合計額)
    pub taxable_amount: Yen,
    pub family: FamilyComposition,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegalShareTaxDetail {
    pub heir_id: String,
    pub name: String,
    pub relationship: Relationship,
    pub inheritance_share: Share,
    /// `floor(taxable_amount x share)`, informational
    pub legal_share_amount: Yen,
    /// `floor(taxable_estate x share)`, the amount run through the brackets
    pub taxable_share_amount: Yen,
    pub tax_before_surcharge: Yen,
    /// Not applied at this stage; always 0
    pub surcharge: Yen,
    pub tax_after_surcharge: Yen,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LegalShareTaxOutput {
    pub taxable_amount: Yen,
    pub legal_heirs: Vec<Heir>,
    pub total_heirs_count: usize,
    pub basic_deduction: Yen,
    /// `max(0, taxable_amount - basic_deduction)` (課税遺産総額)
    pub taxable_estate: Yen,
    /// Aggregate inheritance tax (相続税の総額)
    pub total_tax_amount: Yen,
    pub heir_tax_details: Vec<LegalShareTaxDetail>,
}

// ---------------------------------------------------------------------------
// Calculation
// ---------------------------------------------------------------------------

/// Aggregate tax assuming every heir takes exactly their statutory share.
///
/// Each heir's portion of the taxable estate is truncated to whole yen and run
/// through the bracket table on its own; the aggregate is the sum of those
/// per-heir amounts.
pub fn tax_by_legal_share(
    taxable_amount: Yen,
    heirs: &[Heir],
) -> InheritanceTaxResult<LegalShareTaxOutput> {
    let basic_deduction = basic_deduction(heirs);
    let taxable_estate = (taxable_amount - basic_deduction).max(0);

    let mut heir_tax_details: Vec<LegalShareTaxDetail> = Vec::with_capacity(heirs.len());
    let mut total_tax_amount: Yen = 0;

    for heir in heirs {
        let legal_share_amount = truncate_to_yen(
            Decimal::from(taxable_amount) * heir.inheritance_share,
            "legal share amount",
        )?;

        let (taxable_share_amount, tax) = if taxable_estate == 0 {
            (0, 0)
        } else {
            let portion = truncate_to_yen(
                Decimal::from(taxable_estate) * heir.inheritance_share,
                "heir taxable amount",
            )?;
            (portion, tax_from_table(portion)?)
        };
        total_tax_amount += tax;

        heir_tax_details.push(LegalShareTaxDetail {
            heir_id: heir.id.clone(),
            name: heir.name.clone(),
            relationship: heir.relationship,
            inheritance_share: heir.inheritance_share,
            legal_share_amount,
            taxable_share_amount,
            tax_before_surcharge: tax,
            surcharge: 0,
            tax_after_surcharge: tax,
        });
    }

    debug!(
        basic_deduction,
        taxable_estate, total_tax_amount, "legal-share tax computed"
    );

    Ok(LegalShareTaxOutput {
        taxable_amount,
        legal_heirs: heirs.to_vec(),
        total_heirs_count: heirs.len(),
        basic_deduction,
        taxable_estate,
        total_tax_amount,
        heir_tax_details,
    })
}

/// Resolve heirs for the family and compute the statutory-share tax.
#[instrument(skip_all, fields(taxable_amount = input.taxable_amount))]
pub fn calculate_legal_share_tax(
    input: &LegalShareTaxInput,
) -> InheritanceTaxResult<ComputationOutput<LegalShareTaxOutput>> {
    let start = Instant::now();

    let mut report = validate_taxable_amount(input.taxable_amount);
    report.merge(validate_family_structure(&input.family));
    report.into_result()?;

    let heirs = determine_legal_heirs(&input.family)?;
    let output = tax_by_legal_share(input.taxable_amount, &heirs)?;
    let warnings = legal_share_warnings(&output);

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Legal-share inheritance tax: basic deduction, taxable estate split by \
         statutory share, progressive brackets per heir, aggregate total",
        input,
        warnings,
        elapsed,
        output,
    ))
}

pub(crate) fn legal_share_warnings(output: &LegalShareTaxOutput) -> Vec<String> {
    let mut warnings: Vec<String> = Vec::new();
    if output.taxable_estate == 0 {
        warnings.push(format!(
            "Taxable amount {} does not exceed the basic deduction {}; no inheritance tax is due.",
            output.taxable_amount, output.basic_deduction
        ));
    }
    let non_heirs = output
        .legal_heirs
        .iter()
        .filter(|h| h.class == HeirClass::Other)
        .count();
    if non_heirs > 0 {
        warnings.push(format!(
            "{non_heirs} non-heir beneficiaries carry no statutory share; they are taxed only \
             in the actual division, with the 20% surcharge."
        ));
    }
    warnings
}
