use inheritance_tax_core::heirs::{determine_legal_heirs, FamilyComposition, Heir};
use inheritance_tax_core::tax::division::{
    self, DivisionInput, DivisionMode, DivisionOutput, RoundingPolicy,
};
use inheritance_tax_core::tax::legal_share::{self, LegalShareTaxInput};
use inheritance_tax_core::validation::ValidationCode;
use inheritance_tax_core::Yen;
use rust_decimal_macros::dec;
use std::collections::BTreeMap;

// ===========================================================================
// Helpers
// ===========================================================================

fn family(spouse: bool, children: i32, parents: i32, siblings: i32) -> FamilyComposition {
    FamilyComposition {
        spouse_exists: spouse,
        children_count: children,
        parents_alive: parents,
        siblings_count: siblings,
        ..Default::default()
    }
}

/// Resolve heirs, compute the legal-share aggregate, then divide by amounts,
/// echoing the heir list the way a client would.
fn run_division(
    taxable_amount: Yen,
    family: FamilyComposition,
    allocation: &[(&str, Yen)],
) -> (Vec<Heir>, DivisionOutput) {
    let legal = legal_share::calculate_legal_share_tax(&LegalShareTaxInput {
        taxable_amount,
        family,
    })
    .unwrap()
    .result;

    let heirs_json = serde_json::to_string(&legal.legal_heirs).unwrap();
    let heirs: Vec<Heir> = serde_json::from_str(&heirs_json).unwrap();

    let input = DivisionInput {
        mode: DivisionMode::Amount,
        total_amount: taxable_amount,
        heirs: heirs.clone(),
        total_tax_amount: legal.total_tax_amount,
        amounts: Some(allocation.iter().map(|(k, v)| (k.to_string(), *v)).collect()),
        percentages: None,
        rounding: RoundingPolicy::Round,
    };
    let out = division::calculate_actual_division(&input).unwrap().result;
    (heirs, out)
}

fn final_tax(out: &DivisionOutput, heir_id: &str) -> Yen {
    out.heir_details
        .iter()
        .find(|d| d.heir_id == heir_id)
        .unwrap_or_else(|| panic!("{heir_id} missing from result"))
        .final_tax_amount
}

fn assert_close(expected: Yen, actual: Yen, what: &str) {
    assert!(
        (expected - actual).abs() <= 1,
        "{what}: expected {expected} (+/-1), got {actual}"
    );
}

// ===========================================================================
// Worked scenarios
// ===========================================================================

#[test]
fn test_330m_spouse_200m_three_children() {
    let (_, out) = run_division(
        330_000_000,
        family(true, 3, 0, 0),
        &[
            ("spouse", 200_000_000),
            ("child_1", 43_333_333),
            ("child_2", 43_333_333),
            ("child_3", 43_333_334),
        ],
    );
    assert_eq!(out.statutory_total_tax, 59_800_000);
    assert_close(6_342_424, final_tax(&out, "spouse"), "spouse");
    for child in ["child_1", "child_2", "child_3"] {
        assert_close(7_852_525, final_tax(&out, child), child);
    }
    assert_close(29_899_999, out.total_tax_amount, "total");
}

#[test]
fn test_400m_spouse_300m_two_children() {
    let (_, out) = run_division(
        400_000_000,
        family(true, 2, 0, 0),
        &[
            ("spouse", 300_000_000),
            ("child_1", 50_000_000),
            ("child_2", 50_000_000),
        ],
    );
    assert_close(23_050_000, final_tax(&out, "spouse"), "spouse");
    assert_close(11_525_000, final_tax(&out, "child_1"), "child_1");
    assert_close(46_100_000, out.total_tax_amount, "total");
}

#[test]
fn test_200m_spouse_at_160m_floor() {
    let (_, out) = run_division(
        200_000_000,
        family(true, 2, 0, 0),
        &[
            ("spouse", 160_000_000),
            ("child_1", 20_000_000),
            ("child_2", 20_000_000),
        ],
    );
    assert_eq!(final_tax(&out, "spouse"), 0);
    assert_close(2_700_000, final_tax(&out, "child_1"), "child_1");
    assert_close(5_400_000, out.total_tax_amount, "total");
}

#[test]
fn test_spouse_takes_everything() {
    let (_, out) = run_division(
        100_000_000,
        family(true, 1, 0, 0),
        &[("spouse", 100_000_000), ("child_1", 0)],
    );
    assert_eq!(final_tax(&out, "spouse"), 0);
    assert_eq!(final_tax(&out, "child_1"), 0);
    assert_eq!(out.total_tax_amount, 0);
}

#[test]
fn test_500m_spouse_160m_three_children() {
    let (_, out) = run_division(
        500_000_000,
        family(true, 3, 0, 0),
        &[
            ("spouse", 160_000_000),
            ("child_1", 113_333_333),
            ("child_2", 113_333_333),
            ("child_3", 113_333_334),
        ],
    );
    assert_eq!(final_tax(&out, "spouse"), 0);
    assert_close(27_029_999, final_tax(&out, "child_1"), "child_1");
    assert_close(81_089_997, out.total_tax_amount, "total");
}

#[test]
fn test_spouse_and_parent() {
    let (_, out) = run_division(
        250_000_000,
        family(true, 0, 1, 0),
        &[("spouse", 200_000_000), ("parent_1", 50_000_000)],
    );
    assert_close(6_968_889, final_tax(&out, "spouse"), "spouse");
    assert_close(10_453_333, final_tax(&out, "parent_1"), "parent_1");
    assert_close(17_422_222, out.total_tax_amount, "total");
}

#[test]
fn test_spouse_and_siblings_with_surcharge() {
    let (_, out) = run_division(
        180_000_000,
        family(true, 0, 0, 2),
        &[
            ("spouse", 150_000_000),
            ("sibling_1", 15_000_000),
            ("sibling_2", 15_000_000),
        ],
    );
    assert_eq!(final_tax(&out, "spouse"), 0);
    assert_close(2_664_999, final_tax(&out, "sibling_1"), "sibling_1");
    let sibling = &out.heir_details[1];
    assert_eq!(sibling.surcharge, sibling.tax_amount / 5);
    assert_close(5_329_998, out.total_tax_amount, "total");
}

#[test]
fn test_spouse_reduction_uses_statutory_share_above_floor() {
    // Statutory share 1/2 of 400M = 200M exceeds the 160M floor.
    let (_, out) = run_division(
        400_000_000,
        family(true, 1, 0, 0),
        &[("spouse", 200_000_000), ("child_1", 200_000_000)],
    );
    let spouse = &out.heir_details[0];
    assert!(spouse.tax_amount > 0);
    assert_eq!(spouse.final_tax_amount, 0);
    assert_eq!(spouse.spouse_reduction, spouse.tax_amount);
}

#[test]
fn test_spouse_above_limit_pays_tax() {
    let (_, out) = run_division(
        400_000_000,
        family(true, 1, 0, 0),
        &[("spouse", 300_000_000), ("child_1", 100_000_000)],
    );
    let spouse = &out.heir_details[0];
    assert!(spouse.final_tax_amount > 0);
    assert!(spouse.spouse_reduction < spouse.tax_amount);
}

#[test]
fn test_non_heir_beneficiary_surcharged() {
    let family = FamilyComposition {
        spouse_exists: true,
        children_count: 1,
        non_heirs_count: 1,
        ..Default::default()
    };
    let (heirs, out) = run_division(
        300_000_000,
        family,
        &[
            ("spouse", 100_000_000),
            ("child_1", 100_000_000),
            ("non_heir_1", 100_000_000),
        ],
    );
    assert_eq!(heirs.len(), 3);
    let child = &out.heir_details[1];
    let other = &out.heir_details[2];
    assert_eq!(child.tax_amount, other.tax_amount);
    assert_eq!(other.surcharge, other.tax_amount * 2 / 10);
    assert_eq!(other.final_tax_amount, other.tax_amount + other.surcharge);
}

// ===========================================================================
// Validation at the division boundary
// ===========================================================================

#[test]
fn test_amount_sum_mismatch_blocks_calculation() {
    let heirs = determine_legal_heirs(&family(true, 2, 0, 0)).unwrap();
    let input = DivisionInput {
        mode: DivisionMode::Amount,
        total_amount: 100_000_000,
        heirs,
        total_tax_amount: 6_300_000,
        amounts: Some(BTreeMap::from([
            ("spouse".to_string(), 50_000_000),
            ("child_1".to_string(), 25_000_000),
            ("child_2".to_string(), 25_000_001),
        ])),
        percentages: None,
        rounding: RoundingPolicy::Round,
    };
    let err = division::calculate_actual_division(&input).unwrap_err();
    let report = err.validation().expect("validation error");
    assert!(!report.is_valid);
    assert_eq!(report.errors.len(), 1);
    assert_eq!(report.errors[0].code, ValidationCode::InvalidSum);
    assert_eq!(report.errors[0].field, "amounts");
}

#[test]
fn test_percentage_mode_end_to_end() {
    let heirs = determine_legal_heirs(&family(true, 2, 0, 0)).unwrap();
    let input = DivisionInput {
        mode: DivisionMode::Percentage,
        total_amount: 400_000_000,
        heirs,
        total_tax_amount: 92_200_000,
        amounts: None,
        percentages: Some(BTreeMap::from([
            ("spouse".to_string(), dec!(75)),
            ("child_1".to_string(), dec!(12.5)),
            ("child_2".to_string(), dec!(12.5)),
        ])),
        rounding: RoundingPolicy::Floor,
    };
    let out = division::calculate_actual_division(&input).unwrap().result;
    assert_eq!(final_tax(&out, "spouse"), 23_050_000);
    assert_eq!(out.total_tax_amount, 46_100_000);
}

#[test]
fn test_percentage_missing_heir_reported() {
    let heirs = determine_legal_heirs(&family(true, 2, 0, 0)).unwrap();
    let input = DivisionInput {
        mode: DivisionMode::Percentage,
        total_amount: 400_000_000,
        heirs,
        total_tax_amount: 92_200_000,
        amounts: None,
        percentages: Some(BTreeMap::from([
            ("spouse".to_string(), dec!(50)),
            ("child_1".to_string(), dec!(50)),
        ])),
        rounding: RoundingPolicy::Round,
    };
    let err = division::calculate_actual_division(&input).unwrap_err();
    let report = err.validation().unwrap();
    assert_eq!(report.errors.len(), 1);
    assert_eq!(report.errors[0].code, ValidationCode::MissingHeir);
    assert!(report.errors[0].message.contains("Child 2"));
}
