use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, instrument};

use crate::error::InheritanceTaxError;
use crate::heirs::family::{FamilyComposition, Heir, Relationship};
use crate::tax::deduction::{basic_deduction, count_heirs_for_deduction};
use crate::types::{with_metadata, ComputationOutput, Share, Yen};
use crate::validation::validate_family_structure;
use crate::InheritanceTaxResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeirResolutionOutput {
    pub legal_heirs: Vec<Heir>,
    pub total_heirs_count: usize,
    /// Heirs counted for the basic deduction after the adopted-child cap
    pub deduction_heirs_count: u32,
    pub basic_deduction: Yen,
}

// ---------------------------------------------------------------------------
// Resolution
// ---------------------------------------------------------------------------

/// Determine statutory heirs and their shares.
///
/// The spouse always inherits alongside the highest-priority class present:
/// children, then parents, then siblings. Lower classes receive nothing once a
/// higher one is non-empty. Non-heir beneficiaries are appended with a zero
/// share and are always surcharge-liable.
///
/// Expects a composition that passed [`validate_family_structure`]; a
/// negative count is reported as `InvalidInput`.
pub fn determine_legal_heirs(family: &FamilyComposition) -> InheritanceTaxResult<Vec<Heir>> {
    let children = count(family.children_count, "children_count")?;
    let adopted = count(family.adopted_children_count, "adopted_children_count")?;
    let grandchild_adopted = count(family.grandchild_adopted_count, "grandchild_adopted_count")?;
    let parents = count(family.parents_alive, "parents_alive")?;
    let siblings = count(family.siblings_count, "siblings_count")?;
    let half_siblings = count(family.half_siblings_count, "half_siblings_count")?;
    let non_heirs = count(family.non_heirs_count, "non_heirs_count")?;

    let mut heirs: Vec<Heir> = Vec::new();
    let mut others_share = Decimal::ONE;

    if family.spouse_exists {
        let spouse_share = spouse_statutory_share(family);
        others_share = Decimal::ONE - spouse_share;
        heirs.push(Heir::new("spouse", Relationship::Spouse, spouse_share));
    }

    if children > 0 {
        let individual = others_share / Decimal::from(children);
        for i in 0..children {
            let is_adopted = i < adopted;
            let is_grandchild_adopted = is_adopted && i < grandchild_adopted;
            let relationship = if is_grandchild_adopted {
                Relationship::GrandchildAdopted
            } else if is_adopted {
                Relationship::AdoptedChild
            } else {
                Relationship::Child
            };
            heirs.push(
                Heir::new(format!("child_{}", i + 1), relationship, individual)
                    .numbered(i + 1)
                    .with_surcharge(is_grandchild_adopted)
                    .adopted(is_adopted),
            );
        }
    } else if parents > 0 {
        let individual = others_share / Decimal::from(parents);
        for i in 0..parents {
            heirs.push(
                Heir::new(format!("parent_{}", i + 1), Relationship::Parent, individual)
                    .numbered(i + 1),
            );
        }
    } else if siblings > 0 || half_siblings > 0 {
        let (full_share, half_share) = sibling_shares(others_share, siblings, half_siblings);
        for i in 0..siblings {
            heirs.push(
                Heir::new(format!("sibling_{}", i + 1), Relationship::Sibling, full_share)
                    .numbered(i + 1)
                    .with_surcharge(true),
            );
        }
        for i in 0..half_siblings {
            heirs.push(
                Heir::new(
                    format!("half_sibling_{}", i + 1),
                    Relationship::HalfSibling,
                    half_share,
                )
                .numbered(i + 1)
                .with_surcharge(true),
            );
        }
    }

    for i in 0..non_heirs {
        heirs.push(
            Heir::new(format!("non_heir_{}", i + 1), Relationship::Other, Decimal::ZERO)
                .numbered(i + 1)
                .with_surcharge(true),
        );
    }

    Ok(heirs)
}

/// Resolve heirs for a family composition and report the basic deduction.
#[instrument(skip_all, fields(spouse = family.spouse_exists, children = family.children_count))]
pub fn resolve_heirs(
    family: &FamilyComposition,
) -> InheritanceTaxResult<ComputationOutput<HeirResolutionOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    validate_family_structure(family).into_result()?;

    let legal_heirs = determine_legal_heirs(family)?;
    let deduction_heirs_count = count_heirs_for_deduction(&legal_heirs);
    let basic_deduction = basic_deduction(&legal_heirs);

    debug!(
        heirs = legal_heirs.len(),
        deduction_heirs_count, basic_deduction, "resolved statutory heirs"
    );

    if family.adopted_children_count > 0 {
        let counted_adopted = adopted_cap(family);
        if family.adopted_children_count > counted_adopted {
            warnings.push(format!(
                "{} adopted children, only {} counted toward the basic deduction.",
                family.adopted_children_count, counted_adopted
            ));
        }
    }
    if family.has_children() && (family.has_parents() || family.has_siblings()) {
        warnings.push(
            "Children are present, so parents and siblings are not statutory heirs.".to_string(),
        );
    }

    let output = HeirResolutionOutput {
        total_heirs_count: legal_heirs.len(),
        legal_heirs,
        deduction_heirs_count,
        basic_deduction,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Statutory heir determination (Civil Code priority: spouse with children, \
         then lineal ascendants, then siblings) and basic deduction",
        family,
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn count(value: i32, field: &str) -> InheritanceTaxResult<usize> {
    usize::try_from(value).map_err(|_| InheritanceTaxError::InvalidInput {
        field: field.to_string(),
        reason: format!("count must not be negative, got {value}"),
    })
}

fn spouse_statutory_share(family: &FamilyComposition) -> Share {
    if family.has_children() {
        dec!(0.5)
    } else if family.has_parents() {
        Decimal::TWO / Decimal::from(3)
    } else if family.has_siblings() {
        dec!(0.75)
    } else {
        Decimal::ONE
    }
}

/// Full siblings take one unit each, half siblings half a unit.
fn sibling_shares(others_share: Share, full: usize, half: usize) -> (Share, Share) {
    let units = Decimal::from(full) + Decimal::from(half) / Decimal::TWO;
    let full_share = if units > Decimal::ZERO {
        others_share / units
    } else {
        Decimal::ZERO
    };
    (full_share, full_share / Decimal::TWO)
}

fn adopted_cap(family: &FamilyComposition) -> i32 {
    let biological = family.children_count - family.adopted_children_count;
    let cap = if biological > 0 { 1 } else { 2 };
    family.adopted_children_count.min(cap)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::heirs::family::{statutory_share_total, HeirClass};
    use pretty_assertions::assert_eq;

    fn family() -> FamilyComposition {
        FamilyComposition::default()
    }

    fn ids(heirs: &[Heir]) -> Vec<&str> {
        heirs.iter().map(|h| h.id.as_str()).collect()
    }

    #[test]
    fn test_spouse_and_two_children() {
        let heirs = determine_legal_heirs(&FamilyComposition {
            spouse_exists: true,
            children_count: 2,
            ..family()
        })
        .unwrap();
        assert_eq!(ids(&heirs), vec!["spouse", "child_1", "child_2"]);
        assert_eq!(heirs[0].inheritance_share, dec!(0.5));
        assert_eq!(heirs[1].inheritance_share, dec!(0.25));
        assert_eq!(heirs[2].inheritance_share, dec!(0.25));
        assert!(heirs.iter().all(|h| !h.surcharge_liable));
    }

    #[test]
    fn test_spouse_alone_takes_everything() {
        let heirs = determine_legal_heirs(&FamilyComposition {
            spouse_exists: true,
            ..family()
        })
        .unwrap();
        assert_eq!(heirs.len(), 1);
        assert_eq!(heirs[0].inheritance_share, Decimal::ONE);
    }

    #[test]
    fn test_spouse_and_parents_two_thirds() {
        let heirs = determine_legal_heirs(&FamilyComposition {
            spouse_exists: true,
            parents_alive: 2,
            ..family()
        })
        .unwrap();
        assert_eq!(ids(&heirs), vec!["spouse", "parent_1", "parent_2"]);
        let total = statutory_share_total(&heirs);
        assert!((total - Decimal::ONE).abs() < dec!(0.000001));
        assert!((heirs[0].inheritance_share - dec!(0.6666666)).abs() < dec!(0.000001));
        assert!(heirs.iter().all(|h| !h.surcharge_liable));
    }

    #[test]
    fn test_spouse_full_and_half_siblings() {
        let heirs = determine_legal_heirs(&FamilyComposition {
            spouse_exists: true,
            siblings_count: 2,
            half_siblings_count: 1,
            ..family()
        })
        .unwrap();
        assert_eq!(
            ids(&heirs),
            vec!["spouse", "sibling_1", "sibling_2", "half_sibling_1"]
        );
        assert_eq!(heirs[0].inheritance_share, dec!(0.75));
        assert_eq!(heirs[1].inheritance_share, dec!(0.1));
        assert_eq!(heirs[2].inheritance_share, dec!(0.1));
        assert_eq!(heirs[3].inheritance_share, dec!(0.05));
        assert!(heirs[1..].iter().all(|h| h.surcharge_liable));
        assert_eq!(heirs[3].relationship, Relationship::HalfSibling);
    }

    #[test]
    fn test_only_siblings_half_share() {
        let heirs = determine_legal_heirs(&FamilyComposition {
            siblings_count: 2,
            half_siblings_count: 1,
            ..family()
        })
        .unwrap();
        assert_eq!(heirs[0].inheritance_share, dec!(0.4));
        assert_eq!(heirs[2].inheritance_share, dec!(0.2));
    }

    #[test]
    fn test_adopted_and_grandchild_adopted_ordering() {
        let heirs = determine_legal_heirs(&FamilyComposition {
            children_count: 4,
            adopted_children_count: 2,
            grandchild_adopted_count: 1,
            ..family()
        })
        .unwrap();
        let relationships: Vec<Relationship> = heirs.iter().map(|h| h.relationship).collect();
        assert_eq!(
            relationships,
            vec![
                Relationship::GrandchildAdopted,
                Relationship::AdoptedChild,
                Relationship::Child,
                Relationship::Child,
            ]
        );
        assert!(heirs[0].surcharge_liable && heirs[0].is_adopted);
        assert!(!heirs[1].surcharge_liable && heirs[1].is_adopted);
        assert!(!heirs[2].is_adopted);
        assert_eq!(heirs[0].name, "Grandchild (adopted) 1");
        assert_eq!(heirs[2].name, "Child 3");
        assert!(heirs.iter().all(|h| h.inheritance_share == dec!(0.25)));
    }

    #[test]
    fn test_children_exclude_parents_and_siblings() {
        let heirs = determine_legal_heirs(&FamilyComposition {
            children_count: 1,
            parents_alive: 2,
            siblings_count: 3,
            ..family()
        })
        .unwrap();
        assert_eq!(ids(&heirs), vec!["child_1"]);
        assert_eq!(heirs[0].inheritance_share, Decimal::ONE);
    }

    #[test]
    fn test_non_heirs_appended_with_zero_share() {
        let heirs = determine_legal_heirs(&FamilyComposition {
            spouse_exists: true,
            non_heirs_count: 2,
            ..family()
        })
        .unwrap();
        assert_eq!(ids(&heirs), vec!["spouse", "non_heir_1", "non_heir_2"]);
        assert_eq!(heirs[1].class, HeirClass::Other);
        assert_eq!(heirs[1].inheritance_share, Decimal::ZERO);
        assert!(heirs[1].surcharge_liable);
        assert_eq!(heirs[0].inheritance_share, Decimal::ONE);
    }

    #[test]
    fn test_negative_count_is_invalid_input() {
        let err = determine_legal_heirs(&FamilyComposition {
            spouse_exists: true,
            siblings_count: -1,
            ..family()
        })
        .unwrap_err();
        assert!(matches!(
            err,
            InheritanceTaxError::InvalidInput { ref field, .. } if field == "siblings_count"
        ));
    }

    #[test]
    fn test_resolve_heirs_reports_deduction() {
        let out = resolve_heirs(&FamilyComposition {
            spouse_exists: true,
            children_count: 2,
            ..family()
        })
        .unwrap();
        assert_eq!(out.result.total_heirs_count, 3);
        assert_eq!(out.result.deduction_heirs_count, 3);
        assert_eq!(out.result.basic_deduction, 48_000_000);
        assert!(out.warnings.is_empty());
    }

    #[test]
    fn test_resolve_heirs_rejects_empty_family() {
        let err = resolve_heirs(&family()).unwrap_err();
        let report = err.validation().expect("validation report");
        assert_eq!(report.errors[0].field, "family_structure");
    }

    #[test]
    fn test_resolve_heirs_warns_on_capped_adoptions() {
        let out = resolve_heirs(&FamilyComposition {
            children_count: 3,
            adopted_children_count: 2,
            ..family()
        })
        .unwrap();
        assert_eq!(out.result.deduction_heirs_count, 2);
        assert_eq!(out.warnings.len(), 1);
    }
}
