use crate::heirs::family::{Heir, HeirClass};
use crate::types::Yen;

/// 30,000,000 yen fixed portion of the basic deduction.
pub const BASIC_DEDUCTION_BASE: Yen = 30_000_000;

/// 6,000,000 yen per statutory heir.
pub const BASIC_DEDUCTION_PER_HEIR: Yen = 6_000_000;

/// Adopted children counted when a biological child exists.
pub const ADOPTED_CAP_WITH_BIOLOGICAL: u32 = 1;

/// Adopted children counted when there is no biological child.
pub const ADOPTED_CAP_WITHOUT_BIOLOGICAL: u32 = 2;

/// Number of statutory heirs for the basic deduction.
///
/// Adopted children (grandchildren by adoption included) are capped at one
/// when a biological child exists, two otherwise. Non-heir beneficiaries
/// never count.
pub fn count_heirs_for_deduction(heirs: &[Heir]) -> u32 {
    let mut count: u32 = 0;
    let mut adopted: u32 = 0;
    let mut has_biological_children = false;

    for heir in heirs {
        match heir.class {
            HeirClass::Child if heir.is_adopted => adopted += 1,
            HeirClass::Child => {
                count += 1;
                has_biological_children = true;
            }
            HeirClass::Spouse | HeirClass::Parent | HeirClass::Sibling => count += 1,
            HeirClass::Other => {}
        }
    }

    let cap = if has_biological_children {
        ADOPTED_CAP_WITH_BIOLOGICAL
    } else {
        ADOPTED_CAP_WITHOUT_BIOLOGICAL
    };
    count + adopted.min(cap)
}

/// `30,000,000 + 6,000,000 x counted heirs`
pub fn basic_deduction(heirs: &[Heir]) -> Yen {
    BASIC_DEDUCTION_BASE + BASIC_DEDUCTION_PER_HEIR * Yen::from(count_heirs_for_deduction(heirs))
}
