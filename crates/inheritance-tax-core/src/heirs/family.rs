use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::Share;

// ---------------------------------------------------------------------------
// Family composition
// ---------------------------------------------------------------------------

/// Description of the decedent's surviving family.
///
/// Counts are signed so that a caller's negative input reaches
/// [`crate::validation::validate_family_structure`] instead of failing
/// deserialization. `adopted_children_count` is a subset of `children_count`,
/// and `grandchild_adopted_count` a subset of the adopted children.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FamilyComposition {
    pub spouse_exists: bool,
    pub children_count: i32,
    pub adopted_children_count: i32,
    pub grandchild_adopted_count: i32,
    /// 0, 1 or 2
    pub parents_alive: i32,
    pub grandparents_alive: i32,
    pub siblings_count: i32,
    pub half_siblings_count: i32,
    /// Beneficiaries under a will who are not statutory heirs
    pub non_heirs_count: i32,
}

impl FamilyComposition {
    pub fn has_children(&self) -> bool {
        self.children_count > 0
    }

    pub fn has_parents(&self) -> bool {
        self.parents_alive > 0
    }

    pub fn has_siblings(&self) -> bool {
        self.siblings_count > 0 || self.half_siblings_count > 0
    }
}

// ---------------------------------------------------------------------------
// Heirs
// ---------------------------------------------------------------------------

/// Priority class of an heir under the Civil Code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeirClass {
    Spouse,
    Child,
    Parent,
    Sibling,
    /// Beneficiary who is not a statutory heir
    Other,
}

/// Fine-grained relationship to the decedent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Relationship {
    Spouse,
    Child,
    AdoptedChild,
    GrandchildAdopted,
    Parent,
    Sibling,
    HalfSibling,
    Other,
}

impl Relationship {
    /// Heir class this relationship belongs to.
    pub fn class(self) -> HeirClass {
        match self {
            Relationship::Spouse => HeirClass::Spouse,
            Relationship::Child | Relationship::AdoptedChild | Relationship::GrandchildAdopted => {
                HeirClass::Child
            }
            Relationship::Parent => HeirClass::Parent,
            Relationship::Sibling | Relationship::HalfSibling => HeirClass::Sibling,
            Relationship::Other => HeirClass::Other,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Relationship::Spouse => "Spouse",
            Relationship::Child => "Child",
            Relationship::AdoptedChild => "Adopted child",
            Relationship::GrandchildAdopted => "Grandchild (adopted)",
            Relationship::Parent => "Parent",
            Relationship::Sibling => "Sibling",
            Relationship::HalfSibling => "Half-sibling",
            Relationship::Other => "Non-heir beneficiary",
        }
    }
}

impl std::fmt::Display for Relationship {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A statutory heir or non-heir beneficiary.
///
/// `id` is stable for a given composition, so a caller can echo the heir list
/// returned by resolution back into the division stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Heir {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub class: HeirClass,
    pub relationship: Relationship,
    pub inheritance_share: Share,
    #[serde(alias = "two_fold_addition")]
    pub surcharge_liable: bool,
    #[serde(default)]
    pub is_adopted: bool,
}

impl Heir {
    pub fn new(id: impl Into<String>, relationship: Relationship, share: Share) -> Self {
        let id = id.into();
        Heir {
            name: relationship.label().to_string(),
            id,
            class: relationship.class(),
            relationship,
            inheritance_share: share,
            surcharge_liable: false,
            is_adopted: false,
        }
    }

    /// Append a 1-based ordinal to the display name ("Child 2").
    pub fn numbered(mut self, ordinal: usize) -> Self {
        self.name = format!("{} {}", self.relationship.label(), ordinal);
        self
    }

    pub fn with_surcharge(mut self, liable: bool) -> Self {
        self.surcharge_liable = liable;
        self
    }

    pub fn adopted(mut self, adopted: bool) -> Self {
        self.is_adopted = adopted;
        self
    }

    pub fn is_spouse(&self) -> bool {
        self.class == HeirClass::Spouse
    }

    /// Statutory heirs are everyone except non-heir beneficiaries.
    pub fn is_statutory(&self) -> bool {
        self.class != HeirClass::Other
    }
}

/// Sum of statutory shares over statutory heirs.
pub fn statutory_share_total(heirs: &[Heir]) -> Share {
    heirs
        .iter()
        .filter(|h| h.is_statutory())
        .map(|h| h.inheritance_share)
        .sum::<Decimal>()
}

/// Statutory share of the first spouse in the list, zero if there is none.
pub fn spouse_share(heirs: &[Heir]) -> Share {
    heirs
        .iter()
        .find(|h| h.is_spouse())
        .map(|h| h.inheritance_share)
        .unwrap_or(Decimal::ZERO)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_relationship_maps_to_class() {
        assert_eq!(Relationship::GrandchildAdopted.class(), HeirClass::Child);
        assert_eq!(Relationship::HalfSibling.class(), HeirClass::Sibling);
        assert_eq!(Relationship::Other.class(), HeirClass::Other);
    }

    #[test]
    fn test_numbered_name() {
        let heir = Heir::new("child_3", Relationship::AdoptedChild, dec!(0.25)).numbered(3);
        assert_eq!(heir.name, "Adopted child 3");
        assert_eq!(heir.class, HeirClass::Child);
    }

    #[test]
    fn test_heir_json_uses_type_key() {
        let heir = Heir::new("spouse", Relationship::Spouse, dec!(0.5));
        let json = serde_json::to_value(&heir).unwrap();
        assert_eq!(json["type"], "spouse");
        assert_eq!(json["relationship"], "spouse");
        assert_eq!(json["surcharge_liable"], false);
    }

    #[test]
    fn test_heir_accepts_legacy_surcharge_key() {
        let json = r#"{
            "id": "sibling_1", "name": "Sibling 1", "type": "sibling",
            "relationship": "sibling", "inheritance_share": "0.125",
            "two_fold_addition": true
        }"#;
        let heir: Heir = serde_json::from_str(json).unwrap();
        assert!(heir.surcharge_liable);
        assert!(!heir.is_adopted);
        assert_eq!(heir.inheritance_share, dec!(0.125));
    }

    #[test]
    fn test_spouse_share_absent_is_zero() {
        let heirs = vec![Heir::new("parent_1", Relationship::Parent, Decimal::ONE)];
        assert_eq!(spouse_share(&heirs), Decimal::ZERO);
    }

    #[test]
    fn test_statutory_total_ignores_others() {
        let heirs = vec![
            Heir::new("spouse", Relationship::Spouse, Decimal::ONE),
            Heir::new("non_heir_1", Relationship::Other, Decimal::ZERO),
        ];
        assert_eq!(statutory_share_total(&heirs), Decimal::ONE);
    }
}
