pub mod family;
pub mod resolver;

pub use family::{FamilyComposition, Heir, HeirClass, Relationship};
pub use resolver::{determine_legal_heirs, resolve_heirs, HeirResolutionOutput};
