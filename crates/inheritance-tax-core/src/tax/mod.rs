pub mod brackets;
pub mod deduction;
pub mod division;
pub mod legal_share;

pub use brackets::{tax_bracket_table, tax_from_table, TaxBracket, TAX_BRACKETS};
pub use deduction::{basic_deduction, count_heirs_for_deduction};
pub use division::{
    calculate_actual_division, DivisionInput, DivisionMode, DivisionOutput, RoundingPolicy,
};
pub use legal_share::{
    calculate_legal_share_tax, tax_by_legal_share, LegalShareTaxInput, LegalShareTaxOutput,
};
