use inheritance_tax_core::heirs::{self, FamilyComposition};
use inheritance_tax_core::pipeline::{self, InheritanceTaxInput};
use inheritance_tax_core::tax::brackets;
use inheritance_tax_core::tax::division::{self, DivisionInput};
use inheritance_tax_core::tax::legal_share::{self, LegalShareTaxInput};
use napi::Result as NapiResult;
use napi_derive::napi;

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

// ---------------------------------------------------------------------------
// Heirs
// ---------------------------------------------------------------------------

#[napi]
pub fn resolve_heirs(input_json: String) -> NapiResult<String> {
    let family: FamilyComposition = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = heirs::resolve_heirs(&family).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Tax
// ---------------------------------------------------------------------------

#[napi]
pub fn calculate_legal_share_tax(input_json: String) -> NapiResult<String> {
    let input: LegalShareTaxInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = legal_share::calculate_legal_share_tax(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn calculate_actual_division(input_json: String) -> NapiResult<String> {
    let input: DivisionInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = division::calculate_actual_division(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn tax_bracket_table() -> NapiResult<String> {
    let output = brackets::tax_bracket_table().map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

#[napi]
pub fn calculate_inheritance_tax(input_json: String) -> NapiResult<String> {
    let input: InheritanceTaxInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = pipeline::calculate_inheritance_tax(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}
