pub mod csv_out;
pub mod json;
pub mod minimal;
pub mod table;

use crate::OutputFormat;
use serde_json::Value;

/// Per-heir arrays, in the order a reader most wants them.
const ROW_KEYS: [&str; 4] = ["heir_details", "heir_tax_details", "legal_heirs", "brackets"];

/// Dispatch output to the appropriate formatter.
pub fn format_output(format: &OutputFormat, value: &Value) {
    match format {
        OutputFormat::Json => json::print_json(value),
        OutputFormat::Table => table::print_table(value),
        OutputFormat::Csv => csv_out::print_csv(value),
        OutputFormat::Minimal => minimal::print_minimal(value),
    }
}

/// The envelope's `result`, or the value itself when there is no envelope.
pub(crate) fn result_of(value: &Value) -> &Value {
    value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value)
}

/// The most detailed per-row array in a result.
///
/// Pipeline results nest the stages, so the division wins over the legal
/// share when both are present.
pub(crate) fn primary_rows(result: &Value) -> Option<&Vec<Value>> {
    let stages = [result.get("division"), result.get("legal_share"), Some(result)];
    stages
        .into_iter()
        .flatten()
        .filter(|stage| !stage.is_null())
        .find_map(|stage| {
            ROW_KEYS
                .iter()
                .find_map(|key| stage.get(*key).and_then(Value::as_array))
        })
}
