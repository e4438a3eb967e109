use serde_json::Value;

use super::result_of;

/// Headline figures, most specific first. Dotted paths reach into pipeline stages.
const PRIORITY_PATHS: [&str; 6] = [
    "division.total_tax_amount",
    "legal_share.total_tax_amount",
    "total_tax_amount",
    "basic_deduction",
    "total_heirs_count",
    "effective_from",
];

/// Print just the key answer from the output.
pub fn print_minimal(value: &Value) {
    println!("{}", minimal_line(result_of(value)));
}

fn minimal_line(result: &Value) -> String {
    for path in PRIORITY_PATHS {
        if let Some(found) = lookup(result, path).filter(|v| !v.is_null()) {
            return format_minimal(found);
        }
    }

    match result {
        Value::Object(map) => match map.iter().next() {
            Some((key, val)) => format!("{}: {}", key, format_minimal(val)),
            None => String::new(),
        },
        other => format_minimal(other),
    }
}

fn lookup<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(value, |node, key| node.get(key))
}

fn format_minimal(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}
