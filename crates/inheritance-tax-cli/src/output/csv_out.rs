use serde_json::Value;
use std::io;

use super::{primary_rows, result_of};

/// Write the per-heir rows as CSV; results without rows become field,value pairs.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());

    let result = result_of(value);
    let outcome = match (primary_rows(result), result) {
        (Some(rows), _) => write_rows(&mut wtr, rows),
        (None, Value::Object(map)) => {
            let mut outcome = wtr.write_record(["field", "value"]);
            for (key, val) in map {
                if outcome.is_err() {
                    break;
                }
                outcome = wtr.write_record([key.as_str(), &format_csv_value(val)]);
            }
            outcome
        }
        (None, other) => wtr.write_record([&format_csv_value(other)]),
    };

    if let Err(e) = outcome.and_then(|_| wtr.flush().map_err(csv::Error::from)) {
        eprintln!("CSV output error: {e}");
    }
}

fn write_rows<W: io::Write>(wtr: &mut csv::Writer<W>, rows: &[Value]) -> csv::Result<()> {
    let Some(Value::Object(first)) = rows.first() else {
        return Ok(());
    };
    let headers: Vec<&str> = first.keys().map(String::as_str).collect();
    wtr.write_record(&headers)?;
    for row in rows.iter().filter_map(Value::as_object) {
        let cells: Vec<String> = headers
            .iter()
            .map(|h| row.get(*h).map(format_csv_value).unwrap_or_default())
            .collect();
        wtr.write_record(&cells)?;
    }
    Ok(())
}

fn format_csv_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}
