pub mod file;
pub mod stdin;

use serde_json::Value;

/// The request body from `--input` when given, else from piped stdin.
pub fn read_request(path: Option<&str>) -> Result<Option<Value>, Box<dyn std::error::Error>> {
    match path {
        Some(path) => file::read_value(path).map(Some),
        None => stdin::read_stdin(),
    }
}
