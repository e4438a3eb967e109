use clap::Args;
use serde_json::Value;

use inheritance_tax_core::pipeline::{self, InheritanceTaxInput};
use inheritance_tax_core::tax::division::{self, DivisionInput, RoundingPolicy};

use crate::input;

/// Arguments for the actual-division calculation
#[derive(Args)]
pub struct DivisionArgs {
    /// Path to a JSON or YAML division request, heir list included
    #[arg(long)]
    pub input: Option<String>,

    /// Percentage rounding: round, floor or ceil (overrides the request)
    #[arg(long)]
    pub rounding: Option<RoundingPolicy>,
}

/// Arguments for the single-request calculation
#[derive(Args)]
pub struct CalculateArgs {
    /// Path to a JSON or YAML request: taxable amount, family, optional allocation
    #[arg(long)]
    pub input: Option<String>,

    /// Percentage rounding: round, floor or ceil (overrides the request)
    #[arg(long)]
    pub rounding: Option<RoundingPolicy>,
}

pub fn run_division(
    args: DivisionArgs,
    default_rounding: RoundingPolicy,
) -> Result<Value, Box<dyn std::error::Error>> {
    let mut data = input::read_request(args.input.as_deref())?
        .ok_or("--input <file> or stdin required for the division calculation")?;
    apply_rounding(&mut data, args.rounding, default_rounding);

    let division_input: DivisionInput = serde_json::from_value(data)?;
    let result = division::calculate_actual_division(&division_input)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_calculate(
    args: CalculateArgs,
    default_rounding: RoundingPolicy,
) -> Result<Value, Box<dyn std::error::Error>> {
    let mut data = input::read_request(args.input.as_deref())?
        .ok_or("--input <file> or stdin required for the inheritance tax calculation")?;
    if let Some(allocation) = data.get_mut("allocation").filter(|a| a.is_object()) {
        apply_rounding(allocation, args.rounding, default_rounding);
    }

    let request: InheritanceTaxInput = serde_json::from_value(data)?;
    let result = pipeline::calculate_inheritance_tax(&request)?;
    Ok(serde_json::to_value(result)?)
}

/// Flag beats request, request beats configuration.
fn apply_rounding(request: &mut Value, flag: Option<RoundingPolicy>, configured: RoundingPolicy) {
    let Some(map) = request.as_object_mut() else {
        return;
    };
    let in_request = map.contains_key("rounding") || map.contains_key("rounding_method");
    let chosen = match flag {
        Some(policy) => policy,
        None if in_request => return,
        None => configured,
    };
    map.remove("rounding_method");
    if let Ok(value) = serde_json::to_value(chosen) {
        map.insert("rounding".to_string(), value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_configured_rounding_fills_gap() {
        let mut request = json!({"mode": "percentage"});
        apply_rounding(&mut request, None, RoundingPolicy::Floor);
        assert_eq!(request["rounding"], "floor");
    }

    #[test]
    fn test_request_rounding_kept_without_flag() {
        let mut request = json!({"rounding_method": "ceil"});
        apply_rounding(&mut request, None, RoundingPolicy::Floor);
        assert_eq!(request["rounding_method"], "ceil");
        assert!(request.get("rounding").is_none());
    }

    #[test]
    fn test_flag_overrides_request() {
        let mut request = json!({"rounding_method": "ceil"});
        apply_rounding(&mut request, Some(RoundingPolicy::Round), RoundingPolicy::Floor);
        assert_eq!(request["rounding"], "round");
        assert!(request.get("rounding_method").is_none());
    }
}
