use clap::Args;
use serde_json::Value;

use inheritance_tax_core::tax::brackets;
use inheritance_tax_core::tax::legal_share::{self, LegalShareTaxInput};
use inheritance_tax_core::Yen;

use super::family::FamilyArgs;
use crate::input;

/// Arguments for the legal-share tax calculation
#[derive(Args)]
pub struct TaxArgs {
    /// Path to a JSON or YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Aggregate taxable amount in yen
    #[arg(long, allow_hyphen_values = true)]
    pub taxable_amount: Option<Yen>,

    #[command(flatten)]
    pub family: FamilyArgs,
}

pub fn run_tax(args: TaxArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let tax_input: LegalShareTaxInput = match input::read_request(args.input.as_deref())? {
        Some(data) => serde_json::from_value(data)?,
        None => LegalShareTaxInput {
            taxable_amount: args
                .taxable_amount
                .ok_or("--taxable-amount is required (or provide --input)")?,
            family: args.family.to_family(),
        },
    };
    let result = legal_share::calculate_legal_share_tax(&tax_input)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_brackets() -> Result<Value, Box<dyn std::error::Error>> {
    let result = brackets::tax_bracket_table()?;
    Ok(serde_json::to_value(result)?)
}
