use clap::Args;
use serde_json::Value;

use inheritance_tax_core::heirs::{self, FamilyComposition};

use crate::input;

/// Family composition flags shared by `heirs` and `tax`
#[derive(Args, Debug, Clone, Default)]
pub struct FamilyArgs {
    /// The decedent's spouse survives
    #[arg(long)]
    pub spouse: bool,

    /// Children, adopted ones included
    #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
    pub children: i32,

    /// How many of the children are adopted
    #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
    pub adopted_children: i32,

    /// How many of the adopted children are grandchildren
    #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
    pub grandchild_adopted: i32,

    /// Living parents (0-2)
    #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
    pub parents: i32,

    /// Living grandparents
    #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
    pub grandparents: i32,

    /// Full siblings
    #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
    pub siblings: i32,

    /// Half siblings
    #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
    pub half_siblings: i32,

    /// Beneficiaries under a will who are not statutory heirs
    #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
    pub non_heirs: i32,
}

impl FamilyArgs {
    pub fn to_family(&self) -> FamilyComposition {
        FamilyComposition {
            spouse_exists: self.spouse,
            children_count: self.children,
            adopted_children_count: self.adopted_children,
            grandchild_adopted_count: self.grandchild_adopted,
            parents_alive: self.parents,
            grandparents_alive: self.grandparents,
            siblings_count: self.siblings,
            half_siblings_count: self.half_siblings,
            non_heirs_count: self.non_heirs,
        }
    }
}

/// Arguments for heir resolution
#[derive(Args)]
pub struct HeirsArgs {
    /// Path to a JSON or YAML family composition (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    #[command(flatten)]
    pub family: FamilyArgs,
}

pub fn run_heirs(args: HeirsArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let family: FamilyComposition = match input::read_request(args.input.as_deref())? {
        Some(data) => serde_json::from_value(data)?,
        None => args.family.to_family(),
    };
    let result = heirs::resolve_heirs(&family)?;
    Ok(serde_json::to_value(result)?)
}
