//! CLI configuration

use inheritance_tax_core::tax::RoundingPolicy;
use serde::{Deserialize, Serialize};

use crate::OutputFormat;

const CONFIG_FILE: &str = "itax";
const ENV_PREFIX: &str = "ITAX";

/// Runtime settings for the `itax` binary.
///
/// Sources, lowest precedence first: built-in defaults, `itax.toml` in the
/// working directory, then `ITAX_*` environment variables. Command-line
/// flags override all of them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CliConfig {
    /// Output format when `--output` is not given
    pub output: OutputFormat,
    /// Percentage rounding when neither the request nor `--rounding` sets one
    pub rounding: RoundingPolicy,
    /// Log filter used when `RUST_LOG` is unset
    pub log_level: String,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            output: OutputFormat::Json,
            rounding: RoundingPolicy::Round,
            log_level: "warn".to_string(),
        }
    }
}

impl CliConfig {
    /// Loads configuration from `itax.toml` and the environment
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from(CONFIG_FILE, ENV_PREFIX)
    }

    fn load_from(file: &str, env_prefix: &str) -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::Config::try_from(&Self::default())?)
            .add_source(config::File::with_name(file).required(false))
            .add_source(config::Environment::with_prefix(env_prefix))
            .build()?
            .try_deserialize()
    }
}
