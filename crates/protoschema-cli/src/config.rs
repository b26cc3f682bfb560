//! Configuration for the compatibility gate
//!
//! Sources, lowest precedence first:
//! - Defaults
//! - Config file (`protoschema.toml` in the working directory, or `--config`)
//! - Environment variables (`PROTOSCHEMA_*`, `__` between table and key)
//!
//! Command-line flags override all of these.
//!
//! ## Example config file (protoschema.toml):
//! ```toml
//! [compatibility]
//! allowed = ["message_added", "enum_added"]
//! strict = false
//!
//! [output]
//! color = true
//! ```

use std::path::Path;

use config_crate::{Config, ConfigError, Environment, File};
use protoschema_core::{CompatibilityChecker, DiffKind};
use serde::{Deserialize, Serialize};

const DEFAULT_CONFIG_FILE: &str = "protoschema.toml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GateConfig {
    #[serde(default)]
    pub compatibility: CompatibilityConfig,

    #[serde(default)]
    pub output: OutputConfig,
}

/// Which diff kinds are non-breaking
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompatibilityConfig {
    #[serde(default = "default_allowed")]
    pub allowed: Vec<DiffKind>,

    /// Every difference is a violation, whatever `allowed` says
    #[serde(default)]
    pub strict: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_true")]
    pub color: bool,
}

fn default_allowed() -> Vec<DiffKind> {
    vec![DiffKind::MessageAdded]
}

fn default_true() -> bool {
    true
}

impl Default for CompatibilityConfig {
    fn default() -> Self {
        Self {
            allowed: default_allowed(),
            strict: false,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { color: true }
    }
}

impl GateConfig {
    /// Load, reading `config_path` instead of the default file when given.
    /// An explicit path must exist; the default file is optional.
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        let file = match config_path {
            Some(path) => File::from(path).required(true),
            None => File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };

        let config = Config::builder()
            .add_source(file)
            .add_source(
                Environment::with_prefix("PROTOSCHEMA")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("compatibility.allowed"),
            )
            .build()?;
        config.try_deserialize()
    }

    /// Checker for these settings, widened by `extra_allowed`
    pub fn checker(&self, extra_allowed: &[DiffKind]) -> CompatibilityChecker {
        if self.compatibility.strict {
            return CompatibilityChecker::strict();
        }
        CompatibilityChecker::new(
            self.compatibility
                .allowed
                .iter()
                .chain(extra_allowed)
                .copied(),
        )
    }
}
