//! Codec Settings
//!
//! Loads codec limits, rename rules and logging options from a TOML file with
//! environment overrides. Every section is optional; missing values fall back
//! to the codec defaults.
//!
//! Environment variables use the `OBJGRAPH` prefix with `__` between path
//! segments, e.g. `OBJGRAPH__LIMITS__MAX_DEPTH=64`.

use anyhow::{bail, Context, Result};
use config_crate::{Config, Environment, File, FileFormat};
use objgraph_codec::codec::{DEFAULT_DEPTH_CACHE_SLOTS, DEFAULT_MAX_DEPTH};
use objgraph_codec::{BinaryGraphCodec, RenameTable};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

pub const ENV_PREFIX: &str = "OBJGRAPH";
pub const ENV_SEPARATOR: &str = "__";

/// Top-level settings file
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct CodecSettings {
    pub limits: LimitSettings,
    pub renames: RenameSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LimitSettings {
    pub max_depth: usize,
    pub depth_cache_slots: usize,
}

impl Default for LimitSettings {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            depth_cache_slots: DEFAULT_DEPTH_CACHE_SLOTS,
        }
    }
}

/// Explicit old → new name mappings applied to stream identities
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct RenameSettings {
    pub types: Vec<RenameRule>,
    pub assemblies: Vec<RenameRule>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct RenameRule {
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// `EnvFilter` directive; `RUST_LOG` wins when set
    pub level: String,
    pub json: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl CodecSettings {
    /// Load from a TOML file plus `OBJGRAPH__*` environment overrides
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Self::load_with_prefix(path, ENV_PREFIX)
    }

    pub fn load_with_prefix(path: impl AsRef<Path>, env_prefix: &str) -> Result<Self> {
        let path = expand_path(path.as_ref())?;
        info!("Loading codec settings from {:?}", path);

        let config = Config::builder()
            .add_source(File::from(path.as_path()).format(FileFormat::Toml).required(true))
            .add_source(
                Environment::with_prefix(env_prefix)
                    .prefix_separator(ENV_SEPARATOR)
                    .separator(ENV_SEPARATOR)
                    .try_parsing(true),
            )
            .build()
            .with_context(|| format!("Failed to build configuration from {}", path.display()))?;

        let settings: Self = config
            .try_deserialize()
            .context("Failed to deserialize codec settings")?;
        settings.validate()?;
        Ok(settings)
    }

    /// Parse settings from TOML text, without environment overrides
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let settings: Self = Config::builder()
            .add_source(File::from_str(text, FileFormat::Toml))
            .build()
            .context("Failed to parse codec settings")?
            .try_deserialize()
            .context("Failed to deserialize codec settings")?;
        settings.validate()?;
        Ok(settings)
    }

    /// Render as TOML, e.g. to write out a defaults file
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize codec settings")
    }

    pub fn validate(&self) -> Result<()> {
        if self.limits.max_depth == 0 {
            bail!("limits.max_depth must be at least 1");
        }

        for (section, rules) in [
            ("renames.types", &self.renames.types),
            ("renames.assemblies", &self.renames.assemblies),
        ] {
            let mut seen = HashSet::new();
            for rule in rules {
                if rule.from.trim().is_empty() || rule.to.trim().is_empty() {
                    bail!("{section}: rename rule has an empty name ({:?} -> {:?})", rule.from, rule.to);
                }
                if !seen.insert(rule.from.as_str()) {
                    warn!(
                        section,
                        from = %rule.from,
                        "Duplicate rename rule; the last one wins"
                    );
                }
            }
        }
        Ok(())
    }

    pub fn rename_table(&self) -> RenameTable {
        let table = self
            .renames
            .types
            .iter()
            .fold(RenameTable::new(), |table, rule| {
                table.rename_type(&rule.from, &rule.to)
            });

        self.renames
            .assemblies
            .iter()
            .fold(table, |table, rule| table.rename_assembly(&rule.from, &rule.to))
    }

    /// Codec configured with these limits and renames
    pub fn build_codec(&self) -> BinaryGraphCodec {
        debug!(
            max_depth = self.limits.max_depth,
            depth_cache_slots = self.limits.depth_cache_slots,
            type_renames = self.renames.types.len(),
            assembly_renames = self.renames.assemblies.len(),
            "Building codec from settings"
        );

        BinaryGraphCodec::builder()
            .max_depth(self.limits.max_depth)
            .depth_cache_slots(self.limits.depth_cache_slots)
            .renames(self.rename_table())
            .build()
    }
}

fn expand_path(path: &Path) -> Result<PathBuf> {
    let Some(text) = path.to_str() else {
        return Ok(path.to_path_buf());
    };
    let expanded = shellexpand::full(text)
        .with_context(|| format!("Failed to expand settings path {text}"))?;
    Ok(PathBuf::from(expanded.as_ref()))
}
