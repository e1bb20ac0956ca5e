//! Configuration loading for GVS services
//!
//! Resolution priority: explicit path (CLI) → per-user config file →
//! system config file → compiled defaults, with environment variable
//! overrides applied on top of whichever source won.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Spreadsheet column naming convention used by a deployment.
///
/// Two incompatible conventions exist in the field. A deployment uses one
/// consistently; the active convention is configuration, not auto-detected.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ColumnConvention {
    /// Human-readable headers ("Student National ID", "CGPA", ...)
    #[default]
    HumanReadable,
    /// Machine-style keys (student_national_id, cgpa, ...)
    MachineKeys,
}

impl std::str::FromStr for ColumnConvention {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "human-readable" => Ok(ColumnConvention::HumanReadable),
            "machine-keys" => Ok(ColumnConvention::MachineKeys),
            other => Err(Error::InvalidInput(format!(
                "Unknown column convention: {} (expected 'human-readable' or 'machine-keys')",
                other
            ))),
        }
    }
}

/// Service configuration loaded from TOML
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GvsConfig {
    /// Port the import service listens on
    #[serde(default = "default_listen_port")]
    pub listen_port: u16,

    /// Base URL of the Backend Verification Service
    #[serde(default = "default_backend_url")]
    pub backend_url: String,

    /// Country substituted when a record's institution country cell is blank
    #[serde(default = "default_country")]
    pub default_country: String,

    /// Spreadsheet column naming convention for this deployment
    #[serde(default)]
    pub column_convention: ColumnConvention,

    /// Default tracing filter (overridden by RUST_LOG)
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

fn default_listen_port() -> u16 {
    5810
}

fn default_backend_url() -> String {
    "http://127.0.0.1:5000".to_string()
}

fn default_country() -> String {
    "Ethiopia".to_string()
}

fn default_log_filter() -> String {
    "info".to_string()
}

impl Default for GvsConfig {
    fn default() -> Self {
        Self {
            listen_port: default_listen_port(),
            backend_url: default_backend_url(),
            default_country: default_country(),
            column_convention: ColumnConvention::default(),
            log_filter: default_log_filter(),
        }
    }
}

/// Load service configuration.
///
/// An explicitly supplied path is authoritative: failing to read it is an
/// error. Discovered config files are best-effort; an unreadable file is
/// skipped with a warning and defaults apply.
pub fn load_config(explicit_path: Option<&Path>) -> Result<GvsConfig> {
    // Priority 1: explicit path from CLI or GVS_IMPORT_CONFIG
    if let Some(path) = explicit_path {
        let config = read_config_file(path)?;
        info!("Configuration loaded from {}", path.display());
        return Ok(apply_env_overrides(config));
    }

    // Priority 2: per-user config, then system config
    if let Some(path) = find_config_file() {
        match read_config_file(&path) {
            Ok(config) => {
                info!("Configuration loaded from {}", path.display());
                return Ok(apply_env_overrides(config));
            }
            Err(e) => {
                warn!("Ignoring unreadable config file {}: {}", path.display(), e);
            }
        }
    }

    // Priority 3: compiled defaults
    Ok(apply_env_overrides(GvsConfig::default()))
}

/// Locate a config file for the platform
fn find_config_file() -> Option<PathBuf> {
    if let Some(path) = dirs::config_dir().map(|d| d.join("gvs").join("gvs-import.toml")) {
        if path.exists() {
            return Some(path);
        }
    }

    let system_config = PathBuf::from("/etc/gvs/gvs-import.toml");
    if system_config.exists() {
        return Some(system_config);
    }

    None
}

fn read_config_file(path: &Path) -> Result<GvsConfig> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read config failed: {}", e)))?;
    toml::from_str(&content).map_err(|e| Error::Config(format!("Parse config failed: {}", e)))
}

/// Apply `GVS_*` environment variable overrides
fn apply_env_overrides(mut config: GvsConfig) -> GvsConfig {
    if let Ok(url) = std::env::var("GVS_BACKEND_URL") {
        info!("Backend URL overridden from environment");
        config.backend_url = url;
    }

    if let Ok(port) = std::env::var("GVS_LISTEN_PORT") {
        match port.parse() {
            Ok(p) => config.listen_port = p,
            Err(_) => warn!("Ignoring invalid GVS_LISTEN_PORT: {}", port),
        }
    }

    if let Ok(country) = std::env::var("GVS_DEFAULT_COUNTRY") {
        config.default_country = country;
    }

    if let Ok(value) = std::env::var("GVS_COLUMN_CONVENTION") {
        match value.parse() {
            Ok(c) => config.column_convention = c,
            Err(_) => warn!("Ignoring invalid GVS_COLUMN_CONVENTION: {}", value),
        }
    }

    config
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let config = GvsConfig::default();
        assert_eq!(config.listen_port, 5810);
        assert_eq!(config.default_country, "Ethiopia");
        assert_eq!(config.column_convention, ColumnConvention::HumanReadable);
    }

    #[test]
    fn parses_partial_toml_with_defaults() {
        let config: GvsConfig = toml::from_str(
            r#"
            backend_url = "http://verification.internal:5000"
            column_convention = "machine-keys"
            "#,
        )
        .unwrap();

        assert_eq!(config.backend_url, "http://verification.internal:5000");
        assert_eq!(config.column_convention, ColumnConvention::MachineKeys);
        assert_eq!(config.listen_port, 5810, "unspecified keys fall back to defaults");
    }

    #[test]
    fn convention_from_str_rejects_unknown() {
        assert!("human-readable".parse::<ColumnConvention>().is_ok());
        assert!("machine-keys".parse::<ColumnConvention>().is_ok());
        assert!("auto".parse::<ColumnConvention>().is_err());
    }
}
