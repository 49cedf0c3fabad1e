//! Validator configuration
//!
//! Supports loading configuration from:
//! - Default values
//! - Config file (metaschema.toml)
//! - Environment variables (METASCHEMA_*, nested tables joined with `__`)
//!
//! ## Example config file (metaschema.toml):
//! ```toml
//! custom_message_supported = true
//! openapi3_style_discriminators = false
//!
//! [dispatch]
//! warn_unknown_keywords = true
//! ```

use std::path::{Path, PathBuf};

use config_crate::{Config, ConfigBuilder, ConfigError, Environment, File, FileFormat};
use config_crate::builder::DefaultState;
use serde::{Deserialize, Serialize};

const FILE_STEM: &str = "metaschema";
const ENV_PREFIX: &str = "METASCHEMA";

/// Switches consulted while validators are constructed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaValidatorsConfig {
    /// Treat `message` as custom error text rather than an unknown keyword
    #[serde(default = "default_true")]
    pub custom_message_supported: bool,

    /// Resolve `discriminator` the OpenAPI 3 way when no keyword is registered
    #[serde(default)]
    pub openapi3_style_discriminators: bool,

    /// Keyword dispatch settings
    #[serde(default)]
    pub dispatch: DispatchConfig,
}

/// The `[dispatch]` table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchConfig {
    /// Log the first sighting of each unknown keyword.
    ///
    /// Unknown keywords are recorded either way.
    #[serde(default = "default_true")]
    pub warn_unknown_keywords: bool,
}

fn default_true() -> bool {
    true
}

impl Default for SchemaValidatorsConfig {
    fn default() -> Self {
        Self {
            custom_message_supported: true,
            openapi3_style_discriminators: false,
            dispatch: DispatchConfig::default(),
        }
    }
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            warn_unknown_keywords: true,
        }
    }
}

impl SchemaValidatorsConfig {
    /// Enable OpenAPI 3 discriminators
    pub fn with_openapi3_discriminators(mut self, enabled: bool) -> Self {
        self.openapi3_style_discriminators = enabled;
        self
    }

    /// Enable or disable custom `message` support
    pub fn with_custom_messages(mut self, enabled: bool) -> Self {
        self.custom_message_supported = enabled;
        self
    }

    pub fn with_unknown_keyword_warnings(mut self, enabled: bool) -> Self {
        self.dispatch.warn_unknown_keywords = enabled;
        self
    }

    /// Load configuration from default locations
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(None)
    }

    /// Load configuration, with `config_path` layered over the default
    /// locations and under the environment
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = Self::defaults()?;

        for location in search_paths() {
            builder = builder.add_source(File::from(location).required(false));
        }

        if let Some(path) = config_path {
            builder = builder.add_source(File::from(path).required(true));
        }

        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        builder.build()?.try_deserialize()
    }

    /// Parse a TOML document over the defaults, ignoring files and environment
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Self::defaults()?
            .add_source(File::from_str(content, FileFormat::Toml))
            .build()?
            .try_deserialize()
    }

    /// Save configuration to a file, creating parent directories
    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)
    }

    fn defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        let defaults = Self::default();
        Config::builder()
            .set_default("custom_message_supported", defaults.custom_message_supported)?
            .set_default(
                "openapi3_style_discriminators",
                defaults.openapi3_style_discriminators,
            )?
            .set_default(
                "dispatch.warn_unknown_keywords",
                defaults.dispatch.warn_unknown_keywords,
            )
    }
}

/// Candidate config files, lowest precedence first
fn search_paths() -> Vec<PathBuf> {
    let mut paths: Vec<PathBuf> = [
        format!("{FILE_STEM}.toml"),
        format!(".{FILE_STEM}.toml"),
        format!("config/{FILE_STEM}.toml"),
    ]
    .into_iter()
    .map(PathBuf::from)
    .collect();

    if let Some(dirs) = directories::ProjectDirs::from("dev", "familiar", FILE_STEM) {
        paths.push(dirs.config_dir().join(format!("{FILE_STEM}.toml")));
    }
    paths
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SchemaValidatorsConfig::default();
        assert!(config.custom_message_supported);
        assert!(!config.openapi3_style_discriminators);
        assert!(config.dispatch.warn_unknown_keywords);
    }

    #[test]
    fn test_serialize_config() {
        let config = SchemaValidatorsConfig::default()
            .with_openapi3_discriminators(true)
            .with_unknown_keyword_warnings(false);
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("openapi3_style_discriminators = true"));
        assert!(toml_str.contains("[dispatch]"));
        assert!(toml_str.contains("warn_unknown_keywords = false"));
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("validators.toml");

        let config = SchemaValidatorsConfig::default()
            .with_custom_messages(false)
            .with_openapi3_discriminators(true)
            .with_unknown_keyword_warnings(false);
        config.save(&path).unwrap();

        let loaded = SchemaValidatorsConfig::load_from(Some(&path)).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let loaded = SchemaValidatorsConfig::from_toml("openapi3_style_discriminators = true\n").unwrap();
        assert!(loaded.openapi3_style_discriminators);
        assert!(loaded.custom_message_supported);
        assert!(loaded.dispatch.warn_unknown_keywords);
    }

    #[test]
    fn test_dispatch_table() {
        let loaded = SchemaValidatorsConfig::from_toml("[dispatch]\nwarn_unknown_keywords = false\n").unwrap();
        assert!(!loaded.dispatch.warn_unknown_keywords);
        assert!(loaded.custom_message_supported);
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        assert!(SchemaValidatorsConfig::load_from(Some(&path)).is_err());
    }
}
