//! Configuration handling.
//!
//! Two layers: [`LibraryConfig`] is read from the template library itself and lists the
//! variants offered per component kind; [`Settings`] collects the ambient values of one
//! invocation (flags and environment) so nothing below `main` reads global state.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use log::debug;
use serde::Deserialize;

use crate::constants::LIBRARY_CONFIG_FILES;
use crate::error::{Error, Result};
use crate::locator::ComponentKind;
use crate::tokens::MissingTokens;

/// A selectable variant of a component kind.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct VariantChoice {
    pub title: String,
    pub value: String,
}

impl VariantChoice {
    pub fn new(title: &str, value: &str) -> Self {
        Self { title: title.to_string(), value: value.to_string() }
    }
}

/// Contents of `library.json` / `library.yml` / `library.yaml`.
///
/// ```yaml
/// variants:
///   webpart:
///     - { title: Minimal, value: minimal }
///     - { title: React, value: react }
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LibraryConfig {
    #[serde(default)]
    pub variants: IndexMap<String, Vec<VariantChoice>>,
}

impl LibraryConfig {
    /// Loads the first configuration file found at the library root.
    ///
    /// A library without a configuration file uses the built-in variant lists.
    pub fn load<P: AsRef<Path>>(library_root: P) -> Result<Self> {
        for file in LIBRARY_CONFIG_FILES {
            let config_path = library_root.as_ref().join(file);
            if config_path.exists() {
                debug!("Loading library configuration from {}", config_path.display());
                let content = std::fs::read_to_string(&config_path)?;
                return Self::parse(&content);
            }
        }
        Ok(Self::default())
    }

    /// Parses JSON first, then YAML.
    pub fn parse(content: &str) -> Result<Self> {
        match serde_json::from_str(content) {
            Ok(config) => Ok(config),
            Err(_) => serde_yaml::from_str(content)
                .map_err(|e| Error::ConfigError(format!("Invalid library configuration: {e}"))),
        }
    }

    /// Configured variants for `kind`, falling back to the built-in list.
    pub fn variants(&self, kind: ComponentKind) -> Vec<VariantChoice> {
        self.variants.get(kind.dir_name()).cloned().unwrap_or_else(|| default_variants(kind))
    }
}

/// Variants shipped with the bundled template library.
pub fn default_variants(kind: ComponentKind) -> Vec<VariantChoice> {
    match kind {
        ComponentKind::WebPart => vec![
            VariantChoice::new("Minimal", "minimal"),
            VariantChoice::new("No framework", "no-framework"),
            VariantChoice::new("React", "react"),
        ],
        ComponentKind::Library => vec![VariantChoice::new("Minimal", "minimal")],
        ComponentKind::Extension => vec![
            VariantChoice::new("Application Customizer", "application-customizer"),
            VariantChoice::new("Field Customizer", "field-customizer"),
            VariantChoice::new("ListView Command Set", "listview-command-set"),
            VariantChoice::new("Form Customizer", "form-customizer"),
            VariantChoice::new("Search Query Modifier", "search-query-modifier"),
        ],
        ComponentKind::AdaptiveCardExtension => vec![
            VariantChoice::new("Generic Card Template", "generic-card"),
            VariantChoice::new("Search Card Template", "search-card"),
            VariantChoice::new("Data Visualization Template", "data-visualization-card"),
        ],
    }
}

/// Ambient configuration for one invocation.
#[derive(Debug, Clone, Default)]
pub struct Settings {
    /// Explicit template library directory.
    pub templates_dir: Option<PathBuf>,
    /// Directory of the running executable, used to discover the bundled library.
    pub exe_dir: Option<PathBuf>,
    /// Value of `npm_config_user_agent`, when the tool was launched through a package manager.
    pub user_agent: Option<String>,
    pub missing_tokens: MissingTokens,
}

impl Settings {
    /// Captures the process environment once.
    pub fn from_env(templates_dir: Option<PathBuf>, missing_tokens: MissingTokens) -> Self {
        let exe_dir = std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(Path::to_path_buf));
        Self {
            templates_dir,
            exe_dir,
            user_agent: std::env::var("npm_config_user_agent").ok(),
            missing_tokens,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_json_config() {
        let config = LibraryConfig::parse(
            r#"{"variants": {"webpart": [{"title": "Vue", "value": "vue"}]}}"#,
        )
        .unwrap();
        assert_eq!(config.variants(ComponentKind::WebPart), vec![VariantChoice::new("Vue", "vue")]);
        assert_eq!(config.variants(ComponentKind::Library), default_variants(ComponentKind::Library));
    }

    #[test]
    fn test_parse_yaml_config() {
        let config = LibraryConfig::parse(
            "variants:\n  extension:\n    - title: Custom\n      value: custom\n",
        )
        .unwrap();
        assert_eq!(config.variants(ComponentKind::Extension)[0].value, "custom");
    }

    #[test]
    fn test_invalid_config() {
        assert!(matches!(LibraryConfig::parse("variants: [unclosed"), Err(Error::ConfigError(_))));
    }

    #[test]
    fn test_missing_config_uses_defaults() {
        let root = TempDir::new().unwrap();
        let config = LibraryConfig::load(root.path()).unwrap();
        assert_eq!(config.variants(ComponentKind::WebPart).len(), 3);
    }

    #[test]
    fn test_load_prefers_json() {
        let root = TempDir::new().unwrap();
        std::fs::write(
            root.path().join("library.json"),
            r#"{"variants": {"library": [{"title": "Json", "value": "json"}]}}"#,
        )
        .unwrap();
        std::fs::write(
            root.path().join("library.yml"),
            "variants:\n  library:\n    - title: Yaml\n      value: yaml\n",
        )
        .unwrap();

        let config = LibraryConfig::load(root.path()).unwrap();
        assert_eq!(config.variants(ComponentKind::Library)[0].value, "json");
    }
}
