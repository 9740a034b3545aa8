use std::path::Path;

use serde::{Deserialize, Serialize};
use strata_composer::RenderConfig;
use strata_types::RevealMode;

use crate::error::{CollectionError, CollectionResult};

/// Static settings of one collection.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectionConfig {
    /// Display name; item names are `"<name> #<item>"`.
    pub name: String,
    pub description: String,
    /// Number of items, and of identifiers in the pool.
    pub capacity: u64,
    /// Image shown for every item until reveal. Configuring one selects
    /// delayed reveal; leaving it unset reveals at construction.
    pub placeholder_image: Option<String>,
    /// Prefix for off-chain token URIs.
    pub base_uri: Option<String>,
    /// Refuse creation while any layer's weights undersum the capacity, and
    /// check every catalog write once creation has begun.
    pub strict_weights: bool,
    pub render: RenderConfig,
}

impl Default for CollectionConfig {
    fn default() -> Self {
        Self {
            name: "Strata".into(),
            description: String::new(),
            capacity: 10_000,
            placeholder_image: None,
            base_uri: None,
            strict_weights: false,
            render: RenderConfig::default(),
        }
    }
}

impl CollectionConfig {
    pub fn from_toml_str(content: &str) -> CollectionResult<Self> {
        toml::from_str(content).map_err(|e| CollectionError::Config(e.to_string()))
    }

    pub fn load(path: impl AsRef<Path>) -> CollectionResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn to_toml(&self) -> CollectionResult<String> {
        toml::to_string_pretty(self).map_err(|e| CollectionError::Config(e.to_string()))
    }

    pub fn reveal_mode(&self) -> RevealMode {
        if self.placeholder_image.is_some() {
            RevealMode::Delayed
        } else {
            RevealMode::Immediate
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn default_config() {
        let c = CollectionConfig::default();
        assert_eq!(c.capacity, 10_000);
        assert!(!c.strict_weights);
        assert_eq!(c.reveal_mode(), RevealMode::Immediate);
    }

    #[test]
    fn placeholder_selects_delayed_reveal() {
        let c = CollectionConfig {
            placeholder_image: Some("ipfs://hidden".into()),
            ..CollectionConfig::default()
        };
        assert_eq!(c.reveal_mode(), RevealMode::Delayed);
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let c = CollectionConfig::from_toml_str(
            r#"
            name = "Pixels"
            capacity = 64

            [render]
            width = 24
            "#,
        )
        .unwrap();
        assert_eq!(c.name, "Pixels");
        assert_eq!(c.capacity, 64);
        assert_eq!(c.render.width, 24);
        assert_eq!(c.render.height, 512);
        assert!(c.base_uri.is_none());
    }

    #[test]
    fn toml_roundtrip() {
        let c = CollectionConfig {
            base_uri: Some("https://example.org/meta/".into()),
            strict_weights: true,
            ..CollectionConfig::default()
        };
        let parsed = CollectionConfig::from_toml_str(&c.to_toml().unwrap()).unwrap();
        assert_eq!(parsed, c);
    }

    #[test]
    fn malformed_toml_is_invalid_input() {
        let err = CollectionConfig::from_toml_str("capacity = \"many\"").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("collection.toml");
        std::fs::write(&path, "name = \"Tiny\"\ncapacity = 3\n").unwrap();
        let c = CollectionConfig::load(&path).unwrap();
        assert_eq!(c.capacity, 3);
    }

    #[test]
    fn load_missing_file_is_storage_error() {
        let err = CollectionConfig::load("/nonexistent/strata.toml").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Storage);
    }
}
