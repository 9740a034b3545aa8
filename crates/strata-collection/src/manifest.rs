use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use strata_catalog::{LinkRule, TraitMeta, TraitRef, TraitSpec};
use strata_entropy::Environment;
use strata_store::BlobStore;
use strata_types::AccountId;
use tracing::debug;

use crate::collection::Collection;
use crate::config::CollectionConfig;
use crate::error::{CollectionError, CollectionResult};

/// A whole collection described in TOML: settings, layers and links.
///
/// ```toml
/// [collection]
/// name = "Pixels"
/// capacity = 100
///
/// [[layers]]
/// name = "Background"
/// prime = 7
///
/// [[layers.traits]]
/// name = "Red"
/// file = "background/red.png"
/// weight = 60
///
/// [[layers.traits]]
/// name = "Crimson"
/// reuse = "0/0"
/// weight = 40
///
/// [[links]]
/// from = "1/2"
/// to = "2/0"
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionManifest {
    #[serde(default)]
    pub collection: CollectionConfig,
    #[serde(default)]
    pub layers: Vec<LayerManifest>,
    #[serde(default)]
    pub links: Vec<LinkManifest>,
    /// Directory trait files are resolved against.
    #[serde(skip)]
    pub base_dir: PathBuf,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerManifest {
    pub name: String,
    pub prime: u64,
    #[serde(default)]
    pub traits: Vec<TraitManifest>,
}

/// One trait; exactly one of `file` and `reuse` must be set.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraitManifest {
    pub name: String,
    pub weight: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
    /// `"<layer>/<slot>"` of an earlier trait whose artwork is shared.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reuse: Option<String>,
    /// Defaults to a guess from the file extension, or the reused trait's.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub hidden: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkManifest {
    pub from: String,
    pub to: String,
}

impl CollectionManifest {
    pub fn from_toml_str(content: &str) -> CollectionResult<Self> {
        toml::from_str(content).map_err(|e| CollectionError::Manifest(e.to_string()))
    }

    /// Read a manifest; trait files resolve relative to its directory.
    pub fn load(path: impl AsRef<Path>) -> CollectionResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let mut manifest = Self::from_toml_str(&content)?;
        manifest.base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        Ok(manifest)
    }

    /// Create the collection and apply every layer, trait and link.
    pub fn build(
        &self,
        operator: AccountId,
        store: Arc<dyn BlobStore>,
        environment: Arc<dyn Environment>,
    ) -> CollectionResult<Collection> {
        let mut collection =
            Collection::new(self.collection.clone(), operator.clone(), store, environment)?;

        for (index, layer) in self.layers.iter().enumerate() {
            collection.set_layer(&operator, index, layer.name.clone(), layer.prime, Vec::new())?;
            for (slot, entry) in layer.traits.iter().enumerate() {
                self.apply_trait(&mut collection, &operator, index, slot, entry)?;
            }
        }

        for link in &self.links {
            let from = parse_trait_ref(&link.from)?;
            let to = parse_trait_ref(&link.to)?;
            collection.set_link(&operator, from, LinkRule::new(to.layer, to.slot))?;
        }

        debug!(
            layers = self.layers.len(),
            links = self.links.len(),
            version = collection.catalog().version(),
            "manifest applied"
        );
        Ok(collection)
    }

    fn apply_trait(
        &self,
        collection: &mut Collection,
        operator: &AccountId,
        layer: usize,
        slot: usize,
        entry: &TraitManifest,
    ) -> CollectionResult<()> {
        match (&entry.file, &entry.reuse) {
            (Some(file), None) => {
                let path = self.base_dir.join(file);
                let data = std::fs::read(&path)?;
                let mime = entry
                    .mime_type
                    .clone()
                    .unwrap_or_else(|| guess_mime(&path).to_string());
                let meta = trait_meta(entry, mime);
                collection.set_trait(operator, layer, slot, TraitSpec::new(meta, data))
            }
            (None, Some(source)) => {
                let source = parse_trait_ref(source)?;
                let mime = match &entry.mime_type {
                    Some(mime) => mime.clone(),
                    None => collection
                        .catalog()
                        .trait_at(source)
                        .map(|t| t.mime_type.clone())
                        .ok_or_else(|| {
                            CollectionError::Manifest(format!(
                                "{}: reused trait {source} does not exist yet",
                                entry.name
                            ))
                        })?,
                };
                let meta = trait_meta(entry, mime);
                collection.reuse_trait_data(operator, layer, slot, meta, source)
            }
            _ => Err(CollectionError::Manifest(format!(
                "{}: set exactly one of `file` and `reuse`",
                entry.name
            ))),
        }
    }
}

fn trait_meta(entry: &TraitManifest, mime: String) -> TraitMeta {
    let meta = TraitMeta::new(entry.name.clone(), mime, entry.weight);
    if entry.hidden {
        meta.hidden()
    } else {
        meta
    }
}

/// Parse `"<layer>/<slot>"`.
pub fn parse_trait_ref(s: &str) -> CollectionResult<TraitRef> {
    let invalid = || {
        CollectionError::Manifest(format!(
            "invalid trait reference `{s}`, expected <layer>/<slot>"
        ))
    };
    let (layer, slot) = s.split_once('/').ok_or_else(invalid)?;
    let layer = layer.trim().parse().map_err(|_| invalid())?;
    let slot = slot.trim().parse().map_err(|_| invalid())?;
    Ok(TraitRef::new(layer, slot))
}

fn guess_mime(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("webp") => "image/webp",
        Some("svg") => "image/svg+xml",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use std::fs;
    use strata_entropy::FixedEnvironment;
    use strata_store::InMemoryBlobStore;
    use strata_types::ItemId;

    const MANIFEST: &str = r#"
[collection]
name = "Pixels"
capacity = 20
placeholder_image = "ipfs://hidden.png"

[[layers]]
name = "Background"
prime = 7

[[layers.traits]]
name = "Red"
file = "bg/red.png"
weight = 12

[[layers.traits]]
name = "Crimson"
reuse = "0/0"
weight = 8

[[layers]]
name = "Eyes"
prime = 11

[[layers.traits]]
name = "Open"
file = "eyes/open.svg"
weight = 20

[[layers.traits]]
name = "Laser"
file = "eyes/laser.svg"
weight = 0
hidden = true

[[links]]
from = "0/1"
to = "1/1"
"#;

    fn write_fixture() -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("bg")).unwrap();
        fs::create_dir_all(dir.path().join("eyes")).unwrap();
        fs::write(dir.path().join("bg/red.png"), b"red-bytes").unwrap();
        fs::write(dir.path().join("eyes/open.svg"), b"<svg/>").unwrap();
        fs::write(dir.path().join("eyes/laser.svg"), b"<svg>laser</svg>").unwrap();
        let path = dir.path().join("strata.toml");
        fs::write(&path, MANIFEST).unwrap();
        (dir, path)
    }

    fn build(manifest: &CollectionManifest) -> CollectionResult<Collection> {
        manifest.build(
            AccountId::derive("operator"),
            Arc::new(InMemoryBlobStore::new()),
            Arc::new(FixedEnvironment::from_seed(5)),
        )
    }

    #[test]
    fn load_and_build() {
        let (_dir, path) = write_fixture();
        let manifest = CollectionManifest::load(&path).unwrap();
        assert_eq!(manifest.collection.name, "Pixels");
        assert_eq!(manifest.layers.len(), 2);

        let c = build(&manifest).unwrap();
        let catalog = c.catalog();
        assert_eq!(catalog.layer_count(), 2);

        let red = catalog.trait_at(TraitRef::new(0, 0)).unwrap();
        let crimson = catalog.trait_at(TraitRef::new(0, 1)).unwrap();
        assert_eq!(red.blob, crimson.blob);
        assert_eq!(crimson.mime_type, "image/png");
        assert_eq!(crimson.weight, 8);

        let laser = catalog.trait_at(TraitRef::new(1, 1)).unwrap();
        assert_eq!(laser.mime_type, "image/svg+xml");
        assert!(laser.hidden);

        assert_eq!(
            catalog.link(TraitRef::new(0, 1)),
            Some(&LinkRule::new(1, 1))
        );
        assert!(!c.is_revealed());
    }

    #[test]
    fn built_collection_mints_and_renders() {
        let (_dir, path) = write_fixture();
        let mut c = build(&CollectionManifest::load(&path).unwrap()).unwrap();
        let op = AccountId::derive("operator");
        c.on_create(&op, &op, 20).unwrap();
        c.reveal(&op).unwrap();
        for i in 0..20 {
            let v = c.traits_of(ItemId(i)).unwrap();
            // Crimson forces the hidden laser eyes.
            if v.get(0) == Some(1) {
                assert_eq!(v.get(1), Some(1));
                assert_eq!(
                    c.render_attributes(ItemId(i)).unwrap(),
                    r#"[{"trait_type":"Background","value":"Crimson"}]"#
                );
            } else {
                assert_eq!(v.get(1), Some(0));
            }
        }
    }

    #[test]
    fn missing_file_is_storage_error() {
        let (dir, path) = write_fixture();
        fs::remove_file(dir.path().join("eyes/open.svg")).unwrap();
        let err = build(&CollectionManifest::load(&path).unwrap()).err().unwrap();
        assert_eq!(err.kind(), ErrorKind::Storage);
    }

    #[test]
    fn trait_needs_exactly_one_source() {
        let manifest = CollectionManifest::from_toml_str(
            r#"
            [collection]
            capacity = 4

            [[layers]]
            name = "Body"
            prime = 3

            [[layers.traits]]
            name = "Nothing"
            weight = 4
            "#,
        )
        .unwrap();
        let err = build(&manifest).err().unwrap();
        assert!(matches!(err, CollectionError::Manifest(_)));
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn reuse_of_later_trait_rejected() {
        let manifest = CollectionManifest::from_toml_str(
            r#"
            [[layers]]
            name = "Body"
            prime = 3

            [[layers.traits]]
            name = "Echo"
            reuse = "0/1"
            weight = 4
            "#,
        )
        .unwrap();
        assert!(matches!(build(&manifest).err().unwrap(), CollectionError::Manifest(_)));
    }

    #[test]
    fn trait_refs_parse() {
        assert_eq!(parse_trait_ref("2/5").unwrap(), TraitRef::new(2, 5));
        assert_eq!(parse_trait_ref(" 0 / 1 ").unwrap(), TraitRef::new(0, 1));
        assert!(parse_trait_ref("2").is_err());
        assert!(parse_trait_ref("a/1").is_err());
    }

    #[test]
    fn mime_guesses() {
        assert_eq!(guess_mime(Path::new("a/b.PNG")), "image/png");
        assert_eq!(guess_mime(Path::new("x.svg")), "image/svg+xml");
        assert_eq!(guess_mime(Path::new("noext")), "application/octet-stream");
    }

    #[test]
    fn malformed_manifest_rejected() {
        let err = CollectionManifest::from_toml_str("[[layers]]\nname = 3").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }
}
