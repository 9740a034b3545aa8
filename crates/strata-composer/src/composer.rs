use std::fmt::Write;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use strata_catalog::{Catalog, Trait, TraitRef};
use strata_store::BlobStore;
use strata_types::TraitVector;
use tracing::debug;

use crate::config::RenderConfig;
use crate::error::{ComposeError, ComposeResult};

const SVG_PREFIX: &str = "data:image/svg+xml;base64,";
const CLOSING_STYLE: &str = "<style>image{image-rendering:-webkit-optimize-contrast;\
image-rendering:-moz-crisp-edges;image-rendering:crisp-edges;image-rendering:pixelated}</style></svg>";

/// One visible trait in an attribute list.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    pub trait_type: String,
    pub value: String,
}

/// Renders trait vectors against a catalog and the blob store.
pub struct Composer<'a> {
    catalog: &'a Catalog,
    store: &'a dyn BlobStore,
    config: &'a RenderConfig,
}

impl<'a> Composer<'a> {
    pub fn new(catalog: &'a Catalog, store: &'a dyn BlobStore, config: &'a RenderConfig) -> Self {
        Self {
            catalog,
            store,
            config,
        }
    }

    /// Layered SVG image document as a data URI.
    ///
    /// Layer 0 is drawn first (bottom-most); the last layer is on top. Every
    /// layer spans the full canvas with no aspect scaling, and the closing
    /// style pins nearest-neighbour sampling.
    pub fn render_image(&self, vector: &TraitVector) -> ComposeResult<String> {
        let traits = self.selected(vector)?;
        let mut layers = Vec::with_capacity(traits.len());
        for t in &traits {
            layers.push((t.mime_type.as_str(), self.store.fetch(&t.blob)?));
        }

        let estimate: usize = layers
            .iter()
            .map(|(mime, bytes)| encoded_len(bytes.len()) + mime.len() + 160)
            .sum::<usize>()
            + CLOSING_STYLE.len()
            + 160;
        let mut svg = String::with_capacity(self.config.image_budget.max(estimate));

        let (w, h) = (self.config.width, self.config.height);
        write!(
            svg,
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\">"
        )?;
        for (mime, bytes) in &layers {
            write!(
                svg,
                "<image x=\"0\" y=\"0\" width=\"{w}\" height=\"{h}\" preserveAspectRatio=\"none\" href=\"data:"
            )?;
            push_escaped(&mut svg, mime);
            svg.push_str(";base64,");
            STANDARD.encode_string(bytes, &mut svg);
            svg.push_str("\"/>");
        }
        svg.push_str(CLOSING_STYLE);

        let mut uri = String::with_capacity(SVG_PREFIX.len() + encoded_len(svg.len()));
        uri.push_str(SVG_PREFIX);
        STANDARD.encode_string(svg.as_bytes(), &mut uri);

        debug!(layers = layers.len(), svg_len = svg.len(), "image rendered");
        Ok(uri)
    }

    /// Visible traits of `vector`, in layer order.
    pub fn attributes(&self, vector: &TraitVector) -> ComposeResult<Vec<Attribute>> {
        let traits = self.selected(vector)?;
        Ok(self
            .catalog
            .layers()
            .iter()
            .zip(traits)
            .filter(|(_, t)| !t.hidden)
            .map(|(layer, t)| Attribute {
                trait_type: layer.name.clone(),
                value: t.name.clone(),
            })
            .collect())
    }

    /// JSON attribute list; `[]` when every trait is hidden.
    pub fn render_attributes(&self, vector: &TraitVector) -> ComposeResult<String> {
        let attributes = self.attributes(vector)?;
        let mut buf = Vec::with_capacity(self.config.attribute_budget);
        serde_json::to_writer(&mut buf, &attributes)
            .map_err(|e| ComposeError::Serialization(e.to_string()))?;
        String::from_utf8(buf).map_err(|e| ComposeError::Serialization(e.to_string()))
    }

    fn selected(&self, vector: &TraitVector) -> ComposeResult<Vec<&'a Trait>> {
        if vector.len() != self.catalog.layer_count() {
            return Err(ComposeError::VectorLength {
                expected: self.catalog.layer_count(),
                actual: vector.len(),
            });
        }
        vector
            .iter()
            .map(|(layer, slot)| {
                self.catalog
                    .trait_at(TraitRef::new(layer, slot))
                    .ok_or(ComposeError::UnknownTrait { layer, slot })
            })
            .collect()
    }
}

/// Base64 output length for `n` input bytes (padded).
fn encoded_len(n: usize) -> usize {
    n.div_ceil(3) * 4
}

fn push_escaped(out: &mut String, s: &str) {
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_catalog::{TraitMeta, TraitSpec};
    use strata_store::InMemoryBlobStore;
    use strata_types::{CollectionState, RevealMode};

    fn fixture(hidden_eyes: bool) -> (Catalog, InMemoryBlobStore) {
        let state = CollectionState::new(10, RevealMode::Delayed).unwrap();
        let store = InMemoryBlobStore::new();
        let mut catalog = Catalog::new();
        let eyes = if hidden_eyes {
            TraitMeta::new("Open", "image/png", 10).hidden()
        } else {
            TraitMeta::new("Open", "image/png", 10)
        };
        catalog
            .set_layer(
                &state,
                &store,
                0,
                "Background",
                7,
                vec![
                    TraitSpec::new(TraitMeta::new("Red", "image/png", 5), b"RED".to_vec()),
                    TraitSpec::new(TraitMeta::new("Blue", "image/png", 5), b"BLUE".to_vec()),
                ],
            )
            .unwrap();
        catalog
            .set_layer(&state, &store, 1, "Eyes", 11, vec![TraitSpec::new(eyes, b"EYES".to_vec())])
            .unwrap();
        (catalog, store)
    }

    fn decode_svg(uri: &str) -> String {
        let payload = uri.strip_prefix(SVG_PREFIX).expect("svg data uri");
        String::from_utf8(STANDARD.decode(payload).unwrap()).unwrap()
    }

    // -----------------------------------------------------------------------
    // Image document
    // -----------------------------------------------------------------------

    #[test]
    fn image_stacks_layers_bottom_to_top() {
        let (catalog, store) = fixture(false);
        let config = RenderConfig::default();
        let composer = Composer::new(&catalog, &store, &config);

        let uri = composer.render_image(&TraitVector::new(vec![1, 0])).unwrap();
        let svg = decode_svg(&uri);

        let blue = format!("data:image/png;base64,{}", STANDARD.encode(b"BLUE"));
        let eyes = format!("data:image/png;base64,{}", STANDARD.encode(b"EYES"));
        let blue_at = svg.find(&blue).expect("background layer present");
        let eyes_at = svg.find(&eyes).expect("eyes layer present");
        assert!(blue_at < eyes_at);
        assert!(!svg.contains(&STANDARD.encode(b"RED")));
        assert!(svg.starts_with("<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"512\""));
        assert!(svg.ends_with(CLOSING_STYLE));
        assert_eq!(svg.matches("<image ").count(), 2);
    }

    #[test]
    fn image_is_byte_stable() {
        let (catalog, store) = fixture(false);
        let config = RenderConfig::default();
        let composer = Composer::new(&catalog, &store, &config);
        let v = TraitVector::new(vec![0, 0]);
        assert_eq!(composer.render_image(&v).unwrap(), composer.render_image(&v).unwrap());
    }

    #[test]
    fn hidden_traits_are_still_rendered() {
        let (catalog, store) = fixture(true);
        let config = RenderConfig::default();
        let composer = Composer::new(&catalog, &store, &config);
        let svg = decode_svg(&composer.render_image(&TraitVector::new(vec![0, 0])).unwrap());
        assert!(svg.contains(&STANDARD.encode(b"EYES")));
    }

    #[test]
    fn canvas_size_follows_config() {
        let (catalog, store) = fixture(false);
        let config = RenderConfig {
            width: 24,
            height: 32,
            ..RenderConfig::default()
        };
        let composer = Composer::new(&catalog, &store, &config);
        let svg = decode_svg(&composer.render_image(&TraitVector::new(vec![0, 0])).unwrap());
        assert!(svg.contains("viewBox=\"0 0 24 32\""));
    }

    #[test]
    fn wrong_vector_length_rejected() {
        let (catalog, store) = fixture(false);
        let config = RenderConfig::default();
        let composer = Composer::new(&catalog, &store, &config);
        assert!(matches!(
            composer.render_image(&TraitVector::new(vec![0])),
            Err(ComposeError::VectorLength {
                expected: 2,
                actual: 1
            })
        ));
    }

    #[test]
    fn unknown_slot_rejected() {
        let (catalog, store) = fixture(false);
        let config = RenderConfig::default();
        let composer = Composer::new(&catalog, &store, &config);
        assert!(matches!(
            composer.render_attributes(&TraitVector::new(vec![0, 4])),
            Err(ComposeError::UnknownTrait { layer: 1, slot: 4 })
        ));
    }

    #[test]
    fn missing_blob_surfaces_store_error() {
        let (catalog, _) = fixture(false);
        let empty = InMemoryBlobStore::new();
        let config = RenderConfig::default();
        let composer = Composer::new(&catalog, &empty, &config);
        assert!(matches!(
            composer.render_image(&TraitVector::new(vec![0, 0])),
            Err(ComposeError::Store(_))
        ));
    }

    // -----------------------------------------------------------------------
    // Attribute list
    // -----------------------------------------------------------------------

    #[test]
    fn attributes_in_layer_order() {
        let (catalog, store) = fixture(false);
        let config = RenderConfig::default();
        let composer = Composer::new(&catalog, &store, &config);
        let json = composer.render_attributes(&TraitVector::new(vec![1, 0])).unwrap();
        assert_eq!(
            json,
            r#"[{"trait_type":"Background","value":"Blue"},{"trait_type":"Eyes","value":"Open"}]"#
        );
    }

    #[test]
    fn hidden_traits_are_omitted() {
        let (catalog, store) = fixture(true);
        let config = RenderConfig::default();
        let composer = Composer::new(&catalog, &store, &config);
        let json = composer.render_attributes(&TraitVector::new(vec![0, 0])).unwrap();
        assert_eq!(json, r#"[{"trait_type":"Background","value":"Red"}]"#);
    }

    #[test]
    fn all_hidden_is_empty_list() {
        let state = CollectionState::new(10, RevealMode::Delayed).unwrap();
        let store = InMemoryBlobStore::new();
        let mut catalog = Catalog::new();
        catalog
            .set_layer(
                &state,
                &store,
                0,
                "Aura",
                3,
                vec![TraitSpec::new(
                    TraitMeta::new("Glow", "image/png", 10).hidden(),
                    b"glow".to_vec(),
                )],
            )
            .unwrap();
        let config = RenderConfig::default();
        let composer = Composer::new(&catalog, &store, &config);
        assert_eq!(
            composer.render_attributes(&TraitVector::new(vec![0])).unwrap(),
            "[]"
        );
    }

    #[test]
    fn names_are_json_escaped() {
        let state = CollectionState::new(10, RevealMode::Delayed).unwrap();
        let store = InMemoryBlobStore::new();
        let mut catalog = Catalog::new();
        catalog
            .set_layer(
                &state,
                &store,
                0,
                "Quote \"Layer\"",
                3,
                vec![TraitSpec::new(
                    TraitMeta::new("Back\\slash", "image/png", 10),
                    b"x".to_vec(),
                )],
            )
            .unwrap();
        let config = RenderConfig::default();
        let composer = Composer::new(&catalog, &store, &config);
        let json = composer.render_attributes(&TraitVector::new(vec![0])).unwrap();
        assert_eq!(
            json,
            r#"[{"trait_type":"Quote \"Layer\"","value":"Back\\slash"}]"#
        );
    }

    #[test]
    fn encoded_len_matches_base64() {
        for n in 0..20 {
            assert_eq!(encoded_len(n), STANDARD.encode(vec![0u8; n]).len());
        }
    }

    #[test]
    fn escaping_mime_types() {
        let mut out = String::new();
        push_escaped(&mut out, "image/svg+xml\"><script>");
        assert_eq!(out, "image/svg+xml&quot;&gt;&lt;script&gt;");
    }
}
