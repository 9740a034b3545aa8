use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::composer::Attribute;
use crate::error::{ComposeError, ComposeResult};

/// Per-item metadata document.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataDocument {
    pub name: String,
    pub description: String,
    pub image: String,
    pub attributes: Vec<Attribute>,
}

impl MetadataDocument {
    /// Document for an item that is not yet revealed: placeholder image and
    /// no attributes.
    pub fn placeholder(name: String, description: String, image: String) -> Self {
        Self {
            name,
            description,
            image,
            attributes: Vec::new(),
        }
    }

    pub fn to_json(&self) -> ComposeResult<String> {
        serde_json::to_string(self).map_err(|e| ComposeError::Serialization(e.to_string()))
    }

    /// The document as an `application/json` data URI.
    pub fn to_data_uri(&self) -> ComposeResult<String> {
        Ok(data_uri("application/json", self.to_json()?.as_bytes()))
    }
}

/// `data:<mime>;base64,<payload>`.
pub fn data_uri(mime: &str, bytes: &[u8]) -> String {
    let mut uri = String::with_capacity(mime.len() + 13 + bytes.len().div_ceil(3) * 4);
    uri.push_str("data:");
    uri.push_str(mime);
    uri.push_str(";base64,");
    STANDARD.encode_string(bytes, &mut uri);
    uri
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_uri_format() {
        assert_eq!(data_uri("text/plain", b"hi"), "data:text/plain;base64,aGk=");
        assert_eq!(data_uri("application/json", b""), "data:application/json;base64,");
    }

    #[test]
    fn placeholder_has_no_attributes() {
        let doc = MetadataDocument::placeholder(
            "Strata #4".into(),
            "Layers".into(),
            "ipfs://hidden.png".into(),
        );
        assert_eq!(
            doc.to_json().unwrap(),
            r#"{"name":"Strata #4","description":"Layers","image":"ipfs://hidden.png","attributes":[]}"#
        );
    }

    #[test]
    fn data_uri_round_trips_json() {
        let doc = MetadataDocument {
            name: "Strata #0".into(),
            description: String::new(),
            image: "data:image/svg+xml;base64,PHN2Zz4=".into(),
            attributes: vec![Attribute {
                trait_type: "Eyes".into(),
                value: "Open".into(),
            }],
        };
        let uri = doc.to_data_uri().unwrap();
        let payload = uri.strip_prefix("data:application/json;base64,").unwrap();
        let decoded: MetadataDocument =
            serde_json::from_slice(&STANDARD.decode(payload).unwrap()).unwrap();
        assert_eq!(decoded, doc);
    }
}
