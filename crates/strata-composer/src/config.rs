use serde::{Deserialize, Serialize};

/// Canvas and buffer sizing for rendering.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Canvas width in pixels.
    pub width: u32,
    /// Canvas height in pixels.
    pub height: u32,
    /// Initial capacity of the image document buffer, in bytes.
    pub image_budget: usize,
    /// Initial capacity of the attribute list buffer, in bytes.
    pub attribute_budget: usize,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 512,
            height: 512,
            image_budget: 64 * 1024,
            attribute_budget: 1024,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let c = RenderConfig::default();
        assert_eq!((c.width, c.height), (512, 512));
        assert_eq!(c.image_budget, 64 * 1024);
        assert_eq!(c.attribute_budget, 1024);
    }

    #[test]
    fn partial_json_fills_defaults() {
        let c: RenderConfig = serde_json::from_str(r#"{"width": 24, "height": 24}"#).unwrap();
        assert_eq!(c.width, 24);
        assert_eq!(c.image_budget, 64 * 1024);
    }
}
