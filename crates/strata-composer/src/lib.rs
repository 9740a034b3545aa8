//! Rendering for Strata.
//!
//! A trait vector becomes two artifacts:
//!
//! - an **image document**: an SVG stacking each layer's artwork bottom to
//!   top, wrapped as a `data:image/svg+xml;base64,` URI;
//! - an **attribute list**: a JSON array of `{"trait_type", "value"}` for
//!   every visible trait, in layer order.
//!
//! Both are written straight into pre-sized buffers; nothing is parsed back.
//! [`MetadataDocument`] combines them into the per-item JSON document.

pub mod composer;
pub mod config;
pub mod error;
pub mod metadata;

pub use composer::{Attribute, Composer};
pub use config::RenderConfig;
pub use error::{ComposeError, ComposeResult};
pub use metadata::{data_uri, MetadataDocument};
