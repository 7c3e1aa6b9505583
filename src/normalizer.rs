use std::sync::Arc;

use futures::future::BoxFuture;
use image::DynamicImage;
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;

use crate::geometry::Quad;

/// Output color mode for perspective-corrected documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    Binary,
    Gray,
    Color,
}

impl ColorMode {
    fn wire_name(&self) -> &'static str {
        match self {
            ColorMode::Binary => "ICM_BINARY",
            ColorMode::Gray => "ICM_GRAYSCALE",
            ColorMode::Color => "ICM_COLOUR",
        }
    }
}

/// The runtime settings document selecting a color mode, in the normalizer's
/// native JSON template format.
pub fn runtime_template(mode: ColorMode) -> String {
    json!({
        "GlobalParameter": {
            "Name": "GP",
            "MaxTotalImageDimension": 0,
        },
        "ImageParameterArray": [{
            "Name": "IP-1",
            "NormalizerParameterName": "NP-1",
            "BaseImageParameterName": "",
        }],
        "NormalizerParameterArray": [{
            "Name": "NP-1",
            "ContentType": "CT_DOCUMENT",
            "ColourMode": mode.wire_name(),
        }],
    })
    .to_string()
}

#[derive(Debug, Error)]
pub enum NormalizeError {
    /// The host environment has no document normalizer at all. This is the
    /// error surfaced when a perspective export is requested without the
    /// capability being present (as opposed to present but uninitialized,
    /// which is handled by lazy instance creation).
    #[error("document normalizer is not available in this environment")]
    Unavailable,
    #[error("failed to create normalizer instance: {0}")]
    CreateInstance(String),
    #[error("normalizer rejected runtime settings: {0}")]
    InvalidSettings(String),
    #[error("normalize call failed: {0}")]
    Failed(String),
    #[error("quad detection failed: {0}")]
    DetectFailed(String),
}

/// Capability handle for the external document-normalization service.
///
/// Injected by the host instead of looked up from some ambient global, so
/// absence is a normal, testable state. Implementations wrap whatever engine
/// the host links in; this crate only drives the calls.
pub trait DocumentNormalizer: Send + Sync {
    /// Create a working instance. Called lazily on the first perspective
    /// export; `license` is applied if the engine is not licensed yet.
    fn create_instance(
        &self,
        license: Option<&str>,
    ) -> BoxFuture<'static, Result<Arc<dyn NormalizerInstance>, NormalizeError>>;
}

/// A live normalizer instance.
pub trait NormalizerInstance: Send + Sync {
    /// Push a runtime settings template (see [`runtime_template`]).
    fn set_runtime_settings(&self, template: &str) -> Result<(), NormalizeError>;

    /// Perspective-correct the region of `image` enclosed by `quad` into a
    /// rectangular document image.
    fn normalize(
        &self,
        image: &DynamicImage,
        quad: Quad,
    ) -> BoxFuture<'_, Result<DynamicImage, NormalizeError>>;

    /// Detect candidate document boundaries in `image`, best first. Used to
    /// auto-suggest an initial quad.
    fn detect_quad(&self, image: &DynamicImage) -> BoxFuture<'_, Result<Vec<Quad>, NormalizeError>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn template_carries_the_color_mode() {
        let template = runtime_template(ColorMode::Gray);
        let parsed: serde_json::Value = serde_json::from_str(&template).unwrap();
        assert_eq!(
            parsed["NormalizerParameterArray"][0]["ColourMode"],
            "ICM_GRAYSCALE"
        );
        assert_eq!(
            parsed["NormalizerParameterArray"][0]["ContentType"],
            "CT_DOCUMENT"
        );
    }
}
