//! Canonical image value types.
//!
//! Providers return heterogeneous payloads (inline base64 or a remote URL).
//! Every provider adapter normalizes to [`EncodedImage`] before the image
//! reaches any other component, so the rest of the pipeline only ever sees
//! one representation.

use serde::{Deserialize, Serialize};

/// A base64-encoded image with its MIME type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodedImage {
    /// MIME type (e.g., "image/png").
    pub mime_type: String,
    /// Base64-encoded image bytes.
    pub data: String,
}

impl EncodedImage {
    /// Wrap base64 data as a PNG image.
    pub fn png(data: impl Into<String>) -> Self {
        Self {
            mime_type: "image/png".to_string(),
            data: data.into(),
        }
    }

    /// Render as an RFC 2397 data URL, the form multimodal chat endpoints
    /// accept for inline images.
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.data)
    }
}

/// Image artifacts produced by the image generator.
///
/// Any field may be `None`/empty after a soft-recovered generation failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeneratedImages {
    /// Illustrative rendering of the robot design.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub concept: Option<EncodedImage>,
    /// Wiring schematic between the BOM components.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub circuit: Option<EncodedImage>,
    /// OBJ-format mesh text, when the optional 3D-model generator ran.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_3d: Option<String>,
    /// Suggested base filename for the image artifacts.
    pub suggested_filename: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_url() {
        let image = EncodedImage::png("aGVsbG8=");
        assert_eq!(image.to_data_url(), "data:image/png;base64,aGVsbG8=");
    }

    #[test]
    fn test_generated_images_default_is_all_empty() {
        let images = GeneratedImages::default();
        assert!(images.concept.is_none());
        assert!(images.circuit.is_none());
        assert!(images.model_3d.is_none());
    }

    #[test]
    fn test_serde_skips_missing_images() {
        let images = GeneratedImages {
            suggested_filename: "robot".to_string(),
            ..Default::default()
        };
        let json = serde_json::to_value(&images).unwrap();
        assert!(json.get("concept").is_none());
        assert!(json.get("circuit").is_none());
    }
}
