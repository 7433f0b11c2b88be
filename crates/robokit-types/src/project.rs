//! Project request and result types for the Robokit pipeline.
//!
//! A [`ProjectRequest`] is created once per user submission and is immutable.
//! The pipeline assembles a [`ProjectResult`] in memory; nothing is persisted.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::image::{EncodedImage, GeneratedImages};

/// Minimum accepted length for a project description, in characters.
pub const MIN_DESCRIPTION_LEN: usize = 10;

/// Maximum accepted length for a project description, in characters.
pub const MAX_DESCRIPTION_LEN: usize = 500;

/// Target hardware platform for the generated control code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    RaspberryPi,
    Arduino,
    MicroBit,
}

impl Platform {
    /// Language the control code is generated in for this platform.
    pub fn code_language(&self) -> CodeLanguage {
        match self {
            Platform::RaspberryPi => CodeLanguage::Python,
            Platform::Arduino | Platform::MicroBit => CodeLanguage::Cpp,
        }
    }

    /// File extension (without dot) for the packaged code file.
    pub fn code_extension(&self) -> &'static str {
        self.code_language().extension()
    }

    /// Human-readable platform name used in prompts.
    pub fn display_name(&self) -> &'static str {
        match self {
            Platform::RaspberryPi => "Raspberry Pi",
            Platform::Arduino => "Arduino",
            Platform::MicroBit => "micro:bit",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Platform::RaspberryPi => write!(f, "raspberry_pi"),
            Platform::Arduino => write!(f, "arduino"),
            Platform::MicroBit => write!(f, "micro_bit"),
        }
    }
}

impl FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace([' ', '-', ':'], "_").as_str() {
            "raspberry_pi" | "raspberrypi" => Ok(Platform::RaspberryPi),
            "arduino" => Ok(Platform::Arduino),
            "micro_bit" | "microbit" => Ok(Platform::MicroBit),
            other => Err(format!("invalid platform: '{other}'")),
        }
    }
}

/// Language of the generated control code, derived from the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CodeLanguage {
    Python,
    Cpp,
}

impl CodeLanguage {
    pub fn extension(&self) -> &'static str {
        match self {
            CodeLanguage::Python => "py",
            CodeLanguage::Cpp => "cpp",
        }
    }
}

impl fmt::Display for CodeLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CodeLanguage::Python => write!(f, "Python"),
            CodeLanguage::Cpp => write!(f, "C++"),
        }
    }
}

/// One user submission: free-text description, optional sketch, platform.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectRequest {
    /// Free-text robot description (10-500 characters).
    pub description: String,
    /// Optional sketch image to ground the description generation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<EncodedImage>,
    /// Target hardware platform.
    pub platform: Platform,
}

impl ProjectRequest {
    /// Validate the request against the submission bounds.
    ///
    /// Returns a human-readable message for the first violated bound.
    pub fn validate(&self) -> Result<(), String> {
        let len = self.description.chars().count();
        if len < MIN_DESCRIPTION_LEN {
            return Err(format!(
                "description too short: {len} characters (minimum {MIN_DESCRIPTION_LEN})"
            ));
        }
        if len > MAX_DESCRIPTION_LEN {
            return Err(format!(
                "description too long: {len} characters (maximum {MAX_DESCRIPTION_LEN})"
            ));
        }
        Ok(())
    }
}

/// A single bill-of-materials line item.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct BomItem {
    /// Component name (e.g., "Servo SG90").
    pub component_name: String,
    /// Short description of the component's role.
    pub description: String,
    /// How many of this component are needed.
    #[schemars(range(min = 1))]
    pub quantity: u32,
    /// Where to buy it.
    pub purchase_link: String,
    /// Price per unit in USD.
    #[schemars(range(min = 0.0))]
    pub unit_price: f64,
}

impl BomItem {
    /// Line total: quantity x unit price.
    pub fn line_total(&self) -> f64 {
        f64::from(self.quantity) * self.unit_price
    }
}

/// Total cost over a BOM: sum of quantity x unit price per item.
pub fn bom_total(items: &[BomItem]) -> f64 {
    items.iter().map(BomItem::line_total).sum()
}

/// Control code produced by the code generator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedCode {
    pub source: String,
    pub language: CodeLanguage,
}

/// Output format tag for assembly instructions.
///
/// Anything the model returns outside this set is coerced to `Markdown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum InstructionFormat {
    Pdf,
    Markdown,
}

impl fmt::Display for InstructionFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InstructionFormat::Pdf => write!(f, "pdf"),
            InstructionFormat::Markdown => write!(f, "markdown"),
        }
    }
}

impl FromStr for InstructionFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pdf" => Ok(InstructionFormat::Pdf),
            "markdown" | "md" => Ok(InstructionFormat::Markdown),
            other => Err(format!("invalid instruction format: '{other}'")),
        }
    }
}

/// Assembly instructions produced by the instructions generator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssemblyInstructions {
    pub text: String,
    pub format: InstructionFormat,
}

/// Aggregate result of one pipeline run.
///
/// Exists only in memory for the duration of one request; any `None` or
/// empty field reflects a soft-recovered generator failure, which is a
/// legitimate terminal state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectResult {
    pub platform: Platform,
    pub description: String,
    pub bill_of_materials: Vec<BomItem>,
    pub code: GeneratedCode,
    pub images: GeneratedImages,
    pub instructions: AssemblyInstructions,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_platform_roundtrip() {
        for platform in [Platform::RaspberryPi, Platform::Arduino, Platform::MicroBit] {
            let s = platform.to_string();
            let parsed: Platform = s.parse().unwrap();
            assert_eq!(platform, parsed);
        }
    }

    #[test]
    fn test_platform_from_display_name() {
        assert_eq!("Raspberry Pi".parse::<Platform>().unwrap(), Platform::RaspberryPi);
        assert_eq!("micro:bit".parse::<Platform>().unwrap(), Platform::MicroBit);
        assert!("commodore64".parse::<Platform>().is_err());
    }

    #[test]
    fn test_code_extension_by_platform() {
        assert_eq!(Platform::RaspberryPi.code_extension(), "py");
        assert_eq!(Platform::Arduino.code_extension(), "cpp");
        assert_eq!(Platform::MicroBit.code_extension(), "cpp");
    }

    #[test]
    fn test_request_validation_bounds() {
        let mut request = ProjectRequest {
            description: "a robot arm".to_string(),
            image: None,
            platform: Platform::Arduino,
        };
        assert!(request.validate().is_ok());

        request.description = "too short".chars().take(9).collect();
        assert!(request.validate().is_err());

        request.description = "x".repeat(501);
        assert!(request.validate().is_err());

        request.description = "x".repeat(500);
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_bom_total() {
        let items = vec![
            BomItem {
                component_name: "Servo SG90".to_string(),
                description: "Micro servo".to_string(),
                quantity: 4,
                purchase_link: "https://example.com/sg90".to_string(),
                unit_price: 3.95,
            },
            BomItem {
                component_name: "Ultrasonic sensor".to_string(),
                description: "HC-SR04".to_string(),
                quantity: 2,
                purchase_link: "https://example.com/hcsr04".to_string(),
                unit_price: 12.95,
            },
        ];
        let total = bom_total(&items);
        assert_eq!(format!("{total:.2}"), "41.70");
    }

    #[test]
    fn test_bom_total_empty() {
        assert_eq!(bom_total(&[]), 0.0);
    }

    #[test]
    fn test_instruction_format_defaults_through_fromstr() {
        assert_eq!("pdf".parse::<InstructionFormat>().unwrap(), InstructionFormat::Pdf);
        assert_eq!("md".parse::<InstructionFormat>().unwrap(), InstructionFormat::Markdown);
        assert!("docx".parse::<InstructionFormat>().is_err());
    }

    #[test]
    fn test_bom_item_serde_camel_case() {
        let item = BomItem {
            component_name: "Wheel".to_string(),
            description: "65mm rubber wheel".to_string(),
            quantity: 2,
            purchase_link: "https://example.com/wheel".to_string(),
            unit_price: 1.50,
        };
        let json = serde_json::to_value(&item).unwrap();
        assert!(json.get("componentName").is_some());
        assert!(json.get("purchaseLink").is_some());
        assert!(json.get("unitPrice").is_some());
    }
}
