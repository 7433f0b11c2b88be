//! Result packager.
//!
//! Serializes a completed [`ProjectResult`] into one in-memory ZIP archive
//! with exactly five top-level entries, regardless of which generator
//! outputs were empty:
//!
//! - `project_description.txt`
//! - `bill_of_materials.csv` (with a computed total row)
//! - `code.py` / `code.cpp` (extension chosen by platform)
//! - `assembly_instructions.md`
//! - `images/` (concept + circuit diagram; a static placeholder PNG stands
//!   in for any image whose generation failed, and `model.obj` is added
//!   when the 3D model ran)

use std::io::{Cursor, Write};

use base64::Engine;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

use robokit_types::error::PackageError;
use robokit_types::project::{bom_total, BomItem, ProjectResult};

/// Download filename for the archive.
pub const ARCHIVE_NAME: &str = "robokit_project.zip";

/// 1x1 transparent PNG used when an image generation came back empty.
const PLACEHOLDER_PNG: &[u8] = &[
    0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44,
    0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1F,
    0x15, 0xC4, 0x89, 0x00, 0x00, 0x00, 0x0A, 0x49, 0x44, 0x41, 0x54, 0x78, 0x9C, 0x63, 0x00,
    0x01, 0x00, 0x00, 0x05, 0x00, 0x01, 0x0D, 0x0A, 0x2D, 0xB4, 0x00, 0x00, 0x00, 0x00, 0x49,
    0x45, 0x4E, 0x44, 0xAE, 0x42, 0x60, 0x82,
];

/// Build the downloadable archive for a completed pipeline run.
pub fn package_result(result: &ProjectResult) -> Result<Vec<u8>, PackageError> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();

    write_entry(
        &mut writer,
        "project_description.txt",
        result.description.as_bytes(),
        options,
    )?;
    write_entry(
        &mut writer,
        "bill_of_materials.csv",
        &render_bom_csv(&result.bill_of_materials)?,
        options,
    )?;
    write_entry(
        &mut writer,
        &format!("code.{}", result.platform.code_extension()),
        result.code.source.as_bytes(),
        options,
    )?;
    write_entry(
        &mut writer,
        "assembly_instructions.md",
        result.instructions.text.as_bytes(),
        options,
    )?;

    writer
        .add_directory("images/", options)
        .map_err(|e| PackageError::Zip(e.to_string()))?;
    write_entry(
        &mut writer,
        "images/concept.png",
        &image_bytes(result.images.concept.as_ref().map(|i| i.data.as_str()))?,
        options,
    )?;
    write_entry(
        &mut writer,
        "images/circuit_diagram.png",
        &image_bytes(result.images.circuit.as_ref().map(|i| i.data.as_str()))?,
        options,
    )?;
    if let Some(obj) = &result.images.model_3d {
        write_entry(&mut writer, "images/model.obj", obj.as_bytes(), options)?;
    }

    let cursor = writer
        .finish()
        .map_err(|e| PackageError::Zip(e.to_string()))?;
    Ok(cursor.into_inner())
}

fn write_entry(
    writer: &mut ZipWriter<Cursor<Vec<u8>>>,
    name: &str,
    bytes: &[u8],
    options: SimpleFileOptions,
) -> Result<(), PackageError> {
    writer
        .start_file(name, options)
        .map_err(|e| PackageError::Zip(e.to_string()))?;
    writer
        .write_all(bytes)
        .map_err(|e| PackageError::Zip(e.to_string()))?;
    Ok(())
}

/// Decode generated image data, or fall back to the placeholder.
fn image_bytes(data: Option<&str>) -> Result<Vec<u8>, PackageError> {
    match data {
        Some(b64) => base64::engine::general_purpose::STANDARD
            .decode(b64)
            .map_err(|e| PackageError::InvalidImage(e.to_string())),
        None => Ok(PLACEHOLDER_PNG.to_vec()),
    }
}

/// Render the BOM as CSV with a line-total column and a final total row.
fn render_bom_csv(items: &[BomItem]) -> Result<Vec<u8>, PackageError> {
    let mut csv_writer = csv::Writer::from_writer(Vec::new());
    csv_writer
        .write_record([
            "Component",
            "Description",
            "Quantity",
            "Purchase Link",
            "Unit Price (USD)",
            "Line Total (USD)",
        ])
        .map_err(|e| PackageError::Csv(e.to_string()))?;

    for item in items {
        csv_writer
            .write_record([
                item.component_name.as_str(),
                item.description.as_str(),
                &item.quantity.to_string(),
                item.purchase_link.as_str(),
                &format!("{:.2}", item.unit_price),
                &format!("{:.2}", item.line_total()),
            ])
            .map_err(|e| PackageError::Csv(e.to_string()))?;
    }

    csv_writer
        .write_record(["Total", "", "", "", "", &format!("{:.2}", bom_total(items))])
        .map_err(|e| PackageError::Csv(e.to_string()))?;

    csv_writer
        .into_inner()
        .map_err(|e| PackageError::Csv(e.to_string()))
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;
    use std::io::Read;

    use robokit_types::image::{EncodedImage, GeneratedImages};
    use robokit_types::project::{
        AssemblyInstructions, GeneratedCode, InstructionFormat, Platform,
    };

    use super::*;

    fn sample_result(platform: Platform, images: GeneratedImages) -> ProjectResult {
        ProjectResult {
            platform,
            description: "A line-following robot.".to_string(),
            bill_of_materials: vec![
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
            ],
            code: GeneratedCode {
                source: "while True: pass".to_string(),
                language: platform.code_language(),
            },
            images,
            instructions: AssemblyInstructions {
                text: "## Overview".to_string(),
                format: InstructionFormat::Markdown,
            },
        }
    }

    fn top_level_entries(bytes: &[u8]) -> BTreeSet<String> {
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes.to_vec())).unwrap();
        let mut entries = BTreeSet::new();
        for i in 0..archive.len() {
            let name = archive.by_index(i).unwrap().name().to_string();
            let top = match name.split_once('/') {
                Some((dir, _)) => format!("{dir}/"),
                None => name,
            };
            entries.insert(top);
        }
        entries
    }

    fn read_entry(bytes: &[u8], name: &str) -> Vec<u8> {
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes.to_vec())).unwrap();
        let mut file = archive.by_name(name).unwrap();
        let mut content = Vec::new();
        file.read_to_end(&mut content).unwrap();
        content
    }

    #[test]
    fn test_archive_has_exactly_five_top_level_entries() {
        let bytes =
            package_result(&sample_result(Platform::RaspberryPi, GeneratedImages::default()))
                .unwrap();
        let entries = top_level_entries(&bytes);
        let expected: BTreeSet<String> = [
            "project_description.txt",
            "bill_of_materials.csv",
            "code.py",
            "assembly_instructions.md",
            "images/",
        ]
        .into_iter()
        .map(String::from)
        .collect();
        assert_eq!(entries, expected);
    }

    #[test]
    fn test_five_entries_even_when_everything_generated() {
        let images = GeneratedImages {
            concept: Some(EncodedImage::png(
                base64::engine::general_purpose::STANDARD.encode([1u8, 2, 3]),
            )),
            circuit: Some(EncodedImage::png(
                base64::engine::general_purpose::STANDARD.encode([4u8, 5]),
            )),
            model_3d: Some("v 0 0 0".to_string()),
            suggested_filename: "robot".to_string(),
        };
        let bytes = package_result(&sample_result(Platform::Arduino, images)).unwrap();
        assert_eq!(top_level_entries(&bytes).len(), 5);
        assert_eq!(read_entry(&bytes, "images/concept.png"), vec![1, 2, 3]);
        assert_eq!(read_entry(&bytes, "images/model.obj"), b"v 0 0 0");
    }

    #[test]
    fn test_code_extension_follows_platform() {
        let bytes =
            package_result(&sample_result(Platform::Arduino, GeneratedImages::default()))
                .unwrap();
        assert!(top_level_entries(&bytes).contains("code.cpp"));

        let bytes =
            package_result(&sample_result(Platform::MicroBit, GeneratedImages::default()))
                .unwrap();
        assert!(top_level_entries(&bytes).contains("code.cpp"));
    }

    #[test]
    fn test_missing_images_become_placeholders() {
        let bytes =
            package_result(&sample_result(Platform::Arduino, GeneratedImages::default()))
                .unwrap();
        assert_eq!(read_entry(&bytes, "images/concept.png"), PLACEHOLDER_PNG);
        assert_eq!(
            read_entry(&bytes, "images/circuit_diagram.png"),
            PLACEHOLDER_PNG
        );
    }

    #[test]
    fn test_bom_csv_total_row() {
        let bytes =
            package_result(&sample_result(Platform::Arduino, GeneratedImages::default()))
                .unwrap();
        let csv_text = String::from_utf8(read_entry(&bytes, "bill_of_materials.csv")).unwrap();
        // 4 x 3.95 + 2 x 12.95
        assert!(csv_text.contains("41.70"));
        assert!(csv_text.lines().last().unwrap().starts_with("Total"));
        assert!(csv_text.contains("Servo SG90"));
    }

    #[test]
    fn test_empty_bom_still_produces_csv_with_zero_total() {
        let mut result = sample_result(Platform::Arduino, GeneratedImages::default());
        result.bill_of_materials.clear();
        let bytes = package_result(&result).unwrap();
        let csv_text = String::from_utf8(read_entry(&bytes, "bill_of_materials.csv")).unwrap();
        assert!(csv_text.contains("0.00"));
    }

    #[test]
    fn test_invalid_base64_is_typed_error() {
        let images = GeneratedImages {
            concept: Some(EncodedImage::png("!!! not base64 !!!")),
            ..Default::default()
        };
        let err = package_result(&sample_result(Platform::Arduino, images)).unwrap_err();
        assert!(matches!(err, PackageError::InvalidImage(_)));
    }

    #[test]
    fn test_placeholder_is_a_png() {
        assert_eq!(&PLACEHOLDER_PNG[..8], &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]);
    }
}
