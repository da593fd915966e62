//! Export strategy table: output extension -> export format + options.
//!
//! Illustrator's export call takes a format constant plus a format-specific
//! options object. This module owns the single table mapping each supported
//! output extension to that pair. Extending the supported formats means
//! adding a row here; no other module branches on extensions.
//!
//! Each row renders two ways, one per transport:
//! - COM: `com_properties()` yields (property name, value) pairs to put on
//!   the dispatched options object named by `options_prog_id()`
//! - AppleScript: `applescript_options()` yields the record body for
//!   `export ... with options {...}`

use crate::types::BridgeError;

/// Output formats Illustrator can export to through this bridge.
///
/// The discriminants match Illustrator's `ExportType` automation constants
/// (aiJPEG = 1, aiPhotoshop = 2, aiSVG = 3, aiPNG24 = 5, aiTIFF = 9).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Jpeg,
    Photoshop,
    Svg,
    Png24,
    Tiff,
}

impl ExportFormat {
    /// Illustrator `ExportType` constant for the COM export call.
    pub fn type_code(&self) -> i32 {
        match self {
            ExportFormat::Jpeg => 1,
            ExportFormat::Photoshop => 2,
            ExportFormat::Svg => 3,
            ExportFormat::Png24 => 5,
            ExportFormat::Tiff => 9,
        }
    }

    /// ProgID of the COM options object for this format.
    pub fn options_prog_id(&self) -> &'static str {
        match self {
            ExportFormat::Jpeg => "Illustrator.ExportOptionsJPEG",
            ExportFormat::Photoshop => "Illustrator.ExportOptionsPhotoshop",
            ExportFormat::Svg => "Illustrator.ExportOptionsSVG",
            ExportFormat::Png24 => "Illustrator.ExportOptionsPNG24",
            ExportFormat::Tiff => "Illustrator.ExportOptionsTIFF",
        }
    }

    /// Export type keyword in Illustrator's AppleScript dictionary.
    pub fn applescript_type(&self) -> &'static str {
        match self {
            ExportFormat::Jpeg => "JPEG",
            ExportFormat::Photoshop => "Photoshop",
            ExportFormat::Svg => "SVG",
            ExportFormat::Png24 => "PNG24",
            ExportFormat::Tiff => "TIFF",
        }
    }

    /// Options record class in Illustrator's AppleScript dictionary.
    fn applescript_options_class(&self) -> &'static str {
        match self {
            ExportFormat::Jpeg => "JPEG export options",
            ExportFormat::Photoshop => "Photoshop export options",
            ExportFormat::Svg => "SVG export options",
            ExportFormat::Png24 => "PNG24 export options",
            ExportFormat::Tiff => "TIFF export options",
        }
    }
}

/// Value of a single export option.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OptionValue {
    Bool(bool),
    Int(i32),
}

/// A resolved export row: format identifier plus its options bag.
///
/// Option names are Illustrator's COM property names; the AppleScript
/// rendering translates them to dictionary labels.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportSpec {
    pub format: ExportFormat,
    options: Vec<(&'static str, OptionValue)>,
}

impl ExportSpec {
    /// Look up an option by its COM property name.
    pub fn option(&self, name: &str) -> Option<OptionValue> {
        self.options
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| *value)
    }

    /// Option pairs to put on the COM options object, in table order.
    pub fn com_properties(&self) -> &[(&'static str, OptionValue)] {
        &self.options
    }

    /// Render the `with options {...}` record body for AppleScript.
    pub fn applescript_options(&self) -> String {
        let mut parts = vec![format!("class:{}", self.format.applescript_options_class())];
        for (name, value) in &self.options {
            parts.push(format!(
                "{}:{}",
                applescript_label(name),
                applescript_value(name, *value)
            ));
        }
        parts.join(", ")
    }
}

/// COM property name -> AppleScript dictionary label.
fn applescript_label(name: &str) -> &'static str {
    match name {
        "QualitySetting" => "quality",
        "AntiAliasing" => "antialiasing",
        "Transparency" => "transparency",
        "ArtBoardClipping" => "artboard clipping",
        "HorizontalScale" => "horizontal scaling",
        "VerticalScale" => "vertical scaling",
        "Resolution" => "resolution",
        "ByteOrder" => "byte order",
        "ImageColorSpace" => "image color space",
        "FontSubsetting" => "font subsetting",
        "CoordinatePrecision" => "coordinate precision",
        "EmbedRasterImages" => "embed raster images",
        "MaximumEditability" => "maximum editability",
        "WriteLayers" => "write layers",
        other => unreachable!("unmapped export option: {}", other),
    }
}

/// Render an option value as AppleScript source. Enumerated COM integers
/// become the matching dictionary keyword.
fn applescript_value(name: &str, value: OptionValue) -> String {
    match (name, value) {
        ("ByteOrder", OptionValue::Int(1)) => "IBM PC".to_string(),
        ("ByteOrder", OptionValue::Int(_)) => "Macintosh".to_string(),
        ("ImageColorSpace", OptionValue::Int(1)) => "CMYK".to_string(),
        ("ImageColorSpace", OptionValue::Int(_)) => "RGB".to_string(),
        ("FontSubsetting", OptionValue::Int(1)) => "none".to_string(),
        ("FontSubsetting", OptionValue::Int(_)) => "glyphs used".to_string(),
        (_, OptionValue::Bool(b)) => b.to_string(),
        (_, OptionValue::Int(i)) => i.to_string(),
    }
}

/// Resolve an output extension to its export row.
///
/// Extensions are matched case-insensitively, with or without the leading
/// dot. Anything without a row is a typed error; callers must not attempt
/// the native export call for it.
pub fn resolve(extension: &str) -> Result<ExportSpec, BridgeError> {
    let ext = normalize_extension(extension);

    let spec = match ext.as_str() {
        ".jpg" | ".jpeg" => ExportSpec {
            format: ExportFormat::Jpeg,
            options: vec![
                ("QualitySetting", OptionValue::Int(100)),
                ("AntiAliasing", OptionValue::Bool(true)),
            ],
        },
        ".png" => ExportSpec {
            format: ExportFormat::Png24,
            options: vec![
                ("AntiAliasing", OptionValue::Bool(true)),
                ("Transparency", OptionValue::Bool(true)),
                ("ArtBoardClipping", OptionValue::Bool(true)),
                ("HorizontalScale", OptionValue::Int(100)),
                ("VerticalScale", OptionValue::Int(100)),
            ],
        },
        ".tif" | ".tiff" => ExportSpec {
            format: ExportFormat::Tiff,
            options: vec![
                ("Resolution", OptionValue::Int(300)),
                // 1 = IBM PC, 2 = Macintosh
                ("ByteOrder", OptionValue::Int(1)),
                // 2 = RGB, 1 = CMYK
                ("ImageColorSpace", OptionValue::Int(2)),
            ],
        },
        ".svg" => ExportSpec {
            format: ExportFormat::Svg,
            options: vec![
                // 1 = none, 2 = glyphs used
                ("FontSubsetting", OptionValue::Int(1)),
                ("CoordinatePrecision", OptionValue::Int(2)),
                ("EmbedRasterImages", OptionValue::Bool(true)),
            ],
        },
        ".psd" => ExportSpec {
            format: ExportFormat::Photoshop,
            options: vec![
                ("MaximumEditability", OptionValue::Bool(true)),
                ("WriteLayers", OptionValue::Bool(true)),
                ("Resolution", OptionValue::Int(300)),
                ("ImageColorSpace", OptionValue::Int(2)),
            ],
        },
        _ => return Err(BridgeError::UnsupportedFormat(ext)),
    };

    Ok(spec)
}

/// Extensions with a row in the table, leading dot included.
pub fn supported_extensions() -> &'static [&'static str] {
    &[".jpg", ".jpeg", ".png", ".tif", ".tiff", ".svg", ".psd"]
}

fn normalize_extension(extension: &str) -> String {
    let ext = extension.trim().to_lowercase();
    if ext.starts_with('.') {
        ext
    } else {
        format!(".{}", ext)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    #[test]
    fn test_every_supported_extension_resolves() {
        for ext in supported_extensions() {
            assert!(resolve(ext).is_ok(), "{} should resolve", ext);
        }
    }

    #[test]
    fn test_resolve_is_case_insensitive_and_dot_tolerant() {
        assert_eq!(resolve(".PNG").unwrap().format, ExportFormat::Png24);
        assert_eq!(resolve("png").unwrap().format, ExportFormat::Png24);
        assert_eq!(resolve("JpEg").unwrap().format, ExportFormat::Jpeg);
    }

    #[test]
    fn test_png_row_keeps_transparency_and_artboard_clipping() {
        let spec = resolve(".png").unwrap();
        assert_eq!(spec.option("Transparency"), Some(OptionValue::Bool(true)));
        assert_eq!(spec.option("ArtBoardClipping"), Some(OptionValue::Bool(true)));
        assert_eq!(spec.option("HorizontalScale"), Some(OptionValue::Int(100)));
    }

    #[test]
    fn test_jpeg_row_uses_maximum_quality() {
        let spec = resolve(".jpg").unwrap();
        assert_eq!(spec.option("QualitySetting"), Some(OptionValue::Int(100)));
        assert_eq!(spec.option("AntiAliasing"), Some(OptionValue::Bool(true)));
    }

    #[test]
    fn test_tiff_and_psd_share_resolution_and_colorspace() {
        for ext in [".tif", ".psd"] {
            let spec = resolve(ext).unwrap();
            assert_eq!(spec.option("Resolution"), Some(OptionValue::Int(300)));
            assert_eq!(spec.option("ImageColorSpace"), Some(OptionValue::Int(2)));
        }
    }

    #[test]
    fn test_type_codes_match_automation_constants() {
        assert_eq!(resolve(".jpg").unwrap().format.type_code(), 1);
        assert_eq!(resolve(".psd").unwrap().format.type_code(), 2);
        assert_eq!(resolve(".svg").unwrap().format.type_code(), 3);
        assert_eq!(resolve(".png").unwrap().format.type_code(), 5);
        assert_eq!(resolve(".tiff").unwrap().format.type_code(), 9);
    }

    #[test]
    fn test_unsupported_extension_is_typed_error() {
        match resolve(".bmp") {
            Err(BridgeError::UnsupportedFormat(ext)) => assert_eq!(ext, ".bmp"),
            other => panic!("expected UnsupportedFormat, got {:?}", other),
        }
    }

    #[test]
    fn test_applescript_record_for_png() {
        let record = resolve(".png").unwrap().applescript_options();
        assert!(record.starts_with("class:PNG24 export options"));
        assert!(record.contains("transparency:true"));
        assert!(record.contains("artboard clipping:true"));
        assert!(record.contains("horizontal scaling:100"));
    }

    #[test]
    fn test_applescript_record_translates_enumerated_values() {
        let tiff = resolve(".tif").unwrap().applescript_options();
        assert!(tiff.contains("byte order:IBM PC"));
        assert!(tiff.contains("image color space:RGB"));

        let svg = resolve(".svg").unwrap().applescript_options();
        assert!(svg.contains("font subsetting:none"));
        assert!(svg.contains("coordinate precision:2"));
    }

    proptest! {
        // Any extension outside the table resolves to UnsupportedFormat,
        // never to a row.
        #[test]
        fn prop_unknown_extensions_are_rejected(ext in "\\.[a-z0-9]{1,6}") {
            prop_assume!(!supported_extensions().contains(&ext.as_str()));

            prop_assert!(matches!(
                resolve(&ext),
                Err(BridgeError::UnsupportedFormat(_))
            ));
        }

        // Normalization is stable: resolving with or without the dot and in
        // any case yields the same format.
        #[test]
        fn prop_normalization_is_stable(idx in 0usize..7) {
            let ext = supported_extensions()[idx];
            let upper = ext.to_uppercase();
            let bare = ext.trim_start_matches('.');

            let base = resolve(ext).unwrap().format;
            prop_assert_eq!(resolve(&upper).unwrap().format, base);
            prop_assert_eq!(resolve(bare).unwrap().format, base);
        }
    }
}
