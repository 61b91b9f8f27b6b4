//! Sub-configuration structs with defaults matching the command-line defaults.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Watermark text rendering settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Path to the TrueType/OpenType font file
    pub font_family: PathBuf,

    /// Font size in pixels
    pub font_size: u32,

    /// Distance from the right and bottom edges in pixels
    pub margin: u32,

    /// Line pitch as a multiple of the font size
    pub line_spacing: f32,

    /// Offset of the four dark outline passes, in pixels
    pub outline_offset: i32,

    /// Alpha of the light text pass (0-255)
    pub text_alpha: u8,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            font_family: PathBuf::from("HeyMoon.ttf"),
            font_size: 40,
            margin: 40,
            line_spacing: 1.5,
            outline_offset: 1,
            text_alpha: 128,
        }
    }
}

/// Target crop size. Swapped automatically for portrait sources.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CropConfig {
    /// Crop width in pixels (landscape orientation)
    pub width: u32,

    /// Crop height in pixels (landscape orientation)
    pub height: u32,
}

impl Default for CropConfig {
    fn default() -> Self {
        Self {
            width: 3000,
            height: 2000,
        }
    }
}

/// Output file settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Container format used for derived output names ("jpg", "png", ...)
    pub filetype: String,

    /// Suffix appended to the input stem for derived output names
    pub suffix: String,

    /// JPEG encoder quality (1-100)
    pub jpeg_quality: u8,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            filetype: "jpg".to_string(),
            suffix: "-P".to_string(),
            jpeg_quality: 90,
        }
    }
}

/// Resource limits to protect against problematic inputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum file size in megabytes
    pub max_file_size_mb: u64,

    /// Maximum image dimension (width or height)
    pub max_image_dimension: u32,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_file_size_mb: 200,
            max_image_dimension: 20000,
        }
    }
}

/// Reverse-geocoding service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeocodingConfig {
    /// Base URL of a Nominatim-compatible service
    pub endpoint: String,

    /// Proxy for all geocoding requests, e.g. "http://127.0.0.1:1080"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proxy: Option<String>,

    /// Per-request timeout in milliseconds
    pub timeout_ms: u64,

    /// User-Agent sent with every request (Nominatim rejects anonymous clients)
    pub user_agent: String,

    /// Languages to resolve, in display order (first ends up topmost)
    pub languages: Vec<String>,
}

impl Default for GeocodingConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://nominatim.openstreetmap.org".to_string(),
            proxy: None,
            timeout_ms: 7000,
            user_agent: "geostamp".to_string(),
            languages: vec!["zh".to_string(), "en".to_string()],
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: error, warn, info, debug, trace
    pub level: String,

    /// Log format: "pretty" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}
