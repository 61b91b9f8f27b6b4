//! Core data types for the geostamp pipeline.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::math::dms_to_decimal;

/// A line of text to stamp onto the photo.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Watermark {
    /// The text to draw
    pub text: String,

    /// Path to the font file
    pub font_family: PathBuf,

    /// Font size in pixels
    pub font_size: u32,
}

impl Watermark {
    /// Create a new watermark line.
    pub fn new(text: impl Into<String>, font_family: impl Into<PathBuf>, font_size: u32) -> Self {
        Self {
            text: text.into(),
            font_family: font_family.into(),
            font_size,
        }
    }
}

/// One EXIF GPS coordinate: degrees, minutes, seconds as `(num, den)` pairs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DmsCoordinate {
    pub degrees: (u32, u32),
    pub minutes: (u32, u32),
    pub seconds: (u32, u32),
}

impl DmsCoordinate {
    pub fn new(degrees: (u32, u32), minutes: (u32, u32), seconds: (u32, u32)) -> Self {
        Self {
            degrees,
            minutes,
            seconds,
        }
    }

    /// All three denominators are non-zero.
    pub fn is_valid(&self) -> bool {
        self.degrees.1 != 0 && self.minutes.1 != 0 && self.seconds.1 != 0
    }

    /// Unsigned decimal degrees.
    pub fn to_decimal(&self) -> f64 {
        dms_to_decimal(self.degrees, self.minutes, self.seconds)
    }
}

/// GPS position as stored in the EXIF GPS IFD.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GpsTag {
    pub latitude: DmsCoordinate,
    pub longitude: DmsCoordinate,

    /// `GPSLatitudeRef` is 'S'
    pub south: bool,

    /// `GPSLongitudeRef` is 'W'
    pub west: bool,
}

impl GpsTag {
    /// Signed decimal position for geocoding.
    pub fn to_decimal(&self) -> GeoPoint {
        let sign = |negative: bool| if negative { -1.0 } else { 1.0 };
        GeoPoint {
            latitude: sign(self.south) * self.latitude.to_decimal(),
            longitude: sign(self.west) * self.longitude.to_decimal(),
        }
    }
}

/// Decimal latitude/longitude pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl std::fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}, {}", self.latitude, self.longitude)
    }
}

/// Metadata the stamper needs from the EXIF block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptureMetadata {
    /// Capture time as `YYYY-MM-DD HH:MM:SS`
    pub captured_at: String,

    /// GPS position, absent when the photo carries no usable GPS IFD
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gps: Option<GpsTag>,
}

/// Outcome of stamping one photo.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StampReport {
    /// Where the stamped photo was written
    pub output: PathBuf,

    /// Normalized capture timestamp
    pub captured_at: String,

    /// Place lines that were stamped, in display order (topmost first)
    pub places: Vec<String>,

    /// Whether the photo had usable GPS data
    pub has_location: bool,

    /// Final image size
    pub width: u32,
    pub height: u32,
}

impl StampReport {
    /// The place shown in the one-line summary: the topmost place line,
    /// or an empty string when none was stamped.
    pub fn summary_place(&self) -> &str {
        self.places.first().map(String::as_str).unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn beijing() -> GpsTag {
        GpsTag {
            latitude: DmsCoordinate::new((39, 1), (54, 1), (2736, 100)),
            longitude: DmsCoordinate::new((116, 1), (23, 1), (2220, 100)),
            south: false,
            west: false,
        }
    }

    #[test]
    fn test_dms_validity() {
        assert!(DmsCoordinate::new((40, 1), (30, 1), (0, 1)).is_valid());
        assert!(!DmsCoordinate::new((40, 1), (30, 0), (0, 1)).is_valid());
    }

    #[test]
    fn test_gps_tag_northern_eastern_positive() {
        let point = beijing().to_decimal();
        assert!((point.latitude - 39.9076).abs() < 1e-9);
        assert!((point.longitude - 116.3895).abs() < 1e-9);
    }

    #[test]
    fn test_gps_tag_hemisphere_refs_negate() {
        let mut tag = beijing();
        tag.south = true;
        tag.west = true;
        let point = tag.to_decimal();
        assert!(point.latitude < 0.0);
        assert!(point.longitude < 0.0);
    }

    #[test]
    fn test_geo_point_display() {
        let point = GeoPoint {
            latitude: 40.5,
            longitude: -73.25,
        };
        assert_eq!(point.to_string(), "40.5, -73.25");
    }

    #[test]
    fn test_summary_place() {
        let mut report = StampReport {
            output: PathBuf::from("a-P.JPG"),
            captured_at: "2023-04-05 10:20:30".to_string(),
            places: vec![],
            has_location: false,
            width: 3000,
            height: 2000,
        };
        assert_eq!(report.summary_place(), "");

        report.places = vec!["中国·北京市".to_string(), "Beijing, China".to_string()];
        assert_eq!(report.summary_place(), "中国·北京市");
    }
}
