//! EXIF metadata extraction: capture timestamp and GPS position.

use exif::{Exif, In, Reader, Tag, Value};
use std::io::Cursor;
use std::path::Path;

use crate::error::PipelineError;
use crate::types::{CaptureMetadata, DmsCoordinate, GpsTag};

/// Extracts the capture timestamp and GPS position from EXIF data.
pub struct MetadataExtractor;

impl MetadataExtractor {
    /// Parse the EXIF block embedded in an image file's bytes.
    ///
    /// A missing timestamp is an error. Missing or malformed GPS tags are not:
    /// they yield `gps: None`.
    pub fn extract(bytes: &[u8], path: &Path) -> Result<CaptureMetadata, PipelineError> {
        let exif = Reader::new()
            .read_from_container(&mut Cursor::new(bytes))
            .map_err(|e| PipelineError::Metadata {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
        Self::from_exif(&exif, path)
    }

    /// Pull the fields we need out of parsed EXIF data.
    pub fn from_exif(exif: &Exif, path: &Path) -> Result<CaptureMetadata, PipelineError> {
        let captured_at = Self::get_datetime(exif)
            .map(|s| normalize_timestamp(&s))
            .ok_or_else(|| PipelineError::MissingTimestamp(path.to_path_buf()))?;

        let gps = Self::get_gps(exif);
        if gps.is_none() {
            tracing::debug!("No usable GPS tags in {:?}", path);
        }

        Ok(CaptureMetadata { captured_at, gps })
    }

    /// Get the capture datetime, preferring DateTimeOriginal over DateTime.
    fn get_datetime(exif: &Exif) -> Option<String> {
        [Tag::DateTimeOriginal, Tag::DateTime]
            .into_iter()
            .filter_map(|tag| exif.get_field(tag, In::PRIMARY))
            .find_map(|f| Self::ascii(&f.value))
    }

    /// First non-empty ASCII component, with trailing NULs and spaces removed.
    fn ascii(value: &Value) -> Option<String> {
        match value {
            Value::Ascii(parts) => parts
                .iter()
                .map(|p| String::from_utf8_lossy(p).trim_end_matches(['\0', ' ']).to_string())
                .find(|s| !s.is_empty()),
            _ => None,
        }
    }

    /// Read latitude and longitude; both must be present and well-formed.
    fn get_gps(exif: &Exif) -> Option<GpsTag> {
        let latitude = Self::get_dms(exif, Tag::GPSLatitude)?;
        let longitude = Self::get_dms(exif, Tag::GPSLongitude)?;
        Some(GpsTag {
            latitude,
            longitude,
            south: Self::ref_is(exif, Tag::GPSLatitudeRef, 'S'),
            west: Self::ref_is(exif, Tag::GPSLongitudeRef, 'W'),
        })
    }

    /// Parse three EXIF rationals as degrees, minutes, seconds.
    fn get_dms(exif: &Exif, tag: Tag) -> Option<DmsCoordinate> {
        let field = exif.get_field(tag, In::PRIMARY)?;
        let dms = match &field.value {
            Value::Rational(r) if r.len() >= 3 => DmsCoordinate::new(
                (r[0].num, r[0].denom),
                (r[1].num, r[1].denom),
                (r[2].num, r[2].denom),
            ),
            _ => return None,
        };
        if dms.is_valid() {
            Some(dms)
        } else {
            tracing::warn!("Ignoring {} with a zero denominator", tag);
            None
        }
    }

    fn ref_is(exif: &Exif, tag: Tag, expected: char) -> bool {
        exif.get_field(tag, In::PRIMARY)
            .and_then(|f| Self::ascii(&f.value))
            .is_some_and(|s| s.trim().eq_ignore_ascii_case(&expected.to_string()))
    }
}

/// Turn EXIF `YYYY:MM:DD HH:MM:SS` into `YYYY-MM-DD HH:MM:SS`.
///
/// Only the first two colons are replaced.
pub fn normalize_timestamp(raw: &str) -> String {
    raw.replacen(':', "-", 2)
}
