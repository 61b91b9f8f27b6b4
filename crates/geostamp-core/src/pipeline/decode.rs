//! Image decoding with format detection and dimension limits.
//!
//! Formats the `image` crate understands are detected from content. HEIF/HEIC
//! containers are recognised by their `ftyp` brand and decoded through libheif
//! when the `heif` feature is enabled.

use image::{DynamicImage, GenericImageView, ImageFormat};
use std::io::Cursor;
use std::path::Path;

use crate::config::LimitsConfig;
use crate::error::PipelineError;

/// `ftyp` major/compatible brands that identify a HEIF still image.
const HEIF_BRANDS: &[&[u8; 4]] = &[
    b"heic", b"heix", b"hevc", b"hevx", b"heim", b"heis", b"hevm", b"hevs", b"mif1", b"msf1",
];

/// Image decoder with configurable limits.
pub struct ImageDecoder {
    limits: LimitsConfig,
}

/// Result of decoding an image.
pub struct DecodedImage {
    /// The decoded image data
    pub image: DynamicImage,
    /// Detected format ("jpeg", "png", "heif", ...)
    pub format: String,
    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,
    /// Original file size in bytes
    pub file_size: u64,
}

impl ImageDecoder {
    /// Create a new decoder with the given limits.
    pub fn new(limits: LimitsConfig) -> Self {
        Self { limits }
    }

    /// Decode an image from an in-memory byte buffer.
    ///
    /// The caller reads the file once and parses the EXIF block from the same
    /// buffer.
    pub fn decode_from_bytes(
        &self,
        bytes: Vec<u8>,
        path: &Path,
    ) -> Result<DecodedImage, PipelineError> {
        let file_size = bytes.len() as u64;

        let (image, format) = if is_heif(&bytes) {
            (decode_heif(&bytes, path)?, "heif".to_string())
        } else {
            Self::decode_with_image_crate(bytes, path)?
        };

        let (width, height) = image.dimensions();
        if width > self.limits.max_image_dimension || height > self.limits.max_image_dimension {
            return Err(PipelineError::ImageTooLarge {
                path: path.to_path_buf(),
                width,
                height,
                max_dim: self.limits.max_image_dimension,
            });
        }

        Ok(DecodedImage {
            image,
            format,
            width,
            height,
            file_size,
        })
    }

    fn decode_with_image_crate(
        bytes: Vec<u8>,
        path: &Path,
    ) -> Result<(DynamicImage, String), PipelineError> {
        let reader = image::ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(|e| PipelineError::Decode {
                path: path.to_path_buf(),
                message: format!("Cannot detect image format: {}", e),
            })?;
        let format = match reader.format() {
            Some(f) => f,
            None => ImageFormat::from_path(path).map_err(|_| PipelineError::UnsupportedFormat {
                path: path.to_path_buf(),
                format: path
                    .extension()
                    .and_then(|e| e.to_str())
                    .unwrap_or("unknown")
                    .to_string(),
            })?,
        };
        let image = reader.decode().map_err(|e| PipelineError::Decode {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Ok((image, format_to_string(format)))
    }
}

/// Whether the buffer is an ISO-BMFF file with a HEIF brand.
pub fn is_heif(bytes: &[u8]) -> bool {
    if bytes.len() < 12 || &bytes[4..8] != b"ftyp" {
        return false;
    }
    let box_len = u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as usize;
    let end = box_len.clamp(12, bytes.len());

    // Major brand at 8..12, minor version at 12..16, compatible brands after.
    let major = &bytes[8..12];
    if major == b"avif" || major == b"avis" {
        return false;
    }
    let compatible = bytes.get(16..end).unwrap_or(&[]).chunks_exact(4);
    std::iter::once(major)
        .chain(compatible)
        .any(|brand| HEIF_BRANDS.iter().any(|b| &b[..] == brand))
}

#[cfg(feature = "heif")]
fn decode_heif(bytes: &[u8], path: &Path) -> Result<DynamicImage, PipelineError> {
    use libheif_rs::{ColorSpace, HeifContext, LibHeif, RgbChroma};

    let decode_err = |e: libheif_rs::HeifError| PipelineError::Decode {
        path: path.to_path_buf(),
        message: format!("HEIF decode failed: {}", e),
    };

    let lib_heif = LibHeif::new();
    let ctx = HeifContext::read_from_bytes(bytes).map_err(decode_err)?;
    let handle = ctx.primary_image_handle().map_err(decode_err)?;
    let heif_image = lib_heif
        .decode(&handle, ColorSpace::Rgb(RgbChroma::Rgb), None)
        .map_err(decode_err)?;

    let planes = heif_image.planes();
    let plane = planes.interleaved.ok_or_else(|| PipelineError::Decode {
        path: path.to_path_buf(),
        message: "HEIF image has no interleaved RGB plane".to_string(),
    })?;

    // Rows are padded to `stride`; copy the visible part of each row.
    let row_len = plane.width as usize * 3;
    let mut pixels = Vec::with_capacity(row_len * plane.height as usize);
    for row in plane.data.chunks(plane.stride).take(plane.height as usize) {
        pixels.extend_from_slice(&row[..row_len]);
    }

    image::RgbImage::from_raw(plane.width, plane.height, pixels)
        .map(DynamicImage::ImageRgb8)
        .ok_or_else(|| PipelineError::Decode {
            path: path.to_path_buf(),
            message: "HEIF pixel buffer size mismatch".to_string(),
        })
}

#[cfg(not(feature = "heif"))]
fn decode_heif(_bytes: &[u8], path: &Path) -> Result<DynamicImage, PipelineError> {
    Err(PipelineError::UnsupportedFormat {
        path: path.to_path_buf(),
        format: "heif (rebuild with `--features heif` to enable libheif decoding)".to_string(),
    })
}

/// Convert an ImageFormat to a string representation.
pub fn format_to_string(format: ImageFormat) -> String {
    match format {
        ImageFormat::Jpeg => "jpeg".to_string(),
        ImageFormat::Png => "png".to_string(),
        ImageFormat::WebP => "webp".to_string(),
        ImageFormat::Gif => "gif".to_string(),
        ImageFormat::Tiff => "tiff".to_string(),
        ImageFormat::Bmp => "bmp".to_string(),
        ImageFormat::Avif => "avif".to_string(),
        _ => "unknown".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let mut buffer = Cursor::new(Vec::new());
        DynamicImage::new_rgb8(width, height)
            .write_to(&mut buffer, ImageFormat::Png)
            .unwrap();
        buffer.into_inner()
    }

    fn ftyp(major: &[u8; 4], compatible: &[&[u8; 4]]) -> Vec<u8> {
        let len = 16 + 4 * compatible.len();
        let mut bytes = (len as u32).to_be_bytes().to_vec();
        bytes.extend_from_slice(b"ftyp");
        bytes.extend_from_slice(major);
        bytes.extend_from_slice(&[0, 0, 0, 0]);
        for brand in compatible {
            bytes.extend_from_slice(&brand[..]);
        }
        bytes
    }

    #[test]
    fn test_format_to_string() {
        assert_eq!(format_to_string(ImageFormat::Jpeg), "jpeg");
        assert_eq!(format_to_string(ImageFormat::Png), "png");
        assert_eq!(format_to_string(ImageFormat::WebP), "webp");
    }

    #[test]
    fn test_format_detected_by_content() {
        // PNG bytes behind a .jpg name should still decode as PNG
        let decoder = ImageDecoder::new(LimitsConfig::default());
        let result = decoder
            .decode_from_bytes(png_bytes(32, 16), Path::new("misnamed.jpg"))
            .unwrap();
        assert_eq!(result.format, "png");
        assert_eq!((result.width, result.height), (32, 16));
    }

    #[test]
    fn test_decode_rejects_oversized_dimensions() {
        let decoder = ImageDecoder::new(LimitsConfig {
            max_image_dimension: 16,
            ..LimitsConfig::default()
        });
        let err = decoder
            .decode_from_bytes(png_bytes(32, 8), Path::new("wide.png"))
            .err()
            .unwrap();
        assert!(matches!(err, PipelineError::ImageTooLarge { width: 32, .. }));
    }

    #[test]
    fn test_decode_garbage_fails() {
        let decoder = ImageDecoder::new(LimitsConfig::default());
        let bytes = vec![0xFF, 0xD8, 0xFF, 0xE0, 1, 2, 3, 4];
        assert!(decoder
            .decode_from_bytes(bytes, Path::new("broken.jpg"))
            .is_err());
    }

    #[test]
    fn test_is_heif_major_brand() {
        assert!(is_heif(&ftyp(b"heic", &[])));
        assert!(is_heif(&ftyp(b"mif1", &[b"heic"])));
    }

    #[test]
    fn test_is_heif_compatible_brand() {
        assert!(is_heif(&ftyp(b"isom", &[b"mif1", b"miaf"])));
    }

    #[test]
    fn test_is_heif_rejects_avif_and_mp4() {
        assert!(!is_heif(&ftyp(b"avif", &[b"mif1", b"miaf"])));
        assert!(!is_heif(&ftyp(b"isom", &[b"mp41"])));
        assert!(!is_heif(&png_bytes(2, 2)));
    }

    #[cfg(not(feature = "heif"))]
    #[test]
    fn test_heif_without_feature_is_unsupported() {
        let decoder = ImageDecoder::new(LimitsConfig::default());
        let err = decoder
            .decode_from_bytes(ftyp(b"heic", &[b"mif1"]), Path::new("IMG_0001.HEIC"))
            .err()
            .unwrap();
        assert!(matches!(err, PipelineError::UnsupportedFormat { .. }));
        assert!(err.to_string().contains("--features heif"));
    }
}
