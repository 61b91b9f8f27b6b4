//! Output naming and encoding for stamped photos.
//!
//! The container format comes from the output path's extension, falling back
//! to the configured file type. JPEG is flattened to RGB and encoded at the
//! configured quality; other formats keep alpha only if the source had it.

use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageFormat, RgbaImage};
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use crate::config::OutputConfig;
use crate::error::PipelineError;

/// Derive `<dir>/<stem><suffix>.<FILETYPE>` from the input path.
pub fn derive_output_path(input: &Path, suffix: &str, filetype: &str) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    input.with_file_name(format!("{stem}{suffix}.{}", filetype.to_uppercase()))
}

/// Pick the encoder for `path`.
pub fn resolve_format(path: &Path, fallback_filetype: &str) -> Result<ImageFormat, PipelineError> {
    ImageFormat::from_path(path)
        .or_else(|_| ImageFormat::from_extension(fallback_filetype).ok_or(()))
        .map_err(|_| PipelineError::UnsupportedFormat {
            path: path.to_path_buf(),
            format: path
                .extension()
                .and_then(|e| e.to_str())
                .unwrap_or(fallback_filetype)
                .to_string(),
        })
}

/// Encodes and writes the final image.
pub struct OutputWriter {
    config: OutputConfig,
}

impl OutputWriter {
    /// Create a new writer with the given output settings.
    pub fn new(config: OutputConfig) -> Self {
        Self { config }
    }

    /// Output path for `input`: the explicit one if given, else derived.
    pub fn output_path(&self, input: &Path, explicit: Option<&Path>) -> PathBuf {
        match explicit {
            Some(path) => path.to_path_buf(),
            None => derive_output_path(input, &self.config.suffix, &self.config.filetype),
        }
    }

    /// Encode `image` and write it to `path`.
    ///
    /// `keep_alpha` is ignored for formats without an alpha channel.
    pub fn write(
        &self,
        image: RgbaImage,
        keep_alpha: bool,
        path: &Path,
    ) -> Result<ImageFormat, PipelineError> {
        let format = resolve_format(path, &self.config.filetype)?;
        let encode_err = |message: String| PipelineError::Encode {
            path: path.to_path_buf(),
            message,
        };

        let image = DynamicImage::ImageRgba8(image);
        match format {
            ImageFormat::Jpeg => {
                let file = File::create(path).map_err(|e| encode_err(e.to_string()))?;
                let mut encoder =
                    JpegEncoder::new_with_quality(BufWriter::new(file), self.config.jpeg_quality);
                encoder
                    .encode_image(&image.to_rgb8())
                    .map_err(|e| encode_err(e.to_string()))?;
            }
            _ if keep_alpha => image
                .save_with_format(path, format)
                .map_err(|e| encode_err(e.to_string()))?,
            _ => DynamicImage::ImageRgb8(image.to_rgb8())
                .save_with_format(path, format)
                .map_err(|e| encode_err(e.to_string()))?,
        }

        tracing::debug!("Wrote {:?} as {:?}", path, format);
        Ok(format)
    }
}
