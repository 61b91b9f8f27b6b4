//! Pipeline orchestration: wires together all stamping stages.

use image::DynamicImage;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::Instant;

use crate::config::Config;
use crate::error::{GeocodeError, PipelineError, Result};
use crate::geocode::PlaceResolver;
use crate::output::OutputWriter;
use crate::types::{CaptureMetadata, StampReport, Watermark};

use super::decode::ImageDecoder;
use super::metadata::MetadataExtractor;
use super::resize::resize_and_crop;
use super::validate::Validator;
use super::watermark::WatermarkRenderer;

/// Options for a single stamping run.
#[derive(Debug, Clone, Default)]
pub struct StampOptions {
    /// Write here instead of `<dir>/<stem><suffix>.<FILETYPE>`
    pub output: Option<PathBuf>,
    /// Stamp this text as the only place line, skipping geocoding
    pub place: Option<String>,
    /// Do not contact the geocoder; stamp the timestamp only
    pub no_geocode: bool,
}

/// Build the watermark list for a capture time and its place lines.
///
/// Places arrive in language order and the timestamp comes last, so the
/// first language is drawn topmost and the timestamp sits at the bottom.
pub fn watermark_lines(
    captured_at: &str,
    places: &[String],
    font: &Path,
    font_size: u32,
) -> Vec<Watermark> {
    let mut lines = vec![Watermark::new(captured_at, font, font_size)];
    lines.extend(
        places
            .iter()
            .rev()
            .map(|place| Watermark::new(place.as_str(), font, font_size)),
    );
    lines.reverse();
    lines
}

/// The stamper: validate, read EXIF, resize, geocode, draw, write.
pub struct Stamper {
    config: Config,
    validator: Validator,
    // Built on first lookup.
    resolver: OnceLock<PlaceResolver>,
}

impl Stamper {
    /// Create a stamper that geocodes through Nominatim.
    pub fn new(config: Config) -> Self {
        Self {
            validator: Validator::new(config.limits.clone()),
            config,
            resolver: OnceLock::new(),
        }
    }

    /// Create a stamper with a caller-supplied place resolver.
    pub fn with_resolver(config: Config, resolver: PlaceResolver) -> Self {
        Self {
            validator: Validator::new(config.limits.clone()),
            config,
            resolver: OnceLock::from(resolver),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Stamp one photo and write the result.
    ///
    /// Geocoding failures are logged and produce an empty place line; every
    /// other failure aborts the run.
    pub async fn stamp(&self, input: &Path, options: &StampOptions) -> Result<StampReport> {
        let start = Instant::now();
        tracing::debug!("Stamping: {:?}", input);

        self.validator.validate(input)?;

        let bytes = tokio::fs::read(input)
            .await
            .map_err(|e| PipelineError::Decode {
                path: input.to_path_buf(),
                message: format!("Cannot read file: {e}"),
            })?;

        let metadata = MetadataExtractor::extract(&bytes, input)?;
        tracing::debug!("Captured at {}", metadata.captured_at);

        let load_start = Instant::now();
        let (image, keep_alpha) = self.load_and_crop(bytes, input).await?;
        tracing::trace!("  Load + crop: {:?}", load_start.elapsed());

        let places = self.places(&metadata, input, options).await;

        let watermarks = watermark_lines(
            &metadata.captured_at,
            &places,
            &self.config.font_path(),
            self.config.render.font_size,
        );

        let output = self.output_path(input, options);
        let (width, height) = (image.width(), image.height());

        let draw_start = Instant::now();
        self.render_and_write(image, watermarks, keep_alpha, output.clone())
            .await?;
        tracing::trace!("  Render + write: {:?}", draw_start.elapsed());

        tracing::debug!("Stamped {:?} -> {:?} in {:?}", input, output, start.elapsed());

        Ok(StampReport {
            output,
            captured_at: metadata.captured_at,
            places,
            has_location: metadata.gps.is_some(),
            width,
            height,
        })
    }

    /// Output path for `input` under the current config.
    pub fn output_path(&self, input: &Path, options: &StampOptions) -> PathBuf {
        OutputWriter::new(self.config.output.clone()).output_path(input, options.output.as_deref())
    }

    /// Place lines in display order (first language topmost).
    async fn places(
        &self,
        metadata: &CaptureMetadata,
        input: &Path,
        options: &StampOptions,
    ) -> Vec<String> {
        if let Some(place) = &options.place {
            return vec![place.clone()];
        }
        let Some(gps) = &metadata.gps else {
            tracing::warn!("Unknown location: no GPS data in {:?}", input);
            return Vec::new();
        };
        if options.no_geocode {
            tracing::info!("Geocoding disabled, stamping timestamp only");
            return Vec::new();
        }

        let languages = &self.config.geocoding.languages;
        let resolver = match self.resolver() {
            Ok(resolver) => resolver,
            Err(e) => {
                tracing::warn!("Geocoder unavailable for {:?}: {}", input, e);
                return vec![String::new(); languages.len()];
            }
        };

        let mut places = Vec::with_capacity(languages.len());
        for language in languages {
            let place = match resolver.resolve(gps, language).await {
                Ok(place) => place,
                Err(e) => {
                    tracing::warn!("Place lookup ({}) failed for {:?}: {}", language, input, e);
                    String::new()
                }
            };
            tracing::info!("Place ({}): {}", language, place);
            places.push(place);
        }
        places
    }

    fn resolver(&self) -> std::result::Result<&PlaceResolver, GeocodeError> {
        if let Some(resolver) = self.resolver.get() {
            return Ok(resolver);
        }
        let built = PlaceResolver::from_config(&self.config.geocoding)?;
        Ok(self.resolver.get_or_init(|| built))
    }

    /// Decode and cover-crop off the async runtime.
    async fn load_and_crop(
        &self,
        bytes: Vec<u8>,
        input: &Path,
    ) -> std::result::Result<(DynamicImage, bool), PipelineError> {
        let decoder = ImageDecoder::new(self.config.limits.clone());
        let (width, height) = (self.config.crop.width, self.config.crop.height);
        let max_dimension = self.config.limits.max_image_dimension;
        let path = input.to_path_buf();

        tokio::task::spawn_blocking(move || {
            let decoded = decoder.decode_from_bytes(bytes, &path)?;
            tracing::debug!(
                "Decoded {:?}: {} {}x{} ({} bytes)",
                path,
                decoded.format,
                decoded.width,
                decoded.height,
                decoded.file_size
            );
            let keep_alpha = decoded.image.color().has_alpha();
            let image = resize_and_crop(decoded.image, width, height, max_dimension)?;
            Ok::<_, PipelineError>((image, keep_alpha))
        })
        .await
        .map_err(|e| PipelineError::Decode {
            path: input.to_path_buf(),
            message: format!("Task join error: {e}"),
        })?
    }

    async fn render_and_write(
        &self,
        image: DynamicImage,
        watermarks: Vec<Watermark>,
        keep_alpha: bool,
        output: PathBuf,
    ) -> std::result::Result<(), PipelineError> {
        let renderer = WatermarkRenderer::new(&self.config.render);
        let writer = OutputWriter::new(self.config.output.clone());
        let path = output.clone();

        tokio::task::spawn_blocking(move || {
            let stamped = renderer.render(&image, &watermarks)?;
            writer.write(stamped, keep_alpha, &path)?;
            Ok::<_, PipelineError>(())
        })
        .await
        .map_err(|e| PipelineError::Encode {
            path: output,
            message: format!("Task join error: {e}"),
        })?
    }
}
