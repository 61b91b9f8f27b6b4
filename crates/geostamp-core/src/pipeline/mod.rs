//! Photo stamping pipeline components.
//!
//! - **validate**: Pre-processing checks (existence, size, magic bytes)
//! - **decode**: Load and decode images, HEIF included when enabled
//! - **metadata**: Capture timestamp and GPS from EXIF
//! - **resize**: Cover-scale and center-crop
//! - **watermark**: Draw outlined text lines bottom-right
//! - **processor**: Orchestrates the full pipeline

pub mod decode;
pub mod metadata;
pub mod processor;
pub mod resize;
pub mod validate;
pub mod watermark;

pub use decode::{DecodedImage, ImageDecoder};
pub use metadata::MetadataExtractor;
pub use processor::{watermark_lines, StampOptions, Stamper};
pub use resize::resize_and_crop;
pub use validate::Validator;
pub use watermark::WatermarkRenderer;
