//! Geostamp Core - stamp capture time and place onto photos.
//!
//! Reads the EXIF capture time and GPS position from a photo, resolves the
//! position to localized place names, cover-crops the photo to a fixed size
//! and draws the text in the bottom-right corner.
//!
//! # Architecture
//!
//! ```text
//! Photo → Validate → EXIF → Decode → Resize/Crop → Geocode → Watermark → Encode
//! ```
//!
//! Geocoding is the only stage allowed to fail softly: a failed lookup
//! becomes an empty place line.
//!
//! # Usage
//!
//! ```rust,ignore
//! use geostamp_core::{Config, StampOptions, Stamper};
//!
//! #[tokio::main]
//! async fn main() -> geostamp_core::Result<()> {
//!     let config = Config::load()?;
//!     let stamper = Stamper::new(config);
//!
//!     let report = stamper
//!         .stamp("IMG_0001.HEIC".as_ref(), &StampOptions::default())
//!         .await?;
//!     println!("[{}] {}", report.output.display(), report.summary_place());
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod geocode;
pub mod math;
pub mod output;
pub mod pipeline;
pub mod types;

pub use config::Config;
pub use error::{ConfigError, GeocodeError, GeostampError, PipelineError, PipelineResult, Result};
pub use geocode::{NominatimGeocoder, PlaceResolver, ReverseGeocoder};
pub use output::OutputWriter;
pub use pipeline::{StampOptions, Stamper};
pub use types::{CaptureMetadata, GeoPoint, GpsTag, StampReport, Watermark};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
