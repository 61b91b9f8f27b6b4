//! Error types for the geostamp pipeline.
//!
//! Errors are organized by stage so that messages carry the file path and the
//! specific issue. Geocoding errors have their own type because they never
//! abort a run: the orchestrator logs them and stamps an empty place instead.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for geostamp operations.
#[derive(Error, Debug)]
pub enum GeostampError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Pipeline processing errors
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Pipeline processing errors, organized by stage.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// File not found
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// File exceeds size limit
    #[error("File too large: {path} ({size_mb}MB > {max_mb}MB)")]
    FileTooLarge {
        path: PathBuf,
        size_mb: u64,
        max_mb: u64,
    },

    /// Image decoding failed
    #[error("Decode error for {path}: {message}")]
    Decode { path: PathBuf, message: String },

    /// Unsupported image format
    #[error("Unsupported format for {path}: {format}")]
    UnsupportedFormat { path: PathBuf, format: String },

    /// Image dimensions exceed limit
    #[error("Image too large: {path} ({width}x{height} > {max_dim})")]
    ImageTooLarge {
        path: PathBuf,
        width: u32,
        height: u32,
        max_dim: u32,
    },

    /// Target crop size is unusable
    #[error("Invalid target size {width}x{height}: both sides must be > 0")]
    InvalidDimensions { width: u32, height: u32 },

    /// Cover-scaling a lopsided source would need an oversized buffer
    #[error("Scaling to {width}x{height} exceeds the {max_dim}px limit")]
    ScaleTooLarge {
        width: u32,
        height: u32,
        max_dim: u32,
    },

    /// EXIF block could not be read
    #[error("Metadata extraction failed for {path}: {message}")]
    Metadata { path: PathBuf, message: String },

    /// EXIF block has neither DateTimeOriginal nor DateTime
    #[error("No capture timestamp in EXIF data of {0}")]
    MissingTimestamp(PathBuf),

    /// Font file missing or unparsable
    #[error("Font error for {path}: {message}")]
    Font { path: PathBuf, message: String },

    /// Encoding or writing the output image failed
    #[error("Encode error for {path}: {message}")]
    Encode { path: PathBuf, message: String },
}

/// Reverse-geocoding errors.
///
/// Contained by the place resolver's caller; never fatal.
#[derive(Error, Debug)]
pub enum GeocodeError {
    /// HTTP client could not be built (bad proxy URL, TLS backend failure)
    #[error("Geocoding client error: {0}")]
    Client(String),

    /// Request failed in transport or returned a non-success status
    #[error("Geocoding request failed: {message}")]
    Request {
        message: String,
        status_code: Option<u16>,
    },

    /// Request exceeded the configured timeout
    #[error("Geocoding request timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    /// Service answered but had nothing for the coordinates
    #[error("No geocoding result: {0}")]
    NoResult(String),

    /// Response body did not have the expected shape
    #[error("Malformed geocoding response: {0}")]
    Parse(String),
}

/// Convenience type alias for geostamp results.
pub type Result<T> = std::result::Result<T, GeostampError>;

/// Convenience type alias for pipeline-specific results.
pub type PipelineResult<T> = std::result::Result<T, PipelineError>;
