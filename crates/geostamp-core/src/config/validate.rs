//! Configuration validation with range checks.

use crate::error::ConfigError;

use super::Config;

impl Config {
    /// Validate configuration values are within acceptable ranges.
    ///
    /// Called after loading a file and again after CLI overrides are applied.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.crop.width == 0 || self.crop.height == 0 {
            return Err(ConfigError::ValidationError(
                "crop.width and crop.height must be > 0".into(),
            ));
        }
        if self.render.font_size == 0 {
            return Err(ConfigError::ValidationError(
                "render.font_size must be > 0".into(),
            ));
        }
        if self.render.line_spacing.is_nan() || self.render.line_spacing <= 0.0 {
            return Err(ConfigError::ValidationError(
                "render.line_spacing must be > 0".into(),
            ));
        }
        if self.output.jpeg_quality == 0 || self.output.jpeg_quality > 100 {
            return Err(ConfigError::ValidationError(
                "output.jpeg_quality must be between 1 and 100".into(),
            ));
        }
        if self.output.filetype.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "output.filetype must not be empty".into(),
            ));
        }
        if self.limits.max_file_size_mb == 0 {
            return Err(ConfigError::ValidationError(
                "limits.max_file_size_mb must be > 0".into(),
            ));
        }
        if self.limits.max_image_dimension == 0 {
            return Err(ConfigError::ValidationError(
                "limits.max_image_dimension must be > 0".into(),
            ));
        }
        if self.geocoding.timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "geocoding.timeout_ms must be > 0".into(),
            ));
        }
        if self.geocoding.languages.is_empty() {
            return Err(ConfigError::ValidationError(
                "geocoding.languages must name at least one language".into(),
            ));
        }
        if let Some(proxy) = &self.geocoding.proxy {
            if !proxy.contains("://") {
                return Err(ConfigError::ValidationError(format!(
                    "geocoding.proxy must be a URL with a scheme, got '{proxy}'"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_passes_validation() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_crop() {
        let mut config = Config::default();
        config.crop.height = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("crop.width"));
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let mut config = Config::default();
        config.geocoding.timeout_ms = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("timeout_ms"));
    }

    #[test]
    fn test_validate_rejects_invalid_jpeg_quality() {
        let mut config = Config::default();
        config.output.jpeg_quality = 0;
        assert!(config.validate().is_err());

        config.output.jpeg_quality = 101;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("jpeg_quality"));
    }

    #[test]
    fn test_validate_rejects_empty_languages() {
        let mut config = Config::default();
        config.geocoding.languages.clear();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("languages"));
    }

    #[test]
    fn test_validate_rejects_schemeless_proxy() {
        let mut config = Config::default();
        config.geocoding.proxy = Some("127.0.0.1:1080".to_string());
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("proxy"));

        config.geocoding.proxy = Some("socks5://127.0.0.1:1080".to_string());
        assert!(config.validate().is_ok());
    }
}
