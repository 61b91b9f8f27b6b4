//! Turns a GPS tag into a single localized place string.

use super::nominatim::NominatimGeocoder;
use super::provider::ReverseGeocoder;
use crate::config::GeocodingConfig;
use crate::error::GeocodeError;
use crate::types::GpsTag;

/// Separator for Chinese place names, joined coarse to fine.
const ZH_SEPARATOR: &str = "·";

/// Separator for every other language, joined fine to coarse.
const DEFAULT_SEPARATOR: &str = ", ";

/// Resolves GPS positions to place strings through a [`ReverseGeocoder`].
pub struct PlaceResolver {
    geocoder: Box<dyn ReverseGeocoder>,
}

impl PlaceResolver {
    pub fn new(geocoder: Box<dyn ReverseGeocoder>) -> Self {
        Self { geocoder }
    }

    /// Resolver backed by Nominatim with the given settings.
    pub fn from_config(config: &GeocodingConfig) -> Result<Self, GeocodeError> {
        Ok(Self::new(Box::new(NominatimGeocoder::new(config)?)))
    }

    /// Resolve `gps` to a place string in `language`.
    ///
    /// Failures are returned to the caller, which decides whether to stamp
    /// an empty line instead.
    pub async fn resolve(&self, gps: &GpsTag, language: &str) -> Result<String, GeocodeError> {
        let point = gps.to_decimal();
        tracing::debug!(
            "Resolving {} in {:?} via {}",
            point,
            language,
            self.geocoder.name()
        );
        let address = self.geocoder.reverse(point, language).await?;
        Ok(join_place(&address.components(), language))
    }
}

/// Join address components (coarse to fine) into one place string.
///
/// Chinese keeps the order and joins with `·`. Other languages reverse it
/// and join with `, `. No components gives an empty string.
pub fn join_place(components: &[&str], language: &str) -> String {
    if language.contains("zh") {
        components.join(ZH_SEPARATOR)
    } else {
        let reversed: Vec<&str> = components.iter().rev().copied().collect();
        reversed.join(DEFAULT_SEPARATOR)
    }
}
