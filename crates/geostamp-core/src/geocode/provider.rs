//! Reverse-geocoding provider trait and the address type it returns.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::GeocodeError;
use crate::types::GeoPoint;

/// Address components we stamp, as returned by Nominatim-style services.
///
/// Unknown keys in the service response are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Address {
    pub country: Option<String>,
    pub state: Option<String>,
    pub city: Option<String>,
    pub town: Option<String>,
    pub borough: Option<String>,
    pub village: Option<String>,
    pub suburb: Option<String>,
}

impl Address {
    /// Non-blank components from coarse to fine:
    /// country, state, city, town, borough, village, suburb.
    pub fn components(&self) -> Vec<&str> {
        [
            &self.country,
            &self.state,
            &self.city,
            &self.town,
            &self.borough,
            &self.village,
            &self.suburb,
        ]
        .into_iter()
        .filter_map(|c| c.as_deref())
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .collect()
    }
}

/// Trait that all reverse-geocoding backends implement.
///
/// Uses `async_trait` so the resolver can hold a `Box<dyn ReverseGeocoder>`
/// and tests can swap in a fake.
#[async_trait]
pub trait ReverseGeocoder: Send + Sync {
    /// Provider name for logging.
    fn name(&self) -> &str;

    /// Look up the address at `point`, localized to `language`.
    async fn reverse(&self, point: GeoPoint, language: &str) -> Result<Address, GeocodeError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn some(s: &str) -> Option<String> {
        Some(s.to_string())
    }

    #[test]
    fn test_components_priority_order() {
        let address = Address {
            suburb: some("Chaoyang"),
            country: some("China"),
            state: some("Beijing"),
            ..Address::default()
        };
        assert_eq!(address.components(), vec!["China", "Beijing", "Chaoyang"]);
    }

    #[test]
    fn test_components_skip_blank_values() {
        let address = Address {
            country: some("China"),
            state: some("Beijing"),
            city: some(""),
            town: some(" "),
            suburb: some("Chaoyang"),
            ..Address::default()
        };
        assert_eq!(address.components(), vec!["China", "Beijing", "Chaoyang"]);
    }

    #[test]
    fn test_address_ignores_unknown_keys() {
        let json = r#"{"road":"Main St","city":"Springfield","country_code":"us","country":"United States"}"#;
        let address: Address = serde_json::from_str(json).unwrap();
        assert_eq!(address.components(), vec!["United States", "Springfield"]);
    }
}
