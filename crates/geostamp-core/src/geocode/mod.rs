//! Reverse geocoding: GPS position to a localized place string.
//!
//! A provider trait abstracts the lookup service (Nominatim by default) and a
//! resolver joins the returned address components per language.

pub(crate) mod nominatim;
pub(crate) mod provider;
pub(crate) mod resolver;

pub use nominatim::NominatimGeocoder;
pub use provider::{Address, ReverseGeocoder};
pub use resolver::{join_place, PlaceResolver};
