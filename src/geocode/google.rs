//! Google Maps Geocoding API client.

use log::warn;
use serde::Deserialize;

use super::{ForwardGeocode, Geocoder, ReverseGeocode};
use crate::config::GOOGLE_GEOCODE_API_BASE;
use crate::error_handling::CollaboratorError;
use crate::http::get_json;
use crate::models::{Coordinates, Location};

const SERVICE: &str = "Google Geocoding";

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    status: String,
    #[serde(default)]
    results: Vec<GeocodeResult>,
    #[serde(default)]
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    #[serde(default)]
    address_components: Vec<AddressComponent>,
    geometry: Option<Geometry>,
}

#[derive(Debug, Deserialize)]
struct AddressComponent {
    short_name: String,
    #[serde(default)]
    types: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    location: LatLng,
}

#[derive(Debug, Deserialize)]
struct LatLng {
    lat: f64,
    lng: f64,
}

impl GeocodeResult {
    /// Short name of the first component tagged with `kind`.
    fn component(&self, kind: &str) -> Option<String> {
        self.address_components
            .iter()
            .find(|c| c.types.iter().any(|t| t == kind))
            .map(|c| c.short_name.clone())
    }
}

/// Geocoder backed by the Google Maps Geocoding API.
#[derive(Debug, Clone)]
pub struct GoogleGeocoder {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl GoogleGeocoder {
    /// Client for the public Google endpoint.
    pub fn new(client: reqwest::Client, api_key: String) -> Self {
        Self::with_base_url(client, api_key, GOOGLE_GEOCODE_API_BASE)
    }

    /// Client for a compatible endpoint at `base_url`.
    pub fn with_base_url(client: reqwest::Client, api_key: String, base_url: &str) -> Self {
        Self {
            client,
            api_key,
            base_url: base_url.to_string(),
        }
    }

    async fn query(
        &self,
        params: &[(&str, String)],
    ) -> Result<Option<GeocodeResult>, CollaboratorError> {
        let mut query = params.to_vec();
        query.push(("key", self.api_key.clone()));
        let response: GeocodeResponse =
            get_json(&self.client, SERVICE, &self.base_url, &query).await?;

        let detail = || {
            response
                .error_message
                .clone()
                .unwrap_or_else(|| response.status.clone())
        };
        match response.status.as_str() {
            "OK" => Ok(response.results.into_iter().next()),
            "ZERO_RESULTS" => Ok(None),
            // a refused key fails the same way for every later query
            "REQUEST_DENIED" => Err(CollaboratorError::Rejected {
                service: SERVICE,
                detail: detail(),
            }),
            _ => Err(CollaboratorError::Api {
                service: SERVICE,
                detail: detail(),
            }),
        }
    }
}

impl Geocoder for GoogleGeocoder {
    async fn forward(&self, location: &Location) -> Result<Option<ForwardGeocode>, CollaboratorError> {
        let Some(result) = self.query(&[("address", location.query())]).await? else {
            return Ok(None);
        };
        let city = result.component("locality");
        let country = result.component("country");
        match (result.geometry, city, country) {
            (Some(geometry), Some(city), Some(country)) => Ok(Some(ForwardGeocode {
                coordinates: Coordinates::new(geometry.location.lat, geometry.location.lng),
                city,
                country,
            })),
            _ => {
                warn!("Incomplete geocoding answer for {}", location);
                Ok(None)
            }
        }
    }

    async fn reverse(
        &self,
        coordinates: Coordinates,
    ) -> Result<Option<ReverseGeocode>, CollaboratorError> {
        let latlng = format!("{},{}", coordinates.latitude, coordinates.longitude);
        let result = self
            .query(&[("latlng", latlng), ("language", "en".to_string())])
            .await?;
        Ok(result.map(|result| ReverseGeocode {
            locality: result.component("locality"),
            admin_area: result.component("administrative_area_level_2"),
            country: result.component("country"),
        }))
    }
}
