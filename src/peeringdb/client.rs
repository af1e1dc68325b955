//! HTTP client for the PeeringDB REST API.

use std::collections::BTreeSet;
use std::net::IpAddr;

use log::{debug, warn};
use serde::de::DeserializeOwned;

use super::types::{Envelope, Ix, NetFac, NetIxLan};
use super::PresenceSource;
use crate::config::PEERINGDB_API_BASE;
use crate::error_handling::CollaboratorError;
use crate::http::get_json;
use crate::models::Location;

const SERVICE: &str = "PeeringDB";

/// PeeringDB API client (no authentication needed for public objects).
#[derive(Debug, Clone)]
pub struct PeeringDbClient {
    client: reqwest::Client,
    base_url: String,
}

impl PeeringDbClient {
    /// Client for the public PeeringDB API.
    pub fn new(client: reqwest::Client) -> Self {
        Self::with_base_url(client, PEERINGDB_API_BASE)
    }

    /// Client for a PeeringDB-compatible API at `base_url`.
    pub fn with_base_url(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn get<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        query: &[(&str, String)],
    ) -> Result<Vec<T>, CollaboratorError> {
        let url = format!("{}/{}", self.base_url, endpoint);
        let envelope: Envelope<T> = get_json(&self.client, SERVICE, &url, query).await?;
        Ok(envelope.data)
    }

    /// Ids of the exchanges `asn` is connected to.
    pub async fn asn_exchanges(&self, asn: u32) -> Result<BTreeSet<u64>, CollaboratorError> {
        let connections: Vec<NetIxLan> = self.get("netixlan", &[("asn", asn.to_string())]).await?;
        Ok(connections.into_iter().map(|c| c.ix_id).collect())
    }

    /// Cities of the facilities `asn` is present in.
    pub async fn asn_facility_locations(
        &self,
        asn: u32,
    ) -> Result<BTreeSet<Location>, CollaboratorError> {
        let facilities: Vec<NetFac> = self
            .get("netfac", &[("local_asn", asn.to_string())])
            .await?;
        Ok(facilities
            .iter()
            .filter_map(|f| location_of(&f.city, &f.country))
            .collect())
    }

    /// City of an exchange and the cities of its facilities.
    pub async fn exchange_locations(
        &self,
        ix_id: u64,
    ) -> Result<BTreeSet<Location>, CollaboratorError> {
        let exchanges: Vec<Ix> = self
            .get(&format!("ix/{}", ix_id), &[("depth", "2".to_string())])
            .await?;
        let mut locations = BTreeSet::new();
        if let Some(ix) = exchanges.first() {
            locations.extend(location_of(&ix.city, &ix.country));
            locations.extend(
                ix.fac_set
                    .iter()
                    .filter_map(|f| location_of(&f.city, &f.country)),
            );
        }
        Ok(locations)
    }

    async fn try_asn_locations(&self, asn: u32) -> Result<BTreeSet<Location>, CollaboratorError> {
        let mut locations = self.asn_facility_locations(asn).await?;
        for ix_id in self.asn_exchanges(asn).await? {
            match self.exchange_locations(ix_id).await {
                Ok(found) => locations.extend(found),
                Err(e) => warn!("Failed to get locations of exchange {}: {}", ix_id, e),
            }
        }
        Ok(locations)
    }
}

impl PresenceSource for PeeringDbClient {
    async fn asn_locations(&self, asn: u32) -> BTreeSet<Location> {
        match self.try_asn_locations(asn).await {
            Ok(locations) => {
                debug!("PeeringDB lists {} locations for AS{}", locations.len(), asn);
                locations
            }
            Err(e) => {
                warn!("Failed to get PeeringDB presence of AS{}: {}", asn, e);
                BTreeSet::new()
            }
        }
    }

    async fn exchange_fabric_asn(&self, ip: IpAddr) -> Option<u32> {
        let key = match ip {
            IpAddr::V4(_) => "ipaddr4",
            IpAddr::V6(_) => "ipaddr6",
        };
        match self
            .get::<NetIxLan>("netixlan", &[(key, ip.to_string())])
            .await
        {
            Ok(connections) => connections.into_iter().find_map(|c| c.asn),
            Err(e) => {
                warn!("Failed to look up exchange fabric address {}: {}", ip, e);
                None
            }
        }
    }
}

fn location_of(city: &str, country: &str) -> Option<Location> {
    if city.trim().is_empty() || country.trim().is_empty() {
        None
    } else {
        Some(Location::new(city, country))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn mount_json(server: &MockServer, endpoint: &str, key: &str, value: &str, body: &str) {
        Mock::given(method("GET"))
            .and(path(endpoint))
            .and(query_param(key, value))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_asn_locations_merges_facilities_and_exchanges() {
        let server = MockServer::start().await;
        mount_json(
            &server,
            "/netfac",
            "local_asn",
            "1200",
            r#"{"data": [{"fac_id": 1, "city": "Amsterdam", "country": "NL"},
                         {"fac_id": 2, "city": "", "country": "NL"}]}"#,
        )
        .await;
        mount_json(
            &server,
            "/netixlan",
            "asn",
            "1200",
            r#"{"data": [{"ix_id": 26, "asn": 1200}, {"ix_id": 26, "asn": 1200}]}"#,
        )
        .await;
        mount_json(
            &server,
            "/ix/26",
            "depth",
            "2",
            r#"{"data": [{"id": 26, "city": "Amsterdam", "country": "NL",
                          "fac_set": [{"city": "Schiphol-Rijk", "country": "NL"},
                                      {"city": "amsterdam", "country": "nl"}]}]}"#,
        )
        .await;

        let pdb = PeeringDbClient::with_base_url(reqwest::Client::new(), &server.uri());
        let locations = pdb.asn_locations(1200).await;

        let expected: BTreeSet<Location> = [
            Location::new("amsterdam", "nl"),
            Location::new("schiphol-rijk", "nl"),
        ]
        .into_iter()
        .collect();
        assert_eq!(locations, expected);
    }

    #[tokio::test]
    async fn test_asn_locations_failure_is_empty() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let pdb = PeeringDbClient::with_base_url(reqwest::Client::new(), &server.uri());
        assert!(pdb.asn_locations(64512).await.is_empty());
    }

    #[tokio::test]
    async fn test_exchange_fabric_asn() {
        let server = MockServer::start().await;
        mount_json(
            &server,
            "/netixlan",
            "ipaddr4",
            "80.249.208.1",
            r#"{"data": [{"ix_id": 26, "asn": 1200, "ipaddr4": "80.249.208.1"}]}"#,
        )
        .await;
        mount_json(&server, "/netixlan", "ipaddr4", "192.0.2.1", r#"{"data": []}"#).await;

        let pdb = PeeringDbClient::with_base_url(reqwest::Client::new(), &server.uri());
        assert_eq!(
            pdb.exchange_fabric_asn("80.249.208.1".parse().unwrap()).await,
            Some(1200)
        );
        assert_eq!(
            pdb.exchange_fabric_asn("192.0.2.1".parse().unwrap()).await,
            None
        );
    }
}
