//! HTTP client for the RIPE Atlas REST API.

use std::collections::BTreeSet;
use std::time::Duration;

use chrono::Utc;
use log::{debug, info, warn};

use super::types::{
    MeasurementCreated, MeasurementInfo, MeasurementRequest, PingDefinition, PingResult,
    ProbePage, ProbeSource,
};
use super::{MeasurementPlatform, PingRequest, VantagePointFilter};
use crate::config::{ATLAS_API_BASE, DEFAULT_MAX_POLLS, DEFAULT_POLL_INTERVAL};
use crate::error_handling::CollaboratorError;
use crate::http::{get_json, send_json};
use crate::models::{AddressFamily, RttObservation, VantagePoint};

const SERVICE: &str = "RIPE Atlas";

/// Measurement states in which results are still incomplete
const ACTIVE_STATES: [&str; 3] = ["Specified", "Scheduled", "Ongoing"];

/// RIPE Atlas API client.
#[derive(Debug, Clone)]
pub struct AtlasClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    poll_interval: Duration,
    max_polls: u32,
}

impl AtlasClient {
    /// Client for the public RIPE Atlas API.
    pub fn new(client: reqwest::Client, api_key: String) -> Self {
        Self {
            client,
            api_key,
            base_url: ATLAS_API_BASE.to_string(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            max_polls: DEFAULT_MAX_POLLS,
        }
    }

    /// Uses an Atlas-compatible API at `base_url`.
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    /// Sets how often and how many times a running measurement is checked
    /// before its results are collected.
    pub fn with_polling(mut self, poll_interval: Duration, max_polls: u32) -> Self {
        self.poll_interval = poll_interval;
        self.max_polls = max_polls;
        self
    }

    async fn create_measurement(&self, request: &PingRequest) -> Result<u64, CollaboratorError> {
        let ids: Vec<String> = request
            .vantage_points
            .iter()
            .map(|id| id.to_string())
            .collect();
        let body = MeasurementRequest {
            definitions: vec![PingDefinition {
                kind: "ping",
                af: request.address_family().as_u8(),
                target: request.target.to_string(),
                description: request.description.clone(),
                packets: request.packets,
            }],
            probes: vec![ProbeSource {
                kind: "probes",
                value: ids.join(","),
                requested: ids.len(),
            }],
            is_oneoff: true,
            start_time: Utc::now().timestamp(),
        };

        let url = format!("{}/api/v2/measurements/", self.base_url);
        let created: MeasurementCreated = send_json(
            self.client
                .post(&url)
                .query(&[("key", self.api_key.as_str())])
                .json(&body),
            SERVICE,
        )
        .await?;
        created
            .measurements
            .first()
            .copied()
            .ok_or_else(|| CollaboratorError::Malformed {
                service: SERVICE,
                detail: "measurement created without an id".to_string(),
            })
    }

    /// Waits until the measurement leaves the active states or the poll
    /// budget is spent.
    async fn wait_for(&self, measurement_id: u64) {
        let url = format!("{}/api/v2/measurements/{}/", self.base_url, measurement_id);
        for poll in 1..=self.max_polls {
            tokio::time::sleep(self.poll_interval).await;
            match get_json::<MeasurementInfo>(&self.client, SERVICE, &url, &[]).await {
                Ok(info) => {
                    debug!(
                        "Measurement {} is {} (check {}/{})",
                        measurement_id, info.status.name, poll, self.max_polls
                    );
                    if !ACTIVE_STATES.contains(&info.status.name.as_str()) {
                        return;
                    }
                }
                Err(e) => {
                    warn!("Status check of measurement {} failed: {}", measurement_id, e);
                    return;
                }
            }
        }
        info!(
            "Measurement {} still running after {} checks, collecting partial results",
            measurement_id, self.max_polls
        );
    }

    async fn results(&self, measurement_id: u64) -> Result<RttObservation, CollaboratorError> {
        let url = format!(
            "{}/api/v2/measurements/{}/results/",
            self.base_url, measurement_id
        );
        let results: Vec<PingResult> = get_json(&self.client, SERVICE, &url, &[]).await?;
        let mut observations = RttObservation::new();
        for result in results {
            observations
                .entry(result.prb_id)
                .or_default()
                .extend(result.result.iter().filter_map(|reply| reply.rtt));
        }
        Ok(observations)
    }
}

impl MeasurementPlatform for AtlasClient {
    async fn active_vantage_points(
        &self,
        filter: &VantagePointFilter,
        family: AddressFamily,
    ) -> Result<BTreeSet<VantagePoint>, CollaboratorError> {
        let mut query = vec![("status", "1".to_string())];
        match filter {
            VantagePointFilter::Country(code) => query.push(("country_code", code.to_uppercase())),
            VantagePointFilter::Asn(asn) => {
                let key = match family {
                    AddressFamily::V4 => "asn_v4",
                    AddressFamily::V6 => "asn_v6",
                };
                query.push((key, asn.to_string()));
            }
        }

        let mut vantage_points = BTreeSet::new();
        let first_url = format!("{}/api/v2/probes/", self.base_url);
        let mut page: ProbePage = get_json(&self.client, SERVICE, &first_url, &query).await?;
        loop {
            for probe in page.results {
                let asn = match family {
                    AddressFamily::V4 => probe.asn_v4,
                    AddressFamily::V6 => probe.asn_v6,
                };
                let Some(asn) = asn else { continue };
                let Some(geometry) = probe.geometry else { continue };
                if geometry.kind != "Point" || geometry.coordinates.len() < 2 {
                    continue;
                }
                vantage_points.insert(VantagePoint {
                    id: probe.id,
                    asn,
                    latitude: geometry.coordinates[1],
                    longitude: geometry.coordinates[0],
                    country: probe.country_code.unwrap_or_default(),
                });
            }
            match page.next {
                // `next` already carries the filter
                Some(next) => page = get_json(&self.client, SERVICE, &next, &[]).await?,
                None => break,
            }
        }
        debug!("{} active probes for {}", vantage_points.len(), filter);
        Ok(vantage_points)
    }

    async fn ping(&self, request: &PingRequest) -> Result<RttObservation, CollaboratorError> {
        if request.vantage_points.is_empty() {
            return Ok(RttObservation::new());
        }
        let measurement_id = self.create_measurement(request).await?;
        info!(
            "Created measurement {} towards {} from {} probes",
            measurement_id,
            request.target,
            request.vantage_points.len()
        );
        self.wait_for(measurement_id).await;
        self.results(measurement_id).await
    }
}
