//! RIPE Atlas API request and response bodies.

use serde::{Deserialize, Serialize};

/// One page of `/api/v2/probes/`.
#[derive(Debug, Deserialize)]
pub(crate) struct ProbePage {
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub results: Vec<Probe>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Probe {
    pub id: u64,
    #[serde(default)]
    pub asn_v4: Option<u32>,
    #[serde(default)]
    pub asn_v6: Option<u32>,
    #[serde(default)]
    pub country_code: Option<String>,
    #[serde(default)]
    pub geometry: Option<Geometry>,
}

/// GeoJSON geometry; `coordinates` is `[longitude, latitude]` for points.
#[derive(Debug, Deserialize)]
pub(crate) struct Geometry {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub coordinates: Vec<f64>,
}

#[derive(Debug, Serialize)]
pub(crate) struct MeasurementRequest {
    pub definitions: Vec<PingDefinition>,
    pub probes: Vec<ProbeSource>,
    pub is_oneoff: bool,
    pub start_time: i64,
}

#[derive(Debug, Serialize)]
pub(crate) struct PingDefinition {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub af: u8,
    pub target: String,
    pub description: String,
    pub packets: u32,
}

#[derive(Debug, Serialize)]
pub(crate) struct ProbeSource {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub value: String,
    pub requested: usize,
}

#[derive(Debug, Deserialize)]
pub(crate) struct MeasurementCreated {
    pub measurements: Vec<u64>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct MeasurementInfo {
    pub status: MeasurementStatus,
}

#[derive(Debug, Deserialize)]
pub(crate) struct MeasurementStatus {
    pub name: String,
}

/// Result of one probe in `/api/v2/measurements/{id}/results/`.
#[derive(Debug, Deserialize)]
pub(crate) struct PingResult {
    pub prb_id: u64,
    #[serde(default)]
    pub result: Vec<PingReply>,
}

/// A reply; timeouts carry `"x": "*"` instead of `rtt`.
#[derive(Debug, Deserialize)]
pub(crate) struct PingReply {
    #[serde(default)]
    pub rtt: Option<f64>,
}
