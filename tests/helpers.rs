// Shared in-memory collaborators for the integration tests.
//
// Each fake implements one collaborator trait from static tables and records
// what it was asked, so tests can check the calls made by the pipeline.

use std::cell::{Cell, RefCell};
use std::collections::{BTreeSet, HashMap};
use std::net::IpAddr;
use std::rc::Rc;

use rtt_geoloc::atlas::{MeasurementPlatform, PingRequest, VantagePointFilter};
use rtt_geoloc::error_handling::CollaboratorError;
use rtt_geoloc::geocode::{ForwardGeocode, Geocoder, ReverseGeocode};
use rtt_geoloc::geoip::IpLocator;
use rtt_geoloc::models::{AddressFamily, Coordinates, Location, RttObservation, VantagePoint};
use rtt_geoloc::peeringdb::PresenceSource;

/// Builds a vantage point.
#[allow(dead_code)] // Used by other test files
pub fn vantage_point(id: u64, asn: u32, latitude: f64, longitude: f64, country: &str) -> VantagePoint {
    VantagePoint {
        id,
        asn,
        latitude,
        longitude,
        country: country.to_string(),
    }
}

/// Presence known per ASN.
#[derive(Default)]
pub struct FakePresence {
    pub locations: HashMap<u32, BTreeSet<Location>>,
}

impl PresenceSource for FakePresence {
    async fn asn_locations(&self, asn: u32) -> BTreeSet<Location> {
        self.locations.get(&asn).cloned().unwrap_or_default()
    }

    async fn exchange_fabric_asn(&self, _ip: IpAddr) -> Option<u32> {
        None
    }
}

/// GeoIP answers per address.
#[derive(Default)]
pub struct FakeLocator {
    pub locations: HashMap<IpAddr, Location>,
    pub asns: HashMap<IpAddr, u32>,
    /// Addresses of every batch lookup
    pub batch_lookups: Rc<RefCell<Vec<Vec<IpAddr>>>>,
    /// Addresses looked up one by one
    pub single_lookups: Rc<RefCell<Vec<IpAddr>>>,
}

impl IpLocator for FakeLocator {
    fn lookup_ip(&self, ip: IpAddr) -> Option<Location> {
        self.single_lookups.borrow_mut().push(ip);
        self.locations.get(&ip).cloned()
    }

    fn lookup_asn(&self, ip: IpAddr) -> Option<u32> {
        self.asns.get(&ip).copied()
    }

    fn lookup_ips(&self, ips: &[IpAddr]) -> Vec<(IpAddr, Location)> {
        self.batch_lookups.borrow_mut().push(ips.to_vec());
        ips.iter()
            .filter_map(|ip| self.locations.get(ip).map(|location| (*ip, location.clone())))
            .collect()
    }
}

/// Geocoder with fixed answers; reverse geocoding answers the same names
/// everywhere.
#[derive(Default)]
pub struct FakeGeocoder {
    pub forward: HashMap<Location, ForwardGeocode>,
    pub reverse: Option<ReverseGeocode>,
    /// Number of forward queries received
    pub forward_calls: Cell<usize>,
}

#[allow(dead_code)] // Used by other test files
impl FakeGeocoder {
    /// Registers the position of `city`.
    pub fn with_city(mut self, city: &str, country: &str, latitude: f64, longitude: f64) -> Self {
        self.forward.insert(
            Location::new(city, country),
            ForwardGeocode {
                coordinates: Coordinates::new(latitude, longitude),
                city: city.to_string(),
                country: country.to_string(),
            },
        );
        self
    }
}

impl Geocoder for FakeGeocoder {
    async fn forward(&self, location: &Location) -> Result<Option<ForwardGeocode>, CollaboratorError> {
        self.forward_calls.set(self.forward_calls.get() + 1);
        Ok(self.forward.get(location).cloned())
    }

    async fn reverse(&self, _coordinates: Coordinates) -> Result<Option<ReverseGeocode>, CollaboratorError> {
        Ok(self.reverse.clone())
    }
}

/// Measurement platform answering from static tables.
#[derive(Default)]
pub struct FakePlatform {
    /// Vantage points listed per country code (uppercase)
    pub countries: HashMap<String, BTreeSet<VantagePoint>>,
    /// Vantage points listed per ASN
    pub networks: HashMap<u32, BTreeSet<VantagePoint>>,
    /// RTT samples returned per vantage point; absent ones do not answer
    pub rtts: HashMap<u64, Vec<f64>>,
    /// Batch index (0-based) that fails, and whether the failure is fatal
    pub failing_batch: Option<(usize, bool)>,
    /// Every ping request received
    pub requests: RefCell<Vec<PingRequest>>,
    /// Every listing request received
    pub listings: RefCell<Vec<VantagePointFilter>>,
    /// Number of upcoming listing requests that fail
    pub failing_listings: Cell<usize>,
}

#[allow(dead_code)] // Used by other test files
impl FakePlatform {
    /// Lists `vantage_point` under its country and its network.
    pub fn add(&mut self, vantage_point: VantagePoint) {
        self.countries
            .entry(vantage_point.country.to_uppercase())
            .or_default()
            .insert(vantage_point.clone());
        self.networks
            .entry(vantage_point.asn)
            .or_default()
            .insert(vantage_point);
    }

    /// Vantage point ids of every batch, in request order.
    pub fn batches(&self) -> Vec<Vec<u64>> {
        self.requests
            .borrow()
            .iter()
            .map(|r| r.vantage_points.clone())
            .collect()
    }

    /// Targets that were pinged.
    pub fn targets(&self) -> Vec<IpAddr> {
        self.requests.borrow().iter().map(|r| r.target).collect()
    }
}

impl MeasurementPlatform for FakePlatform {
    async fn active_vantage_points(
        &self,
        filter: &VantagePointFilter,
        _family: AddressFamily,
    ) -> Result<BTreeSet<VantagePoint>, CollaboratorError> {
        self.listings.borrow_mut().push(filter.clone());
        if self.failing_listings.get() > 0 {
            self.failing_listings.set(self.failing_listings.get() - 1);
            return Err(CollaboratorError::Status {
                service: "RIPE Atlas",
                status: 502,
                body: "Bad Gateway".to_string(),
            });
        }
        let found = match filter {
            VantagePointFilter::Country(code) => self.countries.get(code),
            VantagePointFilter::Asn(asn) => self.networks.get(asn),
        };
        Ok(found.cloned().unwrap_or_default())
    }

    async fn ping(&self, request: &PingRequest) -> Result<RttObservation, CollaboratorError> {
        let index = self.requests.borrow().len();
        self.requests.borrow_mut().push(request.clone());
        if let Some((failing, fatal)) = self.failing_batch {
            if failing == index {
                return Err(if fatal {
                    CollaboratorError::Rejected {
                        service: "RIPE Atlas",
                        detail: "Invalid API key".to_string(),
                    }
                } else {
                    CollaboratorError::Status {
                        service: "RIPE Atlas",
                        status: 503,
                        body: "Service Unavailable".to_string(),
                    }
                });
            }
        }
        Ok(request
            .vantage_points
            .iter()
            .filter_map(|id| self.rtts.get(id).map(|samples| (*id, samples.clone())))
            .collect())
    }
}
