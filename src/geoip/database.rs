//! MaxMind database readers.

use std::net::IpAddr;
use std::path::Path;

use log::{debug, info};
use maxminddb::Reader;

use super::gazetteer::Gazetteer;
use super::IpLocator;
use crate::error_handling::ConfigError;
use crate::models::Location;

/// GeoLite2 City and ASN readers plus the largest-city fallback.
///
/// Each part is optional; lookups against a missing part return `None`.
#[derive(Default)]
pub struct GeoIpDatabase {
    city: Option<Reader<Vec<u8>>>,
    asn: Option<Reader<Vec<u8>>>,
    gazetteer: Gazetteer,
}

impl GeoIpDatabase {
    /// Opens the databases that were configured.
    ///
    /// # Errors
    ///
    /// Any configured file that is missing, unreadable or not a MaxMind
    /// database is a configuration error.
    pub fn open(
        city_path: Option<&Path>,
        asn_path: Option<&Path>,
        world_cities: Option<&Path>,
    ) -> Result<Self, ConfigError> {
        let city = city_path
            .map(|path| load_reader(path, "--geoip-city"))
            .transpose()?;
        let asn = asn_path
            .map(|path| load_reader(path, "--geoip-asn"))
            .transpose()?;
        let gazetteer = match world_cities {
            Some(path) => Gazetteer::load(path)?,
            None => Gazetteer::new(),
        };
        Ok(Self {
            city,
            asn,
            gazetteer,
        })
    }

    /// Whether an ASN database is loaded.
    pub fn has_asn_database(&self) -> bool {
        self.asn.is_some()
    }
}

fn load_reader(path: &Path, flag: &'static str) -> Result<Reader<Vec<u8>>, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::MissingFile {
            flag,
            path: path.to_path_buf(),
        });
    }
    let bytes = std::fs::read(path).map_err(|source| ConfigError::Unreadable {
        path: path.to_path_buf(),
        source,
    })?;
    let reader = Reader::from_source(bytes).map_err(|e| ConfigError::InvalidDatabase {
        path: path.to_path_buf(),
        detail: e.to_string(),
    })?;
    info!(
        "Loaded GeoIP database {} (build_{})",
        path.display(),
        reader.metadata.build_epoch
    );
    Ok(reader)
}

impl IpLocator for GeoIpDatabase {
    fn lookup_ip(&self, ip: IpAddr) -> Option<Location> {
        let reader = self.city.as_ref()?;

        // maxminddb 0.27 API: lookup() returns Result<LookupResult, MaxMindDbError>
        let city_lookup = reader.lookup(ip).ok()?;
        if !city_lookup.has_data() {
            return None;
        }
        let city_result: maxminddb::geoip2::City = match city_lookup.decode() {
            Ok(Some(city)) => city,
            Ok(None) | Err(_) => return None,
        };

        let country = city_result.country.iso_code?;
        match city_result.city.names.english {
            Some(city) => Some(Location::new(city, country)),
            None => {
                let city = self.gazetteer.largest_city(country)?;
                debug!(
                    "GeoIP knows only the country of {}, using its largest city {}",
                    ip, city
                );
                Some(Location::new(city, country))
            }
        }
    }

    fn lookup_asn(&self, ip: IpAddr) -> Option<u32> {
        let reader = self.asn.as_ref()?;
        let asn_lookup = reader.lookup(ip).ok()?;
        if !asn_lookup.has_data() {
            return None;
        }
        match asn_lookup.decode::<maxminddb::geoip2::Asn>() {
            Ok(Some(asn)) => asn.autonomous_system_number,
            Ok(None) | Err(_) => None,
        }
    }
}
