//! Best-effort IP geolocation against an offline MaxMind database.
//!
//! Loopback and private addresses short-circuit to `Local` without touching
//! the dataset. Misses, unparseable addresses and lookup failures all come
//! back as `Unknown`; nothing here ever fails the caller.

use maxminddb::{geoip2, MaxMindDBError, Reader};
use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::path::Path;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::limits::UNKNOWN;

/// Resolved location of a client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub country: String,
    pub city: String,
    pub region: String,
}

impl Location {
    fn filled(value: &str) -> Self {
        Self {
            country: value.to_string(),
            city: value.to_string(),
            region: value.to_string(),
        }
    }

    /// Location reported for loopback and private addresses.
    pub fn local() -> Self {
        Self::filled("Local")
    }

    /// Location reported when the dataset has no answer.
    pub fn unknown() -> Self {
        Self::filled(UNKNOWN)
    }
}

/// Raw dataset hit; any field may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeoRecord {
    pub country: Option<String>,
    pub city: Option<String>,
    pub region: Option<String>,
}

/// Read-only IP-to-location dataset.
pub trait GeoLookup: Send + Sync {
    /// Look up an address. `Ok(None)` means the dataset has no entry.
    fn lookup(&self, ip: IpAddr) -> Result<Option<GeoRecord>>;
}

/// MaxMind GeoLite2/GeoIP2 City database loaded into memory.
pub struct MaxMindLookup {
    reader: Reader<Vec<u8>>,
}

impl MaxMindLookup {
    /// Load the database at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let reader = Reader::open_readfile(path)
            .map_err(|e| Error::geo(format!("{}: {}", path.display(), e)))?;
        Ok(Self { reader })
    }
}

impl GeoLookup for MaxMindLookup {
    fn lookup(&self, ip: IpAddr) -> Result<Option<GeoRecord>> {
        let city: geoip2::City = match self.reader.lookup(ip) {
            Ok(city) => city,
            Err(MaxMindDBError::AddressNotFoundError(_)) => return Ok(None),
            Err(e) => return Err(Error::geo(e.to_string())),
        };

        let country = city
            .country
            .as_ref()
            .and_then(|c| c.iso_code)
            .map(str::to_string);

        let region = city
            .subdivisions
            .as_ref()
            .and_then(|subs| subs.first())
            .and_then(|sub| sub.iso_code)
            .map(str::to_string);

        let city = city
            .city
            .as_ref()
            .and_then(|c| c.names.as_ref())
            .and_then(|names| names.get("en"))
            .map(|s| s.to_string());

        Ok(Some(GeoRecord {
            country,
            city,
            region,
        }))
    }
}

/// Resolves client addresses to locations.
///
/// Works without a dataset: every public address then resolves to `Unknown`.
pub struct GeoResolver {
    dataset: Option<Box<dyn GeoLookup>>,
}

impl GeoResolver {
    pub fn new(dataset: Box<dyn GeoLookup>) -> Self {
        Self {
            dataset: Some(dataset),
        }
    }

    /// Resolver with no dataset.
    pub fn disabled() -> Self {
        Self { dataset: None }
    }

    /// Open a MaxMind database, falling back to a disabled resolver.
    pub fn from_path(path: Option<&str>) -> Self {
        let Some(path) = path else {
            return Self::disabled();
        };

        match MaxMindLookup::open(path) {
            Ok(lookup) => Self::new(Box::new(lookup)),
            Err(e) => {
                warn!(error = %e, "GeoIP database unavailable, locations will be Unknown");
                Self::disabled()
            }
        }
    }

    pub fn has_dataset(&self) -> bool {
        self.dataset.is_some()
    }

    /// Resolve an address string to a location.
    pub fn resolve(&self, ip: &str) -> Location {
        if is_local(ip) {
            return Location::local();
        }

        let Some(dataset) = self.dataset.as_ref() else {
            return Location::unknown();
        };

        let Ok(addr) = ip.parse::<IpAddr>() else {
            debug!(ip = %ip, "Unparseable client address");
            return Location::unknown();
        };

        match dataset.lookup(addr) {
            Ok(Some(record)) => Location {
                country: record.country.unwrap_or_else(|| UNKNOWN.to_string()),
                city: record.city.unwrap_or_else(|| UNKNOWN.to_string()),
                region: record.region.unwrap_or_else(|| UNKNOWN.to_string()),
            },
            Ok(None) => Location::unknown(),
            Err(e) => {
                warn!(ip = %ip, error = %e, "Error looking up location");
                Location::unknown()
            }
        }
    }
}

/// Loopback and the private ranges treated as local.
pub fn is_local(ip: &str) -> bool {
    ip == "127.0.0.1" || ip == "::1" || ip.starts_with("192.168.") || ip.starts_with("10.")
}
