//! GeoIP lookup capabilities backed by MaxMind GeoLite2 databases
//!
//! The city and ASN readers are two independent capabilities. Each starts
//! absent and transitions at most once to ready when the background loader
//! finishes; a load failure leaves that capability absent for the process
//! lifetime. Lookups against an absent capability degrade to `None`.

use crate::config::GeoIpConfig;
use crate::dto::{AsnRecord, GeoRecord};
use maxminddb::geoip2;
use std::net::IpAddr;
use std::sync::{Arc, OnceLock};
use tracing::{info, warn};

/// Lookup capabilities consumed by the enrichment stage. Implementations
/// must never fail: unavailable data is `None`.
pub trait GeoProvider: Send + Sync {
    /// City-level location for an address, if known
    fn city(&self, addr: &str) -> Option<GeoRecord>;

    /// Autonomous-system context for an address, if known
    fn asn(&self, addr: &str) -> Option<AsnRecord>;
}

/// Process-wide GeoIP context holding the two write-once readers
#[derive(Default)]
pub struct GeoContext {
    city_reader: OnceLock<maxminddb::Reader<Vec<u8>>>,
    asn_reader: OnceLock<maxminddb::Reader<Vec<u8>>>,
}

impl GeoContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the city capability has become ready
    pub fn city_ready(&self) -> bool {
        self.city_reader.get().is_some()
    }

    /// Whether the ASN capability has become ready
    pub fn asn_ready(&self) -> bool {
        self.asn_reader.get().is_some()
    }
}

impl GeoProvider for GeoContext {
    fn city(&self, addr: &str) -> Option<GeoRecord> {
        let reader = self.city_reader.get()?;
        let ip: IpAddr = addr.parse().ok()?;
        let city: geoip2::City = reader.lookup(ip).ok()?;

        Some(GeoRecord {
            country: city
                .country
                .as_ref()
                .and_then(|c| c.iso_code)
                .map(str::to_string),
            city: city
                .city
                .as_ref()
                .and_then(|c| c.names.as_ref())
                .and_then(|names| names.get("en"))
                .map(|name| name.to_string()),
            latitude: city.location.as_ref().and_then(|l| l.latitude),
            longitude: city.location.as_ref().and_then(|l| l.longitude),
        })
    }

    fn asn(&self, addr: &str) -> Option<AsnRecord> {
        let reader = self.asn_reader.get()?;
        let ip: IpAddr = addr.parse().ok()?;
        let asn: geoip2::Asn = reader.lookup(ip).ok()?;

        Some(AsnRecord {
            num: asn.autonomous_system_number,
            org: asn.autonomous_system_organization.map(str::to_string),
        })
    }
}

/// Spawn the one-time database loader. Runs concurrently with request
/// handling; early requests simply see the capabilities as absent.
pub fn spawn_loader(
    context: Arc<GeoContext>,
    config: GeoIpConfig,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        match open_reader(config.city_db_path.clone()).await {
            Ok(reader) => {
                let _ = context.city_reader.set(reader);
                info!("City database loaded from {}", config.city_db_path);
            }
            Err(e) => warn!("City DB not loaded: {}", e),
        }

        match open_reader(config.asn_db_path.clone()).await {
            Ok(reader) => {
                let _ = context.asn_reader.set(reader);
                info!("ASN database loaded from {}", config.asn_db_path);
            }
            Err(e) => warn!("ASN DB not loaded: {}", e),
        }
    })
}

/// Open one mmdb file off the async executor
async fn open_reader(path: String) -> anyhow::Result<maxminddb::Reader<Vec<u8>>> {
    let reader =
        tokio::task::spawn_blocking(move || maxminddb::Reader::open_readfile(&path)).await??;
    Ok(reader)
}
