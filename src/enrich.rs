//! Per-event enrichment
//!
//! Extracts a representative source address from a raw document and
//! attaches best-effort geo/ASN context. Nothing in this stage can fail a
//! request: a missing address, an absent capability, or a lookup miss each
//! degrade to an absent enrichment half.

use crate::dto::{Enrichment, RawEventDocument};
use crate::fields::{self, SOURCE_ADDR_FIELDS};
use crate::geoip::GeoProvider;

/// Extract the representative source address via the alias chain
pub fn source_address(doc: &RawEventDocument) -> Option<String> {
    fields::first_string(doc, SOURCE_ADDR_FIELDS)
}

/// Enrich one raw document. The city and ASN lookups are independent; a
/// miss in one never affects the other.
pub fn enrich(doc: &RawEventDocument, provider: &dyn GeoProvider) -> Enrichment {
    let Some(addr) = source_address(doc) else {
        return Enrichment::default();
    };

    Enrichment {
        geo: provider.city(&addr),
        asn: provider.asn(&addr),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dto::{AsnRecord, GeoRecord};
    use serde_json::json;
    use std::collections::HashMap;

    /// Canned provider keyed by address string
    #[derive(Default)]
    struct StubProvider {
        geo: HashMap<String, GeoRecord>,
        asn: HashMap<String, AsnRecord>,
    }

    impl GeoProvider for StubProvider {
        fn city(&self, addr: &str) -> Option<GeoRecord> {
            self.geo.get(addr).cloned()
        }

        fn asn(&self, addr: &str) -> Option<AsnRecord> {
            self.asn.get(addr).cloned()
        }
    }

    fn geo_record() -> GeoRecord {
        GeoRecord {
            country: Some("TH".to_string()),
            city: Some("Bangkok".to_string()),
            latitude: Some(13.736717),
            longitude: Some(100.523186),
        }
    }

    fn asn_record() -> AsnRecord {
        AsnRecord {
            num: Some(15169),
            org: Some("GOOGLE".to_string()),
        }
    }

    #[test]
    fn test_no_address_skips_lookups() {
        let provider = StubProvider::default();
        let result = enrich(&json!({"note": "no source field"}), &provider);
        assert_eq!(result.geo, None);
        assert_eq!(result.asn, None);
    }

    #[test]
    fn test_alias_fallback_matches_canonical_field() {
        let mut provider = StubProvider::default();
        provider.geo.insert("203.0.113.9".to_string(), geo_record());

        let canonical = enrich(&json!({"src_ip": "203.0.113.9"}), &provider);
        let fallback = enrich(&json!({"id.orig_h": "203.0.113.9"}), &provider);
        assert_eq!(canonical.geo, fallback.geo);
        assert_eq!(canonical.geo, Some(geo_record()));
    }

    #[test]
    fn test_lookup_miss_in_both_databases() {
        let provider = StubProvider::default();
        let result = enrich(&json!({"src_ip": "198.51.100.1"}), &provider);
        assert_eq!(result.geo, None);
        assert_eq!(result.asn, None);
    }

    #[test]
    fn test_asn_only_match_leaves_geo_absent() {
        let mut provider = StubProvider::default();
        provider.asn.insert("8.8.8.8".to_string(), asn_record());

        let result = enrich(&json!({"src_ip": "8.8.8.8"}), &provider);
        assert_eq!(result.geo, None);
        assert_eq!(result.asn, Some(asn_record()));
    }
}
