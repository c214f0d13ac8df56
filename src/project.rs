//! Projection of raw producer documents into the stable output schema
//!
//! Pure field mapping with fallback chains; performs no I/O and cannot
//! fail. Unknown producer fields are simply dropped.

use crate::dto::{EnrichedEvent, Enrichment, RawEventDocument};
use crate::fields::{self, DEST_ADDR_FIELDS, SEVERITY_FIELDS, SIGNATURE_FIELDS, SOURCE_ADDR_FIELDS};

/// Merge a raw document with its enrichment into the output projection
pub fn project(doc: &RawEventDocument, enrichment: Enrichment) -> EnrichedEvent {
    EnrichedEvent {
        ts: doc.get("@timestamp").filter(|v| !v.is_null()).cloned(),
        src_ip: fields::first_string(doc, SOURCE_ADDR_FIELDS),
        dest_ip: fields::first_string(doc, DEST_ADDR_FIELDS),
        signature: fields::first_string(doc, SIGNATURE_FIELDS),
        severity: fields::first_value(doc, SEVERITY_FIELDS).cloned(),
        http: doc.get("http").filter(|v| !v.is_null()).cloned(),
        dns: doc.get("dns").filter(|v| !v.is_null()).cloned(),
        geo: enrichment.geo,
        asn: enrichment.asn,
    }
}
