//! MiniSOC GeoTrace
//!
//! Read-only query API over a security-event log store, enriching each
//! returned event with GeoIP city and ASN context for its source address.

pub mod config;
pub mod dto;
pub mod enrich;
pub mod error;
pub mod fields;
pub mod geoip;
pub mod handlers;
pub mod project;
pub mod search;
