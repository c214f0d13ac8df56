//! Data Transfer Objects for the GeoTrace event API
//! Defines the bounded event query plus the enrichment and response structures

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Default result limit when the caller supplies none or garbage
pub const DEFAULT_LIMIT: u32 = 200;

/// Hard ceiling on the result limit, even for explicit caller values
pub const MAX_LIMIT: u32 = 1000;

/// A raw event document exactly as returned by the search backend.
/// Shape varies by producer, so access goes through the alias chains
/// in [`crate::fields`].
pub type RawEventDocument = serde_json::Value;

/// Validated, bounded query description for one events request.
///
/// Time bounds are opaque expressions the backend interprets itself
/// (relative date math like `now-1h` or absolute timestamps).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EventQuery {
    /// Inclusive lower time bound
    pub since: String,

    /// Inclusive upper time bound
    pub until: String,

    /// Minimum alert severity, inclusive
    pub min_severity: f64,

    /// Maximum number of hits to return, always within [1, MAX_LIMIT]
    pub limit: u32,
}

impl Default for EventQuery {
    fn default() -> Self {
        Self {
            since: "now-1h".to_string(),
            until: "now".to_string(),
            min_severity: 0.0,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl EventQuery {
    /// Build a query from raw request parameters. Total function: bad input
    /// falls back to defaults and limits are clamped, never rejected.
    pub fn from_params(params: &HashMap<String, String>) -> Self {
        let mut query = EventQuery::default();

        if let Some(since) = params.get("since") {
            query.since = since.clone();
        }

        if let Some(until) = params.get("until") {
            query.until = until.clone();
        }

        if let Some(severity) = params.get("severity") {
            query.min_severity = severity.parse().unwrap_or(0.0);
        }

        if let Some(size) = params.get("size") {
            let parsed = size.parse::<i64>().ok().filter(|n| *n > 0);
            query.limit = match parsed {
                Some(n) => (n.min(MAX_LIMIT as i64)) as u32,
                None => DEFAULT_LIMIT,
            };
        }

        query
    }
}

/// City-level location context for a source address
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GeoRecord {
    /// ISO country code
    pub country: Option<String>,
    /// English city name
    pub city: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// Autonomous-system context for a source address
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AsnRecord {
    /// Autonomous system number
    pub num: Option<u32>,
    /// Owning organization
    pub org: Option<String>,
}

/// Best-effort enrichment for one event. Either half is `None` when the
/// capability is unavailable or the lookup misses; the two cases are
/// indistinguishable by design.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Enrichment {
    pub geo: Option<GeoRecord>,
    pub asn: Option<AsnRecord>,
}

/// Stable output projection of one event, regardless of which producer
/// emitted it. Wire field names follow the original API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichedEvent {
    /// Event timestamp as reported by the store
    pub ts: Option<serde_json::Value>,
    pub src_ip: Option<String>,
    pub dest_ip: Option<String>,
    /// Alert signature or generic note
    pub signature: Option<String>,
    /// Severity value passed through verbatim
    pub severity: Option<serde_json::Value>,
    /// HTTP transaction detail, verbatim when present
    pub http: Option<serde_json::Value>,
    /// DNS transaction detail, verbatim when present
    pub dns: Option<serde_json::Value>,
    pub geo: Option<GeoRecord>,
    pub asn: Option<AsnRecord>,
}

/// Response body for the events endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventsResponse {
    pub items: Vec<EnrichedEvent>,
}

/// Response body for the health endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub ok: bool,
    /// Backend identifier (Elasticsearch base URL)
    pub elastic: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_query_defaults() {
        let query = EventQuery::from_params(&HashMap::new());
        assert_eq!(query.since, "now-1h");
        assert_eq!(query.until, "now");
        assert_eq!(query.min_severity, 0.0);
        assert_eq!(query.limit, DEFAULT_LIMIT);
    }

    #[test]
    fn test_size_clamped_to_ceiling() {
        let query = EventQuery::from_params(&params(&[("size", "5000")]));
        assert_eq!(query.limit, MAX_LIMIT);
    }

    #[test]
    fn test_size_zero_falls_back_to_default() {
        let query = EventQuery::from_params(&params(&[("size", "0")]));
        assert_eq!(query.limit, DEFAULT_LIMIT);
    }

    #[test]
    fn test_size_negative_falls_back_to_default() {
        let query = EventQuery::from_params(&params(&[("size", "-5")]));
        assert_eq!(query.limit, DEFAULT_LIMIT);
    }

    #[test]
    fn test_size_garbage_falls_back_to_default() {
        let query = EventQuery::from_params(&params(&[("size", "abc")]));
        assert_eq!(query.limit, DEFAULT_LIMIT);
    }

    #[test]
    fn test_size_in_range_kept() {
        let query = EventQuery::from_params(&params(&[("size", "37")]));
        assert_eq!(query.limit, 37);
    }

    #[test]
    fn test_severity_parses_as_float() {
        let query = EventQuery::from_params(&params(&[("severity", "2.5")]));
        assert_eq!(query.min_severity, 2.5);
    }

    #[test]
    fn test_severity_garbage_coerces_to_zero() {
        let query = EventQuery::from_params(&params(&[("severity", "abc")]));
        assert_eq!(query.min_severity, 0.0);
    }

    #[test]
    fn test_time_bounds_passed_through() {
        let query = EventQuery::from_params(&params(&[
            ("since", "2024-01-01T00:00:00Z"),
            ("until", "now-5m"),
        ]));
        assert_eq!(query.since, "2024-01-01T00:00:00Z");
        assert_eq!(query.until, "now-5m");
    }
}
