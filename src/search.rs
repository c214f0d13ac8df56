//! Search gateway to the Elasticsearch event store
//!
//! The gateway executes one bounded query per request and returns raw hit
//! documents in backend order (timestamp descending). Time bounds are
//! handed to the backend verbatim; Elasticsearch interprets both date math
//! (`now-1h`) and absolute timestamps itself.

use crate::config::Config;
use crate::dto::{EventQuery, RawEventDocument};
use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

/// Failures at or above the backend-query boundary. These propagate to the
/// caller as a structured error response; the gateway never retries.
#[derive(Error, Debug)]
pub enum SearchError {
    #[error("search backend request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("search backend returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("malformed search response: {0}")]
    Malformed(String),
}

/// Query execution seam between the request pipeline and the event store
#[async_trait]
pub trait SearchGateway: Send + Sync {
    /// Execute a query and return raw hits, newest first, at most
    /// `query.limit` of them
    async fn execute(&self, query: &EventQuery) -> Result<Vec<RawEventDocument>, SearchError>;
}

/// Elasticsearch-backed gateway using the HTTP `_search` API
pub struct ElasticGateway {
    client: reqwest::Client,
    config: Arc<Config>,
}

impl ElasticGateway {
    pub fn new(config: Arc<Config>) -> Result<Self, SearchError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()?;

        Ok(Self { client, config })
    }

    fn search_url(&self) -> String {
        format!(
            "{}{}/_search",
            self.config.elastic.url,
            self.config.index_path()
        )
    }
}

/// Build the `_search` request body for a bounded query
pub fn build_search_body(query: &EventQuery) -> serde_json::Value {
    json!({
        "size": query.limit,
        "sort": [{"@timestamp": {"order": "desc"}}],
        "query": {
            "bool": {
                "filter": [
                    {"range": {"@timestamp": {"gte": query.since, "lte": query.until}}},
                    {"range": {"alert.severity": {"gte": query.min_severity}}}
                ]
            }
        }
    })
}

/// Pull the `_source` documents out of a search response, preserving order
fn extract_hits(body: serde_json::Value) -> Result<Vec<RawEventDocument>, SearchError> {
    let hits = body
        .get("hits")
        .and_then(|h| h.get("hits"))
        .and_then(|h| h.as_array())
        .ok_or_else(|| SearchError::Malformed("missing hits.hits array".to_string()))?;

    Ok(hits
        .iter()
        .map(|hit| hit.get("_source").cloned().unwrap_or(serde_json::Value::Null))
        .collect())
}

#[async_trait]
impl SearchGateway for ElasticGateway {
    async fn execute(&self, query: &EventQuery) -> Result<Vec<RawEventDocument>, SearchError> {
        let body = build_search_body(query);
        debug!("Executing search: {}", body);

        let response = self
            .client
            .post(self.search_url())
            .basic_auth(
                &self.config.elastic.username,
                Some(&self.config.elastic.password),
            )
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(SearchError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let body: serde_json::Value = response.json().await?;
        extract_hits(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;

    #[test]
    fn test_search_body_shape() {
        let query = EventQuery {
            since: "now-1h".to_string(),
            until: "now".to_string(),
            min_severity: 2.0,
            limit: 10,
        };

        let body = build_search_body(&query);
        assert_eq!(body["size"], json!(10));
        assert_eq!(body["sort"], json!([{"@timestamp": {"order": "desc"}}]));

        let filters = body["query"]["bool"]["filter"].as_array().unwrap();
        assert_eq!(filters.len(), 2);
        assert_eq!(filters[0]["range"]["@timestamp"]["gte"], json!("now-1h"));
        assert_eq!(filters[0]["range"]["@timestamp"]["lte"], json!("now"));
        assert_eq!(filters[1]["range"]["alert.severity"]["gte"], json!(2.0));
    }

    #[test]
    fn test_search_body_uses_resolved_limit() {
        let params: HashMap<String, String> =
            [("size".to_string(), "5000".to_string())].into_iter().collect();
        let query = EventQuery::from_params(&params);
        let body = build_search_body(&query);
        assert_eq!(body["size"], json!(1000));
    }

    #[test]
    fn test_extract_hits_preserves_order() {
        let body = json!({
            "hits": {
                "hits": [
                    {"_source": {"src_ip": "10.0.0.1"}},
                    {"_source": {"src_ip": "10.0.0.2"}},
                    {"_source": {"src_ip": "10.0.0.3"}}
                ]
            }
        });

        let docs = extract_hits(body).unwrap();
        assert_eq!(docs.len(), 3);
        assert_eq!(docs[0]["src_ip"], json!("10.0.0.1"));
        assert_eq!(docs[2]["src_ip"], json!("10.0.0.3"));
    }

    #[test]
    fn test_extract_hits_rejects_malformed_body() {
        let result = extract_hits(json!({"took": 3}));
        assert!(matches!(result, Err(SearchError::Malformed(_))));
    }
}
