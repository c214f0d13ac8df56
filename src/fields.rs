//! Alias fallback-chain access to raw event documents
//!
//! Different producers name the same logical field differently: Suricata
//! emits `src_ip`/`dest_ip` while Zeek logs use `id.orig_h`/`id.resp_h`.
//! Each logical field gets one ordered alias list here so the
//! normalization rule lives in a single place.

use crate::dto::RawEventDocument;

/// Aliases for the representative source address, preferred first
pub const SOURCE_ADDR_FIELDS: &[&str] = &["src_ip", "id.orig_h"];

/// Aliases for the destination address, preferred first
pub const DEST_ADDR_FIELDS: &[&str] = &["dest_ip", "id.resp_h"];

/// Aliases for the alert signature
pub const SIGNATURE_FIELDS: &[&str] = &["alert.signature", "note"];

/// Aliases for the event severity. The alert-specific field wins over the
/// generic one; this matches observed producer output but is not a
/// documented guarantee upstream.
pub const SEVERITY_FIELDS: &[&str] = &["alert.severity", "severity"];

/// Resolve one alias against a document. A dotted alias is tried first as a
/// literal key (some shippers flatten Zeek fields) and then as a nested
/// object path.
fn resolve<'a>(doc: &'a RawEventDocument, alias: &str) -> Option<&'a serde_json::Value> {
    if let Some(value) = doc.get(alias) {
        return Some(value);
    }

    if !alias.contains('.') {
        return None;
    }

    let mut current = doc;
    for segment in alias.split('.') {
        current = current.get(segment)?;
    }
    Some(current)
}

/// First non-null value along the alias chain
pub fn first_value<'a>(
    doc: &'a RawEventDocument,
    aliases: &[&str],
) -> Option<&'a serde_json::Value> {
    aliases
        .iter()
        .filter_map(|alias| resolve(doc, alias))
        .find(|value| !value.is_null())
}

/// First string value along the alias chain
pub fn first_string(doc: &RawEventDocument, aliases: &[&str]) -> Option<String> {
    first_value(doc, aliases)
        .and_then(|value| value.as_str())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_preferred_alias_wins() {
        let doc = json!({"src_ip": "10.0.0.1", "id.orig_h": "10.0.0.2"});
        assert_eq!(
            first_string(&doc, SOURCE_ADDR_FIELDS),
            Some("10.0.0.1".to_string())
        );
    }

    #[test]
    fn test_fallback_to_literal_dotted_key() {
        let doc = json!({"id.orig_h": "192.168.1.7"});
        assert_eq!(
            first_string(&doc, SOURCE_ADDR_FIELDS),
            Some("192.168.1.7".to_string())
        );
    }

    #[test]
    fn test_fallback_to_nested_path() {
        let doc = json!({"id": {"orig_h": "192.168.1.7", "resp_h": "8.8.8.8"}});
        assert_eq!(
            first_string(&doc, SOURCE_ADDR_FIELDS),
            Some("192.168.1.7".to_string())
        );
        assert_eq!(
            first_string(&doc, DEST_ADDR_FIELDS),
            Some("8.8.8.8".to_string())
        );
    }

    #[test]
    fn test_missing_everywhere_is_none() {
        let doc = json!({"message": "no addresses here"});
        assert_eq!(first_string(&doc, SOURCE_ADDR_FIELDS), None);
    }

    #[test]
    fn test_null_value_skipped() {
        let doc = json!({"src_ip": null, "id.orig_h": "172.16.0.1"});
        assert_eq!(
            first_string(&doc, SOURCE_ADDR_FIELDS),
            Some("172.16.0.1".to_string())
        );
    }

    #[test]
    fn test_severity_precedence() {
        let doc = json!({"alert": {"severity": 3}, "severity": 1});
        assert_eq!(first_value(&doc, SEVERITY_FIELDS), Some(&json!(3)));

        let doc = json!({"severity": 1});
        assert_eq!(first_value(&doc, SEVERITY_FIELDS), Some(&json!(1)));
    }
}
