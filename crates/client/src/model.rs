use serde::{Deserialize, Serialize};

/// A record in the governance registry (Immuta data source).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogRecord {
    pub id: String,
    pub name: String,
    /// Whether the record already carries catalog-link metadata.
    #[serde(default)]
    pub linked: bool,
}

/// A resource in the external catalog, reduced to what linking needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalResource {
    pub id: String,
    pub name: String,
}

/// Result of a single link write. A rejection is reported, not raised, so
/// one bad record does not abort the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkOutcome {
    Linked,
    Rejected { status: u16, message: String },
}

/// Ids come back as strings from Collibra and as integers from Immuta.
pub(crate) fn id_string(value: &serde_json::Value) -> Option<String> {
    value
        .as_str()
        .map(String::from)
        .or_else(|| value.as_i64().map(|n| n.to_string()))
        .or_else(|| value.as_u64().map(|n| n.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_string() {
        assert_eq!(id_string(&serde_json::json!("abc")), Some("abc".into()));
        assert_eq!(id_string(&serde_json::json!(42)), Some("42".into()));
        assert_eq!(id_string(&serde_json::json!(null)), None);
        assert_eq!(id_string(&serde_json::json!({"id": 1})), None);
    }

    #[test]
    fn test_record_linked_defaults_false() {
        let record: CatalogRecord = serde_json::from_str(r#"{"id":"7","name":"orders"}"#).unwrap();
        assert!(!record.linked);
    }
}
