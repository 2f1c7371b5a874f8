//! Structured before/after values recorded on a changeset
//!
//! `previous_value` is a [`MetadataSnapshot`] of the catalog fields Curator
//! knows about. `new_value` is a [`RequestedChanges`] list of the edits that
//! were asked for. Both serialize to JSON objects so stored rows stay readable
//! by older and newer releases: unknown snapshot keys survive a round trip in
//! `extra`, and the change list keeps the `change_<n>` object layout.

use crate::{ApplyChange, EntityMetadata};
use serde::de::Error as _;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;

// ============================================================================
// METADATA SNAPSHOT
// ============================================================================

/// Catalog metadata as it was before a batch was applied.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetadataSnapshot {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub glossary_terms: Vec<String>,
    #[serde(default)]
    pub owners: Vec<String>,
    /// Fields written by a newer release that this one does not model
    #[serde(flatten, default)]
    pub extra: BTreeMap<String, JsonValue>,
}

impl From<EntityMetadata> for MetadataSnapshot {
    fn from(meta: EntityMetadata) -> Self {
        Self {
            description: meta.description,
            tags: meta.tags,
            glossary_terms: meta.glossary_terms,
            owners: meta.owners,
            extra: BTreeMap::new(),
        }
    }
}

impl MetadataSnapshot {
    /// The snapshotted description, if one was set.
    pub fn description(&self) -> Option<&str> {
        Some(self.description.as_str()).filter(|d| !d.is_empty())
    }
}

// ============================================================================
// REQUESTED CHANGES
// ============================================================================

/// The ordered edits of one batch, exactly as confirmed by the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestedChanges(pub Vec<ApplyChange>);

const CHANGE_KEY_PREFIX: &str = "change_";

impl RequestedChanges {
    pub fn changes(&self) -> &[ApplyChange] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<ApplyChange>> for RequestedChanges {
    fn from(changes: Vec<ApplyChange>) -> Self {
        Self(changes)
    }
}

impl Serialize for RequestedChanges {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (i, change) in self.0.iter().enumerate() {
            map.serialize_entry(&format!("{CHANGE_KEY_PREFIX}{i}"), change)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for RequestedChanges {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = BTreeMap::<String, JsonValue>::deserialize(deserializer)?;
        let mut indexed = Vec::with_capacity(raw.len());
        for (key, value) in raw {
            // Keys outside the change_<n> layout belong to newer writers.
            let Some(index) = key
                .strip_prefix(CHANGE_KEY_PREFIX)
                .and_then(|n| n.parse::<usize>().ok())
            else {
                continue;
            };
            let change: ApplyChange = serde_json::from_value(value)
                .map_err(|e| D::Error::custom(format!("{key}: {e}")))?;
            indexed.push((index, change));
        }
        indexed.sort_by_key(|(index, _)| *index);
        Ok(Self(indexed.into_iter().map(|(_, c)| c).collect()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ActionType;
    use serde_json::json;

    fn change(action: ActionType, detail: &str) -> ApplyChange {
        ApplyChange {
            change_type: action,
            target: String::new(),
            detail: detail.to_string(),
            query_sql: None,
            query_description: None,
        }
    }

    #[test]
    fn test_requested_changes_use_indexed_keys() {
        let changes = RequestedChanges(vec![
            change(ActionType::AddTag, "pii"),
            change(ActionType::UpdateDescription, "Orders placed online"),
        ]);
        let value = serde_json::to_value(&changes).unwrap();
        assert_eq!(value["change_0"]["change_type"], "add_tag");
        assert_eq!(value["change_1"]["detail"], "Orders placed online");
        assert!(value["change_0"].get("query_sql").is_none());
    }

    #[test]
    fn test_requested_changes_keep_numeric_order() {
        let mut raw = serde_json::Map::new();
        for i in (0..12).rev() {
            raw.insert(
                format!("change_{i}"),
                json!({"change_type": "add_tag", "target": "", "detail": format!("t{i}")}),
            );
        }
        raw.insert("written_by".into(), json!("a newer release"));
        let parsed: RequestedChanges = serde_json::from_value(JsonValue::Object(raw)).unwrap();
        let details: Vec<_> = parsed.changes().iter().map(|c| c.detail.clone()).collect();
        let expected: Vec<_> = (0..12).map(|i| format!("t{i}")).collect();
        assert_eq!(details, expected);
    }

    #[test]
    fn test_snapshot_preserves_unknown_fields() {
        let raw = json!({
            "description": "Daily orders",
            "tags": ["urn:li:tag:pii"],
            "glossary_terms": [],
            "owners": ["urn:li:corpuser:ana"],
            "domain": "urn:li:domain:sales"
        });
        let snapshot: MetadataSnapshot = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(snapshot.description(), Some("Daily orders"));
        assert_eq!(snapshot.extra.get("domain"), Some(&json!("urn:li:domain:sales")));
        assert_eq!(serde_json::to_value(&snapshot).unwrap(), raw);
    }

    #[test]
    fn test_empty_description_reads_as_none() {
        let snapshot = MetadataSnapshot::from(EntityMetadata::default());
        assert_eq!(snapshot.description(), None);
    }
}
