//! Export envelope unwrapping and database root selection.
//!
//! Exports usually look like `{ "format": ..., "exportedAt": ..., "keys":
//! { ... } }`, where `keys` holds the application's persisted key-value
//! storage. Any other JSON object is treated as the key bag directly.
//! Neither step can fail: missing structure degrades to an empty bag or to
//! the bag itself.

use std::sync::LazyLock;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Envelope field holding the key bag.
pub const ENVELOPE_FIELD: &str = "keys";

/// Database root keys, probed in order.
pub const DB_ROOT_CANDIDATES: &[&str] = &[
    "valleyPwa.db.v2",
    "volleyPwa.db.v2",
    "valleyPwa.db",
    "volleyPwa.db",
];

static EMPTY_BAG: LazyLock<Value> = LazyLock::new(|| Value::Object(Map::new()));
static EMPTY_MAP: LazyLock<Map<String, Value>> = LazyLock::new(Map::new);

/// Flat mapping of top-level named values. Always wraps a JSON object.
#[derive(Debug, Clone, Copy)]
pub struct KeyBag<'a> {
    value: &'a Value,
}

/// One entry of the diagnostic key listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyEntry {
    pub key: String,
    /// JS `typeof`-style kind: `string`, `number`, `boolean` or `object`.
    pub kind: String,
}

impl<'a> KeyBag<'a> {
    fn map(&self) -> &'a Map<String, Value> {
        self.value.as_object().unwrap_or(&*EMPTY_MAP)
    }

    /// The bag as a JSON value (an object).
    pub fn as_value(&self) -> &'a Value {
        self.value
    }

    /// Value stored under `key`.
    pub fn get(&self, key: &str) -> Option<&'a Value> {
        self.map().get(key)
    }

    /// Number of keys.
    pub fn len(&self) -> usize {
        self.map().len()
    }

    /// Whether the bag has no keys.
    pub fn is_empty(&self) -> bool {
        self.map().is_empty()
    }

    /// Key list sorted by key, with the kind of each value.
    pub fn listing(&self) -> Vec<KeyEntry> {
        let mut entries: Vec<KeyEntry> = self
            .map()
            .iter()
            .map(|(key, value)| KeyEntry {
                key: key.clone(),
                kind: value_kind(value).to_string(),
            })
            .collect();
        entries.sort_by(|a, b| a.key.cmp(&b.key));
        entries
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::String(_) => "string",
        Value::Number(_) => "number",
        Value::Bool(_) => "boolean",
        Value::Null | Value::Array(_) | Value::Object(_) => "object",
    }
}

/// Unwraps the optional export envelope.
///
/// # Examples
///
/// ```
/// use rally_stats_discovery::envelope::normalize_to_key_bag;
/// use serde_json::json;
///
/// let doc = json!({"format": "x", "keys": {"a": 1}});
/// assert!(normalize_to_key_bag(&doc).get("a").is_some());
///
/// let bare = json!({"a": 1, "b": 2});
/// assert_eq!(normalize_to_key_bag(&bare).len(), 2);
///
/// assert!(normalize_to_key_bag(&json!([1, 2])).is_empty());
/// ```
pub fn normalize_to_key_bag(root: &Value) -> KeyBag<'_> {
    let value = match root {
        Value::Object(map) => match map.get(ENVELOPE_FIELD) {
            Some(nested @ Value::Object(_)) => nested,
            _ => root,
        },
        _ => &*EMPTY_BAG,
    };
    KeyBag { value }
}

/// Picks the database root: the first candidate key holding a non-null
/// value, or the whole bag.
pub fn pick_db_root<'a>(bag: &KeyBag<'a>) -> &'a Value {
    DB_ROOT_CANDIDATES
        .iter()
        .find_map(|key| bag.get(key).filter(|v| !v.is_null()))
        .unwrap_or_else(|| bag.as_value())
}

/// Export timestamp recorded on the document root, if any.
pub fn export_timestamp(root: &Value) -> Option<String> {
    let candidates = [
        root.get("exportedAt"),
        root.get("exported_at"),
        root.get("meta").and_then(|meta| meta.get("exportedAt")),
    ];
    candidates
        .into_iter()
        .flatten()
        .find(|v| !v.is_null())
        .and_then(|v| match v {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
}
