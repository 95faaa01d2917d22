//! Read-only view over a loosely-typed key-value graph.
//!
//! Discovery and canonicalization never assume a concrete document type.
//! They walk any graph through [`KeyValueNode`], which is implemented for
//! [`serde_json::Value`]. Graphs that share nodes (or contain cycles, such
//! as `Rc`-linked structures) can implement it as well; [`identity`]
//! lets the traversal recognize a node it has already visited.
//!
//! [`identity`]: KeyValueNode::identity

use serde_json::Value;

/// Generic key-value node.
pub trait KeyValueNode {
    /// Child under `key` when this node is an object.
    fn field(&self, key: &str) -> Option<&Self>;

    /// String content, if this node is a string.
    fn as_text(&self) -> Option<&str>;

    /// Numeric content, if this node is a finite number.
    fn as_finite(&self) -> Option<f64>;

    /// Boolean content, if this node is a boolean.
    fn as_flag(&self) -> Option<bool>;

    /// Whether this node is an explicit null.
    fn is_null(&self) -> bool;

    /// Whether this node is an object (keyed container).
    fn is_object(&self) -> bool;

    /// Elements in order, if this node is an array.
    fn array_items(&self) -> Option<Vec<&Self>>;

    /// Member values in order, if this node is an object.
    fn object_values(&self) -> Option<Vec<&Self>>;

    /// Whether this node is a container (array or object).
    fn is_container(&self) -> bool {
        self.is_object() || self.array_items().is_some()
    }

    /// Stable identity of this node for the lifetime of the borrow.
    fn identity(&self) -> usize {
        std::ptr::from_ref(self).cast::<()>() as usize
    }
}

impl KeyValueNode for Value {
    fn field(&self, key: &str) -> Option<&Self> {
        self.as_object().and_then(|map| map.get(key))
    }

    fn as_text(&self) -> Option<&str> {
        self.as_str()
    }

    fn as_finite(&self) -> Option<f64> {
        self.as_f64().filter(|n| n.is_finite())
    }

    fn as_flag(&self) -> Option<bool> {
        Value::as_bool(self)
    }

    fn is_null(&self) -> bool {
        Value::is_null(self)
    }

    fn is_object(&self) -> bool {
        Value::is_object(self)
    }

    fn array_items(&self) -> Option<Vec<&Self>> {
        self.as_array().map(|items| items.iter().collect())
    }

    fn object_values(&self) -> Option<Vec<&Self>> {
        self.as_object().map(|map| map.values().collect())
    }

    fn is_container(&self) -> bool {
        self.is_object() || self.is_array()
    }
}

/// Follows a dotted path (`"match.name"`) through nested objects.
pub fn lookup_path<'a, N: KeyValueNode + ?Sized>(node: &'a N, path: &str) -> Option<&'a N> {
    path.split('.')
        .try_fold(node, |current, segment| current.field(segment))
}

/// First value under `keys` that is present and not null.
///
/// Mirrors nullish coalescing: a present non-null value wins even when
/// it has the wrong type.
pub fn first_present<'a, N: KeyValueNode + ?Sized>(node: &'a N, keys: &[&str]) -> Option<&'a N> {
    keys.iter()
        .filter_map(|key| node.field(key))
        .find(|value| !value.is_null())
}

/// Stringifies a finite number, dropping the fractional part of integral
/// values (`7.0` → `"7"`).
pub fn number_label(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}
