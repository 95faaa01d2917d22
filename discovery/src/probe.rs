//! Prioritized field extraction rules.
//!
//! A [`FieldProbe`] is an ordered list of candidate paths (dotted paths
//! reach into nested objects). Each path is a pure "try-extract" rule over a
//! [`KeyValueNode`]; the first rule that yields a value wins.

use crate::node::{KeyValueNode, lookup_path, number_label};

/// Scalar picked up by a probe.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Text(String),
    Number(f64),
}

impl Scalar {
    /// Label form: text verbatim, numbers stringified without a trailing
    /// `.0` for integral values.
    pub fn into_label(self) -> String {
        match self {
            Self::Text(text) => text,
            Self::Number(n) => number_label(n),
        }
    }
}

/// Ordered candidate paths for one logical field.
#[derive(Debug, Clone, Copy)]
pub struct FieldProbe {
    pub name: &'static str,
    pub paths: &'static [&'static str],
}

impl FieldProbe {
    pub const fn new(name: &'static str, paths: &'static [&'static str]) -> Self {
        Self { name, paths }
    }

    /// Runs `rule` against each candidate path in order and returns the
    /// first success.
    pub fn first<N, T, F>(&self, record: &N, rule: F) -> Option<T>
    where
        N: KeyValueNode + ?Sized,
        F: Fn(&N) -> Option<T>,
    {
        self.paths
            .iter()
            .filter_map(|path| lookup_path(record, path))
            .find_map(rule)
    }

    /// First string or finite number found.
    pub fn scalar<N: KeyValueNode + ?Sized>(&self, record: &N) -> Option<Scalar> {
        self.first(record, text_or_number::<N>)
    }

    /// First non-empty string or finite number, as a label.
    pub fn identifier<N: KeyValueNode + ?Sized>(&self, record: &N) -> Option<String> {
        self.first(record, non_empty_identifier::<N>)
    }

    /// First string with non-whitespace content.
    pub fn text<N: KeyValueNode + ?Sized>(&self, record: &N) -> Option<String> {
        self.first(record, non_blank_text::<N>)
    }
}

/// Accepts any string or finite number.
pub fn text_or_number<N: KeyValueNode + ?Sized>(node: &N) -> Option<Scalar> {
    node.as_text()
        .map(|text| Scalar::Text(text.to_string()))
        .or_else(|| node.as_finite().map(Scalar::Number))
}

/// Accepts non-empty strings and finite numbers (stringified).
pub fn non_empty_identifier<N: KeyValueNode + ?Sized>(node: &N) -> Option<String> {
    match node.as_text() {
        Some(text) if !text.is_empty() => Some(text.to_string()),
        Some(_) => None,
        None => node.as_finite().map(number_label),
    }
}

/// Accepts strings that are not blank; the value is trimmed.
pub fn non_blank_text<N: KeyValueNode + ?Sized>(node: &N) -> Option<String> {
    node.as_text()
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::to_string)
}
