//! The tri-state value model the whole engine operates on.
//!
//! Every attribute field is in exactly one of three value-states: null
//! (absent), known (a concrete value), or unknown (to be determined by a
//! later apply). Unknown is a distinct tagged variant, never a sentinel,
//! so "legitimately null" and "not yet known" cannot be confused.

use std::collections::BTreeMap;

/// A single attribute value in one of three states.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// The attribute is absent.
    Null,
    /// The attribute has a concrete value.
    Known(serde_json::Value),
    /// The attribute's value will be determined by a later apply.
    Unknown,
}

/// A structural object value keyed by attribute name.
///
/// The "resource does not exist" case is represented as `Option<StateValue>`
/// = `None` at operation boundaries, not as a special `StateValue`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StateValue {
    fields: BTreeMap<String, Value>,
}

impl Value {
    /// Creates a known value from anything JSON-representable.
    #[must_use]
    pub fn known(value: impl Into<serde_json::Value>) -> Self {
        Self::Known(value.into())
    }

    /// Returns true if this value is null.
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns true if this value is known.
    #[must_use]
    pub const fn is_known(&self) -> bool {
        matches!(self, Self::Known(_))
    }

    /// Returns true if this value is unknown.
    #[must_use]
    pub const fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown)
    }

    /// Returns the concrete value, if this value is known.
    #[must_use]
    pub const fn as_known(&self) -> Option<&serde_json::Value> {
        match self {
            Self::Known(v) => Some(v),
            Self::Null | Self::Unknown => None,
        }
    }

    /// Structural raw-equality: value-states must match, and known values
    /// must compare equal. `unknown` only equals `unknown`.
    #[must_use]
    pub fn raw_equals(&self, other: &Self) -> bool {
        self == other
    }
}

impl StateValue {
    /// Creates an empty state value.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            fields: BTreeMap::new(),
        }
    }

    /// Builds a state value from name/value pairs.
    #[must_use]
    pub fn of<N: Into<String>>(fields: impl IntoIterator<Item = (N, Value)>) -> Self {
        Self {
            fields: fields.into_iter().map(|(n, v)| (n.into(), v)).collect(),
        }
    }

    /// Returns the value of a field, or [`Value::Null`] if it was never set.
    #[must_use]
    pub fn get(&self, name: &str) -> &Value {
        self.fields.get(name).unwrap_or(&Value::Null)
    }

    /// Sets a field, replacing any previous value.
    pub fn set(&mut self, name: impl Into<String>, value: Value) {
        self.fields.insert(name.into(), value);
    }

    /// Returns the same state with one field replaced.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: Value) -> Self {
        self.set(name, value);
        self
    }

    /// Returns true if the field was explicitly set.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Iterates over fields in attribute-name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), v))
    }

    /// Names of fields that are still unknown, in attribute-name order.
    #[must_use]
    pub fn unknown_fields(&self) -> Vec<&str> {
        self.fields
            .iter()
            .filter(|(_, v)| v.is_unknown())
            .map(|(n, _)| n.as_str())
            .collect()
    }

    /// Returns true if no field is unknown.
    #[must_use]
    pub fn is_fully_resolved(&self) -> bool {
        self.fields.values().all(|v| !v.is_unknown())
    }

    /// Structural raw-equality over every field.
    #[must_use]
    pub fn raw_equals(&self, other: &Self) -> bool {
        self == other
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Null => write!(f, "null"),
            Self::Known(v) => write!(f, "{v}"),
            Self::Unknown => write!(f, "(known after apply)"),
        }
    }
}

impl std::fmt::Display for StateValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{")?;
        for (i, (name, value)) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{name} = {value}")?;
        }
        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_value_states_are_distinct() {
        assert!(Value::Null.is_null());
        assert!(Value::Unknown.is_unknown());
        assert!(Value::known("x").is_known());
        assert!(!Value::Null.raw_equals(&Value::Unknown));
        assert!(!Value::known(serde_json::Value::Null).is_null());
    }

    #[test]
    fn test_raw_equality_compares_known_payloads() {
        assert!(Value::known("a").raw_equals(&Value::known("a")));
        assert!(!Value::known("a").raw_equals(&Value::known("b")));
        assert!(Value::Unknown.raw_equals(&Value::Unknown));
    }

    #[test]
    fn test_state_value_missing_field_reads_null() {
        let state = StateValue::new();
        assert!(state.get("anything").is_null());
    }

    #[test]
    fn test_unknown_fields_reported_in_order() {
        let state = StateValue::of([
            ("b", Value::Unknown),
            ("a", Value::known(json!([1, 2]))),
            ("c", Value::Unknown),
        ]);
        assert_eq!(state.unknown_fields(), vec!["b", "c"]);
        assert!(!state.is_fully_resolved());
    }
}
