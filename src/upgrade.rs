//! Persisted-state decoding and encoding.
//!
//! State is persisted as a JSON object keyed by attribute name: known values
//! as their JSON representation, null attributes as JSON `null`. Only one
//! schema version exists, so upgrading degenerates to decode-and-validate.
//! Blobs that do not match the schema's implied shape produce decode
//! diagnostics; the host decides whether to abort or repair.

use tracing::debug;

use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::error::{EngineError, Result};
use crate::schema::ResourceSchema;
use crate::value::{StateValue, Value};

/// The only schema version this engine reads and writes.
pub const STATE_SCHEMA_VERSION: u64 = 0;

/// Decodes persisted state blobs into the current schema's shape.
#[derive(Debug)]
pub struct StateUpgrader<'a> {
    schema: &'a ResourceSchema,
}

impl<'a> StateUpgrader<'a> {
    /// Creates an upgrader for the given schema.
    #[must_use]
    pub const fn new(schema: &'a ResourceSchema) -> Self {
        Self { schema }
    }

    /// Decodes a raw state blob persisted at `schema_version`.
    ///
    /// Returns the decoded state (or `None` for a persisted null object)
    /// together with any decode diagnostics. A result with error diagnostics
    /// carries no state.
    #[must_use]
    pub fn upgrade(&self, raw_state: &[u8], schema_version: u64) -> (Option<StateValue>, Diagnostics) {
        let mut diagnostics = Diagnostics::new();

        if schema_version != STATE_SCHEMA_VERSION {
            diagnostics.push(Diagnostic::decode_error(format!(
                "unsupported state schema version {schema_version}, current is {STATE_SCHEMA_VERSION}"
            )));
            return (None, diagnostics);
        }

        let parsed: serde_json::Value = match serde_json::from_slice(raw_state) {
            Ok(parsed) => parsed,
            Err(err) => {
                diagnostics.push(Diagnostic::decode_error(err.to_string()));
                return (None, diagnostics);
            }
        };

        match parsed {
            // A persisted null object: the resource was never created.
            serde_json::Value::Null => (None, diagnostics),
            serde_json::Value::Object(fields) => {
                let mut state = self.schema.null_state();
                for (name, value) in fields {
                    let Some(attribute) = self.schema.attribute(&name) else {
                        diagnostics.push(Diagnostic::decode_error(format!(
                            "state carries undeclared attribute \"{name}\""
                        )));
                        return (None, diagnostics);
                    };
                    if value.is_null() {
                        continue;
                    }
                    if !attribute.ty.accepts(&value) {
                        diagnostics.push(
                            Diagnostic::decode_error(format!(
                                "attribute \"{name}\" is not a {}",
                                attribute.ty
                            ))
                            .with_attribute(&name),
                        );
                        return (None, diagnostics);
                    }
                    state.set(name, Value::Known(value));
                }
                debug!(resource = self.schema.type_name(), "decoded prior state");
                (Some(state), diagnostics)
            }
            other => {
                diagnostics.push(Diagnostic::decode_error(format!(
                    "expected a JSON object, found {other}"
                )));
                (None, diagnostics)
            }
        }
    }

    /// Encodes a fully-resolved state into the blob shape [`Self::upgrade`]
    /// accepts. The inverse of decoding; this is what a host persists.
    ///
    /// # Errors
    ///
    /// Returns a contract violation if the state still contains an unknown
    /// field — only applied states may be persisted.
    pub fn encode(&self, state: Option<&StateValue>) -> Result<Vec<u8>> {
        let Some(state) = state else {
            return Ok(b"null".to_vec());
        };

        let mut object = serde_json::Map::new();
        for (name, value) in state.iter() {
            let encoded = match value {
                Value::Null => serde_json::Value::Null,
                Value::Known(concrete) => concrete.clone(),
                Value::Unknown => {
                    return Err(EngineError::contract(
                        self.schema.type_name(),
                        format!("cannot persist state with unknown attribute \"{name}\""),
                    ));
                }
            };
            object.insert(name.to_string(), encoded);
        }

        serde_json::to_vec(&serde_json::Value::Object(object)).map_err(|err| {
            EngineError::contract(self.schema.type_name(), format!("state encoding failed: {err}"))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kinds;
    use serde_json::json;

    #[test]
    fn test_round_trips_a_resolved_state() {
        let schema = kinds::tracked();
        let upgrader = StateUpgrader::new(&schema);

        let state = schema
            .null_state()
            .with("input", Value::known("input"))
            .with("output", Value::known("input"))
            .with("trigger", Value::known(json!(["a", "b"])))
            .with("id", Value::known("not-quite-a-uuid"));

        let blob = upgrader.encode(Some(&state)).unwrap();
        let (decoded, diagnostics) = upgrader.upgrade(&blob, STATE_SCHEMA_VERSION);

        assert!(!diagnostics.has_errors(), "{diagnostics}");
        assert!(decoded.unwrap().raw_equals(&state));
    }

    #[test]
    fn test_null_blob_decodes_to_absent_resource() {
        let schema = kinds::passthrough();
        let upgrader = StateUpgrader::new(&schema);
        let (decoded, diagnostics) = upgrader.upgrade(b"null", STATE_SCHEMA_VERSION);
        assert!(decoded.is_none());
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_missing_attributes_decode_as_null() {
        let schema = kinds::passthrough();
        let upgrader = StateUpgrader::new(&schema);
        let (decoded, diagnostics) =
            upgrader.upgrade(br#"{"input": "only"}"#, STATE_SCHEMA_VERSION);
        assert!(!diagnostics.has_errors());
        let state = decoded.unwrap();
        assert_eq!(state.get("input"), &Value::known("only"));
        assert!(state.get("output").is_null());
        assert!(state.get("trigger").is_null());
    }

    #[test]
    fn test_wrong_field_type_is_a_decode_diagnostic() {
        let schema = kinds::tracked();
        let upgrader = StateUpgrader::new(&schema);
        // "id" is declared as string.
        let (decoded, diagnostics) = upgrader.upgrade(br#"{"id": 42}"#, STATE_SCHEMA_VERSION);
        assert!(decoded.is_none());
        assert!(diagnostics.has_errors());
        assert!(diagnostics.to_string().contains("Failed to decode prior state"));
    }

    #[test]
    fn test_undeclared_attribute_is_a_decode_diagnostic() {
        let schema = kinds::passthrough();
        let upgrader = StateUpgrader::new(&schema);
        let (decoded, diagnostics) =
            upgrader.upgrade(br#"{"surprise": true}"#, STATE_SCHEMA_VERSION);
        assert!(decoded.is_none());
        assert!(diagnostics.has_errors());
    }

    #[test]
    fn test_unparseable_blob_is_a_decode_diagnostic() {
        let schema = kinds::passthrough();
        let upgrader = StateUpgrader::new(&schema);
        let (decoded, diagnostics) = upgrader.upgrade(b"not json", STATE_SCHEMA_VERSION);
        assert!(decoded.is_none());
        assert!(diagnostics.has_errors());
    }

    #[test]
    fn test_future_schema_version_is_rejected() {
        let schema = kinds::passthrough();
        let upgrader = StateUpgrader::new(&schema);
        let (decoded, diagnostics) = upgrader.upgrade(b"{}", STATE_SCHEMA_VERSION + 1);
        assert!(decoded.is_none());
        assert!(diagnostics.has_errors());
        assert!(diagnostics.to_string().contains("unsupported state schema version"));
    }

    #[test]
    fn test_encoding_unknown_state_is_a_contract_violation() {
        let schema = kinds::tracked();
        let upgrader = StateUpgrader::new(&schema);
        let state = schema.null_state().with("id", Value::Unknown);
        let err = upgrader.encode(Some(&state)).unwrap_err();
        assert!(err.to_string().contains("unknown attribute"));
    }

    #[test]
    fn test_absent_resource_encodes_as_null() {
        let schema = kinds::passthrough();
        let upgrader = StateUpgrader::new(&schema);
        assert_eq!(upgrader.encode(None).unwrap(), b"null");
    }
}
