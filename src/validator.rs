//! Configuration validation against a resource schema.
//!
//! The only user-correctable configuration mistake in this resource family
//! is setting a computed-output attribute explicitly, so validation reduces
//! to checking that every computed attribute is null in the proposed
//! configuration. A null configuration ("no configuration") is always valid.

use tracing::debug;

use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::schema::ResourceSchema;
use crate::value::StateValue;

/// Validator for proposed resource configurations.
#[derive(Debug)]
pub struct Validator<'a> {
    schema: &'a ResourceSchema,
}

impl<'a> Validator<'a> {
    /// Creates a validator for the given schema.
    #[must_use]
    pub const fn new(schema: &'a ResourceSchema) -> Self {
        Self { schema }
    }

    /// Validates a proposed configuration.
    ///
    /// Returns an error diagnostic for every computed-output attribute the
    /// configuration sets to a non-null value. No side effects.
    #[must_use]
    pub fn validate(&self, config: Option<&StateValue>) -> Diagnostics {
        let mut diagnostics = Diagnostics::new();

        let Some(config) = config else {
            return diagnostics;
        };

        for attribute in self.schema.computed_outputs() {
            if !config.get(&attribute.name).is_null() {
                debug!(
                    resource = self.schema.type_name(),
                    attribute = %attribute.name,
                    "configuration sets a read-only attribute"
                );
                diagnostics.push(Diagnostic::read_only_attribute(&attribute.name));
            }
        }

        diagnostics
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kinds;
    use crate::value::Value;

    #[test]
    fn test_null_config_is_always_valid() {
        for schema in [kinds::passthrough(), kinds::tracked()] {
            let validator = Validator::new(&schema);
            assert!(!validator.validate(None).has_errors());
        }
    }

    #[test]
    fn test_all_null_config_is_valid() {
        let schema = kinds::tracked();
        let validator = Validator::new(&schema);
        let config = schema.null_state();
        let diagnostics = validator.validate(Some(&config));
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_set_computed_attribute_is_rejected() {
        let schema = kinds::passthrough();
        let validator = Validator::new(&schema);
        let config = schema.null_state().with("output", Value::known("oops"));

        let diagnostics = validator.validate(Some(&config));
        assert!(diagnostics.has_errors());

        let message = diagnostics.to_string();
        assert!(message.contains("attribute is read-only"), "{message}");
        assert!(message.contains("output"), "{message}");
    }

    #[test]
    fn test_unknown_computed_attribute_is_rejected() {
        // Unknown is still "explicitly set" from the user's point of view.
        let schema = kinds::tracked();
        let validator = Validator::new(&schema);
        let config = schema.null_state().with("id", Value::Unknown);
        assert!(validator.validate(Some(&config)).has_errors());
    }

    #[test]
    fn test_inputs_and_triggers_are_free_to_set() {
        let schema = kinds::tracked();
        let validator = Validator::new(&schema);
        let config = schema
            .null_state()
            .with("input", Value::known("in"))
            .with("trigger", Value::known(serde_json::json!({"k": "v"})));
        assert!(validator.validate(Some(&config)).is_empty());
    }
}
