//! The builtin synthetic resource kinds.
//!
//! Both kinds are pass-through resources with no external system of record:
//! `output` mirrors `input`, and `trigger` exists only to force replacement.
//! The `tracked` kind additionally mints a generated identifier on creation
//! (and again whenever the trigger forces replacement).

use crate::schema::{AttributeType, Derivation, ResourceSchema};

/// Kind name of the plain pass-through resource.
pub const PASSTHROUGH: &str = "passthrough";

/// Kind name of the pass-through resource with a generated identifier.
pub const TRACKED: &str = "tracked";

/// Schema of the plain pass-through resource kind.
///
/// Attributes: `input` (dynamic input), `output` (dynamic computed, mirrors
/// `input`), `trigger` (dynamic trigger).
#[must_use]
pub fn passthrough() -> ResourceSchema {
    ResourceSchema::builder(PASSTHROUGH)
        .input("input", AttributeType::Dynamic)
        .computed(
            "output",
            AttributeType::Dynamic,
            Derivation::mirror("input"),
            ["input", "trigger"],
        )
        .trigger("trigger", AttributeType::Dynamic)
        .build()
        .expect("builtin passthrough schema is valid")
}

/// Schema of the pass-through resource kind with a generated `id`.
///
/// Same as [`passthrough`] plus `id` (string computed), resolved by the
/// engine's identifier generator and recomputed when `trigger` changes.
#[must_use]
pub fn tracked() -> ResourceSchema {
    ResourceSchema::builder(TRACKED)
        .input("input", AttributeType::Dynamic)
        .computed(
            "output",
            AttributeType::Dynamic,
            Derivation::mirror("input"),
            ["input", "trigger"],
        )
        .trigger("trigger", AttributeType::Dynamic)
        .computed(
            "id",
            AttributeType::String,
            Derivation::GeneratedId,
            ["trigger"],
        )
        .build()
        .expect("builtin tracked schema is valid")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::AttributeRole;

    #[test]
    fn test_passthrough_schema_roles() {
        let schema = passthrough();
        assert_eq!(schema.type_name(), PASSTHROUGH);
        assert_eq!(schema.attributes().len(), 3);
        assert_eq!(schema.attribute("input").unwrap().role, AttributeRole::Input);
        assert_eq!(
            schema.attribute("output").unwrap().role,
            AttributeRole::ComputedOutput
        );
        assert_eq!(
            schema.attribute("trigger").unwrap().role,
            AttributeRole::Trigger
        );
    }

    #[test]
    fn test_tracked_schema_adds_generated_id() {
        let schema = tracked();
        let id = schema.attribute("id").unwrap();
        assert_eq!(id.role, AttributeRole::ComputedOutput);
        assert_eq!(id.ty, AttributeType::String);
        assert_eq!(id.derivation, Some(Derivation::GeneratedId));
        assert_eq!(id.recompute_on, vec!["trigger"]);
    }

    #[test]
    fn test_output_recomputes_on_input_and_trigger() {
        for schema in [passthrough(), tracked()] {
            let output = schema.attribute("output").unwrap();
            assert_eq!(output.derivation, Some(Derivation::mirror("input")));
            assert_eq!(output.recompute_on, vec!["input", "trigger"]);
        }
    }
}
