//! The apply half of the lifecycle diff engine.
//!
//! The applier takes a planned state as an opaque input (it never re-plans)
//! and resolves every attribute the planner left unknown, using the schema's
//! derivation table: mirrored outputs copy their source attribute, generated
//! identifiers come from the injected identifier generator. An unknown that
//! cannot be resolved is a contract violation by the caller, not a
//! user-facing diagnostic.

use tracing::debug;

use crate::error::{EngineError, Result};
use crate::schema::{Derivation, ResourceSchema};
use crate::value::{StateValue, Value};

/// Signature of the injected identifier generator.
///
/// The generator is the engine's only process-wide dependency; it must be
/// safe for concurrent use. Tests inject a deterministic closure.
pub type IdGenerator = Box<dyn Fn() -> String + Send + Sync>;

/// Returns the default identifier generator, a v4 UUID per call.
#[must_use]
pub fn default_id_generator() -> IdGenerator {
    Box::new(|| uuid::Uuid::new_v4().to_string())
}

/// Engine for computing final states from planned states.
pub struct Applier<'a> {
    schema: &'a ResourceSchema,
    generate_id: &'a (dyn Fn() -> String + Send + Sync),
}

impl<'a> Applier<'a> {
    /// Creates an applier for the given schema and identifier generator.
    #[must_use]
    pub const fn new(
        schema: &'a ResourceSchema,
        generate_id: &'a (dyn Fn() -> String + Send + Sync),
    ) -> Self {
        Self {
            schema,
            generate_id,
        }
    }

    /// Computes the final state for a planned change.
    ///
    /// # Errors
    ///
    /// Returns a contract violation if any attribute remains unknown after
    /// derivation — the planner (or the host's final configuration) left an
    /// unknown the schema has no rule for.
    pub fn apply(
        &self,
        prior: Option<&StateValue>,
        planned: Option<&StateValue>,
    ) -> Result<Option<StateValue>> {
        // Destroy: the final state is the null object.
        let Some(planned) = planned else {
            debug!(resource = self.schema.type_name(), "applying destroy");
            return Ok(None);
        };

        debug!(
            resource = self.schema.type_name(),
            create = prior.is_none(),
            "applying planned change"
        );

        let mut new_state = planned.clone();

        for attribute in self.schema.computed_outputs() {
            if !planned.get(&attribute.name).is_unknown() {
                continue;
            }
            match &attribute.derivation {
                Some(Derivation::Mirror { source }) => {
                    new_state.set(&attribute.name, planned.get(source).clone());
                }
                Some(Derivation::GeneratedId) => {
                    new_state.set(&attribute.name, Value::known((self.generate_id)()));
                }
                None => {
                    return Err(EngineError::contract(
                        self.schema.type_name(),
                        format!(
                            "attribute \"{}\" is unknown but has no derivation rule",
                            attribute.name
                        ),
                    ));
                }
            }
        }

        // Anything still unknown here means the planner or the host's final
        // configuration broke the operation contract.
        let unresolved = new_state.unknown_fields();
        if !unresolved.is_empty() {
            return Err(EngineError::contract(
                self.schema.type_name(),
                format!("planned state left unresolved unknowns: {}", unresolved.join(", ")),
            ));
        }

        Ok(Some(new_state))
    }
}

impl std::fmt::Debug for Applier<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Applier")
            .field("schema", &self.schema.type_name())
            .finish_non_exhaustive()
    }
}
