//! The planning half of the lifecycle diff engine.
//!
//! Given a prior state and a proposed configuration, the planner produces
//! the planned state and the set of attributes that force replacement of
//! the whole resource instance. The planner never mutates its inputs and
//! holds no state between invocations.

use std::collections::HashSet;
use tracing::debug;

use crate::schema::{AttributeRole, Derivation, ResourceSchema};
use crate::value::{StateValue, Value};

/// Engine for computing planned states from prior state and proposed
/// configuration.
#[derive(Debug)]
pub struct Planner<'a> {
    schema: &'a ResourceSchema,
}

/// The outcome of planning a single change.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanResult {
    /// The planned state; `None` plans a destroy.
    pub planned_state: Option<StateValue>,
    /// Attributes whose change forces destroy-and-recreate, in schema order.
    /// Membership is what matters; the order carries no meaning.
    pub requires_replace: Vec<String>,
}

impl<'a> Planner<'a> {
    /// Creates a planner for the given schema.
    #[must_use]
    pub const fn new(schema: &'a ResourceSchema) -> Self {
        Self { schema }
    }

    /// Computes the planned state for a proposed change.
    ///
    /// `prior` is `None` for a resource that does not yet exist; `proposed`
    /// is `None` for a destroy. Comparison is structural raw-equality, so an
    /// attribute unknown in both prior and proposed counts as unchanged.
    #[must_use]
    pub fn plan(&self, prior: Option<&StateValue>, proposed: Option<&StateValue>) -> PlanResult {
        // Destroy: the planned state is the null object.
        let Some(proposed) = proposed else {
            debug!(resource = self.schema.type_name(), "planning destroy");
            return PlanResult {
                planned_state: None,
                requires_replace: vec![],
            };
        };

        let mut planned = proposed.clone();

        // Create: computed outputs will be resolved at apply time. A mirror
        // whose source is null would resolve back to null, so it stays null
        // rather than going unknown; generated identifiers always go unknown.
        let Some(prior) = prior else {
            debug!(resource = self.schema.type_name(), "planning create");
            for attribute in self.schema.computed_outputs() {
                let goes_unknown = match &attribute.derivation {
                    Some(Derivation::Mirror { source }) => !planned.get(source).is_null(),
                    Some(Derivation::GeneratedId) | None => true,
                };
                if goes_unknown {
                    planned.set(&attribute.name, Value::Unknown);
                }
            }
            return PlanResult {
                planned_state: Some(planned),
                requires_replace: vec![],
            };
        };

        // Update: find every non-computed attribute that differs.
        let changed: HashSet<&str> = self
            .schema
            .attributes()
            .iter()
            .filter(|a| a.role != AttributeRole::ComputedOutput)
            .filter(|a| !prior.get(&a.name).raw_equals(proposed.get(&a.name)))
            .map(|a| a.name.as_str())
            .collect();

        // Changed triggers force replacement of the whole instance.
        let requires_replace: Vec<String> = self
            .schema
            .triggers()
            .filter(|a| changed.contains(a.name.as_str()))
            .map(|a| a.name.clone())
            .collect();

        // A computed output goes unknown when anything it depends on changed.
        // Marking is idempotent, so evaluation order does not matter.
        for attribute in self.schema.computed_outputs() {
            if attribute
                .recompute_on
                .iter()
                .any(|dep| changed.contains(dep.as_str()))
            {
                debug!(
                    resource = self.schema.type_name(),
                    attribute = %attribute.name,
                    "marking computed attribute unknown"
                );
                planned.set(&attribute.name, Value::Unknown);
            }
        }

        if !requires_replace.is_empty() {
            debug!(
                resource = self.schema.type_name(),
                triggers = ?requires_replace,
                "plan forces replacement"
            );
        }

        PlanResult {
            planned_state: Some(planned),
            requires_replace,
        }
    }
}

impl PlanResult {
    /// Returns true if the plan destroys the resource.
    #[must_use]
    pub const fn is_destroy(&self) -> bool {
        self.planned_state.is_none()
    }

    /// Returns true if applying the plan requires destroy-and-recreate.
    #[must_use]
    pub fn requires_replacement(&self) -> bool {
        !self.requires_replace.is_empty()
    }
}
