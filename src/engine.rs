//! The operation surface consumed by an orchestration host.
//!
//! A [`ResourceEngine`] binds one schema to the validate / upgrade / read /
//! plan / apply operations; a [`Provider`] owns one engine per registered
//! resource kind and dispatches requests by kind name. All operations are
//! pure, synchronous, and safe to invoke concurrently for different
//! resource instances; the identifier generator is the only injected
//! process-wide dependency.

use std::collections::BTreeMap;
use tracing::debug;

use crate::applier::{Applier, IdGenerator, default_id_generator};
use crate::diagnostics::Diagnostics;
use crate::error::{EngineError, Result};
use crate::planner::Planner;
use crate::schema::ResourceSchema;
use crate::upgrade::StateUpgrader;
use crate::validator::Validator;
use crate::value::StateValue;

/// Request to validate a proposed configuration.
#[derive(Debug, Clone)]
pub struct ValidateConfigRequest {
    /// Resource kind the configuration is for.
    pub type_name: String,
    /// The proposed configuration; `None` means "no configuration".
    pub config: Option<StateValue>,
}

/// Response to [`ValidateConfigRequest`].
#[derive(Debug, Clone)]
pub struct ValidateConfigResponse {
    /// Configuration diagnostics.
    pub diagnostics: Diagnostics,
}

/// Request to upgrade a persisted state blob.
#[derive(Debug, Clone)]
pub struct UpgradeStateRequest {
    /// Resource kind the state belongs to.
    pub type_name: String,
    /// The raw persisted blob.
    pub raw_state: Vec<u8>,
    /// Schema version the blob was persisted at.
    pub schema_version: u64,
}

/// Response to [`UpgradeStateRequest`].
#[derive(Debug, Clone)]
pub struct UpgradeStateResponse {
    /// The decoded state; absent when decoding failed or the blob was null.
    pub upgraded_state: Option<StateValue>,
    /// Decode diagnostics.
    pub diagnostics: Diagnostics,
}

/// Request to refresh a resource from its system of record.
#[derive(Debug, Clone)]
pub struct ReadStateRequest {
    /// Resource kind to read.
    pub type_name: String,
    /// The prior recorded state.
    pub prior_state: Option<StateValue>,
}

/// Response to [`ReadStateRequest`].
#[derive(Debug, Clone)]
pub struct ReadStateResponse {
    /// The refreshed state.
    pub new_state: Option<StateValue>,
    /// Read diagnostics.
    pub diagnostics: Diagnostics,
}

/// Request to plan a change.
#[derive(Debug, Clone)]
pub struct PlanChangeRequest {
    /// Resource kind to plan for.
    pub type_name: String,
    /// The prior state; `None` for a resource that does not yet exist.
    pub prior_state: Option<StateValue>,
    /// The proposed new state; `None` plans a destroy.
    pub proposed_state: Option<StateValue>,
}

/// Response to [`PlanChangeRequest`].
#[derive(Debug, Clone)]
pub struct PlanChangeResponse {
    /// The planned state.
    pub planned_state: Option<StateValue>,
    /// Attributes whose change forces destroy-and-recreate.
    pub requires_replace: Vec<String>,
    /// Plan diagnostics.
    pub diagnostics: Diagnostics,
}

/// Request to apply a planned change.
#[derive(Debug, Clone)]
pub struct ApplyChangeRequest {
    /// Resource kind to apply for.
    pub type_name: String,
    /// The prior state.
    pub prior_state: Option<StateValue>,
    /// The planned state, as produced by a prior plan operation.
    pub planned_state: Option<StateValue>,
}

/// Response to [`ApplyChangeRequest`].
#[derive(Debug, Clone)]
pub struct ApplyChangeResponse {
    /// The final state, which becomes the next cycle's prior state.
    pub new_state: Option<StateValue>,
    /// Apply diagnostics.
    pub diagnostics: Diagnostics,
}

/// One resource kind's lifecycle operations.
pub struct ResourceEngine {
    schema: ResourceSchema,
    id_generator: IdGenerator,
}

impl ResourceEngine {
    /// Creates an engine with the default (UUID v4) identifier generator.
    #[must_use]
    pub fn new(schema: ResourceSchema) -> Self {
        Self::with_id_generator(schema, default_id_generator())
    }

    /// Creates an engine with an injected identifier generator.
    ///
    /// The generator replaces any global randomness for deterministic tests.
    #[must_use]
    pub fn with_id_generator(schema: ResourceSchema, id_generator: IdGenerator) -> Self {
        Self {
            schema,
            id_generator,
        }
    }

    /// The schema this engine serves, published to the host for
    /// configuration-time type checking.
    #[must_use]
    pub const fn schema(&self) -> &ResourceSchema {
        &self.schema
    }

    /// Validates a proposed configuration. See [`Validator`].
    #[must_use]
    pub fn validate_config(&self, config: Option<&StateValue>) -> ValidateConfigResponse {
        ValidateConfigResponse {
            diagnostics: Validator::new(&self.schema).validate(config),
        }
    }

    /// Decodes a persisted state blob. See [`StateUpgrader`].
    #[must_use]
    pub fn upgrade_state(&self, raw_state: &[u8], schema_version: u64) -> UpgradeStateResponse {
        let (upgraded_state, diagnostics) =
            StateUpgrader::new(&self.schema).upgrade(raw_state, schema_version);
        UpgradeStateResponse {
            upgraded_state,
            diagnostics,
        }
    }

    /// Encodes a fully-resolved state to the persisted blob shape.
    ///
    /// # Errors
    ///
    /// Returns a contract violation if the state contains unknowns.
    pub fn encode_state(&self, state: Option<&StateValue>) -> Result<Vec<u8>> {
        StateUpgrader::new(&self.schema).encode(state)
    }

    /// Refreshes a resource. This family has no external system of record,
    /// so refresh is the identity transform over the prior state.
    #[must_use]
    pub fn read_state(&self, prior_state: Option<&StateValue>) -> ReadStateResponse {
        ReadStateResponse {
            new_state: prior_state.cloned(),
            diagnostics: Diagnostics::new(),
        }
    }

    /// Plans a change. See [`Planner`].
    ///
    /// # Errors
    ///
    /// Returns a schema error if either state does not conform to the
    /// schema; states come from the host, so nonconformance is a bug there.
    pub fn plan_change(
        &self,
        prior_state: Option<&StateValue>,
        proposed_state: Option<&StateValue>,
    ) -> Result<PlanChangeResponse> {
        if let Some(prior) = prior_state {
            self.schema.check_conforms(prior)?;
        }
        if let Some(proposed) = proposed_state {
            self.schema.check_conforms(proposed)?;
        }

        let result = Planner::new(&self.schema).plan(prior_state, proposed_state);
        Ok(PlanChangeResponse {
            planned_state: result.planned_state,
            requires_replace: result.requires_replace,
            diagnostics: Diagnostics::new(),
        })
    }

    /// Applies a planned change. See [`Applier`].
    ///
    /// # Errors
    ///
    /// Returns a schema error for nonconforming states and a contract
    /// violation if the planned state carries unresolvable unknowns.
    pub fn apply_change(
        &self,
        prior_state: Option<&StateValue>,
        planned_state: Option<&StateValue>,
    ) -> Result<ApplyChangeResponse> {
        if let Some(prior) = prior_state {
            self.schema.check_conforms(prior)?;
        }
        if let Some(planned) = planned_state {
            self.schema.check_conforms(planned)?;
        }

        let applier = Applier::new(&self.schema, self.id_generator.as_ref());
        let new_state = applier.apply(prior_state, planned_state)?;
        Ok(ApplyChangeResponse {
            new_state,
            diagnostics: Diagnostics::new(),
        })
    }
}

impl std::fmt::Debug for ResourceEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceEngine")
            .field("schema", &self.schema.type_name())
            .finish_non_exhaustive()
    }
}

/// Registry of resource engines, dispatching requests by kind name.
#[derive(Debug, Default)]
pub struct Provider {
    engines: BTreeMap<String, ResourceEngine>,
}

impl Provider {
    /// Creates a provider with no registered kinds.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            engines: BTreeMap::new(),
        }
    }

    /// Creates a provider with both builtin kinds registered.
    #[must_use]
    pub fn builtin() -> Self {
        let mut provider = Self::new();
        provider.register(ResourceEngine::new(crate::kinds::passthrough()));
        provider.register(ResourceEngine::new(crate::kinds::tracked()));
        provider
    }

    /// Registers an engine under its schema's kind name, replacing any
    /// engine previously registered under that name.
    pub fn register(&mut self, engine: ResourceEngine) {
        debug!(resource = engine.schema().type_name(), "registering resource kind");
        self.engines
            .insert(engine.schema().type_name().to_string(), engine);
    }

    /// Looks up the engine for a resource kind.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::UnknownResourceKind`] for unregistered kinds.
    pub fn engine(&self, type_name: &str) -> Result<&ResourceEngine> {
        self.engines
            .get(type_name)
            .ok_or_else(|| EngineError::UnknownResourceKind {
                type_name: type_name.to_string(),
            })
    }

    /// Schemas of every registered kind, in kind-name order.
    pub fn schemas(&self) -> impl Iterator<Item = &ResourceSchema> {
        self.engines.values().map(ResourceEngine::schema)
    }

    /// Dispatches a validate operation.
    ///
    /// # Errors
    ///
    /// Returns an error for unregistered kinds.
    pub fn validate_config(&self, req: &ValidateConfigRequest) -> Result<ValidateConfigResponse> {
        Ok(self
            .engine(&req.type_name)?
            .validate_config(req.config.as_ref()))
    }

    /// Dispatches an upgrade operation.
    ///
    /// # Errors
    ///
    /// Returns an error for unregistered kinds.
    pub fn upgrade_state(&self, req: &UpgradeStateRequest) -> Result<UpgradeStateResponse> {
        Ok(self
            .engine(&req.type_name)?
            .upgrade_state(&req.raw_state, req.schema_version))
    }

    /// Dispatches a read operation.
    ///
    /// # Errors
    ///
    /// Returns an error for unregistered kinds.
    pub fn read_state(&self, req: &ReadStateRequest) -> Result<ReadStateResponse> {
        Ok(self
            .engine(&req.type_name)?
            .read_state(req.prior_state.as_ref()))
    }

    /// Dispatches a plan operation.
    ///
    /// # Errors
    ///
    /// Returns an error for unregistered kinds and nonconforming states.
    pub fn plan_change(&self, req: &PlanChangeRequest) -> Result<PlanChangeResponse> {
        self.engine(&req.type_name)?
            .plan_change(req.prior_state.as_ref(), req.proposed_state.as_ref())
    }

    /// Dispatches an apply operation.
    ///
    /// # Errors
    ///
    /// Returns an error for unregistered kinds, nonconforming states, and
    /// contract violations.
    pub fn apply_change(&self, req: &ApplyChangeRequest) -> Result<ApplyChangeResponse> {
        self.engine(&req.type_name)?
            .apply_change(req.prior_state.as_ref(), req.planned_state.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kinds;
    use crate::value::Value;

    fn deterministic_provider() -> Provider {
        let mut provider = Provider::new();
        provider.register(ResourceEngine::with_id_generator(
            kinds::passthrough(),
            Box::new(|| unreachable!("passthrough has no generated id")),
        ));
        provider.register(ResourceEngine::with_id_generator(
            kinds::tracked(),
            Box::new(|| String::from("not-quite-a-uuid")),
        ));
        provider
    }

    #[test]
    fn test_unknown_kind_is_rejected() {
        let provider = Provider::builtin();
        let err = provider
            .read_state(&ReadStateRequest {
                type_name: String::from("nope"),
                prior_state: None,
            })
            .unwrap_err();
        assert!(matches!(err, EngineError::UnknownResourceKind { .. }));
    }

    #[test]
    fn test_builtin_provider_publishes_both_schemas() {
        let provider = Provider::builtin();
        let names: Vec<&str> = provider.schemas().map(ResourceSchema::type_name).collect();
        assert_eq!(names, vec![kinds::PASSTHROUGH, kinds::TRACKED]);
    }

    #[test]
    fn test_read_is_identity() {
        let provider = deterministic_provider();
        let schema = kinds::tracked();
        let prior = schema
            .null_state()
            .with("input", Value::known("input"))
            .with("output", Value::known("input"))
            .with("id", Value::known("not-quite-a-uuid"));

        let resp = provider
            .read_state(&ReadStateRequest {
                type_name: String::from(kinds::TRACKED),
                prior_state: Some(prior.clone()),
            })
            .unwrap();

        assert!(!resp.diagnostics.has_errors());
        assert!(resp.new_state.unwrap().raw_equals(&prior));
    }

    #[test]
    fn test_full_lifecycle_from_nothing() {
        // Validate → plan → apply → encode → upgrade, starting from no
        // prior state, for the tracked kind.
        let provider = deterministic_provider();
        let schema = kinds::tracked();
        let config = schema.null_state().with("input", Value::known("input"));

        let validate = provider
            .validate_config(&ValidateConfigRequest {
                type_name: String::from(kinds::TRACKED),
                config: Some(config.clone()),
            })
            .unwrap();
        assert!(!validate.diagnostics.has_errors());

        let plan = provider
            .plan_change(&PlanChangeRequest {
                type_name: String::from(kinds::TRACKED),
                prior_state: None,
                proposed_state: Some(config),
            })
            .unwrap();
        assert!(plan.requires_replace.is_empty());
        let planned = plan.planned_state.clone().unwrap();
        assert!(planned.get("output").is_unknown());
        assert!(planned.get("id").is_unknown());

        let apply = provider
            .apply_change(&ApplyChangeRequest {
                type_name: String::from(kinds::TRACKED),
                prior_state: None,
                planned_state: plan.planned_state,
            })
            .unwrap();
        let new_state = apply.new_state.unwrap();
        assert!(new_state.is_fully_resolved());
        assert_eq!(new_state.get("output"), &Value::known("input"));
        assert_eq!(new_state.get("id"), &Value::known("not-quite-a-uuid"));

        let engine = provider.engine(kinds::TRACKED).unwrap();
        let blob = engine.encode_state(Some(&new_state)).unwrap();
        let upgraded = engine.upgrade_state(&blob, crate::upgrade::STATE_SCHEMA_VERSION);
        assert!(!upgraded.diagnostics.has_errors());
        assert!(upgraded.upgraded_state.unwrap().raw_equals(&new_state));
    }

    #[test]
    fn test_trigger_cycle_replaces_and_regenerates() {
        let provider = deterministic_provider();
        let schema = kinds::passthrough();
        let prior = schema
            .null_state()
            .with("input", Value::known("input"))
            .with("output", Value::known("input"));
        let proposed = prior.clone().with("trigger", Value::known("new-value"));

        let plan = provider
            .plan_change(&PlanChangeRequest {
                type_name: String::from(kinds::PASSTHROUGH),
                prior_state: Some(prior.clone()),
                proposed_state: Some(proposed.clone()),
            })
            .unwrap();
        assert_eq!(plan.requires_replace, vec!["trigger"]);
        assert!(plan.planned_state.as_ref().unwrap().get("output").is_unknown());

        let apply = provider
            .apply_change(&ApplyChangeRequest {
                type_name: String::from(kinds::PASSTHROUGH),
                prior_state: Some(prior),
                planned_state: plan.planned_state,
            })
            .unwrap();
        let new_state = apply.new_state.unwrap();
        assert!(new_state.raw_equals(&proposed.with("output", Value::known("input"))));
    }

    #[test]
    fn test_nonconforming_state_is_an_engine_error() {
        let provider = Provider::builtin();
        let bogus = StateValue::of([("not-an-attribute", Value::known(1))]);
        let err = provider
            .plan_change(&PlanChangeRequest {
                type_name: String::from(kinds::PASSTHROUGH),
                prior_state: None,
                proposed_state: Some(bogus),
            })
            .unwrap_err();
        assert!(matches!(err, EngineError::Schema(_)));
    }
}
