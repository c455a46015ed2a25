// ============================================================================
// Strict linting - Dangerous or non-idiomatic practices are forbidden
// ============================================================================

#![deny(warnings)]                    // All warnings are treated as errors
#![deny(unsafe_code)]                 // Unsafe code is forbidden
#![deny(missing_docs)]                // All public items must be documented
#![deny(dead_code)]                   // Unused code is forbidden
#![deny(non_camel_case_types)]        // Types must follow CamelCase convention

// Additional strictness - Leave nothing unchecked
#![deny(unused_imports)]              // Unused imports are forbidden
#![deny(unused_variables)]            // Unused variables are forbidden
#![deny(unused_must_use)]             // Must handle Result and Option explicitly
#![deny(non_snake_case)]              // Variables and functions must be snake_case
#![deny(non_upper_case_globals)]      // Constants must be UPPER_CASE
#![deny(nonstandard_style)]           // Non-standard code style is forbidden
#![forbid(unsafe_op_in_unsafe_fn)]    // Unsafe ops in unsafe fns are forbidden

// Clippy lints (warnings only)
#![warn(clippy::all)]                 // All standard Clippy lints
#![warn(clippy::pedantic)]            // Very strict Clippy lints
#![warn(clippy::nursery)]             // Experimental lints
#![warn(clippy::unwrap_used)]         // unwrap() warning
#![warn(clippy::expect_used)]         // expect() warning
#![warn(clippy::panic)]               // panic!() warning
#![warn(clippy::print_stdout)]        // println!() warning
#![warn(clippy::todo)]                // TODO warning
#![warn(clippy::unimplemented)]       // unimplemented!() warning
#![warn(clippy::missing_const_for_fn)] // Force const when possible
#![warn(clippy::unwrap_in_result)]    // unwrap() in Result warning
#![warn(clippy::module_inception)]    // Module with same name as crate warning
#![warn(clippy::redundant_clone)]     // Useless clones warning
#![warn(clippy::shadow_unrelated)]    // Shadowing unrelated variables warning
#![warn(clippy::too_many_arguments)]  // Limit function arguments
#![warn(clippy::cognitive_complexity)] // Limit cognitive complexity

// Safety and robustness lints
#![deny(overflowing_literals)]        // Overflowing literals are forbidden
#![deny(arithmetic_overflow)]         // Arithmetic overflow is forbidden

// ============================================================================
// Crate Documentation
// ============================================================================

//! # Stateplan
//!
//! A deterministic validate/plan/apply lifecycle engine for schema-described
//! resources.
//!
//! ## Overview
//!
//! Stateplan implements the per-resource contract an orchestration host
//! expects from a resource provider:
//!
//! - Validate a proposed configuration against the resource's schema
//! - Decode persisted state into the current schema's shape
//! - Plan a change from prior state and proposed configuration, tracking
//!   which attributes force replacement of the whole instance
//! - Apply a planned change, resolving every value the planner left unknown
//!
//! Every attribute value is tri-state — null, known, or unknown ("known
//! after apply") — and every operation is a pure function over those
//! values: no shared mutable state, no I/O beyond the injected identifier
//! generator, safe to invoke concurrently for different resource instances.
//!
//! ## Modules
//!
//! - [`value`]: the tri-state value model and structural state objects
//! - [`schema`]: attribute roles, derivation rules, and schema building
//! - [`kinds`]: the two builtin synthetic resource kinds
//! - [`validator`]: configuration validation
//! - [`upgrade`]: persisted-state decoding and encoding
//! - [`planner`]: the plan half of the diff engine
//! - [`applier`]: the apply half of the diff engine
//! - [`engine`]: request/response operations and the provider registry
//! - [`diagnostics`]: user-facing diagnostics carried on every response
//! - [`error`]: engine faults and schema errors
//!
//! ## Example
//!
//! ```
//! use stateplan::{PlanChangeRequest, Provider, Value};
//!
//! let provider = Provider::builtin();
//! let schema = provider.engine("passthrough").unwrap().schema();
//! let proposed = schema.null_state().with("input", Value::known("hello"));
//!
//! let plan = provider
//!     .plan_change(&PlanChangeRequest {
//!         type_name: String::from("passthrough"),
//!         prior_state: None,
//!         proposed_state: Some(proposed),
//!     })
//!     .unwrap();
//!
//! // The output mirrors the input, so it is only known after apply.
//! assert!(plan.planned_state.unwrap().get("output").is_unknown());
//! ```

// ============================================================================
// Modules
// ============================================================================

pub mod applier;
pub mod diagnostics;
pub mod engine;
pub mod error;
pub mod kinds;
pub mod planner;
pub mod schema;
pub mod upgrade;
pub mod validator;
pub mod value;

// ============================================================================
// Re-exports
// ============================================================================

pub use applier::{Applier, IdGenerator, default_id_generator};
pub use diagnostics::{Diagnostic, Diagnostics, Severity};
pub use engine::{
    ApplyChangeRequest, ApplyChangeResponse, PlanChangeRequest, PlanChangeResponse, Provider,
    ReadStateRequest, ReadStateResponse, ResourceEngine, UpgradeStateRequest,
    UpgradeStateResponse, ValidateConfigRequest, ValidateConfigResponse,
};
pub use error::{EngineError, Result, SchemaError};
pub use planner::{PlanResult, Planner};
pub use schema::{Attribute, AttributeRole, AttributeType, Derivation, ResourceSchema, SchemaBuilder};
pub use upgrade::{STATE_SCHEMA_VERSION, StateUpgrader};
pub use validator::Validator;
pub use value::{StateValue, Value};
