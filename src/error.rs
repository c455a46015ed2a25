//! Error types for the stateplan lifecycle engine.
//!
//! User-correctable problems (bad configuration, undecodable state) are
//! reported as diagnostics, not as these errors — see [`crate::diagnostics`].
//! The types here cover schema construction failures and contract violations
//! between the engine and its host, which are bugs rather than user input.

use thiserror::Error;

/// The main error type for the stateplan engine.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Schema construction or conformance errors.
    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    /// The host passed a state that violates the operation contract.
    #[error("Contract violation for resource kind '{type_name}': {message}")]
    ContractViolation {
        /// Resource kind the operation targeted.
        type_name: String,
        /// Description of the violated contract.
        message: String,
    },

    /// The host addressed a resource kind that was never registered.
    #[error("Unknown resource kind: {type_name}")]
    UnknownResourceKind {
        /// The unregistered kind name.
        type_name: String,
    },
}

/// Schema construction and conformance errors.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// The same attribute name was declared twice.
    #[error("Duplicate attribute: {name}")]
    DuplicateAttribute {
        /// The duplicated attribute name.
        name: String,
    },

    /// A state value carries an attribute the schema does not declare.
    #[error("Attribute not declared in schema: {name}")]
    UndeclaredAttribute {
        /// The undeclared attribute name.
        name: String,
    },

    /// A known value does not match its attribute's declared type.
    #[error("Attribute '{name}' does not match its declared type {expected}")]
    TypeMismatch {
        /// The offending attribute name.
        name: String,
        /// The type the schema declares.
        expected: String,
    },

    /// A derivation rule references an attribute the schema does not declare
    /// (or another computed attribute, which would never resolve).
    #[error("Derivation for '{attribute}' references undeclared attribute '{reference}'")]
    DanglingDerivation {
        /// The computed attribute carrying the rule.
        attribute: String,
        /// The missing attribute the rule points at.
        reference: String,
    },
}

/// Result type alias for stateplan operations.
pub type Result<T> = std::result::Result<T, EngineError>;

impl EngineError {
    /// Creates a contract-violation error for the given resource kind.
    #[must_use]
    pub fn contract(type_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ContractViolation {
            type_name: type_name.into(),
            message: message.into(),
        }
    }
}
