//! Resource schemas: attributes, roles, and derivation rules.
//!
//! A schema is the static description of one resource kind: an ordered set
//! of attributes, each with a semantic type and a mutability role. Computed
//! attributes additionally carry a derivation rule (how the applier resolves
//! them) and the list of attributes whose change forces recomputation.
//! Role assignment is immutable once a schema is built.

use crate::error::SchemaError;
use crate::value::{StateValue, Value};
use std::collections::HashSet;

/// Semantic type of an attribute value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeType {
    /// Any JSON-representable structure.
    Dynamic,
    /// A string.
    String,
    /// A number.
    Number,
    /// A boolean.
    Bool,
    /// An ordered sequence.
    List,
    /// A string-keyed mapping.
    Map,
}

/// Mutability role of an attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeRole {
    /// Settable by the user, never computed.
    Input,
    /// Never settable by the user; derived by the engine during apply.
    ComputedOutput,
    /// Settable by the user; forces replacement when changed, otherwise inert.
    Trigger,
}

/// How the applier resolves an unknown computed attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Derivation {
    /// Copy the value of another attribute from the planned state.
    Mirror {
        /// The attribute to copy from.
        source: String,
    },
    /// Resolve with the engine's injected identifier generator.
    GeneratedId,
}

/// A single schema attribute.
#[derive(Debug, Clone)]
pub struct Attribute {
    /// Attribute name, unique within the schema.
    pub name: String,
    /// Semantic type.
    pub ty: AttributeType,
    /// Mutability role.
    pub role: AttributeRole,
    /// Derivation rule; present iff the role is [`AttributeRole::ComputedOutput`].
    pub derivation: Option<Derivation>,
    /// Attributes whose change marks this one unknown during planning.
    /// Only meaningful for computed outputs.
    pub recompute_on: Vec<String>,
}

/// Ordered, validated attribute set describing one resource kind.
#[derive(Debug, Clone)]
pub struct ResourceSchema {
    type_name: String,
    attributes: Vec<Attribute>,
}

/// Builder for [`ResourceSchema`], validating the declaration on `build`.
#[derive(Debug)]
pub struct SchemaBuilder {
    type_name: String,
    attributes: Vec<Attribute>,
}

impl AttributeType {
    /// Returns true if the given concrete value inhabits this type.
    #[must_use]
    pub fn accepts(self, value: &serde_json::Value) -> bool {
        match self {
            Self::Dynamic => true,
            Self::String => value.is_string(),
            Self::Number => value.is_number(),
            Self::Bool => value.is_boolean(),
            Self::List => value.is_array(),
            Self::Map => value.is_object(),
        }
    }
}

impl Derivation {
    /// Creates a mirror derivation from the named source attribute.
    #[must_use]
    pub fn mirror(source: impl Into<String>) -> Self {
        Self::Mirror {
            source: source.into(),
        }
    }
}

impl ResourceSchema {
    /// Starts building a schema for the named resource kind.
    #[must_use]
    pub fn builder(type_name: impl Into<String>) -> SchemaBuilder {
        SchemaBuilder {
            type_name: type_name.into(),
            attributes: Vec::new(),
        }
    }

    /// The resource kind this schema describes.
    #[must_use]
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// All attributes, in declaration order.
    #[must_use]
    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    /// Looks up an attribute by name.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name == name)
    }

    /// Computed-output attributes, in declaration order.
    pub fn computed_outputs(&self) -> impl Iterator<Item = &Attribute> {
        self.attributes
            .iter()
            .filter(|a| a.role == AttributeRole::ComputedOutput)
    }

    /// Trigger attributes, in declaration order.
    pub fn triggers(&self) -> impl Iterator<Item = &Attribute> {
        self.attributes
            .iter()
            .filter(|a| a.role == AttributeRole::Trigger)
    }

    /// A state value with every declared attribute null.
    #[must_use]
    pub fn null_state(&self) -> StateValue {
        StateValue::of(self.attributes.iter().map(|a| (a.name.clone(), Value::Null)))
    }

    /// Checks that a state value only carries declared attributes and that
    /// every known value inhabits its declared type.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::UndeclaredAttribute`] or
    /// [`SchemaError::TypeMismatch`] on the first violation found.
    pub fn check_conforms(&self, state: &StateValue) -> Result<(), SchemaError> {
        for (name, value) in state.iter() {
            let Some(attribute) = self.attribute(name) else {
                return Err(SchemaError::UndeclaredAttribute {
                    name: name.to_string(),
                });
            };
            if let Value::Known(concrete) = value
                && !attribute.ty.accepts(concrete)
            {
                return Err(SchemaError::TypeMismatch {
                    name: name.to_string(),
                    expected: attribute.ty.to_string(),
                });
            }
        }
        Ok(())
    }
}

impl SchemaBuilder {
    /// Declares a user-settable input attribute.
    #[must_use]
    pub fn input(mut self, name: impl Into<String>, ty: AttributeType) -> Self {
        self.attributes.push(Attribute {
            name: name.into(),
            ty,
            role: AttributeRole::Input,
            derivation: None,
            recompute_on: vec![],
        });
        self
    }

    /// Declares a trigger attribute.
    #[must_use]
    pub fn trigger(mut self, name: impl Into<String>, ty: AttributeType) -> Self {
        self.attributes.push(Attribute {
            name: name.into(),
            ty,
            role: AttributeRole::Trigger,
            derivation: None,
            recompute_on: vec![],
        });
        self
    }

    /// Declares a computed-output attribute with its derivation rule and the
    /// attributes whose change forces recomputation.
    #[must_use]
    pub fn computed<N: Into<String>>(
        mut self,
        name: impl Into<String>,
        ty: AttributeType,
        derivation: Derivation,
        recompute_on: impl IntoIterator<Item = N>,
    ) -> Self {
        self.attributes.push(Attribute {
            name: name.into(),
            ty,
            role: AttributeRole::ComputedOutput,
            derivation: Some(derivation),
            recompute_on: recompute_on.into_iter().map(Into::into).collect(),
        });
        self
    }

    /// Validates the declaration and produces the schema.
    ///
    /// # Errors
    ///
    /// Returns a [`SchemaError`] when a name is declared twice, a derivation
    /// references an undeclared or computed attribute, or a recompute
    /// reference dangles.
    pub fn build(self) -> Result<ResourceSchema, SchemaError> {
        let mut seen = HashSet::new();
        for attribute in &self.attributes {
            if !seen.insert(attribute.name.as_str()) {
                return Err(SchemaError::DuplicateAttribute {
                    name: attribute.name.clone(),
                });
            }
        }

        let declared: HashSet<&str> = self.attributes.iter().map(|a| a.name.as_str()).collect();
        let computed: HashSet<&str> = self
            .attributes
            .iter()
            .filter(|a| a.role == AttributeRole::ComputedOutput)
            .map(|a| a.name.as_str())
            .collect();

        for attribute in &self.attributes {
            if let Some(Derivation::Mirror { source }) = &attribute.derivation {
                // A mirror must point at a declared, non-computed attribute.
                if !declared.contains(source.as_str()) || computed.contains(source.as_str()) {
                    return Err(SchemaError::DanglingDerivation {
                        attribute: attribute.name.clone(),
                        reference: source.clone(),
                    });
                }
            }
            for reference in &attribute.recompute_on {
                if !declared.contains(reference.as_str()) || computed.contains(reference.as_str())
                {
                    return Err(SchemaError::DanglingDerivation {
                        attribute: attribute.name.clone(),
                        reference: reference.clone(),
                    });
                }
            }
        }

        Ok(ResourceSchema {
            type_name: self.type_name,
            attributes: self.attributes,
        })
    }
}

impl std::fmt::Display for AttributeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Dynamic => "dynamic",
            Self::String => "string",
            Self::Number => "number",
            Self::Bool => "bool",
            Self::List => "list",
            Self::Map => "map",
        };
        write!(f, "{s}")
    }
}

impl std::fmt::Display for AttributeRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Input => "input",
            Self::ComputedOutput => "computed",
            Self::Trigger => "trigger",
        };
        write!(f, "{s}")
    }
}
