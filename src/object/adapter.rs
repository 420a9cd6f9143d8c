//! Object model capability consumed by the engine.
//!
//! Epistemic foundation:
//! - K_i: The engine never inspects a type directly, only through `ObjectModel`
//! - B_i: A type may be unknown to the host → empty property list / Option
//! - I^R: Hosts choose how types are declared (schemas, generated code, ...)

use crate::models::{MapperError, Result, TypeRef, Value};
use serde::{Deserialize, Serialize};

/// Broad shape of a type.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TypeKind {
    /// Object with named properties (default)
    #[default]
    Bean,
    /// bool, int, float, text
    Scalar,
    List,
    Set,
    Map,
    /// Top type, accepts every value
    Any,
}

impl TypeKind {
    pub fn is_collection(self) -> bool {
        matches!(self, Self::List | Self::Set | Self::Map)
    }
}

/// A property as reported by the object model.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PropertyDescriptor {
    pub name: String,
    pub ty: TypeRef,
    /// Element (or map value) type for collection properties
    pub element_type: Option<TypeRef>,
    pub readable: bool,
    pub writable: bool,
    /// Name of the security check guarding this property
    pub secured_by: Option<String>,
}

impl PropertyDescriptor {
    /// A readable and writable property.
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            name: name.into(),
            ty,
            element_type: None,
            readable: true,
            writable: true,
            secured_by: None,
        }
    }

    pub fn with_element_type(mut self, element_type: TypeRef) -> Self {
        self.element_type = Some(element_type);
        self
    }

    pub fn with_security(mut self, check: impl Into<String>) -> Self {
        self.secured_by = Some(check.into());
        self
    }
}

/// Introspection and instantiation capability of a host.
///
/// Hosts only ever receive [`TypeRef::Named`] types: projections are resolved
/// by [`ModelView`](super::ModelView) before a call reaches the host.
pub trait ObjectModel: Send + Sync {
    /// Shape of a type, `None` if the type is unknown.
    fn kind(&self, ty: &TypeRef) -> Option<TypeKind>;

    /// Properties of a type in declaration order. Unknown types have none.
    fn properties(&self, ty: &TypeRef) -> Vec<PropertyDescriptor>;

    /// Create a fresh instance with every property unset.
    ///
    /// B_i(type has an accessible constructor) → Result
    fn new_instance(&self, ty: &TypeRef) -> Result<Value>;

    /// Number of `extends` steps from `from` up to `to`; `Some(0)` when equal.
    fn distance(&self, from: &TypeRef, to: &TypeRef) -> Option<usize>;

    /// Read a property. Unset properties read as `Null`.
    fn get(&self, instance: &Value, property: &str) -> Result<Value> {
        match instance {
            Value::Object(object) => Ok(object.get(property).cloned().unwrap_or_default()),
            other => Err(MapperError::UnknownProperty {
                ty: other.type_of(),
                property: property.to_string(),
            }),
        }
    }

    /// Write a property.
    fn set(&self, instance: &mut Value, property: &str, value: Value) -> Result<()> {
        match instance {
            Value::Object(object) => {
                object.set(property, value);
                Ok(())
            }
            other => Err(MapperError::UnknownProperty {
                ty: other.type_of(),
                property: property.to_string(),
            }),
        }
    }
}
