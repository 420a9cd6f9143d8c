//! Projection-aware view over a host object model.
//!
//! K_i: Hosts only know named types; projections are answered here.
//! K_i: A projection instance is a plain `Object` tagged with the projection type.

use crate::models::{MapperError, Object, Result, TypeRef, Value};
use crate::object::{ObjectModel, PropertyDescriptor, TypeKind};

/// Borrowed view combining a host model with the engine's package filter.
#[derive(Clone, Copy)]
pub struct ModelView<'a> {
    model: &'a dyn ObjectModel,
    package_prefixes: &'a [String],
}

impl<'a> ModelView<'a> {
    pub fn new(model: &'a dyn ObjectModel, package_prefixes: &'a [String]) -> Self {
        Self {
            model,
            package_prefixes,
        }
    }

    pub fn kind(&self, ty: &TypeRef) -> Option<TypeKind> {
        match ty {
            TypeRef::Projection(_) => Some(TypeKind::Bean),
            TypeRef::Named(_) if ty.is_any() => Some(TypeKind::Any),
            TypeRef::Named(_) => self.model.kind(ty),
        }
    }

    pub fn properties(&self, ty: &TypeRef) -> Vec<PropertyDescriptor> {
        match ty {
            TypeRef::Projection(p) => p.properties().to_vec(),
            TypeRef::Named(_) => self.model.properties(ty),
        }
    }

    pub fn new_instance(&self, ty: &TypeRef) -> Result<Value> {
        match ty {
            TypeRef::Projection(p) => {
                let mut object = Object::new(ty.clone());
                for property in p.properties() {
                    object.set(property.name.clone(), Value::Null);
                }
                Ok(Value::Object(object))
            }
            TypeRef::Named(_) => self.model.new_instance(ty),
        }
    }

    pub fn get(&self, instance: &Value, property: &str) -> Result<Value> {
        match instance {
            Value::Object(object) if object.type_ref().as_projection().is_some() => {
                Ok(object.get(property).cloned().unwrap_or_default())
            }
            _ => self.model.get(instance, property),
        }
    }

    pub fn set(&self, instance: &mut Value, property: &str, value: Value) -> Result<()> {
        match instance {
            Value::Object(object) if object.type_ref().as_projection().is_some() => {
                if !object.contains(property) {
                    return Err(MapperError::UnknownProperty {
                        ty: object.type_ref().clone(),
                        property: property.to_string(),
                    });
                }
                object.set(property, value);
                Ok(())
            }
            _ => self.model.set(instance, property, value),
        }
    }

    /// Inheritance distance; `any` sits above every type.
    pub fn distance(&self, from: &TypeRef, to: &TypeRef) -> Option<usize> {
        if from == to {
            return Some(0);
        }
        match (from, to) {
            (TypeRef::Named(_), TypeRef::Named(_)) => self.model.distance(from, to),
            _ => None,
        }
    }

    pub fn is_assignable(&self, from: &TypeRef, to: &TypeRef) -> bool {
        to.is_any() || self.distance(from, to).is_some()
    }

    /// Whether values of this type are mapped property by property.
    pub fn is_bean(&self, ty: &TypeRef) -> bool {
        if self.kind(ty) != Some(TypeKind::Bean) {
            return false;
        }
        match ty {
            TypeRef::Projection(_) => true,
            TypeRef::Named(name) => {
                self.package_prefixes.is_empty()
                    || self
                        .package_prefixes
                        .iter()
                        .any(|prefix| name.starts_with(prefix.as_str()))
            }
        }
    }

    pub fn is_collection(&self, ty: &TypeRef) -> bool {
        self.kind(ty).is_some_and(TypeKind::is_collection)
    }
}
