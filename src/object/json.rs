//! Schema-guided bridge between JSON documents and `Value` trees.
//!
//! B_i(document matches declared types) → Result

use crate::models::{Collection, MapperError, Object, Result, TypeRef, Value, builtin};
use crate::object::{ObjectModel, TypeKind};
use serde_json::Value as Json;

/// Build a `Value` of type `ty` from a JSON document.
///
/// `element` is the element type when `ty` is a collection.
pub fn value_from_json(
    model: &dyn ObjectModel,
    ty: &TypeRef,
    element: Option<&TypeRef>,
    json: &Json,
) -> Result<Value> {
    if json.is_null() {
        return Ok(Value::Null);
    }

    let mismatch = || {
        MapperError::conversion(
            &TypeRef::named("json"),
            ty,
            format!("unexpected JSON value {json}"),
        )
    };

    let kind = if ty.is_any() {
        TypeKind::Any
    } else {
        model
            .kind(ty)
            .ok_or_else(|| MapperError::instantiation(ty, "unknown type"))?
    };

    match kind {
        TypeKind::Any => Ok(untyped(json)),
        TypeKind::Scalar => match (ty.name(), json) {
            (Some(builtin::BOOL), Json::Bool(b)) => Ok(Value::Bool(*b)),
            (Some(builtin::INT), Json::Number(n)) => n.as_i64().map(Value::Int).ok_or_else(mismatch),
            (Some(builtin::FLOAT), Json::Number(n)) => {
                n.as_f64().map(Value::Float).ok_or_else(mismatch)
            }
            (Some(builtin::TEXT), Json::String(s)) => Ok(Value::Text(s.clone())),
            _ => Err(mismatch()),
        },
        TypeKind::Bean => {
            let Json::Object(fields) = json else {
                return Err(mismatch());
            };
            let mut instance = model.new_instance(ty)?;
            let properties = model.properties(ty);
            for (name, field) in fields {
                let property = properties.iter().find(|p| &p.name == name).ok_or_else(|| {
                    MapperError::UnknownProperty {
                        ty: ty.clone(),
                        property: name.clone(),
                    }
                })?;
                let value =
                    value_from_json(model, &property.ty, property.element_type.as_ref(), field)?;
                model.set(&mut instance, name, value)?;
            }
            Ok(instance)
        }
        TypeKind::List | TypeKind::Set => {
            let Json::Array(items) = json else {
                return Err(mismatch());
            };
            let element = element.cloned().unwrap_or_else(TypeRef::any);
            let values = items
                .iter()
                .map(|item| value_from_json(model, &element, None, item))
                .collect::<Result<Vec<_>>>()?;
            let collection = if kind == TypeKind::Set {
                Collection::set(concrete(model, ty, builtin::HASH_SET), values)
            } else {
                Collection::list(concrete(model, ty, builtin::ARRAY_LIST), values)
            };
            Ok(Value::Collection(collection))
        }
        TypeKind::Map => {
            let Json::Object(entries) = json else {
                return Err(mismatch());
            };
            let element = element.cloned().unwrap_or_else(TypeRef::any);
            let values = entries
                .iter()
                .map(|(k, v)| Ok((k.clone(), value_from_json(model, &element, None, v)?)))
                .collect::<Result<Vec<_>>>()?;
            Ok(Value::Collection(Collection::map(
                concrete(model, ty, builtin::HASH_MAP),
                values,
            )))
        }
    }
}

/// The declared collection type if it can be instantiated, else the default implementation.
fn concrete(model: &dyn ObjectModel, ty: &TypeRef, fallback: &str) -> TypeRef {
    if model.new_instance(ty).is_ok() {
        ty.clone()
    } else {
        TypeRef::named(fallback)
    }
}

fn untyped(json: &Json) -> Value {
    match json {
        Json::Null => Value::Null,
        Json::Bool(b) => Value::Bool(*b),
        Json::Number(n) => n
            .as_i64()
            .map(Value::Int)
            .unwrap_or_else(|| Value::Float(n.as_f64().unwrap_or_default())),
        Json::String(s) => Value::Text(s.clone()),
        Json::Array(items) => Value::Collection(Collection::list(
            TypeRef::array_list(),
            items.iter().map(untyped),
        )),
        Json::Object(entries) => Value::Collection(Collection::map(
            TypeRef::named(builtin::HASH_MAP),
            entries.iter().map(|(k, v)| (k.clone(), untyped(v))),
        )),
    }
}
