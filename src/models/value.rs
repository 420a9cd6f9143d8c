//! Dynamic value tree and type identities.
//!
//! K_i: Every value knows its runtime type (`Value::type_of`).
//! K_i: Type identity is structural for named types and pointer-stable for projections.

use crate::dynclass::Projection;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Names of the types every object model understands.
pub mod builtin {
    pub const BOOL: &str = "bool";
    pub const INT: &str = "int";
    pub const FLOAT: &str = "float";
    pub const TEXT: &str = "text";
    /// Every type is assignable to `any`.
    pub const ANY: &str = "any";

    pub const COLLECTION: &str = "Collection";
    pub const LIST: &str = "List";
    pub const SET: &str = "Set";
    pub const MAP: &str = "Map";

    pub const ARRAY_LIST: &str = "ArrayList";
    pub const HASH_SET: &str = "HashSet";
    pub const HASH_MAP: &str = "HashMap";
}

/// Identity of a type known to the engine.
///
/// Named types come from the host object model. Projections are generated
/// by the [`ClassStore`](crate::dynclass::ClassStore) and only ever exist
/// behind an `Arc` handed out by that store.
#[derive(Clone, PartialEq, Eq, Hash)]
pub enum TypeRef {
    Named(Arc<str>),
    Projection(Arc<Projection>),
}

impl TypeRef {
    pub fn named(name: impl AsRef<str>) -> Self {
        Self::Named(Arc::from(name.as_ref()))
    }

    pub fn boolean() -> Self {
        Self::named(builtin::BOOL)
    }

    pub fn int() -> Self {
        Self::named(builtin::INT)
    }

    pub fn float() -> Self {
        Self::named(builtin::FLOAT)
    }

    pub fn text() -> Self {
        Self::named(builtin::TEXT)
    }

    pub fn any() -> Self {
        Self::named(builtin::ANY)
    }

    pub fn list() -> Self {
        Self::named(builtin::LIST)
    }

    pub fn set() -> Self {
        Self::named(builtin::SET)
    }

    pub fn map() -> Self {
        Self::named(builtin::MAP)
    }

    pub fn array_list() -> Self {
        Self::named(builtin::ARRAY_LIST)
    }

    /// Name of a named type, `None` for projections.
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Named(name) => Some(name),
            Self::Projection(_) => None,
        }
    }

    pub fn is_named(&self, name: &str) -> bool {
        self.name() == Some(name)
    }

    pub fn is_any(&self) -> bool {
        self.is_named(builtin::ANY)
    }

    pub fn as_projection(&self) -> Option<&Arc<Projection>> {
        match self {
            Self::Projection(p) => Some(p),
            Self::Named(_) => None,
        }
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named(name) => f.write_str(name),
            Self::Projection(p) => write!(f, "{p}"),
        }
    }
}

impl fmt::Debug for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeRef({self})")
    }
}

/// A dynamically typed value.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Object(Object),
    Collection(Collection),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Runtime type of this value. `Null` reports `any`.
    pub fn type_of(&self) -> TypeRef {
        match self {
            Self::Null => TypeRef::any(),
            Self::Bool(_) => TypeRef::boolean(),
            Self::Int(_) => TypeRef::int(),
            Self::Float(_) => TypeRef::float(),
            Self::Text(_) => TypeRef::text(),
            Self::Object(o) => o.ty.clone(),
            Self::Collection(c) => c.ty.clone(),
        }
    }

    pub fn as_object(&self) -> Option<&Object> {
        match self {
            Self::Object(o) => Some(o),
            _ => None,
        }
    }

    pub fn as_object_mut(&mut self) -> Option<&mut Object> {
        match self {
            Self::Object(o) => Some(o),
            _ => None,
        }
    }

    pub fn as_collection(&self) -> Option<&Collection> {
        match self {
            Self::Collection(c) => Some(c),
            _ => None,
        }
    }

    pub fn into_collection(self) -> Option<Collection> {
        match self {
            Self::Collection(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Untyped JSON rendering (type names are dropped).
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::Value as Json;
        match self {
            Self::Null => Json::Null,
            Self::Bool(b) => Json::Bool(*b),
            Self::Int(i) => Json::from(*i),
            Self::Float(f) => serde_json::Number::from_f64(*f).map_or(Json::Null, Json::Number),
            Self::Text(s) => Json::String(s.clone()),
            Self::Object(o) => Json::Object(
                o.fields
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
            Self::Collection(c) => match &c.elements {
                Elements::List(items) | Elements::Set(items) => {
                    Json::Array(items.iter().map(Value::to_json).collect())
                }
                Elements::Map(entries) => Json::Object(
                    entries
                        .iter()
                        .map(|(k, v)| (k.clone(), v.to_json()))
                        .collect(),
                ),
            },
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Int(v.into())
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<Object> for Value {
    fn from(v: Object) -> Self {
        Self::Object(v)
    }
}

impl From<Collection> for Value {
    fn from(v: Collection) -> Self {
        Self::Collection(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

/// An instance of a bean type: a type identity plus named fields.
#[derive(Debug, Clone, PartialEq)]
pub struct Object {
    ty: TypeRef,
    fields: BTreeMap<String, Value>,
}

impl Object {
    pub fn new(ty: TypeRef) -> Self {
        Self {
            ty,
            fields: BTreeMap::new(),
        }
    }

    /// Builder-style field assignment.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    pub fn type_ref(&self) -> &TypeRef {
        &self.ty
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Value> {
        self.fields.get_mut(name)
    }

    pub fn set(&mut self, name: impl Into<String>, value: Value) {
        self.fields.insert(name.into(), value);
    }

    pub fn take(&mut self, name: &str) -> Option<Value> {
        self.fields.get_mut(name).map(std::mem::take)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Element storage of a collection value.
#[derive(Debug, Clone, PartialEq)]
pub enum Elements {
    List(Vec<Value>),
    /// Insertion ordered, no two elements equal.
    Set(Vec<Value>),
    Map(BTreeMap<String, Value>),
}

/// A collection value tagged with its runtime collection type.
#[derive(Debug, Clone, PartialEq)]
pub struct Collection {
    ty: TypeRef,
    elements: Elements,
}

impl Collection {
    pub fn list(ty: TypeRef, items: impl IntoIterator<Item = Value>) -> Self {
        Self {
            ty,
            elements: Elements::List(items.into_iter().collect()),
        }
    }

    pub fn set(ty: TypeRef, items: impl IntoIterator<Item = Value>) -> Self {
        let mut set = Self {
            ty,
            elements: Elements::Set(Vec::new()),
        };
        for item in items {
            set.insert(item);
        }
        set
    }

    pub fn map(ty: TypeRef, entries: impl IntoIterator<Item = (String, Value)>) -> Self {
        Self {
            ty,
            elements: Elements::Map(entries.into_iter().collect()),
        }
    }

    pub fn type_ref(&self) -> &TypeRef {
        &self.ty
    }

    pub fn elements(&self) -> &Elements {
        &self.elements
    }

    pub fn len(&self) -> usize {
        match &self.elements {
            Elements::List(v) | Elements::Set(v) => v.len(),
            Elements::Map(m) => m.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterate elements with their key (map entries) or position (lists and sets).
    pub fn iter(&self) -> Box<dyn Iterator<Item = (String, &Value)> + '_> {
        match &self.elements {
            Elements::List(v) | Elements::Set(v) => {
                Box::new(v.iter().enumerate().map(|(i, v)| (i.to_string(), v)))
            }
            Elements::Map(m) => Box::new(m.iter().map(|(k, v)| (k.clone(), v))),
        }
    }

    pub fn values(&self) -> Box<dyn Iterator<Item = &Value> + '_> {
        match &self.elements {
            Elements::List(v) | Elements::Set(v) => Box::new(v.iter()),
            Elements::Map(m) => Box::new(m.values()),
        }
    }

    /// Remove and return every element.
    pub fn drain(&mut self) -> Vec<Value> {
        match &mut self.elements {
            Elements::List(v) | Elements::Set(v) => std::mem::take(v),
            Elements::Map(m) => std::mem::take(m).into_values().collect(),
        }
    }

    /// Add a value: appended to lists, added to sets unless already present.
    ///
    /// Returns false when a set already held an equal element. Map collections
    /// key the value by its position.
    pub fn insert(&mut self, value: Value) -> bool {
        match &mut self.elements {
            Elements::List(v) => {
                v.push(value);
                true
            }
            Elements::Set(v) => {
                if v.contains(&value) {
                    false
                } else {
                    v.push(value);
                    true
                }
            }
            Elements::Map(m) => {
                let key = m.len().to_string();
                m.insert(key, value);
                true
            }
        }
    }

    /// Key based access into map collections.
    pub fn get_key(&self, key: &str) -> Option<&Value> {
        match &self.elements {
            Elements::Map(m) => m.get(key),
            _ => None,
        }
    }

    /// Insert or replace a map entry. Non-map collections fall back to `insert`.
    pub fn upsert(&mut self, key: String, value: Value) {
        match &mut self.elements {
            Elements::Map(m) => {
                m.insert(key, value);
            }
            _ => {
                self.insert(value);
            }
        }
    }

    /// Remove a map entry, returning its value.
    pub fn remove_key(&mut self, key: &str) -> Option<Value> {
        match &mut self.elements {
            Elements::Map(m) => m.remove(key),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_of_scalars_and_objects() {
        assert_eq!(Value::from(3).type_of(), TypeRef::int());
        assert_eq!(Value::from("x").type_of(), TypeRef::text());
        assert_eq!(Value::Null.type_of(), TypeRef::any());

        let person = Object::new(TypeRef::named("Person")).with("name", "Ada");
        assert_eq!(Value::from(person).type_of(), TypeRef::named("Person"));
    }

    #[test]
    fn test_set_deduplicates() {
        let mut set = Collection::set(
            TypeRef::named(builtin::HASH_SET),
            vec![Value::from(1), Value::from(2), Value::from(1)],
        );
        assert_eq!(set.len(), 2);
        assert!(!set.insert(Value::from(2)));
        assert!(set.insert(Value::from(3)));
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn test_drain_empties_collection() {
        let mut list = Collection::list(TypeRef::array_list(), vec![Value::from(1), Value::from(2)]);
        let removed = list.drain();
        assert_eq!(removed.len(), 2);
        assert!(list.is_empty());
    }

    #[test]
    fn test_to_json() {
        let person = Object::new(TypeRef::named("Person"))
            .with("name", "Ada")
            .with("age", 36)
            .with(
                "tags",
                Collection::list(TypeRef::array_list(), vec![Value::from("math")]),
            );
        let json = Value::from(person).to_json();
        assert_eq!(
            json,
            serde_json::json!({"name": "Ada", "age": 36, "tags": ["math"]})
        );
    }
}
