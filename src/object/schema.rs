//! Schema-driven object model.
//!
//! K_i: Types are declared once (in code or in the settings file) and never change.
//! K_i: Built-in scalar and collection types are always present.
//! B_i: Declared parents exist → unknown parents are simply not walked.

use crate::models::{ConfigError, MapperError, Result, TypeRef, Value, builtin};
use crate::models::{Collection, Object};
use crate::object::{ObjectModel, PropertyDescriptor, TypeKind};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::collections::{HashSet, VecDeque};
use std::sync::Arc;

/// Declaration of a single type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypeSchema {
    /// Fully qualified type name (e.g. "app.model.Person")
    pub name: String,

    /// Shape of the type
    #[serde(default)]
    pub kind: TypeKind,

    /// Parent types (inherit properties, drive assignability)
    #[serde(default)]
    pub extends: Vec<String>,

    /// Declared properties
    #[serde(default)]
    pub properties: Vec<PropertySchema>,

    /// Whether `new_instance` may construct this type
    #[serde(default = "default_true")]
    pub instantiable: bool,
}

/// Declaration of a single property.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropertySchema {
    pub name: String,

    /// Declared type name
    #[serde(rename = "type")]
    pub ty: String,

    /// Element type name for collection properties
    #[serde(default)]
    pub element: Option<String>,

    #[serde(default = "default_true")]
    pub readable: bool,

    #[serde(default = "default_true")]
    pub writable: bool,

    /// Name of the security check guarding this property
    #[serde(default)]
    pub secured_by: Option<String>,
}

fn default_true() -> bool {
    true
}

impl TypeSchema {
    /// An instantiable bean type without properties.
    pub fn bean(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: TypeKind::Bean,
            extends: Vec::new(),
            properties: Vec::new(),
            instantiable: true,
        }
    }

    /// A collection type extending `parent` (e.g. a custom `List`).
    pub fn collection(name: impl Into<String>, kind: TypeKind, parent: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind,
            extends: vec![parent.into()],
            properties: Vec::new(),
            instantiable: true,
        }
    }

    pub fn property(mut self, property: PropertySchema) -> Self {
        self.properties.push(property);
        self
    }

    pub fn extends(mut self, parent: impl Into<String>) -> Self {
        self.extends.push(parent.into());
        self
    }

    pub fn not_instantiable(mut self) -> Self {
        self.instantiable = false;
        self
    }
}

impl PropertySchema {
    pub fn new(name: impl Into<String>, ty: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
            element: None,
            readable: true,
            writable: true,
            secured_by: None,
        }
    }

    pub fn element(mut self, element: impl Into<String>) -> Self {
        self.element = Some(element.into());
        self
    }

    pub fn read_only(mut self) -> Self {
        self.writable = false;
        self
    }

    pub fn write_only(mut self) -> Self {
        self.readable = false;
        self
    }

    pub fn secured_by(mut self, check: impl Into<String>) -> Self {
        self.secured_by = Some(check.into());
        self
    }

    fn descriptor(&self) -> PropertyDescriptor {
        PropertyDescriptor {
            name: self.name.clone(),
            ty: TypeRef::named(&self.ty),
            element_type: self.element.as_ref().map(TypeRef::named),
            readable: self.readable,
            writable: self.writable,
            secured_by: self.secured_by.clone(),
        }
    }
}

/// Object model backed by declared type schemas.
///
/// Thread-safe: schemas live in a `DashMap` and may be registered while
/// other threads map.
#[derive(Debug)]
pub struct SchemaRegistry {
    types: DashMap<String, Arc<TypeSchema>>,
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl SchemaRegistry {
    /// Create a registry holding only the built-in types.
    pub fn new() -> Self {
        let registry = Self {
            types: DashMap::new(),
        };

        let scalar = |name: &str| TypeSchema {
            name: name.to_string(),
            kind: TypeKind::Scalar,
            extends: Vec::new(),
            properties: Vec::new(),
            instantiable: true,
        };
        let builtins = [
            scalar(builtin::BOOL),
            scalar(builtin::INT),
            scalar(builtin::FLOAT),
            scalar(builtin::TEXT),
            TypeSchema {
                kind: TypeKind::Any,
                ..scalar(builtin::ANY)
            }
            .not_instantiable(),
            TypeSchema {
                kind: TypeKind::List,
                ..scalar(builtin::COLLECTION)
            }
            .not_instantiable(),
            TypeSchema::collection(builtin::LIST, TypeKind::List, builtin::COLLECTION)
                .not_instantiable(),
            TypeSchema::collection(builtin::SET, TypeKind::Set, builtin::COLLECTION)
                .not_instantiable(),
            TypeSchema {
                kind: TypeKind::Map,
                ..scalar(builtin::MAP)
            }
            .not_instantiable(),
            TypeSchema::collection(builtin::ARRAY_LIST, TypeKind::List, builtin::LIST),
            TypeSchema::collection(builtin::HASH_SET, TypeKind::Set, builtin::SET),
            TypeSchema::collection(builtin::HASH_MAP, TypeKind::Map, builtin::MAP),
        ];
        for schema in builtins {
            registry
                .types
                .insert(schema.name.clone(), Arc::new(schema));
        }

        registry
    }

    /// Build a registry from a list of schemas.
    pub fn from_schemas(schemas: impl IntoIterator<Item = TypeSchema>) -> std::result::Result<Self, ConfigError> {
        let registry = Self::new();
        for schema in schemas {
            registry.register(schema)?;
        }
        Ok(registry)
    }

    /// Register a new type.
    ///
    /// B_i(name is not taken) → Result
    pub fn register(&self, schema: TypeSchema) -> std::result::Result<TypeRef, ConfigError> {
        let ty = TypeRef::named(&schema.name);
        match self.types.entry(schema.name.clone()) {
            dashmap::mapref::entry::Entry::Occupied(_) => Err(ConfigError::InvalidSchema(format!(
                "type '{}' is already registered",
                schema.name
            ))),
            dashmap::mapref::entry::Entry::Vacant(slot) => {
                slot.insert(Arc::new(schema));
                Ok(ty)
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<Arc<TypeSchema>> {
        self.types.get(name).map(|s| Arc::clone(s.value()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    fn schema_of(&self, ty: &TypeRef) -> Option<Arc<TypeSchema>> {
        ty.name().and_then(|name| self.get(name))
    }

    /// Collect inherited properties, parents first; a child redeclaring a name wins.
    fn collect_properties(
        &self,
        schema: &TypeSchema,
        visited: &mut HashSet<String>,
        out: &mut Vec<PropertyDescriptor>,
    ) {
        if !visited.insert(schema.name.clone()) {
            return;
        }
        for parent in &schema.extends {
            if let Some(parent_schema) = self.get(parent) {
                self.collect_properties(&parent_schema, visited, out);
            }
        }
        for property in &schema.properties {
            let descriptor = property.descriptor();
            match out.iter_mut().find(|p| p.name == descriptor.name) {
                Some(existing) => *existing = descriptor,
                None => out.push(descriptor),
            }
        }
    }
}

impl ObjectModel for SchemaRegistry {
    fn kind(&self, ty: &TypeRef) -> Option<TypeKind> {
        self.schema_of(ty).map(|s| s.kind)
    }

    fn properties(&self, ty: &TypeRef) -> Vec<PropertyDescriptor> {
        let Some(schema) = self.schema_of(ty) else {
            return Vec::new();
        };
        let mut out = Vec::new();
        self.collect_properties(&schema, &mut HashSet::new(), &mut out);
        out
    }

    fn new_instance(&self, ty: &TypeRef) -> Result<Value> {
        let schema = self
            .schema_of(ty)
            .ok_or_else(|| MapperError::instantiation(ty, "unknown type"))?;
        if !schema.instantiable {
            return Err(MapperError::instantiation(ty, "type is not instantiable"));
        }

        let value = match schema.kind {
            TypeKind::Bean => {
                let mut object = Object::new(ty.clone());
                for property in self.properties(ty) {
                    object.set(property.name, Value::Null);
                }
                Value::Object(object)
            }
            TypeKind::List => Value::Collection(Collection::list(ty.clone(), Vec::new())),
            TypeKind::Set => Value::Collection(Collection::set(ty.clone(), Vec::new())),
            TypeKind::Map => Value::Collection(Collection::map(ty.clone(), Vec::new())),
            TypeKind::Scalar => match schema.name.as_str() {
                builtin::BOOL => Value::Bool(false),
                builtin::INT => Value::Int(0),
                builtin::FLOAT => Value::Float(0.0),
                builtin::TEXT => Value::Text(String::new()),
                _ => return Err(MapperError::instantiation(ty, "unknown scalar")),
            },
            TypeKind::Any => return Err(MapperError::instantiation(ty, "type is not instantiable")),
        };
        Ok(value)
    }

    fn distance(&self, from: &TypeRef, to: &TypeRef) -> Option<usize> {
        if from == to {
            return Some(0);
        }
        let (from_name, to_name) = (from.name()?, to.name()?);

        let mut visited = HashSet::new();
        let mut queue = VecDeque::from([(from_name.to_string(), 0usize)]);
        while let Some((name, depth)) = queue.pop_front() {
            if name == to_name {
                return Some(depth);
            }
            if !visited.insert(name.clone()) {
                continue;
            }
            if let Some(schema) = self.get(&name) {
                for parent in &schema.extends {
                    queue.push_back((parent.clone(), depth + 1));
                }
            }
        }
        None
    }
}
