//! The mapping engine.
//!
//! Epistemic foundation:
//! - K_i: A `BeanMapper` pairs one shared core with one per-call override
//! - K_i: Nested and re-entrant calls go through `wrap()`, never by mutating a mapper
//! - B_i: Every value on the way has a known conversion → UnresolvableConversion

mod builder;

pub use builder::BeanMapperBuilder;

use crate::configuration::{CoreConfiguration, NullPolicy, OverrideConfiguration, StrictMappingProperties};
use crate::matching::PropertyLink;
use crate::models::{MapperError, Result, TypeRef, Value};
use crate::object::ObjectModel;
use crate::strategy::MapStrategyType;
use std::sync::Arc;
use tracing::debug;

/// Property name reported when a bare value (not a bean property) fails to convert.
const VALUE_PROPERTY: &str = "value";

/// Entry point for mapping values between types.
///
/// Cheap to clone; clones share the core configuration and its caches.
#[derive(Debug, Clone)]
pub struct BeanMapper {
    core: Arc<CoreConfiguration>,
    config: OverrideConfiguration,
}

impl BeanMapper {
    /// Start configuring a new engine over `model`.
    pub fn builder(model: Arc<dyn ObjectModel>) -> BeanMapperBuilder {
        BeanMapperBuilder::new(model)
    }

    /// Start a per-call configuration sharing this mapper's core.
    pub fn wrap(&self) -> BeanMapperBuilder {
        BeanMapperBuilder::wrap(Arc::clone(&self.core), self.config.inherit())
    }

    pub(crate) fn from_parts(core: Arc<CoreConfiguration>, config: OverrideConfiguration) -> Self {
        Self { core, config }
    }

    pub fn core(&self) -> &CoreConfiguration {
        &self.core
    }

    pub fn configuration(&self) -> &OverrideConfiguration {
        &self.config
    }

    /// Map `source` according to this mapper's configuration.
    ///
    /// A null source maps to null.
    pub fn map(&self, source: &Value) -> Result<Value> {
        if source.is_null() {
            return Ok(Value::Null);
        }
        let strategy = MapStrategyType::determine(&self.config);
        debug!(strategy = ?strategy, source = %source.type_of(), "Selected mapping strategy");
        strategy.strategy(self).map(source)
    }

    /// Map `source` into a new instance of `target_class`.
    pub fn map_to(&self, source: &Value, target_class: TypeRef) -> Result<Value> {
        self.wrap().target_class(target_class)?.build().map(source)
    }

    /// Map `source` onto an existing `target` and return the updated target.
    pub fn map_into(&self, source: &Value, target: Value) -> Result<Value> {
        self.wrap().target(target)?.build().map(source)
    }

    /// Map every element of `source` to `element_type`, collected as `collection_class`.
    pub fn map_collection(
        &self,
        source: &Value,
        collection_class: TypeRef,
        element_type: TypeRef,
    ) -> Result<Value> {
        self.wrap()
            .collection_class(collection_class)?
            .target_class(element_type)?
            .build()
            .map(source)
    }

    pub fn clear_caches(&self) {
        self.core.clear_caches();
    }

    /// Strict naming convention in effect for this call.
    pub fn strict_mapping_properties(&self) -> StrictMappingProperties {
        self.config
            .strict()
            .unwrap_or_else(|| self.core.strict_mapping_properties())
            .clone()
    }

    pub fn null_policy(&self) -> NullPolicy {
        self.config
            .null_policy()
            .unwrap_or_else(|| self.core.null_policy())
    }

    /// Whether this call may be served by a converter for its own source and
    /// target types.
    pub fn is_converter_choosable(&self) -> bool {
        self.config
            .converter_choosable()
            .unwrap_or_else(|| self.core.is_converter_choosable())
    }

    /// Whether elements dropped by a CLEAR are reported to the flushers.
    pub fn must_flush(&self) -> bool {
        self.core.is_flush_enabled() && self.config.is_flush_after_clear()
    }

    /// Same call with another configuration; used by strategies that re-enter.
    pub(crate) fn with_configuration(&self, config: OverrideConfiguration) -> Self {
        Self::from_parts(Arc::clone(&self.core), config)
    }

    /// Map one collection element to `element_type`.
    ///
    /// Bean elements keep this call's downsize lists, so every element of a
    /// downsized collection is downsized. Elements may always be served by a
    /// converter.
    pub(crate) fn map_element(
        &self,
        element: &Value,
        element_type: &TypeRef,
        existing: Option<Value>,
    ) -> Result<Value> {
        if element.is_null() {
            return Ok(Value::Null);
        }
        let view = self.core.view();

        if element.as_object().is_some() && view.is_bean(element_type) {
            let mut config = self.config.inherit();
            config.set_target_class(element_type.clone());
            config.set_converter_choosable(true);
            if let Some(existing @ Value::Object(_)) = existing {
                config.set_target(existing);
            }
            if let Some(fields) = self.config.downsize_source() {
                config.set_downsize_source(fields.to_vec());
            }
            if let Some(fields) = self.config.downsize_target() {
                config.set_downsize_target(fields.to_vec());
            }
            return self.with_configuration(config).map(element);
        }

        self.convert_value(
            "element",
            element.clone(),
            element_type,
            None,
            existing.unwrap_or_default(),
            self.config.parent(),
            true,
        )
    }

    /// Convert the value of one link for the target property.
    pub(crate) fn convert_property(
        &self,
        link: &PropertyLink,
        value: Value,
        existing: Value,
        source: &Value,
    ) -> Result<Value> {
        self.convert_value(
            &link.target_property,
            value,
            &link.target_type,
            link.element_type.as_ref(),
            existing,
            Some(source),
            true,
        )
    }

    /// Convert the source of a top-level call as a whole.
    ///
    /// Converters are consulted only when this call is converter-choosable.
    pub(crate) fn convert_bare(&self, value: Value, target_type: &TypeRef) -> Result<Value> {
        self.convert_value(
            VALUE_PROPERTY,
            value,
            target_type,
            None,
            Value::Null,
            self.config.parent(),
            self.is_converter_choosable(),
        )
    }

    /// Runtime conversion: converter, then collection, then nested bean, then
    /// plain assignment.
    #[allow(clippy::too_many_arguments)]
    fn convert_value(
        &self,
        property: &str,
        value: Value,
        target_type: &TypeRef,
        element_type: Option<&TypeRef>,
        existing: Value,
        parent: Option<&Value>,
        choose_converter: bool,
    ) -> Result<Value> {
        let view = self.core.view();
        let source_type = value.type_of();

        if choose_converter {
            if let Some(converter) = self.core.find_converter(&source_type, target_type) {
                return converter.convert(value, target_type);
            }
        }

        if view.is_collection(target_type) && value.as_collection().is_some() {
            let mut builder = self
                .wrap()
                .collection_class(target_type.clone())?
                .target_class(element_type.cloned().unwrap_or_else(TypeRef::any))?;
            if let Some(parent) = parent {
                builder = builder.parent(parent.clone())?;
            }
            if existing.as_collection().is_some() {
                builder = builder.target(existing)?;
            }
            return builder.build().map(&value);
        }

        if value.as_object().is_some() && view.is_bean(&source_type) && view.is_bean(target_type) {
            let mut builder = self.wrap().target_class(target_type.clone())?;
            if let Some(parent) = parent {
                builder = builder.parent(parent.clone())?;
            }
            if existing.as_object().is_some() {
                builder = builder.target(existing)?;
            }
            return builder.build().map(&value);
        }

        if view.is_assignable(&source_type, target_type) {
            return Ok(value);
        }

        Err(MapperError::UnresolvableConversion {
            property: property.to_string(),
            source_type,
            target_type: target_type.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::FnConverter;
    use crate::matching::{LogicSecuredCheck, PropertyContext};
    use crate::models::Object;
    use crate::object::{PropertySchema, SchemaRegistry, TypeSchema};

    /// Allows access only when the call's parent is the text "hr".
    struct HrOnly;

    impl LogicSecuredCheck for HrOnly {
        fn is_allowed(&self, _property: &PropertyContext<'_>, parent: Option<&Value>) -> bool {
            parent.and_then(Value::as_str) == Some("hr")
        }
    }

    fn registry() -> SchemaRegistry {
        SchemaRegistry::from_schemas([
            TypeSchema::bean("Address")
                .property(PropertySchema::new("street", "text"))
                .property(PropertySchema::new("city", "text")),
            TypeSchema::bean("Person")
                .property(PropertySchema::new("name", "text"))
                .property(PropertySchema::new("age", "int"))
                .property(PropertySchema::new("address", "Address"))
                .property(PropertySchema::new("salary", "float").secured_by("hr")),
            TypeSchema::bean("PersonDto")
                .property(PropertySchema::new("name", "text"))
                .property(PropertySchema::new("age", "text"))
                .property(PropertySchema::new("address", "Address"))
                .property(PropertySchema::new("salary", "float")),
            TypeSchema::bean("PersonForm")
                .property(PropertySchema::new("nameForm", "text"))
                .property(PropertySchema::new("age", "text")),
            TypeSchema::bean("PersonResult")
                .property(PropertySchema::new("nameResult", "text"))
                .property(PropertySchema::new("age", "int")),
            TypeSchema::bean("Badge").property(PropertySchema::new("age", "Address")),
            TypeSchema::bean("Node")
                .property(PropertySchema::new("label", "text"))
                .property(PropertySchema::new("next", "Node")),
        ])
        .unwrap()
    }

    fn builder() -> BeanMapperBuilder {
        BeanMapper::builder(Arc::new(registry()))
            .add_security_check("hr", HrOnly)
            .unwrap()
    }

    fn mapper() -> BeanMapper {
        builder().build()
    }

    fn address(street: &str, city: &str) -> Object {
        Object::new(TypeRef::named("Address"))
            .with("street", street)
            .with("city", city)
    }

    fn person() -> Value {
        Value::Object(
            Object::new(TypeRef::named("Person"))
                .with("name", "Ada")
                .with("age", 36)
                .with("address", address("Main", "Utrecht"))
                .with("salary", 1000.0),
        )
    }

    fn field<'v>(value: &'v Value, name: &str) -> &'v Value {
        value.as_object().unwrap().get(name).unwrap()
    }

    #[test]
    fn test_equal_named_properties_are_copied() {
        let dto = mapper().map_to(&person(), TypeRef::named("PersonDto")).unwrap();

        assert_eq!(dto.type_of(), TypeRef::named("PersonDto"));
        assert_eq!(field(&dto, "name"), &Value::from("Ada"));
        assert_eq!(field(&dto, "age"), &Value::from("36"));
        assert_eq!(field(&dto, "address"), &Value::Object(address("Main", "Utrecht")));
    }

    #[test]
    fn test_mapping_is_idempotent() {
        let mapper = mapper();
        let first = mapper.map_to(&person(), TypeRef::named("PersonDto")).unwrap();
        let second = mapper.map_to(&person(), TypeRef::named("PersonDto")).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_null_source_maps_to_null() {
        let mapped = mapper().map_to(&Value::Null, TypeRef::named("PersonDto")).unwrap();
        assert!(mapped.is_null());
    }

    #[test]
    fn test_missing_target_class_is_configuration_error() {
        let err = mapper().map(&person()).unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_security_denial_skips_only_that_property() {
        let mapper = mapper();

        let denied = mapper.map_to(&person(), TypeRef::named("PersonDto")).unwrap();
        assert_eq!(field(&denied, "salary"), &Value::Null);
        assert_eq!(field(&denied, "name"), &Value::from("Ada"));

        let allowed = mapper
            .wrap()
            .target_class(TypeRef::named("PersonDto"))
            .unwrap()
            .parent(Value::from("hr"))
            .unwrap()
            .build()
            .map(&person())
            .unwrap();
        assert_eq!(field(&allowed, "salary"), &Value::Float(1000.0));
    }

    #[test]
    fn test_strict_suffix_convention() {
        let mapper = mapper();
        let form = Value::Object(
            Object::new(TypeRef::named("PersonForm"))
                .with("nameForm", "Ada")
                .with("age", "36"),
        );

        let person = mapper.map_to(&form, TypeRef::named("Person")).unwrap();
        assert_eq!(field(&person, "name"), &Value::from("Ada"));
        assert_eq!(field(&person, "age"), &Value::Int(36));

        let result = mapper.map_to(&person, TypeRef::named("PersonResult")).unwrap();
        assert_eq!(field(&result, "nameResult"), &Value::from("Ada"));

        // the suffixed source does not reach the suffixed target
        let direct = mapper.map_to(&form, TypeRef::named("PersonResult")).unwrap();
        assert_eq!(field(&direct, "nameResult"), &Value::Null);
    }

    #[test]
    fn test_null_policy() {
        let mapper = mapper();
        let source = Value::Object(Object::new(TypeRef::named("Person")).with("age", 7));
        let target = Value::Object(Object::new(TypeRef::named("PersonDto")).with("name", "Old"));

        let propagated = mapper.map_into(&source, target.clone()).unwrap();
        assert_eq!(field(&propagated, "name"), &Value::Null);

        let skipped = mapper
            .wrap()
            .null_policy(NullPolicy::Skip)
            .target(target)
            .unwrap()
            .build()
            .map(&source)
            .unwrap();
        assert_eq!(field(&skipped, "name"), &Value::from("Old"));
        assert_eq!(field(&skipped, "age"), &Value::from("7"));
    }

    #[test]
    fn test_nested_mapping_merges_into_existing_value() {
        let mapper = mapper();
        let source = Value::Object(
            Object::new(TypeRef::named("Person"))
                .with("address", Object::new(TypeRef::named("Address")).with("street", "Main")),
        );
        let target = Value::Object(
            Object::new(TypeRef::named("PersonDto")).with("address", address("Old", "Leiden")),
        );

        let merged = mapper
            .wrap()
            .null_policy(NullPolicy::Skip)
            .target(target)
            .unwrap()
            .build()
            .map(&source)
            .unwrap();
        assert_eq!(field(&merged, "address"), &Value::Object(address("Main", "Leiden")));
    }

    #[test]
    fn test_user_converter_wins_over_defaults() {
        let mapper = builder()
            .add_converter(FnConverter::new(TypeRef::int(), TypeRef::text(), |_| {
                Ok(Value::from("custom"))
            }))
            .unwrap()
            .build();

        let dto = mapper.map_to(&person(), TypeRef::named("PersonDto")).unwrap();
        assert_eq!(field(&dto, "age"), &Value::from("custom"));
    }

    #[test]
    fn test_converter_choosable_for_top_level_call() {
        let mapper = builder()
            .add_converter(FnConverter::new(
                TypeRef::named("Person"),
                TypeRef::named("PersonDto"),
                |_| Ok(Value::Object(Object::new(TypeRef::named("PersonDto")).with("name", "converted"))),
            ))
            .unwrap()
            .build();
        assert!(!mapper.is_converter_choosable());

        let mapped = mapper.map_to(&person(), TypeRef::named("PersonDto")).unwrap();
        assert_eq!(field(&mapped, "name"), &Value::from("Ada"));

        let converted = mapper
            .wrap()
            .converter_choosable(true)
            .target_class(TypeRef::named("PersonDto"))
            .unwrap()
            .build()
            .map(&person())
            .unwrap();
        assert_eq!(field(&converted, "name"), &Value::from("converted"));
    }

    #[test]
    fn test_bare_value_needs_choosable_converter() {
        let err = mapper().map_to(&Value::Int(5), TypeRef::text()).unwrap_err();
        assert!(matches!(err, MapperError::UnresolvableConversion { .. }));

        let choosing = builder().converter_choosable(true).build();
        assert_eq!(
            choosing.map_to(&Value::Int(5), TypeRef::text()).unwrap(),
            Value::from("5")
        );
    }

    #[test]
    fn test_unresolvable_conversion_aborts() {
        let err = mapper()
            .map_to(&person(), TypeRef::named("Badge"))
            .unwrap_err();
        match err {
            MapperError::UnresolvableConversion { property, .. } => assert_eq!(property, "age"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_cyclic_type_graph() {
        let node = |label: &str, next: Value| {
            Value::Object(
                Object::new(TypeRef::named("Node"))
                    .with("label", label)
                    .with("next", next),
            )
        };
        let chain = node("a", node("b", node("c", Value::Null)));

        let mapped = mapper().map_to(&chain, TypeRef::named("Node")).unwrap();
        assert_eq!(mapped, chain);
    }

    #[test]
    fn test_strict_bean_pairs() {
        let mapper = builder()
            .add_bean_pair_with_strict_source(TypeRef::named("Person"), TypeRef::named("PersonForm"))
            .unwrap()
            .add_bean_pair_with_strict_target(TypeRef::named("Person"), TypeRef::named("PersonResult"))
            .unwrap()
            .build();

        let err = mapper
            .map_to(&person(), TypeRef::named("PersonForm"))
            .unwrap_err();
        assert!(matches!(err, MapperError::StrictMappingRequirements { .. }));

        let result = mapper.map_to(&person(), TypeRef::named("PersonResult")).unwrap();
        assert_eq!(field(&result, "nameResult"), &Value::from("Ada"));
    }

    #[test]
    fn test_concurrent_mapping_shares_matches() {
        let mapper = mapper();
        let expected = mapper.map_to(&person(), TypeRef::named("PersonDto")).unwrap();
        mapper.clear_caches();
        assert!(mapper.core().match_store().is_empty());

        let results: Vec<Value> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|_| {
                    let mapper = mapper.clone();
                    scope.spawn(move || mapper.map_to(&person(), TypeRef::named("PersonDto")).unwrap())
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert!(results.iter().all(|r| r == &expected));
        // Person -> PersonDto and Address -> Address
        assert_eq!(mapper.core().match_store().len(), 2);
    }
}
