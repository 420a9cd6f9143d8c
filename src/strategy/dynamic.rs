//! Downsizing through generated projection types.
//!
//! Downsizing the source maps source → projection → target. Downsizing the
//! target maps source → projection of the target class, then onto the target
//! instance when one was given.

use crate::mapper::BeanMapper;
use crate::models::{MapperError, Result, Value};
use crate::strategy::{MapCollectionStrategy, MapStrategy};
use tracing::debug;

pub struct MapToDynamicClassStrategy<'a> {
    mapper: &'a BeanMapper,
}

impl<'a> MapToDynamicClassStrategy<'a> {
    pub fn new(mapper: &'a BeanMapper) -> Self {
        Self { mapper }
    }

    fn downsize_source(&self, source: &Value, fields: &[String]) -> Result<Value> {
        let core = self.mapper.core();
        let config = self.mapper.configuration();
        let projection = core.class_store().get_or_create_generated_class(
            &core.view(),
            &source.type_of(),
            fields,
            &self.mapper.strict_mapping_properties(),
        );

        let narrowed = self
            .mapper
            .wrap()
            .target_class(projection)?
            .build()
            .map(source)?;

        let mut builder = self.mapper.wrap();
        if let Some(target_class) = config.target_class() {
            builder = builder.target_class(target_class.clone())?;
        }
        if let Some(target) = config.target() {
            builder = builder.target(target.clone())?;
        }
        builder.build().map(&narrowed)
    }

    fn downsize_target(&self, source: &Value, fields: &[String]) -> Result<Value> {
        let core = self.mapper.core();
        let config = self.mapper.configuration();
        let target_class = config.determine_target_class().ok_or_else(|| {
            MapperError::configuration("downsizing the target needs a target class or instance")
        })?;
        let projection = core.class_store().get_or_create_generated_class(
            &core.view(),
            &target_class,
            fields,
            &self.mapper.strict_mapping_properties(),
        );

        let narrowed = self
            .mapper
            .wrap()
            .target_class(projection)?
            .build()
            .map(source)?;

        match config.target() {
            Some(target) => self
                .mapper
                .wrap()
                .target(target.clone())?
                .build()
                .map(&narrowed),
            None => Ok(narrowed),
        }
    }
}

impl MapStrategy for MapToDynamicClassStrategy<'_> {
    fn map(&self, source: &Value) -> Result<Value> {
        let config = self.mapper.configuration();

        let collection_class = config
            .collection_class()
            .cloned()
            .or_else(|| source.as_collection().map(|c| c.type_ref().clone()));
        if let Some(collection_class) = collection_class {
            debug!(collection = %collection_class, "Downsizing every collection element");
            let mut per_element = config.clone();
            per_element.set_collection_class(collection_class);
            let mapper = self.mapper.with_configuration(per_element);
            return MapCollectionStrategy::new(&mapper).map(source);
        }

        if let Some(fields) = config.downsize_source() {
            self.downsize_source(source, fields)
        } else if let Some(fields) = config.downsize_target() {
            self.downsize_target(source, fields)
        } else {
            let mut plain = config.clone();
            plain.clear_downsize();
            self.mapper.with_configuration(plain).map(source)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapper::BeanMapperBuilder;
    use crate::matching::{LogicSecuredCheck, PropertyContext};
    use crate::models::{Collection, Object, TypeRef};
    use crate::object::{PropertySchema, SchemaRegistry, TypeSchema};
    use std::collections::BTreeSet;
    use std::sync::Arc;

    struct DenyAll;

    impl LogicSecuredCheck for DenyAll {
        fn is_allowed(&self, _property: &PropertyContext<'_>, _parent: Option<&Value>) -> bool {
            false
        }
    }

    fn builder() -> BeanMapperBuilder {
        let registry = SchemaRegistry::from_schemas([
            TypeSchema::bean("Address")
                .property(PropertySchema::new("street", "text"))
                .property(PropertySchema::new("city", "text")),
            TypeSchema::bean("Person")
                .property(PropertySchema::new("name", "text"))
                .property(PropertySchema::new("age", "int"))
                .property(PropertySchema::new("email", "text"))
                .property(PropertySchema::new("address", "Address"))
                .property(PropertySchema::new("salary", "float")),
            TypeSchema::bean("PersonDto")
                .property(PropertySchema::new("name", "text"))
                .property(PropertySchema::new("age", "int"))
                .property(PropertySchema::new("salary", "float").secured_by("hr")),
        ])
        .unwrap();
        BeanMapper::builder(Arc::new(registry))
            .add_security_check("hr", DenyAll)
            .unwrap()
    }

    fn mapper() -> BeanMapper {
        builder().build()
    }

    fn address(street: Value, city: Value) -> Value {
        Value::Object(
            Object::new(TypeRef::named("Address"))
                .with("street", street)
                .with("city", city),
        )
    }

    fn person() -> Value {
        Value::Object(
            Object::new(TypeRef::named("Person"))
                .with("name", "Ada")
                .with("age", 36)
                .with("email", "ada@example.org")
                .with("address", address(Value::from("Main"), Value::from("Utrecht")))
                .with("salary", 1000.0),
        )
    }

    fn person_dto() -> Value {
        Value::Object(
            Object::new(TypeRef::named("PersonDto"))
                .with("name", "Ada")
                .with("age", 36)
                .with("salary", 1000.0),
        )
    }

    fn field<'v>(value: &'v Value, name: &str) -> Option<&'v Value> {
        value.as_object().unwrap().get(name)
    }

    #[test]
    fn test_downsize_source_round_trip() {
        let mapped = mapper()
            .wrap()
            .target_class(TypeRef::named("Person"))
            .unwrap()
            .downsize_source(["name", "address.city"])
            .unwrap()
            .build()
            .map(&person())
            .unwrap();

        assert_eq!(mapped.type_of(), TypeRef::named("Person"));
        assert_eq!(field(&mapped, "name"), Some(&Value::from("Ada")));
        assert_eq!(field(&mapped, "age"), Some(&Value::Null));
        assert_eq!(field(&mapped, "email"), Some(&Value::Null));
        assert_eq!(
            field(&mapped, "address"),
            Some(&address(Value::Null, Value::from("Utrecht")))
        );
    }

    #[test]
    fn test_downsize_target_returns_projection() {
        let mapped = mapper()
            .wrap()
            .target_class(TypeRef::named("Person"))
            .unwrap()
            .downsize_target(["name", "age"])
            .unwrap()
            .build()
            .map(&person())
            .unwrap();

        let ty = mapped.type_of();
        let projection = ty.as_projection().unwrap();
        assert_eq!(projection.base(), &TypeRef::named("Person"));
        assert_eq!(
            projection.fields(),
            &BTreeSet::from(["age".to_string(), "name".to_string()])
        );

        let object = mapped.as_object().unwrap();
        assert_eq!(object.len(), 2);
        assert_eq!(object.get("name"), Some(&Value::from("Ada")));
        assert_eq!(object.get("age"), Some(&Value::Int(36)));
    }

    #[test]
    fn test_downsize_target_writes_into_instance() {
        let target = Value::Object(
            Object::new(TypeRef::named("Person"))
                .with("name", "Old")
                .with("age", 5)
                .with("email", "keep@example.org"),
        );

        let mapped = mapper()
            .wrap()
            .target(target)
            .unwrap()
            .downsize_target(["name"])
            .unwrap()
            .build()
            .map(&person())
            .unwrap();

        assert_eq!(mapped.type_of(), TypeRef::named("Person"));
        assert_eq!(field(&mapped, "name"), Some(&Value::from("Ada")));
        assert_eq!(field(&mapped, "age"), Some(&Value::Int(5)));
        assert_eq!(field(&mapped, "email"), Some(&Value::from("keep@example.org")));
    }

    #[test]
    fn test_projection_identity_is_stable() {
        let mapper = mapper();
        let downsize = || {
            mapper
                .wrap()
                .target_class(TypeRef::named("Person"))
                .unwrap()
                .downsize_target(["age", "name"])
                .unwrap()
                .build()
                .map(&person())
                .unwrap()
                .type_of()
        };

        let first = downsize();
        let second = downsize();
        assert!(Arc::ptr_eq(
            first.as_projection().unwrap(),
            second.as_projection().unwrap()
        ));
        assert_eq!(mapper.core().class_store().len(), 1);
    }

    #[test]
    fn test_downsize_every_collection_element() {
        let source = Value::Collection(Collection::list(TypeRef::array_list(), [person(), person()]));

        let mapped = mapper()
            .wrap()
            .target_class(TypeRef::named("Person"))
            .unwrap()
            .downsize_target(["name"])
            .unwrap()
            .build()
            .map(&source)
            .unwrap();

        let items = mapped.as_collection().unwrap();
        assert_eq!(items.type_ref(), &TypeRef::array_list());
        assert_eq!(items.len(), 2);
        for item in items.values() {
            assert!(item.type_of().as_projection().is_some());
            assert_eq!(item.as_object().unwrap().len(), 1);
            assert_eq!(field(item, "name"), Some(&Value::from("Ada")));
        }
    }

    #[test]
    fn test_downsize_target_honours_target_security() {
        let mapper = mapper();

        let full = mapper.map_to(&person(), TypeRef::named("PersonDto")).unwrap();
        assert_eq!(field(&full, "salary"), Some(&Value::Null));

        let downsized = mapper
            .wrap()
            .target_class(TypeRef::named("PersonDto"))
            .unwrap()
            .downsize_target(["name", "salary"])
            .unwrap()
            .build()
            .map(&person())
            .unwrap();
        assert!(downsized.type_of().as_projection().is_some());
        assert_eq!(field(&downsized, "name"), Some(&Value::from("Ada")));
        assert_eq!(field(&downsized, "salary"), Some(&Value::Null));
    }

    #[test]
    fn test_strict_pair_does_not_bind_projections() {
        let mapper = builder()
            .add_bean_pair_with_strict_source(TypeRef::named("PersonDto"), TypeRef::named("Person"))
            .unwrap()
            .build();

        let full = mapper.map_to(&person_dto(), TypeRef::named("Person")).unwrap();
        assert_eq!(field(&full, "name"), Some(&Value::from("Ada")));

        let narrowed_target = mapper
            .wrap()
            .target_class(TypeRef::named("Person"))
            .unwrap()
            .downsize_target(["name"])
            .unwrap()
            .build()
            .map(&person_dto())
            .unwrap();
        assert_eq!(field(&narrowed_target, "name"), Some(&Value::from("Ada")));

        let narrowed_source = mapper
            .wrap()
            .target_class(TypeRef::named("Person"))
            .unwrap()
            .downsize_source(["name"])
            .unwrap()
            .build()
            .map(&person_dto())
            .unwrap();
        assert_eq!(narrowed_source.type_of(), TypeRef::named("Person"));
        assert_eq!(field(&narrowed_source, "name"), Some(&Value::from("Ada")));
        assert_eq!(field(&narrowed_source, "age"), Some(&Value::Null));
    }
}
