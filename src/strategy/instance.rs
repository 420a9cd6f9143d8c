//! Property-by-property mapping into a single target instance.

use crate::configuration::NullPolicy;
use crate::mapper::BeanMapper;
use crate::matching::TypePair;
use crate::models::{MapperError, Result, Value};
use crate::strategy::MapStrategy;
use tracing::trace;

pub struct MapToInstanceStrategy<'a> {
    mapper: &'a BeanMapper,
}

impl<'a> MapToInstanceStrategy<'a> {
    pub fn new(mapper: &'a BeanMapper) -> Self {
        Self { mapper }
    }
}

impl MapStrategy for MapToInstanceStrategy<'_> {
    fn map(&self, source: &Value) -> Result<Value> {
        let core = self.mapper.core();
        let config = self.mapper.configuration();
        let view = core.view();

        let target_class = config.determine_target_class().ok_or_else(|| {
            MapperError::configuration("neither a target class nor a target instance was set")
        })?;

        let converted_whole = self.mapper.is_converter_choosable()
            && core.find_converter(&source.type_of(), &target_class).is_some();
        if converted_whole || source.as_object().is_none() || !view.is_bean(&target_class) {
            return self.mapper.convert_bare(source.clone(), &target_class);
        }

        let mut target = match config.target() {
            Some(target) => target.clone(),
            None => view.new_instance(&target_class)?,
        };

        let pair = TypePair::new(
            source.type_of(),
            target.type_of(),
            self.mapper.strict_mapping_properties(),
        )
        .with_downsize(
            config.downsize_source().map(<[String]>::to_vec),
            config.downsize_target().map(<[String]>::to_vec),
        );
        let bean_match = core.match_store().get_or_create(pair, &core.match_context())?;

        for link in bean_match.links() {
            if !link.is_allowed(source, config.parent()) {
                trace!(property = %link.source_property, "Security check denied property");
                continue;
            }

            let value = view.get(source, &link.source_property)?;
            if value.is_null() {
                match self.mapper.null_policy() {
                    NullPolicy::Skip => {
                        trace!(property = %link.target_property, "Skipping null property");
                    }
                    NullPolicy::Propagate => {
                        view.set(&mut target, &link.target_property, Value::Null)?;
                    }
                }
                continue;
            }

            let existing = view.get(&target, &link.target_property)?;
            let converted = self.mapper.convert_property(link, value, existing, source)?;
            view.set(&mut target, &link.target_property, converted)?;
        }

        Ok(target)
    }
}
