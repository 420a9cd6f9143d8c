//! Element-wise mapping of collections through a collection handler.

use crate::mapper::BeanMapper;
use crate::models::{MapperError, Result, TypeRef, Value};
use crate::strategy::MapStrategy;

pub struct MapCollectionStrategy<'a> {
    mapper: &'a BeanMapper,
}

impl<'a> MapCollectionStrategy<'a> {
    pub fn new(mapper: &'a BeanMapper) -> Self {
        Self { mapper }
    }
}

impl MapStrategy for MapCollectionStrategy<'_> {
    fn map(&self, source: &Value) -> Result<Value> {
        let core = self.mapper.core();
        let config = self.mapper.configuration();
        let view = core.view();

        let collection_class = config
            .collection_class()
            .ok_or_else(|| MapperError::configuration("no collection class was set"))?;
        let items = source.as_collection().ok_or_else(|| {
            MapperError::conversion(&source.type_of(), collection_class, "source is not a collection")
        })?;

        let handler = core.collection_handler_for(collection_class)?;
        let preferred = config
            .preferred_collection_class()
            .unwrap_or(collection_class);
        let existing = config.target().cloned().and_then(Value::into_collection);

        let target = handler.obtain_target(
            &view,
            config.collection_usage(),
            preferred,
            existing,
            core.collection_flusher(),
            self.mapper.must_flush(),
        )?;

        let element_type = config.target_class().cloned().unwrap_or_else(TypeRef::any);
        let copied = handler.copy(self.mapper, &element_type, items, target)?;
        Ok(Value::Collection(copied))
    }
}
