//! Mapping strategies and their selection.
//!
//! Epistemic foundation:
//! - K_i: Exactly one strategy serves each call, decided by its configuration
//! - K_i: Downsizing outranks collections, collections outrank direct mapping
//! - I^B: Strategies re-enter the dispatcher through `BeanMapper::wrap`

mod collection;
mod dynamic;
mod instance;

pub use collection::MapCollectionStrategy;
pub use dynamic::MapToDynamicClassStrategy;
pub use instance::MapToInstanceStrategy;

use crate::configuration::OverrideConfiguration;
use crate::mapper::BeanMapper;
use crate::models::{Result, Value};

/// One way of turning a non-null source into a target.
pub trait MapStrategy {
    fn map(&self, source: &Value) -> Result<Value>;
}

/// Which strategy a configuration selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapStrategyType {
    /// A downsize list is set
    MapToDynamicClass,
    /// A collection class is set
    MapCollection,
    /// Everything else
    MapToInstance,
}

impl MapStrategyType {
    pub fn determine(config: &OverrideConfiguration) -> Self {
        if config.downsize_source().is_some() || config.downsize_target().is_some() {
            Self::MapToDynamicClass
        } else if config.collection_class().is_some() {
            Self::MapCollection
        } else {
            Self::MapToInstance
        }
    }

    pub fn strategy<'a>(self, mapper: &'a BeanMapper) -> Box<dyn MapStrategy + 'a> {
        match self {
            Self::MapToDynamicClass => Box::new(MapToDynamicClassStrategy::new(mapper)),
            Self::MapCollection => Box::new(MapCollectionStrategy::new(mapper)),
            Self::MapToInstance => Box::new(MapToInstanceStrategy::new(mapper)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TypeRef;
    use crate::object::SchemaRegistry;
    use std::sync::Arc;

    #[test]
    fn test_determine_priority() {
        let mapper = BeanMapper::builder(Arc::new(SchemaRegistry::new())).build();

        let direct = mapper.wrap().target_class(TypeRef::text()).unwrap().build();
        assert_eq!(
            MapStrategyType::determine(direct.configuration()),
            MapStrategyType::MapToInstance
        );

        let collection = mapper.wrap().collection_class(TypeRef::list()).unwrap().build();
        assert_eq!(
            MapStrategyType::determine(collection.configuration()),
            MapStrategyType::MapCollection
        );

        let downsized = mapper
            .wrap()
            .collection_class(TypeRef::list())
            .unwrap()
            .downsize_target(["name"])
            .unwrap()
            .build();
        assert_eq!(
            MapStrategyType::determine(downsized.configuration()),
            MapStrategyType::MapToDynamicClass
        );
    }
}
