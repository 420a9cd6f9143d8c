//! Registry resolving a collection type to its nearest registered handler.

use crate::collections::{CollectionHandler, ListHandler, MapHandler, SetHandler};
use crate::models::{MapperError, Result, TypeRef};
use crate::object::ModelView;
use dashmap::DashMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Registered collection handlers plus a per-type resolution cache.
pub struct CollectionHandlerStore {
    handlers: Vec<Arc<dyn CollectionHandler>>,
    resolved: DashMap<TypeRef, Arc<dyn CollectionHandler>>,
}

impl Default for CollectionHandlerStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CollectionHandlerStore {
    /// Create a store with the list, set and map handlers.
    pub fn new() -> Self {
        Self {
            handlers: vec![
                Arc::new(ListHandler),
                Arc::new(SetHandler),
                Arc::new(MapHandler),
            ],
            resolved: DashMap::new(),
        }
    }

    pub fn add(&mut self, handler: Arc<dyn CollectionHandler>) {
        self.handlers.push(handler);
        self.resolved.clear();
    }

    pub fn handlers(&self) -> &[Arc<dyn CollectionHandler>] {
        &self.handlers
    }

    /// Find the handler registered for the nearest ancestor of `ty`.
    ///
    /// On equal distance the most recently registered handler wins.
    pub fn resolve(&self, view: &ModelView<'_>, ty: &TypeRef) -> Result<Arc<dyn CollectionHandler>> {
        if let Some(handler) = self.resolved.get(ty) {
            return Ok(Arc::clone(handler.value()));
        }

        let nearest = self
            .handlers
            .iter()
            .rev()
            .filter_map(|h| view.distance(ty, &h.collection_type()).map(|d| (d, h)))
            .min_by_key(|(distance, _)| *distance)
            .map(|(_, h)| Arc::clone(h))
            .ok_or_else(|| MapperError::UnsupportedCollection(ty.clone()))?;

        debug!(
            collection = %ty,
            handler = %nearest.collection_type(),
            "Resolved collection handler"
        );
        Ok(Arc::clone(
            self.resolved.entry(ty.clone()).or_insert(nearest).value(),
        ))
    }

    pub fn clear(&self) {
        self.resolved.clear();
    }
}

impl fmt::Debug for CollectionHandlerStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let types: Vec<String> = self
            .handlers
            .iter()
            .map(|h| h.collection_type().to_string())
            .collect();
        f.debug_struct("CollectionHandlerStore")
            .field("handlers", &types)
            .field("resolved", &self.resolved.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapper::BeanMapper;
    use crate::models::{Collection, builtin};
    use crate::object::{SchemaRegistry, TypeKind, TypeSchema};

    struct AuditListHandler;

    impl CollectionHandler for AuditListHandler {
        fn collection_type(&self) -> TypeRef {
            TypeRef::named("AuditList")
        }

        fn default_type(&self) -> TypeRef {
            TypeRef::named("AuditList")
        }

        fn copy(
            &self,
            _mapper: &BeanMapper,
            _element_type: &TypeRef,
            _source: &Collection,
            target: Collection,
        ) -> Result<Collection> {
            Ok(target)
        }
    }

    fn registry() -> SchemaRegistry {
        SchemaRegistry::from_schemas([
            TypeSchema::collection("AuditList", TypeKind::List, builtin::ARRAY_LIST),
            TypeSchema::collection("SignedAuditList", TypeKind::List, "AuditList"),
            TypeSchema::bean("Person"),
        ])
        .unwrap()
    }

    #[test]
    fn test_nearest_assignable_handler() {
        let registry = registry();
        let view = ModelView::new(&registry, &[]);
        let mut store = CollectionHandlerStore::new();

        let list = store.resolve(&view, &TypeRef::named("SignedAuditList")).unwrap();
        assert_eq!(list.collection_type(), TypeRef::list());

        store.add(Arc::new(AuditListHandler));
        let audit = store.resolve(&view, &TypeRef::named("SignedAuditList")).unwrap();
        assert_eq!(audit.collection_type(), TypeRef::named("AuditList"));

        let plain = store.resolve(&view, &TypeRef::array_list()).unwrap();
        assert_eq!(plain.collection_type(), TypeRef::list());

        let set = store.resolve(&view, &TypeRef::named(builtin::HASH_SET)).unwrap();
        assert_eq!(set.collection_type(), TypeRef::set());
    }

    #[test]
    fn test_unregistered_type_is_unsupported() {
        let registry = registry();
        let view = ModelView::new(&registry, &[]);
        let store = CollectionHandlerStore::new();

        let err = store.resolve(&view, &TypeRef::named("Person")).err().unwrap();
        assert!(matches!(err, MapperError::UnsupportedCollection(_)));
    }
}
