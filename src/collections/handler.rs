//! Collection handlers: obtain a target collection and copy elements into it.
//!
//! Epistemic foundation:
//! - K_i: A handler serves its collection type and every type extending it
//! - K_i: Elements are mapped one by one through the dispatcher
//! - B_i: The preferred collection class can be instantiated → fall back to the default

use crate::collections::CollectionFlusher;
use crate::configuration::CollectionUsage;
use crate::mapper::BeanMapper;
use crate::models::{Collection, MapperError, Result, TypeRef, Value, builtin};
use crate::object::ModelView;
use tracing::trace;

/// Produces and fills collections of one family (lists, sets, maps, ...).
pub trait CollectionHandler: Send + Sync {
    /// The collection type this handler is registered for.
    fn collection_type(&self) -> TypeRef;

    /// Concrete type instantiated when the requested one cannot be.
    fn default_type(&self) -> TypeRef;

    /// Create an empty collection, preferring `preferred` when it belongs to this family.
    fn create(&self, view: &ModelView<'_>, preferred: &TypeRef) -> Result<Collection> {
        let family = self.collection_type();
        if view.distance(preferred, &family).is_some() {
            if let Ok(Value::Collection(collection)) = view.new_instance(preferred) {
                return Ok(collection);
            }
        }

        let fallback = self.default_type();
        match view.new_instance(&fallback)? {
            Value::Collection(collection) => Ok(collection),
            other => Err(MapperError::instantiation(
                &fallback,
                format!("expected a collection, got {}", other.type_of()),
            )),
        }
    }

    /// Decide which collection receives the mapped elements.
    ///
    /// In CLEAR mode the existing elements are dropped first; when `must_flush`
    /// is set every dropped element is reported to the flusher.
    fn obtain_target(
        &self,
        view: &ModelView<'_>,
        usage: CollectionUsage,
        preferred: &TypeRef,
        existing: Option<Collection>,
        flusher: &CollectionFlusher,
        must_flush: bool,
    ) -> Result<Collection> {
        let family = self.collection_type();
        let existing = existing.filter(|c| view.distance(c.type_ref(), &family).is_some());

        match (usage, existing) {
            (CollectionUsage::Construct, _) | (_, None) => self.create(view, preferred),
            (CollectionUsage::Reuse, Some(existing)) => Ok(existing),
            (CollectionUsage::Clear, Some(mut existing)) => {
                let removed = existing.drain();
                if must_flush {
                    flusher.flush(&removed);
                }
                Ok(existing)
            }
        }
    }

    /// Map every source element to `element_type` and add it to `target`.
    fn copy(
        &self,
        mapper: &BeanMapper,
        element_type: &TypeRef,
        source: &Collection,
        target: Collection,
    ) -> Result<Collection>;
}

/// Handler for `List` and its implementations: appends in source order.
#[derive(Debug, Default)]
pub struct ListHandler;

impl CollectionHandler for ListHandler {
    fn collection_type(&self) -> TypeRef {
        TypeRef::list()
    }

    fn default_type(&self) -> TypeRef {
        TypeRef::array_list()
    }

    fn copy(
        &self,
        mapper: &BeanMapper,
        element_type: &TypeRef,
        source: &Collection,
        mut target: Collection,
    ) -> Result<Collection> {
        for element in source.values() {
            target.insert(mapper.map_element(element, element_type, None)?);
        }
        Ok(target)
    }
}

/// Handler for `Set` and its implementations: adds unless an equal element exists.
#[derive(Debug, Default)]
pub struct SetHandler;

impl CollectionHandler for SetHandler {
    fn collection_type(&self) -> TypeRef {
        TypeRef::set()
    }

    fn default_type(&self) -> TypeRef {
        TypeRef::named(builtin::HASH_SET)
    }

    fn copy(
        &self,
        mapper: &BeanMapper,
        element_type: &TypeRef,
        source: &Collection,
        mut target: Collection,
    ) -> Result<Collection> {
        for element in source.values() {
            let mapped = mapper.map_element(element, element_type, None)?;
            if !target.insert(mapped) {
                trace!(collection = %target.type_ref(), "Skipping duplicate set element");
            }
        }
        Ok(target)
    }
}

/// Handler for `Map` and its implementations: upserts by key, merging into
/// existing object values.
#[derive(Debug, Default)]
pub struct MapHandler;

impl CollectionHandler for MapHandler {
    fn collection_type(&self) -> TypeRef {
        TypeRef::map()
    }

    fn default_type(&self) -> TypeRef {
        TypeRef::named(builtin::HASH_MAP)
    }

    fn copy(
        &self,
        mapper: &BeanMapper,
        element_type: &TypeRef,
        source: &Collection,
        mut target: Collection,
    ) -> Result<Collection> {
        for (key, element) in source.iter() {
            let existing = target.remove_key(&key);
            let mapped = mapper.map_element(element, element_type, existing)?;
            target.upsert(key, mapped);
        }
        Ok(target)
    }
}
