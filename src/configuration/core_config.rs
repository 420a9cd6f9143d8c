//! Engine-wide configuration and the caches it owns.

use crate::collections::{CollectionFlusher, CollectionHandler, CollectionHandlerStore};
use crate::configuration::{NullPolicy, StrictMappingProperties};
use crate::convert::BeanConverter;
use crate::dynclass::ClassStore;
use crate::matching::{BeanMatchStore, LogicSecuredCheck, MatchContext};
use crate::models::{Result, TypeRef};
use crate::object::{ModelView, ObjectModel};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// A type pair registered with strict matching requirements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BeanPair {
    pub source: TypeRef,
    pub target: TypeRef,
    /// Every readable source property must be matched
    pub strict_source: bool,
    /// Every writable target property must be matched
    pub strict_target: bool,
}

/// Shared, long-lived configuration of one engine.
///
/// K_i: Created once by the builder and frozen behind an `Arc`; only the
/// caches mutate afterwards, through their own interior synchronization.
pub struct CoreConfiguration {
    pub(crate) model: Arc<dyn ObjectModel>,
    pub(crate) converters: Vec<Arc<dyn BeanConverter>>,
    pub(crate) collection_handlers: CollectionHandlerStore,
    pub(crate) match_store: BeanMatchStore,
    pub(crate) class_store: ClassStore,
    pub(crate) package_prefixes: Vec<String>,
    pub(crate) security_checks: HashMap<String, Arc<dyn LogicSecuredCheck>>,
    pub(crate) strict: StrictMappingProperties,
    pub(crate) collection_flusher: CollectionFlusher,
    pub(crate) flush_enabled: bool,
    pub(crate) null_policy: NullPolicy,
    pub(crate) converter_choosable: bool,
    pub(crate) bean_pairs: Vec<BeanPair>,
}

impl CoreConfiguration {
    pub fn new(model: Arc<dyn ObjectModel>) -> Self {
        Self {
            model,
            converters: Vec::new(),
            collection_handlers: CollectionHandlerStore::new(),
            match_store: BeanMatchStore::new(),
            class_store: ClassStore::new(),
            package_prefixes: Vec::new(),
            security_checks: HashMap::new(),
            strict: StrictMappingProperties::default(),
            collection_flusher: CollectionFlusher::new(),
            flush_enabled: false,
            null_policy: NullPolicy::default(),
            converter_choosable: false,
            bean_pairs: Vec::new(),
        }
    }

    pub fn model(&self) -> &dyn ObjectModel {
        self.model.as_ref()
    }

    /// Projection-aware view of the object model, filtered by package prefixes.
    pub fn view(&self) -> ModelView<'_> {
        ModelView::new(self.model.as_ref(), &self.package_prefixes)
    }

    pub fn converters(&self) -> &[Arc<dyn BeanConverter>] {
        &self.converters
    }

    /// First registered converter supporting `source` → `target`.
    pub fn find_converter(&self, source: &TypeRef, target: &TypeRef) -> Option<&Arc<dyn BeanConverter>> {
        self.converters.iter().find(|c| c.supports(source, target))
    }

    pub fn collection_handlers(&self) -> &CollectionHandlerStore {
        &self.collection_handlers
    }

    pub fn collection_handler_for(&self, ty: &TypeRef) -> Result<Arc<dyn CollectionHandler>> {
        self.collection_handlers.resolve(&self.view(), ty)
    }

    pub fn match_store(&self) -> &BeanMatchStore {
        &self.match_store
    }

    pub fn class_store(&self) -> &ClassStore {
        &self.class_store
    }

    pub fn package_prefixes(&self) -> &[String] {
        &self.package_prefixes
    }

    pub fn strict_mapping_properties(&self) -> &StrictMappingProperties {
        &self.strict
    }

    pub fn collection_flusher(&self) -> &CollectionFlusher {
        &self.collection_flusher
    }

    pub fn is_flush_enabled(&self) -> bool {
        self.flush_enabled
    }

    pub fn null_policy(&self) -> NullPolicy {
        self.null_policy
    }

    /// Whether a top-level call may be served by a converter instead of
    /// property mapping. Property and element conversions always may.
    pub fn is_converter_choosable(&self) -> bool {
        self.converter_choosable
    }

    pub fn bean_pairs(&self) -> &[BeanPair] {
        &self.bean_pairs
    }

    pub fn match_context(&self) -> MatchContext<'_> {
        MatchContext {
            view: self.view(),
            converters: &self.converters,
            security_checks: &self.security_checks,
            bean_pairs: &self.bean_pairs,
        }
    }

    /// Drop every cached match, projection and handler resolution.
    pub fn clear_caches(&self) {
        self.match_store.clear();
        self.class_store.clear();
        self.collection_handlers.clear();
    }
}

impl fmt::Debug for CoreConfiguration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut checks: Vec<&str> = self.security_checks.keys().map(String::as_str).collect();
        checks.sort_unstable();

        f.debug_struct("CoreConfiguration")
            .field("converters", &self.converters.len())
            .field("collection_handlers", &self.collection_handlers)
            .field("matches", &self.match_store.len())
            .field("projections", &self.class_store.len())
            .field("package_prefixes", &self.package_prefixes)
            .field("security_checks", &checks)
            .field("strict", &self.strict)
            .field("flush_enabled", &self.flush_enabled)
            .field("converter_choosable", &self.converter_choosable)
            .field("null_policy", &self.null_policy)
            .field("bean_pairs", &self.bean_pairs)
            .finish()
    }
}
