//! Builder for engines and per-call configurations.
//!
//! A builder works in one of two roles. `BeanMapper::builder` configures the
//! core: converters, handlers, checks, conventions. `BeanMapper::wrap`
//! configures a single call: target, collection, downsizing. An option that
//! does not belong to the builder's role fails with a configuration error.

use crate::collections::{AfterClearFlusher, CollectionHandler};
use crate::configuration::{
    BeanPair, CollectionUsage, CoreConfiguration, NullPolicy, OverrideConfiguration,
    StrictMappingProperties,
};
use crate::convert::{BeanConverter, default_converters};
use crate::mapper::BeanMapper;
use crate::matching::LogicSecuredCheck;
use crate::models::{EngineSettings, MapperError, Result, TypeRef, Value};
use crate::object::ObjectModel;
use std::sync::Arc;

enum Role {
    Core(Box<CoreConfiguration>),
    Override(Arc<CoreConfiguration>),
}

/// Fluent builder returned by [`BeanMapper::builder`] and [`BeanMapper::wrap`].
pub struct BeanMapperBuilder {
    role: Role,
    config: OverrideConfiguration,
    add_default_converters: bool,
}

impl BeanMapperBuilder {
    pub(crate) fn new(model: Arc<dyn ObjectModel>) -> Self {
        Self {
            role: Role::Core(Box::new(CoreConfiguration::new(model))),
            config: OverrideConfiguration::default(),
            add_default_converters: true,
        }
    }

    pub(crate) fn wrap(core: Arc<CoreConfiguration>, config: OverrideConfiguration) -> Self {
        Self {
            role: Role::Override(core),
            config,
            add_default_converters: false,
        }
    }

    /// Core builder preconfigured from a settings file.
    pub fn from_settings(model: Arc<dyn ObjectModel>, settings: &EngineSettings) -> Result<Self> {
        let mapping = &settings.mapping;
        let mut builder = Self::new(model)
            .strict_mapping_properties(mapping.strict_mapping_properties())
            .null_policy(mapping.null_policy)
            .converter_choosable(mapping.converter_choosable)
            .flush_enabled(mapping.flush_enabled)?;

        if !mapping.default_converters {
            builder = builder.without_default_converters()?;
        }
        for prefix in &mapping.package_prefixes {
            builder = builder.add_package_prefix(prefix.clone())?;
        }
        for pair in &mapping.strict_source_pairs {
            builder = builder
                .add_bean_pair_with_strict_source(TypeRef::named(&pair.source), TypeRef::named(&pair.target))?;
        }
        for pair in &mapping.strict_target_pairs {
            builder = builder
                .add_bean_pair_with_strict_target(TypeRef::named(&pair.source), TypeRef::named(&pair.target))?;
        }
        Ok(builder)
    }

    /// Whether this builder configures the core rather than a single call.
    pub fn is_core(&self) -> bool {
        matches!(self.role, Role::Core(_))
    }

    fn core_mut(&mut self, option: &str) -> Result<&mut CoreConfiguration> {
        match &mut self.role {
            Role::Core(core) => Ok(core.as_mut()),
            Role::Override(_) => Err(MapperError::configuration(format!(
                "Illegal to {option} on an override configuration, works only for the core configuration"
            ))),
        }
    }

    fn override_mut(&mut self, option: &str) -> Result<&mut OverrideConfiguration> {
        match self.role {
            Role::Override(_) => Ok(&mut self.config),
            Role::Core(_) => Err(MapperError::configuration(format!(
                "Illegal to set {option} on the core configuration, works only for override configurations"
            ))),
        }
    }

    /// Strict properties in effect for this builder, for modification.
    fn strict_mut(&mut self) -> &mut StrictMappingProperties {
        match &mut self.role {
            Role::Core(core) => &mut core.strict,
            Role::Override(core) => self
                .config
                .strict_mut_or(|| core.strict_mapping_properties().clone()),
        }
    }

    // ═══════════════════════════════════════════════════════════════════
    // Core options
    // ═══════════════════════════════════════════════════════════════════

    /// Register a converter; user converters take priority over the defaults.
    pub fn add_converter(mut self, converter: impl BeanConverter + 'static) -> Result<Self> {
        self.core_mut("add a converter")?
            .converters
            .push(Arc::new(converter));
        Ok(self)
    }

    pub fn add_collection_handler(mut self, handler: impl CollectionHandler + 'static) -> Result<Self> {
        self.core_mut("add a collection handler")?
            .collection_handlers
            .add(Arc::new(handler));
        Ok(self)
    }

    /// Restrict bean treatment to types whose name starts with `prefix`.
    pub fn add_package_prefix(mut self, prefix: impl Into<String>) -> Result<Self> {
        self.core_mut("add a package prefix")?
            .package_prefixes
            .push(prefix.into());
        Ok(self)
    }

    /// Register a check that properties refer to by `name`.
    pub fn add_security_check(
        mut self,
        name: impl Into<String>,
        check: impl LogicSecuredCheck + 'static,
    ) -> Result<Self> {
        self.core_mut("add a security check")?
            .security_checks
            .insert(name.into(), Arc::new(check));
        Ok(self)
    }

    pub fn add_after_clear_flusher(mut self, flusher: impl AfterClearFlusher + 'static) -> Result<Self> {
        self.core_mut("add an after-clear flusher")?
            .collection_flusher
            .add_after_clear_flusher(Arc::new(flusher));
        Ok(self)
    }

    pub fn without_default_converters(mut self) -> Result<Self> {
        self.core_mut("disable the default converters")?;
        self.add_default_converters = false;
        Ok(self)
    }

    /// Require every readable property of `source` to be matched when mapping to `target`.
    pub fn add_bean_pair_with_strict_source(mut self, source: TypeRef, target: TypeRef) -> Result<Self> {
        self.core_mut("add a strict bean pair")?.bean_pairs.push(BeanPair {
            source,
            target,
            strict_source: true,
            strict_target: false,
        });
        Ok(self)
    }

    /// Require every writable property of `target` to be matched when mapping from `source`.
    pub fn add_bean_pair_with_strict_target(mut self, source: TypeRef, target: TypeRef) -> Result<Self> {
        self.core_mut("add a strict bean pair")?.bean_pairs.push(BeanPair {
            source,
            target,
            strict_source: false,
            strict_target: true,
        });
        Ok(self)
    }

    /// Allow after-clear flushers to run for calls that ask for it.
    pub fn flush_enabled(mut self, enabled: bool) -> Result<Self> {
        self.core_mut("set flush enabled")?.flush_enabled = enabled;
        Ok(self)
    }

    // ═══════════════════════════════════════════════════════════════════
    // Options valid in both roles
    // ═══════════════════════════════════════════════════════════════════

    pub fn strict_source_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.strict_mut().set_strict_source_suffix(suffix);
        self
    }

    pub fn strict_target_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.strict_mut().set_strict_target_suffix(suffix);
        self
    }

    /// Replace the whole strict naming convention.
    pub fn strict_mapping_properties(mut self, strict: StrictMappingProperties) -> Self {
        *self.strict_mut() = strict;
        self
    }

    pub fn apply_strict_mapping_convention(mut self, apply: bool) -> Self {
        self.strict_mut().set_apply_strict_mapping_convention(apply);
        self
    }

    pub fn null_policy(mut self, policy: NullPolicy) -> Self {
        match &mut self.role {
            Role::Core(core) => core.null_policy = policy,
            Role::Override(_) => self.config.set_null_policy(policy),
        }
        self
    }

    /// Let a top-level call be served by a registered converter for
    /// (source type, target class) before falling back to property mapping.
    pub fn converter_choosable(mut self, choosable: bool) -> Self {
        match &mut self.role {
            Role::Core(core) => core.converter_choosable = choosable,
            Role::Override(_) => self.config.set_converter_choosable(choosable),
        }
        self
    }

    // ═══════════════════════════════════════════════════════════════════
    // Per-call options
    // ═══════════════════════════════════════════════════════════════════

    pub fn target_class(mut self, target_class: TypeRef) -> Result<Self> {
        self.override_mut("a target class")?.set_target_class(target_class);
        Ok(self)
    }

    /// Map onto this instance instead of a new one.
    pub fn target(mut self, target: Value) -> Result<Self> {
        self.override_mut("a target instance")?.set_target(target);
        Ok(self)
    }

    /// Context object handed to security checks.
    pub fn parent(mut self, parent: Value) -> Result<Self> {
        self.override_mut("a parent")?.set_parent(parent);
        Ok(self)
    }

    pub fn collection_class(mut self, collection_class: TypeRef) -> Result<Self> {
        self.override_mut("a collection class")?
            .set_collection_class(collection_class);
        Ok(self)
    }

    pub fn preferred_collection_class(mut self, preferred: TypeRef) -> Result<Self> {
        self.override_mut("a preferred collection class")?
            .set_preferred_collection_class(preferred);
        Ok(self)
    }

    /// Only copy these source properties. Clears `downsize_target`.
    pub fn downsize_source<I, S>(mut self, fields: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.override_mut("downsize source fields")?
            .set_downsize_source(fields.into_iter().map(Into::into).collect());
        Ok(self)
    }

    /// Only fill these target properties. Clears `downsize_source`.
    pub fn downsize_target<I, S>(mut self, fields: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.override_mut("downsize target fields")?
            .set_downsize_target(fields.into_iter().map(Into::into).collect());
        Ok(self)
    }

    pub fn collection_usage(mut self, usage: CollectionUsage) -> Result<Self> {
        self.override_mut("collection usage")?.set_collection_usage(usage);
        Ok(self)
    }

    /// Report elements dropped by a CLEAR to the flushers (needs `flush_enabled`).
    pub fn flush_after_clear(mut self, flush: bool) -> Result<Self> {
        self.override_mut("flush after clear")?.set_flush_after_clear(flush);
        Ok(self)
    }

    /// Finish the builder.
    ///
    /// For a core builder the default converters are registered after the
    /// user's, unless disabled.
    pub fn build(self) -> BeanMapper {
        match self.role {
            Role::Core(mut core) => {
                if self.add_default_converters {
                    core.converters.extend(default_converters());
                }
                BeanMapper::from_parts(Arc::new(*core), self.config)
            }
            Role::Override(core) => BeanMapper::from_parts(core, self.config),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::SchemaRegistry;

    fn model() -> Arc<dyn ObjectModel> {
        Arc::new(SchemaRegistry::new())
    }

    #[test]
    fn test_per_call_option_on_core_fails() {
        let err = BeanMapper::builder(model())
            .target(Value::Null)
            .err()
            .unwrap();
        assert!(err.is_configuration());
        assert!(err.to_string().contains("Illegal to set a target instance on the core configuration"));

        assert!(BeanMapper::builder(model()).downsize_source(["name"]).is_err());
        assert!(BeanMapper::builder(model()).collection_usage(CollectionUsage::Reuse).is_err());
        assert!(BeanMapper::builder(model()).flush_after_clear(true).is_err());
    }

    #[test]
    fn test_core_option_on_override_fails() {
        let mapper = BeanMapper::builder(model()).build();

        let err = mapper.wrap().add_package_prefix("com.example").err().unwrap();
        assert!(matches!(err, MapperError::Configuration(_)));
        assert!(mapper.wrap().flush_enabled(true).is_err());
        assert!(mapper.wrap().without_default_converters().is_err());
        assert!(mapper.wrap().add_after_clear_flusher(|_: &Value| {}).is_err());
    }

    #[test]
    fn test_default_converters_follow_user_converters() {
        let mapper = BeanMapper::builder(model()).build();
        assert_eq!(mapper.core().converters().len(), default_converters().len());

        let bare = BeanMapper::builder(model())
            .without_default_converters()
            .unwrap()
            .build();
        assert!(bare.core().converters().is_empty());
    }

    #[test]
    fn test_override_strict_does_not_touch_core() {
        let mapper = BeanMapper::builder(model())
            .strict_source_suffix("Input")
            .build();
        let wrapped = mapper
            .wrap()
            .apply_strict_mapping_convention(false)
            .build();

        let effective = wrapped.strict_mapping_properties();
        assert_eq!(effective.strict_source_suffix(), "Input");
        assert!(!effective.is_apply_strict_mapping_convention());
        assert!(mapper.core().strict_mapping_properties().is_apply_strict_mapping_convention());
    }

    #[test]
    fn test_null_policy_override() {
        let mapper = BeanMapper::builder(model()).build();
        assert_eq!(mapper.null_policy(), NullPolicy::Propagate);

        let skipping = mapper.wrap().null_policy(NullPolicy::Skip).build();
        assert_eq!(skipping.null_policy(), NullPolicy::Skip);
        assert_eq!(skipping.wrap().build().null_policy(), NullPolicy::Skip);
    }

    #[test]
    fn test_converter_choosable_override() {
        let mapper = BeanMapper::builder(model()).build();
        assert!(!mapper.is_converter_choosable());

        let choosing = mapper.wrap().converter_choosable(true).build();
        assert!(choosing.is_converter_choosable());
        // nested calls fall back to the core setting
        assert!(!choosing.wrap().build().is_converter_choosable());

        let core_choosing = BeanMapper::builder(model()).converter_choosable(true).build();
        assert!(core_choosing.is_converter_choosable());
        assert!(!core_choosing.wrap().converter_choosable(false).build().is_converter_choosable());
    }

    #[test]
    fn test_from_settings() {
        let mut settings = EngineSettings::default();
        settings.mapping.strict_target_suffix = "Dto".to_string();
        settings.mapping.flush_enabled = true;
        settings.mapping.default_converters = false;
        settings.mapping.package_prefixes = vec!["shop.".to_string()];
        settings.mapping.apply_strict_mapping_convention = false;
        settings.mapping.converter_choosable = true;

        let mapper = BeanMapperBuilder::from_settings(model(), &settings)
            .unwrap()
            .build();
        let core = mapper.core();
        assert_eq!(core.strict_mapping_properties().strict_target_suffix(), "Dto");
        assert_eq!(core.strict_mapping_properties().strict_source_suffix(), "Form");
        assert!(!core.strict_mapping_properties().is_apply_strict_mapping_convention());
        assert!(core.is_converter_choosable());
        assert!(core.is_flush_enabled());
        assert!(core.converters().is_empty());
        assert_eq!(core.package_prefixes(), ["shop.".to_string()]);
    }
}
