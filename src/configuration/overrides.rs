//! Per-call configuration.

use crate::configuration::{CollectionUsage, NullPolicy, StrictMappingProperties};
use crate::models::{TypeRef, Value};

/// Options of a single mapping call.
///
/// K_i: `downsize_source` and `downsize_target` are never both set.
#[derive(Debug, Clone, Default)]
pub struct OverrideConfiguration {
    target_class: Option<TypeRef>,
    target: Option<Value>,
    parent: Option<Value>,
    collection_class: Option<TypeRef>,
    preferred_collection_class: Option<TypeRef>,
    downsize_source: Option<Vec<String>>,
    downsize_target: Option<Vec<String>>,
    collection_usage: CollectionUsage,
    flush_after_clear: bool,
    strict: Option<StrictMappingProperties>,
    null_policy: Option<NullPolicy>,
    converter_choosable: Option<bool>,
}

impl OverrideConfiguration {
    /// Options a nested call starts from: parent context and behaviour flags
    /// carry over, the target description does not.
    pub fn inherit(&self) -> Self {
        Self {
            parent: self.parent.clone(),
            collection_usage: self.collection_usage,
            flush_after_clear: self.flush_after_clear,
            strict: self.strict.clone(),
            null_policy: self.null_policy,
            ..Self::default()
        }
    }

    /// Class of the configured target instance, else the configured target class.
    pub fn determine_target_class(&self) -> Option<TypeRef> {
        self.target
            .as_ref()
            .filter(|t| !t.is_null())
            .map(Value::type_of)
            .or_else(|| self.target_class.clone())
    }

    pub fn target_class(&self) -> Option<&TypeRef> {
        self.target_class.as_ref()
    }

    pub fn target(&self) -> Option<&Value> {
        self.target.as_ref()
    }

    pub fn parent(&self) -> Option<&Value> {
        self.parent.as_ref()
    }

    pub fn collection_class(&self) -> Option<&TypeRef> {
        self.collection_class.as_ref()
    }

    pub fn preferred_collection_class(&self) -> Option<&TypeRef> {
        self.preferred_collection_class.as_ref()
    }

    pub fn downsize_source(&self) -> Option<&[String]> {
        self.downsize_source.as_deref()
    }

    pub fn downsize_target(&self) -> Option<&[String]> {
        self.downsize_target.as_deref()
    }

    pub fn collection_usage(&self) -> CollectionUsage {
        self.collection_usage
    }

    pub fn is_flush_after_clear(&self) -> bool {
        self.flush_after_clear
    }

    pub fn strict(&self) -> Option<&StrictMappingProperties> {
        self.strict.as_ref()
    }

    pub fn null_policy(&self) -> Option<NullPolicy> {
        self.null_policy
    }

    pub fn converter_choosable(&self) -> Option<bool> {
        self.converter_choosable
    }

    pub(crate) fn set_target_class(&mut self, target_class: TypeRef) {
        self.target_class = Some(target_class);
    }

    pub(crate) fn set_target(&mut self, target: Value) {
        self.target = Some(target).filter(|t| !t.is_null());
    }

    pub(crate) fn set_parent(&mut self, parent: Value) {
        self.parent = Some(parent).filter(|p| !p.is_null());
    }

    pub(crate) fn set_collection_class(&mut self, collection_class: TypeRef) {
        self.collection_class = Some(collection_class);
    }

    pub(crate) fn set_preferred_collection_class(&mut self, preferred: TypeRef) {
        self.preferred_collection_class = Some(preferred);
    }

    /// Setting the source list clears the target list.
    pub(crate) fn set_downsize_source(&mut self, fields: Vec<String>) {
        self.downsize_source = Some(fields).filter(|f| !f.is_empty());
        self.downsize_target = None;
    }

    /// Setting the target list clears the source list.
    pub(crate) fn set_downsize_target(&mut self, fields: Vec<String>) {
        self.downsize_target = Some(fields).filter(|f| !f.is_empty());
        self.downsize_source = None;
    }

    pub(crate) fn clear_downsize(&mut self) {
        self.downsize_source = None;
        self.downsize_target = None;
    }

    pub(crate) fn set_collection_usage(&mut self, usage: CollectionUsage) {
        self.collection_usage = usage;
    }

    pub(crate) fn set_flush_after_clear(&mut self, flush_after_clear: bool) {
        self.flush_after_clear = flush_after_clear;
    }

    /// Strict properties of this call, starting from `default` when unset.
    pub(crate) fn strict_mut_or(
        &mut self,
        default: impl FnOnce() -> StrictMappingProperties,
    ) -> &mut StrictMappingProperties {
        self.strict.get_or_insert_with(default)
    }

    pub(crate) fn set_null_policy(&mut self, policy: NullPolicy) {
        self.null_policy = Some(policy);
    }

    pub(crate) fn set_converter_choosable(&mut self, choosable: bool) {
        self.converter_choosable = Some(choosable);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Object;

    #[test]
    fn test_downsize_lists_are_exclusive() {
        let mut config = OverrideConfiguration::default();
        config.set_downsize_source(vec!["name".to_string()]);
        config.set_downsize_target(vec!["age".to_string()]);

        assert!(config.downsize_source().is_none());
        assert_eq!(config.downsize_target(), Some(&["age".to_string()][..]));

        config.set_downsize_source(Vec::new());
        assert!(config.downsize_source().is_none());
        assert!(config.downsize_target().is_none());
    }

    #[test]
    fn test_target_instance_decides_target_class() {
        let mut config = OverrideConfiguration::default();
        config.set_target_class(TypeRef::named("Person"));
        assert_eq!(config.determine_target_class(), Some(TypeRef::named("Person")));

        config.set_target(Value::Object(Object::new(TypeRef::named("Employee"))));
        assert_eq!(config.determine_target_class(), Some(TypeRef::named("Employee")));
    }

    #[test]
    fn test_inherit_keeps_context_only() {
        let mut config = OverrideConfiguration::default();
        config.set_target_class(TypeRef::named("Person"));
        config.set_collection_class(TypeRef::list());
        config.set_parent(Value::from("owner"));
        config.set_collection_usage(CollectionUsage::Reuse);
        config.set_flush_after_clear(true);
        config.set_null_policy(NullPolicy::Skip);
        config.set_downsize_target(vec!["name".to_string()]);
        config.set_converter_choosable(true);

        let nested = config.inherit();
        assert!(nested.target_class().is_none());
        assert!(nested.collection_class().is_none());
        assert!(nested.downsize_target().is_none());
        assert!(nested.converter_choosable().is_none());
        assert_eq!(nested.parent(), Some(&Value::from("owner")));
        assert_eq!(nested.collection_usage(), CollectionUsage::Reuse);
        assert!(nested.is_flush_after_clear());
        assert_eq!(nested.null_policy(), Some(NullPolicy::Skip));
    }
}
