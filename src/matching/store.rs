//! Computation and caching of bean matches.
//!
//! Epistemic foundation:
//! - K_i: A match is computed once per distinct `TypePair` and then reused
//! - K_i: Nested bean links are not expanded here, so cyclic schemas terminate
//! - B_i: Every named security check is registered → Result
//! - I^B: Racing threads may build the same match twice; only one is published

use crate::configuration::BeanPair;
use crate::convert::BeanConverter;
use crate::matching::{BeanMatch, LinkKind, LogicSecuredCheck, PropertyLink, SecuredCheck, TypePair};
use crate::models::{MapperError, Result};
use crate::object::{ModelView, PropertyDescriptor};
use dashmap::DashMap;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::debug;

/// Everything a match computation may consult besides the pair itself.
#[derive(Clone, Copy)]
pub struct MatchContext<'a> {
    pub view: ModelView<'a>,
    pub converters: &'a [Arc<dyn BeanConverter>],
    pub security_checks: &'a HashMap<String, Arc<dyn LogicSecuredCheck>>,
    pub bean_pairs: &'a [BeanPair],
}

/// Process-wide store of bean matches.
#[derive(Debug, Default)]
pub struct BeanMatchStore {
    matches: DashMap<TypePair, Arc<BeanMatch>>,
}

impl BeanMatchStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the match for `pair`, computing and publishing it on first use.
    ///
    /// A failed computation publishes nothing.
    pub fn get_or_create(&self, pair: TypePair, context: &MatchContext<'_>) -> Result<Arc<BeanMatch>> {
        if let Some(existing) = self.matches.get(&pair) {
            return Ok(Arc::clone(existing.value()));
        }

        let built = Arc::new(build_match(pair.clone(), context)?);
        debug!(pair = %pair, links = built.len(), "Created bean match");

        Ok(Arc::clone(self.matches.entry(pair).or_insert(built).value()))
    }

    /// Cached match for `pair`, if any.
    pub fn get(&self, pair: &TypePair) -> Option<Arc<BeanMatch>> {
        self.matches.get(pair).map(|m| Arc::clone(m.value()))
    }

    pub fn len(&self) -> usize {
        self.matches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    pub fn clear(&self) {
        self.matches.clear();
    }
}

fn build_match(pair: TypePair, context: &MatchContext<'_>) -> Result<BeanMatch> {
    let view = &context.view;
    let strict = &pair.strict;

    let sources: Vec<PropertyDescriptor> = view
        .properties(&pair.source)
        .into_iter()
        .filter(|p| p.readable)
        .collect();
    let targets: Vec<PropertyDescriptor> = view
        .properties(&pair.target)
        .into_iter()
        .filter(|p| p.writable)
        .collect();

    let mut links = Vec::new();
    let mut matched_sources = HashSet::new();
    let mut unmatched_targets = Vec::new();

    for target in &targets {
        let exact = sources.iter().find(|s| s.name == target.name);
        let source_suffixed = || {
            sources
                .iter()
                .find(|s| strict.strip_source_suffix(&s.name) == Some(target.name.as_str()))
        };
        let target_suffixed = || {
            strict
                .strip_target_suffix(&target.name)
                .and_then(|stem| sources.iter().find(|s| s.name == stem))
        };

        let Some(source) = exact.or_else(source_suffixed).or_else(target_suffixed) else {
            unmatched_targets.push(target.name.clone());
            continue;
        };

        matched_sources.insert(source.name.as_str());
        links.push(PropertyLink {
            source_property: source.name.clone(),
            target_property: target.name.clone(),
            source_type: source.ty.clone(),
            target_type: target.ty.clone(),
            kind: classify(context, source, target),
            element_type: target.element_type.clone(),
            checks: resolve_checks(context, source, target)?,
        });
    }

    let strict_pair = context
        .bean_pairs
        .iter()
        .find(|p| p.source == pair.source && p.target == pair.target);
    if let Some(strict_pair) = strict_pair {
        let mut missing = Vec::new();
        if strict_pair.strict_source {
            missing.extend(
                sources
                    .iter()
                    .filter(|s| !matched_sources.contains(s.name.as_str()))
                    .map(|s| s.name.clone()),
            );
        }
        if strict_pair.strict_target {
            missing.extend(unmatched_targets);
        }
        if !missing.is_empty() {
            return Err(MapperError::StrictMappingRequirements {
                source_type: pair.source.clone(),
                target_type: pair.target.clone(),
                missing,
            });
        }
    }

    Ok(BeanMatch::new(pair, links))
}

fn classify(context: &MatchContext<'_>, source: &PropertyDescriptor, target: &PropertyDescriptor) -> LinkKind {
    let view = &context.view;
    if context
        .converters
        .iter()
        .any(|c| c.supports(&source.ty, &target.ty))
    {
        LinkKind::Converter
    } else if view.is_collection(&target.ty) {
        LinkKind::Collection
    } else if view.is_bean(&source.ty) && view.is_bean(&target.ty) {
        LinkKind::Nested
    } else if view.is_assignable(&source.ty, &target.ty) {
        LinkKind::Assignable
    } else {
        LinkKind::Unresolved
    }
}

fn resolve_checks(
    context: &MatchContext<'_>,
    source: &PropertyDescriptor,
    target: &PropertyDescriptor,
) -> Result<Vec<SecuredCheck>> {
    let mut names: Vec<&str> = Vec::new();
    for name in [&source.secured_by, &target.secured_by].into_iter().flatten() {
        if !names.contains(&name.as_str()) {
            names.push(name);
        }
    }

    names
        .into_iter()
        .map(|name| {
            context
                .security_checks
                .get(name)
                .map(|check| SecuredCheck::new(name, Arc::clone(check)))
                .ok_or_else(|| {
                    MapperError::configuration(format!(
                        "property '{}' is secured by unregistered check '{name}'",
                        target.name
                    ))
                })
        })
        .collect()
}
