//! beanmap - Object-graph mapping between structurally similar types.
//!
//! ## Architecture
//!
//! A [`BeanMapper`] copies values property by property from a source type to
//! a target type. It never inspects types itself; everything goes through an
//! [`ObjectModel`] supplied by the host (or the bundled [`SchemaRegistry`]).
//!
//! - **Match Store**: which source property feeds which target property, per type pair
//! - **Strategy Dispatcher**: direct, collection or downsize mapping per call
//! - **Collection Handlers**: list, set and map semantics, nearest-ancestor resolution
//! - **Class Store**: projection types exposing a subset of a type's properties
//!
//! ## Epistemic Design
//!
//! - K_i (Knowledge): Type-level facts cached once per engine (matches, projections)
//! - B_i (Beliefs): Runtime fallible operations (Result, Option)
//! - I^R (Resolvable): Conventions and per-call options set by the caller
//! - I^B (Bounded): Values whose conversion is only known once observed

pub mod collections;
pub mod configuration;
pub mod convert;
pub mod dynclass;
pub mod mapper;
pub mod matching;
pub mod models;
pub mod object;
pub mod strategy;

// Re-exports for convenience
pub use configuration::{CollectionUsage, NullPolicy, StrictMappingProperties};
pub use mapper::{BeanMapper, BeanMapperBuilder};
pub use models::{Collection, EngineSettings, MapperError, Object, Result, TypeRef, Value};
pub use object::{ObjectModel, SchemaRegistry};
