//! Downsized projection types.
//!
//! Epistemic foundation:
//! - K_i: A projection exposes a subset of its base type's properties
//! - K_i: Equal (base, fields, strict) inputs yield the identical projection `Arc`
//! - B_i: Requested field names exist on the base → unknown names are dropped

mod store;

pub use store::{ClassStore, Projection, ProjectionKey};
