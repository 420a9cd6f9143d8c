//! Object model adapter: how the engine sees types and instances.

mod adapter;
mod json;
mod schema;
mod view;

pub use adapter::{ObjectModel, PropertyDescriptor, TypeKind};
pub use json::value_from_json;
pub use schema::{PropertySchema, SchemaRegistry, TypeSchema};
pub use view::ModelView;
