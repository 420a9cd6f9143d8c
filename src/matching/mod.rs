//! Type-pair match store.
//!
//! A match answers, for one (source type, target type) pair, which source
//! property feeds which target property and how. Matches are type level and
//! shared by every mapping call of an engine.

mod link;
mod pair;
mod security;
mod store;

pub use link::{BeanMatch, LinkKind, PropertyLink};
pub use pair::TypePair;
pub use security::{LogicSecuredCheck, PropertyContext, SecuredCheck};
pub use store::{BeanMatchStore, MatchContext};
