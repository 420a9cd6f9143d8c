//! Collection handling.
//!
//! Epistemic foundation:
//! - K_i: Lookup is by nearest assignable registered type, not exact type
//! - K_i: CLEAR empties the existing target before repopulating it
//! - I^R: Users register handlers and after-clear flushers

mod flusher;
mod handler;
mod store;

pub use flusher::{AfterClearFlusher, CollectionFlusher};
pub use handler::{CollectionHandler, ListHandler, MapHandler, SetHandler};
pub use store::CollectionHandlerStore;
