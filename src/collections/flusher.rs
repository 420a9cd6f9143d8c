//! Callbacks fired when a CLEAR-mode repopulation drops elements.

use crate::models::Value;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Side effect run for every element removed from a cleared target collection.
pub trait AfterClearFlusher: Send + Sync {
    fn on_element_removed(&self, element: &Value);
}

impl<F> AfterClearFlusher for F
where
    F: Fn(&Value) + Send + Sync,
{
    fn on_element_removed(&self, element: &Value) {
        self(element)
    }
}

/// All registered after-clear flushers.
#[derive(Clone, Default)]
pub struct CollectionFlusher {
    flushers: Vec<Arc<dyn AfterClearFlusher>>,
}

impl CollectionFlusher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_after_clear_flusher(&mut self, flusher: Arc<dyn AfterClearFlusher>) {
        self.flushers.push(flusher);
    }

    /// Notify every flusher once for each removed element.
    pub fn flush(&self, removed: &[Value]) {
        if self.flushers.is_empty() || removed.is_empty() {
            return;
        }
        debug!(
            removed = removed.len(),
            flushers = self.flushers.len(),
            "Flushing cleared collection elements"
        );
        for element in removed {
            for flusher in &self.flushers {
                flusher.on_element_removed(element);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.flushers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flushers.is_empty()
    }
}

impl fmt::Debug for CollectionFlusher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CollectionFlusher")
            .field("flushers", &self.flushers.len())
            .finish()
    }
}
