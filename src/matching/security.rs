//! Property-level access checks.
//!
//! K_i: Checks are attached to links when the match is built.
//! K_i: Checks are evaluated per copied property; a denial skips that property only.

use crate::models::Value;
use std::fmt;
use std::sync::Arc;

/// What a check is asked about.
#[derive(Debug, Clone, Copy)]
pub struct PropertyContext<'a> {
    /// Object the value is read from
    pub source: &'a Value,
    /// Name of the guarded property
    pub property: &'a str,
}

/// Decides whether a guarded property may be copied.
pub trait LogicSecuredCheck: Send + Sync {
    fn is_allowed(&self, property: &PropertyContext<'_>, parent: Option<&Value>) -> bool;
}

impl<F> LogicSecuredCheck for F
where
    F: Fn(&PropertyContext<'_>, Option<&Value>) -> bool + Send + Sync,
{
    fn is_allowed(&self, property: &PropertyContext<'_>, parent: Option<&Value>) -> bool {
        self(property, parent)
    }
}

/// A registered check together with the name properties refer to it by.
#[derive(Clone)]
pub struct SecuredCheck {
    name: String,
    check: Arc<dyn LogicSecuredCheck>,
}

impl SecuredCheck {
    pub fn new(name: impl Into<String>, check: Arc<dyn LogicSecuredCheck>) -> Self {
        Self {
            name: name.into(),
            check,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_allowed(&self, property: &PropertyContext<'_>, parent: Option<&Value>) -> bool {
        self.check.is_allowed(property, parent)
    }
}

impl fmt::Debug for SecuredCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecuredCheck")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}
