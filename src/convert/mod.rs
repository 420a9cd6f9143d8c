//! Value converters.
//!
//! Epistemic foundation:
//! - K_i: A converter declares the exact (source type, target type) pairs it handles
//! - B_i: The value converts cleanly → Result
//! - I^R: Users register their own converters ahead of the defaults

mod scalar;

pub use scalar::{ScalarConverter, default_converters};

use crate::models::{Result, TypeRef, Value};

/// Converts values between two types.
pub trait BeanConverter: Send + Sync {
    /// Whether this converter handles `source` → `target`.
    fn supports(&self, source: &TypeRef, target: &TypeRef) -> bool;

    /// Convert a non-null value to `target`.
    fn convert(&self, value: Value, target: &TypeRef) -> Result<Value>;
}

/// Converter for a single type pair backed by a closure.
pub struct FnConverter<F> {
    source: TypeRef,
    target: TypeRef,
    convert: F,
}

impl<F> FnConverter<F>
where
    F: Fn(Value) -> Result<Value> + Send + Sync,
{
    pub fn new(source: TypeRef, target: TypeRef, convert: F) -> Self {
        Self {
            source,
            target,
            convert,
        }
    }
}

impl<F> BeanConverter for FnConverter<F>
where
    F: Fn(Value) -> Result<Value> + Send + Sync,
{
    fn supports(&self, source: &TypeRef, target: &TypeRef) -> bool {
        &self.source == source && &self.target == target
    }

    fn convert(&self, value: Value, _target: &TypeRef) -> Result<Value> {
        (self.convert)(value)
    }
}
