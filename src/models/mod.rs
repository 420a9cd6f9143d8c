//! Core data models for beanmap.
//!
//! Epistemic mapping:
//! - K_i (Knowledge): Values and type identities with compile-time shape
//! - B_i (Beliefs): Wrapped in Result/Option
//! - I^R (Resolvable): Settings loaded from file

mod config;
mod error;
mod value;

pub use config::*;
pub use error::*;
pub use value::*;
