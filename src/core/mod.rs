//! Core invoice and perception types, currencies, and validation.
//!
//! These types stand in for the host platform's records: a host fills them
//! from its own data, runs the computations in [`crate::tax`], and writes
//! the results back.

mod builder;
mod currencies;
mod error;
mod jurisdiction;
mod types;
mod validation;

pub use builder::*;
pub use currencies::*;
pub use error::*;
pub use jurisdiction::*;
pub use types::*;
pub use validation::*;
