//! Core invoice types, totals, validation, and numbering.
//!
//! Everything here is pure: no I/O, no clock, no randomness. The same input
//! always produces the same output.

mod builder;
mod currencies;
mod error;
mod numbering;
mod totals;
mod types;
mod validation;

pub use builder::*;
pub use currencies::is_known_currency_code;
pub use error::*;
pub use numbering::*;
pub use totals::*;
pub use types::*;
pub use validation::*;
