//! # fne
//!
//! Client-side toolkit for the Normalized Electronic Invoice (FNE)
//! certification scheme: invoice totals, local validation, and an
//! idempotent client for the certification API.
//!
//! All monetary values use [`rust_decimal::Decimal`], never floating point.
//!
//! ## Quick Start
//!
//! ```rust
//! use chrono::{TimeZone, Utc};
//! use fne::core::*;
//! use rust_decimal_macros::dec;
//!
//! let invoice = SubmissionBuilder::new("INV-2025-000001", Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap())
//!     .template(InvoiceTemplate::B2B)
//!     .seller(PartyBuilder::new("Oxalio SARL").tax_id("CI1234567A").build())
//!     .buyer(PartyBuilder::new("Kone Distribution").tax_id("CI7654321B").build())
//!     .add_line(InvoiceLineBuilder::new("Ciment", dec!(2), dec!(5000)).tax_code(TaxCode::Tva).build())
//!     .add_line(InvoiceLineBuilder::new("Sable", dec!(1), dec!(10000))
//!         .tax_code(TaxCode::Tvab)
//!         .discount(dec!(1000))
//!         .build())
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(invoice.totals.total_vat, dec!(2610));
//! assert_eq!(invoice.totals.total_amount, dec!(21610));
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `core` (default) | Invoice types, totals, validation, numbering |
//! | `client` | Async certification API client (reqwest) |
//! | `all` | Everything |

#[cfg(feature = "core")]
pub mod core;

#[cfg(feature = "client")]
pub mod client;

// Re-export core types at crate root for convenience
#[cfg(feature = "core")]
pub use crate::core::*;
