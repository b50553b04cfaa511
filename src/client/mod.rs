//! Async client for the FNE certification API.
//!
//! Submits, fetches, lists, cancels, and credits invoices over HTTP(S) JSON.
//! Mutating calls carry a caller-supplied [`IdempotencyKey`]; retrying with
//! the same key is always safe, and the client never retries by itself.
//!
//! # Example
//!
//! ```ignore
//! use fne::client::*;
//!
//! let config = ClientConfig::new("https://fne.example.ci/api/v1")?;
//! let client = FneClient::new(config, Session::new(token))?;
//!
//! let key = IdempotencyKey::generate();
//! match client.submit_invoice(&invoice, &key).await {
//!     Ok(submitted) => println!("{} is {}", submitted.reference(), submitted.status()),
//!     Err(e) if e.is_retryable() => { /* retry later with the same key */ }
//!     Err(e) => eprintln!("{}", e.user_message()),
//! }
//! ```

mod api;
mod config;
mod error;
mod session;
mod wire;

pub use api::{CORRELATION_ID_HEADER, FneClient, IDEMPOTENCY_KEY_HEADER};
pub use config::{BASE_URL_ENV, ClientConfig, TIMEOUT_ENV};
pub use error::{ClientError, ErrorDetail, ServiceError};
pub use session::{Session, TOKEN_ENV};
pub use wire::{CancelReason, IdempotencyKey, ListFilter, Submitted, SubmissionAck};
