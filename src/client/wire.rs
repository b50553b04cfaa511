//! Request and response shapes specific to the HTTP API.

use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::ClientError;
use crate::core::{InvoiceStatus, SignedInvoice};

/// Caller-generated token that makes a retried request safe.
///
/// Generate one per logical submission and reuse it for every retry of that
/// submission. The client never creates keys on its own.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IdempotencyKey(String);

impl IdempotencyKey {
    /// A fresh random (UUID v4) key.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Wrap an existing key, e.g. one persisted alongside a draft invoice.
    /// Must be non-blank printable ASCII of at most 255 characters.
    pub fn new(key: impl Into<String>) -> Result<Self, ClientError> {
        let key = key.into();
        if key.trim().is_empty() {
            return Err(ClientError::invalid(
                "idempotencyKey",
                "idempotency key must not be empty",
            ));
        }
        if key.len() > 255 || !key.bytes().all(|b| b.is_ascii_graphic()) {
            return Err(ClientError::invalid(
                "idempotencyKey",
                "idempotency key must be at most 255 printable ASCII characters",
            ));
        }
        Ok(Self(key))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IdempotencyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Result of `POST /invoices`.
///
/// The service answers either with the full certified invoice or, when
/// certification is still in progress, with a short acknowledgement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Submitted {
    Signed(Box<SignedInvoice>),
    Acknowledged(SubmissionAck),
}

impl Submitted {
    pub fn reference(&self) -> &str {
        match self {
            Self::Signed(invoice) => &invoice.reference,
            Self::Acknowledged(ack) => &ack.reference,
        }
    }

    pub fn status(&self) -> InvoiceStatus {
        match self {
            Self::Signed(invoice) => invoice.status,
            Self::Acknowledged(ack) => ack.status,
        }
    }

    /// The certified invoice, if the service returned it.
    pub fn signed(&self) -> Option<&SignedInvoice> {
        match self {
            Self::Signed(invoice) => Some(invoice),
            Self::Acknowledged(_) => None,
        }
    }
}

/// Short acknowledgement of a submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionAck {
    pub reference: String,
    pub status: InvoiceStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Related resources, e.g. `{"self": "/invoices/FNE-1"}`.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub links: BTreeMap<String, String>,
}

/// Body of `POST /invoices/{reference}/cancel`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelReason {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl CancelReason {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason_code: None,
            reason: Some(reason.into()),
        }
    }

    pub fn code(mut self, code: impl Into<String>) -> Self {
        self.reason_code = Some(code.into());
        self
    }
}

/// Query for `GET /invoices`. Values are passed through unmodified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListFilter {
    pub status: Option<InvoiceStatus>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub page: u32,
    pub size: u32,
    /// Sort expression, e.g. `issueDate,desc`.
    pub sort: Option<String>,
}

impl Default for ListFilter {
    fn default() -> Self {
        Self::new(0, 20)
    }
}

impl ListFilter {
    pub fn new(page: u32, size: u32) -> Self {
        Self {
            status: None,
            from: None,
            to: None,
            page,
            size,
            sort: None,
        }
    }

    pub fn status(mut self, status: InvoiceStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Restrict to issue dates in `from..=to`.
    pub fn date_range(mut self, from: NaiveDate, to: NaiveDate) -> Self {
        self.from = Some(from);
        self.to = Some(to);
        self
    }

    pub fn sort(mut self, sort: impl Into<String>) -> Self {
        self.sort = Some(sort.into());
        self
    }

    pub(crate) fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::with_capacity(6);
        if let Some(status) = self.status {
            pairs.push(("status", status.as_str().to_string()));
        }
        if let Some(from) = self.from {
            pairs.push(("from", from.format("%Y-%m-%d").to_string()));
        }
        if let Some(to) = self.to {
            pairs.push(("to", to.format("%Y-%m-%d").to_string()));
        }
        pairs.push(("page", self.page.to_string()));
        pairs.push(("size", self.size.to_string()));
        if let Some(sort) = &self.sort {
            pairs.push(("sort", sort.clone()));
        }
        pairs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_keys_are_unique_uuids() {
        let a = IdempotencyKey::generate();
        let b = IdempotencyKey::generate();
        assert_ne!(a, b);
        assert!(Uuid::parse_str(a.as_str()).is_ok());
    }

    #[test]
    fn blank_or_non_ascii_keys_rejected() {
        assert!(matches!(
            IdempotencyKey::new("   "),
            Err(ClientError::Validation(_))
        ));
        assert!(IdempotencyKey::new("clé").is_err());
        assert!(IdempotencyKey::new("has space").is_err());
        assert_eq!(IdempotencyKey::new("draft-42").unwrap().as_str(), "draft-42");
    }

    #[test]
    fn list_filter_query_pairs() {
        let filter = ListFilter::new(2, 50)
            .status(InvoiceStatus::Signed)
            .date_range(
                NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
                NaiveDate::from_ymd_opt(2025, 1, 31).unwrap(),
            )
            .sort("issueDate,desc");
        assert_eq!(
            filter.query_pairs(),
            vec![
                ("status", "SIGNED".to_string()),
                ("from", "2025-01-01".to_string()),
                ("to", "2025-01-31".to_string()),
                ("page", "2".to_string()),
                ("size", "50".to_string()),
                ("sort", "issueDate,desc".to_string()),
            ]
        );
    }

    #[test]
    fn default_filter_only_paginates() {
        let pairs = ListFilter::default().query_pairs();
        assert_eq!(
            pairs,
            vec![("page", "0".to_string()), ("size", "20".to_string())]
        );
    }

    #[test]
    fn acknowledgement_decodes() {
        let json = r#"{"reference":"FNE-2025-0001","status":"RECEIVED","message":"queued","links":{"self":"/invoices/FNE-2025-0001"}}"#;
        let submitted: Submitted = serde_json::from_str(json).unwrap();
        assert_eq!(submitted.reference(), "FNE-2025-0001");
        assert_eq!(submitted.status(), InvoiceStatus::Received);
        assert!(submitted.signed().is_none());
    }

    #[test]
    fn cancel_reason_skips_absent_fields() {
        let json = serde_json::to_string(&CancelReason::new("duplicate")).unwrap();
        assert_eq!(json, r#"{"reason":"duplicate"}"#);
    }
}
