use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use reqwest::{RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, info, instrument, warn};

use super::config::ClientConfig;
use super::error::{ClientError, ServiceError};
use super::session::Session;
use super::wire::{CancelReason, IdempotencyKey, ListFilter, Submitted};
use crate::core::{
    CancelReceipt, InvoiceStatus, InvoiceSubmission, InvoiceSummary, InvoiceType, Page,
    SignedInvoice, ValidationError, validate_submission,
};

/// Header carrying the idempotency key on every mutating request.
pub const IDEMPOTENCY_KEY_HEADER: &str = "Idempotency-Key";

/// Response header the service may use to return a correlation id.
pub const CORRELATION_ID_HEADER: &str = "X-Correlation-Id";

/// Client for the FNE certification API.
///
/// Each method performs exactly one HTTP exchange and never retries. Clones
/// share the session and the cache of last known invoice statuses.
///
/// ```ignore
/// use fne::client::*;
///
/// let client = FneClient::new(ClientConfig::from_env()?, Session::from_env()?)?;
/// let key = IdempotencyKey::generate();
/// // Retries of the same submission must reuse `key`.
/// let submitted = client.submit_invoice(&invoice, &key).await?;
/// println!("certified as {}", submitted.reference());
/// ```
#[derive(Debug, Clone)]
pub struct FneClient {
    http: reqwest::Client,
    config: ClientConfig,
    session: Session,
    statuses: Arc<Mutex<HashMap<String, Known>>>,
}

/// Last status seen for a reference, and the key of the cancel or credit
/// note that settled it, so that replays with that key still reach the
/// service.
#[derive(Debug, Clone)]
struct Known {
    status: InvoiceStatus,
    settled_by: Option<IdempotencyKey>,
}

impl FneClient {
    pub fn new(config: ClientConfig, session: Session) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .user_agent(config.agent())
            .build()
            .map_err(|e| ClientError::Config(format!("failed to create HTTP client: {e}")))?;
        Ok(Self {
            http,
            config,
            session,
            statuses: Arc::new(Mutex::new(HashMap::new())),
        })
    }

    /// A handle using a different per-request timeout. Shares session and
    /// status cache with `self`.
    pub fn with_timeout(&self, timeout: Duration) -> Self {
        Self {
            config: self.config.clone().timeout(timeout),
            ..self.clone()
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Last status seen for `reference`, if this client submitted, fetched,
    /// cancelled or credited it.
    pub fn known_status(&self, reference: &str) -> Option<InvoiceStatus> {
        self.statuses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(reference)
            .map(|known| known.status)
    }

    /// Drop the cached status for `reference`.
    pub fn forget(&self, reference: &str) {
        self.statuses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(reference);
    }

    /// Submit an invoice for certification.
    ///
    /// The payload is validated locally first; on failure nothing is sent.
    /// Re-invoking with the same `key` returns the original result.
    #[instrument(skip_all, fields(invoice_number = %invoice.invoice_number, key = %key))]
    pub async fn submit_invoice(
        &self,
        invoice: &InvoiceSubmission,
        key: &IdempotencyKey,
    ) -> Result<Submitted, ClientError> {
        reject_invalid(invoice)?;

        let url = self.config.endpoint(&["invoices"])?;
        debug!(%url, "POST invoice");
        let request = self
            .http
            .post(url)
            .header(IDEMPOTENCY_KEY_HEADER, key.as_str())
            .json(invoice);
        let submitted: Submitted = self.decode(self.send(request, None).await?).await?;

        self.remember(submitted.reference(), submitted.status());
        info!(
            reference = submitted.reference(),
            status = %submitted.status(),
            "invoice submitted"
        );
        Ok(submitted)
    }

    /// Fetch a certified invoice by its service reference.
    #[instrument(skip(self))]
    pub async fn get_invoice(&self, reference: &str) -> Result<SignedInvoice, ClientError> {
        check_reference(reference)?;
        let url = self.config.endpoint(&["invoices", reference])?;
        debug!(%url, "GET invoice");
        let invoice: SignedInvoice =
            self.decode(self.send(self.http.get(url), Some(reference)).await?).await?;
        self.remember(&invoice.reference, invoice.status);
        Ok(invoice)
    }

    /// List invoices. Pagination parameters are passed through unmodified.
    ///
    /// Listed rows only refresh references that are already cached.
    #[instrument(skip(self))]
    pub async fn list_invoices(
        &self,
        filter: &ListFilter,
    ) -> Result<Page<InvoiceSummary>, ClientError> {
        let url = self.config.endpoint(&["invoices"])?;
        debug!(%url, "GET invoices");
        let request = self.http.get(url).query(&filter.query_pairs());
        let page: Page<InvoiceSummary> = self.decode(self.send(request, None).await?).await?;
        self.refresh(&page.content);
        Ok(page)
    }

    /// Cancel a signed or accepted invoice.
    ///
    /// Fails locally, without a request, when the last known status of
    /// `reference` does not allow cancellation. A retry with the key that
    /// performed the cancellation is still sent and returns the original
    /// receipt.
    #[instrument(skip(self, reason), fields(key = %key))]
    pub async fn cancel(
        &self,
        reference: &str,
        reason: &CancelReason,
        key: &IdempotencyKey,
    ) -> Result<CancelReceipt, ClientError> {
        check_reference(reference)?;
        if let Some(status) = self.blocking_status(reference, key) {
            if !status.can_cancel() {
                return Err(illegal_transition(reference, status, "cancelled"));
            }
        }

        let url = self.config.endpoint(&["invoices", reference, "cancel"])?;
        debug!(%url, "POST cancel");
        let request = self
            .http
            .post(url)
            .header(IDEMPOTENCY_KEY_HEADER, key.as_str())
            .json(reason);
        let receipt: CancelReceipt = self.decode(self.send(request, Some(reference)).await?).await?;

        self.settle(&receipt.reference, receipt.status, key);
        info!(reference = %receipt.reference, cancelled_at = %receipt.cancelled_at, "invoice cancelled");
        Ok(receipt)
    }

    /// Issue a credit note against a signed invoice.
    ///
    /// `credit` must be of type [`InvoiceType::CreditNote`] and pass the same
    /// validation as a regular submission.
    #[instrument(skip(self, credit), fields(invoice_number = %credit.invoice_number, key = %key))]
    pub async fn credit_note(
        &self,
        reference: &str,
        credit: &InvoiceSubmission,
        key: &IdempotencyKey,
    ) -> Result<SignedInvoice, ClientError> {
        check_reference(reference)?;
        let mut errors = Vec::new();
        if let Some(status) = self.blocking_status(reference, key) {
            if !status.can_credit() {
                errors.push(transition_error(reference, status, "credited"));
            }
        }
        if credit.invoice_type != InvoiceType::CreditNote {
            errors.push(ValidationError::new(
                "invoiceType",
                "a credit note must have invoice type CREDIT_NOTE",
            ));
        }
        errors.extend(validate_submission(credit));
        if !errors.is_empty() {
            return Err(ClientError::Validation(errors));
        }

        let url = self
            .config
            .endpoint(&["invoices", reference, "credit-note"])?;
        debug!(%url, "POST credit note");
        let request = self
            .http
            .post(url)
            .header(IDEMPOTENCY_KEY_HEADER, key.as_str())
            .json(credit);
        let note: SignedInvoice = self.decode(self.send(request, Some(reference)).await?).await?;

        self.settle(reference, InvoiceStatus::Credited, key);
        self.remember(&note.reference, note.status);
        info!(reference = %note.reference, original = reference, "credit note issued");
        Ok(note)
    }

    /// Whether the service answers on `/health`.
    pub async fn health_check(&self) -> Result<bool, ClientError> {
        let url = self.config.endpoint(&["health"])?;
        match self.send(self.http.get(url), None).await {
            Ok(_) => Ok(true),
            Err(ClientError::Service(e)) => {
                debug!(status = e.http_status, "health check failed");
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    /// Cached status of `reference`, unless `key` is the one that settled it.
    fn blocking_status(&self, reference: &str, key: &IdempotencyKey) -> Option<InvoiceStatus> {
        self.statuses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(reference)
            .filter(|known| known.settled_by.as_ref() != Some(key))
            .map(|known| known.status)
    }

    fn remember(&self, reference: &str, status: InvoiceStatus) {
        let mut statuses = self.statuses.lock().unwrap_or_else(PoisonError::into_inner);
        match statuses.get_mut(reference) {
            Some(known) if known.status == status => {}
            Some(known) => {
                known.status = status;
                known.settled_by = None;
            }
            None => {
                statuses.insert(
                    reference.to_string(),
                    Known {
                        status,
                        settled_by: None,
                    },
                );
            }
        }
    }

    fn refresh(&self, rows: &[InvoiceSummary]) {
        let mut statuses = self.statuses.lock().unwrap_or_else(PoisonError::into_inner);
        for row in rows {
            if let Some(known) = statuses.get_mut(&row.reference) {
                if known.status != row.status {
                    known.status = row.status;
                    known.settled_by = None;
                }
            }
        }
    }

    fn settle(&self, reference: &str, status: InvoiceStatus, key: &IdempotencyKey) {
        self.statuses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(
                reference.to_string(),
                Known {
                    status,
                    settled_by: Some(key.clone()),
                },
            );
    }

    /// Attach auth and timeout, send, and turn non-2xx answers into errors.
    async fn send(
        &self,
        request: RequestBuilder,
        reference: Option<&str>,
    ) -> Result<Response, ClientError> {
        let token = self.session.bearer()?;
        let timeout = self.config.request_timeout();

        let response = request
            .bearer_auth(token)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| transport_error(e, timeout))?;

        if response.status().is_success() {
            Ok(response)
        } else {
            Err(self.error_from(response, reference).await)
        }
    }

    /// Read the body and parse it. The request timeout also covers the body.
    async fn decode<T: DeserializeOwned>(&self, response: Response) -> Result<T, ClientError> {
        let timeout = self.config.request_timeout();
        let body = response
            .bytes()
            .await
            .map_err(|e| transport_error(e, timeout))?;
        serde_json::from_slice(&body).map_err(|e| ClientError::Decode(e.to_string()))
    }

    async fn error_from(&self, response: Response, reference: Option<&str>) -> ClientError {
        let status = response.status();
        let header_correlation_id = response
            .headers()
            .get(CORRELATION_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(String::from);
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) if e.is_timeout() => {
                return ClientError::Timeout(self.config.request_timeout());
            }
            Err(_) => String::new(),
        };

        let mut error = serde_json::from_str::<ServiceError>(&body)
            .ok()
            .filter(|e| !e.code.is_empty() || !e.message.is_empty())
            .unwrap_or_else(|| ServiceError::from_status(status.as_u16(), &body));
        if error.http_status == 0 {
            error.http_status = status.as_u16();
        }
        if error.correlation_id.is_none() {
            error.correlation_id = header_correlation_id;
        }

        match status {
            StatusCode::UNAUTHORIZED => {
                warn!("session rejected by service, invalidating");
                self.session.invalidate();
                ClientError::Auth {
                    status: status.as_u16(),
                    message: error.message,
                }
            }
            StatusCode::FORBIDDEN => ClientError::Auth {
                status: status.as_u16(),
                message: error.message,
            },
            StatusCode::NOT_FOUND => match reference {
                Some(reference) => ClientError::NotFound {
                    reference: reference.to_string(),
                },
                None => ClientError::Service(error),
            },
            StatusCode::CONFLICT => {
                warn!(code = %error.code, correlation_id = ?error.correlation_id, "conflicting submission");
                ClientError::Conflict(error)
            }
            _ => {
                warn!(
                    http_status = error.http_status,
                    code = %error.code,
                    correlation_id = ?error.correlation_id,
                    "service error"
                );
                ClientError::Service(error)
            }
        }
    }
}

fn check_reference(reference: &str) -> Result<(), ClientError> {
    if reference.trim().is_empty() {
        Err(ClientError::invalid("reference", "reference must not be empty"))
    } else {
        Ok(())
    }
}

fn reject_invalid(invoice: &InvoiceSubmission) -> Result<(), ClientError> {
    let errors = validate_submission(invoice);
    if errors.is_empty() {
        Ok(())
    } else {
        Err(ClientError::Validation(errors))
    }
}

fn transition_error(reference: &str, status: InvoiceStatus, action: &str) -> ValidationError {
    ValidationError::new(
        "status",
        format!("invoice {reference} is {status} and cannot be {action}"),
    )
}

fn illegal_transition(reference: &str, status: InvoiceStatus, action: &str) -> ClientError {
    ClientError::Validation(vec![transition_error(reference, status, action)])
}

fn transport_error(error: reqwest::Error, timeout: Duration) -> ClientError {
    if error.is_timeout() {
        ClientError::Timeout(timeout)
    } else {
        ClientError::Network(error.to_string())
    }
}
