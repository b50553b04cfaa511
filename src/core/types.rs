use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// A single invoice line as entered on the invoice form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceLine {
    /// Item description (must not be empty).
    pub description: String,
    /// Invoiced quantity (> 0).
    #[serde(with = "rust_decimal::serde::float")]
    pub quantity: Decimal,
    /// Net price per unit (>= 0).
    #[serde(with = "rust_decimal::serde::float")]
    pub unit_price: Decimal,
    /// VAT rate in percent (0–100), e.g. `18` for the FNE standard rate.
    #[serde(with = "rust_decimal::serde::float")]
    pub vat_rate_percent: Decimal,
    /// Absolute discount on the line (>= 0, <= quantity * unit_price).
    #[serde(default, with = "rust_decimal::serde::float")]
    pub discount_amount: Decimal,
    /// Seller's item reference.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    /// Measurement unit as free text (e.g. "pièce", "kg").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub measurement_unit: Option<String>,
}

impl InvoiceLine {
    /// Gross line amount before discount: `quantity * unit_price`.
    /// `None` on decimal overflow.
    pub fn gross_amount(&self) -> Option<Decimal> {
        self.quantity.checked_mul(self.unit_price)
    }

    /// Taxable base: gross amount minus the line discount.
    pub fn taxable_amount(&self) -> Option<Decimal> {
        self.gross_amount()?.checked_sub(self.discount_amount)
    }
}

/// Invoice-level monetary aggregates.
///
/// Produced by [`invoice_totals`](super::invoice_totals); builders never take
/// totals from the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceTotals {
    /// Sum of `quantity * unit_price` over all lines.
    #[serde(with = "rust_decimal::serde::float")]
    pub subtotal: Decimal,
    /// Sum of line VAT amounts.
    #[serde(with = "rust_decimal::serde::float")]
    pub total_vat: Decimal,
    /// Sum of line discounts.
    #[serde(with = "rust_decimal::serde::float")]
    pub total_discount: Decimal,
    /// `subtotal - total_discount + total_vat`.
    #[serde(with = "rust_decimal::serde::float")]
    pub total_amount: Decimal,
}

impl InvoiceTotals {
    pub const ZERO: Self = Self {
        subtotal: Decimal::ZERO,
        total_vat: Decimal::ZERO,
        total_discount: Decimal::ZERO,
        total_amount: Decimal::ZERO,
    };
}

/// Seller or buyer. Both roles share the same shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Party {
    /// Taxpayer account number (NCC).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tax_id: Option<String>,
    /// Company or person name.
    #[serde(rename = "companyName", alias = "name")]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

/// Document type of a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InvoiceType {
    /// Regular sales invoice.
    #[default]
    Standard,
    /// Quote / pro-forma, not a tax document.
    Proforma,
    /// Credit note reversing a prior signed invoice.
    CreditNote,
}

/// FNE invoice template, determining which buyer data is mandatory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum InvoiceTemplate {
    /// Business to business: buyer NCC required.
    B2B,
    /// Business to consumer.
    #[default]
    B2C,
    /// Business to foreign customer: foreign currency and rate required.
    B2F,
    /// Business to government: buyer NCC required.
    B2G,
}

impl InvoiceTemplate {
    /// Whether the buyer must carry a tax id under this template.
    pub fn requires_buyer_tax_id(&self) -> bool {
        matches!(self, Self::B2B | Self::B2G)
    }
}

/// How the buyer pays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMode {
    #[default]
    Cash,
    Card,
    Check,
    Transfer,
    /// Mobile money.
    Mobile,
    /// Payment on credit.
    Deferred,
}

/// FNE tax codes and their rates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TaxCode {
    /// TVA: normal rate, 18%.
    Tva,
    /// TVAB: reduced rate, 9%.
    Tvab,
    /// TVAC: conventional exemption, 0%.
    Tvac,
    /// TVAD: legal exemption, 0%.
    Tvad,
}

impl TaxCode {
    /// VAT rate in percent.
    pub fn rate(&self) -> Decimal {
        match self {
            Self::Tva => dec!(18),
            Self::Tvab => dec!(9),
            Self::Tvac | Self::Tvad => Decimal::ZERO,
        }
    }

    /// Code as sent to the FNE API.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Tva => "TVA",
            Self::Tvab => "TVAB",
            Self::Tvac => "TVAC",
            Self::Tvad => "TVAD",
        }
    }

    /// Parse from the FNE code string.
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "TVA" => Some(Self::Tva),
            "TVAB" => Some(Self::Tvab),
            "TVAC" => Some(Self::Tvac),
            "TVAD" => Some(Self::Tvad),
            _ => None,
        }
    }
}

/// An invoice as submitted for certification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceSubmission {
    /// Caller-assigned number, unique per tenant.
    pub invoice_number: String,
    pub issue_date: DateTime<Utc>,
    /// ISO 4217 code, e.g. "XOF".
    pub currency: String,
    #[serde(default)]
    pub invoice_type: InvoiceType,
    #[serde(default)]
    pub template: InvoiceTemplate,
    pub seller: Party,
    pub buyer: Party,
    pub lines: Vec<InvoiceLine>,
    pub totals: InvoiceTotals,
    #[serde(default)]
    pub payment_mode: PaymentMode,
    /// B2F: currency the buyer is invoiced in.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub foreign_currency: Option<String>,
    /// B2F: exchange rate to the invoice currency.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "rust_decimal::serde::float_option"
    )]
    pub foreign_currency_rate: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Free-form tenant data, passed through unchanged.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<BTreeMap<String, serde_json::Value>>,
}

/// Certification status of an invoice, owned by the FNE service.
///
/// ```text
/// RECEIVED → VALIDATING → ACCEPTED → SIGNED → CANCELLED
///                       ↘ REJECTED          ↘ CREDITED
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InvoiceStatus {
    Received,
    Validating,
    Accepted,
    Rejected,
    Signed,
    Cancelled,
    Credited,
}

impl InvoiceStatus {
    /// Whether the service may move an invoice from `self` to `next`.
    pub fn can_transition_to(&self, next: InvoiceStatus) -> bool {
        use InvoiceStatus::*;
        matches!(
            (*self, next),
            (Received, Validating)
                | (Validating, Accepted)
                | (Validating, Rejected)
                | (Accepted, Signed)
                | (Signed, Cancelled)
                | (Signed, Credited)
        )
    }

    /// No further transition is possible.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Rejected | Self::Cancelled)
    }

    /// Cancellation is accepted for signed and accepted invoices.
    pub fn can_cancel(&self) -> bool {
        matches!(self, Self::Signed | Self::Accepted)
    }

    /// Credit notes can only be issued against signed invoices.
    pub fn can_credit(&self) -> bool {
        matches!(self, Self::Signed)
    }

    /// Wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Received => "RECEIVED",
            Self::Validating => "VALIDATING",
            Self::Accepted => "ACCEPTED",
            Self::Rejected => "REJECTED",
            Self::Signed => "SIGNED",
            Self::Cancelled => "CANCELLED",
            Self::Credited => "CREDITED",
        }
    }
}

impl fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A submission as certified by the FNE service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedInvoice {
    #[serde(flatten)]
    pub invoice: InvoiceSubmission,
    /// Server-assigned, globally unique.
    pub reference: String,
    pub status: InvoiceStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
    /// Verification QR code, base64 PNG.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qr_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processed_at: Option<DateTime<Utc>>,
    /// Reference of the invoice a credit note reverses.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_reference: Option<String>,
}

/// One row of an invoice listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceSummary {
    pub reference: String,
    pub invoice_number: String,
    pub status: InvoiceStatus,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_amount: Decimal,
    pub currency: String,
    pub issue_date: DateTime<Utc>,
}

/// A page of results, as returned by list endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub page: u32,
    pub size: u32,
    /// Total number of elements across all pages.
    pub total_elements: u64,
    pub content: Vec<T>,
}

/// Confirmation of a cancellation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelReceipt {
    pub reference: String,
    pub status: InvoiceStatus,
    pub cancelled_at: DateTime<Utc>,
}
