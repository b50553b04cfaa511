use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde_json::Value;

use super::error::InvoiceError;
use super::totals::invoice_totals;
use super::types::*;
use super::validation::{self, MAX_LINES};

/// Builder for submissions ready to be certified.
///
/// Totals are always computed from the lines; they cannot be set by hand.
///
/// ```
/// use fne::core::*;
/// use rust_decimal_macros::dec;
/// use chrono::{TimeZone, Utc};
///
/// let invoice = SubmissionBuilder::new("INV-2025-000001", Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap())
///     .seller(PartyBuilder::new("Oxalio SARL").tax_id("CI1234567A").build())
///     .buyer(PartyBuilder::new("Kone Distribution").build())
///     .add_line(InvoiceLineBuilder::new("Ciment CPJ 45", dec!(10), dec!(4500))
///         .tax_code(TaxCode::Tva)
///         .build())
///     .build()
///     .unwrap();
///
/// assert_eq!(invoice.totals.total_amount, dec!(53100));
/// ```
pub struct SubmissionBuilder {
    invoice_number: String,
    issue_date: DateTime<Utc>,
    currency: String,
    invoice_type: InvoiceType,
    template: InvoiceTemplate,
    seller: Option<Party>,
    buyer: Option<Party>,
    lines: Vec<InvoiceLine>,
    payment_mode: PaymentMode,
    foreign_currency: Option<String>,
    foreign_currency_rate: Option<Decimal>,
    notes: Option<String>,
    metadata: BTreeMap<String, Value>,
}

impl SubmissionBuilder {
    pub fn new(invoice_number: impl Into<String>, issue_date: DateTime<Utc>) -> Self {
        Self {
            invoice_number: invoice_number.into(),
            issue_date,
            currency: "XOF".to_string(),
            invoice_type: InvoiceType::Standard,
            template: InvoiceTemplate::B2C,
            seller: None,
            buyer: None,
            lines: Vec::new(),
            payment_mode: PaymentMode::Cash,
            foreign_currency: None,
            foreign_currency_rate: None,
            notes: None,
            metadata: BTreeMap::new(),
        }
    }

    /// Start a credit note reversing `original` in full.
    ///
    /// Parties, currency, template and lines are copied; replace the lines
    /// with [`lines`](Self::lines) for a partial credit.
    pub fn credit_note(
        original: &InvoiceSubmission,
        invoice_number: impl Into<String>,
        issue_date: DateTime<Utc>,
    ) -> Self {
        Self {
            invoice_number: invoice_number.into(),
            issue_date,
            currency: original.currency.clone(),
            invoice_type: InvoiceType::CreditNote,
            template: original.template,
            seller: Some(original.seller.clone()),
            buyer: Some(original.buyer.clone()),
            lines: original.lines.clone(),
            payment_mode: original.payment_mode,
            foreign_currency: original.foreign_currency.clone(),
            foreign_currency_rate: original.foreign_currency_rate,
            notes: None,
            metadata: BTreeMap::new(),
        }
    }

    pub fn currency(mut self, code: impl Into<String>) -> Self {
        self.currency = code.into();
        self
    }

    pub fn invoice_type(mut self, invoice_type: InvoiceType) -> Self {
        self.invoice_type = invoice_type;
        self
    }

    pub fn template(mut self, template: InvoiceTemplate) -> Self {
        self.template = template;
        self
    }

    pub fn seller(mut self, party: Party) -> Self {
        self.seller = Some(party);
        self
    }

    pub fn buyer(mut self, party: Party) -> Self {
        self.buyer = Some(party);
        self
    }

    pub fn add_line(mut self, line: InvoiceLine) -> Self {
        self.lines.push(line);
        self
    }

    /// Replace all lines.
    pub fn lines(mut self, lines: Vec<InvoiceLine>) -> Self {
        self.lines = lines;
        self
    }

    pub fn payment_mode(mut self, mode: PaymentMode) -> Self {
        self.payment_mode = mode;
        self
    }

    /// Foreign currency and exchange rate, for B2F invoices.
    pub fn foreign_currency(mut self, code: impl Into<String>, rate: Decimal) -> Self {
        self.foreign_currency = Some(code.into());
        self.foreign_currency_rate = Some(rate);
        self
    }

    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    pub fn metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Build the submission, calculating totals and running validation.
    /// Returns all validation errors (not just the first).
    pub fn build(self) -> Result<InvoiceSubmission, InvoiceError> {
        let invoice = self.assemble()?;

        let errors = validation::validate_submission(&invoice);
        if !errors.is_empty() {
            return Err(InvoiceError::Validation(errors));
        }

        Ok(invoice)
    }

    /// Build without validation. Useful for testing or importing external data.
    pub fn build_unchecked(self) -> Result<InvoiceSubmission, InvoiceError> {
        self.assemble()
    }

    fn assemble(self) -> Result<InvoiceSubmission, InvoiceError> {
        let seller = self
            .seller
            .ok_or_else(|| InvoiceError::Builder("seller is required".into()))?;
        let buyer = self
            .buyer
            .ok_or_else(|| InvoiceError::Builder("buyer is required".into()))?;

        if self.lines.len() > MAX_LINES {
            return Err(InvoiceError::Builder(format!(
                "invoice cannot have more than {MAX_LINES} lines"
            )));
        }

        // Invalid lines are reported by validation with the other errors.
        let totals = match invoice_totals(&self.lines) {
            Ok(totals) => totals,
            Err(InvoiceError::Validation(_)) => InvoiceTotals::ZERO,
            Err(e) => return Err(e),
        };

        Ok(InvoiceSubmission {
            invoice_number: self.invoice_number,
            issue_date: self.issue_date,
            currency: self.currency,
            invoice_type: self.invoice_type,
            template: self.template,
            seller,
            buyer,
            lines: self.lines,
            totals,
            payment_mode: self.payment_mode,
            foreign_currency: self.foreign_currency,
            foreign_currency_rate: self.foreign_currency_rate,
            notes: self.notes,
            metadata: (!self.metadata.is_empty()).then_some(self.metadata),
        })
    }
}

/// Builder for Party (seller/buyer).
pub struct PartyBuilder {
    name: String,
    tax_id: Option<String>,
    address: Option<String>,
    email: Option<String>,
    phone: Option<String>,
}

impl PartyBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tax_id: None,
            address: None,
            email: None,
            phone: None,
        }
    }

    /// Taxpayer account number (NCC).
    pub fn tax_id(mut self, id: impl Into<String>) -> Self {
        self.tax_id = Some(id.into());
        self
    }

    pub fn address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    pub fn build(self) -> Party {
        Party {
            tax_id: self.tax_id,
            name: self.name,
            address: self.address,
            email: self.email,
            phone: self.phone,
        }
    }
}

/// Builder for InvoiceLine. Defaults to the 18% TVA rate and no discount.
pub struct InvoiceLineBuilder {
    description: String,
    quantity: Decimal,
    unit_price: Decimal,
    vat_rate_percent: Decimal,
    discount_amount: Decimal,
    reference: Option<String>,
    measurement_unit: Option<String>,
}

impl InvoiceLineBuilder {
    pub fn new(description: impl Into<String>, quantity: Decimal, unit_price: Decimal) -> Self {
        Self {
            description: description.into(),
            quantity,
            unit_price,
            vat_rate_percent: TaxCode::Tva.rate(),
            discount_amount: Decimal::ZERO,
            reference: None,
            measurement_unit: None,
        }
    }

    pub fn vat_rate(mut self, percent: Decimal) -> Self {
        self.vat_rate_percent = percent;
        self
    }

    /// Use the rate of an FNE tax code.
    pub fn tax_code(mut self, code: TaxCode) -> Self {
        self.vat_rate_percent = code.rate();
        self
    }

    /// Absolute discount on the whole line.
    pub fn discount(mut self, amount: Decimal) -> Self {
        self.discount_amount = amount;
        self
    }

    pub fn reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = Some(reference.into());
        self
    }

    pub fn measurement_unit(mut self, unit: impl Into<String>) -> Self {
        self.measurement_unit = Some(unit.into());
        self
    }

    pub fn build(self) -> InvoiceLine {
        InvoiceLine {
            description: self.description,
            quantity: self.quantity,
            unit_price: self.unit_price,
            vat_rate_percent: self.vat_rate_percent,
            discount_amount: self.discount_amount,
            reference: self.reference,
            measurement_unit: self.measurement_unit,
        }
    }
}
