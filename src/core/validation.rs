use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::currencies::is_known_currency_code;
use super::error::{InvoiceError, ValidationError};
use super::totals::invoice_totals;
use super::types::*;

/// Maximum number of lines accepted on one invoice.
pub const MAX_LINES: usize = 10_000;

/// Maximum length of an invoice number.
pub const MAX_INVOICE_NUMBER_LEN: usize = 200;

/// Validate a submission before it is sent for certification.
/// Returns all validation errors found (not just the first).
pub fn validate_submission(invoice: &InvoiceSubmission) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if invoice.invoice_number.trim().is_empty() {
        errors.push(ValidationError::with_rule(
            "invoiceNumber",
            "invoice number must not be empty",
            "INV-01",
        ));
    } else if invoice.invoice_number.len() > MAX_INVOICE_NUMBER_LEN {
        errors.push(ValidationError::with_rule(
            "invoiceNumber",
            format!("invoice number cannot exceed {MAX_INVOICE_NUMBER_LEN} characters"),
            "INV-01",
        ));
    }

    validate_currency(&invoice.currency, "currency", &mut errors);

    validate_party(&invoice.seller, "seller", &mut errors);
    if invoice.seller.tax_id.as_deref().is_none_or(|id| id.trim().is_empty()) {
        errors.push(ValidationError::with_rule(
            "seller.taxId",
            "seller must have a tax id (NCC)",
            "PARTY-02",
        ));
    }

    validate_party(&invoice.buyer, "buyer", &mut errors);
    if invoice.template.requires_buyer_tax_id()
        && invoice.buyer.tax_id.as_deref().is_none_or(|id| id.trim().is_empty())
    {
        errors.push(ValidationError::with_rule(
            "buyer.taxId",
            format!(
                "buyer tax id (NCC) is required for {:?} invoices",
                invoice.template
            ),
            "PARTY-03",
        ));
    }

    if invoice.template == InvoiceTemplate::B2F {
        match &invoice.foreign_currency {
            Some(code) => validate_currency(code, "foreignCurrency", &mut errors),
            None => errors.push(ValidationError::with_rule(
                "foreignCurrency",
                "foreign currency is required for B2F invoices",
                "B2F-01",
            )),
        }
        if invoice
            .foreign_currency_rate
            .is_none_or(|rate| rate <= Decimal::ZERO)
        {
            errors.push(ValidationError::with_rule(
                "foreignCurrencyRate",
                "a positive exchange rate is required for B2F invoices",
                "B2F-02",
            ));
        }
    }

    if invoice.lines.is_empty() {
        errors.push(ValidationError::with_rule(
            "lines",
            "invoice must have at least one line",
            "INV-03",
        ));
    } else if invoice.lines.len() > MAX_LINES {
        errors.push(ValidationError::with_rule(
            "lines",
            format!("invoice cannot have more than {MAX_LINES} lines"),
            "INV-03",
        ));
    }

    let errors_before_lines = errors.len();
    for (i, line) in invoice.lines.iter().enumerate() {
        validate_line(line, &format!("lines[{i}]"), &mut errors);
    }

    // Totals are only comparable once every line is valid.
    if errors.len() == errors_before_lines {
        errors.extend(validate_arithmetic(invoice));
    }

    errors
}

/// Check that the submission's totals are the ones its lines produce.
pub fn validate_arithmetic(invoice: &InvoiceSubmission) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let totals = &invoice.totals;

    let expected_amount = totals
        .subtotal
        .checked_sub(totals.total_discount)
        .and_then(|v| v.checked_add(totals.total_vat));
    if expected_amount != Some(totals.total_amount) {
        errors.push(ValidationError::with_rule(
            "totals.totalAmount",
            format!(
                "total amount {} does not match subtotal {} - discount {} + VAT {}",
                totals.total_amount, totals.subtotal, totals.total_discount, totals.total_vat
            ),
            "TOT-01",
        ));
    }

    match invoice_totals(&invoice.lines) {
        Ok(expected) if expected != *totals => {
            errors.push(ValidationError::with_rule(
                "totals",
                format!(
                    "totals do not match lines: expected subtotal {}, discount {}, VAT {}, total {}",
                    expected.subtotal,
                    expected.total_discount,
                    expected.total_vat,
                    expected.total_amount
                ),
                "TOT-02",
            ));
        }
        Ok(_) => {}
        Err(InvoiceError::Validation(line_errors)) => errors.extend(line_errors),
        Err(e) => errors.push(ValidationError::with_rule("totals", e.to_string(), "TOT-03")),
    }

    errors
}

/// Validate a single line, pushing errors with field paths under `prefix`.
pub fn validate_line(line: &InvoiceLine, prefix: &str, errors: &mut Vec<ValidationError>) {
    if line.description.trim().is_empty() {
        errors.push(ValidationError::with_rule(
            format!("{prefix}.description"),
            "description must not be empty",
            "LINE-01",
        ));
    }

    if line.quantity <= Decimal::ZERO {
        errors.push(ValidationError::with_rule(
            format!("{prefix}.quantity"),
            "quantity must be greater than zero",
            "LINE-02",
        ));
    }

    if line.unit_price < Decimal::ZERO {
        errors.push(ValidationError::with_rule(
            format!("{prefix}.unitPrice"),
            "unit price must not be negative",
            "LINE-03",
        ));
    }

    if line.vat_rate_percent < Decimal::ZERO || line.vat_rate_percent > dec!(100) {
        errors.push(ValidationError::with_rule(
            format!("{prefix}.vatRatePercent"),
            format!(
                "VAT rate {} must be between 0 and 100",
                line.vat_rate_percent
            ),
            "LINE-04",
        ));
    }

    if line.discount_amount < Decimal::ZERO {
        errors.push(ValidationError::with_rule(
            format!("{prefix}.discountAmount"),
            "discount must not be negative",
            "LINE-05",
        ));
        return;
    }

    match line.gross_amount() {
        None => errors.push(ValidationError::with_rule(
            format!("{prefix}.quantity"),
            "quantity * unit price exceeds the supported range",
            "LINE-06",
        )),
        Some(gross) if line.discount_amount > gross => {
            errors.push(ValidationError::with_rule(
                format!("{prefix}.discountAmount"),
                format!(
                    "discount {} exceeds quantity * unit price {}",
                    line.discount_amount, gross
                ),
                "LINE-05",
            ));
        }
        Some(_) => {}
    }
}

fn validate_party(party: &Party, prefix: &str, errors: &mut Vec<ValidationError>) {
    if party.name.trim().is_empty() {
        errors.push(ValidationError::with_rule(
            format!("{prefix}.name"),
            "name must not be empty",
            "PARTY-01",
        ));
    }

    if let Some(email) = &party.email {
        if !email.contains('@') {
            errors.push(ValidationError::with_rule(
                format!("{prefix}.email"),
                format!("'{email}' is not an email address"),
                "PARTY-04",
            ));
        }
    }
}

fn validate_currency(code: &str, field: &str, errors: &mut Vec<ValidationError>) {
    if code.len() != 3 {
        errors.push(ValidationError::with_rule(
            field,
            "currency code must be 3 characters (ISO 4217)",
            "INV-02",
        ));
    } else if !is_known_currency_code(code) {
        errors.push(ValidationError::with_rule(
            field,
            format!("currency code '{code}' is not a known ISO 4217 code"),
            "INV-02",
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line() -> InvoiceLine {
        InvoiceLine {
            description: "Riz 25kg".into(),
            quantity: dec!(4),
            unit_price: dec!(12500),
            vat_rate_percent: dec!(18),
            discount_amount: dec!(0),
            reference: None,
            measurement_unit: Some("sac".into()),
        }
    }

    fn check(l: &InvoiceLine) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        validate_line(l, "lines[0]", &mut errors);
        errors
    }

    #[test]
    fn valid_line_has_no_errors() {
        assert!(check(&line()).is_empty());
    }

    #[test]
    fn every_line_field_reported() {
        let l = InvoiceLine {
            description: "  ".into(),
            quantity: dec!(-1),
            unit_price: dec!(-5),
            vat_rate_percent: dec!(120),
            discount_amount: dec!(-3),
            ..line()
        };
        let fields: Vec<_> = check(&l).into_iter().map(|e| e.field).collect();
        assert_eq!(
            fields,
            vec![
                "lines[0].description",
                "lines[0].quantity",
                "lines[0].unitPrice",
                "lines[0].vatRatePercent",
                "lines[0].discountAmount",
            ]
        );
    }

    #[test]
    fn rate_bounds_are_inclusive() {
        let zero = InvoiceLine {
            vat_rate_percent: dec!(0),
            ..line()
        };
        let hundred = InvoiceLine {
            vat_rate_percent: dec!(100),
            ..line()
        };
        assert!(check(&zero).is_empty());
        assert!(check(&hundred).is_empty());
    }

    #[test]
    fn free_item_is_valid() {
        let l = InvoiceLine {
            unit_price: dec!(0),
            ..line()
        };
        assert!(check(&l).is_empty());
    }
}
