//! Line and invoice totals.
//!
//! VAT is charged on the discounted base of each line:
//! `(quantity * unit_price - discount_amount) * vat_rate_percent / 100`.
//! Rounding to 2 decimal places (half-up) happens once per output value,
//! never on intermediate sums.

use std::collections::BTreeMap;

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::error::{InvoiceError, ValidationError};
use super::types::{InvoiceLine, InvoiceTotals};
use super::validation::validate_line;

/// VAT owed on a single line, rounded to 2 decimal places.
///
/// Fails with [`InvoiceError::Validation`] when the line is invalid, most
/// notably when the discount exceeds `quantity * unit_price`.
pub fn line_vat(line: &InvoiceLine) -> Result<Decimal, InvoiceError> {
    check_line(line)?;
    Ok(round_half_up(raw_line_vat(line)?))
}

/// Line total including VAT: `quantity * unit_price - discount + vat`.
///
/// Each term is rounded before they are combined, so the result equals
/// [`invoice_totals`] of the single line.
pub fn line_total(line: &InvoiceLine) -> Result<Decimal, InvoiceError> {
    check_line(line)?;
    let gross = line
        .gross_amount()
        .ok_or_else(|| overflow("quantity * unitPrice"))?;
    let vat = raw_line_vat(line)?;
    round_half_up(gross)
        .checked_sub(round_half_up(line.discount_amount))
        .and_then(|v| v.checked_add(round_half_up(vat)))
        .ok_or_else(|| overflow("line total"))
}

/// Aggregate totals for a list of lines.
///
/// An empty list yields all-zero totals. Every invalid line is reported,
/// not just the first.
///
/// ```
/// use fne::core::*;
/// use rust_decimal_macros::dec;
///
/// let lines = vec![
///     InvoiceLineBuilder::new("Ciment", dec!(2), dec!(5000)).vat_rate(dec!(18)).build(),
///     InvoiceLineBuilder::new("Sable", dec!(1), dec!(10000))
///         .vat_rate(dec!(9))
///         .discount(dec!(1000))
///         .build(),
/// ];
/// let totals = invoice_totals(&lines).unwrap();
/// assert_eq!(totals.subtotal, dec!(20000));
/// assert_eq!(totals.total_discount, dec!(1000));
/// assert_eq!(totals.total_vat, dec!(2610));
/// assert_eq!(totals.total_amount, dec!(21610));
/// ```
pub fn invoice_totals(lines: &[InvoiceLine]) -> Result<InvoiceTotals, InvoiceError> {
    let mut errors = Vec::new();
    for (i, line) in lines.iter().enumerate() {
        validate_line(line, &format!("lines[{i}]"), &mut errors);
    }
    if !errors.is_empty() {
        return Err(InvoiceError::Validation(errors));
    }

    let mut subtotal = Decimal::ZERO;
    let mut total_discount = Decimal::ZERO;
    let mut total_vat = Decimal::ZERO;

    for line in lines {
        let gross = line
            .gross_amount()
            .ok_or_else(|| overflow("quantity * unitPrice"))?;
        subtotal = subtotal
            .checked_add(gross)
            .ok_or_else(|| overflow("subtotal"))?;
        total_discount = total_discount
            .checked_add(line.discount_amount)
            .ok_or_else(|| overflow("totalDiscount"))?;
        total_vat = total_vat
            .checked_add(raw_line_vat(line)?)
            .ok_or_else(|| overflow("totalVat"))?;
    }

    let subtotal = round_half_up(subtotal);
    let total_discount = round_half_up(total_discount);
    let total_vat = round_half_up(total_vat);

    // Recombining rounded aggregates keeps the total invariant exact.
    let total_amount = (subtotal - total_discount)
        .checked_add(total_vat)
        .ok_or_else(|| overflow("totalAmount"))?;

    Ok(InvoiceTotals {
        subtotal,
        total_vat,
        total_discount,
        total_amount,
    })
}

/// Taxable base and VAT grouped by rate, for invoice previews.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VatRateBreakdown {
    #[serde(with = "rust_decimal::serde::float")]
    pub rate_percent: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub taxable_amount: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub vat_amount: Decimal,
}

/// Group lines by VAT rate, sorted by ascending rate.
///
/// Each group is rounded on its own, so the group VAT amounts may differ from
/// [`InvoiceTotals::total_vat`] by a cent per group. Use it for display only.
pub fn vat_breakdown(lines: &[InvoiceLine]) -> Result<Vec<VatRateBreakdown>, InvoiceError> {
    let mut errors = Vec::new();
    for (i, line) in lines.iter().enumerate() {
        validate_line(line, &format!("lines[{i}]"), &mut errors);
    }
    if !errors.is_empty() {
        return Err(InvoiceError::Validation(errors));
    }

    // Keyed on the normalized rate so that 18 and 18.00 share a group.
    let mut groups: BTreeMap<Decimal, (Decimal, Decimal)> = BTreeMap::new();
    for line in lines {
        let entry = groups
            .entry(line.vat_rate_percent.normalize())
            .or_insert((Decimal::ZERO, Decimal::ZERO));
        entry.0 = entry
            .0
            .checked_add(taxable(line)?)
            .ok_or_else(|| overflow("taxable amount"))?;
        entry.1 = entry
            .1
            .checked_add(raw_line_vat(line)?)
            .ok_or_else(|| overflow("vat amount"))?;
    }

    Ok(groups
        .into_iter()
        .map(|(rate, (base, vat))| VatRateBreakdown {
            rate_percent: rate,
            taxable_amount: round_half_up(base),
            vat_amount: round_half_up(vat),
        })
        .collect())
}

/// Round a Decimal to 2 decimal places using half-up (commercial rounding).
pub fn round_half_up(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

fn check_line(line: &InvoiceLine) -> Result<(), InvoiceError> {
    let mut errors = Vec::new();
    validate_line(line, "line", &mut errors);
    if errors.is_empty() {
        Ok(())
    } else {
        Err(InvoiceError::Validation(errors))
    }
}

fn taxable(line: &InvoiceLine) -> Result<Decimal, InvoiceError> {
    line.taxable_amount()
        .ok_or_else(|| overflow("quantity * unitPrice"))
}

/// Unrounded line VAT. Callers must have validated the line.
fn raw_line_vat(line: &InvoiceLine) -> Result<Decimal, InvoiceError> {
    taxable(line)?
        .checked_mul(line.vat_rate_percent)
        .and_then(|v| v.checked_div(dec!(100)))
        .ok_or_else(|| overflow("line VAT"))
}

fn overflow(what: &str) -> InvoiceError {
    InvoiceError::Arithmetic(format!("decimal overflow computing {what}"))
}
