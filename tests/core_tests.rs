use chrono::{DateTime, TimeZone, Utc};
use fne::core::*;
use rust_decimal_macros::dec;

fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, 10, 30, 0).unwrap()
}

fn seller() -> Party {
    PartyBuilder::new("Oxalio SARL")
        .tax_id("CI1234567A")
        .address("Plateau, Abidjan")
        .email("facturation@oxalio.ci")
        .phone("+225 27 20 00 00 00")
        .build()
}

fn buyer() -> Party {
    PartyBuilder::new("Kone Distribution")
        .tax_id("CI7654321B")
        .build()
}

fn b2b_invoice() -> InvoiceSubmission {
    SubmissionBuilder::new("INV-2025-000001", at(2025, 3, 1))
        .template(InvoiceTemplate::B2B)
        .seller(seller())
        .buyer(buyer())
        .add_line(
            InvoiceLineBuilder::new("Ciment 50kg", dec!(2), dec!(5000))
                .tax_code(TaxCode::Tva)
                .measurement_unit("sac")
                .build(),
        )
        .add_line(
            InvoiceLineBuilder::new("Sable", dec!(1), dec!(10000))
                .tax_code(TaxCode::Tvab)
                .discount(dec!(1000))
                .build(),
        )
        .payment_mode(PaymentMode::Transfer)
        .build()
        .unwrap()
}

// --- Builder ---

#[test]
fn builder_computes_totals() {
    let inv = b2b_invoice();
    assert_eq!(inv.currency, "XOF");
    assert_eq!(inv.invoice_type, InvoiceType::Standard);
    assert_eq!(
        inv.totals,
        InvoiceTotals {
            subtotal: dec!(20000),
            total_vat: dec!(2610),
            total_discount: dec!(1000),
            total_amount: dec!(21610),
        }
    );
}

#[test]
fn builder_requires_parties() {
    let err = SubmissionBuilder::new("INV-1", at(2025, 1, 1))
        .seller(seller())
        .add_line(InvoiceLineBuilder::new("x", dec!(1), dec!(1)).build())
        .build()
        .unwrap_err();
    assert!(matches!(err, InvoiceError::Builder(ref m) if m.contains("buyer")));
}

#[test]
fn build_reports_invalid_lines() {
    let err = SubmissionBuilder::new("INV-1", at(2025, 1, 1))
        .seller(seller())
        .buyer(buyer())
        .add_line(
            InvoiceLineBuilder::new("Sable", dec!(1), dec!(100))
                .discount(dec!(150))
                .build(),
        )
        .build()
        .unwrap_err();
    let fields: Vec<_> = err
        .validation_errors()
        .iter()
        .map(|e| e.field.as_str())
        .collect();
    assert_eq!(fields, ["lines[0].discountAmount"]);
}

#[test]
fn build_unchecked_skips_validation() {
    let inv = SubmissionBuilder::new("", at(2025, 1, 1))
        .seller(PartyBuilder::new("").build())
        .buyer(buyer())
        .build_unchecked()
        .unwrap();
    assert!(inv.lines.is_empty());
    assert_eq!(inv.totals, InvoiceTotals::ZERO);
    assert!(!validate_submission(&inv).is_empty());
}

#[test]
fn line_builder_defaults_to_standard_rate() {
    let line = InvoiceLineBuilder::new("Riz", dec!(1), dec!(100)).build();
    assert_eq!(line.vat_rate_percent, dec!(18));
    assert_eq!(line.discount_amount, dec!(0));
}

#[test]
fn metadata_only_set_when_present() {
    assert!(b2b_invoice().metadata.is_none());

    let inv = SubmissionBuilder::new("INV-2", at(2025, 1, 1))
        .seller(seller())
        .buyer(buyer())
        .add_line(InvoiceLineBuilder::new("Riz", dec!(1), dec!(100)).build())
        .metadata("storeId", "ABJ-03")
        .notes("Livraison incluse")
        .build()
        .unwrap();
    assert_eq!(inv.metadata.unwrap()["storeId"], "ABJ-03");
    assert_eq!(inv.notes.as_deref(), Some("Livraison incluse"));
}

#[test]
fn credit_note_copies_original() {
    let original = b2b_invoice();
    let credit = SubmissionBuilder::credit_note(&original, "AV-2025-000001", at(2025, 3, 5))
        .build()
        .unwrap();
    assert_eq!(credit.invoice_type, InvoiceType::CreditNote);
    assert_eq!(credit.invoice_number, "AV-2025-000001");
    assert_eq!(credit.seller, original.seller);
    assert_eq!(credit.buyer, original.buyer);
    assert_eq!(credit.lines, original.lines);
    assert_eq!(credit.totals, original.totals);
}

#[test]
fn b2f_invoice_with_exchange_rate() {
    let inv = SubmissionBuilder::new("INV-3", at(2025, 1, 1))
        .template(InvoiceTemplate::B2F)
        .seller(seller())
        .buyer(PartyBuilder::new("Dupont SAS").build())
        .foreign_currency("EUR", dec!(655.957))
        .add_line(
            InvoiceLineBuilder::new("Cacao", dec!(10), dec!(2000))
                .tax_code(TaxCode::Tvad)
                .build(),
        )
        .build()
        .unwrap();
    assert_eq!(inv.totals.total_vat, dec!(0));
    assert_eq!(inv.totals.total_amount, dec!(20000));
}

// --- Tax codes and status ---

#[test]
fn tax_code_rates() {
    assert_eq!(TaxCode::Tva.rate(), dec!(18));
    assert_eq!(TaxCode::Tvab.rate(), dec!(9));
    assert_eq!(TaxCode::Tvac.rate(), dec!(0));
    assert_eq!(TaxCode::from_code("TVAD"), Some(TaxCode::Tvad));
    assert_eq!(TaxCode::from_code("VAT"), None);
    for code in [TaxCode::Tva, TaxCode::Tvab, TaxCode::Tvac, TaxCode::Tvad] {
        assert_eq!(TaxCode::from_code(code.code()), Some(code));
    }
}

#[test]
fn status_transitions() {
    use InvoiceStatus::*;
    assert!(Received.can_transition_to(Validating));
    assert!(Validating.can_transition_to(Rejected));
    assert!(Accepted.can_transition_to(Signed));
    assert!(Signed.can_transition_to(Cancelled));
    assert!(Signed.can_transition_to(Credited));

    assert!(!Cancelled.can_transition_to(Signed));
    assert!(!Rejected.can_transition_to(Accepted));
    assert!(!Received.can_transition_to(Signed));
    assert!(!Credited.can_transition_to(Cancelled));

    assert!(Accepted.can_cancel());
    assert!(!Cancelled.can_cancel());
    assert!(Signed.can_credit());
    assert!(!Accepted.can_credit());
    assert!(Rejected.is_terminal());
}

// --- Numbering ---

#[test]
fn numbering_resets_each_year() {
    let mut seq = InvoiceNumberSequence::new(InvoiceNumberSequence::DEFAULT_PREFIX, 2025);
    assert_eq!(seq.next_for(at(2025, 12, 31)), "INV-2025-000001");
    assert_eq!(seq.next_for(at(2025, 12, 31)), "INV-2025-000002");
    assert_eq!(seq.next_for(at(2026, 1, 1)), "INV-2026-000001");
    assert!(seq.advance_year(2025).is_err());
}

// --- Serialization ---

#[test]
fn submission_serializes_camel_case() {
    let json = serde_json::to_value(b2b_invoice()).unwrap();
    assert_eq!(json["invoiceNumber"], "INV-2025-000001");
    assert_eq!(json["invoiceType"], "STANDARD");
    assert_eq!(json["template"], "B2B");
    assert_eq!(json["paymentMode"], "TRANSFER");
    assert_eq!(json["seller"]["companyName"], "Oxalio SARL");
    assert_eq!(json["seller"]["taxId"], "CI1234567A");
    assert_eq!(json["lines"][1]["discountAmount"].as_f64(), Some(1000.0));
    assert_eq!(json["totals"]["totalAmount"].as_f64(), Some(21610.0));
    assert!(json.get("foreignCurrency").is_none());
}

#[test]
fn signed_invoice_decodes_flattened() {
    let json = r#"{
        "reference": "FNE-2025-0000042",
        "status": "SIGNED",
        "signature": "MEUCIQ...",
        "qrCode": "iVBORw0KGgo=",
        "processedAt": "2025-03-01T10:31:02Z",
        "invoiceNumber": "INV-2025-000001",
        "issueDate": "2025-03-01T10:30:00Z",
        "currency": "XOF",
        "template": "B2C",
        "seller": {"taxId": "CI1234567A", "companyName": "Oxalio SARL"},
        "buyer": {"name": "Client comptoir"},
        "lines": [{"description": "Pain", "quantity": 3, "unitPrice": 150, "vatRatePercent": 18}],
        "totals": {"subtotal": 450, "totalVat": 81, "totalDiscount": 0, "totalAmount": 531}
    }"#;
    let signed: SignedInvoice = serde_json::from_str(json).unwrap();
    assert_eq!(signed.reference, "FNE-2025-0000042");
    assert_eq!(signed.status, InvoiceStatus::Signed);
    assert_eq!(signed.invoice.buyer.name, "Client comptoir");
    assert_eq!(signed.invoice.payment_mode, PaymentMode::Cash);
    assert_eq!(signed.invoice.lines[0].discount_amount, dec!(0));
    assert_eq!(signed.invoice.totals.total_amount, dec!(531));
    assert_eq!(
        invoice_totals(&signed.invoice.lines).unwrap(),
        signed.invoice.totals
    );
}

#[test]
fn currency_codes() {
    assert!(is_known_currency_code("XOF"));
    assert!(is_known_currency_code("EUR"));
    assert!(!is_known_currency_code("ABC"));
}
