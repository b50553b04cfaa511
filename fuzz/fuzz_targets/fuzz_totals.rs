#![no_main]

use arbitrary::Arbitrary;
use fne::core::*;
use libfuzzer_sys::fuzz_target;
use rust_decimal::Decimal;

#[derive(Debug, Arbitrary)]
struct RawLine {
    quantity: (i64, u8),
    unit_price: (i64, u8),
    rate: (i64, u8),
    discount: (i64, u8),
}

fn decimal((mantissa, scale): (i64, u8)) -> Decimal {
    Decimal::new(mantissa, u32::from(scale % 29))
}

fuzz_target!(|raw: Vec<RawLine>| {
    let lines: Vec<InvoiceLine> = raw
        .into_iter()
        .map(|r| {
            InvoiceLineBuilder::new("x", decimal(r.quantity), decimal(r.unit_price))
                .vat_rate(decimal(r.rate))
                .discount(decimal(r.discount))
                .build()
        })
        .collect();

    // Invalid input must surface as an error, never a panic.
    if let Ok(totals) = invoice_totals(&lines) {
        assert_eq!(
            totals.total_amount,
            totals.subtotal - totals.total_discount + totals.total_vat
        );
    }
    let _ = vat_breakdown(&lines);
    for line in &lines {
        let _ = line_total(line);
    }
});
