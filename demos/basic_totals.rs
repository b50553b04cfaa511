//! Compute line and invoice totals for a small B2C ticket.
//!
//! Run with: `cargo run --example basic_totals`

use fne::core::*;
use rust_decimal_macros::dec;

fn main() -> Result<(), InvoiceError> {
    let lines = vec![
        InvoiceLineBuilder::new("Ciment 50kg", dec!(2), dec!(5000))
            .tax_code(TaxCode::Tva)
            .measurement_unit("sac")
            .build(),
        InvoiceLineBuilder::new("Sable", dec!(1), dec!(10000))
            .tax_code(TaxCode::Tvab)
            .discount(dec!(1000))
            .build(),
        InvoiceLineBuilder::new("Livraison", dec!(1), dec!(2500))
            .tax_code(TaxCode::Tvac)
            .build(),
    ];

    for line in &lines {
        println!(
            "{:<12} {:>8} x {:>10}  VAT {:>8}  total {:>10}",
            line.description,
            line.quantity,
            line.unit_price,
            line_vat(line)?,
            line_total(line)?
        );
    }

    println!();
    for group in vat_breakdown(&lines)? {
        println!(
            "VAT {:>5}%  base {:>10}  VAT {:>8}",
            group.rate_percent, group.taxable_amount, group.vat_amount
        );
    }

    let totals = invoice_totals(&lines)?;
    println!();
    println!("Subtotal: {:>10} XOF", totals.subtotal);
    println!("Discount: {:>10} XOF", totals.total_discount);
    println!("VAT:      {:>10} XOF", totals.total_vat);
    println!("Total:    {:>10} XOF", totals.total_amount);
    Ok(())
}
