//! Show how every validation failure is reported at once.
//!
//! Run with: `cargo run --example validation`

use chrono::Utc;
use fne::core::*;
use rust_decimal_macros::dec;

fn main() {
    let mut numbers = InvoiceNumberSequence::new(InvoiceNumberSequence::DEFAULT_PREFIX, 2025);
    let now = Utc::now();

    let result = SubmissionBuilder::new(numbers.next_for(now), now)
        .template(InvoiceTemplate::B2B)
        .seller(PartyBuilder::new("Oxalio SARL").tax_id("CI1234567A").build())
        .buyer(
            PartyBuilder::new("Kone Distribution")
                .email("compta-kone.ci")
                .build(),
        )
        .add_line(InvoiceLineBuilder::new("", dec!(1), dec!(500)).build())
        .add_line(
            InvoiceLineBuilder::new("Sable", dec!(1), dec!(10000))
                .discount(dec!(12000))
                .build(),
        )
        .build();

    match result {
        Ok(invoice) => println!("{} is valid", invoice.invoice_number),
        Err(e) => {
            println!("{} problem(s):", e.validation_errors().len());
            for error in e.validation_errors() {
                println!("  {error}");
            }
        }
    }
}
