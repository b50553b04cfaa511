//! Submit an invoice to a certification endpoint, then fetch it back.
//!
//! Requires `FNE_BASE_URL` and `FNE_TOKEN`; `FNE_TIMEOUT_SECS` is optional.
//! Run with: `RUST_LOG=fne=debug cargo run --example submit_invoice --features client`

use chrono::Utc;
use fne::client::*;
use fne::core::*;
use rust_decimal_macros::dec;
use tracing_subscriber::EnvFilter;

const MAX_ATTEMPTS: u32 = 5;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let client = FneClient::new(ClientConfig::from_env()?, Session::from_env()?)?;
    if !client.health_check().await? {
        eprintln!("certification service is unavailable");
        return Ok(());
    }

    let invoice = SubmissionBuilder::new("INV-2025-000001", Utc::now())
        .template(InvoiceTemplate::B2B)
        .seller(PartyBuilder::new("Oxalio SARL").tax_id("CI1234567A").build())
        .buyer(PartyBuilder::new("Kone Distribution").tax_id("CI7654321B").build())
        .add_line(
            InvoiceLineBuilder::new("Ciment 50kg", dec!(2), dec!(5000))
                .tax_code(TaxCode::Tva)
                .build(),
        )
        .payment_mode(PaymentMode::Mobile)
        .build()?;

    // Keep the key with the draft: a retry after a timeout must reuse it.
    let key = IdempotencyKey::generate();
    let mut attempt = 1;
    let submitted = loop {
        match client.submit_invoice(&invoice, &key).await {
            Ok(submitted) => break submitted,
            Err(e) if e.is_retryable() && attempt < MAX_ATTEMPTS => {
                eprintln!(
                    "{}; retrying with key {key} ({attempt}/{MAX_ATTEMPTS})",
                    e.user_message()
                );
                attempt += 1;
                tokio::time::sleep(std::time::Duration::from_secs(2)).await;
            }
            Err(e) => {
                eprintln!("{}", e.user_message());
                return Err(e.into());
            }
        }
    };
    println!("{} -> {}", submitted.reference(), submitted.status());

    let signed = client.get_invoice(submitted.reference()).await?;
    println!(
        "total {} {} (signature present: {})",
        signed.invoice.totals.total_amount,
        signed.invoice.currency,
        signed.signature.is_some()
    );
    Ok(())
}
