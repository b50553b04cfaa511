use chrono::{DateTime, Datelike, Utc};

use super::error::InvoiceError;

/// Yearly invoice number sequence.
///
/// Numbers look like `INV-2025-000001`: prefix, issue year, then a counter
/// that restarts at 1 every year. Invoice numbers are caller-assigned and
/// must be unique per tenant, so keep one sequence per tenant.
#[derive(Debug, Clone)]
pub struct InvoiceNumberSequence {
    prefix: String,
    year: i32,
    next: u64,
    width: usize,
}

impl InvoiceNumberSequence {
    /// Default prefix.
    pub const DEFAULT_PREFIX: &'static str = "INV-";

    /// Create a sequence starting at 1, padded to 6 digits.
    pub fn new(prefix: impl Into<String>, year: i32) -> Self {
        Self::starting_at(prefix, year, 1)
    }

    /// Resume a sequence whose next counter value is `next`.
    pub fn starting_at(prefix: impl Into<String>, year: i32, next: u64) -> Self {
        Self {
            prefix: prefix.into(),
            year,
            next,
            width: 6,
        }
    }

    /// Set zero-padding width.
    pub fn with_padding(mut self, width: usize) -> Self {
        self.width = width;
        self
    }

    /// Issue the next number in the current year.
    pub fn next_number(&mut self) -> String {
        let number = self.format(self.next);
        self.next += 1;
        number
    }

    /// Issue the next number for an invoice dated `issue_date`, rolling the
    /// sequence over first if the date falls in a later year.
    pub fn next_for(&mut self, issue_date: DateTime<Utc>) -> String {
        self.auto_advance(issue_date);
        self.next_number()
    }

    /// Preview the next number without consuming it.
    pub fn peek(&self) -> String {
        self.format(self.next)
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    /// Next raw counter value.
    pub fn next_raw(&self) -> u64 {
        self.next
    }

    /// Move to a later year, restarting the counter at 1.
    pub fn advance_year(&mut self, new_year: i32) -> Result<(), InvoiceError> {
        if new_year <= self.year {
            return Err(InvoiceError::Numbering(format!(
                "new year {new_year} must be greater than current year {}",
                self.year
            )));
        }
        self.year = new_year;
        self.next = 1;
        Ok(())
    }

    /// Roll over if `date` is in a later year. Returns true if it did.
    pub fn auto_advance(&mut self, date: DateTime<Utc>) -> bool {
        self.advance_year(date.year()).is_ok()
    }

    fn format(&self, n: u64) -> String {
        format!("{}{}-{:0>width$}", self.prefix, self.year, n, width = self.width)
    }
}
