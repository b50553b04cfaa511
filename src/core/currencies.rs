//! ISO 4217 currency code lookup.
//!
//! Invoices are normally issued in CFA francs (XOF); the list also covers
//! the currencies B2F invoices are commonly priced in.

/// Check whether `code` is a known ISO 4217 currency code.
pub fn is_known_currency_code(code: &str) -> bool {
    CURRENCY_CODES.binary_search(&code).is_ok()
}

/// Sorted for binary search.
static CURRENCY_CODES: &[&str] = &[
    "AED", // UAE Dirham
    "AOA", // Angolan Kwanza
    "AUD", // Australian Dollar
    "BRL", // Brazilian Real
    "CAD", // Canadian Dollar
    "CDF", // Congolese Franc
    "CHF", // Swiss Franc
    "CNY", // Chinese Yuan
    "CVE", // Cape Verdean Escudo
    "DKK", // Danish Krone
    "DZD", // Algerian Dinar
    "EGP", // Egyptian Pound
    "ETB", // Ethiopian Birr
    "EUR", // Euro
    "GBP", // Pound Sterling
    "GHS", // Ghanaian Cedi
    "GMD", // Gambian Dalasi
    "GNF", // Guinean Franc
    "HKD", // Hong Kong Dollar
    "INR", // Indian Rupee
    "JPY", // Japanese Yen
    "KES", // Kenyan Shilling
    "KRW", // South Korean Won
    "LBP", // Lebanese Pound
    "LRD", // Liberian Dollar
    "MAD", // Moroccan Dirham
    "MGA", // Malagasy Ariary
    "MRU", // Mauritanian Ouguiya
    "MUR", // Mauritian Rupee
    "NGN", // Nigerian Naira
    "NOK", // Norwegian Krone
    "QAR", // Qatari Riyal
    "RUB", // Russian Ruble
    "RWF", // Rwandan Franc
    "SAR", // Saudi Riyal
    "SEK", // Swedish Krona
    "SGD", // Singapore Dollar
    "SLE", // Sierra Leonean Leone
    "TND", // Tunisian Dinar
    "TRY", // Turkish Lira
    "TZS", // Tanzanian Shilling
    "UGX", // Ugandan Shilling
    "USD", // US Dollar
    "XAF", // CFA Franc BEAC
    "XOF", // CFA Franc BCEAO
    "ZAR", // South African Rand
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_currencies() {
        assert!(is_known_currency_code("XOF"));
        assert!(is_known_currency_code("XAF"));
        assert!(is_known_currency_code("EUR"));
        assert!(is_known_currency_code("USD"));
        assert!(is_known_currency_code("GHS"));
    }

    #[test]
    fn unknown_currencies() {
        assert!(!is_known_currency_code("XYZ"));
        assert!(!is_known_currency_code(""));
        assert!(!is_known_currency_code("CFA"));
        assert!(!is_known_currency_code("xof"));
    }

    #[test]
    fn list_is_sorted() {
        for window in CURRENCY_CODES.windows(2) {
            assert!(
                window[0] < window[1],
                "currency codes not sorted: {} >= {}",
                window[0],
                window[1]
            );
        }
    }
}
