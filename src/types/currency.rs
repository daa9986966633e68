//! Currency code to display symbol mapping.

/// Known currency codes and their display symbols.
pub const CURRENCY_SYMBOLS: &[(&str, &str)] = &[
    ("CNY", "¥"),
    ("RMB", "¥"),
    ("USD", "$"),
    ("EUR", "€"),
    ("GBP", "£"),
    ("JPY", "¥"),
    ("HKD", "HK$"),
    ("SGD", "S$"),
    ("AUD", "A$"),
    ("CAD", "C$"),
    ("KRW", "₩"),
    ("RUB", "₽"),
    ("INR", "₹"),
];

/// Map a currency code to its symbol, returning the code itself when unmapped.
pub fn currency_symbol(code: &str) -> &str {
    CURRENCY_SYMBOLS
        .iter()
        .find(|(c, _)| *c == code)
        .map_or(code, |(_, symbol)| symbol)
}
