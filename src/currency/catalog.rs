//! Supported currencies and money formatting for presentation

use bigdecimal::{BigDecimal, Zero};
use serde::Serialize;

use crate::types::round_money;

/// A currency trips can record expenses in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SupportedCurrency {
    pub code: &'static str,
    pub name: &'static str,
    pub symbol: &'static str,
}

pub const SUPPORTED_CURRENCIES: &[SupportedCurrency] = &[
    SupportedCurrency { code: "USD", name: "US Dollar", symbol: "$" },
    SupportedCurrency { code: "EUR", name: "Euro", symbol: "€" },
    SupportedCurrency { code: "GBP", name: "British Pound", symbol: "£" },
    SupportedCurrency { code: "INR", name: "Indian Rupee", symbol: "₹" },
    SupportedCurrency { code: "AUD", name: "Australian Dollar", symbol: "A$" },
    SupportedCurrency { code: "JPY", name: "Japanese Yen", symbol: "¥" },
    SupportedCurrency { code: "SGD", name: "Singapore Dollar", symbol: "S$" },
    SupportedCurrency { code: "THB", name: "Thai Baht", symbol: "฿" },
    SupportedCurrency { code: "AED", name: "UAE Dirham", symbol: "د.إ" },
    SupportedCurrency { code: "CAD", name: "Canadian Dollar", symbol: "CA$" },
    SupportedCurrency { code: "CHF", name: "Swiss Franc", symbol: "Fr" },
    SupportedCurrency { code: "MYR", name: "Malaysian Ringgit", symbol: "RM" },
    SupportedCurrency { code: "IDR", name: "Indonesian Rupiah", symbol: "Rp" },
    SupportedCurrency { code: "VND", name: "Vietnamese Dong", symbol: "₫" },
    SupportedCurrency { code: "PHP", name: "Philippine Peso", symbol: "₱" },
];

/// Look up a supported currency by code
pub fn find_currency(code: &str) -> Option<&'static SupportedCurrency> {
    SUPPORTED_CURRENCIES.iter().find(|c| c.code == code)
}

/// Symbol for a currency code, or the code itself when unknown
pub fn currency_symbol(code: &str) -> &str {
    find_currency(code).map(|c| c.symbol).unwrap_or(code)
}

/// Format an amount for display, e.g. `-₹4,837.67`.
///
/// Rounds to `scale` decimals here and nowhere earlier.
pub fn format_money(amount: &BigDecimal, currency: &str, scale: i64) -> String {
    let rounded = round_money(amount, scale);
    let negative = rounded < BigDecimal::zero();
    let digits = rounded.abs().to_string();

    let (whole, fraction) = match digits.split_once('.') {
        Some((whole, fraction)) => (whole.to_string(), Some(fraction.to_string())),
        None => (digits, None),
    };

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (index, ch) in whole.chars().enumerate() {
        if index > 0 && (whole.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let mut out = String::new();
    if negative {
        out.push('-');
    }
    out.push_str(currency_symbol(currency));
    out.push_str(&grouped);
    if let Some(fraction) = fraction {
        out.push('.');
        out.push_str(&fraction);
    }
    out
}
