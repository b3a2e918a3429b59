//! Locale-aware money and percentage formatting for display.

/// Locale used when the caller does not pass one.
pub const DEFAULT_LOCALE: &str = "en-US";

/// Currency used when the caller does not pass one.
pub const DEFAULT_CURRENCY: &str = "USD";

/// Decimal places used by `format_percentage` by default.
pub const DEFAULT_PERCENTAGE_DECIMALS: usize = 1;

const NBSP: char = '\u{a0}';

/// Number formatting conventions of one locale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocaleFormat {
    pub decimal_separator: char,
    pub grouping_separator: char,
    /// `true` renders "$1.00", `false` renders "1,00 €"
    pub symbol_first: bool,
}

impl LocaleFormat {
    /// Conventions for a BCP 47 tag. Unknown tags use en-US conventions.
    pub fn for_locale(locale: &str) -> Self {
        match locale {
            "de-DE" | "es-ES" | "it-IT" | "nl-NL" => Self {
                decimal_separator: ',',
                grouping_separator: '.',
                symbol_first: false,
            },
            "fr-FR" | "pl-PL" => Self {
                decimal_separator: ',',
                grouping_separator: NBSP,
                symbol_first: false,
            },
            _ => Self {
                decimal_separator: '.',
                grouping_separator: ',',
                symbol_first: true,
            },
        }
    }
}

/// Format a monetary amount, e.g. `format_currency(1234.5, "en-US", "USD")`
/// gives `"$1,234.50"` and `format_currency(1234.5, "de-DE", "EUR")` gives
/// `"1.234,50 €"` (non-breaking space before the symbol).
pub fn format_currency(amount: f64, locale: &str, currency: &str) -> String {
    let code = currency.trim().to_uppercase();
    let conventions = LocaleFormat::for_locale(locale);
    let body = format_number(amount.abs(), minor_units_for(&code), &conventions);
    // "-$0.00" is never shown: the sign needs a non-zero digit after rounding.
    let sign = if amount < 0.0 && body.chars().any(|c| matches!(c, '1'..='9')) {
        "-"
    } else {
        ""
    };

    match (symbol_for(&code), conventions.symbol_first) {
        (Some(symbol), true) => format!("{sign}{symbol}{body}"),
        (None, true) => format!("{sign}{code}{NBSP}{body}"),
        (Some(symbol), false) => format!("{sign}{body}{NBSP}{symbol}"),
        (None, false) => format!("{sign}{body}{NBSP}{code}"),
    }
}

/// `format_currency` with the default locale and currency.
pub fn format_usd(amount: f64) -> String {
    format_currency(amount, DEFAULT_LOCALE, DEFAULT_CURRENCY)
}

/// Format a percentage with a fixed number of decimals: `12.345` → `"12.3%"`.
pub fn format_percentage(percentage: f64, decimals: usize) -> String {
    format!("{percentage:.decimals$}%")
}

fn format_number(value: f64, precision: usize, conventions: &LocaleFormat) -> String {
    let fixed = format!("{value:.precision$}");
    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (fixed.as_str(), None),
    };

    let grouped = group_digits(int_part, conventions.grouping_separator);
    match frac_part {
        Some(frac) => format!("{grouped}{}{frac}", conventions.decimal_separator),
        None => grouped,
    }
}

fn group_digits(digits: &str, separator: char) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i != 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(separator);
        }
        grouped.push(ch);
    }
    grouped
}

fn symbol_for(code: &str) -> Option<&'static str> {
    match code {
        "USD" => Some("$"),
        "EUR" => Some("€"),
        "GBP" => Some("£"),
        "JPY" => Some("¥"),
        "PLN" => Some("zł"),
        "INR" => Some("₹"),
        _ => None,
    }
}

fn minor_units_for(code: &str) -> usize {
    match code {
        "JPY" | "KRW" => 0,
        _ => 2,
    }
}
