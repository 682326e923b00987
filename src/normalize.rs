use chrono::NaiveDateTime;

use crate::schema::NumberStyle;

/// Decimal places kept when unformatting money columns.
const MONEY_PRECISION: usize = 3;

/// Decimal separator convention for one currency. Grouping characters never
/// survive unformatting, so only the decimal separator is recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrencyLocale {
    pub code: &'static str,
    pub decimal: char,
}

const fn locale(code: &'static str, decimal: char) -> CurrencyLocale {
    CurrencyLocale { code, decimal }
}

const USD: CurrencyLocale = locale("USD", '.');

const LOCALES: &[CurrencyLocale] = &[
    USD,
    locale("CAD", '.'),
    locale("AUD", '.'),
    locale("NZD", '.'),
    locale("GBP", '.'),
    locale("INR", '.'),
    locale("JPY", '.'),
    locale("CNY", '.'),
    locale("HKD", '.'),
    locale("SGD", '.'),
    locale("MXN", '.'),
    locale("ILS", '.'),
    locale("CHF", '.'),
    locale("EUR", ','),
    locale("BRL", ','),
    locale("ARS", ','),
    locale("DKK", ','),
    locale("TRY", ','),
    locale("IDR", ','),
    locale("SEK", ','),
    locale("NOK", ','),
    locale("PLN", ','),
    locale("CZK", ','),
    locale("HUF", ','),
    locale("RUB", ','),
    locale("UAH", ','),
    locale("ZAR", '.'),
];

/// Look up separator conventions by ISO code; unknown codes get USD conventions.
pub fn currency_locale(currency: &str) -> CurrencyLocale {
    let code = currency.trim().to_ascii_uppercase();
    LOCALES
        .iter()
        .find(|l| l.code == code)
        .copied()
        .unwrap_or(USD)
}

/// Strip currency formatting from `raw` and render it with `precision` decimals.
///
/// Everything except digits, minus signs and the currency's decimal separator
/// is dropped, so symbols and grouping disappear. When what remains is not a
/// number, the cleaned text is returned as-is and fails the caller's parse.
pub fn unformat_number(raw: &str, precision: usize, currency: &str) -> String {
    let locale = currency_locale(currency);
    let cleaned: String = raw
        .chars()
        .filter_map(|c| match c {
            '0'..='9' | '-' => Some(c),
            c if c == locale.decimal => Some('.'),
            _ => None,
        })
        .collect();
    match cleaned.parse::<f64>() {
        Ok(value) => format!("{:.*}", precision, value),
        Err(_) => cleaned,
    }
}

/// Parse a money or quantity cell.
pub fn parse_amount(raw: &str, style: NumberStyle, currency: &str) -> Option<f64> {
    let value: f64 = match style {
        NumberStyle::Localized => unformat_number(raw, MONEY_PRECISION, currency).parse().ok()?,
        NumberStyle::Plain => raw.parse().ok()?,
    };
    value.is_finite().then_some(value)
}

/// Parse an odometer cell as a whole number.
pub fn parse_odometer(raw: &str, style: NumberStyle, currency: &str) -> Option<i64> {
    match style {
        NumberStyle::Localized => unformat_number(raw, 0, currency).parse().ok(),
        NumberStyle::Plain => raw.parse().ok(),
    }
}

/// Try each layout in order; the first that consumes the whole text wins.
///
/// The text must also fit the layout's exact shape, which chrono alone does
/// not enforce: `%Y` is four digits, `%m %d %M %S` are two, `%H %I` are one
/// or two, `%p` is `AM` or `PM`, and literals (spaces included) match once.
pub fn parse_datetime(text: &str, layouts: &[&str]) -> Option<NaiveDateTime> {
    layouts
        .iter()
        .filter(|layout| fits_layout(text, layout))
        .find_map(|layout| NaiveDateTime::parse_from_str(text, layout).ok())
}

fn fits_layout(text: &str, layout: &str) -> bool {
    let mut rest = text.as_bytes();
    let mut spec = layout.chars();
    while let Some(c) = spec.next() {
        let next = if c == '%' {
            match spec.next() {
                Some('Y') => digits(rest, 4, 4),
                Some('m' | 'd' | 'M' | 'S') => digits(rest, 2, 2),
                Some('H' | 'I') => digits(rest, 1, 2),
                Some('p') => rest.strip_prefix(b"AM").or_else(|| rest.strip_prefix(b"PM")),
                _ => None,
            }
        } else {
            let mut buf = [0; 4];
            rest.strip_prefix(c.encode_utf8(&mut buf).as_bytes())
        };
        match next {
            Some(r) => rest = r,
            None => return false,
        }
    }
    rest.is_empty()
}

/// Skip between `min` and `max` leading ASCII digits.
fn digits(text: &[u8], min: usize, max: usize) -> Option<&[u8]> {
    let n = text.iter().take(max).take_while(|b| b.is_ascii_digit()).count();
    (n >= min).then(|| &text[n..])
}
