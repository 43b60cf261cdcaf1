//! Formatting helpers (Telegram HTML escaping, prices).

/// Escape HTML special characters for Telegram HTML parse mode.
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Currency {
    Usd,
    Rub,
    None,
}

/// Format a price with two decimals and `,` thousand separators.
///
/// `$1,234.50` for USD, `1,234.50 ₽` for RUB, bare number otherwise.
pub fn format_price(value: f64, currency: Currency) -> String {
    let number = group_thousands(value);
    match currency {
        Currency::Usd => {
            if let Some(abs) = number.strip_prefix('-') {
                format!("-${abs}")
            } else {
                format!("${number}")
            }
        }
        Currency::Rub => format!("{number} ₽"),
        Currency::None => number,
    }
}

pub fn convert_usd_to_rub(price_usd: f64, rate: f64) -> f64 {
    price_usd * rate
}

pub fn convert_rub_to_usd(price_rub: f64, rate: f64) -> f64 {
    if rate <= 0.0 {
        return 0.0;
    }
    price_rub / rate
}

/// Round to cents (half away from zero).
pub fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn group_thousands(value: f64) -> String {
    let fixed = format!("{:.2}", value.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let digits = int_part.as_bytes();
    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, d) in digits.iter().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(*d as char);
    }

    let negative = value < 0.0 && fixed.bytes().any(|b| b.is_ascii_digit() && b != b'0');
    let sign = if negative { "-" } else { "" };
    format!("{sign}{grouped}.{frac_part}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_html() {
        assert_eq!(escape_html("<b>&\"x\"</b>"), "&lt;b&gt;&amp;&quot;x&quot;&lt;/b&gt;");
    }

    #[test]
    fn formats_prices_with_separators() {
        assert_eq!(format_price(1234.5, Currency::Usd), "$1,234.50");
        assert_eq!(format_price(999.999, Currency::Usd), "$1,000.00");
        assert_eq!(format_price(1234567.0, Currency::Rub), "1,234,567.00 ₽");
        assert_eq!(format_price(12.0, Currency::None), "12.00");
        assert_eq!(format_price(0.0, Currency::Usd), "$0.00");
    }

    #[test]
    fn keeps_sign_for_negative_amounts() {
        assert_eq!(format_price(-1500.25, Currency::Usd), "-$1,500.25");
        assert_eq!(format_price(-0.001, Currency::Usd), "$0.00");
    }

    #[test]
    fn converts_between_currencies() {
        assert_eq!(convert_usd_to_rub(10.0, 75.0), 750.0);
        assert_eq!(convert_rub_to_usd(750.0, 75.0), 10.0);
        assert_eq!(convert_rub_to_usd(750.0, 0.0), 0.0);
        assert_eq!(round_cents(1.005_1), 1.01);
    }
}
