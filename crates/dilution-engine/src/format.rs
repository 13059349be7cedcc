//! Number formatting and parsing for amounts, percentages and currency.

/// Format a fraction as a percentage, e.g. `0.0024390244` -> `0.2439%`.
pub fn format_percent(fraction: f64, decimals: usize) -> String {
    format!("{}%", format_fixed(fraction * 100.0, decimals))
}

/// Format a currency amount with thousands separators, e.g. `$820,000,000`.
pub fn format_currency(value: f64, decimals: usize) -> String {
    if value.is_sign_negative() && value != 0.0 {
        format!("-${}", group_thousands(&format_fixed(-value, decimals)))
    } else {
        format!("${}", group_thousands(&format_fixed(value.abs(), decimals)))
    }
}

/// Format a form amount, grouped: whole numbers without decimals, cents with
/// two. Anything finer keeps every digit so the text parses back to the
/// same value.
pub fn format_amount(value: f64) -> String {
    if value.fract() == 0.0 {
        return group_thousands(&format!("{:.0}", value));
    }
    let cents = format!("{:.2}", value);
    if cents.parse::<f64>().ok() == Some(value) {
        group_thousands(&cents)
    } else {
        group_thousands(&value.to_string())
    }
}

/// Parse an amount typed by the user.
///
/// Accepts an optional leading `$`, comma or underscore separators and
/// surrounding whitespace. Returns `None` for anything else.
pub fn parse_amount(input: &str) -> Option<f64> {
    let trimmed = input.trim();
    let trimmed = trimmed.strip_prefix('$').unwrap_or(trimmed);
    let cleaned: String = trimmed
        .chars()
        .filter(|c| *c != ',' && *c != '_')
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.trim().parse::<f64>().ok().filter(|n| n.is_finite())
}

fn format_fixed(value: f64, decimals: usize) -> String {
    if value.is_nan() {
        "#NAN!".to_string()
    } else if value.is_infinite() {
        "#INF!".to_string()
    } else {
        format!("{:.*}", decimals, value)
    }
}

/// Insert commas into the integer part of an already formatted number.
fn group_thousands(formatted: &str) -> String {
    let (sign, unsigned) = match formatted.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", formatted),
    };
    let (int_part, frac_part) = match unsigned.find('.') {
        Some(pos) => unsigned.split_at(pos),
        None => (unsigned, ""),
    };
    if !int_part.bytes().all(|b| b.is_ascii_digit()) {
        return formatted.to_string();
    }

    let mut out = String::with_capacity(formatted.len() + int_part.len() / 3);
    out.push_str(sign);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out.push_str(frac_part);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_percent() {
        assert_eq!(format_percent(0.0024390244, 4), "0.2439%");
        assert_eq!(format_percent(0.038461538, 2), "3.85%");
        assert_eq!(format_percent(1.0, 0), "100%");
    }

    #[test]
    fn test_format_currency_groups_thousands() {
        assert_eq!(format_currency(820_000_000.0, 0), "$820,000,000");
        assert_eq!(format_currency(4_878.048_780_487_805, 2), "$4,878.05");
        assert_eq!(format_currency(999.0, 0), "$999");
        assert_eq!(format_currency(1_000.0, 0), "$1,000");
        assert_eq!(format_currency(0.0, 2), "$0.00");
        assert_eq!(format_currency(-1_500.0, 0), "-$1,500");
    }

    #[test]
    fn test_format_currency_non_finite() {
        assert_eq!(format_currency(f64::INFINITY, 0), "$#INF!");
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(2_000_000.0), "2,000,000");
        assert_eq!(format_amount(0.0), "0");
        assert_eq!(format_amount(1234.5), "1,234.50");
        assert_eq!(format_amount(1234.567), "1,234.567");
        assert_eq!(format_amount(1e20), "100,000,000,000,000,000,000");
    }

    #[test]
    fn test_format_amount_parses_back_exactly() {
        for value in [1234.567, 0.1 + 0.2, 20_000_000.01, 1.0 / 3.0, 123_456_789.123_456_78] {
            let text = format_amount(value);
            assert_eq!(parse_amount(&text).map(f64::to_bits), Some(value.to_bits()), "{text}");
        }
    }

    #[test]
    fn test_parse_amount_accepts_separators_and_symbol() {
        assert_eq!(parse_amount("2000000"), Some(2_000_000.0));
        assert_eq!(parse_amount("$2,000,000"), Some(2_000_000.0));
        assert_eq!(parse_amount("  50_000 "), Some(50_000.0));
        assert_eq!(parse_amount("1.5e6"), Some(1_500_000.0));
        assert_eq!(parse_amount("-5"), Some(-5.0));
    }

    #[test]
    fn test_parse_amount_rejects_garbage() {
        assert_eq!(parse_amount(""), None);
        assert_eq!(parse_amount("$"), None);
        assert_eq!(parse_amount("abc"), None);
        assert_eq!(parse_amount("inf"), None);
        assert_eq!(parse_amount("NaN"), None);
        assert_eq!(parse_amount("1 000"), None);
    }
}
