//! Parsing and formatting of monetary amounts in Brazilian notation.

use rust_decimal::Decimal;
use rust_decimal::RoundingStrategy;
use std::str::FromStr;

/// Parse an amount written with either comma or dot decimals
/// (e.g. "R$ 7.500,00", "R$ 7.500", "1250.75", "4500,00", "R$ -10,50").
///
/// A single dot followed by exactly three digits groups thousands, as in BRL
/// notation. Anything other than a currency prefix, an optional leading minus
/// sign, digits and separators makes the amount unparseable.
pub fn parse_amount(s: &str) -> Option<Decimal> {
    let rest = strip_currency(s);
    let (negative, rest) = match rest.strip_prefix('-') {
        Some(unsigned) => (true, strip_currency(unsigned)),
        None => (false, rest),
    };
    let body = rest.trim_end();

    if !body.chars().any(|c| c.is_ascii_digit())
        || !body
            .chars()
            .all(|c| c.is_ascii_digit() || c == ',' || c == '.')
    {
        return None;
    }

    let normalized = match (body.rfind(','), body.rfind('.')) {
        // "7.500,00": dots group thousands
        (Some(c), Some(d)) if c > d => body.replace('.', "").replace(',', "."),
        // "7,500.00": commas group thousands
        (Some(_), Some(_)) => body.replace(',', ""),
        (Some(_), None) if body.matches(',').count() > 1 => body.replace(',', ""),
        (Some(_), None) => body.replace(',', "."),
        // "1.250.000": several dots can only be thousands
        (None, Some(_)) if body.matches('.').count() > 1 => body.replace('.', ""),
        // "7.500": one dot and three digits after it
        (None, Some(d)) if d > 0 && !body.starts_with('0') && body.len() - d - 1 == 3 => {
            body.replace('.', "")
        }
        _ => body.to_string(),
    };

    let amount = Decimal::from_str(&normalized).ok()?;
    Some(if negative { -amount } else { amount })
}

/// Drop leading blanks and a currency marker such as "R$" or "BRL".
fn strip_currency(s: &str) -> &str {
    s.trim_start_matches(|c: char| c.is_whitespace() || c.is_alphabetic() || c == '$')
}

/// Format an amount with two decimals and a comma separator ("1250,75").
pub fn format_amount(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    format!("{:.2}", rounded).replace('.', ",")
}

/// Format an amount with a currency prefix ("R$ 1250,75").
pub fn format_currency(symbol: &str, amount: Decimal) -> String {
    format!("{} {}", symbol, format_amount(amount))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("R$ 7.500,00"), Some(dec("7500.00")));
        assert_eq!(parse_amount("R$ 4.500,00 "), Some(dec("4500.00")));
        assert_eq!(parse_amount("1250.75"), Some(dec("1250.75")));
        assert_eq!(parse_amount("9778,40"), Some(dec("9778.40")));
        assert_eq!(parse_amount("7,500.00"), Some(dec("7500.00")));
        assert_eq!(parse_amount("1.250.000"), Some(dec("1250000")));
        assert_eq!(parse_amount("-10,50"), Some(dec("-10.50")));
        assert_eq!(parse_amount("1250.5"), Some(dec("1250.5")));
    }

    #[test]
    fn test_parse_amount_thousands_without_cents() {
        assert_eq!(parse_amount("R$ 7.500"), Some(dec("7500")));
        assert_eq!(parse_amount("7.500"), Some(dec("7500")));
        assert_eq!(parse_amount("1.250"), Some(dec("1250")));
        assert_eq!(parse_amount("BRL 12.000"), Some(dec("12000")));
        assert_eq!(parse_amount("0.125"), Some(dec("0.125")));
    }

    #[test]
    fn test_parse_amount_sign_after_currency() {
        assert_eq!(parse_amount("R$ -10,50"), Some(dec("-10.50")));
        assert_eq!(parse_amount("-R$ 10,50"), Some(dec("-10.50")));
        assert_eq!(parse_amount("R$ 10-50"), None);
        assert_eq!(parse_amount("10,50-"), None);
    }

    #[test]
    fn test_parse_amount_rejects_stray_characters() {
        assert_eq!(parse_amount("R$ 1 250,00"), None);
        assert_eq!(parse_amount("12a34"), None);
        assert_eq!(parse_amount("R$ 7.500,00 (sete mil)"), None);
    }

    #[test]
    fn test_parse_amount_rejects_text() {
        assert_eq!(parse_amount("N/A"), None);
        assert_eq!(parse_amount(""), None);
        assert_eq!(parse_amount("R$ ,"), None);
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(dec("1250.75")), "1250,75");
        assert_eq!(format_amount(dec("5000")), "5000,00");
        assert_eq!(format_amount(dec("1250.5")), "1250,50");
        assert_eq!(format_amount(dec("0.005")), "0,01");
    }

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency("R$", dec("1250.50")), "R$ 1250,50");
        assert_eq!(format_currency("R$", dec("5000")), "R$ 5000,00");
    }
}
