use std::str::FromStr;

use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum AmountError {
    #[error("`{0}` is not a number")]
    NotNumeric(String),
    #[error("price must be greater than zero")]
    NonPositivePrice,
    #[error("amount may not be negative")]
    Negative,
}

/// Parses a user-typed amount, tolerating thousands separators:
/// "180000", "180,000" and "180 000" all read as 180000.
pub fn parse_amount(input: &str) -> Result<Decimal, AmountError> {
    let cleaned: String = input
        .trim()
        .chars()
        .filter(|ch| *ch != ',' && !ch.is_whitespace())
        .collect();

    if cleaned.is_empty() {
        return Err(AmountError::NotNumeric(input.trim().to_string()));
    }

    Decimal::from_str(&cleaned).map_err(|_| AmountError::NotNumeric(input.trim().to_string()))
}

/// Price rule: strictly positive.
pub fn parse_price(input: &str) -> Result<Decimal, AmountError> {
    let amount = parse_amount(input)?;
    if amount <= Decimal::ZERO {
        return Err(AmountError::NonPositivePrice);
    }
    Ok(amount)
}

/// Commission rule: zero is fine, negatives are not.
pub fn parse_commission(input: &str) -> Result<Decimal, AmountError> {
    let amount = parse_amount(input)?;
    if amount < Decimal::ZERO {
        return Err(AmountError::Negative);
    }
    Ok(amount)
}

/// Renders an amount with thousands separators for chat summaries,
/// e.g. 180000 -> "180,000".
pub fn format_amount(amount: &Decimal) -> String {
    let rendered = amount.round_dp(0).to_string();
    let (sign, digits) = match rendered.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", rendered.as_str()),
    };

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    format!("{sign}{grouped}")
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::{format_amount, parse_amount, parse_commission, parse_price, AmountError};

    #[test]
    fn accepts_plain_and_separated_amounts() {
        let expected = Decimal::new(180_000, 0);
        assert_eq!(parse_amount("180000"), Ok(expected));
        assert_eq!(parse_amount("180,000"), Ok(expected));
        assert_eq!(parse_amount("180 000"), Ok(expected));
        assert_eq!(parse_amount("  180,000 "), Ok(expected));
    }

    #[test]
    fn rejects_non_numeric_text() {
        assert!(matches!(parse_amount("abc"), Err(AmountError::NotNumeric(_))));
        assert!(matches!(parse_amount(""), Err(AmountError::NotNumeric(_))));
    }

    #[test]
    fn price_must_be_strictly_positive() {
        assert_eq!(parse_price("0"), Err(AmountError::NonPositivePrice));
        assert_eq!(parse_price("-5"), Err(AmountError::NonPositivePrice));
        assert_eq!(parse_price("180000"), Ok(Decimal::new(180_000, 0)));
    }

    #[test]
    fn commission_accepts_zero_but_not_negative() {
        assert_eq!(parse_commission("0"), Ok(Decimal::ZERO));
        assert_eq!(parse_commission("-5"), Err(AmountError::Negative));
    }

    #[test]
    fn formats_with_thousands_separators() {
        assert_eq!(format_amount(&Decimal::new(180_000, 0)), "180,000");
        assert_eq!(format_amount(&Decimal::new(950, 0)), "950");
        assert_eq!(format_amount(&Decimal::new(1_250_000, 0)), "1,250,000");
        assert_eq!(format_amount(&Decimal::new(-9_000, 0)), "-9,000");
    }
}
