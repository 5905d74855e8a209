//! Currency codes and exact-decimal amount conversion

use crate::error::PriceError;
use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

/// ISO-4217-shaped code: any three uppercase ASCII letters.
static CURRENCY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z]{3}$").expect("Invalid regex"));

/// A validated three-letter currency code
///
/// Only the shape is checked, not ISO-4217 membership, so codes such as
/// `XXX` or `BTC` are accepted.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CurrencyCode([u8; 3]);

impl CurrencyCode {
    pub const USD: Self = Self(*b"USD");

    /// Validates and creates a currency code
    pub fn new(code: &str) -> Result<Self, PriceError> {
        if !CURRENCY_RE.is_match(code) {
            return Err(PriceError::InvalidCurrency(code.to_string()));
        }
        let bytes = code.as_bytes();
        Ok(Self([bytes[0], bytes[1], bytes[2]]))
    }

    /// Returns the code as a string slice
    pub fn as_str(&self) -> &str {
        // Construction guarantees ASCII uppercase bytes.
        std::str::from_utf8(&self.0).unwrap_or_default()
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Debug for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CurrencyCode({})", self.as_str())
    }
}

impl FromStr for CurrencyCode {
    type Err = PriceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for CurrencyCode {
    type Error = PriceError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl TryFrom<&str> for CurrencyCode {
    type Error = PriceError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<CurrencyCode> for String {
    fn from(code: CurrencyCode) -> Self {
        code.as_str().to_string()
    }
}

impl PartialEq<str> for CurrencyCode {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == other
    }
}

impl PartialEq<&str> for CurrencyCode {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}

/// Conversion of numeric inputs into an exact decimal amount
///
/// Floating-point values are converted through their shortest string form so
/// that `2.99_f64` becomes exactly `2.99` instead of its binary expansion.
pub trait IntoAmount {
    /// Converts the value into a `Decimal`
    fn into_amount(self) -> Result<Decimal, PriceError>;
}

impl IntoAmount for Decimal {
    fn into_amount(self) -> Result<Decimal, PriceError> {
        Ok(self)
    }
}

impl IntoAmount for &Decimal {
    fn into_amount(self) -> Result<Decimal, PriceError> {
        Ok(*self)
    }
}

macro_rules! impl_into_amount_int {
    ($($t:ty),*) => {
        $(
            impl IntoAmount for $t {
                fn into_amount(self) -> Result<Decimal, PriceError> {
                    Ok(Decimal::from(self))
                }
            }
        )*
    };
}

impl_into_amount_int!(i8, i16, i32, i64, u8, u16, u32, u64);

impl IntoAmount for f64 {
    fn into_amount(self) -> Result<Decimal, PriceError> {
        if !self.is_finite() {
            return Err(PriceError::InvalidAmount(self.to_string()));
        }
        parse_decimal(&self.to_string())
    }
}

impl IntoAmount for f32 {
    fn into_amount(self) -> Result<Decimal, PriceError> {
        if !self.is_finite() {
            return Err(PriceError::InvalidAmount(self.to_string()));
        }
        parse_decimal(&self.to_string())
    }
}

impl IntoAmount for &str {
    fn into_amount(self) -> Result<Decimal, PriceError> {
        parse_decimal(self)
    }
}

impl IntoAmount for String {
    fn into_amount(self) -> Result<Decimal, PriceError> {
        parse_decimal(&self)
    }
}

impl IntoAmount for &String {
    fn into_amount(self) -> Result<Decimal, PriceError> {
        parse_decimal(self)
    }
}

/// Parses plain (`"12.50"`) or scientific (`"1.25e1"`) decimal text
///
/// Text with more significant digits than a `Decimal` holds is rejected
/// rather than rounded.
pub(crate) fn parse_decimal(text: &str) -> Result<Decimal, PriceError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(PriceError::InvalidAmount(text.to_string()));
    }
    let value = Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .map_err(|_| PriceError::InvalidAmount(text.to_string()))?;
    if significant_digits(trimmed) != significant_digits(&value.mantissa().abs().to_string()) {
        return Err(PriceError::InvalidAmount(text.to_string()));
    }
    Ok(value)
}

/// Digits of the mantissa without leading or trailing zeros
fn significant_digits(text: &str) -> String {
    let mantissa = text.split(['e', 'E']).next().unwrap_or_default();
    let digits: String = mantissa.chars().filter(char::is_ascii_digit).collect();
    digits.trim_start_matches('0').trim_end_matches('0').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    #[rstest]
    #[case("USD")]
    #[case("XXX")]
    #[case("BTC")]
    fn test_valid_codes(#[case] code: &str) {
        let parsed = CurrencyCode::new(code).unwrap();
        assert_eq!(parsed.as_str(), code);
        assert_eq!(parsed.to_string(), code);
    }

    #[rstest]
    #[case("")]
    #[case("XX")]
    #[case("123")]
    #[case("xxx")]
    #[case("UsD")]
    #[case("$")]
    #[case("US$")]
    #[case("BTCD")]
    fn test_invalid_codes(#[case] code: &str) {
        assert!(matches!(
            CurrencyCode::new(code),
            Err(PriceError::InvalidCurrency(_))
        ));
    }

    #[test]
    fn test_code_serde_round_trip() {
        let code = CurrencyCode::new("EUR").unwrap();
        let json = serde_json::to_string(&code).unwrap();
        assert_eq!(json, "\"EUR\"");
        let back: CurrencyCode = serde_json::from_str(&json).unwrap();
        assert_eq!(back, code);
        assert!(serde_json::from_str::<CurrencyCode>("\"eur\"").is_err());
    }

    #[test]
    fn test_float_amount_has_no_binary_noise() {
        assert_eq!(2.99_f64.into_amount().unwrap(), dec!(2.99));
        assert_eq!(0.1_f64.into_amount().unwrap().to_string(), "0.1");
        assert_eq!(0.0_f64.into_amount().unwrap(), Decimal::ZERO);
    }

    #[test]
    fn test_non_finite_float_rejected() {
        assert!(f64::NAN.into_amount().is_err());
        assert!(f64::INFINITY.into_amount().is_err());
    }

    #[rstest]
    #[case("2.99", dec!(2.99))]
    #[case(" 10 ", dec!(10))]
    #[case("-0.5", dec!(-0.5))]
    #[case("1.5e3", dec!(1500))]
    #[case("0.0000000000000000000000000001", dec!(0.0000000000000000000000000001))]
    #[case("12.500000000000000000000000000000", dec!(12.5))]
    fn test_string_amounts(#[case] text: &str, #[case] expected: Decimal) {
        assert_eq!(text.into_amount().unwrap(), expected);
    }

    #[rstest]
    #[case("twenty")]
    #[case("")]
    #[case("1.2.3")]
    #[case("1.00000000000000000000000000001")]
    #[case("0.123456789012345678901234567891")]
    fn test_invalid_string_amounts(#[case] text: &str) {
        assert!(matches!(
            text.into_amount(),
            Err(PriceError::InvalidAmount(_))
        ));
    }
}
