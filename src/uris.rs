//! Cryptocurrency payment request URIs
//!
//! Supports BIP21 (`bitcoin:<address>?amount=<decimal>`, also used by
//! litecoin) and EIP681 (`ethereum:0x<address>?value=<decimal>`).

use crate::currency::IntoAmount;
use crate::error::PriceError;
use rust_decimal::Decimal;
use std::fmt;
use std::str::FromStr;
use url::Url;

const BIP21_SCHEMES: &[&str] = &["bitcoin", "litecoin"];
const EIP681_SCHEME: &str = "ethereum";

/// Scheme, path and one named query parameter of a payment URI
fn split_uri(uri: &str, param: &str) -> Result<(String, String, String), PriceError> {
    let parsed = Url::parse(uri).map_err(|e| PriceError::InvalidUri(format!("{}: {}", uri, e)))?;
    let value = parsed
        .query_pairs()
        .find(|(key, _)| key == param)
        .map(|(_, value)| value.into_owned())
        .ok_or_else(|| PriceError::InvalidUri(format!("{}: missing '{}'", uri, param)))?;
    Ok((parsed.scheme().to_string(), parsed.path().to_string(), value))
}

fn payment_amount(amount: impl IntoAmount) -> Result<Decimal, PriceError> {
    amount
        .into_amount()
        .map_err(|e| PriceError::InvalidUri(e.to_string()))
}

/// BIP21 payment request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bip21PaymentUri {
    currency: String,
    address: String,
    amount: Decimal,
}

impl Bip21PaymentUri {
    /// Creates a payment request
    ///
    /// # Arguments
    /// * `currency` - `bitcoin` or `litecoin`
    /// * `address` - Recipient address
    /// * `amount` - Requested amount
    pub fn new(currency: &str, address: &str, amount: impl IntoAmount) -> Result<Self, PriceError> {
        if !BIP21_SCHEMES.contains(&currency) {
            return Err(PriceError::InvalidUri(format!(
                "unsupported BIP21 currency '{}'",
                currency
            )));
        }
        if address.is_empty() {
            return Err(PriceError::InvalidUri("empty address".to_string()));
        }
        Ok(Self {
            currency: currency.to_string(),
            address: address.to_string(),
            amount: payment_amount(amount)?,
        })
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn to_uri(&self) -> String {
        format!("{}:{}?amount={}", self.currency, self.address, self.amount)
    }

    /// Parses a `<scheme>:<address>?amount=<decimal>` URI
    pub fn parse_uri(uri: &str) -> Result<Self, PriceError> {
        let (scheme, address, amount) = split_uri(uri, "amount")?;
        Self::new(&scheme, &address, amount)
    }
}

impl fmt::Display for Bip21PaymentUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_uri())
    }
}

impl FromStr for Bip21PaymentUri {
    type Err = PriceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_uri(s)
    }
}

/// EIP681 payment request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Eip681PaymentUri {
    address: String,
    value: Decimal,
}

impl Eip681PaymentUri {
    /// Creates a payment request, adding the `0x` prefix when missing
    pub fn new(currency: &str, address: &str, value: impl IntoAmount) -> Result<Self, PriceError> {
        if currency != EIP681_SCHEME {
            return Err(PriceError::InvalidUri(format!(
                "unsupported EIP681 currency '{}'",
                currency
            )));
        }
        let hex = address.strip_prefix("0x").unwrap_or(address);
        if hex.is_empty() || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(PriceError::InvalidUri(format!(
                "invalid ethereum address '{}'",
                address
            )));
        }
        Ok(Self {
            address: format!("0x{}", hex),
            value: payment_amount(value)?,
        })
    }

    pub fn currency(&self) -> &str {
        EIP681_SCHEME
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn value(&self) -> Decimal {
        self.value
    }

    pub fn to_uri(&self) -> String {
        format!("{}:{}?value={}", EIP681_SCHEME, self.address, self.value)
    }

    /// Parses an `ethereum:0x<address>?value=<decimal>` URI
    pub fn parse_uri(uri: &str) -> Result<Self, PriceError> {
        let (scheme, address, value) = split_uri(uri, "value")?;
        Self::new(&scheme, &address, value)
    }
}

impl fmt::Display for Eip681PaymentUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_uri())
    }
}

impl FromStr for Eip681PaymentUri {
    type Err = PriceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_uri(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    #[test]
    fn test_bip21_payment_uri() {
        let uri = Bip21PaymentUri::new("bitcoin", "19kxPokCjD6tUU3sHaLZgEQBkRsCTBt3jj", "2.425222")
            .unwrap();
        assert_eq!(
            uri.to_string(),
            "bitcoin:19kxPokCjD6tUU3sHaLZgEQBkRsCTBt3jj?amount=2.425222"
        );
        assert_eq!(Bip21PaymentUri::parse_uri(&uri.to_uri()).unwrap(), uri);
    }

    #[test]
    fn test_litecoin_uri() {
        let uri: Bip21PaymentUri = "litecoin:LZ5r9nkqx1dcbUDxY2Q8nZ7RvxmMUmvVpo?amount=1.5"
            .parse()
            .unwrap();
        assert_eq!(uri.currency(), "litecoin");
        assert_eq!(uri.address(), "LZ5r9nkqx1dcbUDxY2Q8nZ7RvxmMUmvVpo");
        assert_eq!(uri.amount(), dec!(1.5));
    }

    #[test]
    fn test_eip681_payment_uri() {
        let uri = Eip681PaymentUri::new(
            "ethereum",
            "077a7506b69e37e4f6852577190f04a35df9a36c",
            "2.425222",
        )
        .unwrap();
        let prefixed = Eip681PaymentUri::new(
            "ethereum",
            "0x077a7506b69e37e4f6852577190f04a35df9a36c",
            "2.425222",
        )
        .unwrap();
        assert_eq!(
            uri.to_string(),
            "ethereum:0x077a7506b69e37e4f6852577190f04a35df9a36c?value=2.425222"
        );
        assert_eq!(uri, prefixed);
        assert_eq!(Eip681PaymentUri::parse_uri(&uri.to_uri()).unwrap(), uri);
    }

    #[rstest]
    #[case("dogecoin:abc?amount=1")]
    #[case("bitcoin:abc")]
    #[case("bitcoin:abc?amount=lots")]
    #[case("not a uri")]
    fn test_invalid_bip21(#[case] uri: &str) {
        assert!(matches!(
            Bip21PaymentUri::parse_uri(uri),
            Err(PriceError::InvalidUri(_))
        ));
    }

    #[rstest]
    #[case("bitcoin:0xabc?value=1")]
    #[case("ethereum:0xzz?value=1")]
    #[case("ethereum:0xabc?amount=1")]
    fn test_invalid_eip681(#[case] uri: &str) {
        assert!(matches!(
            Eip681PaymentUri::parse_uri(uri),
            Err(PriceError::InvalidUri(_))
        ));
    }
}
