//! Custom currency format metadata
//!
//! A [`CurrencyFormat`] overrides how one currency is rendered: its display
//! name and symbol, an optional CLDR pattern, and precision handling. They are
//! looked up by currency code in a [`FormatRegistry`] when a price is
//! formatted; currencies without an entry use the locale defaults.

use crate::currency::CurrencyCode;
use crate::error::PriceError;
use crate::registry::NamedRegistry;
use serde::{Deserialize, Serialize};

/// Registry of currency formats keyed by currency code
pub type FormatRegistry = NamedRegistry<CurrencyFormat>;

/// Formatting parameters for a single currency
///
/// # Example
/// ```
/// use pricing_sdk::formats::CurrencyFormat;
///
/// let btc = CurrencyFormat::new("bitcoin", "BTC", "₿")
///     .unwrap()
///     .with_format("¤#,##0.########")
///     .with_currency_digits(false);
/// assert_eq!(btc.code.as_str(), "BTC");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrencyFormat {
    /// Display name, used for the `¤¤¤` placeholder
    pub name: String,
    /// Currency code
    pub code: CurrencyCode,
    /// Symbol, used for the `¤` placeholder
    pub symbol: String,
    /// CLDR pattern used instead of the locale's style pattern
    #[serde(default)]
    pub format: Option<String>,
    /// Force the currency's natural decimal digits
    #[serde(default = "default_true")]
    pub currency_digits: bool,
    /// Round to the pattern instead of keeping full precision
    #[serde(default = "default_true")]
    pub decimal_quantization: bool,
    /// Natural decimal digits for currencies missing from CLDR
    #[serde(default)]
    pub digits: Option<u32>,
}

fn default_true() -> bool {
    true
}

impl CurrencyFormat {
    /// Creates a currency format with default precision handling
    ///
    /// # Errors
    /// Returns `PriceError::InvalidCurrency` if `code` is not three uppercase letters.
    pub fn new(name: &str, code: &str, symbol: &str) -> Result<Self, PriceError> {
        Ok(Self {
            name: name.to_string(),
            code: CurrencyCode::new(code)?,
            symbol: symbol.to_string(),
            format: None,
            currency_digits: true,
            decimal_quantization: true,
            digits: None,
        })
    }

    pub fn with_format(mut self, pattern: &str) -> Self {
        self.format = Some(pattern.to_string());
        self
    }

    pub fn with_currency_digits(mut self, currency_digits: bool) -> Self {
        self.currency_digits = currency_digits;
        self
    }

    pub fn with_decimal_quantization(mut self, decimal_quantization: bool) -> Self {
        self.decimal_quantization = decimal_quantization;
        self
    }

    pub fn with_digits(mut self, digits: u32) -> Self {
        self.digits = Some(digits);
        self
    }
}

impl NamedRegistry<CurrencyFormat> {
    /// Registers a currency format under its own code
    pub fn register_format(&mut self, format: CurrencyFormat) -> Option<CurrencyFormat> {
        let code = format.code;
        self.register(code.as_str(), format)
    }

    /// Looks up the format registered for a currency
    pub fn format_for(&self, code: &CurrencyCode) -> Option<&CurrencyFormat> {
        let found = self.lookup(code.as_str());
        if found.is_none() {
            tracing::trace!(currency = %code, "No custom currency format registered");
        }
        found
    }
}
