//! Locale-aware currency number formatting
//!
//! This module bundles a small set of CLDR locale tables, a parser for CLDR
//! number patterns and the renderer that applies them to exact decimals.
//!
//! # Example
//! ```
//! use pricing_sdk::numbers::{format_currency, FormatOptions};
//!
//! let text = format_currency("1099.9876", "USD", &FormatOptions::new()).unwrap();
//! assert_eq!(text, "$1,099.99");
//!
//! let options = FormatOptions::new().with_decimal_quantization(false);
//! let text = format_currency("1099.9876", "USD", &options).unwrap();
//! assert_eq!(text, "$1,099.9876");
//! ```

pub mod format;
pub mod locale;
pub mod pattern;

pub use format::{ApplyOptions, FormatOptions};
pub use locale::{currency_digits, Locale};
pub use pattern::{parse_pattern, AsNumberPattern, NumberPattern};

use crate::currency::IntoAmount;
use crate::error::PriceError;

/// Formats a number as an amount of `currency`
///
/// Binary floats are converted through their shortest string form before
/// formatting, so `1099.98_f64` is rendered from the exact decimal `1099.98`.
///
/// # Arguments
/// * `number` - Amount to format
/// * `currency` - Currency code used for symbols, names and natural digits
/// * `options` - Locale, pattern and precision options
///
/// # Returns
/// * `Ok(String)` - The formatted amount
/// * `Err(PriceError)` - Invalid amount, locale, style or pattern
pub fn format_currency(
    number: impl IntoAmount,
    currency: &str,
    options: &FormatOptions,
) -> Result<String, PriceError> {
    let value = number.into_amount()?;
    Ok(format::render_currency(value, currency, options, None)?)
}
