//! Error types for the pricing SDK

use thiserror::Error;

/// Errors that can occur when talking to an exchange-rate backend
#[derive(Debug, Error)]
pub enum ExchangeError {
    /// The exchange facade has no backend installed
    #[error("No exchange backend installed, install one with Exchange::install")]
    BackendNotInstalled,

    /// The installed backend could not quote the requested pair
    #[error("Rate not found in backend '{backend}': {origin}/{target}")]
    RateNotFound {
        backend: String,
        origin: String,
        target: String,
    },

    /// No backend factory is registered under this name
    #[error("Unknown exchange backend: {0}")]
    UnknownBackend(String),

    /// Network request failed
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    /// Invalid response from the rate source
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    /// Rate source API error
    #[error("Rate source API error: {0}")]
    ApiError(String),
}

impl ExchangeError {
    /// Creates a RateNotFound error
    pub fn rate_not_found(backend: &str, origin: &str, target: &str) -> Self {
        Self::RateNotFound {
            backend: backend.to_string(),
            origin: origin.to_string(),
            target: target.to_string(),
        }
    }
}

/// Errors raised while parsing number patterns or rendering numbers
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FormatError {
    /// Malformed CLDR number pattern
    #[error("Invalid number pattern {pattern:?}: {reason}")]
    InvalidPattern { pattern: String, reason: String },

    /// Named currency format style missing from the locale
    #[error("'{0}' is not a known currency format type")]
    UnknownFormatType(String),

    /// Locale identifier not covered by the bundled CLDR data
    #[error("Unknown locale: {0}")]
    UnknownLocale(String),

    /// Value too large to scale within decimal precision
    #[error("Number {0} exceeds the supported decimal precision")]
    Overflow(String),
}

impl FormatError {
    /// Creates an InvalidPattern error
    pub fn invalid_pattern(pattern: &str, reason: impl Into<String>) -> Self {
        Self::InvalidPattern {
            pattern: pattern.to_string(),
            reason: reason.into(),
        }
    }
}

/// Errors that can occur when constructing or operating on prices
#[derive(Debug, Error)]
pub enum PriceError {
    /// Currency code is not three uppercase letters
    #[error("Invalid currency: {0:?}")]
    InvalidCurrency(String),

    /// Amount could not be converted into an exact decimal
    #[error("Invalid amount: {0:?}")]
    InvalidAmount(String),

    /// Textual price representation could not be parsed
    #[error("Failed to parse string '{input}': {source}")]
    Parse {
        input: String,
        #[source]
        source: Box<PriceError>,
    },

    /// Binary operation between prices of different currencies
    #[error(
        "Unsupported operation between price in '{left}' and '{right}': '{operation}'. \
         Use ConversionPolicy::AutoConvert for automatic currency conversion"
    )]
    CurrencyMismatch {
        left: String,
        right: String,
        operation: &'static str,
    },

    /// Operation attempted with an operand type it does not support
    #[error(
        "Unsupported operation between Price and '{operand}': '{operation}'. \
         Use Price::amount() to operate on the decimal amount"
    )]
    InvalidOperand {
        operand: &'static str,
        operation: &'static str,
    },

    /// Division, floor division, modulo or divmod by zero
    #[error("Division by zero: '{operation}'")]
    DivisionByZero { operation: &'static str },

    /// Result does not fit the decimal representation
    #[error("Arithmetic overflow: '{operation}'")]
    Overflow { operation: &'static str },

    /// Range bounds violate the same-currency or ordering invariant
    #[error("Invalid price range: {0}")]
    InvalidRange(String),

    /// Malformed payment URI
    #[error("Invalid payment URI: {0}")]
    InvalidUri(String),

    /// Exchange rate lookup failed
    #[error(transparent)]
    Exchange(#[from] ExchangeError),

    /// Formatting failed
    #[error(transparent)]
    Format(#[from] FormatError),
}

impl PriceError {
    /// Creates a CurrencyMismatch error
    pub fn currency_mismatch(left: &str, right: &str, operation: &'static str) -> Self {
        Self::CurrencyMismatch {
            left: left.to_string(),
            right: right.to_string(),
            operation,
        }
    }

    /// Wraps an error in a Parse error for the given input
    pub fn parse(input: &str, source: PriceError) -> Self {
        Self::Parse {
            input: input.to_string(),
            source: Box::new(source),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_currency_mismatch_message_names_both_codes() {
        let err = PriceError::currency_mismatch("AAA", "BBB", "+");
        let msg = err.to_string();
        assert!(msg.contains("'AAA'"));
        assert!(msg.contains("'BBB'"));
        assert!(msg.contains("'+'"));
    }

    #[test]
    fn test_rate_not_found_message() {
        let err = ExchangeError::rate_not_found("simple", "AAA", "BBB");
        assert_eq!(err.to_string(), "Rate not found in backend 'simple': AAA/BBB");
    }

    #[test]
    fn test_parse_error_keeps_source() {
        let err = PriceError::parse("2.99", PriceError::InvalidCurrency("".into()));
        assert!(std::error::Error::source(&err).is_some());
        assert!(err.to_string().starts_with("Failed to parse string '2.99'"));
    }
}
