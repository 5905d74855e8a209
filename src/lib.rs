//! # Pricing SDK
//!
//! Exact-decimal monetary values with currency-safe arithmetic, CLDR-style
//! locale formatting and pluggable exchange-rate backends.
//!
//! ## Usage
//!
//! ```
//! use pricing_sdk::{FormatOptions, FormatRegistry, Price};
//!
//! let price = Price::new("1234.567", "USD").unwrap();
//! let total = price.checked_add(Price::new("0.433", "USD").unwrap()).unwrap();
//! assert_eq!(total.to_string(), "USD 1235.000");
//!
//! let formats = FormatRegistry::new();
//! let text = price.format(&FormatOptions::new().with_locale("de_DE"), &formats).unwrap();
//! assert_eq!(text, "1.234,57\u{a0}$");
//! ```
//!
//! Converting between currencies goes through an [`Exchange`] with an
//! installed backend:
//!
//! ```
//! use pricing_sdk::{backends::SimpleBackend, CurrencyCode, Exchange, Price};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let backend = SimpleBackend::new(CurrencyCode::USD);
//! backend.set_rate(CurrencyCode::new("EUR")?, "0.5".parse()?).await;
//! let exchange = Exchange::with_backend(Arc::new(backend));
//!
//! let eur = Price::new(10, "USD")?.to(CurrencyCode::new("EUR")?, &exchange).await?;
//! assert_eq!(eur, Price::new(5, "EUR")?);
//! # Ok(())
//! # }
//! ```

pub mod backends;
pub mod config;
pub mod constants;
pub mod context;
pub mod currency;
pub mod error;
pub mod exchange;
pub mod formats;
pub mod numbers;
pub mod price;
pub mod range;
pub mod registry;
pub mod uris;

// Re-export commonly used types
pub use context::Pricing;
pub use currency::{CurrencyCode, IntoAmount};
pub use error::{ExchangeError, FormatError, PriceError};
pub use exchange::{BackendRegistry, Exchange, ExchangeBackend};
pub use formats::{CurrencyFormat, FormatRegistry};
pub use numbers::{format_currency, FormatOptions, Locale};
pub use price::{ConversionPolicy, Operand, Price};
pub use range::{PriceRange, RangeOperand};
pub use uris::{Bip21PaymentUri, Eip681PaymentUri};
