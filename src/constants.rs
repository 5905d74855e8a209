//! Constants for the pricing SDK
//!
//! Compile-time defaults live here. The few values that may differ between
//! deployments can be overridden through environment variables, see
//! [`crate::config::PricingConfig`].

/// How long before remotely fetched exchange rates are considered stale (in seconds)
pub const STALE_THRESHOLD_SECS: i64 = 300;

/// HTTP request timeout when fetching exchange rates (in seconds)
pub const REQUEST_TIMEOUT_SECS: u64 = 10;

/// User agent for HTTP requests
pub const USER_AGENT: &str = "pricing-sdk/0.1.0";

/// Coinbase API base URL
pub const COINBASE_API_URL: &str = "https://api.coinbase.com/v2";

/// Coinbase API endpoint for the full rate table of a base currency
pub const COINBASE_EXCHANGE_RATES_ENDPOINT: &str = "/exchange-rates";

/// Locale used when neither the caller nor the environment names one
pub const DEFAULT_LOCALE: &str = "en_US";

/// Base currency for exchange backends built from configuration
pub const DEFAULT_BASE_CURRENCY: &str = "USD";

/// Name under which the default exchange is registered in a [`crate::Pricing`] context
pub const DEFAULT_EXCHANGE_NAME: &str = "default";

/// Natural decimal digits for currencies the CLDR tables do not list
pub const DEFAULT_CURRENCY_DIGITS: u32 = 2;

/// Environment variable selecting the default locale
pub const ENV_LOCALE: &str = "PRICING_LOCALE";

/// Environment variable selecting the exchange backend by symbolic name
pub const ENV_EXCHANGE_BACKEND: &str = "PRICING_EXCHANGE_BACKEND";

/// Environment variable selecting the base currency of the configured backend
pub const ENV_BASE_CURRENCY: &str = "PRICING_BASE_CURRENCY";
