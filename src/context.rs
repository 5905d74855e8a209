//! Application-level pricing context
//!
//! Holds the collaborators a price needs beyond its own value: the default
//! locale, custom currency formats and named exchanges. Applications build
//! one [`Pricing`] at startup and pass it where prices are rendered or
//! converted.

use crate::config::PricingConfig;
use crate::constants::DEFAULT_EXCHANGE_NAME;
use crate::currency::CurrencyCode;
use crate::error::PriceError;
use crate::exchange::{BackendRegistry, Exchange};
use crate::formats::{CurrencyFormat, FormatRegistry};
use crate::numbers::{FormatOptions, Locale};
use crate::price::Price;
use crate::registry::NamedRegistry;
use std::sync::Arc;

/// Locale, currency formats and exchanges shared by an application
///
/// # Example
/// ```no_run
/// use pricing_sdk::{config::PricingConfig, CurrencyCode, Price, Pricing};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pricing = Pricing::from_config(&PricingConfig::from_env()?)?;
/// let price = Price::new("12.50", "USD")?;
/// println!("{}", pricing.format(&price)?);
///
/// let eur = pricing.convert(&price, CurrencyCode::new("EUR")?).await?;
/// println!("{}", pricing.format(&eur)?);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Pricing {
    locale: Locale,
    formats: FormatRegistry,
    exchanges: NamedRegistry<Arc<Exchange>>,
    default_exchange: Arc<Exchange>,
}

impl Pricing {
    /// Creates a context with an empty default exchange
    pub fn new(locale: Locale) -> Self {
        Self::with_exchange(locale, Arc::new(Exchange::new()))
    }

    /// Creates a context around an existing default exchange
    pub fn with_exchange(locale: Locale, exchange: Arc<Exchange>) -> Self {
        let mut exchanges = NamedRegistry::new();
        exchanges.register(DEFAULT_EXCHANGE_NAME, exchange.clone());
        Self {
            locale,
            formats: FormatRegistry::new(),
            exchanges,
            default_exchange: exchange,
        }
    }

    /// Builds a context from configuration
    ///
    /// When a backend name is configured it is resolved through the built-in
    /// backend registry and installed on the default exchange.
    pub fn from_config(config: &PricingConfig) -> Result<Self, PriceError> {
        let exchange = match &config.exchange_backend {
            Some(name) => {
                let backend = BackendRegistry::with_defaults().create(name, config.base_currency)?;
                tracing::info!(
                    backend = backend.backend_name(),
                    base = %config.base_currency,
                    locale = config.locale.id(),
                    "Configured pricing context"
                );
                Exchange::with_backend(backend)
            }
            None => Exchange::new(),
        };
        Ok(Self::with_exchange(config.locale, Arc::new(exchange)))
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    pub fn formats(&self) -> &FormatRegistry {
        &self.formats
    }

    /// Registers a custom currency format, replacing any for the same code
    pub fn register_format(&mut self, format: CurrencyFormat) -> Option<CurrencyFormat> {
        self.formats.register_format(format)
    }

    /// Registers a named exchange
    ///
    /// Registering under the default name also replaces the exchange used by
    /// [`Pricing::convert`].
    pub fn register_exchange(&mut self, name: &str, exchange: Arc<Exchange>) {
        if name == DEFAULT_EXCHANGE_NAME {
            self.default_exchange = exchange.clone();
        }
        self.exchanges.register(name, exchange);
    }

    /// Looks up an exchange by name
    pub fn exchange(&self, name: &str) -> Option<Arc<Exchange>> {
        self.exchanges.lookup(name).cloned()
    }

    /// Returns the exchange used by [`Pricing::convert`]
    pub fn default_exchange(&self) -> &Arc<Exchange> {
        &self.default_exchange
    }

    /// Formats a price in the context locale
    pub fn format(&self, price: &Price) -> Result<String, PriceError> {
        self.format_with(price, &FormatOptions::new())
    }

    /// Formats a price, using the context locale unless `options` names one
    pub fn format_with(&self, price: &Price, options: &FormatOptions) -> Result<String, PriceError> {
        let mut options = options.clone();
        if options.locale.is_none() {
            options.locale = Some(self.locale.id().to_string());
        }
        price.format(&options, &self.formats)
    }

    /// Converts a price through the default exchange
    pub async fn convert(&self, price: &Price, target: CurrencyCode) -> Result<Price, PriceError> {
        price.to(target, &self.default_exchange).await
    }
}

impl Default for Pricing {
    fn default() -> Self {
        Self::new(Locale::default())
    }
}
