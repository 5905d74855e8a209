//! Environment-driven configuration

use crate::constants::{
    DEFAULT_BASE_CURRENCY, DEFAULT_LOCALE, ENV_BASE_CURRENCY, ENV_EXCHANGE_BACKEND, ENV_LOCALE,
};
use crate::currency::CurrencyCode;
use crate::error::PriceError;
use crate::numbers::Locale;

/// POSIX locale variables consulted after `PRICING_LOCALE`, in priority order
const POSIX_LOCALE_VARS: &[&str] = &["LC_ALL", "LC_NUMERIC", "LANG"];

/// Settings for building a [`crate::Pricing`] context
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PricingConfig {
    /// Default locale for formatting
    pub locale: Locale,
    /// Symbolic name of the exchange backend to install, if any
    pub exchange_backend: Option<String>,
    /// Base currency of the installed backend
    pub base_currency: CurrencyCode,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            locale: Locale::default(),
            exchange_backend: None,
            base_currency: CurrencyCode::USD,
        }
    }
}

impl PricingConfig {
    /// Reads the configuration from the process environment
    ///
    /// * `PRICING_LOCALE` - locale identifier, falling back to `LC_ALL`,
    ///   `LC_NUMERIC` and `LANG`, then `en_US`
    /// * `PRICING_EXCHANGE_BACKEND` - backend name such as `simple` or `coinbase`
    /// * `PRICING_BASE_CURRENCY` - base currency code, `USD` by default
    pub fn from_env() -> Result<Self, PriceError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads the configuration through an arbitrary variable lookup
    ///
    /// # Errors
    /// An explicit `PRICING_LOCALE` that is not bundled fails with
    /// `FormatError::UnknownLocale`; an unsupported POSIX locale only falls
    /// back to the default. An invalid base currency fails with
    /// `PriceError::InvalidCurrency`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, PriceError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let locale = match non_empty(ENV_LOCALE) {
            Some(id) => Locale::parse(&id)?,
            None => POSIX_LOCALE_VARS
                .iter()
                .find_map(|key| non_empty(*key).map(|value| (*key, value)))
                .and_then(|(key, value)| match Locale::parse(&value) {
                    Ok(locale) => Some(locale),
                    Err(_) => {
                        tracing::warn!(
                            variable = key,
                            locale = %value,
                            fallback = DEFAULT_LOCALE,
                            "Unsupported system locale"
                        );
                        None
                    }
                })
                .unwrap_or_default(),
        };

        let exchange_backend = non_empty(ENV_EXCHANGE_BACKEND).map(|name| name.trim().to_lowercase());

        let base_currency = CurrencyCode::new(
            non_empty(ENV_BASE_CURRENCY)
                .as_deref()
                .unwrap_or(DEFAULT_BASE_CURRENCY)
                .trim(),
        )?;

        Ok(Self {
            locale,
            exchange_backend,
            base_currency,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FormatError;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<PricingConfig, PriceError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        PricingConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config, PricingConfig::default());
        assert_eq!(config.locale.id(), "en_US");
        assert_eq!(config.exchange_backend, None);
        assert_eq!(config.base_currency, CurrencyCode::USD);
    }

    #[test]
    fn test_explicit_values() {
        let config = load(&[
            ("PRICING_LOCALE", "de_DE"),
            ("PRICING_EXCHANGE_BACKEND", "Coinbase"),
            ("PRICING_BASE_CURRENCY", "EUR"),
        ])
        .unwrap();
        assert_eq!(config.locale.id(), "de_DE");
        assert_eq!(config.exchange_backend.as_deref(), Some("coinbase"));
        assert_eq!(config.base_currency.as_str(), "EUR");
    }

    #[test]
    fn test_posix_locale_priority() {
        let config = load(&[("LANG", "fr_FR.UTF-8"), ("LC_NUMERIC", "es_CO.UTF-8")]).unwrap();
        assert_eq!(config.locale.id(), "es_CO");

        let config = load(&[("LC_ALL", "pt_BR.UTF-8"), ("LANG", "fr_FR")]).unwrap();
        assert_eq!(config.locale.id(), "en_US");
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            load(&[("PRICING_LOCALE", "xx_YY")]),
            Err(PriceError::Format(FormatError::UnknownLocale(_)))
        ));
        assert!(matches!(
            load(&[("PRICING_BASE_CURRENCY", "usd")]),
            Err(PriceError::InvalidCurrency(_))
        ));
    }
}
