//! Exchange-rate abstraction
//!
//! Backends quote rates relative to a base currency. The [`Exchange`] facade
//! forwards to whichever backend is installed and can be swapped at runtime.

use crate::backends::{CoinbaseBackend, SimpleBackend};
use crate::currency::CurrencyCode;
use crate::error::ExchangeError;
use crate::registry::NamedRegistry;
use async_trait::async_trait;
use rust_decimal::Decimal;
use std::fmt;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Trait for exchange-rate backends
///
/// A rate is the number of units of `currency` that one unit of the base
/// currency buys. Implementations must return exactly one for the base
/// currency itself.
#[async_trait]
pub trait ExchangeBackend: Send + Sync {
    /// Returns the currency all rates are relative to
    fn base(&self) -> CurrencyCode;

    /// Returns the name of this backend
    fn backend_name(&self) -> &'static str;

    /// Returns the rate for a currency
    ///
    /// # Arguments
    /// * `currency` - The currency to quote against the base
    ///
    /// # Returns
    /// * `Ok(Some(rate))` - Units of `currency` per unit of base
    /// * `Ok(None)` - No rate on file
    /// * `Err(ExchangeError)` - The backend could not be queried
    async fn rate(&self, currency: &CurrencyCode) -> Result<Option<Decimal>, ExchangeError>;

    /// Returns how many units of `target` one unit of `origin` buys
    ///
    /// Cross rates are composed through the base currency, so any two
    /// currencies with a rate on file can be quoted.
    async fn quotation(
        &self,
        origin: &CurrencyCode,
        target: &CurrencyCode,
    ) -> Result<Option<Decimal>, ExchangeError> {
        let Some(origin_rate) = self.rate(origin).await? else {
            return Ok(None);
        };
        let Some(target_rate) = self.rate(target).await? else {
            return Ok(None);
        };
        Ok(cross_rate(origin_rate, target_rate))
    }
}

/// Divides two base-relative rates, treating zero as unknown
pub(crate) fn cross_rate(origin_rate: Decimal, target_rate: Decimal) -> Option<Decimal> {
    if origin_rate.is_zero() {
        return None;
    }
    target_rate.checked_div(origin_rate)
}

/// Facade over the installed exchange backend
///
/// Every forwarded call fails with `ExchangeError::BackendNotInstalled` while
/// no backend is installed. Installing replaces the backend atomically;
/// in-flight calls finish against the backend they started with.
///
/// # Example
/// ```
/// use pricing_sdk::{backends::SimpleBackend, CurrencyCode, Exchange};
/// use std::sync::Arc;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let backend = SimpleBackend::new(CurrencyCode::USD);
/// backend.set_rate(CurrencyCode::new("EUR")?, "0.9".parse()?).await;
///
/// let exchange = Exchange::with_backend(Arc::new(backend));
/// let eur = CurrencyCode::new("EUR")?;
/// assert!(exchange.quotation(&CurrencyCode::USD, &eur).await?.is_some());
/// # Ok(())
/// # }
/// ```
pub struct Exchange {
    backend: RwLock<Option<Arc<dyn ExchangeBackend>>>,
}

impl Exchange {
    /// Creates an exchange with no backend installed
    pub fn new() -> Self {
        Self {
            backend: RwLock::new(None),
        }
    }

    /// Creates an exchange with a backend already installed
    pub fn with_backend(backend: Arc<dyn ExchangeBackend>) -> Self {
        Self {
            backend: RwLock::new(Some(backend)),
        }
    }

    /// Installs a backend, replacing any previous one
    pub async fn install(&self, backend: Arc<dyn ExchangeBackend>) {
        tracing::info!(
            backend = backend.backend_name(),
            base = %backend.base(),
            "Installing exchange backend"
        );
        *self.backend.write().await = Some(backend);
    }

    /// Installs a default-constructed backend of type `B`
    pub async fn install_default<B>(&self)
    where
        B: ExchangeBackend + Default + 'static,
    {
        self.install(Arc::new(B::default())).await;
    }

    /// Installs the backend registered under `name`
    ///
    /// # Errors
    /// Returns `ExchangeError::UnknownBackend` if no factory has that name,
    /// or the factory's own error if construction fails.
    pub async fn install_named(
        &self,
        registry: &BackendRegistry,
        name: &str,
        base: CurrencyCode,
    ) -> Result<(), ExchangeError> {
        let backend = registry.create(name, base)?;
        self.install(backend).await;
        Ok(())
    }

    /// Removes the installed backend
    pub async fn uninstall(&self) {
        if let Some(previous) = self.backend.write().await.take() {
            tracing::info!(
                backend = previous.backend_name(),
                "Uninstalled exchange backend"
            );
        }
    }

    /// Returns true if a backend is installed
    pub async fn is_installed(&self) -> bool {
        self.backend.read().await.is_some()
    }

    /// Returns the installed backend's name
    pub async fn backend_name(&self) -> Option<&'static str> {
        self.backend
            .read()
            .await
            .as_ref()
            .map(|backend| backend.backend_name())
    }

    async fn backend(&self) -> Result<Arc<dyn ExchangeBackend>, ExchangeError> {
        self.backend
            .read()
            .await
            .clone()
            .ok_or(ExchangeError::BackendNotInstalled)
    }

    /// Returns the installed backend's base currency
    pub async fn base(&self) -> Result<CurrencyCode, ExchangeError> {
        Ok(self.backend().await?.base())
    }

    /// Returns the installed backend's rate for a currency
    pub async fn rate(&self, currency: &CurrencyCode) -> Result<Option<Decimal>, ExchangeError> {
        self.backend().await?.rate(currency).await
    }

    /// Quotes `origin` in `target` through the installed backend
    pub async fn quotation(
        &self,
        origin: &CurrencyCode,
        target: &CurrencyCode,
    ) -> Result<Option<Decimal>, ExchangeError> {
        self.backend().await?.quotation(origin, target).await
    }
}

impl Default for Exchange {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Exchange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self
            .backend
            .try_read()
            .ok()
            .and_then(|slot| slot.as_ref().map(|backend| backend.backend_name()));
        f.debug_struct("Exchange").field("backend", &name).finish()
    }
}

/// Constructs a backend for a base currency
pub type BackendFactory = fn(CurrencyCode) -> Result<Arc<dyn ExchangeBackend>, ExchangeError>;

/// Symbolic backend names resolved to factories
#[derive(Debug, Clone, Default)]
pub struct BackendRegistry {
    factories: NamedRegistry<BackendFactory>,
}

impl BackendRegistry {
    /// Creates an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry with the built-in `simple` and `coinbase` backends
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register("simple", |base| Ok(Arc::new(SimpleBackend::new(base))));
        registry.register("coinbase", |base| Ok(Arc::new(CoinbaseBackend::coinbase(base)?)));
        registry
    }

    /// Registers a factory, names are case-insensitive
    pub fn register(&mut self, name: &str, factory: BackendFactory) {
        self.factories.register(&name.to_lowercase(), factory);
    }

    /// Returns the registered backend names
    pub fn names(&self) -> Vec<&str> {
        self.factories.names()
    }

    /// Builds the backend registered under `name`
    pub fn create(
        &self,
        name: &str,
        base: CurrencyCode,
    ) -> Result<Arc<dyn ExchangeBackend>, ExchangeError> {
        let factory = self
            .factories
            .lookup(&name.to_lowercase())
            .ok_or_else(|| ExchangeError::UnknownBackend(name.to_string()))?;
        factory(base)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn code(s: &str) -> CurrencyCode {
        CurrencyCode::new(s).unwrap()
    }

    async fn simple_backend() -> Arc<SimpleBackend> {
        let backend = SimpleBackend::new(code("XXX"));
        backend.set_rate(code("AAA"), dec!(2)).await;
        backend.set_rate(code("BBB"), dec!(8)).await;
        Arc::new(backend)
    }

    #[tokio::test]
    async fn test_uninstalled_exchange_fails() {
        let exchange = Exchange::new();
        assert!(!exchange.is_installed().await);
        assert_eq!(exchange.backend_name().await, None);
        assert!(matches!(
            exchange.base().await,
            Err(ExchangeError::BackendNotInstalled)
        ));
        assert!(matches!(
            exchange.rate(&code("AAA")).await,
            Err(ExchangeError::BackendNotInstalled)
        ));
        assert!(matches!(
            exchange.quotation(&code("AAA"), &code("BBB")).await,
            Err(ExchangeError::BackendNotInstalled)
        ));
    }

    #[tokio::test]
    async fn test_install_and_uninstall() {
        let exchange = Exchange::new();
        exchange.install(simple_backend().await).await;
        assert!(exchange.is_installed().await);
        assert_eq!(exchange.backend_name().await, Some("simple"));
        assert_eq!(exchange.base().await.unwrap(), code("XXX"));

        exchange.uninstall().await;
        assert!(!exchange.is_installed().await);
    }

    #[tokio::test]
    async fn test_install_default() {
        let exchange = Exchange::new();
        exchange.install_default::<SimpleBackend>().await;
        assert_eq!(exchange.base().await.unwrap(), CurrencyCode::USD);
    }

    #[tokio::test]
    async fn test_install_named() {
        let registry = BackendRegistry::with_defaults();
        assert_eq!(registry.names(), vec!["coinbase", "simple"]);

        let exchange = Exchange::new();
        exchange
            .install_named(&registry, "Simple", code("EUR"))
            .await
            .unwrap();
        assert_eq!(exchange.base().await.unwrap(), code("EUR"));

        let err = exchange
            .install_named(&registry, "nope", code("EUR"))
            .await
            .unwrap_err();
        assert!(matches!(err, ExchangeError::UnknownBackend(name) if name == "nope"));
    }

    #[tokio::test]
    async fn test_cross_quotation() {
        let exchange = Exchange::with_backend(simple_backend().await);

        assert_eq!(exchange.rate(&code("XXX")).await.unwrap(), Some(dec!(1)));
        assert_eq!(
            exchange.quotation(&code("AAA"), &code("BBB")).await.unwrap(),
            Some(dec!(4))
        );
        assert_eq!(
            exchange.quotation(&code("BBB"), &code("AAA")).await.unwrap(),
            Some(dec!(0.25))
        );
        assert_eq!(
            exchange.quotation(&code("AAA"), &code("ZZZ")).await.unwrap(),
            None
        );
    }

    #[tokio::test]
    async fn test_independent_exchanges() {
        let first = Exchange::with_backend(simple_backend().await);
        let other = SimpleBackend::new(code("XXX"));
        other.set_rate(code("AAA"), dec!(3)).await;
        let second = Exchange::with_backend(Arc::new(other));

        assert_eq!(first.rate(&code("AAA")).await.unwrap(), Some(dec!(2)));
        assert_eq!(second.rate(&code("AAA")).await.unwrap(), Some(dec!(3)));
    }
}
