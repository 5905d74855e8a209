//! In-memory exchange backend

use crate::currency::CurrencyCode;
use crate::error::ExchangeError;
use crate::exchange::ExchangeBackend;
use async_trait::async_trait;
use rust_decimal::Decimal;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Exchange backend holding a manually maintained rate table
pub struct SimpleBackend {
    base: CurrencyCode,
    rates: RwLock<HashMap<CurrencyCode, Decimal>>,
}

impl SimpleBackend {
    /// Creates an empty backend quoting against `base`
    pub fn new(base: CurrencyCode) -> Self {
        Self {
            base,
            rates: RwLock::new(HashMap::new()),
        }
    }

    /// Creates a backend seeded with rates
    pub fn with_rates(
        base: CurrencyCode,
        rates: impl IntoIterator<Item = (CurrencyCode, Decimal)>,
    ) -> Self {
        Self {
            base,
            rates: RwLock::new(rates.into_iter().collect()),
        }
    }

    /// Sets the rate for a currency, replacing any previous one
    pub async fn set_rate(&self, currency: CurrencyCode, rate: Decimal) {
        self.rates.write().await.insert(currency, rate);
    }

    /// Removes the rate for a currency
    pub async fn remove_rate(&self, currency: &CurrencyCode) -> Option<Decimal> {
        self.rates.write().await.remove(currency)
    }

    /// Returns a snapshot of the rate table
    pub async fn rates(&self) -> HashMap<CurrencyCode, Decimal> {
        self.rates.read().await.clone()
    }
}

impl Default for SimpleBackend {
    fn default() -> Self {
        Self::new(CurrencyCode::USD)
    }
}

#[async_trait]
impl ExchangeBackend for SimpleBackend {
    fn base(&self) -> CurrencyCode {
        self.base
    }

    fn backend_name(&self) -> &'static str {
        "simple"
    }

    async fn rate(&self, currency: &CurrencyCode) -> Result<Option<Decimal>, ExchangeError> {
        if *currency == self.base {
            return Ok(Some(Decimal::ONE));
        }
        let rates = self.rates.read().await;
        Ok(rates.get(currency).copied().filter(|rate| !rate.is_zero()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn code(s: &str) -> CurrencyCode {
        CurrencyCode::new(s).unwrap()
    }

    #[tokio::test]
    async fn test_base_rate_is_one() {
        let backend = SimpleBackend::with_rates(code("XXX"), [(code("XXX"), dec!(5))]);
        assert_eq!(backend.rate(&code("XXX")).await.unwrap(), Some(dec!(1)));
    }

    #[tokio::test]
    async fn test_unknown_and_zero_rates() {
        let backend = SimpleBackend::default();
        assert_eq!(backend.rate(&code("EUR")).await.unwrap(), None);

        backend.set_rate(code("EUR"), Decimal::ZERO).await;
        assert_eq!(backend.rate(&code("EUR")).await.unwrap(), None);

        backend.set_rate(code("EUR"), dec!(0.9)).await;
        assert_eq!(backend.rate(&code("EUR")).await.unwrap(), Some(dec!(0.9)));
        assert_eq!(backend.rates().await.len(), 1);

        assert_eq!(backend.remove_rate(&code("EUR")).await, Some(dec!(0.9)));
        assert_eq!(backend.rate(&code("EUR")).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_quotation_through_base() {
        let backend = SimpleBackend::with_rates(
            code("XXX"),
            [(code("AAA"), dec!(2)), (code("BBB"), dec!(8))],
        );
        assert_eq!(
            backend.quotation(&code("AAA"), &code("BBB")).await.unwrap(),
            Some(dec!(4))
        );
        assert_eq!(
            backend.quotation(&code("XXX"), &code("AAA")).await.unwrap(),
            Some(dec!(2))
        );
        assert_eq!(
            backend.quotation(&code("CCC"), &code("AAA")).await.unwrap(),
            None
        );
    }
}
