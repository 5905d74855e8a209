//! Lazily refreshed exchange backend fed by a remote rate source

use crate::constants::STALE_THRESHOLD_SECS;
use crate::currency::CurrencyCode;
use crate::error::ExchangeError;
use crate::exchange::{cross_rate, ExchangeBackend};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::time::Instant;
use tokio::sync::{Mutex, RwLock};

/// Trait for remote sources of exchange-rate tables
#[async_trait]
pub trait RateSource: Send + Sync {
    /// Fetches the full rate table for a base currency
    ///
    /// # Arguments
    /// * `base` - The currency the returned rates are relative to
    ///
    /// # Returns
    /// Map of currency to units of that currency per unit of `base`
    async fn fetch_rates(
        &self,
        base: &CurrencyCode,
    ) -> Result<HashMap<CurrencyCode, Decimal>, ExchangeError>;

    /// Returns the name of this source
    fn source_name(&self) -> &'static str;
}

#[derive(Debug, Default)]
struct RateTable {
    rates: HashMap<CurrencyCode, Decimal>,
    last_updated: Option<DateTime<Utc>>,
}

impl RateTable {
    fn is_stale(&self, threshold_seconds: i64) -> bool {
        match self.last_updated {
            Some(updated) => Utc::now().signed_duration_since(updated).num_seconds() > threshold_seconds,
            None => true,
        }
    }

    fn get(&self, currency: &CurrencyCode) -> Option<Decimal> {
        self.rates.get(currency).copied().filter(|rate| !rate.is_zero())
    }
}

/// Exchange backend that refreshes its rate table when it goes stale
///
/// Reads check the table's age first and refresh it once it is older than
/// the staleness threshold (five minutes by default). Concurrent readers of
/// a stale table share a single refresh. A failed refresh is returned to the
/// caller that triggered it and leaves the previous table and timestamp in
/// place, so the next read tries again.
pub struct RemoteBackend<S> {
    base: CurrencyCode,
    source: S,
    table: RwLock<RateTable>,
    refresh_lock: Mutex<()>,
    stale_after_secs: i64,
}

impl<S: RateSource> RemoteBackend<S> {
    /// Creates a backend that has not fetched any rates yet
    pub fn new(base: CurrencyCode, source: S) -> Self {
        Self {
            base,
            source,
            table: RwLock::new(RateTable::default()),
            refresh_lock: Mutex::new(()),
            stale_after_secs: STALE_THRESHOLD_SECS,
        }
    }

    /// Overrides the staleness threshold
    pub fn with_stale_threshold(mut self, seconds: i64) -> Self {
        self.stale_after_secs = seconds;
        self
    }

    /// Returns the rate source
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Returns when the table was last refreshed
    pub async fn last_updated(&self) -> Option<DateTime<Utc>> {
        self.table.read().await.last_updated
    }

    /// Returns true if the table has never been fetched or is past the threshold
    pub async fn is_stale(&self) -> bool {
        self.table.read().await.is_stale(self.stale_after_secs)
    }

    /// Fetches a fresh table and swaps it in
    pub async fn refresh(&self) -> Result<(), ExchangeError> {
        let start = Instant::now();
        tracing::debug!(
            backend = self.source.source_name(),
            base = %self.base,
            "Refreshing exchange rates"
        );

        match self.source.fetch_rates(&self.base).await {
            Ok(rates) => {
                let count = rates.len();
                *self.table.write().await = RateTable {
                    rates,
                    last_updated: Some(Utc::now()),
                };
                tracing::debug!(
                    backend = self.source.source_name(),
                    base = %self.base,
                    count = count,
                    latency_ms = start.elapsed().as_millis() as u64,
                    "Refreshed exchange rates"
                );
                Ok(())
            }
            Err(e) => {
                tracing::warn!(
                    backend = self.source.source_name(),
                    base = %self.base,
                    error = %e,
                    "Failed to refresh exchange rates"
                );
                Err(e)
            }
        }
    }

    async fn ensure_fresh(&self) -> Result<(), ExchangeError> {
        if !self.is_stale().await {
            return Ok(());
        }
        let _guard = self.refresh_lock.lock().await;
        // Another reader may have refreshed while we waited.
        if !self.is_stale().await {
            return Ok(());
        }
        self.refresh().await
    }
}

#[async_trait]
impl<S: RateSource> ExchangeBackend for RemoteBackend<S> {
    fn base(&self) -> CurrencyCode {
        self.base
    }

    fn backend_name(&self) -> &'static str {
        self.source.source_name()
    }

    async fn rate(&self, currency: &CurrencyCode) -> Result<Option<Decimal>, ExchangeError> {
        if *currency == self.base {
            return Ok(Some(Decimal::ONE));
        }
        self.ensure_fresh().await?;
        Ok(self.table.read().await.get(currency))
    }

    async fn quotation(
        &self,
        origin: &CurrencyCode,
        target: &CurrencyCode,
    ) -> Result<Option<Decimal>, ExchangeError> {
        self.ensure_fresh().await?;
        let table = self.table.read().await;
        let rate = |currency: &CurrencyCode| {
            if *currency == self.base {
                Some(Decimal::ONE)
            } else {
                table.get(currency)
            }
        };
        match (rate(origin), rate(target)) {
            (Some(origin_rate), Some(target_rate)) => Ok(cross_rate(origin_rate, target_rate)),
            _ => Ok(None),
        }
    }
}


#[cfg(test)]
mod tests {
    use super::mock::MockRateSource;
    use super::*;
    use rust_decimal_macros::dec;
    use std::sync::Arc;

    fn code(s: &str) -> CurrencyCode {
        CurrencyCode::new(s).unwrap()
    }

    fn source() -> MockRateSource {
        let source = MockRateSource::new();
        source.set_rate(code("AAA"), dec!(2));
        source.set_rate(code("BBB"), dec!(8));
        source
    }

    #[tokio::test]
    async fn test_first_read_fetches() {
        let source = source();
        let backend = RemoteBackend::new(code("XXX"), source.clone());
        assert!(backend.is_stale().await);
        assert_eq!(backend.last_updated().await, None);

        assert_eq!(backend.rate(&code("AAA")).await.unwrap(), Some(dec!(2)));
        assert_eq!(source.call_count(), 1);
        assert!(!backend.is_stale().await);
        assert!(backend.last_updated().await.is_some());

        // Fresh table is served without another fetch
        assert_eq!(
            backend.quotation(&code("AAA"), &code("BBB")).await.unwrap(),
            Some(dec!(4))
        );
        assert_eq!(source.call_count(), 1);
    }

    #[tokio::test]
    async fn test_base_rate_needs_no_fetch() {
        let source = source();
        let backend = RemoteBackend::new(code("XXX"), source.clone());
        assert_eq!(backend.rate(&code("XXX")).await.unwrap(), Some(dec!(1)));
        assert_eq!(source.call_count(), 0);
    }

    #[tokio::test]
    async fn test_stale_table_refetched() {
        let source = source();
        let backend = RemoteBackend::new(code("XXX"), source.clone()).with_stale_threshold(-1);

        backend.rate(&code("AAA")).await.unwrap();
        source.set_rate(code("AAA"), dec!(3));
        assert_eq!(backend.rate(&code("AAA")).await.unwrap(), Some(dec!(3)));
        assert_eq!(source.call_count(), 2);
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_previous_table() {
        let source = source();
        let backend = RemoteBackend::new(code("XXX"), source.clone()).with_stale_threshold(-1);

        backend.refresh().await.unwrap();
        let updated = backend.last_updated().await;

        source.set_failing(true);
        assert!(matches!(
            backend.rate(&code("AAA")).await,
            Err(ExchangeError::ApiError(_))
        ));
        assert_eq!(backend.last_updated().await, updated);

        source.set_failing(false);
        assert_eq!(backend.rate(&code("AAA")).await.unwrap(), Some(dec!(2)));
    }

    #[tokio::test]
    async fn test_concurrent_reads_share_refresh() {
        let source = source();
        let backend = Arc::new(RemoteBackend::new(code("XXX"), source.clone()));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let backend = backend.clone();
                tokio::spawn(async move { backend.rate(&code("BBB")).await })
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.await.unwrap().unwrap(), Some(dec!(8)));
        }
        assert_eq!(source.call_count(), 1);
    }

    #[tokio::test]
    async fn test_backend_name_from_source() {
        let backend = RemoteBackend::new(code("XXX"), source());
        assert_eq!(backend.backend_name(), "mock");
        assert_eq!(backend.base(), code("XXX"));
    }
}
