//! Coinbase exchange-rate source

use crate::{
    backends::remote::{RateSource, RemoteBackend},
    constants::{COINBASE_API_URL, COINBASE_EXCHANGE_RATES_ENDPOINT, REQUEST_TIMEOUT_SECS, USER_AGENT},
    currency::CurrencyCode,
    error::ExchangeError,
};
use async_trait::async_trait;
use reqwest::{header, Client};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::HashMap;
use std::str::FromStr;
use std::time::Duration;

/// Coinbase API response for exchange-rate queries
#[derive(Debug, Deserialize)]
struct CoinbaseResponse {
    data: CoinbaseRates,
}

#[derive(Debug, Deserialize)]
struct CoinbaseRates {
    rates: HashMap<String, String>,
}

/// Remote backend fed by Coinbase exchange rates
pub type CoinbaseBackend = RemoteBackend<CoinbaseSource>;

impl RemoteBackend<CoinbaseSource> {
    /// Creates a Coinbase-backed exchange backend for `base`
    pub fn coinbase(base: CurrencyCode) -> Result<Self, ExchangeError> {
        Ok(Self::new(base, CoinbaseSource::new()?))
    }
}

/// Rate source for the Coinbase `exchange-rates` endpoint
pub struct CoinbaseSource {
    client: Client,
    base_url: String,
}

impl CoinbaseSource {
    /// Creates a source pointed at the public Coinbase API
    pub fn new() -> Result<Self, ExchangeError> {
        Self::with_base_url(COINBASE_API_URL)
    }

    /// Creates a source pointed at a custom API root
    pub fn with_base_url(base_url: &str) -> Result<Self, ExchangeError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .user_agent(USER_AGENT)
            .build()
            .map_err(ExchangeError::NetworkError)?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Builds the exchange-rates URL for a base currency
    fn build_url(&self, base: &CurrencyCode) -> String {
        format!(
            "{}{}?currency={}",
            self.base_url, COINBASE_EXCHANGE_RATES_ENDPOINT, base
        )
    }

    /// Parses the response body into a rate table
    ///
    /// Entries whose code or rate is malformed are skipped.
    fn parse_response(&self, body: &str) -> Result<HashMap<CurrencyCode, Decimal>, ExchangeError> {
        let response: CoinbaseResponse = serde_json::from_str(body).map_err(|e| {
            ExchangeError::InvalidResponse(format!(
                "Failed to parse Coinbase response: {}. Response: {}",
                e, body
            ))
        })?;

        let mut rates = HashMap::with_capacity(response.data.rates.len());
        for (code, rate) in response.data.rates {
            let parsed = CurrencyCode::new(&code)
                .ok()
                .zip(Decimal::from_str(&rate).ok());
            match parsed {
                Some((currency, rate)) => {
                    rates.insert(currency, rate);
                }
                None => {
                    tracing::warn!(
                        source = self.source_name(),
                        currency = %code,
                        rate = %rate,
                        "Skipping malformed exchange rate"
                    );
                }
            }
        }

        Ok(rates)
    }
}

#[async_trait]
impl RateSource for CoinbaseSource {
    async fn fetch_rates(
        &self,
        base: &CurrencyCode,
    ) -> Result<HashMap<CurrencyCode, Decimal>, ExchangeError> {
        let url = self.build_url(base);
        tracing::debug!(url = %url, "Fetching exchange rates from Coinbase");

        let response = self
            .client
            .get(&url)
            .header(header::ACCEPT, "application/json")
            .header(header::CONTENT_TYPE, "application/json")
            .send()
            .await
            .map_err(ExchangeError::NetworkError)?;

        if response.status().as_u16() == 429 {
            return Err(ExchangeError::RateLimitExceeded);
        }

        if !response.status().is_success() {
            return Err(ExchangeError::ApiError(format!(
                "HTTP {}: {}",
                response.status(),
                response.text().await.unwrap_or_default()
            )));
        }

        let body = response.text().await.map_err(ExchangeError::NetworkError)?;
        self.parse_response(&body)
    }

    fn source_name(&self) -> &'static str {
        "coinbase"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn code(s: &str) -> CurrencyCode {
        CurrencyCode::new(s).unwrap()
    }

    #[test]
    fn test_build_url() {
        let source = CoinbaseSource::with_base_url("https://example.test/v2/").unwrap();
        assert_eq!(
            source.build_url(&code("USD")),
            "https://example.test/v2/exchange-rates?currency=USD"
        );
    }

    #[test]
    fn test_parse_response() {
        let source = CoinbaseSource::new().unwrap();
        let body = r#"{
            "data": {
                "currency": "USD",
                "rates": {"EUR": "0.92", "BTC": "0.0000153", "usd": "1", "JPY": "n/a"}
            }
        }"#;

        let rates = source.parse_response(body).unwrap();
        assert_eq!(rates.len(), 2);
        assert_eq!(rates.get(&code("EUR")), Some(&dec!(0.92)));
        assert_eq!(rates.get(&code("BTC")), Some(&dec!(0.0000153)));
    }

    #[test]
    fn test_parse_malformed_response() {
        let source = CoinbaseSource::new().unwrap();
        assert!(matches!(
            source.parse_response(r#"{"rates": {}}"#),
            Err(ExchangeError::InvalidResponse(_))
        ));
        assert!(matches!(
            source.parse_response("not json"),
            Err(ExchangeError::InvalidResponse(_))
        ));
    }

    #[test]
    fn test_coinbase_backend() {
        use crate::exchange::ExchangeBackend;

        let backend = CoinbaseBackend::coinbase(code("EUR")).unwrap();
        assert_eq!(backend.backend_name(), "coinbase");
        assert_eq!(backend.base(), code("EUR"));
    }
}
