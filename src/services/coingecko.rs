use std::{collections::HashMap, time::Duration};

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::{config::CoinSpec, error::AppError, models::Quote};

/// Anything that can produce a complete quote batch for the monitored coins.
#[async_trait]
pub trait PriceSource: Send + Sync {
    /// Either every configured coin is quoted or the whole call fails.
    async fn fetch(&self) -> Result<Vec<Quote>, AppError>;
}

#[derive(Clone)]
pub struct CoinGeckoClient {
    http: Client,
    base_url: String,
    coins: Vec<CoinSpec>,
}

impl CoinGeckoClient {
    pub fn new(base_url: &str, coins: Vec<CoinSpec>, timeout: Duration) -> Result<Self, AppError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::UpstreamUnavailable(e.to_string()))?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            coins,
        })
    }

    fn ids(&self) -> String {
        self.coins
            .iter()
            .map(|c| c.id.as_str())
            .collect::<Vec<_>>()
            .join(",")
    }
}

#[async_trait]
impl PriceSource for CoinGeckoClient {
    async fn fetch(&self) -> Result<Vec<Quote>, AppError> {
        let url = format!("{}/simple/price", self.base_url);
        let ids = self.ids();

        tracing::debug!(%url, %ids, "fetching crypto prices");

        let res = self
            .http
            .get(&url)
            .query(&[
                ("ids", ids.as_str()),
                ("vs_currencies", "usd"),
                ("include_24hr_change", "true"),
            ])
            .send()
            .await
            .map_err(|e| AppError::UpstreamUnavailable(e.to_string()))?;

        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(AppError::UpstreamUnavailable(format!(
                "price request failed: {status} {body}"
            )));
        }

        let payload = res
            .json::<SimplePriceResponse>()
            .await
            .map_err(|e| AppError::UpstreamUnavailable(e.to_string()))?;

        normalize(&self.coins, &payload)
    }
}

/// `/simple/price` body: coin id -> prices in the requested currencies.
pub type SimplePriceResponse = HashMap<String, SimplePrice>;

#[derive(Debug, Clone, Deserialize)]
pub struct SimplePrice {
    pub usd: Option<f64>,
    pub usd_24h_change: Option<f64>,
}

/// Maps the provider payload onto quotes in configured order.
/// A missing coin or unusable price rejects the whole batch.
pub fn normalize(coins: &[CoinSpec], payload: &SimplePriceResponse) -> Result<Vec<Quote>, AppError> {
    coins
        .iter()
        .map(|spec| -> Result<Quote, AppError> {
            let entry = payload.get(&spec.id).ok_or_else(|| {
                AppError::UpstreamUnavailable(format!("no price data for {}", spec.id))
            })?;

            let price = match entry.usd {
                Some(p) if p.is_finite() && p > 0.0 => p,
                _ => {
                    return Err(AppError::UpstreamUnavailable(format!(
                        "invalid usd price for {}",
                        spec.id
                    )));
                }
            };

            let change_24h = entry
                .usd_24h_change
                .filter(|c| c.is_finite())
                .unwrap_or(0.0);

            Ok(Quote {
                coin: spec.id.clone(),
                display_name: spec.name.clone(),
                symbol: spec.symbol.clone(),
                price,
                change_24h,
            })
        })
        .collect()
}
