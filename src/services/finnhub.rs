use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::{error::QuoteError, services::quotes::QuoteProvider};

const QUOTE_URL: &str = "https://finnhub.io/api/v1/quote";

#[derive(Clone)]
pub struct FinnhubClient {
    http: Client,
    api_key: String,
}

impl FinnhubClient {
    pub fn new(api_key: String) -> Self {
        Self {
            http: Client::new(),
            api_key,
        }
    }

    fn has_key(&self) -> bool {
        !self.api_key.trim().is_empty()
    }

    pub async fn fetch_quote(&self, symbol: &str) -> Result<QuoteResponse, QuoteError> {
        if !self.has_key() {
            return Err(QuoteError::MissingKey);
        }

        let res = self
            .http
            .get(QUOTE_URL)
            .query(&[("symbol", symbol), ("token", self.api_key.as_str())])
            .send()
            .await?;

        if !res.status().is_success() {
            let status = res.status().as_u16();
            let body = res.text().await.unwrap_or_default();
            return Err(QuoteError::Status { status, body });
        }

        Ok(res.json::<QuoteResponse>().await?)
    }
}

#[async_trait]
impl QuoteProvider for FinnhubClient {
    async fn quote(&self, symbol: &str) -> Result<f64, QuoteError> {
        let q = self.fetch_quote(symbol).await?;
        q.current_price()
            .ok_or_else(|| QuoteError::MissingPrice(symbol.to_string()))
    }
}

// Finnhub answers unknown symbols with 200 and all-zero / null fields,
// so every field is optional.
#[derive(Debug, Default, Deserialize)]
pub struct QuoteResponse {
    // current
    pub c: Option<f64>,
    // change
    pub d: Option<f64>,
    // percent change
    pub dp: Option<f64>,
    // high
    pub h: Option<f64>,
    // low
    pub l: Option<f64>,
    // open
    pub o: Option<f64>,
    // previous close
    pub pc: Option<f64>,
    // timestamp
    pub t: Option<i64>,
}

impl QuoteResponse {
    pub fn current_price(&self) -> Option<f64> {
        let price = self.c.filter(|p| p.is_finite())?;
        if price == 0.0 && self.t.unwrap_or(0) == 0 {
            return None;
        }
        Some(price)
    }
}
