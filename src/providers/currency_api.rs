use crate::core::currency::{CurrencyCode, RateProvider, RateTable};
use crate::core::error::{Error, Result};
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::time::Duration;
use tracing::{debug, error, instrument};

/// Rate provider for currency-api style endpoints: `GET {base_url}/{base}.json`.
///
/// The payload is either a flat `{code: rate}` object or an envelope
/// `{"date": "...", "<base>": {code: rate}}`.
pub struct CurrencyApiProvider {
    base_url: String,
    client: reqwest::Client,
}

impl CurrencyApiProvider {
    pub fn new(base_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent("fxconv/1.0")
            .timeout(timeout)
            .build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }
}

fn network_error(base: &CurrencyCode, reason: impl Into<String>) -> Error {
    Error::Network {
        base: base.clone(),
        reason: reason.into(),
    }
}

fn parse_rates(base: &CurrencyCode, text: &str) -> Result<RateTable> {
    let payload: Map<String, Value> = serde_json::from_str(text)
        .map_err(|e| network_error(base, format!("malformed payload: {e}")))?;

    let rates = match payload.get(base.as_str()) {
        Some(Value::Object(inner)) => inner,
        _ => &payload,
    };

    let parsed: Vec<(CurrencyCode, f64)> = rates
        .iter()
        .filter_map(|(key, value)| {
            let rate = value.as_f64()?;
            let code = CurrencyCode::new(key).ok()?;
            Some((code, rate))
        })
        .collect();

    if parsed.is_empty() {
        return Err(network_error(base, "payload contained no rates"));
    }
    Ok(RateTable::new(base.clone(), parsed))
}

#[async_trait]
impl RateProvider for CurrencyApiProvider {
    #[instrument(skip(self))]
    async fn fetch_rates(&self, base: &CurrencyCode) -> Result<RateTable> {
        let url = format!("{}/{}.json", self.base_url, base.as_str());
        debug!("Requesting rates from {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| network_error(base, format!("request error: {e}")))?;

        if !response.status().is_success() {
            return Err(network_error(
                base,
                format!("HTTP error: {}", response.status()),
            ));
        }

        let text = response
            .text()
            .await
            .map_err(|e| network_error(base, format!("failed to read body: {e}")))?;

        parse_rates(base, &text).inspect_err(|e| {
            error!(error = %e, response = %text, "Failed to parse rates response");
        })
    }
}
