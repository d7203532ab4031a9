//! HTTP client for the Foreplay public API.
//!
//! Wraps `reqwest` with Foreplay's header-based authentication, credit
//! accounting and typed response decoding. The fallible methods return
//! [`ForeplayError`]; [`ForeplayClient::resolve_brand`] and
//! [`ForeplayClient::fetch_ads`] are their fail-soft counterparts used by
//! the selector, where one brand's failure must not abort the run.

use std::sync::Mutex;
use std::time::Duration;

use adbrief_core::{AdRecord, BrandRecord};
use reqwest::{Client, Url};

use crate::credits::{CreditLedger, CreditUsage};
use crate::error::ForeplayError;
use crate::types::{DataEnvelope, RawAd, RawBrand};

const BRAND_SEARCH_PATH: &str = "api/discovery/brands";
const BRAND_ADS_PATH: &str = "api/spyder/brand/ads";

/// Client for the Foreplay discovery and brand-ads endpoints.
///
/// The base URL comes from `ADBRIEF_FOREPLAY_BASE_URL`, so tests point the
/// same constructor at a mock server.
pub struct ForeplayClient {
    client: Client,
    api_key: String,
    base_url: Url,
    ledger: Mutex<CreditLedger>,
}

impl ForeplayClient {
    /// Creates a client for the API rooted at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`ForeplayError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`ForeplayError::InvalidBaseUrl`] if
    /// `base_url` does not parse.
    pub fn with_base_url(
        api_key: &str,
        timeout_secs: u64,
        user_agent: &str,
        base_url: &str,
    ) -> Result<Self, ForeplayError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        // Exactly one trailing slash so endpoint paths land after any prefix.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| ForeplayError::InvalidBaseUrl {
            base_url: base_url.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            base_url,
            ledger: Mutex::new(CreditLedger::default()),
        })
    }

    /// Searches brands by free text, in the remote's own relevance order.
    ///
    /// # Errors
    ///
    /// - [`ForeplayError::Http`] on network failure or timeout.
    /// - [`ForeplayError::UnexpectedStatus`] on a non-2xx response.
    /// - [`ForeplayError::Deserialize`] if the envelope does not parse.
    pub async fn search_brands(
        &self,
        query: &str,
        limit: u32,
    ) -> Result<Vec<BrandRecord>, ForeplayError> {
        let limit = limit.to_string();
        let url = self.build_url(BRAND_SEARCH_PATH, &[("query", query), ("limit", limit.as_str())]);
        let envelope = self
            .request_envelope(&url, &format!("brand search (query={query})"))
            .await?;

        Ok(envelope
            .data
            .into_iter()
            .filter_map(|item| serde_json::from_value::<RawBrand>(item).ok())
            .filter_map(|raw| raw.into_record(query))
            .collect())
    }

    /// Lists up to `limit` of the brand's most recent ads, newest first as
    /// the remote orders them.
    ///
    /// `limit` bounds the credits Foreplay charges for the call; keep it small.
    ///
    /// # Errors
    ///
    /// - [`ForeplayError::Http`] on network failure or timeout.
    /// - [`ForeplayError::UnexpectedStatus`] on a non-2xx response.
    /// - [`ForeplayError::Deserialize`] if the envelope does not parse.
    pub async fn list_brand_ads(
        &self,
        brand: &BrandRecord,
        limit: u32,
    ) -> Result<Vec<AdRecord>, ForeplayError> {
        let limit = limit.to_string();
        let url = self.build_url(
            BRAND_ADS_PATH,
            &[("brand_id", brand.id.as_str()), ("limit", limit.as_str())],
        );
        let envelope = self
            .request_envelope(&url, &format!("brand ads (brand_id={})", brand.id))
            .await?;

        let total = envelope.data.len();
        let ads: Vec<AdRecord> = envelope
            .data
            .into_iter()
            .filter_map(|item| serde_json::from_value::<RawAd>(item).ok())
            .filter_map(|raw| raw.into_record(&brand.name))
            .collect();
        if ads.len() < total {
            tracing::debug!(
                brand = %brand.name,
                dropped = total - ads.len(),
                "skipped malformed ad entries"
            );
        }
        Ok(ads)
    }

    /// Resolves a tracked brand name to the remote's best match.
    ///
    /// `None` covers both "no match" and "request failed"; failures are
    /// logged here so the caller can skip the brand without distinguishing.
    pub async fn resolve_brand(&self, name: &str) -> Option<BrandRecord> {
        match self.search_brands(name, 1).await {
            Ok(mut matches) => {
                if matches.is_empty() {
                    tracing::info!(brand = name, "no Foreplay brand matches query");
                    None
                } else {
                    Some(matches.swap_remove(0))
                }
            }
            Err(e) => {
                tracing::warn!(brand = name, error = %e, "brand search failed; skipping brand");
                None
            }
        }
    }

    /// Fetches the brand's recent ads, degrading to an empty list on failure.
    pub async fn fetch_ads(&self, brand: &BrandRecord, limit: u32) -> Vec<AdRecord> {
        match self.list_brand_ads(brand, limit).await {
            Ok(ads) => ads,
            Err(e) => {
                tracing::warn!(
                    brand = %brand.name,
                    brand_id = %brand.id,
                    error = %e,
                    "ad listing failed; treating brand as having no ads"
                );
                Vec::new()
            }
        }
    }

    /// Snapshot of the credit totals seen so far.
    #[must_use]
    pub fn credits(&self) -> CreditLedger {
        self.ledger
            .lock()
            .map(|ledger| *ledger)
            .unwrap_or_default()
    }

    /// Joins `path` onto the base URL and appends percent-encoded query pairs.
    fn build_url(&self, path: &str, params: &[(&str, &str)]) -> Url {
        let mut url = self.base_url.clone();
        url.set_path(&format!("{}{path}", self.base_url.path()));
        {
            let mut pairs = url.query_pairs_mut();
            for (k, v) in params {
                pairs.append_pair(k, v);
            }
        }
        url
    }

    /// Sends an authenticated GET, records credit headers, asserts a 2xx
    /// status and decodes the `data` envelope.
    async fn request_envelope(
        &self,
        url: &Url,
        context: &str,
    ) -> Result<DataEnvelope, ForeplayError> {
        let response = self
            .client
            .get(url.clone())
            .header(reqwest::header::AUTHORIZATION, self.api_key.as_str())
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;

        let usage = CreditUsage::from_headers(response.headers());
        self.record_credits(usage);

        let status = response.status();
        if !status.is_success() {
            return Err(ForeplayError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| ForeplayError::Deserialize {
            context: context.to_string(),
            source: e,
        })
    }

    fn record_credits(&self, usage: CreditUsage) {
        tracing::info!(
            credits_remaining = usage.remaining.map_or_else(|| "?".to_string(), |v| v.to_string()),
            credit_cost = usage.cost.map_or_else(|| "?".to_string(), |v| v.to_string()),
            "Foreplay credits"
        );
        if let Ok(mut ledger) = self.ledger.lock() {
            ledger.record(usage);
        }
    }
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
