use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;

use bizmap_core::{DirectoryPayload, ExplorerConfig, SourceItem};

use crate::error::ClientError;
use crate::retry::retry_with_backoff;

/// Client for the directory API's `cities` and `companies` endpoints.
///
/// 429 responses and network failures are retried with exponential backoff
/// up to `max_retries` extra attempts. Everything else fails immediately.
pub struct DirectoryClient {
    client: Client,
    base_url: String,
    max_retries: u32,
    backoff_base_secs: u64,
}

impl DirectoryClient {
    /// # Errors
    ///
    /// - [`ClientError::InvalidBaseUrl`] if `base_url` does not parse.
    /// - [`ClientError::Http`] if the underlying `reqwest::Client` cannot be
    ///   built.
    pub fn new(
        base_url: &str,
        timeout_secs: u64,
        user_agent: &str,
        max_retries: u32,
        backoff_base_secs: u64,
    ) -> Result<Self, ClientError> {
        let base_url = base_url.trim_end_matches('/').to_owned();
        reqwest::Url::parse(&base_url).map_err(|e| ClientError::InvalidBaseUrl {
            base_url: base_url.clone(),
            reason: e.to_string(),
        })?;

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;
        Ok(Self {
            client,
            base_url,
            max_retries,
            backoff_base_secs,
        })
    }

    /// # Errors
    ///
    /// Same as [`DirectoryClient::new`].
    pub fn from_config(config: &ExplorerConfig) -> Result<Self, ClientError> {
        Self::new(
            &config.api_base_url,
            config.request_timeout_secs,
            &config.user_agent,
            config.max_retries,
            config.retry_backoff_base_secs,
        )
    }

    /// Cities available for exploration, in server order.
    ///
    /// # Errors
    ///
    /// - [`ClientError::RateLimited`] / [`ClientError::Http`] after retries run out.
    /// - [`ClientError::NotFound`] on 404.
    /// - [`ClientError::UnexpectedStatus`] on any other non-2xx status.
    /// - [`ClientError::Deserialize`] if the body is not a JSON string array.
    pub async fn fetch_cities(&self) -> Result<Vec<String>, ClientError> {
        let url = self.cities_url()?;
        let cities: Vec<String> = self.get_json(&url, "city list").await?;
        tracing::info!(cities = cities.len(), "fetched city list");
        Ok(cities)
    }

    /// Records for one city, accepting either a flat record array or a
    /// GeoJSON `FeatureCollection`.
    ///
    /// # Errors
    ///
    /// Same as [`DirectoryClient::fetch_cities`].
    pub async fn fetch_companies(&self, city: &str) -> Result<Vec<SourceItem>, ClientError> {
        let url = self.companies_url(city)?;
        let payload: DirectoryPayload = self
            .get_json(&url, &format!("companies in {city}"))
            .await?;
        let items = payload.into_items();
        tracing::info!(city, items = items.len(), "fetched companies");
        Ok(items)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str, context: &str) -> Result<T, ClientError> {
        retry_with_backoff(self.max_retries, self.backoff_base_secs, || {
            let url = url.to_owned();
            async move {
                let response = self
                    .client
                    .get(&url)
                    .header(reqwest::header::ACCEPT, "application/json")
                    .send()
                    .await?;
                let status = response.status();

                if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                    let retry_after_secs = response
                        .headers()
                        .get(reqwest::header::RETRY_AFTER)
                        .and_then(|v| v.to_str().ok())
                        .and_then(|s| s.parse::<u64>().ok())
                        .unwrap_or(60);
                    return Err(ClientError::RateLimited { retry_after_secs });
                }

                if status == reqwest::StatusCode::NOT_FOUND {
                    return Err(ClientError::NotFound { url });
                }

                if !status.is_success() {
                    return Err(ClientError::UnexpectedStatus {
                        status: status.as_u16(),
                        url,
                    });
                }

                let body = response.text().await?;
                serde_json::from_str::<T>(&body).map_err(|e| ClientError::Deserialize {
                    context: context.to_owned(),
                    source: e,
                })
            }
        })
        .await
    }

    fn endpoint(&self, path: &str) -> Result<reqwest::Url, ClientError> {
        let raw = format!("{}/{path}", self.base_url);
        reqwest::Url::parse(&raw).map_err(|e| ClientError::InvalidBaseUrl {
            base_url: self.base_url.clone(),
            reason: format!("cannot build \"{path}\" endpoint: {e}"),
        })
    }

    fn cities_url(&self) -> Result<String, ClientError> {
        Ok(self.endpoint("cities")?.to_string())
    }

    fn companies_url(&self, city: &str) -> Result<String, ClientError> {
        let mut url = self.endpoint("companies")?;
        url.query_pairs_mut().append_pair("city", city);
        Ok(url.to_string())
    }
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
