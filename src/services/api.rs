// src/services/api.rs
use log::{debug, info};
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::{Client, Method};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

use crate::config::Settings;
use crate::models::{DebateRequest, DebateResponse, HealthStatus};

use super::endpoints::Endpoints;
use super::error::{ClientError, Result};

#[derive(Debug, Clone)]
pub struct RequestOptions {
    pub method: Method,
    pub headers: HeaderMap,
    pub body: Option<String>,
    pub timeout: Option<Duration>,
}

impl Default for RequestOptions {
    fn default() -> Self {
        RequestOptions {
            method: Method::GET,
            headers: HeaderMap::new(),
            body: None,
            timeout: None,
        }
    }
}

/// Default JSON content type overlaid with the caller's headers. A caller
/// header replaces the default rather than adding a second value.
pub fn merge_headers(extra: &HeaderMap) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.extend(extra.clone());
    headers
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    endpoints: Endpoints,
    analysis_timeout: Duration,
}

impl ApiClient {
    pub fn new(settings: &Settings) -> Result<Self> {
        let client = Client::builder()
            .timeout(settings.http_timeout)
            .build()?;
        Ok(ApiClient {
            client,
            endpoints: Endpoints::new(&settings.api_base_url, &settings.analysis_base_url),
            analysis_timeout: settings.analysis_timeout,
        })
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    /// Send a request and return the body text. Non-2xx responses become
    /// `ClientError::Http` carrying the status code and its reason phrase.
    pub async fn api_fetch(&self, url: &str, options: RequestOptions) -> Result<String> {
        debug!("{} {}", options.method, url);

        let mut request = self
            .client
            .request(options.method, url)
            .headers(merge_headers(&options.headers));
        if let Some(body) = options.body {
            request = request.body(body);
        }
        if let Some(timeout) = options.timeout {
            request = request.timeout(timeout);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Http {
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or("Unknown").to_string(),
            });
        }

        Ok(response.text().await?)
    }

    pub async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let text = self.api_fetch(url, RequestOptions::default()).await?;
        Ok(serde_json::from_str(&text)?)
    }

    /// POST a JSON body. Uses the longer analysis timeout since these calls
    /// usually wait on the LLM backend.
    pub async fn post_json<B, T>(&self, url: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let options = RequestOptions {
            method: Method::POST,
            body: Some(serde_json::to_string(body)?),
            timeout: Some(self.analysis_timeout),
            ..RequestOptions::default()
        };
        let text = self.api_fetch(url, options).await?;
        Ok(serde_json::from_str(&text)?)
    }

    pub async fn health(&self) -> Result<HealthStatus> {
        self.get_json(&self.endpoints.health()).await
    }

    /// Free-form board meeting on an arbitrary scenario.
    pub async fn debate(&self, scenario: &str) -> Result<DebateResponse> {
        if scenario.trim().is_empty() {
            return Err(ClientError::missing("Scenario cannot be empty"));
        }
        info!("Convening the board on a {} character scenario", scenario.len());
        self.post_json(&self.endpoints.debate(), &DebateRequest { scenario })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::{HeaderName, AUTHORIZATION};

    #[test]
    fn merge_adds_json_content_type() {
        let merged = merge_headers(&HeaderMap::new());
        assert_eq!(merged.get(CONTENT_TYPE).unwrap(), "application/json");
        assert_eq!(merged.len(), 1);
    }

    #[test]
    fn merge_keeps_caller_headers_without_duplicates() {
        let mut extra = HeaderMap::new();
        extra.insert(AUTHORIZATION, HeaderValue::from_static("Bearer token"));
        extra.insert(CONTENT_TYPE, HeaderValue::from_static("text/plain"));
        extra.insert(
            HeaderName::from_static("x-request-id"),
            HeaderValue::from_static("abc"),
        );

        let merged = merge_headers(&extra);
        assert_eq!(merged.get_all(CONTENT_TYPE).iter().count(), 1);
        assert_eq!(merged.get(CONTENT_TYPE).unwrap(), "text/plain");
        assert_eq!(merged.get(AUTHORIZATION).unwrap(), "Bearer token");
        assert_eq!(merged.get("x-request-id").unwrap(), "abc");
    }

    #[tokio::test]
    async fn empty_debate_scenario_is_rejected_locally() {
        let api = ApiClient::new(&Settings::default()).unwrap();
        let err = api.debate("   ").await.unwrap_err();
        assert!(matches!(err, ClientError::MissingData(_)));
    }
}
