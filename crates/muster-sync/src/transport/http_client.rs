//! HTTP client with retry, exponential backoff, timeout and gzip.

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;

use muster_core::config::RemoteConfig;
use muster_core::errors::{MusterError, MusterResult, RemoteError};

use super::protocol::{RemoteRequest, RemoteResponse};

#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    pub base_url: String,
    pub timeout: Duration,
    /// Retries after the first attempt, for 5xx and transport failures.
    pub max_retries: u32,
    /// Doubles after each retry.
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
}

impl From<&RemoteConfig> for HttpClientConfig {
    fn from(config: &RemoteConfig) -> Self {
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            timeout: config.timeout(),
            max_retries: config.max_retries,
            initial_backoff: config.initial_backoff(),
            max_backoff: config.max_backoff(),
        }
    }
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self::from(&RemoteConfig::default())
    }
}

fn net_err(reason: String) -> MusterError {
    RemoteError::Network { reason }.into()
}

/// Async HTTP transport. Wraps reqwest when the `http` feature is enabled;
/// without it every request fails with a network error.
#[derive(Debug)]
pub struct HttpClient {
    config: HttpClientConfig,
    bearer_token: Option<String>,
    #[cfg(feature = "http")]
    inner: reqwest::Client,
}

impl HttpClient {
    pub fn new(config: HttpClientConfig) -> MusterResult<Self> {
        #[cfg(feature = "http")]
        let inner = reqwest::Client::builder()
            .timeout(config.timeout)
            .gzip(true)
            .build()
            .map_err(|e| net_err(e.to_string()))?;

        Ok(Self {
            config,
            bearer_token: None,
            #[cfg(feature = "http")]
            inner,
        })
    }

    pub fn config(&self) -> &HttpClientConfig {
        &self.config
    }

    pub fn set_bearer_token(&mut self, token: String) {
        self.bearer_token = Some(token);
    }

    pub fn clear_bearer_token(&mut self) {
        self.bearer_token = None;
    }

    /// POST `payload` wrapped in a [`RemoteRequest`] and return the raw
    /// response envelope body.
    ///
    /// 4xx responses fail at once with `RemoteError::Rejected`; 5xx and
    /// transport errors are retried with doubling backoff.
    pub async fn post<Req, Resp>(
        &self,
        path: &str,
        payload: &Req,
    ) -> MusterResult<RemoteResponse<Resp>>
    where
        Req: Serialize + Sync,
        Resp: DeserializeOwned,
    {
        let request = RemoteRequest::new(payload);
        let url = format!("{}{}", self.config.base_url, path);

        #[cfg(feature = "http")]
        {
            self.do_request(&url, &request).await
        }

        #[cfg(not(feature = "http"))]
        {
            let _ = (&request, &self.bearer_token);
            Err(net_err(format!("http feature not enabled, cannot reach {url}")))
        }
    }

    #[cfg(feature = "http")]
    async fn do_request<Req, Resp>(
        &self,
        url: &str,
        request: &RemoteRequest<&Req>,
    ) -> MusterResult<RemoteResponse<Resp>>
    where
        Req: Serialize + Sync,
        Resp: DeserializeOwned,
    {
        let mut backoff = self.config.initial_backoff;
        let mut last_err = String::new();

        for attempt in 0..=self.config.max_retries {
            if attempt > 0 {
                tracing::debug!(
                    attempt,
                    max_retries = self.config.max_retries,
                    ?backoff,
                    url,
                    "remote: retrying"
                );
                tokio::time::sleep(backoff).await;
                backoff = (backoff * 2).min(self.config.max_backoff);
            }

            let mut req = self.inner.post(url).json(request);
            if let Some(token) = &self.bearer_token {
                req = req.bearer_auth(token);
            }

            match req.send().await {
                Ok(resp) => {
                    let status = resp.status();
                    if status.is_success() {
                        return resp
                            .json::<RemoteResponse<Resp>>()
                            .await
                            .map_err(|e| net_err(format!("deserialization failed: {e}")));
                    }
                    if status.is_client_error() {
                        let reason = resp.text().await.unwrap_or_default();
                        return Err(RemoteError::Rejected {
                            status: status.as_u16(),
                            reason,
                        }
                        .into());
                    }
                    last_err = format!("HTTP {status}");
                }
                Err(e) => {
                    last_err = e.to_string();
                }
            }
            tracing::warn!(attempt, url, error = %last_err, "remote: request failed");
        }

        Err(net_err(format!(
            "all {} retries exhausted: {last_err}",
            self.config.max_retries
        )))
    }
}
