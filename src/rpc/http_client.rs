use std::time::{Duration, Instant};

use log::trace;
use reqwest::StatusCode;
use reqwest::header::CONTENT_TYPE;
use serde_json::Value;
use tokio::sync::RwLock;
use url::Url;

use super::error::{CallFault, InitializerError};
use super::network_log::{NETWORK_LOG_TARGET, NetworkLogMiddleware};

pub(crate) const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Status and body of a completed HTTP exchange, before classification.
#[derive(Debug)]
pub(crate) struct RawResponse {
    pub status: StatusCode,
    pub body: String,
}

pub(crate) struct HttpClient {
    base_url: Url,
    client: reqwest_middleware::ClientWithMiddleware,
    network_log: bool,
    last_latency: RwLock<Option<(Duration, Instant)>>,
}

impl HttpClient {
    pub fn new(node_url: &str, timeout: Duration, network_log: bool) -> Result<Self, InitializerError> {
        let base_url = parse_base_url(node_url)?;
        let inner_client = reqwest::Client::builder().timeout(timeout).build()?;

        let mut builder = reqwest_middleware::ClientBuilder::new(inner_client);
        if network_log {
            builder = builder.with(NetworkLogMiddleware);
        }

        Ok(Self {
            base_url,
            client: builder.build(),
            network_log,
            last_latency: RwLock::new(None),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// POSTs `body` as JSON to `path` and returns whatever came back.
    ///
    /// Only failures to complete the exchange are errors here; HTTP error
    /// statuses are returned as a [`RawResponse`] for the caller to classify.
    pub async fn post(&self, path: &str, body: Option<&Value>) -> Result<RawResponse, CallFault> {
        let start = Instant::now();
        let url = self.base_url.join(path)?;

        let mut req = self.client.post(url).header(CONTENT_TYPE, "application/json");
        if let Some(body) = body {
            req = req.body(serde_json::to_string(body).map_err(CallFault::Encode)?);
        }

        let resp = req.send().await?;
        let status = resp.status();
        let body = resp.text().await?;

        self.update_latency(start.elapsed()).await;

        if self.network_log {
            trace!(
                target: NETWORK_LOG_TARGET,
                path = path,
                status = status.as_u16(),
                body = body.as_str();
                "Response body"
            );
        }

        Ok(RawResponse { status, body })
    }

    async fn update_latency(&self, duration: Duration) {
        *self.last_latency.write().await = Some((duration, Instant::now()));
    }

    pub async fn get_latency(&self) -> Option<Duration> {
        self.last_latency.read().await.map(|(d, _)| d)
    }
}

/// Validates the node URL and normalizes it so relative endpoint paths join
/// beneath it.
fn parse_base_url(node_url: &str) -> Result<Url, InitializerError> {
    let mut url = Url::parse(node_url).map_err(|source| InitializerError::InvalidUrl {
        url: node_url.to_string(),
        source,
    })?;

    match url.scheme() {
        "http" | "https" => {},
        other => return Err(InitializerError::UnsupportedScheme(other.to_string())),
    }

    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }

    Ok(url)
}
