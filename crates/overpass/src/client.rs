use std::env;
use std::time::Duration;

use crate::{query::Query, response::Response, ApiError};

pub const OVERPASS_API_URL: &str = "https://overpass-api.de/api/interpreter";

#[derive(Debug, Clone)]
pub struct OverpassConfig {
    pub url: String,
    pub proxy: Option<String>,
    /// `None` keeps the transport default.
    pub timeout: Option<Duration>,
}

impl Default for OverpassConfig {
    fn default() -> Self {
        Self {
            url: OVERPASS_API_URL.to_owned(),
            proxy: None,
            timeout: None,
        }
    }
}

impl OverpassConfig {
    pub fn from_env() -> Self {
        let url = env::var("OVERPASS_URL").unwrap_or_else(|_| OVERPASS_API_URL.to_owned());
        let proxy = env::var("OVERPASS_PROXY").ok();
        let timeout = env::var("OVERPASS_TIMEOUT_SECS").ok().and_then(|secs| {
            secs.parse::<u64>()
                .map(Duration::from_secs)
                .map_err(|why| {
                    log::warn!("Ignoring OVERPASS_TIMEOUT_SECS '{}': {}", secs, why);
                })
                .ok()
        });

        Self {
            url,
            proxy,
            timeout,
        }
    }
}

pub struct OverpassClient {
    pub config: OverpassConfig,
    http: reqwest::Client,
}

impl OverpassClient {
    pub fn new(config: OverpassConfig) -> Result<Self, ApiError> {
        /* build the http client with optional proxy and timeout */
        let mut builder = reqwest::Client::builder()
            .user_agent(concat!("annotator/", env!("CARGO_PKG_VERSION")));
        if let Some(proxy_url) = &config.proxy {
            log::info!("Using proxy '{proxy_url}' for the road data service.");
            builder = builder.proxy(reqwest::Proxy::all(proxy_url)?);
        }
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            http: builder.build()?,
            config,
        })
    }

    /// Run a single query. Every call issues exactly one request.
    pub async fn get(&self, query: &Query) -> Result<Response, ApiError> {
        log::debug!("Requesting '{}' with query {:?}.", self.config.url, query.text());

        /* perform request */
        let response = self
            .http
            .post(&self.config.url)
            .form(&[("data", query.text())])
            .send()
            .await?;

        /* parse response */
        match response.status() {
            reqwest::StatusCode::OK => Ok(serde_json::from_str(&response.text().await?)?),
            other => Err(ApiError::InvalidResponse {
                status_code: other,
                url: self.config.url.clone(),
                response: response.text().await.ok(),
            }),
        }
    }
}
