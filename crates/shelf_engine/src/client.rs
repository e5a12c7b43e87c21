use std::time::Duration;

use futures_util::StreamExt;
use serde::de::DeserializeOwned;
use shelf_core::Record;
use shelf_logging::shelf_debug;
use url::Url;

use crate::{FailureKind, FetchError, SectionList};

#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub base_url: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub max_bytes: u64,
    pub sections_path: String,
    pub search_path: String,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:4200/".to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            max_bytes: 5 * 1024 * 1024,
            sections_path: "api/v1/sections".to_string(),
            search_path: "api/v1/snaps".to_string(),
        }
    }
}

impl ClientSettings {
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }
}

/// The two catalog retrievals the storefront issues.
#[async_trait::async_trait]
pub trait CatalogClient: Send + Sync {
    /// Fixed category list; takes no parameters.
    async fn fetch_sections(&self) -> Result<SectionList, FetchError>;

    /// Ranked records matching `query`, in service order.
    async fn search(&self, query: &str) -> Result<Vec<Record>, FetchError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestCatalogClient {
    settings: ClientSettings,
    client: reqwest::Client,
}

impl ReqwestCatalogClient {
    pub fn new(settings: ClientSettings) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| FetchError::new(FailureKind::Network, err.to_string()))?;
        Ok(Self { settings, client })
    }

    pub fn sections_url(&self) -> Result<Url, FetchError> {
        self.endpoint(&self.settings.sections_path)
    }

    /// Search endpoint with `q` as the only query-string field, form-encoded.
    pub fn search_url(&self, query: &str) -> Result<Url, FetchError> {
        let mut url = self.endpoint(&self.settings.search_path)?;
        url.query_pairs_mut().clear().append_pair("q", query);
        Ok(url)
    }

    fn endpoint(&self, path: &str) -> Result<Url, FetchError> {
        Url::parse(&self.settings.base_url)
            .and_then(|base| base.join(path))
            .map_err(|err| FetchError::new(FailureKind::InvalidUrl, err.to_string()))
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, FetchError> {
        shelf_debug!("GET {}", url);
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::new(
                FailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }

        let max_bytes = self.settings.max_bytes;
        if let Some(content_len) = response.content_length() {
            if content_len > max_bytes {
                return Err(FetchError::new(
                    FailureKind::TooLarge {
                        max_bytes,
                        actual: Some(content_len),
                    },
                    "response too large",
                ));
            }
        }

        let mut body = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            let next_len = body.len() as u64 + chunk.len() as u64;
            if next_len > max_bytes {
                return Err(FetchError::new(
                    FailureKind::TooLarge {
                        max_bytes,
                        actual: Some(next_len),
                    },
                    "response too large",
                ));
            }
            body.extend_from_slice(&chunk);
        }

        serde_json::from_slice(&body)
            .map_err(|err| FetchError::new(FailureKind::Decode, err.to_string()))
    }
}

#[async_trait::async_trait]
impl CatalogClient for ReqwestCatalogClient {
    async fn fetch_sections(&self) -> Result<SectionList, FetchError> {
        let url = self.sections_url()?;
        self.get_json(url).await
    }

    async fn search(&self, query: &str) -> Result<Vec<Record>, FetchError> {
        let url = self.search_url(query)?;
        self.get_json(url).await
    }
}

fn map_reqwest_error(err: reqwest::Error) -> FetchError {
    if err.is_timeout() {
        return FetchError::new(FailureKind::Timeout, err.to_string());
    }
    FetchError::new(FailureKind::Network, err.to_string())
}
