//! reqwest-backed image source.

use super::{catalog::parse_catalog, FetchedImage, ImageSource};
use crate::background::request::{ImageRequest, IMAGES_PATH};
use crate::config::EndpointConfig;
use crate::error::BackdropError;
use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;
use url::Url;

pub struct HttpImageSource {
    client: reqwest::Client,
    base_url: Url,
    catalog_url: Url,
}

impl HttpImageSource {
    pub fn new(config: &EndpointConfig) -> Result<Self, BackdropError> {
        let base_url = config.base_url()?;
        let catalog_url = base_url.join(&config.catalog_path).map_err(|e| {
            BackdropError::Config(format!(
                "Invalid catalog path '{}': {}",
                config.catalog_path, e
            ))
        })?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("backdrop/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| BackdropError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url,
            catalog_url,
        })
    }

    /// Absolute URL for `request`, with the identifier percent-encoded as a
    /// single path segment.
    pub fn request_url(&self, request: &ImageRequest) -> Result<Url, BackdropError> {
        let cannot_build = |reason: String| {
            BackdropError::InvalidArgument(format!(
                "Cannot build URL for image '{}': {}",
                request.identifier, reason
            ))
        };
        let mut url = self
            .base_url
            .join(IMAGES_PATH)
            .map_err(|e| cannot_build(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| cannot_build("base URL cannot have a path".to_string()))?
            .pop_if_empty()
            .push(&request.identifier);

        let query = request.constraint.to_query_string();
        if !query.is_empty() {
            url.set_query(Some(&query));
        }
        Ok(url)
    }
}

#[async_trait]
impl ImageSource for HttpImageSource {
    async fn fetch(&self, request: &ImageRequest) -> Result<FetchedImage, BackdropError> {
        let url = self.request_url(request)?;
        debug!(url = %url, accept = %request.accept, "Fetching image");

        let response = self
            .client
            .get(url)
            .header(ACCEPT, request.accept.to_header_value())
            .send()
            .await?
            .error_for_status()?;

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let headers: HashMap<String, String> = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_ascii_lowercase(), v.to_string()))
            })
            .collect();
        let body = response.bytes().await?.to_vec();

        Ok(FetchedImage {
            content_type,
            headers,
            body,
        })
    }

    async fn list_catalog(&self) -> Result<Vec<String>, BackdropError> {
        debug!(url = %self.catalog_url, "Fetching image catalog");
        let body = self
            .client
            .get(self.catalog_url.clone())
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;
        parse_catalog(&body)
    }
}
