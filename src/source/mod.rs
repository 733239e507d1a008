//! Image sources
//!
//! The resolver never talks HTTP directly; it goes through [`ImageSource`], which
//! the HTTP client implements and tests replace with in-memory fakes.

pub mod catalog;
pub mod http;

pub use catalog::{parse_catalog, select_image, CatalogEntry};
pub use http::HttpImageSource;

use crate::background::request::ImageRequest;
use crate::error::BackdropError;
use async_trait::async_trait;
use std::collections::HashMap;

/// Raw response for an image request.
#[derive(Debug, Clone, Default)]
pub struct FetchedImage {
    pub content_type: Option<String>,
    /// Header names are lowercased.
    pub headers: HashMap<String, String>,
    pub body: Vec<u8>,
}

impl FetchedImage {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// First header among `names` that is present and non-blank.
    pub fn first_header(&self, names: &[&str]) -> Option<&str> {
        names
            .iter()
            .filter_map(|name| self.header(name))
            .map(str::trim)
            .find(|v| !v.is_empty())
    }
}

/// Backend serving image variants and the image catalog.
#[async_trait]
pub trait ImageSource: Send + Sync {
    async fn fetch(&self, request: &ImageRequest) -> Result<FetchedImage, BackdropError>;

    /// Selectable image identifiers.
    async fn list_catalog(&self) -> Result<Vec<String>, BackdropError>;
}
