//! Image requests and content-type preference lists.

use crate::constraint::Constraint;
use crate::error::BackdropError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Path prefix, relative to the endpoint base URL, under which images are served.
pub const IMAGES_PATH: &str = "images/";

/// Encodings the image endpoint can serve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    Webp,
    Jpeg,
}

impl ImageFormat {
    pub fn mime_type(self) -> &'static str {
        match self {
            ImageFormat::Webp => "image/webp",
            ImageFormat::Jpeg => "image/jpeg",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            ImageFormat::Webp => "webp",
            ImageFormat::Jpeg => "jpg",
        }
    }
}

/// Ordered content-type preference, most preferred first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcceptList(Vec<ImageFormat>);

impl AcceptList {
    pub fn new(formats: Vec<ImageFormat>) -> Self {
        Self(formats)
    }

    pub fn jpeg_only() -> Self {
        Self(vec![ImageFormat::Jpeg])
    }

    pub fn modern() -> Self {
        Self(vec![ImageFormat::Webp, ImageFormat::Jpeg])
    }

    pub fn formats(&self) -> &[ImageFormat] {
        &self.0
    }

    pub fn to_header_value(&self) -> String {
        self.0
            .iter()
            .map(|f| f.mime_type())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for AcceptList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_header_value())
    }
}

/// Request for one sized, encoded variant of an image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRequest {
    pub identifier: String,
    pub constraint: Constraint,
    pub accept: AcceptList,
}

impl ImageRequest {
    pub fn new(
        identifier: &str,
        constraint: Constraint,
        accept: AcceptList,
    ) -> Result<Self, BackdropError> {
        validate_identifier(identifier)?;
        Ok(Self {
            identifier: identifier.to_string(),
            constraint,
            accept,
        })
    }

    /// `images/{identifier}` plus the constraint query, if any.
    ///
    /// Also the cache key for the fetched variant.
    pub fn relative_url(&self) -> String {
        let query = self.constraint.to_query_string();
        if query.is_empty() {
            format!("{}{}", IMAGES_PATH, self.identifier)
        } else {
            format!("{}{}?{}", IMAGES_PATH, self.identifier, query)
        }
    }
}

fn validate_identifier(identifier: &str) -> Result<(), BackdropError> {
    let invalid = |reason: &str| {
        Err(BackdropError::InvalidArgument(format!(
            "Invalid image identifier '{}': {}",
            identifier, reason
        )))
    };
    if identifier.trim().is_empty() {
        return invalid("empty");
    }
    if identifier == "." || identifier == ".." {
        return invalid("relative path component");
    }
    if identifier
        .chars()
        .any(|c| matches!(c, '/' | '\\' | '?' | '#') || c.is_control())
    {
        return invalid("contains a reserved character");
    }
    Ok(())
}
