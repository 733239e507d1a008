//! Fetched image variants and their legend metadata.

use super::request::ImageFormat;
use crate::error::BackdropError;
use crate::source::FetchedImage;
use chrono::DateTime;
use serde::{Deserialize, Serialize};
use std::io::Cursor;
use tracing::warn;

pub const MAIN_COLOR_HEADERS: &[&str] = &["X-Main-Color", "X-Quba-Main-Color"];
pub const LOCATION_HEADERS: &[&str] = &["X-Location", "X-Quba-Location"];
pub const DATE_HEADERS: &[&str] = &["X-Date", "X-Quba-Date"];

/// Text shown alongside the background, plus the page theme colour.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Legend {
    pub main_color: String,
    pub location: String,
    pub date: String,
}

/// A decoded-checked image body with its legend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageVariant {
    /// Relative request URL the variant was fetched from.
    pub key: String,
    pub format: ImageFormat,
    pub width: u32,
    pub height: u32,
    pub body: Vec<u8>,
    pub legend: Legend,
}

impl ImageVariant {
    /// Validate the body and read the legend from response headers.
    ///
    /// Missing legend headers fall back to `defaults`; an undecodable body is
    /// an error.
    pub fn from_fetched(
        key: String,
        fetched: FetchedImage,
        defaults: &Legend,
    ) -> Result<Self, BackdropError> {
        let (format, width, height) = inspect_body(&fetched.body)?;

        let mut missing: Vec<&'static str> = Vec::new();
        let mut pick = |names: &[&'static str], default: &str| match fetched.first_header(names) {
            Some(v) => v.to_string(),
            None => {
                missing.push(names[0]);
                default.to_string()
            }
        };
        let main_color = pick(MAIN_COLOR_HEADERS, &defaults.main_color);
        let location = pick(LOCATION_HEADERS, &defaults.location);
        let date = fetched
            .first_header(DATE_HEADERS)
            .map(format_date)
            .unwrap_or_else(|| {
                missing.push(DATE_HEADERS[0]);
                defaults.date.clone()
            });

        if !missing.is_empty() {
            warn!(key = %key, missing = ?missing, "Image response is missing legend headers");
        }

        Ok(Self {
            key,
            format,
            width,
            height,
            body: fetched.body,
            legend: Legend {
                main_color,
                location,
                date,
            },
        })
    }
}

/// Integer dates are UNIX seconds, rendered as "June 2021". Anything else is
/// shown as sent.
pub fn format_date(raw: &str) -> String {
    let raw = raw.trim();
    match raw.parse::<i64>().ok().and_then(|s| DateTime::from_timestamp(s, 0)) {
        Some(dt) => dt.format("%B %Y").to_string(),
        None => raw.to_string(),
    }
}

fn inspect_body(body: &[u8]) -> Result<(ImageFormat, u32, u32), BackdropError> {
    if body.is_empty() {
        return Err(BackdropError::Decode("Empty image body".to_string()));
    }
    let reader = image::ImageReader::new(Cursor::new(body))
        .with_guessed_format()
        .map_err(|e| BackdropError::Decode(e.to_string()))?;
    let format = match reader.format() {
        Some(image::ImageFormat::Jpeg) => ImageFormat::Jpeg,
        Some(image::ImageFormat::WebP) => ImageFormat::Webp,
        Some(other) => {
            return Err(BackdropError::Decode(format!(
                "Unsupported image format: {:?}",
                other
            )))
        }
        None => return Err(BackdropError::Decode("Unrecognised image data".to_string())),
    };
    let (width, height) = reader
        .into_dimensions()
        .map_err(|e| BackdropError::Decode(e.to_string()))?;
    Ok((format, width, height))
}
