//! Image catalog parsing and per-session image selection.

use super::ImageSource;
use crate::error::BackdropError;
use rand::Rng;
use serde::Deserialize;
use tracing::{debug, info};

/// One catalog entry as served by the image endpoint.
///
/// Plain listings are arrays of names; directory-index listings are arrays of
/// `{ "name": ..., "type": ... }` objects.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum CatalogEntry {
    Name(String),
    Entry {
        name: String,
        #[serde(rename = "type", default)]
        kind: Option<String>,
    },
}

impl CatalogEntry {
    /// Identifier if the entry names a selectable file.
    pub fn into_identifier(self) -> Option<String> {
        match self {
            CatalogEntry::Name(name) => Some(name),
            CatalogEntry::Entry { name, kind } => match kind.as_deref() {
                None | Some("file") => Some(name),
                Some(_) => None,
            },
        }
        .filter(|name| !name.trim().is_empty())
    }
}

pub fn parse_catalog(bytes: &[u8]) -> Result<Vec<String>, BackdropError> {
    let entries: Vec<CatalogEntry> = serde_json::from_slice(bytes).map_err(|e| {
        BackdropError::MalformedResponse(format!("Invalid image catalog: {}", e))
    })?;
    Ok(entries
        .into_iter()
        .filter_map(CatalogEntry::into_identifier)
        .collect())
}

/// Pick the session image.
///
/// A non-blank explicit identifier wins without contacting the catalog.
pub async fn select_image(
    explicit: Option<&str>,
    source: &dyn ImageSource,
) -> Result<String, BackdropError> {
    if let Some(id) = explicit.map(str::trim).filter(|id| !id.is_empty()) {
        debug!(image = id, "Using explicitly selected image");
        return Ok(id.to_string());
    }

    let catalog = source.list_catalog().await?;
    let selected = pick_random(&catalog, &mut rand::rng())?;
    info!(image = %selected, catalog_size = catalog.len(), "Selected random image");
    Ok(selected)
}

pub fn pick_random<R: Rng + ?Sized>(
    catalog: &[String],
    rng: &mut R,
) -> Result<String, BackdropError> {
    if catalog.is_empty() {
        return Err(BackdropError::EmptyCatalog);
    }
    Ok(catalog[rng.random_range(0..catalog.len())].clone())
}
