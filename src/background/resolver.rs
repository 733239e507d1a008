//! Background Resolver
//!
//! Turns an (image identifier, constraint) pair into an image variant: builds the
//! request, negotiates the encoding, serves from the variant cache when it can and
//! fetches otherwise.

use super::cache::{CacheStats, VariantCache};
use super::negotiation::FormatNegotiator;
use super::request::ImageRequest;
use super::variant::{ImageVariant, Legend};
use crate::constraint::Constraint;
use crate::error::BackdropError;
use crate::source::ImageSource;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Debug, Clone)]
pub struct Resolved {
    pub variant: Arc<ImageVariant>,
    pub from_cache: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolverStats {
    /// Requests sent to the image source.
    pub fetches: u64,
    pub cache: CacheStats,
}

pub struct BackgroundResolver {
    source: Arc<dyn ImageSource>,
    cache: VariantCache,
    negotiator: FormatNegotiator,
    defaults: Legend,
    fetches: AtomicU64,
}

impl BackgroundResolver {
    pub fn new(
        source: Arc<dyn ImageSource>,
        cache: VariantCache,
        negotiator: FormatNegotiator,
        defaults: Legend,
    ) -> Self {
        Self {
            source,
            cache,
            negotiator,
            defaults,
            fetches: AtomicU64::new(0),
        }
    }

    pub fn source(&self) -> &Arc<dyn ImageSource> {
        &self.source
    }

    /// Legend used when headers are missing or no image could be shown.
    pub fn defaults(&self) -> &Legend {
        &self.defaults
    }

    pub async fn resolve(
        &self,
        identifier: &str,
        constraint: &Constraint,
    ) -> Result<Resolved, BackdropError> {
        let accept = self.negotiator.accept_list().await;
        let request = ImageRequest::new(identifier, *constraint, accept)?;
        let key = request.relative_url();

        if let Some(variant) = self.cache.get(&key) {
            debug!(key = %key, "Using cached variant");
            return Ok(Resolved {
                variant,
                from_cache: true,
            });
        }

        info!(key = %key, accept = %request.accept, "Fetching variant");
        self.fetches.fetch_add(1, Ordering::Relaxed);
        let fetched = self.source.fetch(&request).await?;
        let variant = Arc::new(ImageVariant::from_fetched(
            key.clone(),
            fetched,
            &self.defaults,
        )?);

        if let Some(evicted) = self.cache.insert(key, variant.clone()) {
            debug!(key = %evicted.key, "Evicted cached variant");
        }

        Ok(Resolved {
            variant,
            from_cache: false,
        })
    }

    pub fn stats(&self) -> ResolverStats {
        ResolverStats {
            fetches: self.fetches.load(Ordering::Relaxed),
            cache: self.cache.stats(),
        }
    }
}
