//! Content-type negotiation.
//!
//! The preferred encoding is expressed through the `Accept` header only. Whether
//! WebP goes first is decided once per process, either from configuration or by
//! decoding a 1x1 WebP sample.

use super::request::{AcceptList, ImageFormat};
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{debug, info};

/// 1x1 lossy WebP image.
pub const WEBP_SAMPLE: &str = "UklGRiIAAABXRUJQVlA4IBYAAAAwAQCdASoBAAEADsD+JaQAA3AAAAAA";

/// Whether to prefer modern encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModernFormats {
    /// Probe decode support once and memoise it.
    #[default]
    Auto,
    Always,
    Never,
}

/// Answers whether the client can display a given encoding.
#[async_trait]
pub trait DecodeProbe: Send + Sync {
    async fn supports(&self, format: ImageFormat) -> bool;
}

/// Probe backed by the `image` crate's decoders.
#[derive(Debug, Default, Clone, Copy)]
pub struct ImageCrateProbe;

impl ImageCrateProbe {
    fn decode_webp_sample() -> bool {
        match STANDARD.decode(WEBP_SAMPLE) {
            Ok(bytes) => Self::decodes_as_webp(&bytes),
            Err(_) => false,
        }
    }

    fn decodes_as_webp(bytes: &[u8]) -> bool {
        match image::load_from_memory_with_format(bytes, image::ImageFormat::WebP) {
            Ok(img) => img.width() > 0 && img.height() > 0,
            Err(e) => {
                debug!(error = %e, "WebP sample failed to decode");
                false
            }
        }
    }
}

#[async_trait]
impl DecodeProbe for ImageCrateProbe {
    async fn supports(&self, format: ImageFormat) -> bool {
        match format {
            ImageFormat::Jpeg => true,
            ImageFormat::Webp => Self::decode_webp_sample(),
        }
    }
}

pub struct FormatNegotiator {
    mode: ModernFormats,
    probe: Arc<dyn DecodeProbe>,
    webp: OnceCell<bool>,
}

impl FormatNegotiator {
    pub fn new(mode: ModernFormats, probe: Arc<dyn DecodeProbe>) -> Self {
        Self {
            mode,
            probe,
            webp: OnceCell::new(),
        }
    }

    pub async fn accept_list(&self) -> AcceptList {
        let webp = match self.mode {
            ModernFormats::Always => true,
            ModernFormats::Never => false,
            ModernFormats::Auto => {
                *self
                    .webp
                    .get_or_init(|| async {
                        let supported = self.probe.supports(ImageFormat::Webp).await;
                        info!(webp = supported, "Probed image decode support");
                        supported
                    })
                    .await
            }
        };

        if webp {
            AcceptList::modern()
        } else {
            AcceptList::jpeg_only()
        }
    }
}
