//! Rendering targets for resolved backgrounds.

use super::request::ImageFormat;
use super::variant::{ImageVariant, Legend};
use crate::error::BackdropError;
use parking_lot::RwLock;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info};

/// Where backgrounds and the legend are displayed.
pub trait BackgroundSurface: Send + Sync {
    /// Put `variant` on top of any previous background.
    fn show_background(&self, variant: Arc<ImageVariant>);

    /// Update the location/date text and the theme colour.
    fn update_legend(&self, legend: &Legend);

    /// Display the fallback background, used when nothing could be fetched.
    fn show_fallback(&self, legend: &Legend);
}

/// One background layer, in insertion order.
#[derive(Debug, Clone)]
pub enum Layer {
    Image(Arc<ImageVariant>),
    Fallback,
}

#[derive(Debug, Default)]
struct MemoryState {
    layers: Vec<Layer>,
    legend: Option<Legend>,
}

/// Surface that records what it was asked to display.
#[derive(Debug, Default)]
pub struct MemorySurface {
    state: RwLock<MemoryState>,
}

impl MemorySurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn layers(&self) -> Vec<Layer> {
        self.state.read().layers.clone()
    }

    pub fn top(&self) -> Option<Layer> {
        self.state.read().layers.last().cloned()
    }

    pub fn legend(&self) -> Option<Legend> {
        self.state.read().legend.clone()
    }
}

impl BackgroundSurface for MemorySurface {
    fn show_background(&self, variant: Arc<ImageVariant>) {
        self.state.write().layers.push(Layer::Image(variant));
    }

    fn update_legend(&self, legend: &Legend) {
        self.state.write().legend = Some(legend.clone());
    }

    fn show_fallback(&self, legend: &Legend) {
        let mut state = self.state.write();
        state.layers.push(Layer::Fallback);
        state.legend = Some(legend.clone());
    }
}

/// Surface writing `background.{ext}` and `legend.json` into a directory.
pub struct DirectorySurface {
    dir: PathBuf,
}

impl DirectorySurface {
    pub fn new(dir: &Path) -> Result<Self, BackdropError> {
        std::fs::create_dir_all(dir).map_err(|e| {
            BackdropError::Io(format!(
                "Failed to create output directory {}: {}",
                dir.display(),
                e
            ))
        })?;
        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    pub fn legend_path(&self) -> PathBuf {
        self.dir.join("legend.json")
    }

    fn write(&self, name: &str, bytes: &[u8]) {
        let path = self.dir.join(name);
        match std::fs::write(&path, bytes) {
            Ok(()) => info!(path = %path.display(), bytes = bytes.len(), "Wrote background output"),
            Err(e) => error!(path = %path.display(), error = %e, "Failed to write background output"),
        }
    }

    /// Delete `background.*` files other than the one for `keep`.
    fn remove_backgrounds(&self, keep: Option<ImageFormat>) {
        for format in [ImageFormat::Jpeg, ImageFormat::Webp] {
            if Some(format) == keep {
                continue;
            }
            let path = self.dir.join(format!("background.{}", format.extension()));
            match std::fs::remove_file(&path) {
                Ok(()) => info!(path = %path.display(), "Removed stale background output"),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => error!(
                    path = %path.display(),
                    error = %e,
                    "Failed to remove background output"
                ),
            }
        }
    }

    fn write_legend(&self, legend: &Legend) {
        match serde_json::to_vec_pretty(legend) {
            Ok(json) => self.write("legend.json", &json),
            Err(e) => error!(error = %e, "Failed to serialize legend"),
        }
    }
}

impl BackgroundSurface for DirectorySurface {
    fn show_background(&self, variant: Arc<ImageVariant>) {
        let name = format!("background.{}", variant.format.extension());
        self.write(&name, &variant.body);
        self.remove_backgrounds(Some(variant.format));
    }

    fn update_legend(&self, legend: &Legend) {
        self.write_legend(legend);
    }

    fn show_fallback(&self, legend: &Legend) {
        self.remove_backgrounds(None);
        self.write_legend(legend);
    }
}
