//! ConfigLoader facade delegating to merge service.

use super::merge::service::MergeService;
use super::BackdropConfig;
use crate::error::BackdropError;
use std::path::Path;

/// Configuration loader facade.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from the global file and environment.
    pub fn load() -> Result<BackdropConfig, BackdropError> {
        Self::checked(MergeService::load(None)?)
    }

    /// Load configuration with an explicit file layered over the global one.
    pub fn load_from_file(path: &Path) -> Result<BackdropConfig, BackdropError> {
        if !path.exists() {
            return Err(BackdropError::Config(format!(
                "Config file not found: {}",
                path.display()
            )));
        }
        Self::checked(MergeService::load(Some(path))?)
    }

    /// Create default configuration.
    pub fn default() -> BackdropConfig {
        BackdropConfig::default()
    }

    fn checked(config: BackdropConfig) -> Result<BackdropConfig, BackdropError> {
        config.validate()?;
        Ok(config)
    }
}
