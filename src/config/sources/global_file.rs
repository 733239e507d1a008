//! Global config file: `$XDG_CONFIG_HOME/backdrop/config.toml`, optional.

use crate::config::xdg;
use config::builder::DefaultState;
use config::{ConfigBuilder, ConfigError, File};
use tracing::debug;

pub fn add_to_builder(
    builder: ConfigBuilder<DefaultState>,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    match xdg::global_config_path() {
        Ok(path) => {
            debug!(path = %path.display(), "Global config layer");
            Ok(builder.add_source(File::from(path).required(false)))
        }
        Err(e) => {
            debug!(error = %e, "No global config directory; skipping global config");
            Ok(builder)
        }
    }
}
