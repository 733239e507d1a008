//! Environment variable source: BACKDROP__* prefix with __ separator

use config::builder::DefaultState;
use config::{ConfigBuilder, ConfigError, Environment, Map};

const LIST_KEYS: &[&str] = &["breakpoints.widths", "breakpoints.heights"];

/// Add environment variable overlay to builder.
///
/// `BACKDROP__CACHE__CAPACITY=8` sets `cache.capacity`;
/// `BACKDROP__BREAKPOINTS__WIDTHS=480,1280` sets a breakpoint list.
pub fn add_to_builder(
    builder: ConfigBuilder<DefaultState>,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Ok(builder.add_source(source(None)))
}

/// `vars` replaces the process environment when given.
fn source(vars: Option<Map<String, String>>) -> Environment {
    LIST_KEYS
        .iter()
        .fold(
            Environment::with_prefix("BACKDROP")
                .prefix_separator("__")
                .separator("__")
                .list_separator(","),
            |env, key| env.with_list_parse_key(key),
        )
        .try_parsing(true)
        .source(vars)
}
