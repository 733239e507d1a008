use std::fs;

use backdrop::background::ModernFormats;
use backdrop::config::ConfigLoader;
use backdrop::error::BackdropError;
use tempfile::TempDir;

fn write_config(dir: &TempDir, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join("backdrop.toml");
    fs::write(&path, contents).unwrap();
    path
}

#[test]
fn explicit_file_overrides_defaults() {
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        r##"
[endpoint]
base_url = "https://images.example.org/gallery"
timeout_secs = 5

[cache]
capacity = 4

[formats]
modern = "never"

[fallback]
main_color = "#101820"
location = "Nowhere in particular"
"##,
    );

    let config = ConfigLoader::load_from_file(&path).unwrap();
    assert_eq!(config.endpoint.timeout_secs, 5);
    assert_eq!(
        config.endpoint.base_url().unwrap().as_str(),
        "https://images.example.org/gallery/"
    );
    assert_eq!(config.endpoint.catalog_path, "images/");
    assert_eq!(config.cache.capacity, 4);
    assert_eq!(config.formats.modern, ModernFormats::Never);

    let legend = config.fallback.legend();
    assert_eq!(legend.main_color, "#101820");
    assert_eq!(legend.location, "Nowhere in particular");

    // Untouched sections keep their defaults.
    assert_eq!(config.breakpoint_set().unwrap().len(), 14);
    assert_eq!(config.logging.level, "warn");
}

#[test]
fn missing_explicit_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    let err = ConfigLoader::load_from_file(&dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, BackdropError::Config(_)), "got {:?}", err);
}

#[test]
fn invalid_values_are_rejected_on_load() {
    let dir = TempDir::new().unwrap();

    let path = write_config(&dir, "[cache]\ncapacity = 0\n");
    assert!(matches!(
        ConfigLoader::load_from_file(&path),
        Err(BackdropError::Config(_))
    ));

    let path = write_config(&dir, "[endpoint]\nbase_url = \"ftp://example.org/\"\n");
    assert!(matches!(
        ConfigLoader::load_from_file(&path),
        Err(BackdropError::Config(_))
    ));
}

#[test]
fn defaults_are_valid() {
    let config = ConfigLoader::default();
    config.validate().unwrap();
    assert_eq!(config.cache.capacity, 32);
    assert_eq!(config.formats.modern, ModernFormats::Auto);
    assert_eq!(
        config.endpoint.base_url().unwrap().as_str(),
        "http://localhost:8080/"
    );
}
