//! Configuration loading and parsing

use anyhow::{Context, Result};
use eventselect_core::AnalysisConfig;
use std::fs;
use std::path::Path;

/// Load the analysis configuration from a TOML file
///
/// Every table and key is optional; missing values take their defaults.
pub fn load_config(path: &Path) -> Result<AnalysisConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: AnalysisConfig = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    config
        .validate()
        .with_context(|| format!("Invalid configuration in {:?}", path))?;

    Ok(config)
}

/// Resolve the effective configuration for one invocation
///
/// Starts from the file (or the defaults) and applies the `--tree` override.
pub fn resolve(path: Option<&Path>, tree: Option<&str>) -> Result<AnalysisConfig> {
    let mut config = match path {
        Some(path) => {
            log::info!("Loading configuration from: {:?}", path);
            load_config(path)?
        }
        None => AnalysisConfig::default(),
    };

    if let Some(tree) = tree {
        config.tree_name = tree.to_string();
    }

    log::debug!("Effective configuration: {:?}", config);
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_config_deserialization() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
            tree_name = "nominal"

            [selection]
            default_min_missing_et_gev = 25.0

            [histogram]
            bins = 40
            "#
        )
        .unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.tree_name, "nominal");
        assert_eq!(config.selection.default_min_missing_et_gev, 25.0);
        assert_eq!(config.histogram.bins, 40);
        assert_eq!(config.histogram.high, 200.0);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[histogram]\nlow = 50.0\nhigh = 10.0").unwrap();

        let err = load_config(file.path()).unwrap_err();
        assert!(format!("{:#}", err).contains("Invalid configuration"));
    }

    #[test]
    fn test_tree_override() {
        let config = resolve(None, Some("events")).unwrap();
        assert_eq!(config.tree_name, "events");

        let config = resolve(None, None).unwrap();
        assert_eq!(config.tree_name, "mini");
    }
}
