use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::coverage::{Metric, Thresholds};
use crate::emma::DEFAULT_INDENT;

pub const CONFIG_FILE: &str = "cov2emma.toml";

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub thresholds: Thresholds,
    #[serde(default)]
    pub output: Output,
}

#[derive(Debug, Deserialize)]
pub struct Output {
    /// Spaces per indentation level, 0 writes a single line
    #[serde(default = "default_indent")]
    pub indent: usize,
}

impl Default for Output {
    fn default() -> Self {
        Self {
            indent: default_indent(),
        }
    }
}

fn default_indent() -> usize {
    DEFAULT_INDENT
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;

        config.validate()?;

        Ok(config)
    }

    /// Load `path` if given, else `cov2emma.toml` when present, else defaults
    pub fn discover(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None if Path::new(CONFIG_FILE).exists() => Self::load(Path::new(CONFIG_FILE)),
            None => Ok(Self::default()),
        }
    }

    fn validate(&self) -> Result<()> {
        for metric in Metric::ALL {
            if let Some(value) = self.thresholds.get(metric) {
                if !(0.0..=100.0).contains(&value) {
                    anyhow::bail!(
                        "Threshold '{}' must be between 0 and 100, got {}",
                        metric.name(),
                        value
                    );
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_parse_config() {
        let toml_content = r#"
[thresholds]
line = 80
block = 65.5

[output]
indent = 4
"#;

        let config: Config = toml::from_str(toml_content).unwrap();
        assert_eq!(config.thresholds.line, Some(80.0));
        assert_eq!(config.thresholds.block, Some(65.5));
        assert_eq!(config.thresholds.class, None);
        assert_eq!(config.output.indent, 4);
    }

    #[test]
    fn test_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert!(config.thresholds.is_empty());
        assert_eq!(config.output.indent, DEFAULT_INDENT);
    }

    #[test]
    fn test_load_rejects_out_of_range_threshold() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, "[thresholds]\nmethod = 120\n").unwrap();

        let err = Config::load(&path).unwrap_err();
        assert!(err.to_string().contains("method"));
    }

    #[test]
    fn test_discover_explicit_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        fs::write(&path, "[output]\nindent = 0\n").unwrap();

        let config = Config::discover(Some(path.as_path())).unwrap();
        assert_eq!(config.output.indent, 0);
        let missing = dir.path().join("missing.toml");
        assert!(Config::discover(Some(missing.as_path())).is_err());
    }
}
