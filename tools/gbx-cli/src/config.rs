//! Configuration loading (gbx.toml)

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use gbx::DecodeOptions;
use serde::{Deserialize, Serialize};

const CONFIG_FILE: &str = "gbx.toml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub decode: DecodeOptions,
}

pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("io", "gbx", "gbx").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Load the configuration
///
/// An explicit path must exist. Without one, `gbx.toml` in the config directory is
/// used when present, and defaults otherwise.
pub fn load(explicit: Option<&Path>) -> Result<Config> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => match config_dir().map(|dir| dir.join(CONFIG_FILE)) {
            Some(path) if path.is_file() => path,
            _ => return Ok(Config::default()),
        },
    };

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    let config = parse(&content).with_context(|| format!("Invalid config {}", path.display()))?;
    tracing::debug!("loaded config from {}", path.display());
    Ok(config)
}

fn parse(content: &str) -> Result<Config> {
    Ok(toml::from_str(content)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        assert_eq!(parse("").unwrap(), Config::default());
    }

    #[test]
    fn test_partial_decode_section() {
        let config = parse("[decode]\nstrict_chunk_sizes = false\n").unwrap();
        assert!(!config.decode.strict_chunk_sizes);
        assert_eq!(config.decode.max_embedded_depth, 4);
    }

    #[test]
    fn test_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(&path, "[decode]\nmax_node_depth = 32\n").unwrap();

        let config = load(Some(&path)).unwrap();
        assert_eq!(config.decode.max_node_depth, 32);
    }

    #[test]
    fn test_missing_explicit_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load(Some(&dir.path().join("absent.toml"))).is_err());
    }

    #[test]
    fn test_invalid_toml_fails() {
        assert!(parse("[decode\n").is_err());
        assert!(parse("[decode]\nmax_node_depth = \"deep\"\n").is_err());
    }
}
