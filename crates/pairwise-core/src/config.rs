use crate::errors::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub mod path_resolver;

pub const SUPPORTED_CONFIG_VERSION: u32 = 1;

pub const DEFAULT_BASE_URL: &str = "http://localhost:11434/v1";
pub const DEFAULT_MODEL: &str = "llama3.2:1b";
pub const DEFAULT_API_KEY: &str = "ollama";
pub const DEFAULT_DATA_FILE: &str = "preference_data.jsonl";
pub const DEFAULT_CSV_FILE: &str = "preference_data.csv";

/// High enough that two calls with the same prompt diverge.
pub const DEFAULT_TEMPERATURE: f32 = 1.0;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PairwiseConfig {
    pub version: u32,
    pub provider: ProviderSettings,
    pub storage: StorageSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderSettings {
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    /// Name of the environment variable holding the API key.
    pub api_key_env: String,
    pub max_tokens: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    pub data_file: PathBuf,
    pub csv_file: PathBuf,
}

impl Default for PairwiseConfig {
    fn default() -> Self {
        Self {
            version: SUPPORTED_CONFIG_VERSION,
            provider: ProviderSettings::default(),
            storage: StorageSettings::default(),
        }
    }
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            api_key_env: "PAIRWISE_API_KEY".to_string(),
            max_tokens: None,
        }
    }
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            data_file: PathBuf::from(DEFAULT_DATA_FILE),
            csv_file: PathBuf::from(DEFAULT_CSV_FILE),
        }
    }
}

impl ProviderSettings {
    /// Local servers such as Ollama accept any key, so a missing variable is not an error.
    pub fn resolve_api_key(&self) -> String {
        std::env::var(&self.api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_KEY.to_string())
    }
}

impl PairwiseConfig {
    /// Applies `PAIRWISE_MODEL` and `PAIRWISE_BASE_URL` on top of the file values.
    pub fn apply_env(&mut self) {
        if let Ok(v) = std::env::var("PAIRWISE_MODEL") {
            if !v.trim().is_empty() {
                self.provider.model = v;
            }
        }
        if let Ok(v) = std::env::var("PAIRWISE_BASE_URL") {
            if !v.trim().is_empty() {
                self.provider.base_url = v;
            }
        }
    }
}

/// Loads the config at `path`. A missing file yields the defaults.
pub fn load_config(path: &Path) -> Result<PairwiseConfig, ConfigError> {
    if !path.exists() {
        tracing::debug!(
            event = "pairwise.config.defaults",
            path = %path.display(),
            "config file not found, using defaults"
        );
        return Ok(PairwiseConfig::default());
    }

    let raw = std::fs::read_to_string(path)
        .map_err(|e| ConfigError(format!("failed to read config {}: {}", path.display(), e)))?;
    parse_config(&raw, path)
}

fn parse_config(raw: &str, path: &Path) -> Result<PairwiseConfig, ConfigError> {
    let mut ignored_keys = std::collections::BTreeSet::new();
    let deserializer = serde_yaml::Deserializer::from_str(raw);
    let mut cfg: PairwiseConfig = serde_ignored::deserialize(deserializer, |p| {
        ignored_keys.insert(p.to_string());
    })
    .map_err(|e| ConfigError(format!("failed to parse YAML: {}", e)))?;

    if !ignored_keys.is_empty() {
        tracing::warn!(
            event = "pairwise.config.unknown_keys",
            keys = ?ignored_keys,
            path = %path.display(),
            "ignored unknown config fields"
        );
    }

    if cfg.version != SUPPORTED_CONFIG_VERSION {
        return Err(ConfigError(format!(
            "unsupported config version {} (supported: {})",
            cfg.version, SUPPORTED_CONFIG_VERSION
        )));
    }

    check_temperature(cfg.provider.temperature)?;

    if cfg.provider.model.trim().is_empty() {
        return Err(ConfigError("provider.model must not be empty".into()));
    }

    let r = path_resolver::PathResolver::new(path);
    r.resolve(&mut cfg.storage.data_file);
    r.resolve(&mut cfg.storage.csv_file);

    Ok(cfg)
}

/// Sampling temperature accepted by OpenAI-compatible servers.
pub fn check_temperature(t: f32) -> Result<(), ConfigError> {
    if !(0.0..=2.0).contains(&t) {
        return Err(ConfigError(format!(
            "provider.temperature must be within 0.0..=2.0 (got {})",
            t
        )));
    }
    Ok(())
}

pub fn write_sample_config(path: &Path) -> Result<(), ConfigError> {
    std::fs::write(
        path,
        format!(
            r#"version: 1
provider:
  # any OpenAI-compatible chat completions endpoint
  base_url: "{DEFAULT_BASE_URL}"
  model: "{DEFAULT_MODEL}"
  temperature: 1.0
  api_key_env: PAIRWISE_API_KEY
storage:
  # relative paths resolve against this file's directory
  data_file: {DEFAULT_DATA_FILE}
  csv_file: {DEFAULT_CSV_FILE}
"#
        ),
    )
    .map_err(|e| ConfigError(format!("failed to write sample config: {}", e)))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_keeps_defaults() {
        let cfg = parse_config(
            "version: 1\nprovider:\n  model: qwen2.5:0.5b\n",
            Path::new("/work/pairwise.yaml"),
        )
        .unwrap();
        assert_eq!(cfg.provider.model, "qwen2.5:0.5b");
        assert_eq!(cfg.provider.base_url, DEFAULT_BASE_URL);
        assert_eq!(cfg.provider.temperature, DEFAULT_TEMPERATURE);
        assert_eq!(
            cfg.storage.data_file,
            PathBuf::from("/work/preference_data.jsonl")
        );
    }

    #[test]
    fn rejects_unsupported_version() {
        let err = parse_config("version: 7\n", Path::new("pairwise.yaml")).unwrap_err();
        assert!(err.to_string().contains("unsupported config version 7"));
    }

    #[test]
    fn rejects_out_of_range_temperature() {
        let err = parse_config(
            "version: 1\nprovider:\n  temperature: 3.5\n",
            Path::new("pairwise.yaml"),
        )
        .unwrap_err();
        assert!(err.to_string().contains("temperature"));
    }

    #[test]
    fn absolute_storage_paths_are_kept() {
        let cfg = parse_config(
            "version: 1\nstorage:\n  data_file: /data/log.jsonl\n  csv_file: out/table.csv\n",
            Path::new("/etc/pairwise/pairwise.yaml"),
        )
        .unwrap();
        assert_eq!(cfg.storage.data_file, PathBuf::from("/data/log.jsonl"));
        assert_eq!(
            cfg.storage.csv_file,
            PathBuf::from("/etc/pairwise/out/table.csv")
        );
    }

    #[test]
    fn sample_config_parses() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pairwise.yaml");
        write_sample_config(&path).unwrap();
        let cfg = load_config(&path).unwrap();
        assert_eq!(cfg.provider.model, DEFAULT_MODEL);
        assert_eq!(cfg.storage.csv_file, dir.path().join(DEFAULT_CSV_FILE));
    }
}
