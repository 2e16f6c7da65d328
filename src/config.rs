//! Configuration management for the inference runner

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Config file picked up from the working directory when present
pub const DEFAULT_CONFIG_FILE: &str = "runner.toml";

/// Main application configuration
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub model: ModelConfig,
    pub dataset: DatasetConfig,
    pub harness: HarnessConfig,
    pub logging: LoggingConfig,
}

/// Model artifact configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct ModelConfig {
    /// Model directory or `.onnx` file
    pub path: PathBuf,
    /// Number of intra-op threads for ONNX inference
    pub onnx_threads: usize,
    /// Graph input to feed (default: first input)
    pub input_name: Option<String>,
    /// Graph output holding class scores (default: first output)
    pub output_name: Option<String>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("model"),
            onnx_threads: 1,
            input_name: None,
            output_name: None,
        }
    }
}

/// Dataset archive configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct DatasetConfig {
    /// Archive entry holding the feature tensor
    pub key: String,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            key: "data".to_string(),
        }
    }
}

/// Harness protocol configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct HarnessConfig {
    /// Line written once the model is loaded
    pub ready_marker: String,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            ready_marker: "READY".to_string(),
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

impl AppConfig {
    /// Load configuration from `runner.toml` (optional) and `RUNNER__*` variables
    pub fn load() -> Result<Self> {
        Self::build(
            File::with_name(DEFAULT_CONFIG_FILE).required(false),
            environment(),
        )
    }

    /// Load configuration from a specific path, which must exist
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        Self::build(File::from(path).required(true), environment())
            .with_context(|| format!("Failed to load configuration from {}", path.display()))
    }

    /// Apply command-line overrides, the last configuration layer
    pub fn apply_cli(&mut self, model: Option<PathBuf>, data_key: Option<String>) {
        if let Some(model) = model {
            self.model.path = model;
        }
        if let Some(key) = data_key {
            self.dataset.key = key;
        }
    }

    fn build<S>(file: S, env: Environment) -> Result<Self>
    where
        S: config::Source + Send + Sync + 'static,
    {
        let config = Config::builder()
            .add_source(file)
            .add_source(env)
            .build()
            .context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }
}

/// `RUNNER__SECTION__KEY` variables, e.g. `RUNNER__MODEL__PATH`
fn environment() -> Environment {
    Environment::with_prefix("RUNNER")
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.model.path, PathBuf::from("model"));
        assert_eq!(config.model.onnx_threads, 1);
        assert_eq!(config.dataset.key, "data");
        assert_eq!(config.harness.ready_marker, "READY");
        assert_eq!(config.logging.format, LogFormat::Pretty);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("runner.toml");
        std::fs::write(
            &path,
            r#"
[model]
path = "artifacts/classifier.onnx"
onnx_threads = 4

[logging]
format = "json"
"#,
        )
        .unwrap();

        let config = AppConfig::load_from_path(&path).unwrap();
        assert_eq!(config.model.path, PathBuf::from("artifacts/classifier.onnx"));
        assert_eq!(config.model.onnx_threads, 4);
        assert_eq!(config.model.input_name, None);
        assert_eq!(config.dataset.key, "data");
        assert_eq!(config.harness.ready_marker, "READY");
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.logging.level, "warn");
    }

    fn write_config(dir: &tempfile::TempDir, contents: &str) -> PathBuf {
        let path = dir.path().join("runner.toml");
        std::fs::write(&path, contents).unwrap();
        path
    }

    fn variables(pairs: &[(&str, &str)]) -> Environment {
        let map = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect::<HashMap<_, _>>();
        environment().source(Some(map))
    }

    #[test]
    fn test_cli_overrides_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(
            &dir,
            r#"
[model]
path = "from_file"

[dataset]
key = "x_file"
"#,
        );

        let mut config = AppConfig::load_from_path(&path).unwrap();
        config.apply_cli(Some(PathBuf::from("from_cli.onnx")), Some("x_cli".to_string()));

        assert_eq!(config.model.path, PathBuf::from("from_cli.onnx"));
        assert_eq!(config.dataset.key, "x_cli");
    }

    #[test]
    fn test_cli_without_flags_keeps_file_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(&dir, "[dataset]\nkey = \"x_file\"\n");

        let mut config = AppConfig::load_from_path(&path).unwrap();
        config.apply_cli(None, None);

        assert_eq!(config.model.path, PathBuf::from("model"));
        assert_eq!(config.dataset.key, "x_file");
    }

    #[test]
    fn test_environment_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let env = variables(&[
            ("RUNNER__MODEL__PATH", "/opt/models/net.onnx"),
            ("RUNNER__MODEL__ONNX_THREADS", "8"),
        ]);

        let config = AppConfig::build(
            File::from(dir.path().join("absent.toml")).required(false),
            env,
        )
        .unwrap();

        assert_eq!(config.model.path, PathBuf::from("/opt/models/net.onnx"));
        assert_eq!(config.model.onnx_threads, 8);
        assert_eq!(config.dataset.key, "data");
    }

    #[test]
    fn test_environment_overrides_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(
            &dir,
            r#"
[model]
onnx_threads = 2

[harness]
ready_marker = "GO"
"#,
        );
        let env = variables(&[("RUNNER__MODEL__ONNX_THREADS", "6")]);

        let config = AppConfig::build(File::from(path.as_path()), env).unwrap();

        assert_eq!(config.model.onnx_threads, 6);
        assert_eq!(config.harness.ready_marker, "GO");
    }

    #[test]
    fn test_unrelated_variables_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let env = variables(&[("OTHER__MODEL__PATH", "elsewhere")]);

        let config = AppConfig::build(
            File::from(dir.path().join("absent.toml")).required(false),
            env,
        )
        .unwrap();

        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_missing_explicit_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(AppConfig::load_from_path(dir.path().join("absent.toml")).is_err());
    }
}
