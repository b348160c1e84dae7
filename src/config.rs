//! Application configuration.
//!
//! Configuration is loaded from a TOML file at:
//! 1. `$EMLHTML_CONFIG` (environment variable)
//! 2. `~/.config/emlhtml/config.toml` (Linux/macOS)
//!    `%APPDATA%\emlhtml\config.toml` (Windows)
//! 3. Built-in defaults

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General behavior settings.
    pub general: GeneralConfig,
    /// Conversion settings.
    pub convert: ConvertConfig,
}

/// General behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log level: "error", "warn", "info", "debug", "trace".
    pub log_level: String,
    /// Override directory for the log file.
    pub log_dir: Option<PathBuf>,
}

/// Conversion settings, passed down to every stage of the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConvertConfig {
    /// File extensions (without the dot) treated as messages when walking a directory.
    pub extensions: Vec<String>,
    /// Keep a copy of the original message next to its generated page.
    pub copy_original: bool,
    /// Maximum message size in bytes (default: 268435456 = 256 MB).
    pub max_message_size: usize,
    /// How many levels of embedded messages are converted before falling
    /// back to storing them as plain files.
    pub max_embedded_depth: usize,
}

// ── Default implementations ─────────────────────────────────────

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "warn".to_string(),
            log_dir: None,
        }
    }
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            extensions: vec!["eml".to_string()],
            copy_original: true,
            max_message_size: 256 * 1024 * 1024, // 256 MB
            max_embedded_depth: 10,
        }
    }
}

impl ConvertConfig {
    /// Whether a file name carries one of the configured message extensions.
    pub fn matches_extension(&self, file_name: &str) -> bool {
        let Some((_, ext)) = file_name.rsplit_once('.') else {
            return false;
        };
        self.extensions
            .iter()
            .any(|e| e.trim_start_matches('.').eq_ignore_ascii_case(ext))
    }
}

// ── Load ────────────────────────────────────────────────────────

/// Load configuration, searching standard locations.
///
/// Returns the default configuration if no file is found or on parse error.
pub fn load_config() -> Config {
    if let Some(path) = config_file_path() {
        if path.exists() {
            match std::fs::read_to_string(&path) {
                Ok(contents) => match toml::from_str::<Config>(&contents) {
                    Ok(cfg) => {
                        tracing::info!(path = %path.display(), "Loaded config");
                        return cfg;
                    }
                    Err(e) => {
                        tracing::warn!(
                            path = %path.display(),
                            error = %e,
                            "Failed to parse config, using defaults"
                        );
                    }
                },
                Err(e) => {
                    tracing::warn!(
                        path = %path.display(),
                        error = %e,
                        "Failed to read config file, using defaults"
                    );
                }
            }
        }
    }
    Config::default()
}

/// Determine the config file path (checking env var first, then standard dirs).
pub fn config_file_path() -> Option<PathBuf> {
    if let Ok(env_path) = std::env::var("EMLHTML_CONFIG") {
        return Some(PathBuf::from(env_path));
    }

    dirs::config_dir().map(|d| d.join("emlhtml").join("config.toml"))
}

/// Return the directory the log file is written to.
pub fn log_dir(config: &Config) -> PathBuf {
    if let Some(ref dir) = config.general.log_dir {
        return dir.clone();
    }
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("emlhtml")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let cfg = Config::default();
        assert_eq!(cfg.general.log_level, "warn");
        assert_eq!(cfg.convert.extensions, vec!["eml".to_string()]);
        assert!(cfg.convert.copy_original);
        assert_eq!(cfg.convert.max_embedded_depth, 10);
    }

    #[test]
    fn test_serialize_deserialize_roundtrip() {
        let cfg = Config::default();
        let toml_str = toml::to_string_pretty(&cfg).expect("serialize");
        let parsed: Config = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(parsed.general.log_level, cfg.general.log_level);
        assert_eq!(
            parsed.convert.max_message_size,
            cfg.convert.max_message_size
        );
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let partial = r#"
[convert]
extensions = ["eml", "msg822"]
copy_original = false
"#;
        let cfg: Config = toml::from_str(partial).expect("parse partial");
        assert_eq!(cfg.convert.extensions.len(), 2);
        assert!(!cfg.convert.copy_original);
        // Other fields use defaults
        assert_eq!(cfg.general.log_level, "warn");
        assert_eq!(cfg.convert.max_embedded_depth, 10);
    }

    #[test]
    fn test_matches_extension() {
        let cfg = ConvertConfig::default();
        assert!(cfg.matches_extension("hello.eml"));
        assert!(cfg.matches_extension("HELLO.EML"));
        assert!(!cfg.matches_extension("hello.txt"));
        assert!(!cfg.matches_extension("eml"));
    }

    #[test]
    fn test_log_dir_override() {
        let mut cfg = Config::default();
        cfg.general.log_dir = Some(PathBuf::from("/var/log/emlhtml"));
        assert_eq!(log_dir(&cfg), PathBuf::from("/var/log/emlhtml"));
    }
}
