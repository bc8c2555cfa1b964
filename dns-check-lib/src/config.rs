//! Configuration file parsing and management.
//!
//! This module handles loading configuration from TOML files, reading
//! `DNS_CHECK_*` environment variables, and merging configurations with
//! proper precedence rules.

use crate::error::DnsCheckError;
use crate::types::MAX_CONCURRENCY;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

/// Configuration loaded from TOML files.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FileConfig {
    /// Default values for CLI options
    #[serde(skip_serializing_if = "Option::is_none")]
    pub defaults: Option<DefaultsConfig>,
}

/// Default configuration values that map to CLI options.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DefaultsConfig {
    /// Hostname every probe resolves
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,

    /// Default concurrency level
    #[serde(skip_serializing_if = "Option::is_none")]
    pub concurrency: Option<usize>,

    /// Reachability timeout (as string, e.g., "5s", "500ms")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<String>,

    /// Resolution timeout (as string, e.g., "5s")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolve_timeout: Option<String>,

    /// Resolver list URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Resolver list file
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,

    /// Output file for usable resolvers
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
}

/// Configuration discovery and loading functionality.
#[derive(Debug)]
pub struct ConfigManager {
    /// Whether to log which config files were picked up
    pub verbose: bool,
}

impl ConfigManager {
    /// Create a new configuration manager.
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }

    /// Load configuration from a specific file.
    pub fn load_file<P: AsRef<Path>>(&self, path: P) -> Result<FileConfig, DnsCheckError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(DnsCheckError::file_error(
                path.to_string_lossy(),
                "Configuration file not found",
            ));
        }

        let content = fs::read_to_string(path).map_err(|e| {
            DnsCheckError::file_error(
                path.to_string_lossy(),
                format!("Failed to read configuration file: {}", e),
            )
        })?;

        let config: FileConfig = toml::from_str(&content)?;

        self.validate_config(&config)?;

        Ok(config)
    }

    /// Discover and load configuration files in precedence order.
    ///
    /// XDG config < home directory config < local config. Files that fail
    /// to load are skipped.
    pub fn discover_and_load(&self) -> Result<FileConfig, DnsCheckError> {
        let mut merged_config = FileConfig::default();
        let candidates = [
            self.get_xdg_config_path(),
            self.get_global_config_path(),
            self.get_local_config_path(),
        ];

        for path in candidates.into_iter().flatten() {
            match self.load_file(&path) {
                Ok(config) => {
                    if self.verbose {
                        debug!(path = %path.display(), "loaded config file");
                    }
                    merged_config = self.merge_configs(merged_config, config);
                }
                Err(e) => warn!(path = %path.display(), "skipping config file: {}", e),
            }
        }

        Ok(merged_config)
    }

    /// Get the local configuration file path.
    fn get_local_config_path(&self) -> Option<PathBuf> {
        ["./dns-check.toml", "./.dns-check.toml"]
            .iter()
            .map(Path::new)
            .find(|path| path.exists())
            .map(Path::to_path_buf)
    }

    /// Get the global configuration file path in the user's home directory.
    fn get_global_config_path(&self) -> Option<PathBuf> {
        let home = env::var_os("HOME")?;
        [".dns-check.toml", "dns-check.toml"]
            .iter()
            .map(|candidate| Path::new(&home).join(candidate))
            .find(|path| path.exists())
    }

    /// Get the XDG configuration file path.
    fn get_xdg_config_path(&self) -> Option<PathBuf> {
        let config_dir = env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| env::var_os("HOME").map(|home| Path::new(&home).join(".config")))?;

        let path = config_dir.join("dns-check").join("config.toml");
        if path.exists() {
            Some(path)
        } else {
            None
        }
    }

    /// Merge two configurations. Values from `higher` win.
    fn merge_configs(&self, lower: FileConfig, higher: FileConfig) -> FileConfig {
        let defaults = match (lower.defaults, higher.defaults) {
            (Some(lower), Some(higher)) => {
                // a list source set in the higher file replaces both of the lower ones
                let higher_names_source = higher.url.is_some() || higher.file.is_some();
                let (url, file) = if higher_names_source {
                    (higher.url, higher.file)
                } else {
                    (lower.url, lower.file)
                };

                Some(DefaultsConfig {
                    hostname: higher.hostname.or(lower.hostname),
                    concurrency: higher.concurrency.or(lower.concurrency),
                    timeout: higher.timeout.or(lower.timeout),
                    resolve_timeout: higher.resolve_timeout.or(lower.resolve_timeout),
                    url,
                    file,
                    output: higher.output.or(lower.output),
                })
            }
            (lower, higher) => higher.or(lower),
        };

        FileConfig { defaults }
    }

    /// Validate a configuration for common issues.
    fn validate_config(&self, config: &FileConfig) -> Result<(), DnsCheckError> {
        let Some(defaults) = &config.defaults else {
            return Ok(());
        };

        if let Some(concurrency) = defaults.concurrency {
            if concurrency == 0 || concurrency > MAX_CONCURRENCY {
                return Err(DnsCheckError::config(format!(
                    "Concurrency must be between 1 and {}",
                    MAX_CONCURRENCY
                )));
            }
        }

        for (name, value) in [
            ("timeout", &defaults.timeout),
            ("resolve_timeout", &defaults.resolve_timeout),
        ] {
            if let Some(value) = value {
                if parse_duration_string(value).is_none() {
                    return Err(DnsCheckError::config(format!(
                        "Invalid {} '{}'. Use format like '5s', '500ms', '2m'",
                        name, value
                    )));
                }
            }
        }

        if let Some(hostname) = &defaults.hostname {
            if hostname.trim().is_empty() {
                return Err(DnsCheckError::config("Hostname cannot be empty"));
            }
        }

        if defaults.url.is_some() && defaults.file.is_some() {
            return Err(DnsCheckError::config(
                "Cannot specify both 'url' and 'file' in defaults",
            ));
        }

        Ok(())
    }
}

/// Configuration values read from `DNS_CHECK_*` environment variables.
#[derive(Debug, Clone, Default)]
pub struct EnvConfig {
    pub hostname: Option<String>,
    pub concurrency: Option<usize>,
    pub timeout: Option<Duration>,
    pub resolve_timeout: Option<Duration>,
    pub url: Option<String>,
    pub file: Option<String>,
    pub output: Option<String>,
    pub config: Option<String>,
}

/// Load configuration from environment variables.
///
/// Invalid values are logged as warnings and ignored.
pub fn load_env_config() -> EnvConfig {
    let mut env_config = EnvConfig {
        hostname: env_string("DNS_CHECK_HOSTNAME"),
        url: env_string("DNS_CHECK_URL"),
        file: env_string("DNS_CHECK_FILE"),
        output: env_string("DNS_CHECK_OUTPUT"),
        config: env_string("DNS_CHECK_CONFIG"),
        ..Default::default()
    };

    if let Some(val) = env_string("DNS_CHECK_CONCURRENCY") {
        match val.parse::<usize>() {
            Ok(concurrency) if (1..=MAX_CONCURRENCY).contains(&concurrency) => {
                debug!("Using DNS_CHECK_CONCURRENCY={}", concurrency);
                env_config.concurrency = Some(concurrency);
            }
            _ => warn!(
                "Invalid DNS_CHECK_CONCURRENCY='{}', must be 1-{}",
                val, MAX_CONCURRENCY
            ),
        }
    }

    env_config.timeout = env_duration("DNS_CHECK_TIMEOUT");
    env_config.resolve_timeout = env_duration("DNS_CHECK_RESOLVE_TIMEOUT");

    env_config
}

fn env_string(name: &str) -> Option<String> {
    let value = env::var(name).ok()?;
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    debug!("Using {}={}", name, value);
    Some(value.to_string())
}

fn env_duration(name: &str) -> Option<Duration> {
    let value = env_string(name)?;
    let parsed = parse_duration_string(&value);
    if parsed.is_none() {
        warn!(
            "Invalid {}='{}', use format like '5s', '500ms', '2m'",
            name, value
        );
    }
    parsed
}

/// Parse a duration string like "500ms", "5s", "2m" or a bare number of seconds.
///
/// Zero durations are rejected.
pub fn parse_duration_string(value: &str) -> Option<Duration> {
    let value = value.trim().to_lowercase();

    let duration = if let Some(ms) = value.strip_suffix("ms") {
        Duration::from_millis(ms.trim().parse().ok()?)
    } else if let Some(secs) = value.strip_suffix('s') {
        Duration::from_secs(secs.trim().parse().ok()?)
    } else if let Some(mins) = value.strip_suffix('m') {
        Duration::from_secs(mins.trim().parse::<u64>().ok()?.checked_mul(60)?)
    } else {
        Duration::from_secs(value.parse().ok()?)
    };

    if duration.is_zero() {
        None
    } else {
        Some(duration)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(content: &str) -> NamedTempFile {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(content.as_bytes()).unwrap();
        temp_file.flush().unwrap();
        temp_file
    }

    #[test]
    fn test_parse_duration_string() {
        assert_eq!(parse_duration_string("5s"), Some(Duration::from_secs(5)));
        assert_eq!(parse_duration_string("2m"), Some(Duration::from_secs(120)));
        assert_eq!(
            parse_duration_string("500ms"),
            Some(Duration::from_millis(500))
        );
        assert_eq!(parse_duration_string(" 7 "), Some(Duration::from_secs(7)));
        assert_eq!(parse_duration_string("0s"), None);
        assert_eq!(parse_duration_string("soon"), None);
        assert_eq!(parse_duration_string(""), None);
    }

    #[test]
    fn test_load_valid_config() {
        let temp_file = write_config(
            r#"
[defaults]
hostname = "example.org"
concurrency = 25
timeout = "3s"
file = "resolvers.txt"
"#,
        );

        let manager = ConfigManager::new(false);
        let config = manager.load_file(temp_file.path()).unwrap();

        let defaults = config.defaults.unwrap();
        assert_eq!(defaults.hostname.as_deref(), Some("example.org"));
        assert_eq!(defaults.concurrency, Some(25));
        assert_eq!(defaults.timeout.as_deref(), Some("3s"));
        assert_eq!(defaults.file.as_deref(), Some("resolvers.txt"));
        assert_eq!(defaults.url, None);
    }

    #[test]
    fn test_invalid_concurrency() {
        let temp_file = write_config("[defaults]\nconcurrency = 0\n");
        let manager = ConfigManager::new(false);
        assert!(manager.load_file(temp_file.path()).is_err());
    }

    #[test]
    fn test_invalid_timeout() {
        let temp_file = write_config("[defaults]\nresolve_timeout = \"later\"\n");
        let manager = ConfigManager::new(false);
        let err = manager.load_file(temp_file.path()).unwrap_err();
        assert!(err.to_string().contains("resolve_timeout"));
    }

    #[test]
    fn test_url_and_file_conflict() {
        let temp_file = write_config(
            "[defaults]\nurl = \"https://example.org/list.txt\"\nfile = \"list.txt\"\n",
        );
        let manager = ConfigManager::new(false);
        assert!(manager.load_file(temp_file.path()).is_err());
    }

    #[test]
    fn test_malformed_toml() {
        let temp_file = write_config("[defaults\nconcurrency = ");
        let manager = ConfigManager::new(false);
        let err = manager.load_file(temp_file.path()).unwrap_err();
        assert!(matches!(err, DnsCheckError::ConfigError { .. }));
    }

    #[test]
    fn test_missing_config_file() {
        let manager = ConfigManager::new(false);
        let err = manager.load_file("/no/such/dns-check.toml").unwrap_err();
        assert!(matches!(err, DnsCheckError::FileError { .. }));
    }

    #[test]
    fn test_merge_configs() {
        let manager = ConfigManager::new(false);

        let lower = FileConfig {
            defaults: Some(DefaultsConfig {
                hostname: Some("example.org".to_string()),
                concurrency: Some(10),
                file: Some("resolvers.txt".to_string()),
                ..Default::default()
            }),
        };

        let higher = FileConfig {
            defaults: Some(DefaultsConfig {
                concurrency: Some(25),
                url: Some("https://example.org/list.txt".to_string()),
                ..Default::default()
            }),
        };

        let merged = manager.merge_configs(lower, higher);
        let defaults = merged.defaults.unwrap();

        assert_eq!(defaults.concurrency, Some(25)); // Higher wins
        assert_eq!(defaults.hostname.as_deref(), Some("example.org")); // Lower preserved
        assert_eq!(
            defaults.url.as_deref(),
            Some("https://example.org/list.txt")
        );
        assert_eq!(defaults.file, None); // Higher list source replaces lower one
    }

    #[test]
    fn test_merge_configs_list_source() {
        let manager = ConfigManager::new(false);

        let with_url = || FileConfig {
            defaults: Some(DefaultsConfig {
                url: Some("https://example.org/list.txt".to_string()),
                ..Default::default()
            }),
        };

        // a file in the higher layer drops the lower url
        let higher_file = FileConfig {
            defaults: Some(DefaultsConfig {
                file: Some("local.txt".to_string()),
                ..Default::default()
            }),
        };
        let defaults = manager
            .merge_configs(with_url(), higher_file)
            .defaults
            .unwrap();
        assert_eq!(defaults.file.as_deref(), Some("local.txt"));
        assert_eq!(defaults.url, None);

        // no source in the higher layer keeps the lower one
        let higher_hostname = FileConfig {
            defaults: Some(DefaultsConfig {
                hostname: Some("example.net".to_string()),
                ..Default::default()
            }),
        };
        let defaults = manager
            .merge_configs(with_url(), higher_hostname)
            .defaults
            .unwrap();
        assert_eq!(defaults.url.as_deref(), Some("https://example.org/list.txt"));
        assert_eq!(defaults.file, None);
        assert_eq!(defaults.hostname.as_deref(), Some("example.net"));
    }

    #[test]
    fn test_merge_with_missing_side() {
        let manager = ConfigManager::new(false);
        let only_lower = FileConfig {
            defaults: Some(DefaultsConfig {
                concurrency: Some(3),
                ..Default::default()
            }),
        };

        let merged = manager.merge_configs(only_lower, FileConfig::default());
        assert_eq!(merged.defaults.unwrap().concurrency, Some(3));
    }
}
