//! Application configuration management.

use std::path::PathBuf;

use rust_decimal::Decimal;
use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Classification rules configuration.
    #[serde(default)]
    pub rules: RulesConfig,
    /// Pipeline tuning.
    #[serde(default)]
    pub pipeline: PipelineConfig,
    /// Logging configuration.
    #[serde(default)]
    pub log: LogConfig,
}

/// Classification rules configuration.
///
/// Without a rules file the built-in PCG tables are used. The threshold
/// overrides apply on top of whichever tables were loaded.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RulesConfig {
    /// Optional TOML or JSON rule file.
    pub path: Option<PathBuf>,
    /// Near-zero balance threshold override.
    pub epsilon: Option<Decimal>,
    /// Equilibrium tolerance override.
    pub tolerance: Option<Decimal>,
}

/// Pipeline tuning.
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    /// Entry count from which account aggregation runs in parallel.
    #[serde(default = "default_parallel_threshold")]
    pub parallel_threshold: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            parallel_threshold: default_parallel_threshold(),
        }
    }
}

fn default_parallel_threshold() -> usize {
    50_000
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human readable output.
    #[default]
    Pretty,
    /// One JSON object per line.
    Json,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// Default filter when `RUST_LOG` is unset.
    #[serde(default = "default_log_filter")]
    pub filter: String,
    /// Output format.
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
            format: LogFormat::default(),
        }
    }
}

fn default_log_filter() -> String {
    "bilan=info".to_string()
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// Sources, later ones winning: `config/default`, `config/{RUN_MODE}`,
    /// then `BILAN__*` environment variables (`BILAN__RULES__EPSILON=0.5`).
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenvy::dotenv().ok();

        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(
                config::Environment::with_prefix("BILAN")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_defaults_without_sources() {
        temp_env::with_vars_unset(
            [
                "BILAN__RULES__PATH",
                "BILAN__RULES__EPSILON",
                "BILAN__PIPELINE__PARALLEL_THRESHOLD",
                "BILAN__LOG__FORMAT",
            ],
            || {
                let config = AppConfig::load().unwrap();
                assert!(config.rules.path.is_none());
                assert!(config.rules.epsilon.is_none());
                assert_eq!(config.pipeline.parallel_threshold, 50_000);
                assert_eq!(config.log.format, LogFormat::Pretty);
                assert_eq!(config.log.filter, "bilan=info");
            },
        );
    }

    #[test]
    fn test_environment_overrides() {
        temp_env::with_vars(
            [
                ("BILAN__RULES__PATH", Some("rules/pcg.toml")),
                ("BILAN__RULES__EPSILON", Some("0.5")),
                ("BILAN__PIPELINE__PARALLEL_THRESHOLD", Some("128")),
                ("BILAN__LOG__FORMAT", Some("json")),
            ],
            || {
                let config = AppConfig::load().unwrap();
                assert_eq!(config.rules.path, Some(PathBuf::from("rules/pcg.toml")));
                assert_eq!(config.rules.epsilon, Some(dec!(0.5)));
                assert_eq!(config.pipeline.parallel_threshold, 128);
                assert_eq!(config.log.format, LogFormat::Json);
            },
        );
    }
}
