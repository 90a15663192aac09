//! Process configuration

use serde::Deserialize;

use domain_scoring::EngineSettings;

/// Output format of the diagnostic log on stderr
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines
    #[default]
    Text,
    /// One JSON object per event
    Json,
}

/// Settings read from `SCORING_*` environment variables
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Log level used when `RUST_LOG` is unset
    pub log_level: String,
    /// Format of log events
    pub log_format: LogFormat,
    /// Factor table to load instead of the built-in one
    pub factor_table: Option<String>,
    /// Worker threads for batch assessment
    pub max_concurrency: usize,
    /// Share of the largest contribution a factor must exceed to add its
    /// recommendation
    pub importance_ratio: f64,
    /// Maximum recommendations per verdict
    pub max_recommendations: usize,
}

impl Default for CliConfig {
    fn default() -> Self {
        let engine = EngineSettings::default();
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Text,
            factor_table: None,
            max_concurrency: engine.max_concurrency,
            importance_ratio: engine.importance_ratio,
            max_recommendations: engine.max_recommendations,
        }
    }
}

impl CliConfig {
    /// Loads configuration from environment
    pub fn from_env() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::Environment::with_prefix("SCORING").try_parsing(true))
            .build()?
            .try_deserialize()
    }

    /// Engine tunables carried by this configuration
    pub fn engine_settings(&self) -> EngineSettings {
        EngineSettings {
            max_concurrency: self.max_concurrency,
            importance_ratio: self.importance_ratio,
            max_recommendations: self.max_recommendations,
        }
    }
}
