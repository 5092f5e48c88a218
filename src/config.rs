//! Configuration loading and management

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::scoring::ScoringCriteria;
use crate::Result;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Monthly sales targets used by the reporting view
    #[serde(default)]
    pub targets: SalesTargets,

    /// Lead scoring criteria
    #[serde(default)]
    pub scoring: ScoringCriteria,

    /// Sender identity stamped onto composed outreach
    #[serde(default)]
    pub sender: SenderInfo,

    /// Checkpoint settings
    #[serde(default)]
    pub checkpoint: CheckpointConfig,
}

impl Config {
    /// Load configuration from a file or the default location
    /// (`.salesflow/config.toml`), falling back to defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = path.map(PathBuf::from).or_else(|| {
            let local = PathBuf::from(".salesflow/config.toml");
            local.exists().then_some(local)
        });

        match config_path {
            Some(p) if p.exists() => {
                let content = std::fs::read_to_string(&p)?;
                let config: Config = toml::from_str(&content)?;
                Ok(config)
            }
            _ => Ok(Config::default()),
        }
    }
}

/// Monthly targets the pipeline is measured against
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SalesTargets {
    #[serde(default = "default_monthly_leads")]
    pub monthly_leads: u64,

    #[serde(default = "default_monthly_meetings")]
    pub monthly_meetings: u64,

    #[serde(default = "default_monthly_pipeline_value")]
    pub monthly_pipeline_value: f64,

    #[serde(default = "default_target_conversion_rate")]
    pub target_conversion_rate: f64,
}

fn default_monthly_leads() -> u64 {
    100
}

fn default_monthly_meetings() -> u64 {
    20
}

fn default_monthly_pipeline_value() -> f64 {
    50_000.0
}

fn default_target_conversion_rate() -> f64 {
    0.15
}

impl Default for SalesTargets {
    fn default() -> Self {
        Self {
            monthly_leads: default_monthly_leads(),
            monthly_meetings: default_monthly_meetings(),
            monthly_pipeline_value: default_monthly_pipeline_value(),
            target_conversion_rate: default_target_conversion_rate(),
        }
    }
}

/// Identity attached to outgoing outreach messages
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SenderInfo {
    #[serde(default = "default_sender_name")]
    pub name: String,

    #[serde(default = "default_sender_title")]
    pub title: String,

    #[serde(default = "default_sender_company")]
    pub company: String,
}

fn default_sender_name() -> String {
    "Sales Team".to_string()
}

fn default_sender_title() -> String {
    "Account Executive".to_string()
}

fn default_sender_company() -> String {
    "Our Company".to_string()
}

impl Default for SenderInfo {
    fn default() -> Self {
        Self {
            name: default_sender_name(),
            title: default_sender_title(),
            company: default_sender_company(),
        }
    }
}

/// Lead checkpointing settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckpointConfig {
    /// TTL for checkpointed lead records, in seconds
    #[serde(default = "default_checkpoint_ttl")]
    pub ttl_secs: u64,
}

fn default_checkpoint_ttl() -> u64 {
    3600
}

impl Default for CheckpointConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_checkpoint_ttl(),
        }
    }
}
