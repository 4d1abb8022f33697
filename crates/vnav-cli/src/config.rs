//! CLI configuration from environment.

use anyhow::Context;
use std::env;
use vnav_core::VnavConfig;

#[derive(Debug, Clone)]
pub struct Config {
    pub default_fpa_deg: f64,
    pub max_fpa_deg: f64,
    pub primary_plan_index: usize,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = VnavConfig::default();
        Self {
            default_fpa_deg: lookup("VNAV_DEFAULT_FPA")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.default_fpa_deg),
            max_fpa_deg: lookup("VNAV_MAX_FPA")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_fpa_deg),
            primary_plan_index: lookup("VNAV_PRIMARY_PLAN")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.primary_plan_index),
        }
    }

    /// Engine configuration, with a scenario's `config` object layered on top
    /// of the environment field by field.
    pub fn vnav_config(&self, overrides: Option<&serde_json::Value>) -> anyhow::Result<VnavConfig> {
        let base = VnavConfig {
            default_fpa_deg: self.default_fpa_deg,
            max_fpa_deg: self.max_fpa_deg,
            primary_plan_index: self.primary_plan_index,
            ..VnavConfig::default()
        };

        let config = match overrides {
            None => base,
            Some(overrides) => {
                let mut merged = serde_json::to_value(&base)?;
                match (merged.as_object_mut(), overrides.as_object()) {
                    (Some(target), Some(source)) => {
                        for (key, value) in source {
                            target.insert(key.clone(), value.clone());
                        }
                    }
                    _ => anyhow::bail!("scenario config must be a JSON object"),
                }
                serde_json::from_value(merged).context("Failed to parse scenario config")?
            }
        };

        config.validate()?;
        Ok(config)
    }
}
