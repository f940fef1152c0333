//! Environment-driven configuration.

use std::env;
use std::sync::Arc;
use std::time::Duration;

use reqwest::Url;

use crate::bridge::{BridgeConfig, HttpBridge};
use crate::error::ConfigError;
use crate::linearize::DEFAULT_MAPS_BASE_URL;
use crate::optimizer::{DEFAULT_OPTIMIZE_TIMEOUT, Optimizer};
use crate::travel_time::TravelTimeResolver;

pub const ENV_BRIDGE_URL: &str = "TRIP_PLANNER_BRIDGE_URL";
pub const ENV_API_KEY: &str = "TRIP_PLANNER_API_KEY";
pub const ENV_MODEL: &str = "TRIP_PLANNER_MODEL";
pub const ENV_TIMEOUT_SECS: &str = "TRIP_PLANNER_TIMEOUT_SECS";
pub const ENV_OPTIMIZE_TIMEOUT_SECS: &str = "TRIP_PLANNER_OPTIMIZE_TIMEOUT_SECS";
pub const ENV_MAPS_URL: &str = "TRIP_PLANNER_MAPS_URL";

#[derive(Debug, Clone)]
pub struct PlannerConfig {
    pub bridge: BridgeConfig,
    /// Ceiling for one optimize exchange, including the model's tool calls.
    pub optimize_timeout_secs: u64,
    pub maps_base_url: String,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            bridge: BridgeConfig::default(),
            optimize_timeout_secs: DEFAULT_OPTIMIZE_TIMEOUT.as_secs(),
            maps_base_url: DEFAULT_MAPS_BASE_URL.to_string(),
        }
    }
}

impl PlannerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a config from any key lookup. Unset or blank keys keep defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let mut config = Self::default();

        if let Some(url) = get(ENV_BRIDGE_URL) {
            parse_url(ENV_BRIDGE_URL, &url)?;
            config.bridge.base_url = url;
        }
        if let Some(key) = get(ENV_API_KEY) {
            config.bridge.api_key = Some(key);
        }
        if let Some(model) = get(ENV_MODEL) {
            config.bridge.model = model;
        }
        if let Some(value) = get(ENV_TIMEOUT_SECS) {
            config.bridge.timeout_secs = parse_secs(ENV_TIMEOUT_SECS, &value)?;
        }
        if let Some(value) = get(ENV_OPTIMIZE_TIMEOUT_SECS) {
            config.optimize_timeout_secs = parse_secs(ENV_OPTIMIZE_TIMEOUT_SECS, &value)?;
        }
        if let Some(url) = get(ENV_MAPS_URL) {
            parse_url(ENV_MAPS_URL, &url)?;
            config.maps_base_url = url;
        }

        Ok(config)
    }

    pub fn optimize_timeout(&self) -> Duration {
        Duration::from_secs(self.optimize_timeout_secs)
    }

    /// One shared HTTP bridge feeding both the optimizer and the resolver.
    pub fn build(&self) -> (Optimizer, TravelTimeResolver<Arc<HttpBridge>>) {
        let bridge = Arc::new(HttpBridge::new(self.bridge.clone()));
        let optimizer = Optimizer::from_shared(bridge.clone()).with_timeout(self.optimize_timeout());
        (optimizer, TravelTimeResolver::new(bridge))
    }
}

fn parse_secs(key: &'static str, value: &str) -> Result<u64, ConfigError> {
    match value.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(secs),
        _ => Err(ConfigError::InvalidNumber {
            key,
            value: value.to_string(),
        }),
    }
}

fn parse_url(key: &'static str, value: &str) -> Result<(), ConfigError> {
    Url::parse(value).map(|_| ()).map_err(|_| ConfigError::InvalidUrl {
        key,
        value: value.to_string(),
    })
}
