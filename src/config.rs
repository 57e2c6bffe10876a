use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::env;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub store: StoreConfig,
    pub engine: EngineConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    pub upstream_url: Option<String>,
    pub snapshot_file: Option<String>,
    pub upstream_timeout_secs: u64,
}

/// Tunables of the scoring and planning engine.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Validate)]
pub struct EngineConfig {
    #[validate(range(min = 1, message = "Top-N must be at least 1"))]
    pub top_n: usize,
    #[validate(range(max = 100, message = "Risk threshold must be at most 100"))]
    pub savings_risk_threshold: u8,
    #[validate(range(min = 1, message = "Windows must span at least one day"))]
    pub recency_window_days: i64,
    #[validate(range(min = 1, message = "Windows must span at least one day"))]
    pub expiry_window_days: i64,
    #[validate(range(min = 0.0, max = 100.0, message = "Recency weight must be between 0 and 100"))]
    pub recency_weight: f64,
    #[validate(range(min = 0.0, max = 100.0, message = "Expired penalty must be between 0 and 100"))]
    pub expired_penalty: f64,
    #[validate(range(min = 0.0, max = 100.0, message = "Expiry weight must be between 0 and 100"))]
    pub expiry_weight: f64,
    #[validate(range(min = 0.0, max = 1.0, message = "Never-used recency factor must be between 0 and 1"))]
    pub never_used_recency_factor: f64,
    #[validate(range(min = 0.0, message = "Utility points cannot be negative"))]
    pub utility_points: f64,
    #[validate(range(max = 100, message = "Risk threshold must be at most 100"))]
    pub unused_risk_threshold: u8,
    #[validate(range(min = 0.0, message = "Anomaly sigma cannot be negative"))]
    pub anomaly_sigma: f64,
    #[validate(range(min = 1, message = "Report must list at least one expense"))]
    pub report_top_expenses: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let engine = EngineConfig::from_env();
        engine
            .validate()
            .map_err(|e| anyhow!("Invalid engine configuration: {}", e))?;

        Ok(Config {
            server: ServerConfig {
                host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: parse_var("PORT", 8080),
            },

            store: StoreConfig {
                upstream_url: non_empty_var("SUBSCRIPTIONS_UPSTREAM_URL"),
                snapshot_file: non_empty_var("SUBSCRIPTIONS_FILE"),
                upstream_timeout_secs: parse_var("UPSTREAM_TIMEOUT_SECS", 10),
            },

            engine,
        })
    }
}

impl ServerConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl EngineConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            top_n: parse_var("RECOMMENDATION_TOP_N", defaults.top_n),
            savings_risk_threshold: parse_var("SAVINGS_RISK_THRESHOLD", defaults.savings_risk_threshold),
            recency_window_days: parse_var("RECENCY_WINDOW_DAYS", defaults.recency_window_days),
            expiry_window_days: parse_var("EXPIRY_WINDOW_DAYS", defaults.expiry_window_days),
            unused_risk_threshold: parse_var("UNUSED_RISK_THRESHOLD", defaults.unused_risk_threshold),
            anomaly_sigma: parse_var("ANOMALY_SIGMA", defaults.anomaly_sigma),
            report_top_expenses: parse_var("REPORT_TOP_EXPENSES", defaults.report_top_expenses),
            ..defaults
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            top_n: 10,
            savings_risk_threshold: 60,
            recency_window_days: 30,
            expiry_window_days: 30,
            recency_weight: 70.0,
            expired_penalty: 30.0,
            expiry_weight: 30.0,
            never_used_recency_factor: 0.1,
            utility_points: 100.0,
            unused_risk_threshold: 70,
            anomaly_sigma: 2.0,
            report_top_expenses: 3,
        }
    }
}

fn parse_var<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}
