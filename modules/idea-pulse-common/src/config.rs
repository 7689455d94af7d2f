use std::time::Duration;

use crate::error::ConfigError;

pub const DEFAULT_TABLE: &str = "reddit_posts";
pub const DEFAULT_INTERVAL_HOURS: u64 = 6;
pub const DEFAULT_RESULT_LIMIT: u32 = 50;
const MAX_RESULT_LIMIT: u32 = 1000;
/// One week.
const MAX_INTERVAL_HOURS: u64 = 24 * 7;

/// Worker configuration loaded from environment variables (and `.env`).
#[derive(Debug, Clone)]
pub struct Config {
    // Reddit
    pub reddit_client_id: String,
    pub reddit_client_secret: String,
    pub reddit_user_agent: String,

    // Supabase
    pub supabase_url: String,
    pub supabase_service_key: String,
    pub supabase_table: String,

    // Harvest cadence
    pub interval: Duration,
    pub result_limit: u32,
}

impl Config {
    /// Load configuration from the process environment, reading `.env` first
    /// if one exists.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        let config = Self::from_lookup(|key| std::env::var(key).ok())?;
        config.log_keys();
        Ok(config)
    }

    /// Build a config from any key lookup. Empty values count as missing.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &'static str| lookup(key).filter(|v| !v.trim().is_empty());
        let required = |key: &'static str| get(key).ok_or(ConfigError::Missing(key));

        let supabase_url = required("SUPABASE_URL")?;
        if let Err(e) = url::Url::parse(&supabase_url) {
            return Err(ConfigError::Invalid {
                key: "SUPABASE_URL",
                value: supabase_url,
                reason: e.to_string(),
            });
        }

        let interval_hours = match get("HARVEST_INTERVAL_HOURS") {
            Some(raw) => parse_in_range("HARVEST_INTERVAL_HOURS", &raw, 1, MAX_INTERVAL_HOURS)?,
            None => DEFAULT_INTERVAL_HOURS,
        };
        let result_limit = match get("HARVEST_RESULT_LIMIT") {
            Some(raw) => parse_in_range("HARVEST_RESULT_LIMIT", &raw, 1, MAX_RESULT_LIMIT as u64)? as u32,
            None => DEFAULT_RESULT_LIMIT,
        };

        Ok(Self {
            reddit_client_id: required("REDDIT_CLIENT_ID")?,
            reddit_client_secret: required("REDDIT_CLIENT_SECRET")?,
            reddit_user_agent: required("REDDIT_USER_AGENT")?,
            supabase_url,
            supabase_service_key: required("SUPABASE_SERVICE_KEY")?,
            supabase_table: get("SUPABASE_TABLE").unwrap_or_else(|| DEFAULT_TABLE.to_string()),
            interval: Duration::from_secs(interval_hours * 3600),
            result_limit,
        })
    }

    fn log_keys(&self) {
        fn preview(val: &str) -> String {
            let n = val.chars().count().min(5);
            let head: String = val.chars().take(n).collect();
            format!("{}...({} chars)", head, val.chars().count())
        }

        tracing::info!("Config loaded:");
        tracing::info!("  REDDIT_CLIENT_ID: {}", preview(&self.reddit_client_id));
        tracing::info!("  REDDIT_CLIENT_SECRET: {}", preview(&self.reddit_client_secret));
        tracing::info!("  REDDIT_USER_AGENT: {}", self.reddit_user_agent);
        tracing::info!("  SUPABASE_URL: {}", self.supabase_url);
        tracing::info!("  SUPABASE_SERVICE_KEY: {}", preview(&self.supabase_service_key));
        tracing::info!("  SUPABASE_TABLE: {}", self.supabase_table);
        tracing::info!(
            "  interval: {}h, result limit: {}",
            self.interval.as_secs() / 3600,
            self.result_limit
        );
    }
}

fn parse_in_range(key: &'static str, raw: &str, min: u64, max: u64) -> Result<u64, ConfigError> {
    let invalid = |reason: String| ConfigError::Invalid {
        key,
        value: raw.to_string(),
        reason,
    };
    let value: u64 = raw.trim().parse().map_err(|e: std::num::ParseIntError| invalid(e.to_string()))?;
    if !(min..=max).contains(&value) {
        return Err(invalid(format!("must be between {min} and {max}")));
    }
    Ok(value)
}
