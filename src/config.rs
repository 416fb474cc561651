use std::env;

use crate::scheduler::{CronError, CronSchedule};

pub const DEFAULT_ROLLOVER_SCHEDULE: &str = "0 0 1 * *";
pub const DEFAULT_VISION_URL: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_VISION_MODEL: &str = "gpt-4o-mini";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} has an invalid value '{value}'")]
    Invalid { name: &'static str, value: String },

    #[error("ROLLOVER_SCHEDULE is not a valid cron expression: {0}")]
    Schedule(#[from] CronError),
}

#[derive(Debug, Clone)]
pub struct VisionConfig {
    pub api_key: String,
    pub api_url: String,
    pub model: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt_secret: String,
    pub port: u16,
    pub token_ttl_hours: i64,
    pub bcrypt_cost: u32,
    pub rollover_schedule: CronSchedule,
    /// Receipt scanning is disabled when no API key is configured.
    pub vision: Option<VisionConfig>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let schedule = optional("ROLLOVER_SCHEDULE")
            .unwrap_or_else(|| DEFAULT_ROLLOVER_SCHEDULE.to_string());

        let vision = optional("OPENAI_API_KEY").map(|api_key| VisionConfig {
            api_key,
            api_url: optional("VISION_API_URL").unwrap_or_else(|| DEFAULT_VISION_URL.to_string()),
            model: optional("VISION_MODEL").unwrap_or_else(|| DEFAULT_VISION_MODEL.to_string()),
        });

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            jwt_secret: required("JWT_SECRET")?,
            port: parsed("PORT", 5000)?,
            token_ttl_hours: parsed("TOKEN_TTL_HOURS", 1)?,
            bcrypt_cost: parsed("BCRYPT_COST", 10)?,
            rollover_schedule: CronSchedule::parse(&schedule)?,
            vision,
        })
    }
}

fn optional(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    optional(name).ok_or(ConfigError::Missing(name))
}

fn parsed<T: std::str::FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match optional(name) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
    }
}
