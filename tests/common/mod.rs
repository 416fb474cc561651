#![allow(dead_code)]

use budget_tracker::{
    config::{AppConfig, DEFAULT_ROLLOVER_SCHEDULE},
    scheduler::CronSchedule,
};

pub const SECRET: &str = "test-secret";

/// Settings for running the router in tests; bcrypt runs at its minimum cost.
pub fn test_config() -> AppConfig {
    AppConfig {
        database_url: String::new(),
        jwt_secret: SECRET.to_string(),
        port: 0,
        token_ttl_hours: 1,
        bcrypt_cost: 4,
        rollover_schedule: CronSchedule::parse(DEFAULT_ROLLOVER_SCHEDULE).unwrap(),
        vision: None,
    }
}
