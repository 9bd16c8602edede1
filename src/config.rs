use std::{env, fmt::Display, str::FromStr};

use tracing::{info, warn};

use crate::clients::DEFAULT_CREW_CAPACITY;

/// Environment-driven configuration for the demo binary and app wiring.
pub struct Config {
    pub api_url: String,
    pub username: Option<String>,
    pub password: Option<String>,
    pub crew_capacity: u32,
}

impl Config {
    pub fn load() -> Self {
        Self {
            api_url: try_load("CRAVINGS_API_URL", "http://localhost:8000"),
            username: env::var("CRAVINGS_USERNAME").ok(),
            password: env::var("CRAVINGS_PASSWORD").ok(),
            crew_capacity: try_load("CRAVINGS_CREW_CAPACITY", &DEFAULT_CREW_CAPACITY.to_string()),
        }
    }
}

fn try_load<T: FromStr>(key: &str, default: &str) -> T
where
    T::Err: Display,
{
    env::var(key)
        .unwrap_or_else(|_| {
            info!("{key} not set, using default: {default}");
            default.to_string()
        })
        .parse()
        .map_err(|e| {
            warn!("Invalid {key} value: {e}");
        })
        .expect("Environment misconfigured!")
}
