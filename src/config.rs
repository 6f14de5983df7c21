use anyhow::{anyhow, Result};
use std::env;
use std::time::Duration;

use crate::services::rewards::BadgePolicy;

pub const DEFAULT_DATABASE_URL: &str = "sqlite:./data/trelox.db";
const DEFAULT_HTTP_PORT: u16 = 10000;
const DEFAULT_POLL_SECONDS: u64 = 5;
const DEFAULT_HANDLER_TIMEOUT_SECONDS: u64 = 30;

#[derive(Debug, Clone)]
pub struct Config {
    pub telegram_bot_token: String,
    pub database_url: String,
    pub http_port: u16,
    pub scheduler_poll_interval: Duration,
    pub handler_timeout: Duration,
    /// Events later than this are dropped instead of fired. `None` fires every late event.
    pub misfire_grace: Option<Duration>,
    pub badge_policy: BadgePolicy,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let token = env::var("TELEGRAM_BOT_TOKEN")
            .map_err(|_| anyhow!("TELEGRAM_BOT_TOKEN must be set"))?;
        
        if token.trim().is_empty() {
            return Err(anyhow!("TELEGRAM_BOT_TOKEN must be set"));
        }
        
        let database_url = non_blank_var("DATABASE_URL")
            .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());
        
        // Hosting platforms usually inject PORT; HTTP_PORT wins when both are set
        let port_var = ["HTTP_PORT", "PORT"]
            .into_iter()
            .find_map(|name| non_blank_var(name).map(|value| (name, value)));
        let http_port = match port_var {
            Some((name, port_str)) => port_str.trim()
                .parse()
                .map_err(|_| anyhow!("Invalid {name}"))?,
            None => DEFAULT_HTTP_PORT,
        };
        
        let poll_seconds = parse_seconds("SCHEDULER_POLL_SECONDS")?.unwrap_or(DEFAULT_POLL_SECONDS);
        if poll_seconds == 0 {
            return Err(anyhow!("SCHEDULER_POLL_SECONDS must be greater than zero"));
        }
        
        let handler_timeout = parse_seconds("HANDLER_TIMEOUT_SECONDS")?
            .unwrap_or(DEFAULT_HANDLER_TIMEOUT_SECONDS);
        let misfire_grace = parse_seconds("MISFIRE_GRACE_SECONDS")?;
        if misfire_grace == Some(0) {
            return Err(anyhow!("MISFIRE_GRACE_SECONDS must be greater than zero, leave it unset to always fire"));
        }
        
        let badge_policy = match non_blank_var("WEEKLY_BADGE_POLICY") {
            Some(value) => value.parse()?,
            None => BadgePolicy::default(),
        };
        
        Ok(Config {
            telegram_bot_token: token,
            database_url,
            http_port,
            scheduler_poll_interval: Duration::from_secs(poll_seconds),
            handler_timeout: Duration::from_secs(handler_timeout),
            misfire_grace: misfire_grace.map(Duration::from_secs),
            badge_policy,
        })
    }
}

fn non_blank_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.trim().is_empty())
}

fn parse_seconds(name: &str) -> Result<Option<u64>> {
    non_blank_var(name)
        .map(|value| {
            value.trim()
                .parse::<u64>()
                .map_err(|_| anyhow!("Invalid {name}: expected a whole number of seconds"))
        })
        .transpose()
}
