//! Runtime config loaded from env (call `dotenvy::dotenv()` first).

use std::env;
use std::str::FromStr;

use anyhow::{Context, Result};
use handler_chain::{RouterConfig, DEFAULT_BACK_ENDPOINT, DEFAULT_MAX_BACK_HOPS};

#[cfg(test)]
mod tests;

const DEFAULT_LOG_FILE: &str = "logs/gbot.log";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GbotConfig {
    /// LOG_FILE
    pub log_file: String,
    /// GBOT_BACK_ENDPOINT
    pub back_endpoint: String,
    /// GBOT_MAX_BACK_HOPS
    pub max_back_hops: usize,
    /// GBOT_MAX_STACK_DEPTH; unbounded when unset.
    pub max_stack_depth: Option<usize>,
    /// GBOT_ALLOWED_USERS, comma-separated. Empty disables the allowlist.
    pub allowed_users: Vec<i64>,
}

impl Default for GbotConfig {
    fn default() -> Self {
        Self {
            log_file: DEFAULT_LOG_FILE.to_string(),
            back_endpoint: DEFAULT_BACK_ENDPOINT.to_string(),
            max_back_hops: DEFAULT_MAX_BACK_HOPS,
            max_stack_depth: None,
            allowed_users: Vec::new(),
        }
    }
}

impl GbotConfig {
    /// Load from environment variables. Unset variables take their defaults; unparsable numbers
    /// are errors.
    pub fn from_env() -> Result<Self> {
        let log_file = env::var("LOG_FILE").unwrap_or_else(|_| DEFAULT_LOG_FILE.to_string());
        let back_endpoint =
            env::var("GBOT_BACK_ENDPOINT").unwrap_or_else(|_| DEFAULT_BACK_ENDPOINT.to_string());
        let max_back_hops = parse_var("GBOT_MAX_BACK_HOPS")?.unwrap_or(DEFAULT_MAX_BACK_HOPS);
        let max_stack_depth = parse_var("GBOT_MAX_STACK_DEPTH")?;
        let allowed_users = match env::var("GBOT_ALLOWED_USERS") {
            Ok(raw) => parse_user_list(&raw)?,
            Err(_) => Vec::new(),
        };

        Ok(Self {
            log_file,
            back_endpoint,
            max_back_hops,
            max_stack_depth,
            allowed_users,
        })
    }

    pub fn validate(&self) -> Result<()> {
        self.router_config()
            .validate()
            .context("Invalid GBOT_* router settings")
    }

    pub fn router_config(&self) -> RouterConfig {
        RouterConfig {
            back_endpoint: self.back_endpoint.clone(),
            max_back_hops: self.max_back_hops,
            max_stack_depth: self.max_stack_depth,
        }
    }
}

fn parse_var<T>(name: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map(Some)
            .with_context(|| format!("{} is not a valid number: {}", name, raw)),
        _ => Ok(None),
    }
}

fn parse_user_list(raw: &str) -> Result<Vec<i64>> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse()
                .with_context(|| format!("GBOT_ALLOWED_USERS has an invalid user id: {}", s))
        })
        .collect()
}
