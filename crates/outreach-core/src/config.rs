use std::str::FromStr;

use crate::app_config::{AppConfig, Environment, MIN_SEND_RATE_PER_SEC};
use crate::sender::SenderProfile;
use crate::ConfigError;

pub(crate) const DEFAULT_FETCH_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so it can be tested with a plain
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let optional = |var: &str| -> Option<String> {
        lookup(var)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    let env = parse_environment(&or_default("OUTREACH_ENV", "development"))?;
    let log_level = or_default("OUTREACH_LOG_LEVEL", "info");

    let gemini_api_key = require("GEMINI_API_KEY")?;
    let gemini_model = or_default("OUTREACH_GEMINI_MODEL", "gemini-2.5-flash");
    let gmail_access_token = optional("GMAIL_ACCESS_TOKEN");
    let from_address = optional("OUTREACH_FROM_ADDRESS");

    let fetch_timeout_secs = parse_num::<u64, _>(&lookup, "OUTREACH_FETCH_TIMEOUT_SECS", "30")?;
    let fetch_max_bytes = parse_num::<usize, _>(&lookup, "OUTREACH_FETCH_MAX_BYTES", "1000000")?;
    let fetch_max_redirects = parse_num::<usize, _>(&lookup, "OUTREACH_FETCH_MAX_REDIRECTS", "5")?;
    let fetch_user_agent = or_default("OUTREACH_FETCH_USER_AGENT", DEFAULT_FETCH_USER_AGENT);
    let fetch_retries = parse_num::<u32, _>(&lookup, "OUTREACH_FETCH_RETRIES", "0")?;

    let generation_timeout_secs =
        parse_num::<u64, _>(&lookup, "OUTREACH_GENERATION_TIMEOUT_SECS", "60")?;
    let delivery_timeout_secs =
        parse_num::<u64, _>(&lookup, "OUTREACH_DELIVERY_TIMEOUT_SECS", "30")?;

    let max_concurrent_units = parse_num::<usize, _>(&lookup, "OUTREACH_MAX_CONCURRENT_UNITS", "5")?;
    if max_concurrent_units == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "OUTREACH_MAX_CONCURRENT_UNITS".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }

    let send_rate_per_sec = parse_num::<f64, _>(&lookup, "OUTREACH_SEND_RATE_PER_SEC", "1.0")?;
    if !send_rate_per_sec.is_finite() || send_rate_per_sec < MIN_SEND_RATE_PER_SEC {
        return Err(ConfigError::InvalidEnvVar {
            var: "OUTREACH_SEND_RATE_PER_SEC".to_string(),
            reason: format!(
                "must be a number of at least {MIN_SEND_RATE_PER_SEC}, got {send_rate_per_sec}"
            ),
        });
    }

    let send_burst = parse_num::<u32, _>(&lookup, "OUTREACH_SEND_BURST", "3")?;
    if send_burst == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "OUTREACH_SEND_BURST".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }

    let quota_backoff_ms = parse_num::<u64, _>(&lookup, "OUTREACH_QUOTA_BACKOFF_MS", "2000")?;
    let max_quota_backoff_secs =
        parse_num::<u64, _>(&lookup, "OUTREACH_MAX_QUOTA_BACKOFF_SECS", "60")?;
    if max_quota_backoff_secs == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "OUTREACH_MAX_QUOTA_BACKOFF_SECS".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }

    let defaults = SenderProfile::default();
    let sender = SenderProfile {
        name: or_default("OUTREACH_SENDER_NAME", &defaults.name),
        title: or_default("OUTREACH_SENDER_TITLE", &defaults.title),
        company: or_default("OUTREACH_SENDER_COMPANY", &defaults.company),
        company_description: or_default(
            "OUTREACH_SENDER_COMPANY_DESCRIPTION",
            &defaults.company_description,
        ),
        value_proposition: or_default(
            "OUTREACH_SENDER_VALUE_PROPOSITION",
            &defaults.value_proposition,
        ),
        services: or_default("OUTREACH_SENDER_SERVICES", "")
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(ToOwned::to_owned)
            .collect(),
    };

    Ok(AppConfig {
        env,
        log_level,
        gemini_api_key,
        gemini_model,
        gmail_access_token,
        from_address,
        fetch_timeout_secs,
        fetch_max_bytes,
        fetch_max_redirects,
        fetch_user_agent,
        fetch_retries,
        generation_timeout_secs,
        delivery_timeout_secs,
        max_concurrent_units,
        send_rate_per_sec,
        send_burst,
        quota_backoff_ms,
        max_quota_backoff_secs,
        sender,
    })
}

fn parse_num<T, F>(lookup: &F, var: &str, default: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let raw = lookup(var).unwrap_or_else(|_| default.to_string());
    raw.trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "OUTREACH_ENV".to_string(),
            reason: format!("unknown environment \"{other}\""),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
