use crate::app_config::{AppConfig, CommitPolicy, MessageGrouping};
use crate::ConfigError;

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

/// Longest accepted lookback window, in days.
pub const MAX_LOOKBACK_DAYS: u32 = 3650;

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the real environment so tests can drive it with a `HashMap`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_positive_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        let value = or_default(var, default)
            .parse::<usize>()
            .map_err(|e| invalid(var, e.to_string()))?;
        if value == 0 {
            return Err(invalid(var, "must be at least 1".to_string()));
        }
        Ok(value)
    };

    let foreplay_api_key = require("FOREPLAY_API_KEY")?;
    let slack_webhook_url = require("SLACK_WEBHOOK_URL")?;

    let log_level = or_default("ADBRIEF_LOG_LEVEL", "info");
    let brands_path = PathBuf::from(or_default("ADBRIEF_BRANDS_PATH", "./config/brands.yaml"));
    let posted_ads_path = PathBuf::from(or_default("ADBRIEF_POSTED_ADS_PATH", "./posted_ads.json"));
    let foreplay_base_url = or_default(
        "ADBRIEF_FOREPLAY_BASE_URL",
        "https://public.api.foreplay.co",
    );
    let request_timeout_secs = parse_u64("ADBRIEF_REQUEST_TIMEOUT_SECS", "30")?;
    let user_agent = or_default("ADBRIEF_USER_AGENT", "adbrief/0.1 (ad-digest)");

    let lookback_days = parse_u32("ADBRIEF_LOOKBACK_DAYS", "7")?;
    if !(1..=MAX_LOOKBACK_DAYS).contains(&lookback_days) {
        return Err(invalid(
            "ADBRIEF_LOOKBACK_DAYS",
            format!("must be between 1 and {MAX_LOOKBACK_DAYS}"),
        ));
    }
    let fetch_limit = parse_u32("ADBRIEF_FETCH_LIMIT", "10")?;
    if fetch_limit == 0 {
        return Err(invalid("ADBRIEF_FETCH_LIMIT", "must be at least 1".to_string()));
    }
    let ads_per_brand = parse_positive_usize("ADBRIEF_ADS_PER_BRAND", "3")?;
    let target_brands = parse_positive_usize("ADBRIEF_TARGET_BRANDS", "5")?;
    let target_countries = parse_countries(&or_default("ADBRIEF_TARGET_COUNTRIES", "US,USA"))?;

    let inter_request_delay_ms = parse_u64("ADBRIEF_INTER_REQUEST_DELAY_MS", "500")?;
    let publish_delay_ms = parse_u64("ADBRIEF_PUBLISH_DELAY_MS", "1000")?;

    let message_grouping = parse_message_grouping(&or_default("ADBRIEF_MESSAGE_GROUPING", "single"))?;
    let commit_policy = parse_commit_policy(&or_default("ADBRIEF_COMMIT_POLICY", "selected"))?;

    let min_credits = match lookup("ADBRIEF_MIN_CREDITS") {
        Ok(raw) if !raw.trim().is_empty() => Some(
            raw.trim()
                .parse::<u64>()
                .map_err(|e| invalid("ADBRIEF_MIN_CREDITS", e.to_string()))?,
        ),
        _ => None,
    };

    Ok(AppConfig {
        foreplay_api_key,
        slack_webhook_url,
        log_level,
        brands_path,
        posted_ads_path,
        foreplay_base_url,
        request_timeout_secs,
        user_agent,
        lookback_days,
        fetch_limit,
        ads_per_brand,
        target_brands,
        target_countries,
        inter_request_delay_ms,
        publish_delay_ms,
        message_grouping,
        commit_policy,
        min_credits,
    })
}

/// Split a comma-separated country list, upper-casing each code.
fn parse_countries(raw: &str) -> Result<Vec<String>, ConfigError> {
    let countries: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_uppercase)
        .collect();
    if countries.is_empty() {
        return Err(ConfigError::InvalidEnvVar {
            var: "ADBRIEF_TARGET_COUNTRIES".to_string(),
            reason: "at least one country code is required".to_string(),
        });
    }
    Ok(countries)
}

fn parse_message_grouping(s: &str) -> Result<MessageGrouping, ConfigError> {
    match s {
        "single" => Ok(MessageGrouping::Single),
        "per-brand" => Ok(MessageGrouping::PerBrand),
        other => Err(ConfigError::InvalidEnvVar {
            var: "ADBRIEF_MESSAGE_GROUPING".to_string(),
            reason: format!("unknown grouping '{other}'; expected 'single' or 'per-brand'"),
        }),
    }
}

fn parse_commit_policy(s: &str) -> Result<CommitPolicy, ConfigError> {
    match s {
        "selected" => Ok(CommitPolicy::Selected),
        "published" => Ok(CommitPolicy::Published),
        other => Err(ConfigError::InvalidEnvVar {
            var: "ADBRIEF_COMMIT_POLICY".to_string(),
            reason: format!("unknown policy '{other}'; expected 'selected' or 'published'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
