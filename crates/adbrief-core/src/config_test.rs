use std::collections::HashMap;
use std::env::VarError;

use super::*;

fn lookup_from_map<'a>(
    map: &'a HashMap<&'a str, &'a str>,
) -> impl Fn(&str) -> Result<String, VarError> + 'a {
    move |key| {
        map.get(key)
            .map(|v| (*v).to_string())
            .ok_or(VarError::NotPresent)
    }
}

/// Returns a map with both required credentials populated.
fn full_env<'a>() -> HashMap<&'a str, &'a str> {
    let mut m = HashMap::new();
    m.insert("FOREPLAY_API_KEY", "fp-test-key");
    m.insert("SLACK_WEBHOOK_URL", "https://hooks.slack.test/services/T/B/X");
    m
}

#[test]
fn build_app_config_fails_without_foreplay_api_key() {
    let mut map: HashMap<&str, &str> = HashMap::new();
    map.insert("SLACK_WEBHOOK_URL", "https://hooks.slack.test/services/T/B/X");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::MissingEnvVar(ref v)) if v == "FOREPLAY_API_KEY"),
        "expected MissingEnvVar(FOREPLAY_API_KEY), got: {result:?}"
    );
}

#[test]
fn build_app_config_fails_without_webhook_url() {
    let mut map: HashMap<&str, &str> = HashMap::new();
    map.insert("FOREPLAY_API_KEY", "fp-test-key");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::MissingEnvVar(ref v)) if v == "SLACK_WEBHOOK_URL"),
        "expected MissingEnvVar(SLACK_WEBHOOK_URL), got: {result:?}"
    );
}

#[test]
fn blank_credential_counts_as_missing() {
    let mut map = full_env();
    map.insert("FOREPLAY_API_KEY", "   ");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::MissingEnvVar(ref v)) if v == "FOREPLAY_API_KEY"),
        "expected MissingEnvVar(FOREPLAY_API_KEY), got: {result:?}"
    );
}

#[test]
fn build_app_config_succeeds_with_defaults() {
    let map = full_env();
    let result = build_app_config(lookup_from_map(&map));
    assert!(result.is_ok(), "expected Ok, got: {result:?}");
    let cfg = result.unwrap();
    assert_eq!(cfg.foreplay_api_key, "fp-test-key");
    assert_eq!(cfg.log_level, "info");
    assert_eq!(cfg.brands_path.to_str(), Some("./config/brands.yaml"));
    assert_eq!(cfg.posted_ads_path.to_str(), Some("./posted_ads.json"));
    assert_eq!(cfg.foreplay_base_url, "https://public.api.foreplay.co");
    assert_eq!(cfg.request_timeout_secs, 30);
    assert_eq!(cfg.user_agent, "adbrief/0.1 (ad-digest)");
    assert_eq!(cfg.lookback_days, 7);
    assert_eq!(cfg.fetch_limit, 10);
    assert_eq!(cfg.ads_per_brand, 3);
    assert_eq!(cfg.target_brands, 5);
    assert_eq!(cfg.target_countries, vec!["US", "USA"]);
    assert_eq!(cfg.inter_request_delay_ms, 500);
    assert_eq!(cfg.publish_delay_ms, 1000);
    assert_eq!(cfg.message_grouping, MessageGrouping::Single);
    assert_eq!(cfg.commit_policy, CommitPolicy::Selected);
    assert!(cfg.min_credits.is_none());
}

#[test]
fn debug_output_redacts_credentials() {
    let map = full_env();
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    let rendered = format!("{cfg:?}");
    assert!(!rendered.contains("fp-test-key"));
    assert!(!rendered.contains("hooks.slack.test"));
}

#[test]
fn lookback_days_override() {
    let mut map = full_env();
    map.insert("ADBRIEF_LOOKBACK_DAYS", "14");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.lookback_days, 14);
}

#[test]
fn lookback_days_invalid() {
    let mut map = full_env();
    map.insert("ADBRIEF_LOOKBACK_DAYS", "a week");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "ADBRIEF_LOOKBACK_DAYS"),
        "expected InvalidEnvVar(ADBRIEF_LOOKBACK_DAYS), got: {result:?}"
    );
}

#[test]
fn oversized_lookback_days_is_rejected() {
    let mut map = full_env();
    map.insert("ADBRIEF_LOOKBACK_DAYS", "100000000");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "ADBRIEF_LOOKBACK_DAYS"),
        "expected InvalidEnvVar(ADBRIEF_LOOKBACK_DAYS), got: {result:?}"
    );
}

#[test]
fn lookback_days_bounds() {
    let mut map = full_env();
    map.insert("ADBRIEF_LOOKBACK_DAYS", "3650");
    assert_eq!(build_app_config(lookup_from_map(&map)).unwrap().lookback_days, 3650);

    map.insert("ADBRIEF_LOOKBACK_DAYS", "3651");
    assert!(build_app_config(lookup_from_map(&map)).is_err());

    map.insert("ADBRIEF_LOOKBACK_DAYS", "0");
    assert!(build_app_config(lookup_from_map(&map)).is_err());
}

#[test]
fn zero_fetch_limit_is_rejected() {
    let mut map = full_env();
    map.insert("ADBRIEF_FETCH_LIMIT", "0");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "ADBRIEF_FETCH_LIMIT"),
        "expected InvalidEnvVar(ADBRIEF_FETCH_LIMIT), got: {result:?}"
    );
}

#[test]
fn zero_ads_per_brand_is_rejected() {
    let mut map = full_env();
    map.insert("ADBRIEF_ADS_PER_BRAND", "0");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "ADBRIEF_ADS_PER_BRAND"),
        "expected InvalidEnvVar(ADBRIEF_ADS_PER_BRAND), got: {result:?}"
    );
}

#[test]
fn target_countries_are_trimmed_and_uppercased() {
    let mut map = full_env();
    map.insert("ADBRIEF_TARGET_COUNTRIES", " us, ca ,,gb");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.target_countries, vec!["US", "CA", "GB"]);
}

#[test]
fn empty_target_countries_is_rejected() {
    let mut map = full_env();
    map.insert("ADBRIEF_TARGET_COUNTRIES", " , ");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "ADBRIEF_TARGET_COUNTRIES"),
        "expected InvalidEnvVar(ADBRIEF_TARGET_COUNTRIES), got: {result:?}"
    );
}

#[test]
fn message_grouping_per_brand() {
    let mut map = full_env();
    map.insert("ADBRIEF_MESSAGE_GROUPING", "per-brand");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.message_grouping, MessageGrouping::PerBrand);
}

#[test]
fn message_grouping_unknown_fails() {
    let err = parse_message_grouping("threaded").unwrap_err();
    assert!(
        matches!(err, ConfigError::InvalidEnvVar { ref var, .. } if var == "ADBRIEF_MESSAGE_GROUPING")
    );
}

#[test]
fn commit_policy_published() {
    let mut map = full_env();
    map.insert("ADBRIEF_COMMIT_POLICY", "published");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.commit_policy, CommitPolicy::Published);
}

#[test]
fn commit_policy_unknown_fails() {
    let err = parse_commit_policy("delivered").unwrap_err();
    assert!(
        matches!(err, ConfigError::InvalidEnvVar { ref var, .. } if var == "ADBRIEF_COMMIT_POLICY")
    );
}

#[test]
fn min_credits_parses_when_set() {
    let mut map = full_env();
    map.insert("ADBRIEF_MIN_CREDITS", "250");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.min_credits, Some(250));
}

#[test]
fn min_credits_empty_is_unset() {
    let mut map = full_env();
    map.insert("ADBRIEF_MIN_CREDITS", "");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert!(cfg.min_credits.is_none());
}

#[test]
fn min_credits_invalid() {
    let mut map = full_env();
    map.insert("ADBRIEF_MIN_CREDITS", "lots");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "ADBRIEF_MIN_CREDITS"),
        "expected InvalidEnvVar(ADBRIEF_MIN_CREDITS), got: {result:?}"
    );
}
