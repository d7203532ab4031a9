//! Ad selection: which brands to query and which of their ads to feature.
//!
//! Remote calls cost credits, so brands are visited one at a time and the
//! walk stops as soon as `target_brands` brands have qualifying ads. The walk
//! is always bounded by the length of the brand list.

use std::collections::HashSet;
use std::time::Duration;

use adbrief_core::{AdRecord, AppConfig, Selection};
use chrono::{DateTime, TimeDelta, Utc};
use rand::seq::SliceRandom;
use rand::Rng;

use crate::client::ForeplayClient;

/// Knobs for one selector pass.
#[derive(Debug, Clone)]
pub struct SelectOptions {
    /// Ads whose start date is older than `now - lookback` are rejected.
    pub lookback: TimeDelta,
    /// Ads requested per brand; each one costs credits.
    pub fetch_limit: u32,
    /// Maximum ads kept per brand after ranking.
    pub ads_per_brand: usize,
    /// Stop once this many brands have qualifying ads.
    pub target_brands: usize,
    /// Upper-case country codes the digest audience cares about.
    pub target_countries: Vec<String>,
    pub inter_request_delay: Duration,
    /// Stop visiting brands once the advertised credit balance drops below this.
    pub min_credits: Option<u64>,
}

impl Default for SelectOptions {
    fn default() -> Self {
        Self {
            lookback: TimeDelta::days(7),
            fetch_limit: 10,
            ads_per_brand: 3,
            target_brands: 5,
            target_countries: vec!["US".to_string(), "USA".to_string()],
            inter_request_delay: Duration::from_millis(500),
            min_credits: None,
        }
    }
}

impl SelectOptions {
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            lookback: TimeDelta::days(i64::from(config.lookback_days)),
            fetch_limit: config.fetch_limit,
            ads_per_brand: config.ads_per_brand,
            target_brands: config.target_brands,
            target_countries: config.target_countries.clone(),
            inter_request_delay: Duration::from_millis(config.inter_request_delay_ms),
            min_credits: config.min_credits,
        }
    }
}

/// Why ads were rejected for one brand.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FilterStats {
    pub already_posted: usize,
    pub out_of_market: usize,
    pub stale: usize,
}

/// Outcome of a full selector pass.
#[derive(Debug, Clone, Default)]
pub struct SelectionReport {
    pub selection: Selection,
    /// Brands resolved or attempted before the walk stopped.
    pub brands_checked: usize,
    /// `true` when the walk ended early because of the credit floor.
    pub stopped_on_quota: bool,
}

/// `true` if the ad declares no countries, or at least one target country.
#[must_use]
pub fn is_in_market(ad: &AdRecord, target_countries: &[String]) -> bool {
    ad.countries.is_empty()
        || ad.countries.iter().any(|c| {
            target_countries
                .iter()
                .any(|t| t.eq_ignore_ascii_case(c.trim()))
        })
}

/// Video ads first, then newest start date first. Stable, so the remote's
/// order decides remaining ties.
pub fn rank_ads(ads: &mut [AdRecord]) {
    ads.sort_by(|a, b| {
        b.media
            .has_video()
            .cmp(&a.media.has_video())
            .then_with(|| b.started_running.cmp(&a.started_running))
    });
}

/// Filters one brand's ads against the dedup set, the target market and the
/// lookback window, then ranks the survivors and keeps the top
/// `options.ads_per_brand`.
///
/// An ad is recent when `started_running >= now - lookback`; an ad with no
/// start date is never recent.
#[must_use]
pub fn qualify_ads(
    ads: Vec<AdRecord>,
    seen: &HashSet<String>,
    options: &SelectOptions,
    now: DateTime<Utc>,
) -> (Vec<AdRecord>, FilterStats) {
    // A window reaching past chrono's range admits every dated ad.
    let cutoff = now
        .checked_sub_signed(options.lookback)
        .unwrap_or(DateTime::<Utc>::MIN_UTC);
    let mut stats = FilterStats::default();
    let mut survivors = Vec::with_capacity(ads.len());

    for ad in ads {
        if seen.contains(&ad.id) {
            stats.already_posted += 1;
            continue;
        }
        if !is_in_market(&ad, &options.target_countries) {
            tracing::debug!(ad_id = %ad.id, countries = ?ad.countries, "skipped: outside target market");
            stats.out_of_market += 1;
            continue;
        }
        match ad.started_running {
            Some(started) if started >= cutoff => survivors.push(ad),
            _ => stats.stale += 1,
        }
    }

    rank_ads(&mut survivors);
    survivors.truncate(options.ads_per_brand);
    (survivors, stats)
}

/// Returns the brand names in a random order drawn from `rng`.
#[must_use]
pub fn shuffle_brands<R: Rng + ?Sized>(brands: &[String], rng: &mut R) -> Vec<String> {
    let mut order = brands.to_vec();
    order.shuffle(rng);
    order
}

/// Shuffles `brands` with `rng`, then runs [`select_in_order`].
pub async fn select_ads<R: Rng + ?Sized>(
    client: &ForeplayClient,
    brands: &[String],
    seen: &HashSet<String>,
    options: &SelectOptions,
    now: DateTime<Utc>,
    rng: &mut R,
) -> SelectionReport {
    let order = shuffle_brands(brands, rng);
    select_in_order(client, &order, seen, options, now).await
}

/// Visits `brands` in the given order until `options.target_brands` brands
/// have qualifying ads, the list runs out, or the credit floor is hit.
///
/// Unresolvable brands and failed listings are skipped. An empty selection is
/// a normal outcome.
pub async fn select_in_order(
    client: &ForeplayClient,
    brands: &[String],
    seen: &HashSet<String>,
    options: &SelectOptions,
    now: DateTime<Utc>,
) -> SelectionReport {
    let mut report = SelectionReport::default();

    tracing::info!(
        target_brands = options.target_brands,
        available = brands.len(),
        "selecting brands with new ads"
    );

    for (index, name) in brands.iter().enumerate() {
        if report.selection.brand_count() >= options.target_brands {
            break;
        }
        if client.credits().below(options.min_credits) {
            tracing::warn!(
                credits_remaining = ?client.credits().last_remaining,
                min_credits = ?options.min_credits,
                "credit balance below floor; stopping brand walk"
            );
            report.stopped_on_quota = true;
            break;
        }
        if index > 0 && !options.inter_request_delay.is_zero() {
            tokio::time::sleep(options.inter_request_delay).await;
        }

        report.brands_checked += 1;
        let Some(brand) = client.resolve_brand(name).await else {
            continue;
        };
        tracing::debug!(brand = %name, foreplay_name = %brand.name, brand_id = %brand.id, "resolved brand");

        let ads = client.fetch_ads(&brand, options.fetch_limit).await;
        let fetched = ads.len();
        let (mut featured, stats) = qualify_ads(ads, seen, options, now);
        for ad in &mut featured {
            ad.brand_name.clone_from(name);
        }

        tracing::info!(
            brand = %name,
            fetched,
            already_posted = stats.already_posted,
            out_of_market = stats.out_of_market,
            stale = stats.stale,
            featured = featured.len(),
            "brand checked"
        );
        report.selection.insert(name.clone(), featured);
    }

    tracing::info!(
        brands_with_ads = report.selection.brand_count(),
        ads = report.selection.ad_count(),
        brands_checked = report.brands_checked,
        "selection complete"
    );
    report
}

#[cfg(test)]
mod tests {
    use adbrief_core::{AdCopy, AdMedia};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    fn now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-10-15T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    fn ad(id: &str, days_ago: i64, video: bool, countries: &[&str]) -> AdRecord {
        AdRecord {
            id: id.to_string(),
            brand_name: "Seed".to_string(),
            media: AdMedia {
                thumbnail: Some(format!("https://cdn.example/{id}.jpg")),
                video: video.then(|| format!("https://cdn.example/{id}.mp4")),
                image: None,
            },
            copy: AdCopy::default(),
            countries: countries.iter().map(|c| (*c).to_string()).collect(),
            started_running: Some(now() - TimeDelta::days(days_ago)),
            display_format: None,
        }
    }

    fn ids(ads: &[AdRecord]) -> Vec<&str> {
        ads.iter().map(|a| a.id.as_str()).collect()
    }

    #[test]
    fn already_posted_ads_are_never_selected() {
        let seen: HashSet<String> = ["a", "c"].into_iter().map(String::from).collect();
        let ads = vec![ad("a", 1, true, &[]), ad("b", 1, false, &[]), ad("c", 2, true, &[])];
        let (kept, stats) = qualify_ads(ads, &seen, &SelectOptions::default(), now());
        assert_eq!(ids(&kept), vec!["b"]);
        assert_eq!(stats.already_posted, 2);
    }

    #[test]
    fn foreign_only_ads_are_rejected_and_unspecified_kept() {
        let ads = vec![ad("de", 1, false, &["DE"]), ad("none", 1, false, &[])];
        let (kept, stats) = qualify_ads(ads, &HashSet::new(), &SelectOptions::default(), now());
        assert_eq!(ids(&kept), vec!["none"]);
        assert_eq!(stats.out_of_market, 1);
    }

    #[test]
    fn country_match_accepts_alias_and_ignores_case() {
        let targets = vec!["US".to_string(), "USA".to_string()];
        assert!(is_in_market(&ad("x", 1, false, &["DE", "usa"]), &targets));
        assert!(is_in_market(&ad("y", 1, false, &["us"]), &targets));
        assert!(!is_in_market(&ad("z", 1, false, &["GB", "FR"]), &targets));
    }

    #[test]
    fn lookback_boundary_is_inclusive() {
        let options = SelectOptions::default();
        let mut at_cutoff = ad("edge", 0, false, &[]);
        at_cutoff.started_running = Some(now() - options.lookback);
        let mut just_before = ad("old", 0, false, &[]);
        just_before.started_running = Some(now() - options.lookback - TimeDelta::seconds(1));
        let inside = ad("fresh", 6, false, &[]);

        let (kept, stats) =
            qualify_ads(vec![at_cutoff, just_before, inside], &HashSet::new(), &options, now());
        assert_eq!(ids(&kept), vec!["fresh", "edge"]);
        assert_eq!(stats.stale, 1);
    }

    #[test]
    fn lookback_beyond_date_range_keeps_dated_ads() {
        let options = SelectOptions {
            lookback: TimeDelta::days(100_000_000),
            ..SelectOptions::default()
        };
        let (kept, stats) =
            qualify_ads(vec![ad("ancient", 9_000, false, &[])], &HashSet::new(), &options, now());
        assert_eq!(ids(&kept), vec!["ancient"]);
        assert_eq!(stats.stale, 0);
    }

    #[test]
    fn ads_without_start_date_are_stale() {
        let mut undated = ad("undated", 0, true, &[]);
        undated.started_running = None;
        let (kept, stats) = qualify_ads(vec![undated], &HashSet::new(), &SelectOptions::default(), now());
        assert!(kept.is_empty());
        assert_eq!(stats.stale, 1);
    }

    #[test]
    fn ranking_puts_video_first_then_newest() {
        let ads = vec![
            ad("img-new", 0, false, &[]),
            ad("vid-old", 5, true, &[]),
            ad("vid-new", 1, true, &[]),
            ad("img-old", 4, false, &[]),
        ];
        let options = SelectOptions {
            ads_per_brand: 10,
            ..SelectOptions::default()
        };
        let (kept, _) = qualify_ads(ads, &HashSet::new(), &options, now());
        assert_eq!(ids(&kept), vec!["vid-new", "vid-old", "img-new", "img-old"]);
    }

    #[test]
    fn survivors_are_capped_per_brand() {
        let ads = (0..6).map(|i| ad(&format!("ad{i}"), i, false, &[])).collect();
        let (kept, _) = qualify_ads(ads, &HashSet::new(), &SelectOptions::default(), now());
        assert_eq!(ids(&kept), vec!["ad0", "ad1", "ad2"]);
    }

    #[test]
    fn same_seed_gives_same_brand_order() {
        let brands: Vec<String> = (0..20).map(|i| format!("brand-{i}")).collect();
        let first = shuffle_brands(&brands, &mut StdRng::seed_from_u64(7));
        let second = shuffle_brands(&brands, &mut StdRng::seed_from_u64(7));
        assert_eq!(first, second);

        let mut sorted = first.clone();
        sorted.sort();
        let mut expected = brands.clone();
        expected.sort();
        assert_eq!(sorted, expected, "shuffle must be a permutation");
    }

    #[test]
    fn options_from_config_carry_every_knob() {
        let config = AppConfig {
            foreplay_api_key: "k".to_string(),
            slack_webhook_url: "https://hooks.slack.test/x".to_string(),
            log_level: "info".to_string(),
            brands_path: "brands.yaml".into(),
            posted_ads_path: "posted_ads.json".into(),
            foreplay_base_url: "https://public.api.foreplay.co".to_string(),
            request_timeout_secs: 30,
            user_agent: "ua".to_string(),
            lookback_days: 14,
            fetch_limit: 4,
            ads_per_brand: 2,
            target_brands: 8,
            target_countries: vec!["CA".to_string()],
            inter_request_delay_ms: 0,
            publish_delay_ms: 0,
            message_grouping: adbrief_core::MessageGrouping::Single,
            commit_policy: adbrief_core::CommitPolicy::Selected,
            min_credits: Some(10),
        };
        let options = SelectOptions::from_config(&config);
        assert_eq!(options.lookback, TimeDelta::days(14));
        assert_eq!(options.fetch_limit, 4);
        assert_eq!(options.ads_per_brand, 2);
        assert_eq!(options.target_brands, 8);
        assert_eq!(options.target_countries, vec!["CA"]);
        assert!(options.inter_request_delay.is_zero());
        assert_eq!(options.min_credits, Some(10));
    }
}
