//! One end-to-end digest run: load seen ids, select, render, publish, commit.
//!
//! Only setup failures (an unusable client or webhook URL) abort the run.
//! Everything after selection is fail-soft: publish failures are counted and
//! a failed commit is logged, and the run still exits cleanly.

use std::time::Duration;

use adbrief_core::{AppConfig, CommitPolicy};
use adbrief_foreplay::{select_ads, ForeplayClient, SelectOptions};
use adbrief_slack::{render, PublishOutcome, SlackWebhook};
use adbrief_store::DedupStore;
use anyhow::Context;
use chrono::{DateTime, Utc};
use rand::Rng;

/// Counters reported at the end of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct RunSummary {
    pub brands_checked: usize,
    pub brands_selected: usize,
    pub ads_selected: usize,
    pub messages: usize,
    pub published: usize,
    pub failed: usize,
    /// Ids newly written to the dedup store.
    pub committed: usize,
    pub stopped_on_quota: bool,
}

pub(crate) async fn run_digest<R: Rng + ?Sized>(
    config: &AppConfig,
    brands: &[String],
    dry_run: bool,
    now: DateTime<Utc>,
    rng: &mut R,
) -> anyhow::Result<RunSummary> {
    let client = ForeplayClient::with_base_url(
        &config.foreplay_api_key,
        config.request_timeout_secs,
        &config.user_agent,
        &config.foreplay_base_url,
    )
    .context("building Foreplay client")?;
    let webhook = SlackWebhook::new(
        &config.slack_webhook_url,
        config.request_timeout_secs,
        &config.user_agent,
    )
    .context("building Slack webhook client")?;

    let mut store = DedupStore::open_or_empty(&config.posted_ads_path);
    tracing::info!(
        path = %store.path().display(),
        posted = store.len(),
        last_updated = ?store.last_updated(),
        "dedup store loaded"
    );

    let options = SelectOptions::from_config(config);
    let report = select_ads(&client, brands, store.posted_ids(), &options, now, rng).await;
    let mut summary = RunSummary {
        brands_checked: report.brands_checked,
        brands_selected: report.selection.brand_count(),
        ads_selected: report.selection.ad_count(),
        stopped_on_quota: report.stopped_on_quota,
        ..RunSummary::default()
    };

    let credits = client.credits();
    tracing::info!(
        requests = credits.requests,
        credits_spent = credits.total_cost,
        credits_remaining = ?credits.last_remaining,
        "Foreplay usage"
    );

    if report.selection.is_empty() {
        tracing::info!(
            brands_checked = summary.brands_checked,
            "no new ads this run; nothing to publish"
        );
        return Ok(summary);
    }

    let messages = render(&report.selection, config.message_grouping, rng);
    summary.messages = messages.len();

    if dry_run {
        for message in &messages {
            let payload =
                serde_json::to_string_pretty(message).context("serializing digest message")?;
            println!("{payload}");
        }
        tracing::info!(
            messages = summary.messages,
            ads = summary.ads_selected,
            "dry run: skipped publish and dedup commit"
        );
        return Ok(summary);
    }

    let outcomes = webhook
        .publish_all(&messages, Duration::from_millis(config.publish_delay_ms))
        .await;
    summary.published = outcomes.iter().filter(|o| o.is_success()).count();
    summary.failed = outcomes.len() - summary.published;

    let to_commit = ids_to_commit(config.commit_policy, &report.selection.ad_ids(), &outcomes);
    match store.commit(to_commit) {
        Ok(added) => summary.committed = added,
        Err(e) => tracing::error!(
            path = %store.path().display(),
            error = %e,
            "failed to record posted ads; they may be announced again next run"
        ),
    }

    tracing::info!(
        brands_checked = summary.brands_checked,
        brands_selected = summary.brands_selected,
        ads_selected = summary.ads_selected,
        messages = summary.messages,
        published = summary.published,
        failed = summary.failed,
        committed = summary.committed,
        stopped_on_quota = summary.stopped_on_quota,
        "digest run complete"
    );
    Ok(summary)
}

/// Ids the dedup store should remember after this run.
fn ids_to_commit(
    policy: CommitPolicy,
    selected: &[String],
    outcomes: &[PublishOutcome],
) -> Vec<String> {
    match policy {
        CommitPolicy::Selected => selected.to_vec(),
        CommitPolicy::Published => outcomes
            .iter()
            .filter(|o| o.is_success())
            .flat_map(|o| o.ad_ids.iter().cloned())
            .collect(),
    }
}

#[cfg(test)]
#[path = "digest_test.rs"]
mod tests;
