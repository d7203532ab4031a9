mod digest;

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "adbrief")]
#[command(about = "Posts a weekly digest of new competitor ads to Slack")]
struct Cli {
    /// Select and render, print the Slack payloads, then stop without
    /// publishing or recording anything as posted.
    #[arg(long)]
    dry_run: bool,

    /// Tracked brands file, overriding `ADBRIEF_BRANDS_PATH`.
    #[arg(long, value_name = "PATH")]
    brands: Option<PathBuf>,

    /// Dedup store file, overriding `ADBRIEF_POSTED_ADS_PATH`.
    #[arg(long, value_name = "PATH")]
    store: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let mut config = adbrief_core::load_app_config()?;
    if let Some(path) = cli.brands {
        config.brands_path = path;
    }
    if let Some(path) = cli.store {
        config.posted_ads_path = path;
    }

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let brands = adbrief_core::load_brands(&config.brands_path)
        .with_context(|| format!("loading brands from {}", config.brands_path.display()))?
        .names();
    tracing::info!(
        brands = brands.len(),
        dry_run = cli.dry_run,
        grouping = %config.message_grouping,
        commit_policy = %config.commit_policy,
        "starting ad digest run"
    );

    let mut rng = StdRng::from_os_rng();
    digest::run_digest(&config, &brands, cli.dry_run, chrono::Utc::now(), &mut rng).await?;
    Ok(())
}
