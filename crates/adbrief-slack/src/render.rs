//! Turns a [`Selection`] into one or more Slack messages.
//!
//! Brands render in name order. Each brand becomes a unit of blocks that is
//! never split across messages: its name, up to [`MEDIA_PER_BRAND`] media
//! previews, and one copy sample. Apart from the tagline the output depends
//! only on the selection.

use adbrief_core::{AdRecord, MessageGrouping, Selection};
use rand::seq::IndexedRandom;
use rand::Rng;

use crate::blocks::{
    clip, escape_mrkdwn, usable_url, Block, DigestMessage, MAX_BLOCKS_PER_MESSAGE,
};

pub const DIGEST_TITLE: &str = "Creative Inspo of the Week";

pub const TAGLINES: &[&str] = &[
    "Fresh creative, hot off the feeds.",
    "This week's scroll-stoppers.",
    "What the best brands shipped this week.",
    "Hooks and angles worth a second look.",
    "Your weekly dose of ad inspiration.",
    "New week, new creative to learn from.",
    "Steal like an artist. Start here.",
];

/// Media previews shown per brand.
pub const MEDIA_PER_BRAND: usize = 2;
/// Description characters kept in a copy sample before the ellipsis.
pub const DESCRIPTION_CHARS: usize = 180;
const HEADLINE_CHARS: usize = 150;
const CTA_CHARS: usize = 80;
const BRAND_NAME_CHARS: usize = 150;

struct BrandUnit {
    brand: String,
    blocks: Vec<Block>,
    ad_ids: Vec<String>,
}

/// Renders the selection with the given grouping policy.
///
/// Returns no messages when nothing in the selection is displayable. Brands
/// with neither media nor copy are dropped here, but their ads stay in the
/// selection.
pub fn render<R: Rng + ?Sized>(
    selection: &Selection,
    grouping: MessageGrouping,
    rng: &mut R,
) -> Vec<DigestMessage> {
    let units: Vec<BrandUnit> = selection
        .iter()
        .filter_map(|(brand, ads)| brand_unit(brand, ads))
        .collect();
    if units.is_empty() {
        return Vec::new();
    }

    let tagline = TAGLINES.choose(rng).copied().unwrap_or(TAGLINES[0]);
    let ad_total: usize = units.iter().map(|u| u.ad_ids.len()).sum();
    let summary = summary_line(ad_total, units.len());

    let messages = match grouping {
        MessageGrouping::Single => pack_single(units, tagline, &summary),
        MessageGrouping::PerBrand => one_per_brand(units, tagline, &summary),
    };
    tracing::debug!(
        grouping = %grouping,
        messages = messages.len(),
        ads = ad_total,
        "digest rendered"
    );
    messages
}

fn summary_line(ads: usize, brands: usize) -> String {
    format!(
        "{ads} new {} from {brands} {}",
        plural(ads, "ad", "ads"),
        plural(brands, "brand", "brands")
    )
}

fn plural<'a>(n: usize, one: &'a str, many: &'a str) -> &'a str {
    if n == 1 {
        one
    } else {
        many
    }
}

fn brand_unit(brand: &str, ads: &[AdRecord]) -> Option<BrandUnit> {
    let with_media: Vec<&AdRecord> = ads
        .iter()
        .filter(|ad| has_usable_media(ad))
        .take(MEDIA_PER_BRAND)
        .collect();
    let copy_source = ads.iter().find(|ad| ad.copy.has_text());

    if with_media.is_empty() && copy_source.is_none() {
        tracing::debug!(brand, ads = ads.len(), "brand has nothing displayable; left out of digest");
        return None;
    }

    let name = escape_mrkdwn(&clip(brand, BRAND_NAME_CHARS));
    let mut blocks = vec![Block::section(&format!(
        "*{name}*  ({} new {})",
        ads.len(),
        plural(ads.len(), "ad", "ads")
    ))];

    for ad in with_media {
        blocks.extend(media_blocks(brand, ad));
    }
    if let Some(ad) = copy_source {
        blocks.push(Block::section(&copy_sample(ad)));
    }

    Some(BrandUnit {
        brand: brand.to_string(),
        blocks,
        ad_ids: ads.iter().map(|ad| ad.id.clone()).collect(),
    })
}

/// Media whose URLs are too long for Slack is treated as absent.
fn has_usable_media(ad: &AdRecord) -> bool {
    let usable = usable_url(ad.media.preview_url()).is_some()
        || usable_url(ad.media.video_url()).is_some();
    if !usable && ad.media.has_any() {
        tracing::debug!(ad_id = %ad.id, "media URL too long for Slack; skipping preview");
    }
    usable
}

/// Preview image (or a bare link for video-only ads), a format/date line,
/// and a watch button when the ad has video.
fn media_blocks(brand: &str, ad: &AdRecord) -> Vec<Block> {
    let mut blocks = Vec::with_capacity(3);
    if let Some(preview) = usable_url(ad.media.preview_url()) {
        blocks.push(Block::image(preview, &format!("{brand} ad creative")));
    }

    let format = ad
        .display_format
        .as_deref()
        .map(str::trim)
        .filter(|f| !f.is_empty())
        .unwrap_or("Ad");
    let mut meta = format!("*{}*", escape_mrkdwn(format));
    if let Some(started) = ad.started_running {
        meta.push_str(&format!(" | started {}", started.format("%b %-d, %Y")));
    }
    blocks.push(Block::context(&meta));

    if let Some(video) = usable_url(ad.media.video_url()) {
        blocks.push(Block::link_button("Watch video", video));
    }
    blocks
}

fn copy_sample(ad: &AdRecord) -> String {
    let mut lines = Vec::with_capacity(3);
    if let Some(headline) = ad.copy.headline() {
        lines.push(format!(
            "*{}*",
            escape_mrkdwn(&clip(headline, HEADLINE_CHARS))
        ));
    }
    if let Some(description) = ad.copy.description() {
        lines.push(escape_mrkdwn(&truncate_description(description)));
    }
    if let Some(cta) = ad.copy.cta() {
        lines.push(format!(
            "CTA: _{}_",
            escape_mrkdwn(&clip(cta, CTA_CHARS))
        ));
    }
    lines.join("\n")
}

/// Keeps the first [`DESCRIPTION_CHARS`] characters and appends `...` when
/// anything was cut.
#[must_use]
pub fn truncate_description(text: &str) -> String {
    if text.chars().count() <= DESCRIPTION_CHARS {
        return text.to_string();
    }
    let mut out: String = text.chars().take(DESCRIPTION_CHARS).collect();
    out.push_str("...");
    out
}

/// All brands in one digest; spills into further messages only when the
/// block limit would be exceeded. Header and tagline lead the first message,
/// the summary closes the last.
fn pack_single(units: Vec<BrandUnit>, tagline: &str, summary: &str) -> Vec<DigestMessage> {
    let fallback = format!("{DIGEST_TITLE}: {summary}");
    let mut messages = Vec::new();
    let mut blocks = vec![
        Block::header(DIGEST_TITLE),
        Block::context(&format!("_{tagline}_")),
    ];
    let mut ad_ids = Vec::new();

    for unit in units {
        let needed = unit.blocks.len() + 1;
        if blocks.len() + needed > MAX_BLOCKS_PER_MESSAGE {
            messages.push(DigestMessage {
                text: fallback.clone(),
                blocks: std::mem::take(&mut blocks),
                ad_ids: std::mem::take(&mut ad_ids),
            });
        }
        blocks.push(Block::Divider);
        blocks.extend(unit.blocks);
        ad_ids.extend(unit.ad_ids);
    }

    let footer = [Block::Divider, Block::context(&format!("_{summary}_"))];
    if blocks.len() + footer.len() > MAX_BLOCKS_PER_MESSAGE {
        messages.push(DigestMessage {
            text: fallback.clone(),
            blocks: std::mem::take(&mut blocks),
            ad_ids: std::mem::take(&mut ad_ids),
        });
    }
    blocks.extend(footer);
    messages.push(DigestMessage {
        text: fallback,
        blocks,
        ad_ids,
    });
    messages
}

/// One header-less message per brand; the tagline opens the first and the
/// summary closes the last.
fn one_per_brand(units: Vec<BrandUnit>, tagline: &str, summary: &str) -> Vec<DigestMessage> {
    let last = units.len().saturating_sub(1);
    units
        .into_iter()
        .enumerate()
        .map(|(index, unit)| {
            let mut blocks = Vec::with_capacity(unit.blocks.len() + 2);
            if index == 0 {
                blocks.push(Block::context(&format!("_{tagline}_")));
            }
            blocks.extend(unit.blocks);
            if index == last {
                blocks.push(Block::context(&format!("_{summary}_")));
            }
            DigestMessage {
                text: format!("New ads from {}", unit.brand),
                blocks,
                ad_ids: unit.ad_ids,
            }
        })
        .collect()
}

#[cfg(test)]
#[path = "render_test.rs"]
mod tests;
