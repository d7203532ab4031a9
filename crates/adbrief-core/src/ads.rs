//! Domain types shared by the ad source, the selector and the renderer.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A brand as resolved by the ad-discovery remote for a free-text query.
///
/// Re-resolved on every run; nothing keys off `id` across runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrandRecord {
    pub id: String,
    pub name: String,
    pub category: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdMedia {
    pub thumbnail: Option<String>,
    pub video: Option<String>,
    pub image: Option<String>,
}

impl AdMedia {
    /// Still image suitable for inline display: thumbnail first, then image.
    #[must_use]
    pub fn preview_url(&self) -> Option<&str> {
        non_blank(self.thumbnail.as_deref()).or_else(|| non_blank(self.image.as_deref()))
    }

    #[must_use]
    pub fn video_url(&self) -> Option<&str> {
        non_blank(self.video.as_deref())
    }

    #[must_use]
    pub fn has_video(&self) -> bool {
        self.video_url().is_some()
    }

    /// `true` when the ad carries any of thumbnail, video or image.
    #[must_use]
    pub fn has_any(&self) -> bool {
        self.preview_url().is_some() || self.has_video()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdCopy {
    pub headline: Option<String>,
    pub description: Option<String>,
    pub cta: Option<String>,
}

impl AdCopy {
    #[must_use]
    pub fn headline(&self) -> Option<&str> {
        non_blank(self.headline.as_deref())
    }

    #[must_use]
    pub fn description(&self) -> Option<&str> {
        non_blank(self.description.as_deref())
    }

    #[must_use]
    pub fn cta(&self) -> Option<&str> {
        non_blank(self.cta.as_deref())
    }

    /// Copy counts as present when there is a headline or a description.
    /// A lone call-to-action is not enough to make a sample.
    #[must_use]
    pub fn has_text(&self) -> bool {
        self.headline().is_some() || self.description().is_some()
    }
}

/// One piece of ad creative as catalogued by the remote. Immutable once fetched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdRecord {
    /// Globally unique and stable across runs; this is the dedup key.
    pub id: String,
    pub brand_name: String,
    pub media: AdMedia,
    pub copy: AdCopy,
    /// Country codes the ad declares. Empty means unspecified.
    pub countries: Vec<String>,
    /// `None` when the remote did not report a start date.
    pub started_running: Option<DateTime<Utc>>,
    pub display_format: Option<String>,
}

/// Result of one selector pass: brand name to its featured ads, best first.
///
/// Brands iterate in name order, which is also the order they are rendered in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    brands: BTreeMap<String, Vec<AdRecord>>,
}

impl Selection {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the featured ads for a brand. Empty lists are ignored so the
    /// selection never carries a brand with nothing to show.
    pub fn insert(&mut self, brand: impl Into<String>, ads: Vec<AdRecord>) {
        if !ads.is_empty() {
            self.brands.insert(brand.into(), ads);
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.brands.is_empty()
    }

    #[must_use]
    pub fn brand_count(&self) -> usize {
        self.brands.len()
    }

    #[must_use]
    pub fn ad_count(&self) -> usize {
        self.brands.values().map(Vec::len).sum()
    }

    #[must_use]
    pub fn get(&self, brand: &str) -> Option<&[AdRecord]> {
        self.brands.get(brand).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[AdRecord])> {
        self.brands
            .iter()
            .map(|(name, ads)| (name.as_str(), ads.as_slice()))
    }

    /// Every selected ad id, in brand order.
    #[must_use]
    pub fn ad_ids(&self) -> Vec<String> {
        self.brands
            .values()
            .flatten()
            .map(|ad| ad.id.clone())
            .collect()
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}
