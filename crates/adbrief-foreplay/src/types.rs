//! Wire shapes returned by the Foreplay API, and their conversion into the
//! shared domain records.

use adbrief_core::{AdCopy, AdMedia, AdRecord, BrandRecord};
use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Every Foreplay listing endpoint wraps its items in `{"data": [...]}`.
/// Items are kept as raw values so one malformed entry does not sink the page.
#[derive(Debug, Deserialize)]
pub struct DataEnvelope {
    #[serde(default)]
    pub data: Vec<serde_json::Value>,
}

/// Ids arrive as strings from most endpoints but as numbers from some.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawId {
    Text(String),
    Number(i64),
}

impl RawId {
    fn into_string(self) -> Option<String> {
        match self {
            RawId::Text(s) if s.trim().is_empty() => None,
            RawId::Text(s) => Some(s),
            RawId::Number(n) => Some(n.to_string()),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawBrand {
    pub id: RawId,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
}

impl RawBrand {
    /// `query` stands in for the name when the remote omits it.
    #[must_use]
    pub fn into_record(self, query: &str) -> Option<BrandRecord> {
        let id = self.id.into_string()?;
        let name = self
            .name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| query.to_string());
        Some(BrandRecord {
            id,
            name,
            category: self.category,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawAd {
    pub id: RawId,
    #[serde(default)]
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub video: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub headline: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub cta_title: Option<String>,
    #[serde(default)]
    pub countries: Option<Vec<String>>,
    /// Unix epoch milliseconds, occasionally sent as a float or a string.
    #[serde(default)]
    pub started_running: Option<serde_json::Value>,
    #[serde(default)]
    pub display_format: Option<String>,
}

impl RawAd {
    #[must_use]
    pub fn into_record(self, brand_name: &str) -> Option<AdRecord> {
        let id = self.id.into_string()?;
        let started_running = self.started_running.as_ref().and_then(parse_started_running);
        Some(AdRecord {
            id,
            brand_name: brand_name.to_string(),
            media: AdMedia {
                thumbnail: self.thumbnail,
                video: self.video,
                image: self.image,
            },
            copy: AdCopy {
                headline: self.headline,
                description: self.description,
                cta: self.cta_title,
            },
            countries: self.countries.unwrap_or_default(),
            started_running,
            display_format: self.display_format.filter(|f| !f.trim().is_empty()),
        })
    }
}

/// Accepts epoch milliseconds as an integer, float or numeric string, or an
/// RFC 3339 timestamp. Anything else is treated as unknown.
pub(crate) fn parse_started_running(value: &serde_json::Value) -> Option<DateTime<Utc>> {
    match value {
        serde_json::Value::Number(n) => {
            #[allow(clippy::cast_possible_truncation)]
            let millis = n.as_i64().or_else(|| n.as_f64().map(|f| f as i64))?;
            DateTime::from_timestamp_millis(millis)
        }
        serde_json::Value::String(s) => {
            let s = s.trim();
            if let Ok(millis) = s.parse::<i64>() {
                return DateTime::from_timestamp_millis(millis);
            }
            DateTime::parse_from_rfc3339(s)
                .ok()
                .map(|dt| dt.with_timezone(&Utc))
        }
        _ => None,
    }
}
