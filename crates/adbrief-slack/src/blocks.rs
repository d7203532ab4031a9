//! The subset of Slack Block Kit the digest uses, serialized exactly as the
//! incoming-webhook endpoint expects.

use serde::Serialize;

/// Maximum blocks Slack accepts in one message.
pub const MAX_BLOCKS_PER_MESSAGE: usize = 50;
/// Maximum characters in a section's text.
pub const MAX_SECTION_CHARS: usize = 3000;
/// Maximum characters in a header's plain text.
pub const MAX_HEADER_CHARS: usize = 150;
/// Maximum characters in an image's alt text.
pub const MAX_ALT_TEXT_CHARS: usize = 2000;
/// Longest image or button URL Slack accepts.
pub const MAX_URL_CHARS: usize = 3000;

/// A Block Kit text object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Text {
    PlainText { text: String, emoji: bool },
    Mrkdwn { text: String },
}

impl Text {
    #[must_use]
    pub fn plain(text: impl Into<String>) -> Self {
        Self::PlainText {
            text: text.into(),
            emoji: true,
        }
    }

    #[must_use]
    pub fn mrkdwn(text: impl Into<String>) -> Self {
        Self::Mrkdwn { text: text.into() }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::PlainText { text, .. } | Self::Mrkdwn { text } => text,
        }
    }
}

/// Interactive element inside an `actions` block. Only link buttons are used.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ActionElement {
    Button { text: Text, url: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    Header {
        text: Text,
    },
    Section {
        text: Text,
    },
    Image {
        image_url: String,
        alt_text: String,
    },
    Context {
        elements: Vec<Text>,
    },
    Divider,
    Actions {
        elements: Vec<ActionElement>,
    },
}

impl Block {
    /// Header with plain text, clipped to [`MAX_HEADER_CHARS`].
    #[must_use]
    pub fn header(text: &str) -> Self {
        Self::Header {
            text: Text::plain(clip(text, MAX_HEADER_CHARS)),
        }
    }

    /// Section with mrkdwn text, clipped to [`MAX_SECTION_CHARS`].
    #[must_use]
    pub fn section(mrkdwn: &str) -> Self {
        Self::Section {
            text: Text::mrkdwn(clip(mrkdwn, MAX_SECTION_CHARS)),
        }
    }

    #[must_use]
    pub fn image(image_url: &str, alt_text: &str) -> Self {
        Self::Image {
            image_url: image_url.to_string(),
            alt_text: clip(alt_text, MAX_ALT_TEXT_CHARS),
        }
    }

    /// Single-element context line in mrkdwn.
    #[must_use]
    pub fn context(mrkdwn: &str) -> Self {
        Self::Context {
            elements: vec![Text::mrkdwn(clip(mrkdwn, MAX_SECTION_CHARS))],
        }
    }

    #[must_use]
    pub fn link_button(label: &str, url: &str) -> Self {
        Self::Actions {
            elements: vec![ActionElement::Button {
                text: Text::plain(label),
                url: url.to_string(),
            }],
        }
    }
}

/// One webhook payload, plus the ad ids whose content it carries.
///
/// `ad_ids` never leaves the process; it is how the driver knows which ids
/// a successful publish covered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DigestMessage {
    /// Notification fallback shown where blocks cannot be rendered.
    pub text: String,
    pub blocks: Vec<Block>,
    #[serde(skip)]
    pub ad_ids: Vec<String>,
}

/// Escapes the three characters Slack treats as control characters in mrkdwn.
#[must_use]
pub fn escape_mrkdwn(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            other => out.push(other),
        }
    }
    out
}

/// `url` when Slack will accept it in an image or button; longer URLs cannot
/// be clipped without breaking them.
#[must_use]
pub fn usable_url(url: Option<&str>) -> Option<&str> {
    url.filter(|u| u.chars().count() <= MAX_URL_CHARS)
}

/// Cuts `text` to at most `max` characters, ending in `...` when cut.
#[must_use]
pub fn clip(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let keep = max.saturating_sub(3);
    let mut out: String = text.chars().take(keep).collect();
    out.push_str("...");
    out
}
