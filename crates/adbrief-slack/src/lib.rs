//! Slack side of the digest: Block Kit rendering and incoming-webhook delivery.

pub mod blocks;
pub mod error;
pub mod render;
pub mod webhook;

pub use blocks::{Block, DigestMessage, Text};
pub use error::SlackError;
pub use render::{render, DIGEST_TITLE, TAGLINES};
pub use webhook::{PublishOutcome, SlackWebhook};
