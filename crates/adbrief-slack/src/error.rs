use thiserror::Error;

/// Errors returned by [`crate::SlackWebhook`].
///
/// The webhook URL is a credential, so no variant carries it and HTTP
/// errors are stripped of their URL before being wrapped.
#[derive(Debug, Error)]
pub enum SlackError {
    #[error("HTTP error: {0}")]
    Http(reqwest::Error),

    /// Slack answers rejected payloads with a short plain-text reason
    /// such as `invalid_blocks`.
    #[error("unexpected HTTP status {status} from webhook: {body}")]
    UnexpectedStatus { status: u16, body: String },

    #[error("invalid webhook URL: {reason}")]
    InvalidWebhookUrl { reason: String },
}

impl From<reqwest::Error> for SlackError {
    fn from(err: reqwest::Error) -> Self {
        Self::Http(err.without_url())
    }
}
