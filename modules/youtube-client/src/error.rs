use thiserror::Error;

pub type Result<T> = std::result::Result<T, YoutubeError>;

/// 403 reasons that mean "slow down" rather than "out of quota".
const RATE_LIMIT_REASONS: &[&str] = &["rateLimitExceeded", "userRateLimitExceeded"];

#[derive(Debug, Clone, Error)]
pub enum YoutubeError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API error (status {status}, reason {reason}): {message}")]
    Api {
        status: u16,
        reason: String,
        message: String,
    },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl YoutubeError {
    /// The daily quota is spent. Retrying before the quota resets is pointless.
    pub fn is_quota_exhausted(&self) -> bool {
        match self {
            YoutubeError::Api { status, reason, .. } => {
                *status == 403 && !is_rate_limit_reason(reason)
            }
            _ => false,
        }
    }

    /// Rate limiting, server-side failures and connection problems.
    pub fn is_transient(&self) -> bool {
        match self {
            YoutubeError::Network(_) => true,
            YoutubeError::Api { status, reason, .. } => {
                *status == 429
                    || (500..600).contains(status)
                    || (*status == 403 && is_rate_limit_reason(reason))
            }
            YoutubeError::Parse(_) | YoutubeError::InvalidRequest(_) => false,
        }
    }
}

fn is_rate_limit_reason(reason: &str) -> bool {
    RATE_LIMIT_REASONS.contains(&reason)
}

impl From<reqwest::Error> for YoutubeError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            YoutubeError::Parse(err.to_string())
        } else {
            YoutubeError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for YoutubeError {
    fn from(err: serde_json::Error) -> Self {
        YoutubeError::Parse(err.to_string())
    }
}
