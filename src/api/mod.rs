pub mod client;
pub mod error;

pub use client::{HttpTweetApi, TweetService};
pub use error::ApiError;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};

/// Character limit enforced before forwarding content to the external
/// posting service. Checked client-side so over-long drafts never leave
/// the process.
pub const POST_CHAR_LIMIT: usize = 280;

/// A generated tweet as cached from the server.
///
/// The server owns these records; the client never mutates `content` in
/// place. Editing before an external post edits a separate draft buffer.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Tweet {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    pub prompt: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Payload of the backend's `/health` endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub ai_service: String,
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        self.status == "healthy"
    }
}

/// Outcome of an accepted external post. A declined post surfaces as
/// [`ApiError::Rejected`] instead.
#[derive(Debug, Clone, PartialEq)]
pub struct ExternalPostOutcome {
    pub external_id: Option<String>,
    pub message: Option<String>,
}

// The backend assigns integer ids but the client treats them as opaque
// strings, so accept either JSON form.
fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum IdRepr {
        Num(i64),
        Text(String),
    }

    Ok(match IdRepr::deserialize(deserializer)? {
        IdRepr::Num(n) => n.to_string(),
        IdRepr::Text(s) => s,
    })
}

/// Reject empty or whitespace-only prompts before any request is issued.
/// Returns the trimmed prompt on success.
pub fn validate_prompt(prompt: &str) -> Result<&str, ApiError> {
    let trimmed = prompt.trim();
    if trimmed.is_empty() {
        return Err(ApiError::EmptyPrompt);
    }
    Ok(trimmed)
}

/// Check draft content before an external post: non-empty after trimming
/// and at most [`POST_CHAR_LIMIT`] characters. Exactly at the limit is
/// accepted.
pub fn validate_post_content(content: &str) -> Result<&str, ApiError> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Err(ApiError::EmptyContent);
    }
    let len = trimmed.chars().count();
    if len > POST_CHAR_LIMIT {
        return Err(ApiError::ContentTooLong { len });
    }
    Ok(trimmed)
}
