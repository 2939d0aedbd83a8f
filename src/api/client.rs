use super::{ApiError, ExternalPostOutcome, HealthStatus, Tweet};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

/// The five operations the backend exposes. Kept behind a trait so the
/// app and stores can be exercised against a scripted stub in tests.
#[async_trait]
pub trait TweetService: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<Tweet, ApiError>;
    async fn list(&self) -> Result<Vec<Tweet>, ApiError>;
    async fn delete_by_id(&self, id: &str) -> Result<(), ApiError>;
    async fn post_external(&self, id: &str, content: &str)
        -> Result<ExternalPostOutcome, ApiError>;
    async fn health_check(&self) -> Result<HealthStatus, ApiError>;
}

/// HTTP implementation of [`TweetService`] against a configured base URL.
///
/// Performs no validation (callers validate before invoking) and no
/// caching (the collection store's job).
pub struct HttpTweetApi {
    base_url: String,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    prompt: &'a str,
}

#[derive(Serialize)]
struct ExternalPostRequest<'a> {
    tweet_id: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ExternalPostResponse {
    success: bool,
    external_id: Option<String>,
    message: Option<String>,
}

impl HttpTweetApi {
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("tweetgen/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait]
impl TweetService for HttpTweetApi {
    async fn generate(&self, prompt: &str) -> Result<Tweet, ApiError> {
        debug!(%prompt, "generating tweet");
        let response = self
            .client
            .post(self.url("/generate-tweet"))
            .json(&GenerateRequest { prompt })
            .send()
            .await
            .map_err(ApiError::from_reqwest)?;

        let response = check_status(response).await?;
        response.json::<Tweet>().await.map_err(|e| {
            warn!(error = %e, "generate response did not decode as a tweet");
            ApiError::Malformed(e.to_string())
        })
    }

    async fn list(&self) -> Result<Vec<Tweet>, ApiError> {
        debug!("fetching tweet list");
        let response = self
            .client
            .get(self.url("/tweets"))
            .send()
            .await
            .map_err(ApiError::from_reqwest)?;

        let response = check_status(response).await?;
        let body = response.text().await.map_err(ApiError::from_reqwest)?;
        let value: serde_json::Value =
            serde_json::from_str(&body).map_err(|e| ApiError::Malformed(e.to_string()))?;
        Ok(normalize_tweet_list(value))
    }

    async fn delete_by_id(&self, id: &str) -> Result<(), ApiError> {
        debug!(%id, "deleting tweet");
        let response = self
            .client
            .delete(self.url(&format!("/tweets/{}", urlencoding::encode(id))))
            .send()
            .await
            .map_err(ApiError::from_reqwest)?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            warn!(%id, "tweet already gone on the server");
            return Err(ApiError::NotFound);
        }
        check_status(response).await?;
        Ok(())
    }

    async fn post_external(
        &self,
        id: &str,
        content: &str,
    ) -> Result<ExternalPostOutcome, ApiError> {
        debug!(%id, "forwarding tweet to external service");
        let response = self
            .client
            .post(self.url("/post-to-external"))
            .json(&ExternalPostRequest {
                tweet_id: id,
                content,
            })
            .send()
            .await
            .map_err(ApiError::from_reqwest)?;

        let response = check_status(response).await?;
        let wire = response
            .json::<ExternalPostResponse>()
            .await
            .map_err(|e| ApiError::Malformed(e.to_string()))?;
        outcome_from_wire(wire)
    }

    async fn health_check(&self) -> Result<HealthStatus, ApiError> {
        let response = self
            .client
            .get(self.url("/health"))
            .send()
            .await
            .map_err(ApiError::from_reqwest)?;

        let response = check_status(response).await?;
        response
            .json::<HealthStatus>()
            .await
            .map_err(|e| ApiError::Malformed(e.to_string()))
    }
}

/// Pass 2xx responses through; turn anything else into a typed error,
/// pulling the FastAPI-style `detail` message out of the body when present.
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let message = extract_detail(&body).unwrap_or_else(|| {
        status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string()
    });
    warn!(status = status.as_u16(), %message, "request failed");
    Err(ApiError::from_status(status, message))
}

fn extract_detail(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    let detail = value.get("detail")?.as_str()?;
    if detail.is_empty() {
        None
    } else {
        Some(detail.to_string())
    }
}

/// Normalize the `/tweets` payload: a body that is valid JSON but not an
/// array becomes the empty list, and array elements that do not decode as
/// tweets are skipped, so a misbehaving server never propagates a type
/// error into the view layer.
fn normalize_tweet_list(value: serde_json::Value) -> Vec<Tweet> {
    match value {
        serde_json::Value::Array(elements) => elements
            .into_iter()
            .filter_map(|element| match serde_json::from_value::<Tweet>(element) {
                Ok(tweet) => Some(tweet),
                Err(e) => {
                    warn!(error = %e, "skipping malformed tweet in list response");
                    None
                }
            })
            .collect(),
        other => {
            warn!(kind = %json_kind(&other), "tweet list response was not an array");
            Vec::new()
        }
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

fn outcome_from_wire(wire: ExternalPostResponse) -> Result<ExternalPostOutcome, ApiError> {
    if wire.success {
        Ok(ExternalPostOutcome {
            external_id: wire.external_id,
            message: wire.message,
        })
    } else {
        Err(ApiError::Rejected(wire.message.unwrap_or_else(|| {
            "The external service declined the post.".to_string()
        })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let api = HttpTweetApi::new("http://localhost:8000/", Duration::from_secs(5));
        assert_eq!(api.url("/tweets"), "http://localhost:8000/tweets");
    }

    #[test]
    fn test_url_joins_path() {
        let api = HttpTweetApi::new("http://localhost:8000", Duration::from_secs(5));
        assert_eq!(api.url("/health"), "http://localhost:8000/health");
    }

    #[test]
    fn test_normalize_tweet_list_parses_array() {
        let value = json!([
            {"id": "1", "prompt": "p", "content": "c", "created_at": "2024-01-01T00:00:00Z"}
        ]);
        let tweets = normalize_tweet_list(value);
        assert_eq!(tweets.len(), 1);
        assert_eq!(tweets[0].id, "1");
        assert_eq!(tweets[0].content, "c");
    }

    #[test]
    fn test_normalize_tweet_list_non_array_is_empty() {
        assert!(normalize_tweet_list(json!({"detail": "oops"})).is_empty());
        assert!(normalize_tweet_list(json!("nope")).is_empty());
        assert!(normalize_tweet_list(json!(null)).is_empty());
    }

    #[test]
    fn test_normalize_tweet_list_skips_bad_elements() {
        let value = json!([
            {"id": 1, "prompt": "p", "content": "c", "created_at": "2024-01-01T00:00:00Z"},
            {"id": 2, "prompt": "missing the rest"},
            {"id": 3, "prompt": "q", "content": "d", "created_at": "2024-02-01T00:00:00Z"}
        ]);
        let tweets = normalize_tweet_list(value);
        assert_eq!(tweets.len(), 2);
        assert_eq!(tweets[0].id, "1");
        assert_eq!(tweets[1].id, "3");
    }

    #[test]
    fn test_normalize_tweet_list_preserves_server_order() {
        let value = json!([
            {"id": "9", "prompt": "a", "content": "x", "created_at": "2024-03-01T00:00:00Z"},
            {"id": "2", "prompt": "b", "content": "y", "created_at": "2024-01-01T00:00:00Z"}
        ]);
        let tweets = normalize_tweet_list(value);
        let ids: Vec<&str> = tweets.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["9", "2"]);
    }

    #[test]
    fn test_extract_detail_from_fastapi_body() {
        assert_eq!(
            extract_detail(r#"{"detail": "Tweet not found"}"#),
            Some("Tweet not found".to_string())
        );
    }

    #[test]
    fn test_extract_detail_missing_or_unparseable() {
        assert_eq!(extract_detail("not json"), None);
        assert_eq!(extract_detail(r#"{"other": 1}"#), None);
        assert_eq!(extract_detail(r#"{"detail": ""}"#), None);
    }

    #[test]
    fn test_outcome_success_carries_external_id() {
        let outcome = outcome_from_wire(ExternalPostResponse {
            success: true,
            external_id: Some("ext-1".to_string()),
            message: None,
        })
        .unwrap();
        assert_eq!(outcome.external_id.as_deref(), Some("ext-1"));
    }

    #[test]
    fn test_outcome_rejection_uses_server_message() {
        let err = outcome_from_wire(ExternalPostResponse {
            success: false,
            external_id: None,
            message: Some("content too long".to_string()),
        })
        .unwrap_err();
        assert_eq!(err, ApiError::Rejected("content too long".to_string()));
    }

    #[test]
    fn test_outcome_rejection_without_message_gets_fallback() {
        let err = outcome_from_wire(ExternalPostResponse {
            success: false,
            external_id: None,
            message: None,
        })
        .unwrap_err();
        assert!(matches!(err, ApiError::Rejected(_)));
    }
}
