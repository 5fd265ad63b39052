//! Bounded retry with linear backoff for outbound HTTP calls.
//!
//! Every network call site that retries goes through [`run_with_retry`] with
//! an explicit [`RetryPolicy`] value; there are no inline retry loops. The
//! attempt closure is injectable, which is also how the retry behavior is
//! tested without a live endpoint.

use crate::error::MigrateError;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tokio::time::sleep;
use tracing::warn;

/// How many characters of a response body survive into error messages.
const BODY_SNIPPET_LEN: usize = 200;

pub fn truncate_body(body: &str) -> String {
    body.chars().take(BODY_SNIPPET_LEN).collect()
}

/// One failed attempt of a retried call. Any non-success status is eligible
/// for retry, as is a successful status whose body fails to parse as the
/// expected JSON.
#[derive(Debug, Error)]
pub enum AttemptError {
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("non-JSON response: {body}")]
    Decode { body: String },
    #[error("{0}")]
    Transport(#[from] reqwest::Error),
}

/// Fixed attempt ceiling, linear backoff: the wait after attempt N is
/// `base_delay * N`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    /// Generic fetches: 3 attempts, waits of 2s then 4s.
    pub fn fetch() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(2),
        }
    }

    /// Uploads and updates: 3 attempts, waits of 3s then 6s. Upload
    /// endpoints fail more often under load, so they back off longer.
    pub fn upload() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(3),
        }
    }

    /// Wait after the given 1-based attempt number.
    pub fn delay_after(&self, attempt: u32) -> Duration {
        self.base_delay * attempt
    }
}

/// Run `op` until it succeeds or `policy.max_attempts` is reached. The final
/// attempt's failure is not retried; it propagates with the HTTP status and
/// the truncated response body. One log line per retry.
pub async fn run_with_retry<T, F, Fut>(
    endpoint: &str,
    policy: RetryPolicy,
    mut op: F,
) -> Result<T, MigrateError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, AttemptError>>,
{
    let mut attempt = 0u32;
    loop {
        attempt += 1;
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) if attempt < policy.max_attempts => {
                let delay = policy.delay_after(attempt);
                warn!(
                    endpoint,
                    attempt,
                    max_attempts = policy.max_attempts,
                    delay_secs = delay.as_secs(),
                    error = %err,
                    "attempt failed; retrying"
                );
                sleep(delay).await;
            }
            Err(err) => return Err(exhausted(endpoint, attempt, err)),
        }
    }
}

fn exhausted(endpoint: &str, attempts: u32, err: AttemptError) -> MigrateError {
    match err {
        AttemptError::Decode { body } => MigrateError::MalformedResponse {
            endpoint: endpoint.to_string(),
            attempts,
            body,
        },
        AttemptError::Status { status, body } => MigrateError::ExhaustedRetries {
            endpoint: endpoint.to_string(),
            attempts,
            status: Some(status),
            body,
        },
        AttemptError::Transport(e) => MigrateError::ExhaustedRetries {
            endpoint: endpoint.to_string(),
            attempts,
            status: None,
            body: truncate_body(&e.to_string()),
        },
    }
}

/// Thin wrapper pairing a [`reqwest::Client`] with the retry primitive for
/// JSON GETs. Upload and update calls build their own attempt closures (the
/// multipart form has to be rebuilt per attempt) but share the same
/// primitive.
#[derive(Clone)]
pub struct RetryClient {
    http: reqwest::Client,
}

impl RetryClient {
    pub fn new(http: reqwest::Client) -> Self {
        Self { http }
    }

    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// GET a JSON document, retrying under `policy`. Query pairs are
    /// form-encoded; a bearer token is attached when provided.
    pub async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
        bearer: Option<&str>,
        policy: RetryPolicy,
    ) -> Result<T, MigrateError> {
        run_with_retry(url, policy, || self.attempt_get(url, query, bearer)).await
    }

    async fn attempt_get<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
        bearer: Option<&str>,
    ) -> Result<T, AttemptError> {
        let mut req = self.http.get(url);
        if !query.is_empty() {
            req = req.query(query);
        }
        if let Some(token) = bearer {
            req = req.bearer_auth(token);
        }
        let resp = req.send().await?;
        let status = resp.status();
        let text = resp.text().await?;
        if !status.is_success() {
            return Err(AttemptError::Status {
                status: status.as_u16(),
                body: truncate_body(&text),
            });
        }
        serde_json::from_str(&text).map_err(|_| AttemptError::Decode {
            body: truncate_body(&text),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn policies_back_off_linearly() {
        let fetch = RetryPolicy::fetch();
        assert_eq!(fetch.delay_after(1), Duration::from_secs(2));
        assert_eq!(fetch.delay_after(2), Duration::from_secs(4));
        let upload = RetryPolicy::upload();
        assert_eq!(upload.delay_after(1), Duration::from_secs(3));
        assert_eq!(upload.delay_after(2), Duration::from_secs(6));
    }

    #[test]
    fn body_snippet_is_capped_at_200_chars() {
        let long = "x".repeat(500);
        assert_eq!(truncate_body(&long).len(), 200);
        assert_eq!(truncate_body("short"), "short");
    }

    #[tokio::test(start_paused = true)]
    async fn upload_succeeds_on_third_attempt_after_3s_and_6s_waits() {
        let started = tokio::time::Instant::now();
        let mut calls = 0u32;
        let result = run_with_retry("upload", RetryPolicy::upload(), || {
            calls += 1;
            let call = calls;
            async move {
                if call < 3 {
                    Err(AttemptError::Status {
                        status: 503,
                        body: "overloaded".into(),
                    })
                } else {
                    Ok(call)
                }
            }
        })
        .await
        .unwrap();
        assert_eq!(result, 3);
        assert_eq!(calls, 3);
        assert_eq!(started.elapsed(), Duration::from_secs(9));
    }

    #[tokio::test(start_paused = true)]
    async fn final_status_failure_is_not_retried_further() {
        let mut calls = 0u32;
        let err = run_with_retry::<(), _, _>("fetch", RetryPolicy::fetch(), || {
            calls += 1;
            async {
                Err(AttemptError::Status {
                    status: 500,
                    body: "boom".into(),
                })
            }
        })
        .await
        .unwrap_err();
        assert_eq!(calls, 3);
        match err {
            MigrateError::ExhaustedRetries {
                attempts,
                status,
                body,
                ..
            } => {
                assert_eq!(attempts, 3);
                assert_eq!(status, Some(500));
                assert_eq!(body, "boom");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn persistent_parse_failure_surfaces_as_malformed_response() {
        let err = run_with_retry::<(), _, _>("fetch", RetryPolicy::fetch(), || async {
            Err(AttemptError::Decode {
                body: "<html>maintenance</html>".into(),
            })
        })
        .await
        .unwrap_err();
        assert!(matches!(err, MigrateError::MalformedResponse { .. }));
    }
}
